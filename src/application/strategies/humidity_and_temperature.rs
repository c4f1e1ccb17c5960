// Combined thermometer + hygrometer channels
use super::humidity::{fixed_humidity, humidity_axis};
use super::{field_points, ABSOLUTE_ZERO};
use crate::application::numeric::{max, mean, min, present};
use crate::application::strategy::{ChannelStrategy, ChartContext};
use crate::domain::label::Label;
use crate::domain::log::{Field, MeasurementLog, RawLog};
use crate::domain::series::{AxisDescriptor, Series, SeriesKind, ValueFormat};

pub struct HumidityAndTemperature;

impl ChannelStrategy for HumidityAndTemperature {
    fn fix_log(&self, raw: &RawLog) -> MeasurementLog {
        let temperature = raw
            .number(Field::Temperature)
            .filter(|t| *t >= ABSOLUTE_ZERO);
        MeasurementLog::new(raw.timestamp)
            .with(Field::Temperature, temperature)
            .with(Field::Humidity, fixed_humidity(raw))
    }

    fn aggregate_logs(&self, bucket: &[MeasurementLog]) -> MeasurementLog {
        let humidities = present(bucket, Field::Humidity);
        let temperatures = present(bucket, Field::Temperature);
        MeasurementLog::new(bucket[0].timestamp)
            .with(Field::Humidity, mean(&humidities))
            .with(Field::Temperature, mean(&temperatures))
            .with(Field::MinHumidity, min(&humidities))
            .with(Field::MaxHumidity, max(&humidities))
            .with(Field::MinTemperature, min(&temperatures))
            .with(Field::MaxTemperature, max(&temperatures))
    }

    fn series(&self, logs: &[MeasurementLog], _ctx: &ChartContext<'_>) -> Vec<Series> {
        vec![
            Series::new(
                Label::Key("Temperature"),
                SeriesKind::Line,
                field_points(logs, Field::Temperature),
            ),
            Series::new(
                Label::Key("Humidity"),
                SeriesKind::Line,
                field_points(logs, Field::Humidity),
            ),
        ]
    }

    fn y_axes(&self, _logs: &[MeasurementLog], _ctx: &ChartContext<'_>) -> Vec<AxisDescriptor> {
        vec![
            AxisDescriptor::new(Label::Key("Temperature"), ValueFormat::new(2, "", "°C")),
            AxisDescriptor {
                min: Some(0.0),
                ..humidity_axis()
            },
        ]
    }

    fn empty_log(&self) -> MeasurementLog {
        MeasurementLog::default()
            .with(Field::Temperature, None)
            .with(Field::Humidity, None)
    }
}
