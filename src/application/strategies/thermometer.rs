// Thermometer channels
use super::{field_points, is_aggregated, range_points, ABSOLUTE_ZERO};
use crate::application::numeric::{max, mean, min, present};
use crate::application::strategy::{ChannelStrategy, ChartContext};
use crate::domain::label::Label;
use crate::domain::log::{Field, MeasurementLog, RawLog};
use crate::domain::series::{AxisDescriptor, Series, SeriesKind, ValueFormat};

pub struct Thermometer;

impl ChannelStrategy for Thermometer {
    fn fix_log(&self, raw: &RawLog) -> MeasurementLog {
        let temperature = raw
            .number(Field::Temperature)
            .filter(|t| *t >= ABSOLUTE_ZERO);
        MeasurementLog::new(raw.timestamp).with(Field::Temperature, temperature)
    }

    fn aggregate_logs(&self, bucket: &[MeasurementLog]) -> MeasurementLog {
        let temperatures = present(bucket, Field::Temperature);
        let average = mean(&temperatures);
        MeasurementLog::new(bucket[0].timestamp)
            .with(Field::Temperature, average)
            .with(Field::Min, average.and(min(&temperatures)))
            .with(Field::Max, average.and(max(&temperatures)))
    }

    fn series(&self, logs: &[MeasurementLog], _ctx: &ChartContext<'_>) -> Vec<Series> {
        let line = field_points(logs, Field::Temperature);
        if !is_aggregated(logs, Field::Min) {
            return vec![Series::new(Label::Key("Temperature"), SeriesKind::Line, line)];
        }
        vec![
            Series::new(
                Label::Qualified("Temperature", "average"),
                SeriesKind::Line,
                line,
            ),
            Series::new(
                Label::Qualified("Temperature", "range"),
                SeriesKind::RangeArea,
                range_points(logs, Field::Min, Field::Max),
            ),
        ]
    }

    fn y_axes(&self, _logs: &[MeasurementLog], _ctx: &ChartContext<'_>) -> Vec<AxisDescriptor> {
        vec![AxisDescriptor::new(
            Label::Key("Temperature"),
            ValueFormat::new(2, "", "°C"),
        )]
    }

    fn empty_log(&self) -> MeasurementLog {
        MeasurementLog::default().with(Field::Temperature, None)
    }
}
