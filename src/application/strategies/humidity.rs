// Hygrometer channels
use super::{field_points, is_aggregated, range_points};
use crate::application::numeric::{max, mean, min, present};
use crate::application::strategy::{ChannelStrategy, ChartContext};
use crate::domain::label::Label;
use crate::domain::log::{Field, MeasurementLog, RawLog};
use crate::domain::series::{AxisDescriptor, Series, SeriesKind, ValueFormat};

pub struct Humidity;

/// Relative humidity, negative readings nulled.
pub(crate) fn fixed_humidity(raw: &RawLog) -> Option<f64> {
    raw.number(Field::Humidity).filter(|h| *h >= 0.0)
}

pub(crate) fn humidity_axis() -> AxisDescriptor {
    AxisDescriptor {
        opposite: true,
        ..AxisDescriptor::new(Label::Key("Humidity"), ValueFormat::new(1, "", "%"))
    }
}

impl ChannelStrategy for Humidity {
    fn fix_log(&self, raw: &RawLog) -> MeasurementLog {
        MeasurementLog::new(raw.timestamp).with(Field::Humidity, fixed_humidity(raw))
    }

    fn aggregate_logs(&self, bucket: &[MeasurementLog]) -> MeasurementLog {
        let humidities = present(bucket, Field::Humidity);
        let average = mean(&humidities);
        MeasurementLog::new(bucket[0].timestamp)
            .with(Field::Humidity, average)
            .with(Field::Min, average.and(min(&humidities)))
            .with(Field::Max, average.and(max(&humidities)))
    }

    fn series(&self, logs: &[MeasurementLog], _ctx: &ChartContext<'_>) -> Vec<Series> {
        let line = field_points(logs, Field::Humidity);
        if !is_aggregated(logs, Field::Min) {
            return vec![Series::new(Label::Key("Humidity"), SeriesKind::Line, line)];
        }
        vec![
            Series::new(Label::Qualified("Humidity", "average"), SeriesKind::Line, line),
            Series::new(
                Label::Qualified("Humidity", "range"),
                SeriesKind::RangeArea,
                range_points(logs, Field::Min, Field::Max),
            ),
        ]
    }

    fn y_axes(&self, _logs: &[MeasurementLog], _ctx: &ChartContext<'_>) -> Vec<AxisDescriptor> {
        vec![humidity_axis()]
    }

    fn empty_log(&self) -> MeasurementLog {
        MeasurementLog::default().with(Field::Humidity, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_nulls_negative_humidity() {
        let fixed = Humidity.fix_log(&RawLog::new(0).with("humidity", -0.5));
        assert_eq!(fixed.get(Field::Humidity), None);

        let fixed = Humidity.fix_log(&RawLog::new(0).with("humidity", 0.0));
        assert_eq!(fixed.get(Field::Humidity), Some(0.0));
    }

    #[test]
    fn test_aggregate_keeps_zero_readings() {
        let bucket = vec![
            MeasurementLog::new(0).with(Field::Humidity, Some(0.0)),
            MeasurementLog::new(600).with(Field::Humidity, Some(60.0)),
        ];
        let log = Humidity.aggregate_logs(&bucket);
        assert_eq!(log.get(Field::Humidity), Some(30.0));
        assert_eq!(log.get(Field::Min), Some(0.0));
        assert_eq!(log.get(Field::Max), Some(60.0));
    }

    #[test]
    fn test_axis_is_opposite_percent() {
        let axis = humidity_axis();
        assert!(axis.opposite);
        assert_eq!(axis.format.format(Some(55.55)), "55.5%");
    }
}
