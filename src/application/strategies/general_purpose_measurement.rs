// General purpose measurement channels (candle / linear / bar)
use super::{field_points, range_points};
use crate::application::numeric::{max, mean, min, present};
use crate::application::strategy::{ChannelStrategy, ChartContext};
use crate::domain::channel::{ChannelConfig, ChartShape, GpValueFormat};
use crate::domain::label::Label;
use crate::domain::log::{Field, MeasurementLog, RawLog};
use crate::domain::series::{AxisDescriptor, PointValue, Series, SeriesKind, SeriesPoint, ValueFormat};

const DEFAULT_PRECISION: u32 = 2;

pub struct GeneralPurposeMeasurement;

/// Axis format of general purpose channels: configured precision and the
/// units around the value.
pub(crate) fn gp_value_format(config: &ChannelConfig) -> ValueFormat {
    let GpValueFormat {
        value_precision,
        unit_before_value,
        unit_after_value,
        no_space_before_value,
        no_space_after_value,
    } = &config.value_format;

    let mut prefix = unit_before_value.clone();
    if !prefix.is_empty() && !no_space_before_value {
        prefix.push(' ');
    }
    let mut suffix = String::new();
    if !unit_after_value.is_empty() {
        if !no_space_after_value {
            suffix.push(' ');
        }
        suffix.push_str(unit_after_value);
    }
    ValueFormat::new(value_precision.unwrap_or(DEFAULT_PRECISION), prefix, suffix)
}

impl ChannelStrategy for GeneralPurposeMeasurement {
    fn fix_log(&self, raw: &RawLog) -> MeasurementLog {
        let mut log = MeasurementLog::new(raw.timestamp);
        for field in [
            Field::AvgValue,
            Field::MinValue,
            Field::MaxValue,
            Field::OpenValue,
            Field::CloseValue,
        ] {
            log.set(field, raw.number(field));
        }
        log
    }

    fn aggregate_logs(&self, bucket: &[MeasurementLog]) -> MeasurementLog {
        let average = mean(&present(bucket, Field::AvgValue));
        let opens = present(bucket, Field::OpenValue);
        let closes = present(bucket, Field::CloseValue);
        MeasurementLog::new(bucket[0].timestamp)
            .with(Field::AvgValue, average)
            .with(Field::MinValue, average.and(min(&present(bucket, Field::MinValue))))
            .with(Field::MaxValue, average.and(max(&present(bucket, Field::MaxValue))))
            .with(Field::OpenValue, average.and(opens.first().copied()))
            .with(Field::CloseValue, average.and(closes.last().copied()))
    }

    fn series(&self, logs: &[MeasurementLog], ctx: &ChartContext<'_>) -> Vec<Series> {
        match ctx.config.chart_type {
            Some(ChartShape::Candle) => {
                let points = logs
                    .iter()
                    .map(|log| {
                        let candle = [
                            log.get(Field::OpenValue),
                            log.get(Field::MaxValue),
                            log.get(Field::MinValue),
                            log.get(Field::CloseValue),
                        ];
                        SeriesPoint::new(log.timestamp, PointValue::Candle(candle), log.interpolated)
                    })
                    .collect();
                vec![Series::new(Label::Key("Value"), SeriesKind::Candlestick, points)]
            }
            Some(ChartShape::Linear) => vec![
                Series::new(
                    Label::Qualified("Value", "average"),
                    SeriesKind::Line,
                    field_points(logs, Field::AvgValue),
                ),
                Series::new(
                    Label::Qualified("Value", "range"),
                    SeriesKind::RangeArea,
                    range_points(logs, Field::MinValue, Field::MaxValue),
                ),
            ],
            None => vec![Series::new(
                Label::Key("Value"),
                SeriesKind::Bar,
                field_points(logs, Field::AvgValue),
            )],
        }
    }

    fn y_axes(&self, _logs: &[MeasurementLog], ctx: &ChartContext<'_>) -> Vec<AxisDescriptor> {
        vec![AxisDescriptor::new(Label::Key("Value"), gp_value_format(ctx.config))]
    }

    fn empty_log(&self) -> MeasurementLog {
        MeasurementLog::default()
            .with(Field::AvgValue, None)
            .with(Field::OpenValue, None)
            .with(Field::CloseValue, None)
            .with(Field::MaxValue, None)
            .with(Field::MinValue, None)
    }
}
