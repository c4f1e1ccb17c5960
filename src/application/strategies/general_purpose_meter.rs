// General purpose meter channels
use super::general_purpose_measurement::gp_value_format;
use crate::application::counter::{CounterTracker, Direction};
use crate::application::interpolation::interpolate_linear;
use crate::application::numeric::{round_to, sum_present};
use crate::application::strategy::{counter_reset_annotations, ChannelStrategy, ChartContext};
use crate::domain::channel::{ChannelConfig, ChartShape};
use crate::domain::label::Label;
use crate::domain::log::{Field, MeasurementLog, RawLog};
use crate::domain::series::{Annotation, AxisDescriptor, Series, SeriesKind, SeriesPoint};

pub struct GeneralPurposeMeter;

impl ChannelStrategy for GeneralPurposeMeter {
    fn fix_log(&self, raw: &RawLog) -> MeasurementLog {
        MeasurementLog::new(raw.timestamp)
            .with(Field::Value, raw.number(Field::Value).map(|v| round_to(v, 5)))
    }

    /// Without a counter type the readings are differenced like an
    /// increment-and-decrement counter.
    fn adjust_logs(&self, logs: Vec<MeasurementLog>, config: &ChannelConfig) -> Vec<MeasurementLog> {
        let direction = config
            .counter_type
            .map(Direction::from)
            .unwrap_or(Direction::Bidirectional);
        let mut tracker = CounterTracker::new(direction);
        logs.into_iter()
            .map(|mut log| {
                let step = tracker.observe(log.get(Field::Value));
                if step.is_reset() {
                    tracing::debug!(timestamp = log.timestamp, ?direction, "meter counter reset detected");
                    log.counter_reset = true;
                }
                log.set(Field::Value, step.delta());
                log
            })
            .collect()
    }

    fn interpolate_gaps(
        &self,
        mut logs: Vec<MeasurementLog>,
        config: &ChannelConfig,
    ) -> Vec<MeasurementLog> {
        if config.fill_missing_data {
            interpolate_linear(&mut logs, Field::Value);
        }
        logs
    }

    fn aggregate_logs(&self, bucket: &[MeasurementLog]) -> MeasurementLog {
        let mut log = self
            .empty_log()
            .at(bucket[0].timestamp)
            .with(Field::Value, sum_present(bucket, Field::Value));
        log.counter_reset = bucket.iter().any(|l| l.counter_reset);
        log
    }

    /// Reset records are hidden; their delta is a raw reading.
    fn series(&self, logs: &[MeasurementLog], ctx: &ChartContext<'_>) -> Vec<Series> {
        let kind = match ctx.config.chart_type {
            Some(ChartShape::Linear) => SeriesKind::Line,
            _ => SeriesKind::Bar,
        };
        let points = logs
            .iter()
            .map(|log| {
                let value = if log.counter_reset {
                    None
                } else {
                    log.get(Field::Value)
                };
                SeriesPoint::single(log.timestamp, value, log.interpolated)
            })
            .collect();
        vec![Series::new(Label::Key("Value"), kind, points)]
    }

    fn y_axes(&self, _logs: &[MeasurementLog], ctx: &ChartContext<'_>) -> Vec<AxisDescriptor> {
        vec![AxisDescriptor::new(Label::Key("Value"), gp_value_format(ctx.config))]
    }

    fn annotations(&self, logs: &[MeasurementLog]) -> Vec<Annotation> {
        counter_reset_annotations(logs)
    }

    fn empty_log(&self) -> MeasurementLog {
        MeasurementLog::default().with(Field::Value, None)
    }
}
