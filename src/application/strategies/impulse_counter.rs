// Impulse counter channels (gas, water, heat and electricity meters)
use super::field_points;
use crate::application::counter::{CounterStep, CounterTracker, Direction};
use crate::application::interpolation::{bounded_runs, fill_run};
use crate::application::numeric::{round_to, sum_present};
use crate::application::strategy::{counter_reset_annotations, ChannelStrategy, ChartContext};
use crate::domain::channel::ChannelConfig;
use crate::domain::label::Label;
use crate::domain::log::{Field, MeasurementLog, RawLog};
use crate::domain::series::{Annotation, AxisDescriptor, Series, SeriesKind, ValueFormat};

/// Shared by every impulse counter function; only the default unit differs.
pub struct ImpulseCounter;

impl ChannelStrategy for ImpulseCounter {
    fn fix_log(&self, raw: &RawLog) -> MeasurementLog {
        MeasurementLog::new(raw.timestamp)
            .with(Field::Counter, raw.number(Field::Counter))
            .with(
                Field::CalculatedValue,
                raw.number(Field::CalculatedValue).map(|v| round_to(v, 5)),
            )
    }

    /// The impulse counter decides; the calculated value follows the same
    /// decision against its own previous reading.
    fn adjust_logs(&self, logs: Vec<MeasurementLog>, _config: &ChannelConfig) -> Vec<MeasurementLog> {
        let mut tracker = CounterTracker::new(Direction::Increment);
        let mut previous_value: Option<f64> = None;

        logs.into_iter()
            .map(|mut log| {
                let value = log.get(Field::CalculatedValue);
                let step = tracker.observe(log.get(Field::Counter));
                let value_delta = match step {
                    CounterStep::Baseline | CounterStep::Missing => None,
                    CounterStep::Advance(_) => value.zip(previous_value).map(|(v, p)| v - p),
                    CounterStep::Stale => Some(0.0),
                    CounterStep::Reset(_) => value,
                };
                if step.advances() && value.is_some() {
                    previous_value = value;
                }
                if step.is_reset() {
                    tracing::debug!(timestamp = log.timestamp, "impulse counter reset detected");
                    log.counter_reset = true;
                }
                log.set(Field::Counter, step.delta());
                log.set(Field::CalculatedValue, value_delta);
                log
            })
            .collect()
    }

    fn interpolate_gaps(
        &self,
        mut logs: Vec<MeasurementLog>,
        _config: &ChannelConfig,
    ) -> Vec<MeasurementLog> {
        for run in bounded_runs(&logs, Field::CalculatedValue) {
            let value_step = run.step(&logs, Field::CalculatedValue);
            let counter_step = run.step(&logs, Field::Counter);
            if let (Some(value_step), Some(counter_step)) = (value_step, counter_step) {
                if counter_step >= 0.0 {
                    fill_run(&mut logs, run, Field::CalculatedValue, value_step, |v| v);
                    fill_run(&mut logs, run, Field::Counter, counter_step, f64::floor);
                }
            }
        }
        logs
    }

    fn aggregate_logs(&self, bucket: &[MeasurementLog]) -> MeasurementLog {
        let mut log = self
            .empty_log()
            .at(bucket[0].timestamp)
            .with(Field::Counter, sum_present(bucket, Field::Counter))
            .with(
                Field::CalculatedValue,
                sum_present(bucket, Field::CalculatedValue),
            );
        log.counter_reset = bucket.iter().any(|l| l.counter_reset);
        log
    }

    fn series(&self, logs: &[MeasurementLog], _ctx: &ChartContext<'_>) -> Vec<Series> {
        vec![Series::new(
            Label::Key("Value"),
            SeriesKind::Bar,
            field_points(logs, Field::CalculatedValue),
        )]
    }

    fn y_axes(&self, _logs: &[MeasurementLog], ctx: &ChartContext<'_>) -> Vec<AxisDescriptor> {
        let suffix = ctx
            .config
            .unit_or_default(ctx.channel_type)
            .map(|unit| format!(" {}", unit))
            .unwrap_or_default();
        vec![AxisDescriptor::new(
            Label::Key("Value"),
            ValueFormat::new(2, "", suffix),
        )]
    }

    fn annotations(&self, logs: &[MeasurementLog]) -> Vec<Annotation> {
        counter_reset_annotations(logs)
    }

    fn empty_log(&self) -> MeasurementLog {
        MeasurementLog::default()
            .with(Field::Counter, None)
            .with(Field::CalculatedValue, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::strategy::EnergyMode;
    use crate::domain::channel::ChannelType;

    fn reading(timestamp: i64, counter: Option<f64>, value: Option<f64>) -> MeasurementLog {
        MeasurementLog::new(timestamp)
            .with(Field::Counter, counter)
            .with(Field::CalculatedValue, value)
    }

    fn adjusted(logs: Vec<MeasurementLog>) -> Vec<MeasurementLog> {
        ImpulseCounter.adjust_logs(logs, &ChannelConfig::new("IC_GASMETER"))
    }

    #[test]
    fn test_fix_rounds_calculated_value() {
        let raw = RawLog::new(0)
            .with("counter", "1234")
            .with("calculated_value", "1.2340000001");
        let fixed = ImpulseCounter.fix_log(&raw);
        assert_eq!(fixed.get(Field::Counter), Some(1234.0));
        assert_eq!(fixed.get(Field::CalculatedValue), Some(1.234));
    }

    #[test]
    fn test_adjust_to_deltas() {
        let logs = adjusted(vec![
            reading(0, Some(1000.0), Some(10.0)),
            reading(600, Some(1200.0), Some(12.0)),
            reading(1200, Some(1150.0), Some(11.5)),
            reading(1800, Some(1300.0), Some(13.0)),
        ]);

        let counters: Vec<_> = logs.iter().map(|l| l.get(Field::Counter)).collect();
        assert_eq!(counters, vec![None, Some(200.0), Some(0.0), Some(100.0)]);
        let values: Vec<_> = logs.iter().map(|l| l.get(Field::CalculatedValue)).collect();
        assert_eq!(values, vec![None, Some(2.0), Some(0.0), Some(1.0)]);
        assert!(logs.iter().all(|l| !l.counter_reset));
    }

    #[test]
    fn test_adjust_flags_reset_and_keeps_raw_value() {
        let logs = adjusted(vec![
            reading(0, Some(100.0), Some(1.0)),
            reading(600, Some(5.0), Some(0.05)),
            reading(1200, Some(15.0), Some(0.15)),
        ]);

        assert!(logs[1].counter_reset);
        assert_eq!(logs[1].get(Field::Counter), Some(5.0));
        assert_eq!(logs[1].get(Field::CalculatedValue), Some(0.05));
        assert_eq!(logs[2].get(Field::Counter), Some(10.0));
        assert!(!logs[2].counter_reset);
        assert_eq!(ImpulseCounter.annotations(&logs).len(), 1);
    }

    #[test]
    fn test_missing_value_keeps_previous_value() {
        let logs = adjusted(vec![
            reading(0, Some(1000.0), Some(10.0)),
            reading(600, Some(1100.0), None),
            reading(1200, Some(1200.0), Some(12.0)),
        ]);

        let counters: Vec<_> = logs.iter().map(|l| l.get(Field::Counter)).collect();
        assert_eq!(counters, vec![None, Some(100.0), Some(100.0)]);
        let values: Vec<_> = logs.iter().map(|l| l.get(Field::CalculatedValue)).collect();
        assert_eq!(values, vec![None, None, Some(2.0)]);
    }

    #[test]
    fn test_interpolate_requires_non_negative_counter_step() {
        let logs = vec![
            reading(0, Some(10.0), Some(1.0)),
            reading(600, None, None),
            reading(1200, Some(14.0), Some(2.0)),
            reading(1800, None, None),
            reading(2400, Some(2.0), Some(0.5)),
        ];
        let logs = ImpulseCounter.interpolate_gaps(logs, &ChannelConfig::new("IC_WATERMETER"));

        assert_eq!(logs[1].get(Field::CalculatedValue), Some(1.5));
        assert_eq!(logs[1].get(Field::Counter), Some(12.0));
        assert!(logs[1].interpolated);
        assert_eq!(logs[3].get(Field::CalculatedValue), None);
        assert!(!logs[3].interpolated);
    }

    #[test]
    fn test_aggregate_sums_and_propagates_reset() {
        let mut reset = reading(1200, Some(5.0), Some(0.05));
        reset.counter_reset = true;
        let bucket = vec![
            reading(0, None, None),
            reading(600, Some(20.0), Some(0.2)),
            reset,
        ];
        let log = ImpulseCounter.aggregate_logs(&bucket);
        assert_eq!(log.timestamp, 0);
        assert_eq!(log.get(Field::Counter), Some(25.0));
        assert!((log.get(Field::CalculatedValue).unwrap() - 0.25).abs() < 1e-9);
        assert!(log.counter_reset);
    }

    #[test]
    fn test_axis_unit_defaults_per_function() {
        let config = ChannelConfig::new("IC_HEATMETER");
        let ctx = ChartContext {
            config: &config,
            channel_type: ChannelType::IcHeatMeter,
            mode: EnergyMode::default(),
        };
        let axes = ImpulseCounter.y_axes(&[], &ctx);
        assert_eq!(axes[0].format.format(Some(3.14159)), "3.14 GJ");
    }
}
