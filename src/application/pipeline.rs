// Normalization pipeline: fix -> adjust -> interpolate -> gap fill -> aggregate -> series
use crate::application::aggregator::{aggregate, BucketBoundary, CalendarBuckets};
use crate::application::gap_filler::fill_gaps;
use crate::application::strategy::{ChannelStrategy, ChartContext, EnergyMode};
use crate::domain::channel::{ChannelConfig, ChannelType};
use crate::domain::error::ChartError;
use crate::domain::log::{MeasurementLog, RawLog};
use crate::domain::series::NormalizedSeries;

/// Per-request chart options.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChartRequest {
    pub buckets: Option<CalendarBuckets>,
    pub mode: EnergyMode,
    /// Nominal seconds between logs; the channel type's default when unset.
    pub expected_interval: Option<i64>,
}

/// Rejects input that is not strictly ascending by timestamp.
pub fn ensure_sorted(logs: &[RawLog]) -> Result<(), ChartError> {
    for (index, pair) in logs.windows(2).enumerate() {
        let (previous, current) = (pair[0].timestamp, pair[1].timestamp);
        if current == previous {
            tracing::warn!(index = index + 1, timestamp = current, "duplicate log timestamp");
            return Err(ChartError::DuplicateTimestamp {
                index: index + 1,
                timestamp: current,
            });
        }
        if current < previous {
            tracing::warn!(index = index + 1, previous, current, "logs out of order");
            return Err(ChartError::UnsortedLogs {
                index: index + 1,
                previous,
                current,
            });
        }
    }
    Ok(())
}

/// Pipeline bound to one channel's configuration and strategy.
pub struct Pipeline<'a> {
    config: &'a ChannelConfig,
    channel_type: ChannelType,
    strategy: &'static dyn ChannelStrategy,
}

impl<'a> Pipeline<'a> {
    /// Fails for measurement types without a strategy; there is no fallback.
    pub fn for_channel(config: &'a ChannelConfig) -> Result<Self, ChartError> {
        let channel_type = config.channel_type()?;
        Ok(Self {
            config,
            channel_type,
            strategy: channel_type.strategy(),
        })
    }

    /// Fix, adjust, interpolate and gap-fill the raw logs.
    pub fn normalize(
        &self,
        raw: &[RawLog],
        expected_interval: i64,
    ) -> Result<Vec<MeasurementLog>, ChartError> {
        ensure_sorted(raw)?;
        if raw.is_empty() {
            return Ok(Vec::new());
        }

        let fixed: Vec<MeasurementLog> = raw.iter().map(|log| self.strategy.fix_log(log)).collect();
        let adjusted = self.strategy.adjust_logs(fixed, self.config);
        let interpolated = self.strategy.interpolate_gaps(adjusted, self.config);
        Ok(fill_gaps(
            interpolated,
            expected_interval,
            &self.strategy.empty_log(),
        ))
    }

    /// Folds normalized logs into the caller's buckets.
    pub fn aggregate_with(
        &self,
        logs: &[MeasurementLog],
        boundary: &dyn BucketBoundary,
    ) -> Vec<MeasurementLog> {
        aggregate(logs, boundary, self.strategy)
    }

    /// Projects (possibly aggregated) logs onto series, axes and annotations.
    pub fn chart(&self, logs: &[MeasurementLog], mode: EnergyMode) -> NormalizedSeries {
        if logs.is_empty() {
            return NormalizedSeries::empty();
        }
        let ctx = ChartContext {
            config: self.config,
            channel_type: self.channel_type,
            mode,
        };
        NormalizedSeries::new(
            self.strategy.series(logs, &ctx),
            self.strategy.y_axes(logs, &ctx),
            self.strategy.annotations(logs),
        )
    }

    pub fn run(&self, raw: &[RawLog], request: &ChartRequest) -> Result<NormalizedSeries, ChartError> {
        let interval = request
            .expected_interval
            .unwrap_or_else(|| self.channel_type.default_interval());
        let normalized = self.normalize(raw, interval)?;
        if normalized.is_empty() {
            return Ok(NormalizedSeries::empty());
        }

        let logs = match &request.buckets {
            Some(buckets) => self.aggregate_with(&normalized, buckets),
            None => normalized,
        };

        let chart = self.chart(&logs, request.mode);
        tracing::info!(
            function = %self.config.function,
            raw = raw.len(),
            points = logs.len(),
            resets = chart.annotations.len(),
            aggregated = request.buckets.is_some(),
            "normalized channel logs"
        );
        Ok(chart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::aggregator::Aggregation;
    use crate::domain::channel::CounterType;
    use crate::domain::label::Label;
    use crate::domain::log::Field;
    use crate::domain::series::SeriesKind;
    use serde_json::Value;

    fn raw_values(field: &str, values: &[(i64, Option<f64>)]) -> Vec<RawLog> {
        values
            .iter()
            .map(|(t, v)| RawLog::new(*t).with(field, *v))
            .collect()
    }

    #[test]
    fn test_rejects_unsorted_and_duplicate_input() {
        let config = ChannelConfig::new("THERMOMETER");
        let pipeline = Pipeline::for_channel(&config).unwrap();

        let unsorted = raw_values("temperature", &[(0, Some(1.0)), (600, Some(2.0)), (300, Some(3.0))]);
        let err = pipeline.run(&unsorted, &ChartRequest::default()).unwrap_err();
        assert!(matches!(err, ChartError::UnsortedLogs { index: 2, previous: 600, current: 300 }));
        assert!(err.is_invalid_input());

        let duplicate = raw_values("temperature", &[(0, Some(1.0)), (0, Some(2.0))]);
        let err = pipeline.run(&duplicate, &ChartRequest::default()).unwrap_err();
        assert!(matches!(err, ChartError::DuplicateTimestamp { index: 1, timestamp: 0 }));
    }

    #[test]
    fn test_unknown_channel_type_has_no_fallback() {
        let config = ChannelConfig::new("WEATHER_STATION");
        assert!(matches!(
            Pipeline::for_channel(&config),
            Err(ChartError::UnknownChannelType(_))
        ));
    }

    #[test]
    fn test_empty_input_gives_empty_series() {
        let config = ChannelConfig::new("ELECTRICITYMETER");
        let pipeline = Pipeline::for_channel(&config).unwrap();
        let chart = pipeline.run(&[], &ChartRequest::default()).unwrap();
        assert!(chart.is_empty());
        assert!(chart.y_axes.is_empty());
    }

    #[test]
    fn test_linear_fill_round_trip() {
        // Per-interval values as they leave the adjust step
        let config = ChannelConfig {
            fill_missing_data: true,
            ..ChannelConfig::new("GENERAL_PURPOSE_METER")
        };
        let pipeline = Pipeline::for_channel(&config).unwrap();
        let raw = raw_values("value", &[(0, None), (60, Some(5.0)), (120, None), (180, Some(15.0))]);

        let fixed: Vec<MeasurementLog> = raw.iter().map(|log| pipeline.strategy.fix_log(log)).collect();
        let interpolated = pipeline.strategy.interpolate_gaps(fixed, &config);
        let logs = fill_gaps(interpolated, 60, &pipeline.strategy.empty_log());

        let values: Vec<_> = logs.iter().map(|l| l.get(Field::Value)).collect();
        assert_eq!(values, vec![None, Some(5.0), Some(10.0), Some(15.0)]);
        assert!(logs[2].interpolated);
        assert!(!logs[1].interpolated);
    }

    #[test]
    fn test_meter_without_counter_type_charts_differences() {
        let config = ChannelConfig::new("GENERAL_PURPOSE_METER");
        let pipeline = Pipeline::for_channel(&config).unwrap();
        let raw = raw_values("value", &[(0, Some(100.0)), (600, Some(130.0)), (1200, Some(160.0))]);

        let chart = pipeline.run(&raw, &ChartRequest::default()).unwrap();
        assert_eq!(chart.series[0].values(), vec![None, Some(30.0), Some(30.0)]);
        assert!(chart.annotations.is_empty());
    }

    #[test]
    fn test_gap_placeholders_follow_interpolation() {
        let config = ChannelConfig::new("THERMOMETER");
        let pipeline = Pipeline::for_channel(&config).unwrap();
        let raw = raw_values("temperature", &[(0, Some(20.0)), (1800, Some(21.0))]);

        let logs = pipeline.normalize(&raw, 600).unwrap();
        let timestamps: Vec<_> = logs.iter().map(|l| l.timestamp).collect();
        assert_eq!(timestamps, vec![0, 600, 1200, 1800]);
        assert_eq!(logs[1].get(Field::Temperature), None);
        assert!(logs[1].interpolated && logs[2].interpolated);
    }

    #[test]
    fn test_counter_channel_end_to_end_with_reset() {
        let config = ChannelConfig {
            counter_type: Some(CounterType::AlwaysIncrement),
            ..ChannelConfig::new("GENERAL_PURPOSE_METER")
        };
        let pipeline = Pipeline::for_channel(&config).unwrap();
        let raw = raw_values("value", &[(0, Some(100.0)), (600, Some(150.0)), (1200, Some(5.0))]);

        let chart = pipeline.run(&raw, &ChartRequest::default()).unwrap();
        assert_eq!(chart.series[0].values(), vec![None, Some(50.0), None]);
        assert_eq!(chart.annotations.len(), 1);
        assert_eq!(chart.annotations[0].x, 1_200_000);
    }

    #[test]
    fn test_electricity_meter_reset_scenario() {
        let config = ChannelConfig::new("ELECTRICITYMETER");
        let pipeline = Pipeline::for_channel(&config).unwrap();
        let raw = raw_values(
            "phase1_fae",
            &[(0, Some(100_000_000.0)), (600, Some(150_000_000.0)), (1200, Some(30_000_000.0))],
        );

        let chart = pipeline.run(&raw, &ChartRequest::default()).unwrap();
        assert_eq!(chart.series.len(), 3);
        assert_eq!(chart.series[0].name, Label::Key("Phase 1"));
        assert_eq!(chart.series[0].values(), vec![None, Some(500.0), Some(300.0)]);
        assert_eq!(chart.annotations.len(), 1);
        assert_eq!(chart.annotations[0].x, 1_200_000);
    }

    #[test]
    fn test_daily_aggregation_of_impulse_counter() {
        let config = ChannelConfig::new("IC_WATERMETER");
        let pipeline = Pipeline::for_channel(&config).unwrap();
        let raw: Vec<RawLog> = (0..6)
            .map(|i| {
                RawLog::new(i * 43_200)
                    .with("counter", i * 1000)
                    .with("calculated_value", Value::from(i as f64))
            })
            .collect();
        let request = ChartRequest {
            buckets: Some(CalendarBuckets::utc(Aggregation::Day)),
            expected_interval: Some(43_200),
            ..ChartRequest::default()
        };

        let chart = pipeline.run(&raw, &request).unwrap();
        assert_eq!(chart.series[0].kind, SeriesKind::Bar);
        assert_eq!(chart.series[0].values(), vec![Some(1.0), Some(2.0), Some(2.0)]);
        assert_eq!(chart.y_axes[0].format.suffix, " m³");
    }
}
