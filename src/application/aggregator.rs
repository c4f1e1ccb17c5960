// Time-bucket aggregation for coarser chart granularity
use crate::application::strategy::ChannelStrategy;
use crate::domain::error::ChartError;
use crate::domain::log::MeasurementLog;
use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveDateTime, Offset, Timelike, Utc};
use std::str::FromStr;

/// Maps a timestamp to the start of the bucket containing it.
///
/// Implementations must be monotonic: a later timestamp never maps to an
/// earlier bucket.
pub trait BucketBoundary: Send + Sync {
    fn bucket_start(&self, timestamp: i64) -> i64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Hour,
    Day,
    /// ISO week starting on Monday.
    Week,
    Month,
    Year,
}

impl FromStr for Aggregation {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hour" => Ok(Aggregation::Hour),
            "day" => Ok(Aggregation::Day),
            "week" => Ok(Aggregation::Week),
            "month" => Ok(Aggregation::Month),
            "year" => Ok(Aggregation::Year),
            other => Err(ChartError::UnknownAggregation(other.to_string())),
        }
    }
}

/// Calendar-aligned buckets in a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarBuckets {
    pub aggregation: Aggregation,
    pub offset: FixedOffset,
}

impl CalendarBuckets {
    pub fn new(aggregation: Aggregation, offset: FixedOffset) -> Self {
        Self {
            aggregation,
            offset,
        }
    }

    pub fn utc(aggregation: Aggregation) -> Self {
        Self::new(aggregation, Utc.fix())
    }

    fn start_of(&self, local: NaiveDateTime) -> Option<NaiveDateTime> {
        let date = local.date();
        let start = match self.aggregation {
            Aggregation::Hour => return date.and_hms_opt(local.hour(), 0, 0),
            Aggregation::Day => date,
            Aggregation::Week => {
                date.checked_sub_days(Days::new(date.weekday().num_days_from_monday() as u64))?
            }
            Aggregation::Month => date.with_day(1)?,
            Aggregation::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1)?,
        };
        start.and_hms_opt(0, 0, 0)
    }
}

impl BucketBoundary for CalendarBuckets {
    fn bucket_start(&self, timestamp: i64) -> i64 {
        DateTime::from_timestamp(timestamp, 0)
            .map(|utc| utc.with_timezone(&self.offset).naive_local())
            .and_then(|local| self.start_of(local))
            .and_then(|start| start.and_local_timezone(self.offset).single())
            .map(|start| start.timestamp())
            .unwrap_or(timestamp)
    }
}

/// Folds consecutive logs sharing a bucket through the strategy.
///
/// Buckets made only of blank logs (gap placeholders, empty readings) are
/// dropped instead of producing an all-null aggregate.
pub fn aggregate(
    logs: &[MeasurementLog],
    boundary: &dyn BucketBoundary,
    strategy: &dyn ChannelStrategy,
) -> Vec<MeasurementLog> {
    logs.chunk_by(|a, b| boundary.bucket_start(a.timestamp) == boundary.bucket_start(b.timestamp))
        .filter(|bucket| bucket.iter().any(|log| !log.is_blank()))
        .map(|bucket| strategy.aggregate_logs(bucket))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::strategies::general_purpose_meter::GeneralPurposeMeter;
    use crate::domain::log::Field;
    use chrono::TimeZone;

    fn ts(y: i32, m: u32, d: u32, h: u32) -> i64 {
        chrono::Utc
            .with_ymd_and_hms(y, m, d, h, 17, 5)
            .unwrap()
            .timestamp()
    }

    fn midnight(y: i32, m: u32, d: u32) -> i64 {
        chrono::Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap().timestamp()
    }

    #[test]
    fn test_calendar_boundaries_utc() {
        let t = ts(2024, 5, 16, 13);
        assert_eq!(CalendarBuckets::utc(Aggregation::Hour).bucket_start(t), t - 17 * 60 - 5);
        assert_eq!(CalendarBuckets::utc(Aggregation::Day).bucket_start(t), midnight(2024, 5, 16));
        assert_eq!(CalendarBuckets::utc(Aggregation::Week).bucket_start(t), midnight(2024, 5, 13));
        assert_eq!(CalendarBuckets::utc(Aggregation::Month).bucket_start(t), midnight(2024, 5, 1));
        assert_eq!(CalendarBuckets::utc(Aggregation::Year).bucket_start(t), midnight(2024, 1, 1));
    }

    #[test]
    fn test_day_boundary_in_local_offset() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let buckets = CalendarBuckets::new(Aggregation::Day, offset);
        // 23:30 UTC is already the next day at UTC+2
        let t = chrono::Utc.with_ymd_and_hms(2024, 5, 16, 23, 30, 0).unwrap().timestamp();
        assert_eq!(buckets.bucket_start(t), midnight(2024, 5, 16) + 22 * 3600);
    }

    #[test]
    fn test_parse_aggregation() {
        assert_eq!("week".parse::<Aggregation>().unwrap(), Aggregation::Week);
        assert!(matches!(
            "fortnight".parse::<Aggregation>(),
            Err(ChartError::UnknownAggregation(_))
        ));
    }

    fn deltas(values: &[(i64, Option<f64>)]) -> Vec<MeasurementLog> {
        values
            .iter()
            .map(|(t, v)| MeasurementLog::new(*t).with(Field::Value, *v))
            .collect()
    }

    #[test]
    fn test_empty_and_placeholder_buckets_are_omitted() {
        let day = 86_400;
        let logs = deltas(&[(0, Some(1.0)), (3600, Some(2.0)), (day, None), (3 * day, Some(4.0))]);
        let aggregated = aggregate(&logs, &CalendarBuckets::utc(Aggregation::Day), &GeneralPurposeMeter);

        let summary: Vec<_> = aggregated.iter().map(|l| (l.timestamp, l.get(Field::Value))).collect();
        assert_eq!(summary, vec![(0, Some(3.0)), (3 * day, Some(4.0))]);
    }

    #[test]
    fn test_bucket_sums_add_up_to_whole_range() {
        let logs = deltas(
            &(0..48)
                .map(|h| (h * 3600, Some((h % 7) as f64)))
                .collect::<Vec<_>>(),
        );
        let hourly = aggregate(&logs, &CalendarBuckets::utc(Aggregation::Hour), &GeneralPurposeMeter);
        let daily = aggregate(&logs, &CalendarBuckets::utc(Aggregation::Day), &GeneralPurposeMeter);
        let yearly = aggregate(&logs, &CalendarBuckets::utc(Aggregation::Year), &GeneralPurposeMeter);

        let total = |logs: &[MeasurementLog]| -> f64 { logs.iter().filter_map(|l| l.get(Field::Value)).sum() };
        assert_eq!(hourly.len(), 48);
        assert_eq!(daily.len(), 2);
        assert_eq!(yearly.len(), 1);
        assert_eq!(total(&hourly), total(&yearly));
        assert_eq!(total(&daily), total(&yearly));
    }
}
