// Placeholder insertion for missing sampling intervals
use crate::domain::log::MeasurementLog;

/// A gap longer than this many expected intervals gets placeholders.
pub const GAP_TOLERANCE: f64 = 1.5;

/// Gaps needing more placeholders than this are left open.
pub const MAX_GAP_PLACEHOLDERS: i64 = 100_000;

/// Inserts a copy of `template` at every expected interval inside gaps
/// longer than [`GAP_TOLERANCE`] intervals.
///
/// Placeholders carry `interpolated = true` and whatever (normally null)
/// values the template has. Running it twice adds nothing the second time.
pub fn fill_gaps(
    logs: Vec<MeasurementLog>,
    expected_interval: i64,
    template: &MeasurementLog,
) -> Vec<MeasurementLog> {
    if logs.len() < 2 || expected_interval <= 0 {
        return logs;
    }

    let mut filled = Vec::with_capacity(logs.len());
    let mut inserted = 0usize;
    let mut last_timestamp: Option<i64> = None;
    for log in logs {
        if let Some(last) = last_timestamp {
            let gap = log.timestamp.saturating_sub(last);
            if gap as f64 > expected_interval as f64 * GAP_TOLERANCE {
                let needed = (gap - 1) / expected_interval;
                if needed > MAX_GAP_PLACEHOLDERS {
                    tracing::warn!(from = last, to = log.timestamp, needed, "gap too long to fill");
                } else {
                    let mut missing = last.checked_add(expected_interval);
                    while let Some(timestamp) = missing.filter(|t| *t < log.timestamp) {
                        let mut placeholder = template.at(timestamp);
                        placeholder.interpolated = true;
                        filled.push(placeholder);
                        inserted += 1;
                        missing = timestamp.checked_add(expected_interval);
                    }
                }
            }
        }
        last_timestamp = Some(log.timestamp);
        filled.push(log);
    }

    if inserted > 0 {
        tracing::debug!(inserted, expected_interval, "inserted placeholder logs into gaps");
    }
    filled
}
