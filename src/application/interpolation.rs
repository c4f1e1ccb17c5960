// Linear interpolation across runs of missing values
use crate::domain::log::{Field, MeasurementLog};

/// A run of logs missing the key field, bounded on both sides by known values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedRun {
    /// Index of the last known log before the run.
    pub before: usize,
    /// Index of the first known log after the run.
    pub after: usize,
}

impl BoundedRun {
    pub fn len(&self) -> usize {
        self.after - self.before - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn indices(&self) -> std::ops::Range<usize> {
        self.before + 1..self.after
    }

    /// Per-log increment of `field` across the run, if both bounds are known.
    pub fn step(&self, logs: &[MeasurementLog], field: Field) -> Option<f64> {
        let first = logs[self.before].get(field)?;
        let last = logs[self.after].get(field)?;
        Some((last - first) / (self.len() + 1) as f64)
    }
}

/// Finds the runs where `key` is missing between two known values.
///
/// Leading and trailing runs have no bound on one side and are not reported.
pub fn bounded_runs(logs: &[MeasurementLog], key: Field) -> Vec<BoundedRun> {
    let mut runs = Vec::new();
    let mut last_known: Option<usize> = None;
    for (index, log) in logs.iter().enumerate() {
        if log.get(key).is_none() {
            continue;
        }
        if let Some(before) = last_known {
            if index > before + 1 {
                runs.push(BoundedRun { before, after: index });
            }
        }
        last_known = Some(index);
    }
    runs
}

/// Fills `field` across the run with evenly spaced values and tags the
/// filled logs as interpolated. `shape` post-processes each value.
pub fn fill_run(
    logs: &mut [MeasurementLog],
    run: BoundedRun,
    field: Field,
    step: f64,
    shape: impl Fn(f64) -> f64,
) {
    let Some(start) = logs[run.before].get(field) else {
        return;
    };
    for (offset, index) in run.indices().enumerate() {
        let log = &mut logs[index];
        log.set(field, Some(shape(start + step * (offset + 1) as f64)));
        log.interpolated = true;
    }
}

/// Plain linear fill of a single field over all bounded runs.
pub fn interpolate_linear(logs: &mut [MeasurementLog], field: Field) {
    for run in bounded_runs(logs, field) {
        if let Some(step) = run.step(logs, field) {
            fill_run(logs, run, field, step, |v| v);
        }
    }
}
