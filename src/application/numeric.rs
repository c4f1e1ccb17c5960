// Shared numeric helpers for the channel strategies
use crate::domain::log::{Field, MeasurementLog};

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Present values of a field across a bucket, in log order.
pub fn present(logs: &[MeasurementLog], field: Field) -> Vec<f64> {
    logs.iter().filter_map(|log| log.get(field)).collect()
}

/// Mean of the values; `None` for an empty set rather than NaN.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let avg = values.iter().sum::<f64>() / values.len() as f64;
    avg.is_finite().then_some(avg)
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Sum of the present values of a field, `None` when nothing is present.
pub fn sum_present(logs: &[MeasurementLog], field: Field) -> Option<f64> {
    logs.iter()
        .filter_map(|log| log.get(field))
        .reduce(|a, b| a + b)
}

/// Upper bound for an energy axis: the maximum rounded up to a "nice" value.
///
/// Small maxima get up to three extra decimals; the bound is then halved or
/// divided by five while it still covers the maximum.
pub fn rounded_axis_max(max: f64) -> Option<f64> {
    if !max.is_finite() || max <= 0.0 {
        return None;
    }
    let mut round_level = 1;
    while round_level < 4 && max * 10f64.powi(round_level) < 1.0 {
        round_level += 1;
    }
    let scale = 10f64.powi(round_level - 1);
    let mut rounded = (max * scale).ceil() / scale;
    if rounded / 5.0 > max {
        rounded /= 5.0;
    } else if rounded / 2.0 > max {
        rounded /= 2.0;
    }
    Some(rounded)
}
