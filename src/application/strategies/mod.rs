// One strategy per measurement type family
pub mod electricity_meter;
pub mod general_purpose_measurement;
pub mod general_purpose_meter;
pub mod humidity;
pub mod humidity_and_temperature;
pub mod impulse_counter;
pub mod thermometer;

use crate::domain::log::{Field, MeasurementLog};
use crate::domain::series::SeriesPoint;

/// Lowest physically possible temperature reading.
pub(crate) const ABSOLUTE_ZERO: f64 = -273.0;

/// Line points of one field across the logs.
pub(crate) fn field_points(logs: &[MeasurementLog], field: Field) -> Vec<SeriesPoint> {
    logs.iter()
        .map(|log| SeriesPoint::single(log.timestamp, log.get(field), log.interpolated))
        .collect()
}

/// Range points `[low, high]`, skipping logs without a complete range.
pub(crate) fn range_points(logs: &[MeasurementLog], low: Field, high: Field) -> Vec<SeriesPoint> {
    logs.iter()
        .filter_map(|log| {
            let range = [log.get(low)?, log.get(high)?];
            Some(SeriesPoint::new(
                log.timestamp,
                crate::domain::series::PointValue::Range(range),
                log.interpolated,
            ))
        })
        .collect()
}

/// Aggregated logs carry the statistical `low` field; raw ones don't.
pub(crate) fn is_aggregated(logs: &[MeasurementLog], low: Field) -> bool {
    logs.first().is_some_and(|log| log.has(low))
}
