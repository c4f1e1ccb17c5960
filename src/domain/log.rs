// Measurement log domain models
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Phase of a three-phase electricity meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    L1,
    L2,
    L3,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::L1, Phase::L2, Phase::L3];

    pub fn number(self) -> u8 {
        match self {
            Phase::L1 => 1,
            Phase::L2 => 2,
            Phase::L3 => 3,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Phase::L1),
            2 => Some(Phase::L2),
            3 => Some(Phase::L3),
            _ => None,
        }
    }
}

/// Energy register of an electricity meter phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnergyKind {
    /// Forward active energy
    Fae,
    /// Reverse active energy
    Rae,
    /// Forward reactive energy
    Fre,
    /// Reverse reactive energy
    Rre,
}

impl EnergyKind {
    pub const ALL: [EnergyKind; 4] = [
        EnergyKind::Fae,
        EnergyKind::Rae,
        EnergyKind::Fre,
        EnergyKind::Rre,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EnergyKind::Fae => "fae",
            EnergyKind::Rae => "rae",
            EnergyKind::Fre => "fre",
            EnergyKind::Rre => "rre",
        }
    }

    pub fn is_reactive(self) -> bool {
        matches!(self, EnergyKind::Fre | EnergyKind::Rre)
    }
}

/// Named numeric field of a measurement log.
///
/// The set of fields present on a log depends on the channel's measurement
/// type; aggregation adds the statistical ones (`Min`, `Max`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Temperature,
    Humidity,
    Min,
    Max,
    MinTemperature,
    MaxTemperature,
    MinHumidity,
    MaxHumidity,
    Counter,
    CalculatedValue,
    Value,
    AvgValue,
    MinValue,
    MaxValue,
    OpenValue,
    CloseValue,
    Energy(Phase, EnergyKind),
    FaeTotal,
    RaeTotal,
    FaeRaeBalance,
    FaeBalanced,
    RaeBalanced,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Temperature => "temperature",
            Field::Humidity => "humidity",
            Field::Min => "min",
            Field::Max => "max",
            Field::MinTemperature => "minTemperature",
            Field::MaxTemperature => "maxTemperature",
            Field::MinHumidity => "minHumidity",
            Field::MaxHumidity => "maxHumidity",
            Field::Counter => "counter",
            Field::CalculatedValue => "calculated_value",
            Field::Value => "value",
            Field::AvgValue => "avg_value",
            Field::MinValue => "min_value",
            Field::MaxValue => "max_value",
            Field::OpenValue => "open_value",
            Field::CloseValue => "close_value",
            Field::Energy(phase, kind) => {
                return write!(f, "phase{}_{}", phase.number(), kind.as_str());
            }
            Field::FaeTotal => "fae_total",
            Field::RaeTotal => "rae_total",
            Field::FaeRaeBalance => "fae_rae_balance",
            Field::FaeBalanced => "fae_balanced",
            Field::RaeBalanced => "rae_balanced",
        };
        f.write_str(name)
    }
}

/// One sample as delivered by the log source, before any sanitation.
///
/// Field values are kept as raw JSON: the log API sends decimals both as
/// numbers and as strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawLog {
    #[serde(
        rename = "date_timestamp",
        alias = "timestamp",
        deserialize_with = "lenient_timestamp"
    )]
    pub timestamp: i64,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl RawLog {
    pub fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            fields: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Numeric value of a raw field; anything unparsable counts as missing.
    pub fn number(&self, field: Field) -> Option<f64> {
        self.fields
            .get(&field.to_string())
            .and_then(parse_number)
    }
}

fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp {}", n))),
        Value::String(s) => i64::from_str(s.trim())
            .map_err(|e| serde::de::Error::custom(format!("invalid timestamp {:?}: {}", s, e))),
        other => Err(serde::de::Error::custom(format!(
            "invalid timestamp {}",
            other
        ))),
    }
}

/// A log after `fix` (and later `adjust`) ran over it.
///
/// For counter-based channels the counter fields hold per-interval deltas once
/// the log went through adjustment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementLog {
    pub timestamp: i64,
    values: BTreeMap<Field, Option<f64>>,
    pub counter_reset: bool,
    pub interpolated: bool,
}

impl MeasurementLog {
    pub fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            ..Self::default()
        }
    }

    pub fn with(mut self, field: Field, value: Option<f64>) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: Field) -> Option<f64> {
        self.values.get(&field).copied().flatten()
    }

    /// Whether the field is part of this log at all (possibly as `null`).
    pub fn has(&self, field: Field) -> bool {
        self.values.contains_key(&field)
    }

    pub fn set(&mut self, field: Field, value: Option<f64>) {
        self.values.insert(field, value.filter(|v| v.is_finite()));
    }

    /// True when no field carries a value.
    pub fn is_blank(&self) -> bool {
        self.values.values().all(Option::is_none)
    }

    /// Copy of this log moved to another timestamp, flags cleared.
    pub fn at(&self, timestamp: i64) -> Self {
        Self {
            timestamp,
            values: self.values.clone(),
            counter_reset: false,
            interpolated: false,
        }
    }
}
