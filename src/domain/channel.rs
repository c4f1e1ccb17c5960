// Channel configuration domain model
use super::error::ChartError;
use super::log::Phase;
use serde::Deserialize;
use std::str::FromStr;

/// Measurement type of a channel; selects the normalization strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelType {
    Thermometer,
    Humidity,
    HumidityAndTemperature,
    IcGasMeter,
    IcWaterMeter,
    IcHeatMeter,
    IcElectricityMeter,
    ElectricityMeter,
    GeneralPurposeMeasurement,
    GeneralPurposeMeter,
}

impl ChannelType {
    /// Nominal seconds between two logs of this type.
    pub fn default_interval(self) -> i64 {
        600
    }

    /// Unit shown when the channel configuration does not name one.
    pub fn default_unit(self) -> Option<&'static str> {
        match self {
            ChannelType::IcGasMeter | ChannelType::IcWaterMeter => Some("m³"),
            ChannelType::IcHeatMeter => Some("GJ"),
            ChannelType::IcElectricityMeter | ChannelType::ElectricityMeter => Some("kWh"),
            _ => None,
        }
    }
}

impl FromStr for ChannelType {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "THERMOMETER" => Ok(ChannelType::Thermometer),
            "HUMIDITY" => Ok(ChannelType::Humidity),
            "HUMIDITYANDTEMPERATURE" => Ok(ChannelType::HumidityAndTemperature),
            "IC_GASMETER" => Ok(ChannelType::IcGasMeter),
            "IC_WATERMETER" => Ok(ChannelType::IcWaterMeter),
            "IC_HEATMETER" => Ok(ChannelType::IcHeatMeter),
            "IC_ELECTRICITYMETER" => Ok(ChannelType::IcElectricityMeter),
            "ELECTRICITYMETER" => Ok(ChannelType::ElectricityMeter),
            "GENERAL_PURPOSE_MEASUREMENT" => Ok(ChannelType::GeneralPurposeMeasurement),
            "GENERAL_PURPOSE_METER" => Ok(ChannelType::GeneralPurposeMeter),
            other => Err(ChartError::UnknownChannelType(other.to_string())),
        }
    }
}

/// Counter semantics of a meter channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CounterType {
    AlwaysIncrement,
    AlwaysDecrement,
    IncrementAndDecrement,
}

/// Chart shape hint of general purpose channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChartShape {
    Candle,
    Linear,
}

/// Value formatting settings of general purpose channels.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GpValueFormat {
    #[serde(default)]
    pub value_precision: Option<u32>,
    #[serde(default)]
    pub unit_before_value: String,
    #[serde(default)]
    pub unit_after_value: String,
    #[serde(default)]
    pub no_space_before_value: bool,
    #[serde(default)]
    pub no_space_after_value: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChannelConfig {
    /// Measurement type identifier, e.g. `THERMOMETER` or `IC_GASMETER`.
    pub function: String,
    #[serde(default)]
    pub counter_type: Option<CounterType>,
    #[serde(default)]
    pub chart_type: Option<ChartShape>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub price_per_unit: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub fill_missing_data: bool,
    #[serde(default = "all_phases")]
    pub enabled_phases: Vec<u8>,
    #[serde(flatten)]
    pub value_format: GpValueFormat,
}

fn all_phases() -> Vec<u8> {
    vec![1, 2, 3]
}

impl ChannelConfig {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            counter_type: None,
            chart_type: None,
            unit: None,
            price_per_unit: None,
            currency: None,
            fill_missing_data: false,
            enabled_phases: all_phases(),
            value_format: GpValueFormat::default(),
        }
    }

    pub fn channel_type(&self) -> Result<ChannelType, ChartError> {
        self.function.parse()
    }

    /// Enabled phases in configuration order; invalid numbers are ignored.
    pub fn phases(&self) -> Vec<Phase> {
        let phases: Vec<Phase> = self
            .enabled_phases
            .iter()
            .filter_map(|n| Phase::from_number(*n))
            .collect();
        if phases.is_empty() {
            Phase::ALL.to_vec()
        } else {
            phases
        }
    }

    pub fn unit_or_default(&self, channel_type: ChannelType) -> Option<String> {
        self.unit
            .clone()
            .or_else(|| channel_type.default_unit().map(str::to_string))
    }
}
