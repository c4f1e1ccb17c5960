// Per-measurement-type normalization strategies
use crate::application::strategies::{
    electricity_meter::ElectricityMeter, general_purpose_measurement::GeneralPurposeMeasurement,
    general_purpose_meter::GeneralPurposeMeter, humidity::Humidity,
    humidity_and_temperature::HumidityAndTemperature, impulse_counter::ImpulseCounter,
    thermometer::Thermometer,
};
use crate::domain::channel::{ChannelConfig, ChannelType};
use crate::domain::error::ChartError;
use crate::domain::label::Label;
use crate::domain::log::{EnergyKind, MeasurementLog, RawLog};
use crate::domain::series::{Annotation, AxisDescriptor, Series};
use std::str::FromStr;

pub const COUNTER_RESET_LABEL: &str = "Counter reset";

/// What an electricity meter chart shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EnergyMode {
    #[default]
    Fae,
    Rae,
    Fre,
    Rre,
    /// Forward and reverse active energy split around their arithmetic balance.
    FaeRae,
    /// Same split, from the vector-balanced registers.
    FaeRaeVector,
}

impl EnergyMode {
    /// The per-phase register shown, `None` for the balance modes.
    pub fn energy_kind(self) -> Option<EnergyKind> {
        match self {
            EnergyMode::Fae => Some(EnergyKind::Fae),
            EnergyMode::Rae => Some(EnergyKind::Rae),
            EnergyMode::Fre => Some(EnergyKind::Fre),
            EnergyMode::Rre => Some(EnergyKind::Rre),
            EnergyMode::FaeRae | EnergyMode::FaeRaeVector => None,
        }
    }
}

impl FromStr for EnergyMode {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fae" => Ok(EnergyMode::Fae),
            "rae" => Ok(EnergyMode::Rae),
            "fre" => Ok(EnergyMode::Fre),
            "rre" => Ok(EnergyMode::Rre),
            "fae_rae" => Ok(EnergyMode::FaeRae),
            "fae_rae_vector" => Ok(EnergyMode::FaeRaeVector),
            other => Err(ChartError::UnknownChartMode(other.to_string())),
        }
    }
}

/// Everything `series` and `y_axes` may depend on besides the logs.
#[derive(Debug, Clone, Copy)]
pub struct ChartContext<'a> {
    pub config: &'a ChannelConfig,
    pub channel_type: ChannelType,
    pub mode: EnergyMode,
}

/// Capability set every measurement type implements.
///
/// Strategies hold no state between calls; the scan state of `adjust_logs`
/// and `interpolate_gaps` lives inside the call.
pub trait ChannelStrategy: Send + Sync {
    /// Sanitizes one record; invalid fields become null, the record survives.
    fn fix_log(&self, raw: &RawLog) -> MeasurementLog;

    /// Turns absolute counter readings into per-interval deltas.
    fn adjust_logs(&self, logs: Vec<MeasurementLog>, _config: &ChannelConfig) -> Vec<MeasurementLog> {
        logs
    }

    /// Fills null runs bounded by two known values.
    fn interpolate_gaps(
        &self,
        logs: Vec<MeasurementLog>,
        _config: &ChannelConfig,
    ) -> Vec<MeasurementLog> {
        logs
    }

    /// Folds the logs of one time bucket into a single log. `bucket` is never empty.
    fn aggregate_logs(&self, bucket: &[MeasurementLog]) -> MeasurementLog;

    fn series(&self, logs: &[MeasurementLog], ctx: &ChartContext<'_>) -> Vec<Series>;

    fn y_axes(&self, logs: &[MeasurementLog], ctx: &ChartContext<'_>) -> Vec<AxisDescriptor>;

    fn annotations(&self, _logs: &[MeasurementLog]) -> Vec<Annotation> {
        Vec::new()
    }

    /// Null-valued template for placeholders and aggregates.
    fn empty_log(&self) -> MeasurementLog;
}

/// One marker per log flagged as a counter reset.
pub fn counter_reset_annotations(logs: &[MeasurementLog]) -> Vec<Annotation> {
    logs.iter()
        .filter(|log| log.counter_reset)
        .map(|log| Annotation {
            x: log.timestamp * 1000,
            label: Label::Key(COUNTER_RESET_LABEL),
        })
        .collect()
}

static THERMOMETER: Thermometer = Thermometer;
static HUMIDITY: Humidity = Humidity;
static HUMIDITY_AND_TEMPERATURE: HumidityAndTemperature = HumidityAndTemperature;
static IMPULSE_COUNTER: ImpulseCounter = ImpulseCounter;
static ELECTRICITY_METER: ElectricityMeter = ElectricityMeter;
static GENERAL_PURPOSE_MEASUREMENT: GeneralPurposeMeasurement = GeneralPurposeMeasurement;
static GENERAL_PURPOSE_METER: GeneralPurposeMeter = GeneralPurposeMeter;

impl ChannelType {
    pub fn strategy(self) -> &'static dyn ChannelStrategy {
        match self {
            ChannelType::Thermometer => &THERMOMETER,
            ChannelType::Humidity => &HUMIDITY,
            ChannelType::HumidityAndTemperature => &HUMIDITY_AND_TEMPERATURE,
            ChannelType::IcGasMeter
            | ChannelType::IcWaterMeter
            | ChannelType::IcHeatMeter
            | ChannelType::IcElectricityMeter => &IMPULSE_COUNTER,
            ChannelType::ElectricityMeter => &ELECTRICITY_METER,
            ChannelType::GeneralPurposeMeasurement => &GENERAL_PURPOSE_MEASUREMENT,
            ChannelType::GeneralPurposeMeter => &GENERAL_PURPOSE_METER,
        }
    }
}
