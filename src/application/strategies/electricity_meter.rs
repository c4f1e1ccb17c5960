// Three-phase electricity meter channels
use crate::application::counter::{CounterTracker, Direction};
use crate::application::interpolation::{bounded_runs, fill_run};
use crate::application::numeric::{max, round_to, rounded_axis_max, sum_present};
use crate::application::strategy::{
    counter_reset_annotations, ChannelStrategy, ChartContext, EnergyMode,
};
use crate::domain::channel::ChannelConfig;
use crate::domain::label::Label;
use crate::domain::log::{EnergyKind, Field, MeasurementLog, Phase, RawLog};
use crate::domain::series::{
    Annotation, AxisDescriptor, PriceFormat, Series, SeriesKind, SeriesPoint, ValueFormat,
};

/// Raw registers are reported in units of 0.00001 kWh (kvarh).
const RAW_ENERGY_SCALE: f64 = 0.00001;
const DEFAULT_CURRENCY: &str = "PLN";

pub struct ElectricityMeter;

/// Every counter register of the meter: 12 per-phase registers plus the two
/// vector-balanced ones.
fn registers() -> impl Iterator<Item = Field> {
    EnergyKind::ALL
        .into_iter()
        .flat_map(|kind| Phase::ALL.into_iter().map(move |phase| Field::Energy(phase, kind)))
        .chain([Field::FaeBalanced, Field::RaeBalanced])
}

/// Sum of one register over the three phases, ignoring missing ones.
fn phase_total(log: &MeasurementLog, kind: EnergyKind) -> Option<f64> {
    Phase::ALL
        .into_iter()
        .filter_map(|phase| log.get(Field::Energy(phase, kind)))
        .reduce(|a, b| a + b)
}

/// Recomputes `fae_total`, `rae_total` and their balance from the phases.
fn derive_totals(log: &mut MeasurementLog) {
    let fae = phase_total(log, EnergyKind::Fae).map(|v| round_to(v, 5));
    let rae = phase_total(log, EnergyKind::Rae).map(|v| round_to(v, 5));
    let balance = match (fae, rae) {
        (None, None) => None,
        _ => Some(round_to(fae.unwrap_or(0.0) - rae.unwrap_or(0.0), 5)),
    };
    log.set(Field::FaeTotal, fae);
    log.set(Field::RaeTotal, rae);
    log.set(Field::FaeRaeBalance, balance);
}

fn energy_label(kind: EnergyKind) -> &'static str {
    match kind {
        EnergyKind::Fae => "Forward active energy",
        EnergyKind::Rae => "Reverse active energy",
        EnergyKind::Fre => "Forward reactive energy",
        EnergyKind::Rre => "Reverse reactive energy",
    }
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::L1 => "Phase 1",
        Phase::L2 => "Phase 2",
        Phase::L3 => "Phase 3",
    }
}

/// Splits forward/reverse energy around their balance into four stacked
/// series: positive balance, rest of forward, negative balance, rest of reverse.
fn balance_series(
    logs: &[MeasurementLog],
    names: [&'static str; 4],
    parts: impl Fn(&MeasurementLog) -> Option<(f64, f64)>,
) -> Vec<Series> {
    let mut points: [Vec<SeriesPoint>; 4] = Default::default();
    for log in logs {
        let values = match parts(log) {
            Some((forward, reverse)) => {
                let balance = forward - reverse;
                let positive = balance.max(0.0);
                let negative = balance.min(0.0);
                [
                    Some(positive),
                    Some(forward - positive),
                    Some(negative),
                    Some(-reverse - negative),
                ]
            }
            None => [None; 4],
        };
        for (series, value) in points.iter_mut().zip(values) {
            series.push(SeriesPoint::single(log.timestamp, value, log.interpolated));
        }
    }
    names
        .into_iter()
        .zip(points)
        .map(|(name, points)| Series::new(Label::Key(name), SeriesKind::Bar, points))
        .collect()
}

impl ChannelStrategy for ElectricityMeter {
    fn fix_log(&self, raw: &RawLog) -> MeasurementLog {
        let mut log = MeasurementLog::new(raw.timestamp);
        for field in registers() {
            let value = raw
                .number(field)
                .map(|v| round_to(v * RAW_ENERGY_SCALE, 5));
            log.set(field, value);
        }
        derive_totals(&mut log);
        log
    }

    /// Every register is tracked on its own; a reset on any of them flags
    /// the whole record.
    fn adjust_logs(&self, logs: Vec<MeasurementLog>, _config: &ChannelConfig) -> Vec<MeasurementLog> {
        let mut trackers: Vec<(Field, CounterTracker)> = registers()
            .map(|field| (field, CounterTracker::new(Direction::Increment)))
            .collect();

        logs.into_iter()
            .map(|mut log| {
                for (field, tracker) in trackers.iter_mut() {
                    let step = tracker.observe(log.get(*field));
                    if step.is_reset() {
                        tracing::debug!(
                            timestamp = log.timestamp,
                            register = %field,
                            "electricity meter counter reset detected"
                        );
                        log.counter_reset = true;
                    }
                    log.set(*field, step.delta());
                }
                derive_totals(&mut log);
                log
            })
            .collect()
    }

    fn interpolate_gaps(
        &self,
        mut logs: Vec<MeasurementLog>,
        config: &ChannelConfig,
    ) -> Vec<MeasurementLog> {
        let key_phase = config.phases().first().copied().unwrap_or(Phase::L1);
        let key = Field::Energy(key_phase, EnergyKind::Fae);
        let runs = bounded_runs(&logs, key);
        for run in &runs {
            for field in registers() {
                if let Some(step) = run.step(&logs, field).filter(|s| *s >= 0.0) {
                    fill_run(&mut logs, *run, field, step, |v| v);
                }
            }
            for index in run.indices() {
                derive_totals(&mut logs[index]);
            }
        }
        logs
    }

    fn aggregate_logs(&self, bucket: &[MeasurementLog]) -> MeasurementLog {
        let mut log = self.empty_log().at(bucket[0].timestamp);
        for field in registers().chain([Field::FaeTotal, Field::RaeTotal, Field::FaeRaeBalance]) {
            log.set(field, sum_present(bucket, field));
        }
        log.counter_reset = bucket.iter().any(|l| l.counter_reset);
        log
    }

    fn series(&self, logs: &[MeasurementLog], ctx: &ChartContext<'_>) -> Vec<Series> {
        match ctx.mode.energy_kind() {
            Some(kind) => ctx
                .config
                .phases()
                .into_iter()
                .map(|phase| {
                    let points = logs
                        .iter()
                        .map(|log| {
                            SeriesPoint::single(
                                log.timestamp,
                                log.get(Field::Energy(phase, kind)),
                                log.interpolated,
                            )
                        })
                        .collect();
                    Series::new(Label::Key(phase_label(phase)), SeriesKind::Bar, points)
                })
                .collect(),
            None if ctx.mode == EnergyMode::FaeRaeVector => balance_series(
                logs,
                [
                    "Forward active energy balance",
                    "Forward active energy",
                    "Reverse active energy balance",
                    "Reverse active energy",
                ],
                |log| Some((log.get(Field::FaeBalanced)?, log.get(Field::RaeBalanced)?)),
            ),
            None => balance_series(
                logs,
                [
                    "Forward active energy",
                    "Forward active energy",
                    "Reverse active energy",
                    "Reverse active energy",
                ],
                |log| Some((log.get(Field::FaeTotal)?, log.get(Field::RaeTotal)?)),
            ),
        }
    }

    fn y_axes(&self, logs: &[MeasurementLog], ctx: &ChartContext<'_>) -> Vec<AxisDescriptor> {
        let kind = ctx.mode.energy_kind();
        let label = energy_label(kind.unwrap_or(EnergyKind::Fae));
        let unit = if kind.is_some_and(EnergyKind::is_reactive) {
            "kvarh"
        } else {
            "kWh"
        };

        let mut format = ValueFormat::new(5, "", format!(" {}", unit));
        if ctx.mode == EnergyMode::Fae {
            format.price = ctx.config.price_per_unit.map(|price_per_unit| PriceFormat {
                price_per_unit,
                currency: ctx
                    .config
                    .currency
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            });
        }

        let axis_max = kind.and_then(|kind| {
            let sums: Vec<f64> = logs
                .iter()
                .filter_map(|log| phase_total(log, kind))
                .filter(|sum| *sum > 0.0)
                .collect();
            max(&sums).and_then(rounded_axis_max)
        });

        vec![AxisDescriptor {
            max: axis_max,
            ..AxisDescriptor::new(Label::Key(label), format)
        }]
    }

    fn annotations(&self, logs: &[MeasurementLog]) -> Vec<Annotation> {
        counter_reset_annotations(logs)
    }

    fn empty_log(&self) -> MeasurementLog {
        let mut log = MeasurementLog::default();
        for field in registers() {
            log.set(field, None);
        }
        derive_totals(&mut log);
        log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::channel::ChannelType;

    const L1_FAE: Field = Field::Energy(Phase::L1, EnergyKind::Fae);
    const L2_FAE: Field = Field::Energy(Phase::L2, EnergyKind::Fae);
    const L1_RAE: Field = Field::Energy(Phase::L1, EnergyKind::Rae);

    fn ctx(config: &ChannelConfig, mode: EnergyMode) -> ChartContext<'_> {
        ChartContext {
            config,
            channel_type: ChannelType::ElectricityMeter,
            mode,
        }
    }

    fn readings(values: &[Option<f64>]) -> Vec<MeasurementLog> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let mut log = ElectricityMeter.empty_log().at(i as i64 * 600);
                log.set(L1_FAE, *v);
                log
            })
            .collect()
    }

    #[test]
    fn test_fix_scales_registers_and_derives_totals() {
        let raw = RawLog::new(0)
            .with("phase1_fae", "12345678")
            .with("phase2_fae", 100000)
            .with("phase1_rae", 50000)
            .with("phase3_rre", serde_json::Value::Null);
        let log = ElectricityMeter.fix_log(&raw);

        assert_eq!(log.get(L1_FAE), Some(123.45678));
        assert_eq!(log.get(L2_FAE), Some(1.0));
        assert_eq!(log.get(Field::FaeTotal), Some(124.45678));
        assert_eq!(log.get(Field::RaeTotal), Some(0.5));
        assert_eq!(log.get(Field::FaeRaeBalance), Some(123.95678));
        assert_eq!(log.get(Field::Energy(Phase::L3, EnergyKind::Rre)), None);
    }

    #[test]
    fn test_adjust_detects_reset_per_register() {
        let logs = ElectricityMeter.adjust_logs(
            readings(&[Some(1000.0), Some(1500.0), Some(300.0)]),
            &ChannelConfig::new("ELECTRICITYMETER"),
        );

        let deltas: Vec<_> = logs.iter().map(|l| l.get(L1_FAE)).collect();
        assert_eq!(deltas, vec![None, Some(500.0), Some(300.0)]);
        assert!(!logs[1].counter_reset);
        assert!(logs[2].counter_reset);
        assert_eq!(logs[1].get(Field::FaeTotal), Some(500.0));
        assert_eq!(ElectricityMeter.annotations(&logs).len(), 1);
    }

    #[test]
    fn test_reset_on_one_register_flags_record() {
        let mut logs = readings(&[Some(100.0), Some(110.0)]);
        logs[0].set(L1_RAE, Some(50.0));
        logs[1].set(L1_RAE, Some(1.0));
        let logs = ElectricityMeter.adjust_logs(logs, &ChannelConfig::new("ELECTRICITYMETER"));

        assert_eq!(logs[1].get(L1_FAE), Some(10.0));
        assert_eq!(logs[1].get(L1_RAE), Some(1.0));
        assert!(logs[1].counter_reset);
    }

    #[test]
    fn test_interpolate_keyed_on_first_enabled_phase() {
        let mut logs = readings(&[Some(1.0), None, Some(3.0)]);
        logs[0].set(L2_FAE, Some(4.0));
        logs[2].set(L2_FAE, Some(2.0));
        let logs = ElectricityMeter.interpolate_gaps(logs, &ChannelConfig::new("ELECTRICITYMETER"));

        assert_eq!(logs[1].get(L1_FAE), Some(2.0));
        assert_eq!(logs[1].get(L2_FAE), None);
        assert_eq!(logs[1].get(Field::FaeTotal), Some(2.0));
        assert!(logs[1].interpolated);
    }

    #[test]
    fn test_phase_series_follow_enabled_phases() {
        let config = ChannelConfig {
            enabled_phases: vec![1, 3],
            ..ChannelConfig::new("ELECTRICITYMETER")
        };
        let logs = readings(&[Some(0.5)]);
        let series = ElectricityMeter.series(&logs, &ctx(&config, EnergyMode::Fae));

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, Label::Key("Phase 1"));
        assert_eq!(series[1].name, Label::Key("Phase 3"));
        assert_eq!(series[0].values(), vec![Some(0.5)]);
    }

    #[test]
    fn test_balance_series_split() {
        let config = ChannelConfig::new("ELECTRICITYMETER");
        let log = MeasurementLog::new(0)
            .with(Field::FaeTotal, Some(5.0))
            .with(Field::RaeTotal, Some(2.0));
        let series = ElectricityMeter.series(&[log], &ctx(&config, EnergyMode::FaeRae));

        let values: Vec<_> = series.iter().map(|s| s.values()[0]).collect();
        assert_eq!(values, vec![Some(3.0), Some(2.0), Some(0.0), Some(-2.0)]);
    }

    #[test]
    fn test_vector_balance_series_split() {
        let config = ChannelConfig::new("ELECTRICITYMETER");
        let log = MeasurementLog::new(0)
            .with(Field::FaeBalanced, Some(1.0))
            .with(Field::RaeBalanced, Some(4.0));
        let series = ElectricityMeter.series(&[log], &ctx(&config, EnergyMode::FaeRaeVector));

        assert_eq!(series[0].name, Label::Key("Forward active energy balance"));
        let values: Vec<_> = series.iter().map(|s| s.values()[0]).collect();
        assert_eq!(values, vec![Some(0.0), Some(1.0), Some(-3.0), Some(-1.0)]);
    }

    #[test]
    fn test_axis_price_and_bounds() {
        let config = ChannelConfig {
            price_per_unit: Some(0.5),
            ..ChannelConfig::new("ELECTRICITYMETER")
        };
        let logs = readings(&[Some(7.3), Some(2.0), None]);

        let axes = ElectricityMeter.y_axes(&logs, &ctx(&config, EnergyMode::Fae));
        assert_eq!(axes[0].title, Label::Key("Forward active energy"));
        assert_eq!(axes[0].max, Some(8.0));
        assert_eq!(axes[0].format.format_with_cost(Some(2.0)), "2.00000 kWh = 1.00 PLN");

        let axes = ElectricityMeter.y_axes(&logs, &ctx(&config, EnergyMode::Fre));
        assert_eq!(axes[0].format.suffix, " kvarh");
        assert_eq!(axes[0].format.price, None);
        assert_eq!(axes[0].max, None);

        let axes = ElectricityMeter.y_axes(&logs, &ctx(&config, EnergyMode::FaeRae));
        assert_eq!(axes[0].max, None);
    }

    #[test]
    fn test_aggregate_sums_registers() {
        let mut logs = readings(&[Some(1.0), Some(2.5), None]);
        for log in logs.iter_mut() {
            derive_totals(log);
        }
        logs[1].counter_reset = true;
        let log = ElectricityMeter.aggregate_logs(&logs);

        assert_eq!(log.get(L1_FAE), Some(3.5));
        assert_eq!(log.get(Field::FaeTotal), Some(3.5));
        assert_eq!(log.get(L2_FAE), None);
        assert!(log.counter_reset);
    }
}
