use crate::config::{AlertConfig, TrendMode};
use crate::engine::AlertEngine;
use crate::rules::composite::{self, HypotensiveHypoxemiaRule};
use crate::rules::ecg_anomaly::{self, EcgAnomalyRule};
use crate::rules::rate_of_change::{self, RapidDropRule};
use crate::rules::threshold::{self, Band, Bound, ThresholdRule};
use crate::rules::trend::{self, TrendDirection, TrendRule};
use crate::state::{TrendAccumulator, TrendStates};
use crate::window::{FamilyWindow, MetricFamily, TimeWindow, WindowSelector};
use crate::{EvaluationContext, RuleEvaluator};
use cardiomon_common::sink::AlertSink;
use cardiomon_common::types::{Alert, MetricType, Reading};
use cardiomon_storage::{MemoryRecordStore, RecordStore};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const NOW: i64 = 1_700_000_000_000;

#[derive(Default)]
struct RecordingSink {
    alerts: Mutex<Vec<Alert>>,
}

impl RecordingSink {
    fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().unwrap().clone()
    }
}

impl AlertSink for RecordingSink {
    fn accept(&self, alert: &Alert) {
        self.alerts.lock().unwrap().push(alert.clone());
    }
}

fn reading(metric: MetricType, value: f64, timestamp: i64) -> Reading {
    Reading::new(1, value, metric, timestamp)
}

fn series(metric: MetricType, values: &[f64]) -> Vec<Reading> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| reading(metric, *v, NOW - 60_000 + i as i64 * 1_000).with_sequence(i as u64))
        .collect()
}

fn refs(readings: &[Reading]) -> Vec<&Reading> {
    readings.iter().collect()
}

fn run_rule(rule: &dyn RuleEvaluator, readings: Vec<Reading>) -> Vec<Alert> {
    let window = FamilyWindow::new(
        rule.family(),
        TimeWindow::ending_at(NOW, Duration::from_secs(86_400)),
        readings,
    );
    let states = TrendStates::new();
    let ctx = EvaluationContext {
        patient_id: 1,
        now: NOW,
        window: &window,
        trend_states: &states,
    };
    rule.evaluate(&ctx)
}

fn engine_with(store: Arc<MemoryRecordStore>, config: AlertConfig) -> (AlertEngine, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let engine = AlertEngine::with_default_rules(store, config, sink.clone());
    (engine, sink)
}

#[test]
fn threshold_systolic_high_fires_strictly_above_limit() {
    let rule = ThresholdRule::blood_pressure("systolic", MetricType::SystolicPressure, 90.0, 180.0);

    let alerts = run_rule(&rule, vec![reading(MetricType::SystolicPressure, 190.0, NOW - 5_000)]);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].timestamp, NOW - 5_000);
    assert_eq!(alerts[0].patient_id, "1");
    assert!(
        alerts[0].condition.contains("exceeded 180"),
        "unexpected condition: {}",
        alerts[0].condition
    );

    let alerts = run_rule(&rule, vec![reading(MetricType::SystolicPressure, 180.0, NOW)]);
    assert!(alerts.is_empty());
}

#[test]
fn threshold_systolic_low_fires_strictly_below_limit() {
    let readings = [
        reading(MetricType::SystolicPressure, 80.0, 10),
        reading(MetricType::SystolicPressure, 90.0, 20),
    ];
    let found = threshold::breaches(&refs(&readings), Band::between(90.0, 180.0));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].bound, Bound::Below);
    assert_eq!(found[0].timestamp, 10);
    assert_eq!(found[0].limit, 90.0);
}

#[test]
fn threshold_reports_every_breach_without_dedup() {
    let readings = series(MetricType::DiastolicPressure, &[130.0, 50.0, 125.0, 80.0]);
    let found = threshold::breaches(&refs(&readings), Band::between(60.0, 120.0));
    let bounds: Vec<Bound> = found.iter().map(|b| b.bound).collect();
    assert_eq!(bounds, vec![Bound::Above, Bound::Below, Bound::Above]);
}

#[test]
fn threshold_one_sided_saturation() {
    let rule = ThresholdRule::low_saturation("low-sat", 92.0);
    let alerts = run_rule(&rule, series(MetricType::Saturation, &[91.0, 92.0, 100.0]));
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].condition, "Low Saturation Alert");
}

#[test]
fn threshold_ignores_readings_of_other_metrics() {
    let rule = ThresholdRule::heart_rate("hr", MetricType::HeartRate, 50.0, 100.0);
    let mut readings = series(MetricType::HeartRate, &[70.0, 75.0]);
    // mismatched type leaking into the window is filtered, not evaluated
    readings.push(reading(MetricType::Ecg, 300.0, NOW));
    assert!(run_rule(&rule, readings).is_empty());
}

#[test]
fn trend_increasing_fires_at_last_reading() {
    let rule = TrendRule::new("systolic-trend", MetricType::SystolicPressure, 10.0, TrendMode::Stateless);
    let readings = series(MetricType::SystolicPressure, &[130.0, 145.0, 160.0]);
    let last_ts = readings[2].timestamp;

    let alerts = run_rule(&rule, readings);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].timestamp, last_ts);
    assert_eq!(alerts[0].condition, "Systolic Blood Pressure Increasing Trend Alert");
}

#[test]
fn trend_small_steps_do_not_fire() {
    let readings = series(MetricType::SystolicPressure, &[130.0, 138.0, 145.0]);
    assert!(trend::detect(&refs(&readings), 10.0).is_empty());
}

#[test]
fn trend_step_of_exactly_min_delta_does_not_count() {
    let readings = series(MetricType::SystolicPressure, &[100.0, 110.0, 125.0]);
    assert!(trend::detect(&refs(&readings), 10.0).is_empty());
}

#[test]
fn trend_decreasing_detected() {
    let readings = series(MetricType::DiastolicPressure, &[116.0, 105.0, 90.0, 70.0]);
    assert_eq!(
        trend::detect(&refs(&readings), 10.0),
        vec![TrendDirection::Decreasing]
    );
}

#[test]
fn trend_needs_three_readings() {
    let readings = series(MetricType::SystolicPressure, &[100.0, 150.0]);
    assert!(trend::detect(&refs(&readings), 10.0).is_empty());
    assert!(trend::detect(&[], 10.0).is_empty());
}

#[test]
fn trend_accumulator_fires_once_per_run() {
    let mut acc = TrendAccumulator::default();
    assert_eq!(acc.push(100.0, 10.0), None);
    assert_eq!(acc.push(115.0, 10.0), None);
    assert_eq!(acc.push(130.0, 10.0), Some(TrendDirection::Increasing));
    // counter restarted from 130
    assert_eq!(acc.run(), 1);
    assert_eq!(acc.push(145.0, 10.0), None);
    assert_eq!(acc.push(160.0, 10.0), Some(TrendDirection::Increasing));
}

#[test]
fn trend_accumulator_resets_on_broken_streak() {
    let mut acc = TrendAccumulator::default();
    acc.push(100.0, 10.0);
    acc.push(115.0, 10.0);
    assert_eq!(acc.push(118.0, 10.0), None);
    assert_eq!(acc.run(), 1);
    // direction change restarts the run
    assert_eq!(acc.push(100.0, 10.0), None);
    assert_eq!(acc.run(), 2);
    assert_eq!(acc.push(85.0, 10.0), Some(TrendDirection::Decreasing));
}

#[test]
fn trend_states_consume_each_reading_once() {
    let states = TrendStates::new();
    let readings = series(MetricType::SystolicPressure, &[130.0, 145.0, 160.0]);

    let first = states.advance(1, MetricType::SystolicPressure, &refs(&readings), 10.0);
    assert_eq!(first, vec![(TrendDirection::Increasing, readings[2].timestamp)]);

    let again = states.advance(1, MetricType::SystolicPressure, &refs(&readings), 10.0);
    assert!(again.is_empty());

    states.reset_patient(1);
    assert!(states.get(1, MetricType::SystolicPressure).is_none());
}

#[test]
fn trend_states_follow_arrival_order_not_timestamps() {
    let states = TrendStates::new();
    // same timestamp three times, distinct arrivals
    let readings: Vec<Reading> = [130.0, 145.0, 160.0]
        .into_iter()
        .enumerate()
        .map(|(i, v)| reading(MetricType::SystolicPressure, v, 2_000).with_sequence(i as u64))
        .collect();

    let first = states.advance(1, MetricType::SystolicPressure, &refs(&readings[..2]), 10.0);
    assert!(first.is_empty());

    let second = states.advance(1, MetricType::SystolicPressure, &refs(&readings), 10.0);
    assert_eq!(second, vec![(TrendDirection::Increasing, 2_000)]);
}

#[test]
fn rapid_drop_at_five_percent() {
    let readings = [
        reading(MetricType::Saturation, 97.0, NOW - 300_000),
        reading(MetricType::Saturation, 92.0, NOW),
    ];
    let found = rate_of_change::drops(&refs(&readings), 5.0);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].timestamp, NOW);
    assert!((found[0].percent - 5.154_639).abs() < 1e-3);

    let readings = [
        reading(MetricType::Saturation, 97.0, NOW - 300_000),
        reading(MetricType::Saturation, 93.0, NOW),
    ];
    assert!(rate_of_change::drops(&refs(&readings), 5.0).is_empty());
}

#[test]
fn rapid_drop_skips_non_positive_previous_value() {
    let readings = series(MetricType::Saturation, &[0.0, 90.0, -5.0, 80.0]);
    let found = rate_of_change::drops(&refs(&readings), 5.0);
    // only 90 -> -5 qualifies; 0 -> 90 and -5 -> 80 are skipped
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].timestamp, readings[2].timestamp);
}

#[test]
fn rapid_drop_rule_builds_condition() {
    let rule = RapidDropRule::new("drop", 5.0);
    let alerts = run_rule(&rule, series(MetricType::Saturation, &[98.0, 90.0, 97.0, 91.0]));
    assert_eq!(alerts.len(), 2);
    // drops of different size share one condition
    assert_eq!(alerts[0].condition, "Saturation Rapid Drop Alert");
    assert_eq!(alerts[1].condition, alerts[0].condition);
}

#[test]
fn composite_requires_both_conditions() {
    let systolic = [reading(MetricType::SystolicPressure, 89.0, NOW)];
    let saturation = [reading(MetricType::Saturation, 91.0, NOW)];
    assert!(composite::holds(&refs(&systolic), &refs(&saturation), 90.0, 92.0));
    assert!(!composite::holds(&refs(&systolic), &[], 90.0, 92.0));

    let rule = HypotensiveHypoxemiaRule::new("hh", 90.0, 92.0);
    let alerts = run_rule(
        &rule,
        vec![
            reading(MetricType::SystolicPressure, 85.0, NOW - 50_000),
            reading(MetricType::SystolicPressure, 80.0, NOW - 40_000),
            reading(MetricType::Saturation, 90.0, NOW - 30_000),
        ],
    );
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].timestamp, NOW);
    assert_eq!(alerts[0].condition, "Hypotensive Hypoxemia Alert");
}

#[test]
fn ecg_spike_after_window_average() {
    let readings = series(MetricType::Ecg, &[60.0, 60.0, 60.0, 60.0, 60.0, 100.0]);
    let found = ecg_anomaly::anomalies(&refs(&readings), 5, 1.5);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].timestamp, readings[5].timestamp);
    assert_eq!(found[0].baseline, 60.0);

    let readings = series(MetricType::Ecg, &[60.0, 60.0, 60.0, 60.0, 60.0, 80.0]);
    assert!(ecg_anomaly::anomalies(&refs(&readings), 5, 1.5).is_empty());
}

#[test]
fn ecg_short_sequences_never_fire() {
    let readings = series(MetricType::Ecg, &[60.0, 60.0, 200.0]);
    assert!(ecg_anomaly::anomalies(&refs(&readings), 5, 1.5).is_empty());
    assert!(ecg_anomaly::anomalies(&refs(&readings), 0, 1.5).is_empty());

    let rule = EcgAnomalyRule::new("ecg", 5, 1.5);
    assert!(run_rule(&rule, Vec::new()).is_empty());
}

#[test]
fn time_window_is_closed_and_ordered() {
    let window = TimeWindow::ending_at(NOW, Duration::from_secs(100));
    assert_eq!(window.start(), NOW - 100_000);
    assert_eq!(window.end(), NOW);
    assert!(window.contains(NOW - 100_000));
    assert!(window.contains(NOW));
    assert!(!window.contains(NOW + 1));

    let huge = TimeWindow::ending_at(0, Duration::from_secs(u64::MAX));
    assert!(huge.start() <= huge.end());
}

#[test]
fn selector_filters_family_and_window() {
    let store = Arc::new(MemoryRecordStore::new());
    store.add_record(1, 95.0, MetricType::Saturation, NOW - 60_000);
    store.add_record(1, 94.0, MetricType::Saturation, NOW - 11 * 60_000);
    store.add_record(1, 120.0, MetricType::SystolicPressure, NOW - 60_000);

    let selector = WindowSelector::new(store, AlertConfig::default());
    assert_eq!(selector.lookback(MetricFamily::Saturation), Duration::from_secs(600));
    assert_eq!(selector.lookback(MetricFamily::BloodPressure), Duration::from_secs(86_400));
    assert_eq!(selector.lookback(MetricFamily::Cardiac), Duration::from_secs(3_600));
    assert_eq!(selector.lookback(MetricFamily::HypotensiveHypoxemia), Duration::from_secs(100));

    let window = selector.select(1, NOW, MetricFamily::Saturation).unwrap();
    assert_eq!(window.len(), 1);
    assert_eq!(window.readings()[0].value, 95.0);

    assert!(selector.select(1, NOW, MetricFamily::Cardiac).is_none());
    assert!(selector.select(2, NOW, MetricFamily::BloodPressure).is_none());
}

#[test]
fn engine_composite_alert_in_short_window() {
    let store = Arc::new(MemoryRecordStore::new());
    store.add_record(1, 89.0, MetricType::SystolicPressure, NOW - 10_000);
    store.add_record(1, 91.0, MetricType::Saturation, NOW - 5_000);

    let (engine, sink) = engine_with(store, AlertConfig::default());
    let alerts = engine.evaluate(1, NOW);

    let composite: Vec<&Alert> = alerts
        .iter()
        .filter(|a| a.condition == "Hypotensive Hypoxemia Alert")
        .collect();
    assert_eq!(composite.len(), 1);
    assert_eq!(composite[0].timestamp, NOW);
    assert_eq!(sink.alerts(), alerts);
}

#[test]
fn engine_no_composite_without_low_saturation() {
    let store = Arc::new(MemoryRecordStore::new());
    store.add_record(1, 89.0, MetricType::SystolicPressure, NOW - 10_000);

    let (engine, _sink) = engine_with(store, AlertConfig::default());
    let alerts = engine.evaluate(1, NOW);

    assert!(alerts.iter().all(|a| a.condition != "Hypotensive Hypoxemia Alert"));
    // the systolic threshold still fires on its own
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].condition.contains("dropped below 90"));
}

#[test]
fn engine_empty_store_is_silent() {
    let store = Arc::new(MemoryRecordStore::new());
    let (engine, sink) = engine_with(store, AlertConfig::default());

    assert!(engine.evaluate(1, NOW).is_empty());
    assert!(engine.evaluate_all(NOW).is_empty());
    assert!(sink.alerts().is_empty());
}

#[test]
fn engine_orders_alerts_by_family() {
    let store = Arc::new(MemoryRecordStore::new());
    // cardiac first in arrival order, blood pressure last
    store.add_record(1, 120.0, MetricType::HeartRate, NOW - 1_000);
    store.add_record(1, 85.0, MetricType::Saturation, NOW - 2_000);
    store.add_record(1, 200.0, MetricType::SystolicPressure, NOW - 3_000);

    let (engine, _sink) = engine_with(store, AlertConfig::default());
    let conditions: Vec<String> = engine
        .evaluate(1, NOW)
        .into_iter()
        .map(|a| a.condition)
        .collect();

    assert_eq!(
        conditions,
        vec![
            "Systolic Blood Pressure has exceeded 180 mmHg".to_string(),
            "Low Saturation Alert".to_string(),
            "Critical Heart Rate Alert".to_string(),
        ]
    );
}

#[test]
fn engine_incremental_trend_fires_once_across_passes() {
    let store = Arc::new(MemoryRecordStore::new());
    store.add_record(1, 130.0, MetricType::SystolicPressure, NOW - 3_000);
    store.add_record(1, 145.0, MetricType::SystolicPressure, NOW - 2_000);

    let config = AlertConfig {
        trend_mode: TrendMode::Incremental,
        ..AlertConfig::default()
    };
    let (engine, _sink) = engine_with(store.clone(), config);

    let trend_alerts = |alerts: Vec<Alert>| -> usize {
        alerts.iter().filter(|a| a.condition.contains("Trend")).count()
    };

    assert_eq!(trend_alerts(engine.evaluate(1, NOW)), 0);

    store.add_record(1, 160.0, MetricType::SystolicPressure, NOW - 1_000);
    assert_eq!(trend_alerts(engine.evaluate(1, NOW)), 1);

    // nothing new: the completed run is not reported again
    assert_eq!(trend_alerts(engine.evaluate(1, NOW)), 0);
}

#[test]
fn engine_trend_modes_agree_on_late_arrivals() {
    for mode in [TrendMode::Stateless, TrendMode::Incremental] {
        let store = Arc::new(MemoryRecordStore::new());
        store.add_record(1, 130.0, MetricType::SystolicPressure, NOW - 3_000);
        store.add_record(1, 145.0, MetricType::SystolicPressure, NOW - 1_000);

        let config = AlertConfig {
            trend_mode: mode,
            ..AlertConfig::default()
        };
        let (engine, _sink) = engine_with(store.clone(), config);
        let trend_alerts = |alerts: Vec<Alert>| -> usize {
            alerts.iter().filter(|a| a.condition.contains("Trend")).count()
        };

        assert_eq!(trend_alerts(engine.evaluate(1, NOW)), 0, "{mode}");

        // third reading arrives last but carries an older timestamp
        store.add_record(1, 160.0, MetricType::SystolicPressure, NOW - 2_000);
        assert_eq!(trend_alerts(engine.evaluate(1, NOW)), 1, "{mode}");
    }
}

#[test]
fn engine_stateless_trend_repeats_while_window_qualifies() {
    let store = Arc::new(MemoryRecordStore::new());
    for (i, v) in [130.0, 145.0, 160.0].into_iter().enumerate() {
        store.add_record(1, v, MetricType::SystolicPressure, NOW - 3_000 + i as i64 * 1_000);
    }
    let (engine, _sink) = engine_with(store, AlertConfig::default());

    for _ in 0..2 {
        let alerts = engine.evaluate(1, NOW);
        assert_eq!(alerts.iter().filter(|a| a.condition.contains("Increasing")).count(), 1);
    }
}

#[test]
fn engine_rule_management() {
    let store = Arc::new(MemoryRecordStore::new());
    let (mut engine, _sink) = engine_with(store, AlertConfig::default());

    assert!(engine.get_rule("ecg-anomaly").is_some());
    assert!(engine.remove_rule("ecg-anomaly"));
    assert!(!engine.remove_rule("ecg-anomaly"));

    engine.add_rule(Box::new(EcgAnomalyRule::new("ecg-strict", 3, 1.2)));
    assert_eq!(engine.get_rule("ecg-strict").map(|r| r.family()), Some(MetricFamily::Cardiac));

    engine.replace_rules(Vec::new());
    assert!(engine.rules().is_empty());
}

#[test]
fn config_defaults_from_empty_toml() {
    let config: AlertConfig = toml::from_str("").unwrap();
    assert_eq!(config.blood_pressure_window_secs, 86_400);
    assert_eq!(config.saturation_window_secs, 600);
    assert_eq!(config.trend_mode, TrendMode::Stateless);
    assert_eq!(config.ecg_window_size, 5);
    assert!(config.validate().is_ok());

    let config: AlertConfig = toml::from_str("trend_mode = \"incremental\"\nhypoxemia_window_secs = 60").unwrap();
    assert_eq!(config.trend_mode, TrendMode::Incremental);
    assert_eq!(config.lookback(MetricFamily::HypotensiveHypoxemia), Duration::from_secs(60));
}

#[test]
fn config_validation_rejects_bad_values() {
    let config = AlertConfig {
        ecg_window_size: 0,
        ..AlertConfig::default()
    };
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("ecg_window_size"));

    let config = AlertConfig {
        rapid_drop_percent: f64::NAN,
        ..AlertConfig::default()
    };
    assert!(config.validate().is_err());
}
