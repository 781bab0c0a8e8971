//! End-to-end flow: configuration → sampling → analysis → history →
//! period roll-ups → trend.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use u_spc::aggregation::{AggregationService, PeriodType, Shift};
use u_spc::source::{AnalysisRun, InMemoryStore, PlanId, PlanInfo, RunScope};
use u_spc::trend::{TimeRange, TrendService};
use u_spc::{analyze_window, AnalysisCondition, EngineConfig, Measurement, SamplingConfig};

fn at(h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, h, 0, 0).unwrap()
}

fn minute_data(from: DateTime<Utc>, minutes: i64) -> Vec<Measurement> {
    (0..minutes)
        .map(|m| Measurement::new(10.0 + (m % 7) as f64 * 0.05, from + Duration::minutes(m)))
        .collect()
}

#[test]
fn full_day_flow() {
    let config = EngineConfig::from_toml_str("[sampling]\nmatch_tolerance_ms = 60000").unwrap();
    let calendar = config.calendar().unwrap();
    let plan = SamplingConfig::default().into_plan().unwrap();

    let info = PlanInfo {
        id: PlanId(1),
        name: "piston diameter".into(),
        line_id: None,
        usl: Some(11.0),
        lsl: Some(9.0),
        target: Some(10.0),
        active: true,
    };
    let spec = info.capability().unwrap();

    let store = Arc::new(InMemoryStore::new());
    store.insert_plan(info);

    let data = minute_data(at(6), 13 * 60);
    for hour in [8, 12, 16] {
        let result = analyze_window(
            &data,
            &plan,
            at(hour),
            at(hour + 2),
            Some(&spec),
            config.sampling.match_tolerance_ms,
        );
        assert_eq!(result.sample_count, 5);
        assert_eq!(result.condition, AnalysisCondition::Normal);
        assert!(result.cpk.is_some());
        assert!(result.ucl_r.is_some());

        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("xBarData").is_some());
        assert!(json.get("uclR").is_some());

        store.record_run(AnalysisRun::from_result(PlanId(1), None, at(hour), &result));
    }

    let aggregation = AggregationService::new(store.clone(), store.clone(), calendar);
    let written = aggregation.aggregate_all_periods(PlanId(1), at(12));
    assert_eq!(written.len(), 4);

    let shift = &written[0];
    assert_eq!(shift.shift, Some(Shift::Morning));
    assert_eq!(shift.run_count, 2);
    let day = &written[1];
    assert_eq!(day.period_type, PeriodType::Day);
    assert_eq!(day.run_count, 3);
    assert_eq!(day.sample_count, 15);
    assert!(day.pp.is_some());

    let trend = TrendService::new(store.clone(), calendar).with_ratios(config.trend);
    let points = trend.trend(RunScope::Plan(PlanId(1)), TimeRange::SevenDays, at(20));
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].count, 3);
    assert!((points[0].cpk.unwrap() - day.cpk.unwrap()).abs() < 1e-12);
}

#[test]
fn sparse_data_is_flagged() {
    let plan = SamplingConfig::default().into_plan().unwrap();
    // One reading per hour cannot fill a 30-minute schedule.
    let data: Vec<_> = (0..3)
        .map(|h| Measurement::new(10.0 + h as f64 * 0.1, at(8) + Duration::hours(h)))
        .collect();

    let result = analyze_window(&data, &plan, at(8), at(10), None, 60_000);
    assert_eq!(result.sample_count, 3);
    assert_eq!(result.condition, AnalysisCondition::InsufficientData);
}

#[test]
fn invalid_configuration_lists_every_problem() {
    let report = SamplingConfig {
        sample_size: 0,
        subgroup_size: -1,
        interval_unit: "fortnight".into(),
        ..SamplingConfig::default()
    }
    .into_plan()
    .unwrap_err();
    assert!(!report.valid);
    assert_eq!(report.errors.len(), 3);
}
