// core/tests/test_track_replay.rs
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use fittrack_core::api::filter_track_json;
use fittrack_core::filter::{FixFilter, FixOutcome};
use fittrack_core::geo::speed_kmh;
use fittrack_core::metrics::FilterMetrics;
use fittrack_core::models::RawFix;
use fittrack_core::route::RouteRecorder;

// Løp langs en meridian i Oslo, ~3 m/s, fix hvert 4. s.
// Rad 8 er et ~450 m hopp (multipath), rad 11 har dårlig nøyaktighet.
const OSLO_RUN: &str = "\
latitude,longitude,accuracy_m,timestamp_ms
59.9100000,10.75000,6.0,1700000000000
59.9101079,10.75000,6.0,1700000004000
59.9102158,10.75000,6.0,1700000008000
59.9103238,10.75000,6.0,1700000012000
59.9104317,10.75000,6.0,1700000016000
59.9105396,10.75000,6.0,1700000020000
59.9106475,10.75000,6.0,1700000024000
59.9147554,10.75000,6.0,1700000028000
59.9108633,10.75000,6.0,1700000032000
59.9109713,10.75000,6.0,1700000036000
59.9110792,10.75000,25.0,1700000040000
59.9111871,10.75000,6.0,1700000044000
59.9112950,10.75000,6.0,1700000048000
59.9114029,10.75000,6.0,1700000052000
59.9115109,10.75000,6.0,1700000056000
59.9116188,10.75000,6.0,1700000060000
";

#[derive(Debug, Deserialize)]
struct CsvRow {
    latitude: f64,
    longitude: f64,
    accuracy_m: f32,
    timestamp_ms: i64,
}

fn load_run() -> Vec<RawFix> {
    let mut rdr = csv::Reader::from_reader(OSLO_RUN.as_bytes());
    rdr.deserialize::<CsvRow>()
        .map(|r| {
            let r = r.expect("csv row");
            RawFix::new(r.latitude, r.longitude, r.accuracy_m, r.timestamp_ms)
        })
        .collect()
}

const EXPECTED: [&str; 16] = [
    "accepted_first_location",
    "rejected_small_distance",
    "rejected_small_distance",
    "accepted_and_smoothed",
    "accepted_and_smoothed",
    "accepted_and_smoothed",
    "accepted_and_smoothed",
    "rejected_high_speed",
    "rejected_small_distance",
    "rejected_small_distance",
    "rejected_low_accuracy",
    "accepted_and_smoothed",
    "rejected_high_speed",
    "rejected_small_distance",
    "rejected_small_distance",
    "accepted_and_smoothed",
];

#[test]
fn replayed_run_matches_expected_outcomes() {
    let fixes = load_run();
    assert_eq!(fixes.len(), 16);

    let mut filter = FixFilter::default();
    let labels: Vec<&str> = fixes
        .iter()
        .map(|f| filter.filter_location(f, f.timestamp_ms).label())
        .collect();
    assert_eq!(labels, EXPECTED);
}

#[test]
fn accepted_fixes_respect_distance_and_speed_bounds() {
    let fixes = load_run();
    let mut filter = FixFilter::default();
    let cfg = filter.config().clone();

    let accepted: Vec<RawFix> = fixes
        .iter()
        .filter_map(|f| filter.filter_location(f, f.timestamp_ms).fix().copied())
        .collect();
    assert_eq!(accepted.len(), 7);

    for pair in accepted.windows(2) {
        let d = pair[0].distance_to(&pair[1]);
        let dt = (pair[1].timestamp_ms - pair[0].timestamp_ms) as f64 / 1000.0;
        assert!(d >= cfg.min_distance_m, "too close: {d:.2} m");
        assert!(speed_kmh(d, dt) <= cfg.max_speed_kmh, "too fast: {d:.1} m / {dt} s");
    }

    // hoppet skal aldri inn i ruten
    assert!(accepted.iter().all(|f| f.latitude < 59.912));
}

#[test]
fn route_recorder_sums_accepted_distance() {
    let fixes = load_run();
    let mut filter = FixFilter::default();
    let mut route = RouteRecorder::start(Utc::now());

    for f in &fixes {
        let outcome = filter.filter_location(f, f.timestamp_ms);
        let added = route.record(&outcome);
        assert_eq!(added, outcome.is_accepted());
    }

    let summary = route.finish();
    assert_eq!(summary.points, 7);
    assert!((summary.distance_m - 146.0).abs() < 0.5, "distance={}", summary.distance_m);
    assert!((summary.duration_s - 60.0).abs() < 1e-9);
    assert!((summary.avg_speed_kmh - 8.76).abs() < 0.05, "avg={}", summary.avg_speed_kmh);
    let pace = summary.pace_min_per_km.expect("pace");
    assert!((pace - 60.0 / 8.76).abs() < 0.05, "pace={pace}");
}

#[test]
fn paused_route_does_not_bridge_the_gap() {
    let mut route = RouteRecorder::start(Utc::now());
    let a = RawFix::new(59.91, 10.75, 5.0, 0);
    let b = RawFix::new(59.9101, 10.75, 5.0, 4_000);
    let c = RawFix::new(59.92, 10.75, 5.0, 600_000);
    let d = RawFix::new(59.9201, 10.75, 5.0, 604_000);

    assert!(route.record(&FixOutcome::AcceptedFirstLocation(a)));
    assert!(route.record(&FixOutcome::AcceptedAndSmoothed(b)));
    route.pause();
    assert!(!route.record(&FixOutcome::AcceptedAndSmoothed(c)));
    route.resume();
    assert!(route.record(&FixOutcome::AcceptedAndSmoothed(c)));
    assert!(route.record(&FixOutcome::AcceptedAndSmoothed(d)));
    assert!(!route.record(&FixOutcome::RejectedStationary));

    assert_eq!(route.segments().len(), 2);
    // 2 × ~11.1 m, ikke ~1 km over pausen
    assert!((route.distance_m() - 22.24).abs() < 0.1, "distance={}", route.distance_m());
    assert!((route.moving_secs() - 8.0).abs() < 1e-9);
}

#[test]
fn json_api_replays_track() {
    let fixes = load_run();
    let input = json!({ "fixes": fixes });
    let out = filter_track_json(&input.to_string()).expect("filter_track_json");
    let v: Value = serde_json::from_str(&out).expect("valid json");

    assert_eq!(v["outcomes"].as_array().map(|a| a.len()), Some(16));
    assert_eq!(v["accepted"].as_array().map(|a| a.len()), Some(7));
    assert_eq!(v["counts"]["rejected_high_speed"], 2);
    assert_eq!(v["counts"]["rejected_stationary"], 0);
    assert_eq!(v["summary"]["points"], 7);
    assert!(v["report"].as_str().unwrap_or_default().contains("thresholds"));
}

#[test]
fn json_api_honours_config_and_reports_bad_paths() {
    // uten debounce aksepteres andre fix direkte
    let input = json!({
        "fixes": [
            { "latitude": 10.0, "longitude": 20.0, "accuracy_m": 5.0, "timestamp_ms": 0 },
            { "latitude": 10.0002, "longitude": 20.0, "accuracy_m": 5.0, "timestamp_ms": 5000 }
        ],
        "config": { "min_consecutive_valid_readings": 1 }
    });
    let out = filter_track_json(&input.to_string()).expect("filter_track_json");
    let v: Value = serde_json::from_str(&out).expect("valid json");
    assert_eq!(v["outcomes"][1], "accepted_and_smoothed");

    let bad = r#"{ "fixes": [ { "latitude": "north", "longitude": 1.0, "timestamp_ms": 0 } ] }"#;
    let err = filter_track_json(bad).expect_err("should fail");
    assert!(err.to_string().contains("fixes[0].latitude"), "{err}");
}

#[test]
fn json_api_survives_extreme_timestamps() {
    let input = json!({
        "fixes": [
            { "latitude": 10.0, "longitude": 20.0, "accuracy_m": 5.0, "timestamp_ms": i64::MAX },
            { "latitude": 10.0003, "longitude": 20.0, "accuracy_m": 5.0, "timestamp_ms": -10 }
        ]
    });
    let out = filter_track_json(&input.to_string()).expect("filter_track_json");
    let v: Value = serde_json::from_str(&out).expect("valid json");
    assert_eq!(v["outcomes"], json!(["accepted_first_location", "rejected_time_interval"]));

    // rute med spenn over hele i64: varigheten mettes
    let input = json!({
        "fixes": [
            { "latitude": 10.0, "longitude": 20.0, "accuracy_m": 5.0, "timestamp_ms": i64::MIN },
            { "latitude": 10.0003, "longitude": 20.0, "accuracy_m": 5.0, "timestamp_ms": i64::MAX }
        ],
        "config": { "min_consecutive_valid_readings": 1 }
    });
    let out = filter_track_json(&input.to_string()).expect("filter_track_json");
    let v: Value = serde_json::from_str(&out).expect("valid json");
    assert_eq!(v["outcomes"], json!(["accepted_first_location", "accepted_and_smoothed"]));
    assert_eq!(v["summary"]["points"], 2);
    assert!(v["summary"]["duration_s"].as_f64().unwrap_or_default() > 0.0);
}

#[test]
fn json_api_rejects_trailing_content() {
    let input = json!({ "fixes": [] }).to_string() + " {}";
    assert!(filter_track_json(&input).is_err());
}

#[test]
fn json_api_feeds_the_global_metrics() {
    let metrics = FilterMetrics::global().expect("global metrics");
    let before = metrics.count("rejected_high_speed");

    let input = json!({ "fixes": load_run() });
    filter_track_json(&input.to_string()).expect("filter_track_json");

    // andre tester i samme prosess kan også telle
    assert!(metrics.count("rejected_high_speed") >= before + 2);
}

#[test]
fn json_fix_without_accuracy_is_rejected() {
    let input = json!({
        "fixes": [
            { "latitude": 10.0, "longitude": 20.0, "timestamp_ms": 0 },
            { "latitude": 10.0, "longitude": 20.0, "accuracy_m": 4.0, "has_accuracy": false, "timestamp_ms": 10 },
            { "latitude": 10.0, "longitude": 20.0, "accuracy_m": 4.0, "timestamp_ms": 20 }
        ]
    });
    let out = filter_track_json(&input.to_string()).expect("filter_track_json");
    let v: Value = serde_json::from_str(&out).expect("valid json");
    assert_eq!(v["outcomes"], json!(["rejected_low_accuracy", "rejected_low_accuracy", "accepted_first_location"]));
}
