use std::fs;
use std::path::PathBuf;

use fittrack_core::{load_filter_config, load_profile, save_profile, FilterConfig, FitTrackError, Profile};

fn tmp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("fittrack_{}_{}.json", name, std::process::id()))
}

#[test]
fn test_save_and_load_profile() {
    let path = tmp_path("profile_roundtrip");

    let profile = Profile {
        display_name: Some("Kari".to_string()),
        weight_kg: Some(64.5),
        height_cm: Some(171.0),
        daily_distance_goal_m: 8_000.0,
        daily_water_goal_ml: Some(2_000),
    };

    save_profile(&profile, &path).expect("kunne ikke lagre profil");
    let loaded = load_profile(&path).expect("kunne ikke laste profil");
    assert_eq!(loaded, profile);

    fs::remove_file(&path).ok();
}

#[test]
fn missing_profile_falls_back_to_default() {
    let path = tmp_path("profile_missing");
    let _ = fs::remove_file(&path);

    let loaded = load_profile(&path).expect("default profile");
    assert_eq!(loaded, Profile::default());
    assert_eq!(loaded.daily_distance_goal_m, 5_000.0);
}

#[test]
fn partial_profile_keeps_defaults_for_absent_fields() {
    let path = tmp_path("profile_partial");
    fs::write(&path, r#"{ "display_name": "Ola" }"#).expect("write");

    let loaded = load_profile(&path).expect("load");
    assert_eq!(loaded.display_name.as_deref(), Some("Ola"));
    assert_eq!(loaded.daily_distance_goal_m, 5_000.0);

    fs::remove_file(&path).ok();
}

#[test]
fn filter_config_file_overrides_only_given_thresholds() {
    let path = tmp_path("config_partial");
    fs::write(&path, r#"{ "max_speed_kmh": 45.0, "smoothing_window_size": 5 }"#).expect("write");

    let cfg = load_filter_config(&path).expect("config");
    assert_eq!(cfg.max_speed_kmh, 45.0);
    assert_eq!(cfg.smoothing_window_size, 5);
    assert_eq!(cfg.min_distance_m, FilterConfig::default().min_distance_m);

    fs::remove_file(&path).ok();
}

#[test]
fn missing_filter_config_uses_reference_thresholds() {
    let path = tmp_path("config_missing");
    let _ = fs::remove_file(&path);
    assert_eq!(load_filter_config(&path).expect("defaults"), FilterConfig::default());
}

#[test]
fn invalid_filter_config_is_rejected() {
    let path = tmp_path("config_invalid");
    fs::write(&path, r#"{ "min_consecutive_valid_readings": 0 }"#).expect("write");
    let err = load_filter_config(&path).expect_err("should be invalid");
    assert!(matches!(err, FitTrackError::InvalidConfig(_)), "{err:?}");

    fs::write(&path, r#"{ "min_distance_m": "eight" }"#).expect("write");
    match load_filter_config(&path) {
        Err(FitTrackError::Parse { path, .. }) => assert_eq!(path, "min_distance_m"),
        other => panic!("expected parse error, got {other:?}"),
    }

    fs::remove_file(&path).ok();
}

#[test]
fn trailing_content_after_json_is_an_error() {
    let path = tmp_path("config_trailing");
    fs::write(&path, r#"{ "max_speed_kmh": 45.0 } garbage"#).expect("write");
    let err = load_filter_config(&path).expect_err("trailing content");
    assert!(matches!(err, FitTrackError::Json(_)), "{err:?}");

    let path_p = tmp_path("profile_trailing");
    fs::write(&path_p, r#"{ "display_name": "Ola" }}"#).expect("write");
    assert!(load_profile(&path_p).is_err());

    fs::remove_file(&path).ok();
    fs::remove_file(&path_p).ok();
}
