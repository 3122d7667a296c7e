use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn build_app_config_uses_defaults_for_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.webdriver_url, "http://localhost:9515");
    assert_eq!(cfg.sites_path.to_str(), Some("./config/sites.yaml"));
    assert_eq!(cfg.output_dir.to_str(), Some("./output"));
    assert_eq!(cfg.log_level, "info");
    assert!(cfg.headless);
    assert_eq!(cfg.user_agent, DEFAULT_USER_AGENT);
    assert_eq!(cfg.field_timeout_secs, 10);
    assert_eq!(cfg.max_consecutive_faults, 3);
    assert!((cfg.delay_scale - 1.0).abs() < f64::EPSILON);
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = HashMap::new();
    map.insert("FRUVER_WEBDRIVER_URL", "http://selenium:4444");
    map.insert("FRUVER_OUTPUT_DIR", "/data/exports");
    map.insert("FRUVER_HEADLESS", "false");
    map.insert("FRUVER_FIELD_TIMEOUT_SECS", "20");
    map.insert("FRUVER_MAX_CONSECUTIVE_FAULTS", "5");
    map.insert("FRUVER_DELAY_SCALE", "0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.webdriver_url, "http://selenium:4444");
    assert_eq!(cfg.output_dir.to_str(), Some("/data/exports"));
    assert!(!cfg.headless);
    assert_eq!(cfg.field_timeout_secs, 20);
    assert_eq!(cfg.max_consecutive_faults, 5);
    assert!(cfg.delay_scale.abs() < f64::EPSILON);
}

#[test]
fn build_app_config_rejects_non_http_webdriver_url() {
    let mut map = HashMap::new();
    map.insert("FRUVER_WEBDRIVER_URL", "localhost:9515");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "FRUVER_WEBDRIVER_URL"),
        "expected InvalidEnvVar(FRUVER_WEBDRIVER_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_garbage_boolean() {
    let mut map = HashMap::new();
    map.insert("FRUVER_HEADLESS", "sometimes");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "FRUVER_HEADLESS"),
        "expected InvalidEnvVar(FRUVER_HEADLESS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_invalid_timeout() {
    let mut map = HashMap::new();
    map.insert("FRUVER_FIELD_TIMEOUT_SECS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "FRUVER_FIELD_TIMEOUT_SECS"),
        "expected InvalidEnvVar(FRUVER_FIELD_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_negative_delay_scale() {
    let mut map = HashMap::new();
    map.insert("FRUVER_DELAY_SCALE", "-0.5");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "FRUVER_DELAY_SCALE"),
        "expected InvalidEnvVar(FRUVER_DELAY_SCALE), got: {result:?}"
    );
}
