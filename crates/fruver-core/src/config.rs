use crate::app_config::AppConfig;
use crate::ConfigError;

pub(crate) const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a usable
/// config pointing at a local chromedriver.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got '{other}'"))),
        }
    };

    let webdriver_url = or_default("FRUVER_WEBDRIVER_URL", "http://localhost:9515");
    if !webdriver_url.starts_with("http://") && !webdriver_url.starts_with("https://") {
        return Err(invalid(
            "FRUVER_WEBDRIVER_URL",
            format!("'{webdriver_url}' is not an http(s) URL"),
        ));
    }

    let sites_path = PathBuf::from(or_default("FRUVER_SITES_PATH", "./config/sites.yaml"));
    let output_dir = PathBuf::from(or_default("FRUVER_OUTPUT_DIR", "./output"));
    let log_level = or_default("FRUVER_LOG_LEVEL", "info");
    let headless = parse_bool("FRUVER_HEADLESS", "true")?;
    let user_agent = or_default("FRUVER_USER_AGENT", DEFAULT_USER_AGENT);
    let field_timeout_secs = parse_u64("FRUVER_FIELD_TIMEOUT_SECS", "10")?;
    let max_consecutive_faults = parse_u32("FRUVER_MAX_CONSECUTIVE_FAULTS", "3")?;

    let delay_scale = or_default("FRUVER_DELAY_SCALE", "1.0")
        .parse::<f64>()
        .map_err(|e| invalid("FRUVER_DELAY_SCALE", e.to_string()))?;
    if !delay_scale.is_finite() || delay_scale < 0.0 {
        return Err(invalid(
            "FRUVER_DELAY_SCALE",
            format!("{delay_scale} must be a finite, non-negative number"),
        ));
    }

    Ok(AppConfig {
        webdriver_url,
        sites_path,
        output_dir,
        log_level,
        headless,
        user_agent,
        field_timeout_secs,
        max_consecutive_faults,
        delay_scale,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
