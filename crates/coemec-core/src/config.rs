use crate::app_config::{AppConfig, Environment};
use crate::manual::ManualParsePolicy;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is invalid, or if `COEMEC_SUBMIT_URL` is
/// missing in production.
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
/// Returns `ConfigError` if a value is invalid, or if `COEMEC_SUBMIT_URL` is
/// missing in production.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got '{other}'"))),
        }
    };

    let env = parse_environment(&or_default("COEMEC_ENV", "development"))?;
    let log_level = or_default("COEMEC_LOG_LEVEL", "info")
        .parse::<tracing::Level>()
        .map_err(|e| invalid("COEMEC_LOG_LEVEL", e.to_string()))?;

    let submit_url = lookup("COEMEC_SUBMIT_URL")
        .ok()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty());
    if submit_url.is_none() && env == Environment::Production {
        return Err(ConfigError::MissingEnvVar("COEMEC_SUBMIT_URL".to_string()));
    }
    let submit_timeout_secs = parse_u64("COEMEC_SUBMIT_TIMEOUT_SECS", "30")?;
    let submit_max_retries = parse_u32("COEMEC_SUBMIT_MAX_RETRIES", "3")?;
    let submit_retry_backoff_ms = parse_u64("COEMEC_SUBMIT_RETRY_BACKOFF_MS", "1000")?;
    let submit_user_agent = or_default("COEMEC_SUBMIT_USER_AGENT", "coemec/0.1 (relevamiento)");

    let geo_high_accuracy = parse_bool("COEMEC_GEO_HIGH_ACCURACY", "true")?;
    let geo_timeout_ms = parse_u64("COEMEC_GEO_TIMEOUT_MS", "10000")?;
    let geo_maximum_age_ms = parse_u64("COEMEC_GEO_MAXIMUM_AGE_MS", "0")?;

    let manual_coordinate_policy = or_default("COEMEC_MANUAL_COORDINATE_POLICY", "strict")
        .parse::<ManualParsePolicy>()
        .map_err(|reason| invalid("COEMEC_MANUAL_COORDINATE_POLICY", reason))?;

    let map_zoom = or_default("COEMEC_MAP_ZOOM", "16")
        .parse::<u8>()
        .map_err(|e| invalid("COEMEC_MAP_ZOOM", e.to_string()))?;
    if map_zoom > 21 {
        return Err(invalid(
            "COEMEC_MAP_ZOOM",
            format!("zoom {map_zoom} is outside 0..=21"),
        ));
    }

    Ok(AppConfig {
        env,
        log_level,
        submit_url,
        submit_timeout_secs,
        submit_max_retries,
        submit_retry_backoff_ms,
        submit_user_agent,
        geo_high_accuracy,
        geo_timeout_ms,
        geo_maximum_age_ms,
        manual_coordinate_policy,
        map_zoom,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "COEMEC_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
