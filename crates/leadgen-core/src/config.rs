use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Default Google Maps web-services root; endpoint paths are appended to it.
pub const DEFAULT_PLACES_BASE_URL: &str = "https://maps.googleapis.com/maps/api/";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("LEADGEN_ENV", "development"))?;
    let log_level = or_default("LEADGEN_LOG_LEVEL", "info");
    let places_api_key = lookup("LEADGEN_PLACES_API_KEY").ok();
    let places_base_url = or_default("LEADGEN_PLACES_BASE_URL", DEFAULT_PLACES_BASE_URL);

    let request_timeout_secs = parse_u64("LEADGEN_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("LEADGEN_USER_AGENT", "leadgen/0.1 (lead-discovery)");
    let politeness_delay_ms = parse_u64("LEADGEN_POLITENESS_DELAY_MS", "500")?;
    let page_token_delay_ms = parse_u64("LEADGEN_PAGE_TOKEN_DELAY_MS", "2000")?;
    let max_results = parse_usize("LEADGEN_MAX_RESULTS", "300")?;
    let max_retries = parse_u32("LEADGEN_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("LEADGEN_RETRY_BACKOFF_BASE_MS", "1000")?;

    if max_results == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "LEADGEN_MAX_RESULTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        log_level,
        places_api_key,
        places_base_url,
        request_timeout_secs,
        user_agent,
        politeness_delay_ms,
        page_token_delay_ms,
        max_results,
        max_retries,
        retry_backoff_base_ms,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LEADGEN_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
