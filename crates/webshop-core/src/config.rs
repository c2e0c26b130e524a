use crate::app_config::{AppConfig, Credentials, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing and validation live here, decoupled from the real environment so
/// tests can drive it with a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

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

    let api_url = require("WEBSHOP_API_URL")?;
    let username = require("WEBSHOP_USERNAME")?;
    let password = require("WEBSHOP_PASSWORD")?;

    let env = parse_environment(&or_default("WEBSHOP_ENV", "development"))?;
    let log_level = or_default("WEBSHOP_LOG_LEVEL", "info");

    let shop_id = match lookup("WEBSHOP_SHOP_ID") {
        Ok(raw) => Some(raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: "WEBSHOP_SHOP_ID".to_string(),
            reason: e.to_string(),
        })?),
        Err(_) => None,
    };
    let asset_host = or_default("WEBSHOP_ASSET_HOST", "webshopapp.net");

    let request_timeout_secs = parse_u64("WEBSHOP_REQUEST_TIMEOUT_SECS", "30")?;
    let recent_order_days = parse_u32("WEBSHOP_RECENT_ORDER_DAYS", "1")?;
    let recent_order_statuses =
        parse_status_list(&or_default("WEBSHOP_RECENT_ORDER_STATUSES", "1,2,3,4,5,6,7"))
            .map_err(|reason| ConfigError::InvalidEnvVar {
                var: "WEBSHOP_RECENT_ORDER_STATUSES".to_string(),
                reason,
            })?;

    Ok(AppConfig {
        api_url,
        credentials: Credentials { username, password },
        env,
        log_level,
        shop_id,
        asset_host,
        request_timeout_secs,
        recent_order_days,
        recent_order_statuses,
    })
}

/// Parses a comma-separated list of numeric order status codes, keeping the
/// order and any repeats exactly as written.
///
/// # Errors
///
/// Returns a description of the first entry that is not a valid `u32`.
pub fn parse_status_list(raw: &str) -> Result<Vec<u32>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .map_err(|e| format!("status code \"{s}\": {e}"))
        })
        .collect()
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "WEBSHOP_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
