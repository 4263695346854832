use std::path::PathBuf;

use rust_decimal::Decimal;

use crate::app_config::{AppConfig, DownloadSettings, Environment, PricingSettings};
use crate::ConfigError;

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
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Blank values count as unset so `.env` templates can leave them empty.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_decimal = |var: &str, default: &str| -> Result<Decimal, ConfigError> {
        let value = or_default(var, default)
            .trim()
            .parse::<Decimal>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value.is_sign_negative() {
            return Err(invalid(var, format!("must not be negative, got {value}")));
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("CATSYNC_ENV", "development"))?;
    let log_level = or_default("CATSYNC_LOG_LEVEL", "info");
    let data_dir = PathBuf::from(or_default("CATSYNC_DATA_DIR", "./data"));

    let dealer_request = optional("CATSYNC_DEALER_REQUEST");
    let retail_request = optional("CATSYNC_RETAIL_REQUEST");
    let dealer_storefront_url =
        optional("CATSYNC_DEALER_STOREFRONT_URL").map(|url| url.trim_end_matches('/').to_string());
    let user_agent = or_default("CATSYNC_USER_AGENT", "catsync/0.1 (catalog-sync)");

    let margin_percent = parse_decimal("CATSYNC_MARGIN_PERCENT", "20")?;
    if margin_percent > Decimal::ONE_THOUSAND {
        return Err(invalid(
            "CATSYNC_MARGIN_PERCENT",
            format!("must be between 0 and 1000, got {margin_percent}"),
        ));
    }
    let discount_percent = parse_decimal("CATSYNC_DISCOUNT_PERCENT", "10")?;
    if discount_percent > Decimal::ONE_HUNDRED {
        return Err(invalid(
            "CATSYNC_DISCOUNT_PERCENT",
            format!("must be between 0 and 100, got {discount_percent}"),
        ));
    }
    let price_change_threshold = parse_decimal("CATSYNC_PRICE_CHANGE_THRESHOLD", "0.2")?;
    let retail_to_dealer_rate = parse_decimal("CATSYNC_RETAIL_TO_DEALER_RATE", "1")?;
    if retail_to_dealer_rate.is_zero() {
        return Err(invalid(
            "CATSYNC_RETAIL_TO_DEALER_RATE",
            "must be greater than 0".to_string(),
        ));
    }

    let chunk_size = parse_u32("CATSYNC_CHUNK_SIZE", "5")?;
    if chunk_size == 0 {
        return Err(invalid("CATSYNC_CHUNK_SIZE", "must be at least 1".to_string()));
    }
    let page_limit = parse_u32("CATSYNC_PAGE_LIMIT", "250")?;
    if page_limit == 0 {
        return Err(invalid("CATSYNC_PAGE_LIMIT", "must be at least 1".to_string()));
    }
    let inter_request_delay_ms = parse_u64("CATSYNC_INTER_REQUEST_DELAY_MS", "200")?;
    let request_timeout_secs = parse_u64("CATSYNC_REQUEST_TIMEOUT_SECS", "30")?;
    let max_redirects = parse_usize("CATSYNC_MAX_REDIRECTS", "5")?;
    let progress_ttl_secs = parse_u64("CATSYNC_PROGRESS_TTL_SECS", "3600")?;

    Ok(AppConfig {
        env,
        log_level,
        data_dir,
        dealer_request,
        retail_request,
        dealer_storefront_url,
        user_agent,
        pricing: PricingSettings {
            margin_percent,
            discount_percent,
            price_change_threshold,
            retail_to_dealer_rate,
        },
        download: DownloadSettings {
            chunk_size,
            page_limit,
            inter_request_delay_ms,
            request_timeout_secs,
            max_redirects,
            progress_ttl_secs,
        },
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CATSYNC_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
