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

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_test() {
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "CATSYNC_ENV"));
}

#[test]
fn build_app_config_applies_defaults_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.data_dir, PathBuf::from("./data"));
    assert!(cfg.dealer_request.is_none());
    assert!(cfg.retail_request.is_none());
    assert!(cfg.dealer_storefront_url.is_none());
    assert_eq!(cfg.user_agent, "catsync/0.1 (catalog-sync)");
    assert_eq!(cfg.pricing.margin_percent, dec("20"));
    assert_eq!(cfg.pricing.discount_percent, dec("10"));
    assert_eq!(cfg.pricing.price_change_threshold, dec("0.2"));
    assert_eq!(cfg.pricing.retail_to_dealer_rate, Decimal::ONE);
    assert_eq!(cfg.download.chunk_size, 5);
    assert_eq!(cfg.download.page_limit, 250);
    assert_eq!(cfg.download.inter_request_delay_ms, 200);
    assert_eq!(cfg.download.request_timeout_secs, 30);
    assert_eq!(cfg.download.max_redirects, 5);
    assert_eq!(cfg.download.progress_ttl_secs, 3600);
}

#[test]
fn build_app_config_reads_request_descriptors() {
    let mut map = HashMap::new();
    map.insert(
        "CATSYNC_DEALER_REQUEST",
        "curl 'https://b2b.example.com/products.json' -b 'session=abc'",
    );
    map.insert("CATSYNC_RETAIL_REQUEST", "curl https://shop.example.com/products.json");
    map.insert("CATSYNC_DEALER_STOREFRONT_URL", "https://b2b.example.com/");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.dealer_request.as_deref().unwrap().contains("session=abc"));
    assert_eq!(
        cfg.request_for(crate::Source::Retail),
        Some("curl https://shop.example.com/products.json")
    );
    assert_eq!(
        cfg.dealer_storefront_url.as_deref(),
        Some("https://b2b.example.com")
    );
}

#[test]
fn blank_request_descriptor_is_treated_as_unset() {
    let mut map = HashMap::new();
    map.insert("CATSYNC_DEALER_REQUEST", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.request_for(crate::Source::Dealer).is_none());
}

#[test]
fn debug_output_redacts_request_descriptors() {
    let mut map = HashMap::new();
    map.insert("CATSYNC_DEALER_REQUEST", "curl 'https://x' -b 'session=secret-cookie'");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("secret-cookie"), "leaked: {rendered}");
    assert!(rendered.contains("[redacted]"));
}

#[test]
fn pricing_overrides_are_parsed_as_decimals() {
    let mut map = HashMap::new();
    map.insert("CATSYNC_MARGIN_PERCENT", "35.5");
    map.insert("CATSYNC_DISCOUNT_PERCENT", "0");
    map.insert("CATSYNC_PRICE_CHANGE_THRESHOLD", "1.00");
    map.insert("CATSYNC_RETAIL_TO_DEALER_RATE", "0.92");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.pricing.margin_percent, dec("35.5"));
    assert_eq!(cfg.pricing.discount_percent, Decimal::ZERO);
    assert_eq!(cfg.pricing.price_change_threshold, dec("1.00"));
    assert_eq!(cfg.pricing.retail_to_dealer_rate, dec("0.92"));
}

#[test]
fn discount_above_one_hundred_is_rejected() {
    let mut map = HashMap::new();
    map.insert("CATSYNC_DISCOUNT_PERCENT", "120");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CATSYNC_DISCOUNT_PERCENT"),
        "expected InvalidEnvVar(CATSYNC_DISCOUNT_PERCENT), got: {result:?}"
    );
}

#[test]
fn negative_margin_is_rejected() {
    let mut map = HashMap::new();
    map.insert("CATSYNC_MARGIN_PERCENT", "-5");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CATSYNC_MARGIN_PERCENT"),
        "expected InvalidEnvVar(CATSYNC_MARGIN_PERCENT), got: {result:?}"
    );
}

#[test]
fn non_numeric_margin_is_rejected() {
    let mut map = HashMap::new();
    map.insert("CATSYNC_MARGIN_PERCENT", "twenty");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CATSYNC_MARGIN_PERCENT"),
        "expected InvalidEnvVar(CATSYNC_MARGIN_PERCENT), got: {result:?}"
    );
}

#[test]
fn zero_exchange_rate_is_rejected() {
    let mut map = HashMap::new();
    map.insert("CATSYNC_RETAIL_TO_DEALER_RATE", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CATSYNC_RETAIL_TO_DEALER_RATE"),
        "expected InvalidEnvVar(CATSYNC_RETAIL_TO_DEALER_RATE), got: {result:?}"
    );
}

#[test]
fn chunk_size_override() {
    let mut map = HashMap::new();
    map.insert("CATSYNC_CHUNK_SIZE", "10");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.download.chunk_size, 10);
}

#[test]
fn zero_chunk_size_is_rejected() {
    let mut map = HashMap::new();
    map.insert("CATSYNC_CHUNK_SIZE", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CATSYNC_CHUNK_SIZE"),
        "expected InvalidEnvVar(CATSYNC_CHUNK_SIZE), got: {result:?}"
    );
}

#[test]
fn request_timeout_secs_invalid() {
    let mut map = HashMap::new();
    map.insert("CATSYNC_REQUEST_TIMEOUT_SECS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CATSYNC_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(CATSYNC_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn inter_request_delay_ms_override() {
    let mut map = HashMap::new();
    map.insert("CATSYNC_INTER_REQUEST_DELAY_MS", "0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.download.inter_request_delay_ms, 0);
}

#[test]
fn progress_ttl_secs_override() {
    let mut map = HashMap::new();
    map.insert("CATSYNC_PROGRESS_TTL_SECS", "60");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.download.progress_ttl_secs, 60);
}
