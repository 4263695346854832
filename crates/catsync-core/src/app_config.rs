use std::path::PathBuf;

use rust_decimal::Decimal;

use crate::source::Source;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Knobs for the dealer-price-to-retail-price computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingSettings {
    /// Markup applied on top of dealer cost, in percent.
    pub margin_percent: Decimal,
    /// Required discount below the reference retail price, in percent (0..=100).
    pub discount_percent: Decimal,
    /// Minimum absolute price difference that triggers a local price update.
    pub price_change_threshold: Decimal,
    /// Conversion factor from retail-catalog currency to dealer-catalog currency.
    pub retail_to_dealer_rate: Decimal,
}

/// Knobs for the resumable chunked download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    pub chunk_size: u32,
    pub page_limit: u32,
    pub inter_request_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub max_redirects: usize,
    pub progress_ttl_secs: u64,
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Directory holding staging files, final snapshots, progress, and the
    /// local catalog file.
    pub data_dir: PathBuf,
    /// Captured curl command used to fetch the dealer catalog. Carries session
    /// cookies, so it is never logged.
    pub dealer_request: Option<String>,
    /// Captured curl command used to fetch the retail catalog.
    pub retail_request: Option<String>,
    /// Public storefront base URL used to build links for dealer products.
    pub dealer_storefront_url: Option<String>,
    pub user_agent: String,
    pub pricing: PricingSettings,
    pub download: DownloadSettings,
}

impl AppConfig {
    /// Raw request descriptor configured for `source`, if any.
    #[must_use]
    pub fn request_for(&self, source: Source) -> Option<&str> {
        match source {
            Source::Dealer => self.dealer_request.as_deref(),
            Source::Retail => self.retail_request.as_deref(),
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("data_dir", &self.data_dir)
            .field(
                "dealer_request",
                &self.dealer_request.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "retail_request",
                &self.retail_request.as_ref().map(|_| "[redacted]"),
            )
            .field("dealer_storefront_url", &self.dealer_storefront_url)
            .field("user_agent", &self.user_agent)
            .field("pricing", &self.pricing)
            .field("download", &self.download)
            .finish()
    }
}
