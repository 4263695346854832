pub mod app_config;
pub mod config;
pub mod local;
pub mod products;
pub mod progress;
pub mod source;

use thiserror::Error;

pub use app_config::{AppConfig, DownloadSettings, Environment, PricingSettings};
pub use config::{load_app_config, load_app_config_from_env};
pub use local::{LocalProduct, LocalVariation, NewLocalProduct, ProductKind};
pub use products::{CatalogSnapshot, ProductOption, SourceProduct, SourceVariant};
pub use progress::DownloadProgress;
pub use source::{Source, UnknownSource};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
