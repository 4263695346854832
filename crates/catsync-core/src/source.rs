use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the two remote catalogs the sync engine reconciles against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Wholesale (B2B) catalog providing dealer-cost pricing.
    Dealer,
    /// Public storefront catalog providing reference retail pricing.
    Retail,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::Dealer, Source::Retail];

    /// Lowercase identifier used in file names and progress-store keys.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Source::Dealer => "dealer",
            Source::Retail => "retail",
        }
    }

    /// Progress-store key for this source, e.g. `"download_progress_dealer"`.
    #[must_use]
    pub fn progress_key(self) -> String {
        format!("download_progress_{}", self.key())
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Error)]
#[error("unknown catalog source \"{0}\" (expected \"dealer\" or \"retail\")")]
pub struct UnknownSource(pub String);

impl FromStr for Source {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dealer" | "b2b" => Ok(Source::Dealer),
            "retail" => Ok(Source::Retail),
            other => Err(UnknownSource(other.to_owned())),
        }
    }
}
