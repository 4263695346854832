use std::path::PathBuf;

use catsync_core::Source;
use catsync_scraper::{FetchError, ParseError};
use thiserror::Error;

/// Failure reading or writing staging, snapshot, progress, or catalog files.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to delete {}: {source}", path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode {context}: {source}")]
    Encode {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure reported by a catalog store or taxonomy resolver.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("local product {id} not found")]
    NotFound { id: u64 },

    #[error("SKU \"{sku}\" already belongs to local product {existing_id}")]
    DuplicateSku { sku: String, existing_id: u64 },

    #[error("cannot derive a slug from \"{name}\"")]
    EmptySlug { name: String },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Every failure a [`crate::CatalogSync`] operation can report.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("invalid request descriptor: {0}")]
    Parse(#[from] ParseError),

    #[error("catalog fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("catalog store error: {0}")]
    Store(#[from] StoreError),

    #[error("no request descriptor configured for the {catalog} catalog")]
    NotConfigured { catalog: Source },

    #[error("no staging file for the {catalog} catalog; download a chunk first")]
    StagingMissing { catalog: Source },

    #[error("staging file for the {catalog} catalog holds no products")]
    StagingEmpty { catalog: Source },

    #[error("no finalized snapshot for the {catalog} catalog; download and finalize it first")]
    SnapshotMissing { catalog: Source },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl SyncError {
    /// Stable machine-readable code for the failure.
    #[must_use]
    pub fn reason_code(&self) -> &'static str {
        match self {
            SyncError::Parse(_) => "parse_error",
            SyncError::Fetch(_) => "fetch_error",
            SyncError::Persistence(_) => "persistence_error",
            SyncError::Store(_) => "store_error",
            SyncError::NotConfigured { .. } => "not_configured",
            SyncError::StagingMissing { .. } => "staging_missing",
            SyncError::StagingEmpty { .. } => "staging_empty",
            SyncError::SnapshotMissing { .. } => "snapshot_missing",
            SyncError::InvalidInput(_) => "invalid_input",
        }
    }
}
