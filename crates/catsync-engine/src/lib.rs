pub mod classify;
pub mod download;
pub mod error;
mod files;
pub mod import;
pub mod index;
pub mod matcher;
pub mod outcome;
pub mod pricing;
pub mod progress;
pub mod service;
pub mod staging;
pub mod store;
pub mod taxonomy;
pub mod variations;

pub use classify::{classify, classify_all, Classification, ClassificationReason, ClassificationReport};
pub use download::{ChunkResult, ChunkStop, ClearResult, DownloadCoordinator, FinalizeResult};
pub use error::{PersistenceError, StoreError, SyncError};
pub use import::{import_products, ImportAction, ImportOptions, ImportReport};
pub use index::CatalogIndex;
pub use matcher::{analyze, find_missing, MatchStats, MissingOptions, MissingProduct, MissingReport};
pub use outcome::OperationOutcome;
pub use pricing::{compute_price, convert_retail, should_update, PricingPolicy, PricingResult};
pub use progress::{FileProgressStore, InMemoryProgressStore, ProgressStore};
pub use service::{AccessReport, CatalogSync, PriceUpdate, PriceUpdateReport};
pub use staging::SnapshotFiles;
pub use store::{CatalogStore, InMemoryCatalogStore};
pub use taxonomy::{normalize_slug, TaxonomyResolver};
pub use variations::{attribute_map, generate_variations, VariationDescriptor};
