//! On-disk staging and snapshot documents, one pair per catalog source.
//!
//! Both are pretty-printed `{ "products": [...] }` documents. The staging
//! file (`{source}_products_temp.json`) accumulates pages while a download is
//! in flight; finalizing copies it wholesale to `{source}_products.json`.

use std::path::{Path, PathBuf};

use catsync_core::{CatalogSnapshot, Source, SourceProduct};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::files::{read_json, remove_if_exists, write_json};

#[derive(Debug, Serialize, Deserialize)]
struct ProductsDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fetched_at: Option<DateTime<Utc>>,
    #[serde(default)]
    products: Vec<SourceProduct>,
}

/// Locations of the staging and snapshot files under a data directory.
#[derive(Debug, Clone)]
pub struct SnapshotFiles {
    dir: PathBuf,
}

impl SnapshotFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn staging_path(&self, source: Source) -> PathBuf {
        self.dir.join(format!("{}_products_temp.json", source.key()))
    }

    #[must_use]
    pub fn snapshot_path(&self, source: Source) -> PathBuf {
        self.dir.join(format!("{}_products.json", source.key()))
    }

    /// Staged products, or `None` when no staging file exists.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the file exists but cannot be read or decoded.
    pub fn read_staging(&self, source: Source) -> Result<Option<Vec<SourceProduct>>, PersistenceError> {
        Ok(read_json::<ProductsDocument>(&self.staging_path(source))?.map(|doc| doc.products))
    }

    /// Replaces the staging file with `products`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the file cannot be written.
    pub fn write_staging(&self, source: Source, products: &[SourceProduct]) -> Result<(), PersistenceError> {
        write_json(
            &self.staging_path(source),
            &ProductsDocumentRef {
                fetched_at: None,
                products,
            },
        )
    }

    /// Deletes the staging file; `Ok(false)` when there was none.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if an existing file cannot be removed.
    pub fn delete_staging(&self, source: Source) -> Result<bool, PersistenceError> {
        remove_if_exists(&self.staging_path(source))
    }

    /// Writes the finalized snapshot, replacing any previous one wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the file cannot be written.
    pub fn write_snapshot(&self, snapshot: &CatalogSnapshot) -> Result<(), PersistenceError> {
        write_json(
            &self.snapshot_path(snapshot.source),
            &ProductsDocumentRef {
                fetched_at: Some(snapshot.fetched_at),
                products: &snapshot.products,
            },
        )
    }

    /// Loads the finalized snapshot for `source`, or `None` if it was never
    /// finalized.
    ///
    /// Snapshots written without a `fetched_at` field take the file's
    /// modification time instead.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the file exists but cannot be read or decoded.
    pub fn load_snapshot(&self, source: Source) -> Result<Option<CatalogSnapshot>, PersistenceError> {
        let path = self.snapshot_path(source);
        let Some(doc) = read_json::<ProductsDocument>(&path)? else {
            return Ok(None);
        };
        let fetched_at = match doc.fetched_at {
            Some(at) => at,
            None => std::fs::metadata(&path)
                .and_then(|m| m.modified())
                .map(DateTime::<Utc>::from)
                .map_err(|source| PersistenceError::Read {
                    path: path.clone(),
                    source,
                })?,
        };
        Ok(Some(CatalogSnapshot {
            source,
            products: doc.products,
            fetched_at,
        }))
    }
}

#[derive(Serialize)]
struct ProductsDocumentRef<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    fetched_at: Option<DateTime<Utc>>,
    products: &'a [SourceProduct],
}
