//! TTL-bounded storage for in-flight [`DownloadProgress`] entries.
//!
//! Entries are keyed by [`Source::progress_key`] and expire on their own when
//! a caller abandons a download without finalizing or clearing it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use catsync_core::{DownloadProgress, Source};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::files::{read_json, write_json};

/// Keyed, expiring store for download progress.
pub trait ProgressStore: Send + Sync {
    /// Current progress for `source`, or `None` if absent or expired.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the backing storage fails.
    fn get(&self, source: Source) -> Result<Option<DownloadProgress>, PersistenceError>;

    /// Inserts or replaces the entry for `progress.source`, expiring after `ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the backing storage fails.
    fn put(&self, progress: &DownloadProgress, ttl: Duration) -> Result<(), PersistenceError>;

    /// Removes the entry for `source`; `Ok(false)` when there was none.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the backing storage fails.
    fn delete(&self, source: Source) -> Result<bool, PersistenceError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProgressEntry {
    progress: DownloadProgress,
    expires_at: DateTime<Utc>,
}

impl ProgressEntry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

fn expiry_after(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Process-local progress store.
#[derive(Debug, Default)]
pub struct InMemoryProgressStore {
    entries: Mutex<HashMap<String, ProgressEntry>>,
}

impl InMemoryProgressStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for InMemoryProgressStore {
    fn get(&self, source: Source) -> Result<Option<DownloadProgress>, PersistenceError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let key = source.progress_key();
        match entries.get(&key) {
            Some(entry) if entry.is_live(Utc::now()) => Ok(Some(entry.progress.clone())),
            Some(_) => {
                entries.remove(&key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn put(&self, progress: &DownloadProgress, ttl: Duration) -> Result<(), PersistenceError> {
        let entry = ProgressEntry {
            progress: progress.clone(),
            expires_at: expiry_after(Utc::now(), ttl),
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(progress.source.progress_key(), entry);
        Ok(())
    }

    fn delete(&self, source: Source) -> Result<bool, PersistenceError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&source.progress_key())
            .is_some())
    }
}

/// Progress store persisted as a single JSON document (`progress.json`), so
/// a download can be resumed by a later CLI invocation.
///
/// Expired entries are pruned whenever the document is rewritten.
#[derive(Debug)]
pub struct FileProgressStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<HashMap<String, ProgressEntry>, PersistenceError> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }

    fn save(&self, mut entries: HashMap<String, ProgressEntry>) -> Result<(), PersistenceError> {
        let now = Utc::now();
        entries.retain(|_, entry| entry.is_live(now));
        write_json(&self.path, &entries)
    }
}

impl ProgressStore for FileProgressStore {
    fn get(&self, source: Source) -> Result<Option<DownloadProgress>, PersistenceError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let entries = self.load()?;
        Ok(entries
            .get(&source.progress_key())
            .filter(|entry| entry.is_live(Utc::now()))
            .map(|entry| entry.progress.clone()))
    }

    fn put(&self, progress: &DownloadProgress, ttl: Duration) -> Result<(), PersistenceError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        entries.insert(
            progress.source.progress_key(),
            ProgressEntry {
                progress: progress.clone(),
                expires_at: expiry_after(Utc::now(), ttl),
            },
        );
        self.save(entries)
    }

    fn delete(&self, source: Source) -> Result<bool, PersistenceError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        let removed = entries.remove(&source.progress_key());
        let existed = removed.is_some_and(|entry| entry.is_live(Utc::now()));
        self.save(entries)?;
        Ok(existed)
    }
}
