//! Resumable, chunked download of a paginated catalog.
//!
//! A download is driven from outside: the caller invokes
//! [`DownloadCoordinator::download_chunk`] with the returned `next_page` while
//! `has_more` is true, then [`DownloadCoordinator::finalize`]. Pages are
//! appended to the source's staging file after every chunk and
//! [`DownloadProgress`] is kept in a [`ProgressStore`], so a run survives
//! process restarts until the progress entry expires.
//!
//! Concurrent chunks for the same source are not supported; the caller must
//! serialize them.

use std::sync::Arc;
use std::time::Duration;

use catsync_core::{CatalogSnapshot, DownloadProgress, DownloadSettings, Source};
use catsync_scraper::{page_url, CatalogClient, RequestSpec};
use chrono::Utc;
use serde::Serialize;

use crate::error::SyncError;
use crate::progress::ProgressStore;
use crate::staging::SnapshotFiles;

/// Why a chunk stopped requesting pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ChunkStop {
    /// `chunk_size` pages were fetched.
    ChunkLimitReached,
    /// A page held fewer than `page_limit` products.
    LastPageReached,
    /// A page held no products at all.
    EmptyPage,
    /// A page could not be fetched or decoded. Pages before it are kept.
    PageFetchFailed { page: u32, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkResult {
    pub source: Source,
    pub start_page: u32,
    pub pages_fetched: u32,
    pub products_in_chunk: usize,
    /// Products accumulated in staging across all chunks so far.
    pub total_products: usize,
    /// `true` only when the chunk was full and its last page was full. The
    /// final page of a catalog that is an exact multiple of `page_limit`
    /// therefore costs one extra, empty, chunk.
    pub has_more: bool,
    /// Page to pass to the next call.
    pub next_page: u32,
    pub stop: ChunkStop,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalizeResult {
    pub source: Source,
    pub products_count: usize,
    pub total_pages_downloaded: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClearResult {
    pub sources: Vec<Source>,
    pub progress_removed: usize,
    pub staging_removed: usize,
}

pub struct DownloadCoordinator {
    client: CatalogClient,
    files: SnapshotFiles,
    progress: Arc<dyn ProgressStore>,
    settings: DownloadSettings,
}

impl DownloadCoordinator {
    pub fn new(
        client: CatalogClient,
        files: SnapshotFiles,
        progress: Arc<dyn ProgressStore>,
        settings: DownloadSettings,
    ) -> Self {
        Self {
            client,
            files,
            progress,
            settings,
        }
    }

    #[must_use]
    pub fn client(&self) -> &CatalogClient {
        &self.client
    }

    #[must_use]
    pub fn files(&self) -> &SnapshotFiles {
        &self.files
    }

    #[must_use]
    pub fn progress_store(&self) -> &dyn ProgressStore {
        self.progress.as_ref()
    }

    /// Fetches up to `chunk_size` pages starting at `start_page` and appends
    /// them to the staging file.
    ///
    /// Page 1 starts a fresh download: staging and progress left behind by an
    /// earlier run are discarded first, so a snapshot never holds a page twice.
    ///
    /// A page that fails to fetch ends the chunk with
    /// [`ChunkStop::PageFetchFailed`] instead of an error, so the pages already
    /// fetched are still staged.
    ///
    /// # Errors
    ///
    /// - [`SyncError::InvalidInput`] when `start_page` is 0.
    /// - [`SyncError::Fetch`] when the request URL cannot be paginated.
    /// - [`SyncError::Persistence`] when staging or progress cannot be written.
    pub async fn download_chunk(
        &self,
        source: Source,
        request: &RequestSpec,
        start_page: u32,
    ) -> Result<ChunkResult, SyncError> {
        if start_page < 1 {
            return Err(SyncError::InvalidInput(
                "start page must be at least 1".to_owned(),
            ));
        }

        if start_page == 1 {
            self.discard_previous_run(source)?;
        }

        let limit = self.settings.page_limit;
        let delay = Duration::from_millis(self.settings.inter_request_delay_ms);
        let mut fetched = Vec::new();
        let mut pages_fetched: u32 = 0;
        let mut last_count: usize = 0;
        let mut stop = ChunkStop::ChunkLimitReached;

        for offset in 0..self.settings.chunk_size {
            let page = start_page.saturating_add(offset);
            if offset > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let url = page_url(&request.url, page, limit)?;
            let products = match self
                .client
                .fetch_page(&url, &request.cookies, &request.headers)
                .await
            {
                Ok(catalog_page) => catalog_page.products,
                Err(e) => {
                    tracing::warn!(%source, page, error = %e, "page fetch failed; ending chunk");
                    stop = ChunkStop::PageFetchFailed {
                        page,
                        message: e.to_string(),
                    };
                    break;
                }
            };

            if products.is_empty() {
                tracing::debug!(%source, page, "empty page");
                stop = ChunkStop::EmptyPage;
                break;
            }

            pages_fetched += 1;
            last_count = products.len();
            tracing::debug!(%source, page, count = last_count, "page fetched");
            fetched.extend(products);

            if last_count < limit as usize {
                stop = ChunkStop::LastPageReached;
                break;
            }
        }

        let has_more = pages_fetched == self.settings.chunk_size && last_count == limit as usize;
        let products_in_chunk = fetched.len();

        let mut staged = self.files.read_staging(source)?.unwrap_or_default();
        staged.extend(fetched);
        self.files.write_staging(source, &staged)?;

        let next_page = start_page.saturating_add(pages_fetched);
        let mut progress = self
            .progress
            .get(source)?
            .unwrap_or_else(|| DownloadProgress::new(source));
        progress.current_page = next_page;
        progress.total_pages_downloaded += pages_fetched;
        progress.total_products = staged.len();
        self.progress.put(
            &progress,
            Duration::from_secs(self.settings.progress_ttl_secs),
        )?;

        tracing::info!(
            %source,
            start_page,
            pages_fetched,
            products_in_chunk,
            total_products = staged.len(),
            has_more,
            ?stop,
            "chunk downloaded"
        );

        Ok(ChunkResult {
            source,
            start_page,
            pages_fetched,
            products_in_chunk,
            total_products: staged.len(),
            has_more,
            next_page,
            stop,
        })
    }

    /// Promotes the staging file to the source's snapshot and forgets the
    /// in-flight download.
    ///
    /// # Errors
    ///
    /// - [`SyncError::StagingMissing`] when no chunk was downloaded.
    /// - [`SyncError::StagingEmpty`] when staging holds no products.
    /// - [`SyncError::Persistence`] when a file cannot be read, written, or removed.
    pub fn finalize(&self, source: Source) -> Result<FinalizeResult, SyncError> {
        let products = self
            .files
            .read_staging(source)?
            .ok_or(SyncError::StagingMissing { catalog: source })?;
        if products.is_empty() {
            return Err(SyncError::StagingEmpty { catalog: source });
        }

        let total_pages_downloaded = self
            .progress
            .get(source)?
            .map_or(0, |p| p.total_pages_downloaded);
        let snapshot = CatalogSnapshot {
            source,
            products,
            fetched_at: Utc::now(),
        };
        self.files.write_snapshot(&snapshot)?;
        self.files.delete_staging(source)?;
        self.progress.delete(source)?;

        tracing::info!(
            %source,
            products = snapshot.products.len(),
            variants = snapshot.variant_count(),
            total_pages_downloaded,
            "snapshot finalized"
        );

        Ok(FinalizeResult {
            source,
            products_count: snapshot.products.len(),
            total_pages_downloaded,
        })
    }

    /// Deletes progress and staging for `source`, or for every source when
    /// `None`. Clearing state that does not exist succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Persistence`] when a file cannot be removed.
    pub fn clear_progress(&self, source: Option<Source>) -> Result<ClearResult, SyncError> {
        let sources: Vec<Source> = source.map_or_else(|| Source::ALL.to_vec(), |s| vec![s]);
        let mut result = ClearResult {
            sources: sources.clone(),
            progress_removed: 0,
            staging_removed: 0,
        };

        for source in sources {
            if self.progress.delete(source)? {
                result.progress_removed += 1;
            }
            if self.files.delete_staging(source)? {
                result.staging_removed += 1;
            }
            tracing::info!(%source, "download progress cleared");
        }

        Ok(result)
    }

    fn discard_previous_run(&self, source: Source) -> Result<(), SyncError> {
        let progress_removed = self.progress.delete(source)?;
        let staging_removed = self.files.delete_staging(source)?;
        if progress_removed || staging_removed {
            tracing::info!(
                %source,
                progress_removed,
                staging_removed,
                "discarded previous download before starting at page 1"
            );
        }
        Ok(())
    }
}
