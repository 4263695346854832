//! `CatalogSync`: the operations exposed to the CLI, wiring configuration,
//! the download coordinator, the snapshots, and the local catalog together.

use std::collections::HashSet;
use std::sync::Arc;

use catsync_core::{AppConfig, CatalogSnapshot, DownloadProgress, Source};
use catsync_scraper::{page_url, store_origin, CatalogClient, RequestSpec};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::classify::{classify_all, ClassificationReport};
use crate::download::{ChunkResult, ClearResult, DownloadCoordinator, FinalizeResult};
use crate::error::SyncError;
use crate::import::{import_products, ImportOptions, ImportReport};
use crate::index::CatalogIndex;
use crate::matcher::{analyze, find_missing, MatchStats, MissingOptions, MissingReport};
use crate::pricing::{compute_price, convert_retail, should_update, PricingPolicy};
use crate::progress::{FileProgressStore, ProgressStore};
use crate::staging::SnapshotFiles;
use crate::store::{CatalogStore, InMemoryCatalogStore};
use crate::taxonomy::TaxonomyResolver;

pub const PROGRESS_FILE: &str = "progress.json";
pub const LOCAL_CATALOG_FILE: &str = "local_catalog.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessReport {
    pub source: Source,
    pub url: String,
    pub accessible: bool,
    pub products_on_first_page: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceUpdate {
    pub product_id: u64,
    pub sku: String,
    pub old_price: Option<Decimal>,
    pub new_price: Decimal,
    pub dealer_price: Decimal,
    pub retail_price: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PriceUpdateReport {
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
    pub details: Vec<PriceUpdate>,
}

pub struct CatalogSync {
    config: AppConfig,
    downloads: DownloadCoordinator,
    store: Arc<dyn CatalogStore>,
    taxonomy: Arc<dyn TaxonomyResolver>,
}

impl CatalogSync {
    /// Builds the service around explicit collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Fetch`] if the HTTP client cannot be built.
    pub fn new(
        config: AppConfig,
        progress: Arc<dyn ProgressStore>,
        store: Arc<dyn CatalogStore>,
        taxonomy: Arc<dyn TaxonomyResolver>,
    ) -> Result<Self, SyncError> {
        let client = CatalogClient::new(
            config.download.request_timeout_secs,
            config.download.max_redirects,
            &config.user_agent,
        )?;
        let downloads = DownloadCoordinator::new(
            client,
            SnapshotFiles::new(&config.data_dir),
            progress,
            config.download.clone(),
        );
        Ok(Self {
            config,
            downloads,
            store,
            taxonomy,
        })
    }

    /// Builds the service with file-backed progress and local catalog under
    /// `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] if the local catalog file cannot be loaded or the
    /// HTTP client cannot be built.
    pub fn open(config: AppConfig) -> Result<Self, SyncError> {
        let progress = Arc::new(FileProgressStore::new(config.data_dir.join(PROGRESS_FILE)));
        let catalog = Arc::new(InMemoryCatalogStore::open(
            config.data_dir.join(LOCAL_CATALOG_FILE),
        )?);
        Self::new(config, progress, catalog.clone(), catalog)
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// # Errors
    ///
    /// - [`SyncError::NotConfigured`] when no descriptor is set for `source`.
    /// - [`SyncError::Parse`] when the descriptor has no usable URL.
    pub fn request_spec(&self, source: Source) -> Result<RequestSpec, SyncError> {
        let descriptor = self
            .config
            .request_for(source)
            .ok_or(SyncError::NotConfigured { catalog: source })?;
        Ok(RequestSpec::parse(descriptor)?)
    }

    /// # Errors
    ///
    /// See [`DownloadCoordinator::download_chunk`]; also fails fast when the
    /// source has no usable request descriptor.
    pub async fn download_chunk(
        &self,
        source: Source,
        start_page: u32,
    ) -> Result<ChunkResult, SyncError> {
        let request = self.request_spec(source)?;
        self.downloads
            .download_chunk(source, &request, start_page)
            .await
    }

    /// # Errors
    ///
    /// See [`DownloadCoordinator::finalize`].
    pub fn finalize(&self, source: Source) -> Result<FinalizeResult, SyncError> {
        self.downloads.finalize(source)
    }

    /// # Errors
    ///
    /// See [`DownloadCoordinator::clear_progress`].
    pub fn clear_progress(&self, source: Option<Source>) -> Result<ClearResult, SyncError> {
        self.downloads.clear_progress(source)
    }

    /// In-flight download state for `source`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Persistence`] if the progress store fails.
    pub fn progress(&self, source: Source) -> Result<Option<DownloadProgress>, SyncError> {
        Ok(self.downloads.progress_store().get(source)?)
    }

    /// Fetches page 1 once. A fetch failure is reported in the result, not
    /// returned as an error.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotConfigured`] or [`SyncError::Parse`] before any
    /// request is made, or [`SyncError::Fetch`] if the URL cannot be paginated.
    pub async fn check_access(&self, source: Source) -> Result<AccessReport, SyncError> {
        let request = self.request_spec(source)?;
        let url = page_url(&request.url, 1, self.config.download.page_limit)?;
        let report = match self
            .downloads
            .client()
            .fetch_page(&url, &request.cookies, &request.headers)
            .await
        {
            Ok(page) => AccessReport {
                source,
                url,
                accessible: true,
                products_on_first_page: page.products.len(),
                error: None,
            },
            Err(e) => AccessReport {
                source,
                url,
                accessible: false,
                products_on_first_page: 0,
                error: Some(e.to_string()),
            },
        };
        tracing::info!(
            %source,
            accessible = report.accessible,
            products = report.products_on_first_page,
            "access check"
        );
        Ok(report)
    }

    /// Match counts of every local product against both snapshots.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::SnapshotMissing`] unless both catalogs are
    /// finalized, or a store/persistence failure.
    pub fn analyze(&self) -> Result<MatchStats, SyncError> {
        let dealer = self.require_snapshot(Source::Dealer)?;
        let retail = self.require_snapshot(Source::Retail)?;
        let local = self.store.list_products()?;
        Ok(analyze(
            &local,
            &CatalogIndex::from_snapshot(&dealer),
            &CatalogIndex::from_snapshot(&retail),
        ))
    }

    /// Dealer products with no local counterpart, priced and linked.
    ///
    /// The retail snapshot is optional here; without it no retail ceiling
    /// applies.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::SnapshotMissing`] without a dealer snapshot, or a
    /// store/persistence failure.
    pub fn find_missing(&self) -> Result<MissingReport, SyncError> {
        let dealer = self.require_snapshot(Source::Dealer)?;
        let retail = self.optional_index(Source::Retail)?;
        let local_skus: HashSet<String> = self
            .store
            .list_products()?
            .iter()
            .filter_map(|p| p.trimmed_sku().map(str::to_owned))
            .collect();

        let storefront = self.storefront_url();
        Ok(find_missing(
            &local_skus,
            &dealer,
            &retail,
            MissingOptions {
                policy: self.policy(),
                retail_to_dealer_rate: self.config.pricing.retail_to_dealer_rate,
                storefront_url: storefront.as_deref(),
            },
        ))
    }

    /// Reprices every dealer-linked local product whose price moved by more
    /// than the configured threshold.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::SnapshotMissing`] unless both catalogs are
    /// finalized, or a failure listing the local catalog. Failures writing a
    /// single price are counted in `errors`.
    pub fn update_all_prices(&self) -> Result<PriceUpdateReport, SyncError> {
        let dealer = CatalogIndex::from_snapshot(&self.require_snapshot(Source::Dealer)?);
        let retail = CatalogIndex::from_snapshot(&self.require_snapshot(Source::Retail)?);
        let threshold = self.config.pricing.price_change_threshold;
        let rate = self.config.pricing.retail_to_dealer_rate;
        let policy = self.policy();
        let mut report = PriceUpdateReport::default();

        for product in self.store.list_products()? {
            if !product.is_dealer_linked() {
                continue;
            }
            let Some(sku) = product.trimmed_sku() else {
                report.skipped += 1;
                continue;
            };
            let Some(dealer_price) = dealer.price(sku) else {
                report.skipped += 1;
                continue;
            };
            let retail_price = retail.price(sku).and_then(|price| convert_retail(price, rate));
            let Some(pricing) = compute_price(dealer_price, retail_price, policy) else {
                report.skipped += 1;
                continue;
            };

            let current = product.regular_price.unwrap_or(Decimal::ZERO);
            if !should_update(current, pricing.final_price, threshold) {
                report.skipped += 1;
                continue;
            }

            match self.store.set_regular_price(product.id, pricing.final_price) {
                Ok(()) => {
                    tracing::debug!(
                        product_id = product.id,
                        sku,
                        old = %current,
                        new = %pricing.final_price,
                        "price updated"
                    );
                    report.updated += 1;
                    report.details.push(PriceUpdate {
                        product_id: product.id,
                        sku: sku.to_owned(),
                        old_price: product.regular_price,
                        new_price: pricing.final_price,
                        dealer_price,
                        retail_price: pricing.retail_price,
                    });
                }
                Err(e) => {
                    tracing::warn!(product_id = product.id, sku, error = %e, "price update failed");
                    report.errors += 1;
                }
            }
        }

        tracing::info!(
            updated = report.updated,
            skipped = report.skipped,
            errors = report.errors,
            "price update finished"
        );
        Ok(report)
    }

    /// # Errors
    ///
    /// Returns [`SyncError::SnapshotMissing`] without a dealer snapshot.
    pub fn classify_all(&self) -> Result<ClassificationReport, SyncError> {
        let dealer = self.require_snapshot(Source::Dealer)?;
        Ok(classify_all(&dealer.products))
    }

    /// Creates or updates a local product for every dealer product.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::SnapshotMissing`] without a dealer snapshot.
    /// Per-product failures are reported in the result.
    pub fn import_products(&self) -> Result<ImportReport, SyncError> {
        let dealer = self.require_snapshot(Source::Dealer)?;
        let retail = self.optional_index(Source::Retail)?;
        Ok(import_products(
            self.store.as_ref(),
            self.taxonomy.as_ref(),
            &dealer,
            &retail,
            ImportOptions {
                policy: self.policy(),
                retail_to_dealer_rate: self.config.pricing.retail_to_dealer_rate,
            },
        ))
    }

    fn policy(&self) -> PricingPolicy {
        PricingPolicy {
            margin_percent: self.config.pricing.margin_percent,
            discount_percent: self.config.pricing.discount_percent,
        }
    }

    /// Configured storefront URL, else the origin of the dealer request URL.
    fn storefront_url(&self) -> Option<String> {
        if let Some(url) = &self.config.dealer_storefront_url {
            return Some(url.clone());
        }
        self.request_spec(Source::Dealer)
            .ok()
            .and_then(|spec| store_origin(&spec.url))
    }

    fn require_snapshot(&self, source: Source) -> Result<CatalogSnapshot, SyncError> {
        self.downloads
            .files()
            .load_snapshot(source)?
            .ok_or(SyncError::SnapshotMissing { catalog: source })
    }

    fn optional_index(&self, source: Source) -> Result<CatalogIndex, SyncError> {
        Ok(self
            .downloads
            .files()
            .load_snapshot(source)?
            .map(|snapshot| CatalogIndex::from_snapshot(&snapshot))
            .unwrap_or_default())
    }
}
