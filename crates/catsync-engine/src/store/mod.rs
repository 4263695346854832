//! The local catalog the synchronizer writes into.

mod in_memory;

use std::collections::BTreeSet;

use catsync_core::{LocalProduct, NewLocalProduct};
use rust_decimal::Decimal;

use crate::error::StoreError;
use crate::variations::VariationDescriptor;

pub use in_memory::InMemoryCatalogStore;

/// CRUD access to local products, addressed by id, SKU, dealer external id,
/// or title.
///
/// SKUs are unique across products; writes that would duplicate one fail
/// with [`StoreError::DuplicateSku`].
pub trait CatalogStore: Send + Sync {
    /// Every local product, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing storage fails.
    fn list_products(&self) -> Result<Vec<LocalProduct>, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing storage fails.
    fn find_by_external_id(&self, external_id: &str) -> Result<Option<LocalProduct>, StoreError>;

    /// Lookup by trimmed, case-sensitive SKU.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing storage fails.
    fn find_by_sku(&self, sku: &str) -> Result<Option<LocalProduct>, StoreError>;

    /// Lookup by exact title.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing storage fails.
    fn find_by_title(&self, title: &str) -> Result<Option<LocalProduct>, StoreError>;

    /// Creates a product and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateSku`] if the SKU is taken.
    fn create(&self, product: &NewLocalProduct) -> Result<u64, StoreError>;

    /// Overwrites the fields of product `id`. A `None` price leaves the
    /// stored price unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] or [`StoreError::DuplicateSku`].
    fn update(&self, id: u64, product: &NewLocalProduct) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if there is no product `id`.
    fn set_regular_price(&self, id: u64, price: Decimal) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if there is no product `id`.
    fn set_categories(&self, id: u64, category_ids: &BTreeSet<u64>) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if there is no product `id`.
    fn set_brand(&self, id: u64, brand_id: Option<u64>) -> Result<(), StoreError>;

    /// Deletes every variation of product `id` and creates `variations` in
    /// their place, returning the new variation ids.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if there is no product `id`.
    fn replace_variations(
        &self,
        id: u64,
        variations: &[VariationDescriptor],
    ) -> Result<Vec<u64>, StoreError>;
}
