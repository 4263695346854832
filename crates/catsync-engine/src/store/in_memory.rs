use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use catsync_core::{LocalProduct, LocalVariation, NewLocalProduct, ProductKind};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::CatalogStore;
use crate::error::{PersistenceError, StoreError};
use crate::files::{read_json, write_json};
use crate::taxonomy::{normalize_slug, TaxonomyResolver};
use crate::variations::VariationDescriptor;

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogState {
    /// Last id handed out to a product, variation, or term.
    last_id: u64,
    products: BTreeMap<u64, LocalProduct>,
    /// Category slug to id.
    categories: BTreeMap<String, u64>,
    /// Brand slug to id.
    brands: BTreeMap<String, u64>,
}

impl CatalogState {
    fn allocate_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    fn product_mut(&mut self, id: u64) -> Result<&mut LocalProduct, StoreError> {
        self.products.get_mut(&id).ok_or(StoreError::NotFound { id })
    }

    fn ensure_sku_free(&self, sku: Option<&str>, owner: Option<u64>) -> Result<(), StoreError> {
        let Some(sku) = sku.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(());
        };
        match self
            .products
            .values()
            .find(|p| Some(p.id) != owner && p.trimmed_sku() == Some(sku))
        {
            Some(existing) => Err(StoreError::DuplicateSku {
                sku: sku.to_owned(),
                existing_id: existing.id,
            }),
            None => Ok(()),
        }
    }

    fn resolve_term(
        terms: &mut BTreeMap<String, u64>,
        last_id: &mut u64,
        name: &str,
    ) -> Result<(u64, bool), StoreError> {
        let slug = normalize_slug(name);
        if slug.is_empty() {
            return Err(StoreError::EmptySlug {
                name: name.to_owned(),
            });
        }
        if let Some(id) = terms.get(&slug) {
            return Ok((*id, false));
        }
        *last_id += 1;
        terms.insert(slug, *last_id);
        Ok((*last_id, true))
    }
}

/// Local catalog held in memory and, when opened from a path, mirrored to a
/// JSON document (`local_catalog.json`) after every write.
///
/// Also serves as the [`TaxonomyResolver`] for the categories and brands it
/// stores.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    state: Mutex<CatalogState>,
    path: Option<PathBuf>,
}

impl InMemoryCatalogStore {
    /// An empty store that is never written to disk.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the catalog at `path`, or starts empty when the file does not
    /// exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the file exists but cannot be read or
    /// decoded.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();
        let state = read_json(&path)?.unwrap_or_default();
        Ok(Self {
            state: Mutex::new(state),
            path: Some(path),
        })
    }

    fn lock(&self) -> MutexGuard<'_, CatalogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, state: &CatalogState) -> Result<(), StoreError> {
        if let Some(path) = &self.path {
            write_json(path, state)?;
        }
        Ok(())
    }

    fn find(&self, pred: impl Fn(&LocalProduct) -> bool) -> Option<LocalProduct> {
        self.lock().products.values().find(|p| pred(p)).cloned()
    }

    fn modify(
        &self,
        id: u64,
        apply: impl FnOnce(&mut LocalProduct),
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        apply(state.product_mut(id)?);
        self.persist(&state)
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn list_products(&self) -> Result<Vec<LocalProduct>, StoreError> {
        Ok(self.lock().products.values().cloned().collect())
    }

    fn find_by_external_id(&self, external_id: &str) -> Result<Option<LocalProduct>, StoreError> {
        let external_id = external_id.trim();
        if external_id.is_empty() {
            return Ok(None);
        }
        Ok(self.find(|p| p.dealer_external_id.as_deref().map(str::trim) == Some(external_id)))
    }

    fn find_by_sku(&self, sku: &str) -> Result<Option<LocalProduct>, StoreError> {
        let sku = sku.trim();
        if sku.is_empty() {
            return Ok(None);
        }
        Ok(self.find(|p| p.trimmed_sku() == Some(sku)))
    }

    fn find_by_title(&self, title: &str) -> Result<Option<LocalProduct>, StoreError> {
        if title.is_empty() {
            return Ok(None);
        }
        Ok(self.find(|p| p.title == title))
    }

    fn create(&self, product: &NewLocalProduct) -> Result<u64, StoreError> {
        let mut state = self.lock();
        state.ensure_sku_free(product.sku.as_deref(), None)?;
        let id = state.allocate_id();
        state.products.insert(
            id,
            LocalProduct {
                id,
                title: product.title.clone(),
                sku: product.sku.clone(),
                regular_price: product.regular_price,
                kind: product.kind,
                category_ids: BTreeSet::new(),
                brand_id: None,
                dealer_external_id: product.dealer_external_id.clone(),
                attributes: product.attributes.clone(),
                variations: Vec::new(),
            },
        );
        self.persist(&state)?;
        Ok(id)
    }

    fn update(&self, id: u64, product: &NewLocalProduct) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.ensure_sku_free(product.sku.as_deref(), Some(id))?;
        let existing = state.product_mut(id)?;
        existing.title.clone_from(&product.title);
        existing.sku.clone_from(&product.sku);
        if let Some(price) = product.regular_price {
            existing.regular_price = Some(price);
        }
        existing.kind = product.kind;
        if product.dealer_external_id.is_some() {
            existing.dealer_external_id.clone_from(&product.dealer_external_id);
        }
        existing.attributes.clone_from(&product.attributes);
        if product.kind == ProductKind::Simple {
            existing.variations.clear();
        }
        self.persist(&state)
    }

    fn set_regular_price(&self, id: u64, price: Decimal) -> Result<(), StoreError> {
        self.modify(id, |p| p.regular_price = Some(price))
    }

    fn set_categories(&self, id: u64, category_ids: &BTreeSet<u64>) -> Result<(), StoreError> {
        self.modify(id, |p| p.category_ids.clone_from(category_ids))
    }

    fn set_brand(&self, id: u64, brand_id: Option<u64>) -> Result<(), StoreError> {
        self.modify(id, |p| p.brand_id = brand_id)
    }

    fn replace_variations(
        &self,
        id: u64,
        variations: &[VariationDescriptor],
    ) -> Result<Vec<u64>, StoreError> {
        let mut state = self.lock();
        // Fail before allocating ids for a product that does not exist.
        state.product_mut(id)?;

        let created: Vec<LocalVariation> = variations
            .iter()
            .map(|v| LocalVariation {
                id: state.allocate_id(),
                sku: v.sku.clone(),
                regular_price: v.regular_price,
                attributes: v.attributes.clone(),
            })
            .collect();
        let ids = created.iter().map(|v| v.id).collect();

        state.product_mut(id)?.variations = created;
        self.persist(&state)?;
        Ok(ids)
    }
}

impl TaxonomyResolver for InMemoryCatalogStore {
    fn resolve_category(&self, name: &str) -> Result<u64, StoreError> {
        let mut guard = self.lock();
        let state = &mut *guard;
        let (id, created) = CatalogState::resolve_term(&mut state.categories, &mut state.last_id, name)?;
        if created {
            tracing::debug!(name, id, "created category");
            self.persist(state)?;
        }
        Ok(id)
    }

    fn resolve_brand(&self, name: &str) -> Result<u64, StoreError> {
        let mut guard = self.lock();
        let state = &mut *guard;
        let (id, created) = CatalogState::resolve_term(&mut state.brands, &mut state.last_id, name)?;
        if created {
            tracing::debug!(name, id, "created brand");
            self.persist(state)?;
        }
        Ok(id)
    }
}
