//! SKU lookup tables built from a catalog snapshot.
//!
//! SKUs are trimmed and compared exactly (case-sensitive). Blank SKUs are
//! never indexed.

use std::collections::{HashMap, HashSet};

use catsync_core::{CatalogSnapshot, SourceProduct};
use rust_decimal::Decimal;

#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    /// Lowest positive price seen for each SKU.
    prices: HashMap<String, Decimal>,
    /// Every SKU present in the catalog, priced or not.
    skus: HashSet<String>,
    product_count: usize,
}

impl CatalogIndex {
    #[must_use]
    pub fn from_snapshot(snapshot: &CatalogSnapshot) -> Self {
        Self::from_products(&snapshot.products)
    }

    #[must_use]
    pub fn from_products(products: &[SourceProduct]) -> Self {
        let mut index = Self {
            product_count: products.len(),
            ..Self::default()
        };

        for variant in products.iter().flat_map(|p| &p.variants) {
            let Some(sku) = variant.trimmed_sku() else {
                continue;
            };
            index.skus.insert(sku.to_string());
            if variant.price > Decimal::ZERO {
                index
                    .prices
                    .entry(sku.to_string())
                    .and_modify(|lowest| {
                        if variant.price < *lowest {
                            *lowest = variant.price;
                        }
                    })
                    .or_insert(variant.price);
            }
        }

        index
    }

    /// `true` if any variant carries `sku` (after trimming).
    #[must_use]
    pub fn contains(&self, sku: &str) -> bool {
        self.skus.contains(sku.trim())
    }

    /// Lowest positive price among variants carrying `sku`.
    #[must_use]
    pub fn price(&self, sku: &str) -> Option<Decimal> {
        self.prices.get(sku.trim()).copied()
    }

    /// Number of distinct SKUs.
    #[must_use]
    pub fn sku_count(&self) -> usize {
        self.skus.len()
    }

    /// Number of products the index was built from.
    #[must_use]
    pub fn product_count(&self) -> usize {
        self.product_count
    }
}
