//! Creation and update of local products from the dealer snapshot.
//!
//! Each dealer product is classified, priced, matched to an existing local
//! record (dealer external id, then first-variant SKU, then exact title), and
//! written. Variable products also get their attribute set and a freshly
//! generated variation matrix. A failure on one product is recorded in the
//! report and does not stop the run.

use std::collections::BTreeSet;

use catsync_core::{CatalogSnapshot, LocalProduct, NewLocalProduct, ProductKind, SourceProduct};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::classify::{classify, ClassificationReason};
use crate::error::StoreError;
use crate::index::CatalogIndex;
use crate::pricing::{compute_price, convert_retail, PricingPolicy};
use crate::store::CatalogStore;
use crate::taxonomy::{is_category_tag, TaxonomyResolver};
use crate::variations::{attribute_map, generate_variations};

#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    pub policy: PricingPolicy,
    /// Multiplier turning a retail-catalog price into dealer currency.
    pub retail_to_dealer_rate: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportAction {
    Created,
    Updated,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportedProduct {
    pub external_id: String,
    pub title: String,
    pub sku: Option<String>,
    pub action: ImportAction,
    pub local_id: Option<u64>,
    pub kind: ProductKind,
    pub reason: ClassificationReason,
    /// Price written to the product; `None` when the dealer price was unusable.
    pub price: Option<Decimal>,
    pub variations: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub created: usize,
    pub updated: usize,
    pub variable: usize,
    pub variations: usize,
    /// Products written without a price because they have no positive dealer price.
    pub skipped_pricing: usize,
    pub failed: usize,
    pub products: Vec<ImportedProduct>,
}

/// Imports every product of the dealer snapshot into `store`.
#[must_use]
pub fn import_products(
    store: &dyn CatalogStore,
    taxonomy: &dyn TaxonomyResolver,
    dealer: &CatalogSnapshot,
    retail: &CatalogIndex,
    options: ImportOptions,
) -> ImportReport {
    let mut report = ImportReport::default();

    for product in &dealer.products {
        let classification = classify(product);
        let sku = product.representative_sku().map(str::to_owned);
        let price = product.dealer_price().and_then(|cost| {
            let retail_price = sku
                .as_deref()
                .and_then(|sku| retail.price(sku))
                .and_then(|price| convert_retail(price, options.retail_to_dealer_rate));
            compute_price(cost, retail_price, options.policy).map(|result| result.final_price)
        });

        let mut row = ImportedProduct {
            external_id: product.external_id.clone(),
            title: product.title.clone(),
            sku: sku.clone(),
            action: ImportAction::Failed,
            local_id: None,
            kind: classification.kind,
            reason: classification.reason,
            price,
            variations: 0,
            error: None,
        };

        let fields = NewLocalProduct {
            title: product.title.clone(),
            sku,
            regular_price: price,
            kind: classification.kind,
            dealer_external_id: Some(product.external_id.clone()),
            attributes: match classification.kind {
                ProductKind::Variable => attribute_map(product),
                ProductKind::Simple => Vec::new(),
            },
        };

        match write_product(store, taxonomy, product, &fields) {
            Ok(written) => {
                if written.created {
                    report.created += 1;
                    row.action = ImportAction::Created;
                } else {
                    report.updated += 1;
                    row.action = ImportAction::Updated;
                }
                if classification.kind == ProductKind::Variable {
                    report.variable += 1;
                }
                if price.is_none() {
                    report.skipped_pricing += 1;
                }
                report.variations += written.variations;
                row.local_id = Some(written.id);
                row.variations = written.variations;
            }
            Err(e) => {
                tracing::warn!(
                    external_id = %product.external_id,
                    title = %product.title,
                    error = %e,
                    "product import failed"
                );
                report.failed += 1;
                row.error = Some(e.to_string());
            }
        }

        report.products.push(row);
    }

    tracing::info!(
        created = report.created,
        updated = report.updated,
        variable = report.variable,
        variations = report.variations,
        skipped_pricing = report.skipped_pricing,
        failed = report.failed,
        "dealer import finished"
    );
    report
}

struct Written {
    id: u64,
    created: bool,
    variations: usize,
}

fn write_product(
    store: &dyn CatalogStore,
    taxonomy: &dyn TaxonomyResolver,
    product: &SourceProduct,
    fields: &NewLocalProduct,
) -> Result<Written, StoreError> {
    let (id, created) = match find_existing(store, product)? {
        Some(existing) => {
            store.update(existing.id, fields)?;
            (existing.id, false)
        }
        None => (store.create(fields)?, true),
    };

    let mut category_ids = BTreeSet::new();
    for tag in product.tags.iter().filter(|tag| is_category_tag(tag)) {
        if let Some(category) = skip_empty_slug(taxonomy.resolve_category(tag))? {
            category_ids.insert(category);
        }
    }
    store.set_categories(id, &category_ids)?;

    let brand_id = match product.vendor.as_deref() {
        Some(vendor) => skip_empty_slug(taxonomy.resolve_brand(vendor))?,
        None => None,
    };
    store.set_brand(id, brand_id)?;

    let mut variations = 0;
    if fields.kind == ProductKind::Variable {
        let base_sku = fields.sku.as_deref().unwrap_or(&product.external_id);
        let descriptors = generate_variations(&fields.attributes, base_sku, fields.regular_price);
        variations = store.replace_variations(id, &descriptors)?.len();
    }

    Ok(Written {
        id,
        created,
        variations,
    })
}

fn find_existing(
    store: &dyn CatalogStore,
    product: &SourceProduct,
) -> Result<Option<LocalProduct>, StoreError> {
    if let Some(found) = store.find_by_external_id(&product.external_id)? {
        return Ok(Some(found));
    }
    if let Some(sku) = product.representative_sku() {
        if let Some(found) = store.find_by_sku(sku)? {
            return Ok(Some(found));
        }
    }
    store.find_by_title(&product.title)
}

/// Names without slug characters resolve to nothing instead of failing.
fn skip_empty_slug(resolved: Result<u64, StoreError>) -> Result<Option<u64>, StoreError> {
    match resolved {
        Ok(id) => Ok(Some(id)),
        Err(StoreError::EmptySlug { name }) => {
            tracing::debug!(name = %name, "ignoring term without slug");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[path = "import_test.rs"]
mod tests;
