//! Cross-referencing of local products against the dealer and retail
//! catalogs by SKU.

use std::collections::HashSet;

use catsync_core::{CatalogSnapshot, LocalProduct};
use catsync_scraper::search_url;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::index::CatalogIndex;
use crate::pricing::{compute_price, convert_retail, PricingPolicy};

const SAMPLE_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSample {
    pub product_id: u64,
    pub sku: String,
    pub title: String,
    pub dealer_match: bool,
    pub retail_match: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    pub local_total: usize,
    pub dealer_total: usize,
    pub retail_total: usize,
    pub matched_dealer: usize,
    pub matched_retail: usize,
    pub matched_both: usize,
    pub matched_none: usize,
    /// The first local products examined, with their match flags.
    pub sample: Vec<MatchSample>,
}

/// Counts how many local products have a SKU match in each catalog.
///
/// Local products without a SKU match nothing and count toward
/// `matched_none`.
#[must_use]
pub fn analyze(local: &[LocalProduct], dealer: &CatalogIndex, retail: &CatalogIndex) -> MatchStats {
    let mut stats = MatchStats {
        local_total: local.len(),
        dealer_total: dealer.product_count(),
        retail_total: retail.product_count(),
        ..MatchStats::default()
    };

    for product in local {
        let sku = product.trimmed_sku().unwrap_or_default();
        let dealer_match = !sku.is_empty() && dealer.contains(sku);
        let retail_match = !sku.is_empty() && retail.contains(sku);

        if dealer_match {
            stats.matched_dealer += 1;
        }
        if retail_match {
            stats.matched_retail += 1;
        }
        match (dealer_match, retail_match) {
            (true, true) => stats.matched_both += 1,
            (false, false) => stats.matched_none += 1,
            _ => {}
        }

        if stats.sample.len() < SAMPLE_SIZE {
            stats.sample.push(MatchSample {
                product_id: product.id,
                sku: sku.to_string(),
                title: product.title.clone(),
                dealer_match,
                retail_match,
            });
        }
    }

    stats
}

/// A dealer product with no local counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingProduct {
    pub external_id: String,
    pub title: String,
    /// First non-empty SKU among the product's variants.
    pub sku: String,
    /// Dealer cost, when any SKU-bearing variant has a positive price.
    pub dealer_price: Option<Decimal>,
    pub retail_price: Option<Decimal>,
    /// Suggested selling price; `None` without a dealer price.
    pub recommended_price: Option<Decimal>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MissingReport {
    pub products: Vec<MissingProduct>,
    pub total_dealer: usize,
    pub total_missing: usize,
    pub total_with_link: usize,
}

/// Inputs for [`find_missing`] besides the catalogs themselves.
#[derive(Debug, Clone, Copy)]
pub struct MissingOptions<'a> {
    pub policy: PricingPolicy,
    /// Multiplier turning a retail-catalog price into dealer currency.
    pub retail_to_dealer_rate: Decimal,
    /// Base URL of the dealer storefront for deep links, without a trailing `/`.
    pub storefront_url: Option<&'a str>,
}

/// Lists dealer products whose representative SKU is absent from `local_skus`.
///
/// The representative SKU is the first non-empty SKU among the product's
/// variants; products without one are ignored. A SKU is reported at most once,
/// for the first product carrying it.
#[must_use]
pub fn find_missing(
    local_skus: &HashSet<String>,
    dealer: &CatalogSnapshot,
    retail: &CatalogIndex,
    options: MissingOptions<'_>,
) -> MissingReport {
    let mut report = MissingReport {
        total_dealer: dealer.products.len(),
        ..MissingReport::default()
    };
    let mut seen: HashSet<&str> = HashSet::new();

    for product in &dealer.products {
        let Some(sku) = product.representative_sku() else {
            continue;
        };
        if local_skus.contains(sku) || !seen.insert(sku) {
            continue;
        }

        let dealer_price = product.dealer_price();
        let retail_price = retail
            .price(sku)
            .and_then(|price| convert_retail(price, options.retail_to_dealer_rate));
        let recommended_price = dealer_price
            .and_then(|cost| compute_price(cost, retail_price, options.policy))
            .map(|result| result.final_price);

        let link = options
            .storefront_url
            .map(|base| deep_link(base, product.handle.as_deref(), sku, &product.external_id));

        if link.is_some() {
            report.total_with_link += 1;
        }
        report.products.push(MissingProduct {
            external_id: product.external_id.clone(),
            title: product.title.clone(),
            sku: sku.to_string(),
            dealer_price,
            retail_price,
            recommended_price,
            link,
        });
    }

    report.total_missing = report.products.len();
    report
}

/// Storefront link for a product: by handle, else a SKU search, else by id.
#[must_use]
pub fn deep_link(base: &str, handle: Option<&str>, sku: &str, external_id: &str) -> String {
    let base = base.trim_end_matches('/');
    if let Some(handle) = handle.filter(|h| !h.is_empty()) {
        return format!("{base}/products/{handle}");
    }
    if !sku.is_empty() {
        if let Some(url) = search_url(base, sku) {
            return url;
        }
    }
    format!("{base}/products/{external_id}")
}

#[cfg(test)]
#[path = "matcher_test.rs"]
mod tests;
