use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::source::Source;

/// A product record as published by one of the remote catalogs, normalized
/// from the wire shape by the scraper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceProduct {
    /// Remote product id, stored as a string to avoid precision loss.
    pub external_id: String,
    pub title: String,
    /// Storefront URL slug, e.g. `"traditional-recurve-bow"`.
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub variants: Vec<SourceVariant>,
    #[serde(default)]
    pub options: Vec<ProductOption>,
}

/// A single purchasable variant of a [`SourceProduct`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceVariant {
    pub external_variant_id: String,
    #[serde(default)]
    pub sku: Option<String>,
    /// Never negative; unparseable wire prices are normalized to zero.
    pub price: Decimal,
    #[serde(default)]
    pub title: Option<String>,
    /// Values for the product's options in option order (`option1..option3`).
    #[serde(default)]
    pub option_values: Vec<String>,
}

/// A named product option with its ordered values, e.g. `Size: [S, M, L]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// A fully downloaded catalog for one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub source: Source,
    pub products: Vec<SourceProduct>,
    pub fetched_at: DateTime<Utc>,
}

impl SourceVariant {
    /// The variant SKU with surrounding whitespace removed, or `None` when
    /// absent or blank.
    #[must_use]
    pub fn trimmed_sku(&self) -> Option<&str> {
        self.sku.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

impl SourceProduct {
    /// First non-empty SKU among the variants, in variant order. This is the
    /// SKU a product is matched and stored under locally.
    #[must_use]
    pub fn representative_sku(&self) -> Option<&str> {
        self.variants.iter().find_map(SourceVariant::trimmed_sku)
    }

    /// First positive price among the variants that carry a SKU. This is the
    /// product's dealer cost when it comes from the dealer catalog.
    #[must_use]
    pub fn dealer_price(&self) -> Option<Decimal> {
        self.variants
            .iter()
            .filter(|v| v.trimmed_sku().is_some())
            .map(|v| v.price)
            .find(|price| *price > Decimal::ZERO)
    }

    /// `true` when the variants do not all share one price.
    #[must_use]
    pub fn has_price_spread(&self) -> bool {
        self.variants
            .first()
            .is_some_and(|first| self.variants.iter().any(|v| v.price != first.price))
    }
}

impl ProductOption {
    /// `true` for the placeholder option Shopify-style catalogs attach to
    /// products without real options: `Title` with the single value
    /// `Default Title`.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.name == "Title" && self.values.len() == 1 && self.values[0] == "Default Title"
    }
}

impl CatalogSnapshot {
    /// Number of variants across all products.
    #[must_use]
    pub fn variant_count(&self) -> usize {
        self.products.iter().map(|p| p.variants.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn variant(id: &str, sku: Option<&str>, price: Decimal) -> SourceVariant {
        SourceVariant {
            external_variant_id: id.to_owned(),
            sku: sku.map(str::to_owned),
            price,
            title: None,
            option_values: Vec::new(),
        }
    }

    fn product(variants: Vec<SourceVariant>) -> SourceProduct {
        SourceProduct {
            external_id: "10204066152785".to_owned(),
            title: "Traditional Recurve".to_owned(),
            handle: Some("traditional-recurve".to_owned()),
            vendor: Some("Bearpaw".to_owned()),
            tags: BTreeSet::new(),
            variants,
            options: Vec::new(),
        }
    }

    #[test]
    fn trimmed_sku_strips_whitespace() {
        let v = variant("1", Some("  X123 "), dec("10"));
        assert_eq!(v.trimmed_sku(), Some("X123"));
    }

    #[test]
    fn trimmed_sku_treats_blank_as_absent() {
        let v = variant("1", Some("   "), dec("10"));
        assert!(v.trimmed_sku().is_none());
    }

    #[test]
    fn representative_sku_skips_blank_variants() {
        let p = product(vec![
            variant("1", None, dec("10")),
            variant("2", Some(""), dec("10")),
            variant("3", Some("B-2"), dec("10")),
            variant("4", Some("B-3"), dec("10")),
        ]);
        assert_eq!(p.representative_sku(), Some("B-2"));
    }

    #[test]
    fn dealer_price_skips_unpriced_and_skuless_variants() {
        let p = product(vec![
            variant("1", None, dec("5")),
            variant("2", Some("B-1"), Decimal::ZERO),
            variant("3", Some("B-2"), dec("42.10")),
            variant("4", Some("B-3"), dec("40")),
        ]);
        assert_eq!(p.dealer_price(), Some(dec("42.10")));
    }

    #[test]
    fn dealer_price_is_none_without_positive_sku_price() {
        let p = product(vec![variant("1", None, dec("5")), variant("2", Some("B-1"), Decimal::ZERO)]);
        assert!(p.dealer_price().is_none());
    }

    #[test]
    fn price_spread_detection() {
        let same = product(vec![variant("1", None, dec("10")), variant("2", None, dec("10.00"))]);
        let spread = product(vec![variant("1", None, dec("10")), variant("2", None, dec("12"))]);
        assert!(!same.has_price_spread());
        assert!(spread.has_price_spread());
        assert!(!product(vec![]).has_price_spread());
    }

    #[test]
    fn placeholder_option_detection() {
        let placeholder = ProductOption {
            name: "Title".to_owned(),
            values: vec!["Default Title".to_owned()],
        };
        let real = ProductOption {
            name: "Draw Weight".to_owned(),
            values: vec!["30 lbs".to_owned(), "35 lbs".to_owned()],
        };
        assert!(placeholder.is_placeholder());
        assert!(!real.is_placeholder());
    }

    #[test]
    fn serde_roundtrip_keeps_decimal_precision() {
        let p = product(vec![variant("1", Some("X1"), dec("12.50"))]);
        let json = serde_json::to_string(&p).unwrap();
        let decoded: SourceProduct = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, p);
        assert_eq!(decoded.variants[0].price.to_string(), "12.50");
    }
}
