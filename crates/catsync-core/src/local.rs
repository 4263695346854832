use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Structural kind of a local catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    Simple,
    Variable,
}

/// A product owned by the local catalog store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalProduct {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub regular_price: Option<Decimal>,
    pub kind: ProductKind,
    #[serde(default)]
    pub category_ids: BTreeSet<u64>,
    #[serde(default)]
    pub brand_id: Option<u64>,
    /// Id of the dealer-catalog product this record was imported from.
    #[serde(default)]
    pub dealer_external_id: Option<String>,
    /// Attribute names and their values, set on variable products.
    #[serde(default)]
    pub attributes: Vec<(String, Vec<String>)>,
    #[serde(default)]
    pub variations: Vec<LocalVariation>,
}

/// A concrete variation of a variable [`LocalProduct`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalVariation {
    pub id: u64,
    pub sku: String,
    /// `None` when the parent has no usable dealer price.
    pub regular_price: Option<Decimal>,
    /// `(attribute name, value)` pairs in attribute order.
    pub attributes: Vec<(String, String)>,
}

/// Field set written to the store when creating or updating a product.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLocalProduct {
    pub title: String,
    pub sku: Option<String>,
    pub regular_price: Option<Decimal>,
    pub kind: ProductKind,
    pub dealer_external_id: Option<String>,
    pub attributes: Vec<(String, Vec<String>)>,
}

impl LocalProduct {
    /// Trimmed SKU, or `None` when absent or blank.
    #[must_use]
    pub fn trimmed_sku(&self) -> Option<&str> {
        self.sku.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// `true` when the product was imported from the dealer catalog.
    #[must_use]
    pub fn is_dealer_linked(&self) -> bool {
        self.dealer_external_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(sku: Option<&str>, dealer: Option<&str>) -> LocalProduct {
        LocalProduct {
            id: 1,
            title: "Arrow Rest".to_owned(),
            sku: sku.map(str::to_owned),
            regular_price: None,
            kind: ProductKind::Simple,
            category_ids: BTreeSet::new(),
            brand_id: None,
            dealer_external_id: dealer.map(str::to_owned),
            attributes: Vec::new(),
            variations: Vec::new(),
        }
    }

    #[test]
    fn trimmed_sku_ignores_blank() {
        assert_eq!(local(Some(" AR-1 "), None).trimmed_sku(), Some("AR-1"));
        assert!(local(Some(""), None).trimmed_sku().is_none());
        assert!(local(None, None).trimmed_sku().is_none());
    }

    #[test]
    fn dealer_link_requires_non_blank_id() {
        assert!(local(None, Some("991")).is_dealer_linked());
        assert!(!local(None, Some("  ")).is_dealer_linked());
        assert!(!local(None, None).is_dealer_linked());
    }

    #[test]
    fn product_kind_serializes_lowercase() {
        let json = serde_json::to_string(&ProductKind::Variable).unwrap();
        assert_eq!(json, "\"variable\"");
    }
}
