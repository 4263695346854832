//! Variation matrix for variable products: one descriptor per combination of
//! attribute values.

use catsync_core::SourceProduct;
use rust_decimal::Decimal;
use serde::Serialize;

/// Ordered `(attribute name, values)` pairs.
pub type AttributeMap = Vec<(String, Vec<String>)>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariationDescriptor {
    /// `{base_sku}-var-{n}`, `n` counting from 1.
    pub sku: String,
    /// One `(attribute name, value)` pair per attribute, in attribute order.
    pub attributes: Vec<(String, String)>,
    pub regular_price: Option<Decimal>,
}

/// Attributes of a product taken from its options, skipping the
/// `Title: [Default Title]` placeholder and options without values.
#[must_use]
pub fn attribute_map(product: &SourceProduct) -> AttributeMap {
    product
        .options
        .iter()
        .filter(|option| !option.is_placeholder())
        .filter_map(|option| {
            let values: Vec<String> = option
                .values
                .iter()
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
                .collect();
            let name = option.name.trim();
            (!name.is_empty() && !values.is_empty()).then(|| (name.to_owned(), values))
        })
        .collect()
}

/// Enumerates the Cartesian product of `attributes`.
///
/// Combination `i` picks, for attribute `j`, value
/// `(i / (n_0 * .. * n_{j-1})) % n_j`, so the first attribute varies fastest.
/// Every descriptor carries the same `price`. No attributes, or an attribute
/// without values, yields no variations.
#[must_use]
pub fn generate_variations(
    attributes: &[(String, Vec<String>)],
    base_sku: &str,
    price: Option<Decimal>,
) -> Vec<VariationDescriptor> {
    if attributes.is_empty() || attributes.iter().any(|(_, values)| values.is_empty()) {
        return Vec::new();
    }
    let total: usize = attributes.iter().map(|(_, values)| values.len()).product();

    (0..total)
        .map(|i| {
            let mut stride = 1;
            let combination = attributes
                .iter()
                .map(|(name, values)| {
                    let value = &values[(i / stride) % values.len()];
                    stride *= values.len();
                    (name.clone(), value.clone())
                })
                .collect();
            VariationDescriptor {
                sku: format!("{base_sku}-var-{}", i + 1),
                attributes: combination,
                regular_price: price,
            }
        })
        .collect()
}
