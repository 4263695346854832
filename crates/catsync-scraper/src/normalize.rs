//! Normalization from wire types to [`catsync_core::SourceProduct`].

use std::collections::BTreeSet;

use catsync_core::{ProductOption, SourceProduct, SourceVariant};
use rust_decimal::Decimal;

use crate::types::{WireOption, WireProduct, WireScalar, WireTags, WireVariant};

/// Normalizes a raw [`WireProduct`] into a [`SourceProduct`].
///
/// Never fails: malformed scalars degrade to neutral values (a missing title
/// becomes `""`, an unusable price becomes zero) so one bad record cannot
/// abort a page.
#[must_use]
pub fn normalize_product(product: WireProduct) -> SourceProduct {
    let external_id = product.id.as_text();

    let variants = product
        .variants
        .into_iter()
        .map(|v| normalize_variant(v, &external_id))
        .collect();

    SourceProduct {
        title: product.title.unwrap_or_default().trim().to_string(),
        handle: non_empty(product.handle),
        vendor: non_empty(product.vendor),
        tags: normalize_tags(product.tags),
        options: product.options.into_iter().map(normalize_option).collect(),
        variants,
        external_id,
    }
}

fn normalize_variant(variant: WireVariant, product_id: &str) -> SourceVariant {
    let external_variant_id = variant.id.as_text();
    let price = match variant.price {
        Some(raw) => parse_price(&raw).unwrap_or_else(|| {
            tracing::warn!(
                product_id,
                variant_id = %external_variant_id,
                raw = %raw.as_text(),
                "unusable variant price; treating as 0"
            );
            Decimal::ZERO
        }),
        None => Decimal::ZERO,
    };

    let option_values = [variant.option1, variant.option2, variant.option3]
        .into_iter()
        .filter_map(scalar_text)
        .collect();

    SourceVariant {
        external_variant_id,
        sku: scalar_text(variant.sku),
        price,
        title: non_empty(variant.title),
        option_values,
    }
}

fn normalize_option(option: WireOption) -> ProductOption {
    ProductOption {
        name: option.name.trim().to_string(),
        values: option
            .values
            .into_iter()
            .map(|v| v.as_text())
            .collect(),
    }
}

/// Parses a wire price, rejecting negatives and non-numeric text.
///
/// Blank strings are treated as zero.
fn parse_price(raw: &WireScalar) -> Option<Decimal> {
    let text = raw.as_text();
    if text.is_empty() {
        return Some(Decimal::ZERO);
    }
    let value = text
        .parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(&text).ok())?;
    if value.is_sign_negative() && !value.is_zero() {
        return None;
    }
    Some(value)
}

fn normalize_tags(tags: Option<WireTags>) -> BTreeSet<String> {
    let raw: Vec<String> = match tags {
        Some(WireTags::List(list)) => list,
        Some(WireTags::Joined(joined)) => joined.split(',').map(str::to_string).collect(),
        None => Vec::new(),
    };
    raw.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn scalar_text(value: Option<WireScalar>) -> Option<String> {
    value.map(|v| v.as_text()).filter(|s| !s.is_empty())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
