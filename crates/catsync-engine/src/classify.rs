//! Simple-vs-variable decision for source products.
//!
//! Rules, first match wins:
//!
//! 1. no variants ⇒ simple
//! 2. one shared price and no meaningful option ⇒ simple
//! 3. exactly one variant ⇒ simple
//! 4. otherwise variable, because of a price spread or a meaningful option
//!
//! An option is meaningful unless it is the `Title: [Default Title]`
//! placeholder.

use std::collections::BTreeMap;

use catsync_core::{ProductKind, SourceProduct};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ClassificationReason {
    #[serde(rename = "no variants")]
    NoVariants,
    #[serde(rename = "single variant")]
    SingleVariant,
    #[serde(rename = "same price, no meaningful options")]
    SamePriceNoMeaningfulOptions,
    #[serde(rename = "different prices")]
    DifferentPrices,
    #[serde(rename = "meaningful options")]
    MeaningfulOptions,
}

impl ClassificationReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoVariants => "no variants",
            Self::SingleVariant => "single variant",
            Self::SamePriceNoMeaningfulOptions => "same price, no meaningful options",
            Self::DifferentPrices => "different prices",
            Self::MeaningfulOptions => "meaningful options",
        }
    }
}

impl std::fmt::Display for ClassificationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub kind: ProductKind,
    pub reason: ClassificationReason,
}

/// Decides whether `product` becomes a simple or a variable local product.
#[must_use]
pub fn classify(product: &SourceProduct) -> Classification {
    let simple = |reason| Classification {
        kind: ProductKind::Simple,
        reason,
    };

    if product.variants.is_empty() {
        return simple(ClassificationReason::NoVariants);
    }

    let price_spread = product.has_price_spread();
    let meaningful_options = product.options.iter().any(|o| !o.is_placeholder());

    if !price_spread && !meaningful_options {
        return simple(ClassificationReason::SamePriceNoMeaningfulOptions);
    }
    if product.variants.len() == 1 {
        return simple(ClassificationReason::SingleVariant);
    }

    Classification {
        kind: ProductKind::Variable,
        reason: if price_spread {
            ClassificationReason::DifferentPrices
        } else {
            ClassificationReason::MeaningfulOptions
        },
    }
}

/// One row of a [`ClassificationReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedProduct {
    pub external_id: String,
    pub title: String,
    pub variant_count: usize,
    pub kind: ProductKind,
    pub reason: ClassificationReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationReport {
    pub total: usize,
    pub simple: usize,
    pub variable: usize,
    /// Product count per reason, keyed by the reason text.
    pub by_reason: BTreeMap<&'static str, usize>,
    pub products: Vec<ClassifiedProduct>,
}

/// Classifies every product and tallies the decisions.
#[must_use]
pub fn classify_all(products: &[SourceProduct]) -> ClassificationReport {
    let mut report = ClassificationReport {
        total: products.len(),
        ..ClassificationReport::default()
    };

    for product in products {
        let Classification { kind, reason } = classify(product);
        match kind {
            ProductKind::Simple => report.simple += 1,
            ProductKind::Variable => report.variable += 1,
        }
        *report.by_reason.entry(reason.as_str()).or_default() += 1;
        report.products.push(ClassifiedProduct {
            external_id: product.external_id.clone(),
            title: product.title.clone(),
            variant_count: product.variants.len(),
            kind,
            reason,
        });
    }

    report
}
