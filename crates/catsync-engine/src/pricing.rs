//! Derivation of local selling prices from dealer cost and retail reference
//! prices.
//!
//! ```text
//! desired     = dealer * (1 + margin% / 100)
//! max_allowed = retail * (1 - discount% / 100)     (only when retail > 0)
//! final       = min(desired, max_allowed)
//! ```
//!
//! All three are rounded to cents, half away from zero.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Margin and discount applied by [`compute_price`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
    pub margin_percent: Decimal,
    pub discount_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricingResult {
    pub dealer_price: Decimal,
    pub retail_price: Option<Decimal>,
    pub desired_price: Decimal,
    pub max_allowed_price: Option<Decimal>,
    pub final_price: Decimal,
    /// `true` when the retail ceiling lowered the price below `desired_price`.
    pub capped_by_retail: bool,
}

/// Computes the local selling price.
///
/// Returns `None` when `dealer_price` is not positive or the marked-up price
/// is out of `Decimal` range: such products are skipped rather than priced
/// at zero. A retail price that is absent or not positive imposes no ceiling,
/// nor does one whose discounted value is out of range.
#[must_use]
pub fn compute_price(
    dealer_price: Decimal,
    retail_price: Option<Decimal>,
    policy: PricingPolicy,
) -> Option<PricingResult> {
    if dealer_price <= Decimal::ZERO {
        return None;
    }

    let markup = Decimal::ONE.checked_add(policy.margin_percent / Decimal::ONE_HUNDRED)?;
    let desired_price = round_cents(dealer_price.checked_mul(markup)?);

    let retail_price = retail_price.filter(|r| *r > Decimal::ZERO);
    let max_allowed_price = retail_price.and_then(|retail| {
        let factor = Decimal::ONE.checked_sub(policy.discount_percent / Decimal::ONE_HUNDRED)?;
        retail.checked_mul(factor).map(round_cents)
    });

    let (final_price, capped_by_retail) = match max_allowed_price {
        Some(max) if desired_price > max => (max, true),
        _ => (desired_price, false),
    };

    Some(PricingResult {
        dealer_price,
        retail_price,
        desired_price,
        max_allowed_price,
        final_price,
        capped_by_retail,
    })
}

/// Converts a retail price into dealer currency.
///
/// `None` when the product is out of `Decimal` range; the caller then prices
/// without a retail ceiling.
#[must_use]
pub fn convert_retail(retail_price: Decimal, rate: Decimal) -> Option<Decimal> {
    let converted = retail_price.checked_mul(rate);
    if converted.is_none() {
        tracing::warn!(%retail_price, %rate, "retail price out of range after conversion; ignoring");
    }
    converted
}

/// `true` when `new_price` differs from `current_price` by strictly more than
/// `threshold`.
#[must_use]
pub fn should_update(current_price: Decimal, new_price: Decimal, threshold: Decimal) -> bool {
    (current_price - new_price).abs() > threshold
}

/// Rounds to two decimal places, half away from zero, and pads to exactly two
/// places so `120` renders as `120.00`.
#[must_use]
pub fn round_cents(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}
