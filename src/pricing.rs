//! Cart pricing.
//!
//! Derives the totals shown on the cart and checkout pages from the cached
//! cart lines. Uses `rust_decimal` so the fee arithmetic is exact.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::CartLine;

/// Fee rules applied on top of the line totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Delivery is free once the subtotal is strictly above this amount.
    pub free_delivery_threshold: Decimal,
    pub delivery_fee: Decimal,
    /// Flat fee charged on any non-empty cart.
    pub protect_fee: Decimal,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            free_delivery_threshold: Decimal::from(50),
            delivery_fee: Decimal::new(999, 2),
            protect_fee: Decimal::from(9),
        }
    }
}

impl PricingPolicy {
    pub fn delivery_fee_for(&self, total_price: Decimal) -> Decimal {
        if total_price > self.free_delivery_threshold {
            Decimal::ZERO
        } else {
            self.delivery_fee
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingSummary {
    pub total_price: Decimal,
    pub total_discount: Decimal,
    pub delivery_fee: Decimal,
    pub protect_fee: Decimal,
    pub final_amount: Decimal,
    pub item_count: usize,
    pub unit_count: i64,
}

impl PricingSummary {
    /// Computes the summary for `lines`. Line order does not matter and an
    /// empty slice is valid: it yields a zero final amount.
    pub fn from_lines(lines: &[CartLine], policy: &PricingPolicy) -> Self {
        let total_price = saturating_sum(lines.iter().map(CartLine::line_total));
        let total_discount = saturating_sum(lines.iter().map(CartLine::line_discount));

        // The delivery fee is still reported for an empty cart, it just does
        // not reach the final amount.
        let delivery_fee = policy.delivery_fee_for(total_price);
        let protect_fee = if lines.is_empty() {
            Decimal::ZERO
        } else {
            policy.protect_fee
        };
        let final_amount = if lines.is_empty() {
            Decimal::ZERO
        } else {
            total_price
                .saturating_sub(total_discount)
                .saturating_add(delivery_fee)
                .saturating_add(protect_fee)
        };

        Self {
            total_price,
            total_discount,
            delivery_fee,
            protect_fee,
            final_amount,
            item_count: lines.len(),
            unit_count: lines.iter().map(|l| i64::from(l.quantity)).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.item_count == 0
    }

    pub fn has_free_delivery(&self) -> bool {
        self.delivery_fee.is_zero()
    }
}

fn saturating_sum(values: impl Iterator<Item = Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, Decimal::saturating_add)
}
