//! # Checkout Engine
//!
//! The single source of truth for sale arithmetic.
//!
//! Every caller (quote endpoint, checkout persistence, receipt rendering)
//! goes through the same pure functions, so the numbers a cashier sees
//! always agree:
//!
//! ```text
//! SaleLine ──► SaleTotals::compute ──► Reconciliation
//!   line math      aggregation            payments vs total
//! ```
//!
//! Rules:
//! - `line_total = is_gift ? 0 : unit_price·qty − discount·qty`
//! - `sale total = Σ subtotal − Σ discount (+ customer delivery cost)`
//! - `profit = items total − cost − store delivery cost` (subtracted once)

use serde::{Deserialize, Serialize};

use crate::delivery::DeliverySplit;

// =============================================================================
// Sale Line
// =============================================================================

/// One cart line, priced and costed in centavos.
///
/// Prices and costs are snapshots taken when the line was assembled; the
/// engine never reaches back into the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLine {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub unit_cost_cents: i64,
    /// Per-unit discount in centavos.
    pub discount_cents: i64,
    /// Gift lines total zero regardless of price or discount.
    pub is_gift: bool,
}

impl SaleLine {
    /// Full price of the line before any discount.
    pub fn subtotal_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }

    /// Amount taken off this line. For a gift the whole subtotal is the
    /// discount, so `subtotal - discount_total == line_total` always holds.
    pub fn discount_total_cents(&self) -> i64 {
        if self.is_gift {
            self.subtotal_cents()
        } else {
            self.discount_cents * self.quantity
        }
    }

    /// What the customer owes for this line.
    pub fn line_total_cents(&self) -> i64 {
        if self.is_gift {
            0
        } else {
            self.subtotal_cents() - self.discount_cents * self.quantity
        }
    }

    /// What the line cost the store.
    pub fn cost_total_cents(&self) -> i64 {
        self.unit_cost_cents * self.quantity
    }
}

// =============================================================================
// Sale Totals
// =============================================================================

/// Aggregated figures for a cart plus its delivery split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleTotals {
    /// Σ line subtotal (gift lines at full price).
    pub subtotal_cents: i64,
    /// Σ line discount, gift subtotals included.
    pub discount_cents: i64,
    /// Σ line total; what the items alone cost the customer.
    pub items_total_cents: i64,
    /// Customer-paid share of the delivery cost.
    pub delivery_customer_cents: i64,
    /// Store-paid share of the delivery cost.
    pub delivery_store_cents: i64,
    /// Amount owed: items total + customer delivery share.
    pub total_cents: i64,
    /// Σ line cost.
    pub cost_cents: i64,
    /// items total − cost − store delivery share.
    pub profit_cents: i64,
}

impl SaleTotals {
    /// Computes the totals for a set of lines and a delivery split.
    ///
    /// The store-paid delivery share is subtracted from profit exactly
    /// once, here and nowhere else.
    pub fn compute(lines: &[SaleLine], delivery: DeliverySplit) -> SaleTotals {
        let subtotal: i64 = lines.iter().map(SaleLine::subtotal_cents).sum();
        let discount: i64 = lines.iter().map(SaleLine::discount_total_cents).sum();
        let items_total: i64 = lines.iter().map(SaleLine::line_total_cents).sum();
        let cost: i64 = lines.iter().map(SaleLine::cost_total_cents).sum();

        SaleTotals {
            subtotal_cents: subtotal,
            discount_cents: discount,
            items_total_cents: items_total,
            delivery_customer_cents: delivery.customer_cents,
            delivery_store_cents: delivery.store_cents,
            total_cents: items_total + delivery.customer_cents,
            cost_cents: cost,
            profit_cents: items_total - cost - delivery.store_cents,
        }
    }
}

// =============================================================================
// Payment Reconciliation
// =============================================================================

/// Paid vs owed for a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    pub total_cents: i64,
    pub paid_cents: i64,
    /// max(0, paid − total)
    pub change_cents: i64,
    /// max(0, total − paid)
    pub remaining_cents: i64,
    pub is_complete: bool,
}

/// Reconciles settled payment amounts against the amount owed.
///
/// Each payment settles its total-with-fee when a fee was applied, the
/// plain amount otherwise; callers pass the settled figures (see
/// `SalePayment::settled_cents`).
pub fn reconcile<I>(total_cents: i64, settled_amounts: I) -> Reconciliation
where
    I: IntoIterator<Item = i64>,
{
    let paid: i64 = settled_amounts.into_iter().sum();

    Reconciliation {
        total_cents,
        paid_cents: paid,
        change_cents: (paid - total_cents).max(0),
        remaining_cents: (total_cents - paid).max(0),
        is_complete: paid >= total_cents,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
