//! # Delivery Cost Splitting
//!
//! Maps a delivery modality to a (store-paid, customer-paid) cost split.
//!
//! Invariant: for any mode and configured total,
//! `store_cents + customer_cents == total`, and pickup is always `(0, 0)`.

use serde::{Deserialize, Serialize};

/// Default delivery cost in centavos (R$ 15,00) when the merchant has not
/// configured one.
pub const DEFAULT_DELIVERY_COST_CENTS: i64 = 1500;

// =============================================================================
// Delivery Mode
// =============================================================================

/// How the sale reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// Customer picks up at the store; no delivery cost on either side.
    Pickup,
    /// Store absorbs the whole delivery cost.
    StoreDelivery,
    /// Cost is shared; the store absorbs the odd centavo.
    Hybrid,
}

impl Default for DeliveryMode {
    fn default() -> Self {
        DeliveryMode::Pickup
    }
}

/// The resolved split of a delivery cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeliverySplit {
    /// Paid by the store (reduces profit).
    pub store_cents: i64,
    /// Charged to the customer (added to the amount owed).
    pub customer_cents: i64,
}

impl DeliverySplit {
    pub const fn none() -> Self {
        DeliverySplit {
            store_cents: 0,
            customer_cents: 0,
        }
    }

    pub fn total(&self) -> i64 {
        self.store_cents + self.customer_cents
    }
}

impl DeliveryMode {
    /// Splits a configured delivery cost between store and customer.
    ///
    /// ```rust
    /// use vitrine_core::delivery::DeliveryMode;
    ///
    /// let split = DeliveryMode::Hybrid.split(1500);
    /// assert_eq!(split.store_cents + split.customer_cents, 1500);
    /// ```
    pub fn split(&self, total_cost_cents: i64) -> DeliverySplit {
        let total = total_cost_cents.max(0);
        match self {
            DeliveryMode::Pickup => DeliverySplit::none(),
            DeliveryMode::StoreDelivery => DeliverySplit {
                store_cents: total,
                customer_cents: 0,
            },
            DeliveryMode::Hybrid => {
                let customer = total / 2;
                DeliverySplit {
                    store_cents: total - customer,
                    customer_cents: customer,
                }
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
