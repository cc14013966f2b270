//! # Fee Table and Installment Calculator
//!
//! Computes the customer-facing surcharge for card payments from the
//! merchant-configured fee table.
//!
//! The table is small (a few dozen rows at most), so lookup is a linear
//! search keyed by (method, installment count). A missing entry is not an
//! error: the quote falls back to zero fee and logs a warning, so checkout
//! never blocks on an unconfigured table.
//!
//! ```text
//! fee      = round(balance × applied_bps / 10000)
//! monthly  = round((balance + fee) / installments)
//! ```

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::money::Money;
use crate::types::{PaymentFee, PaymentMethod};

// =============================================================================
// Installment Quote
// =============================================================================

/// The result of pricing a balance for a given method and installment count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentQuote {
    pub method: PaymentMethod,
    pub installments: i64,
    /// Customer-facing surcharge rate, basis points. Zero when the table
    /// has no entry for this key.
    pub applied_fee_bps: i64,
    pub fee_cents: i64,
    pub total_with_fee_cents: i64,
    /// Rounded per-installment value.
    pub monthly_cents: i64,
}

// =============================================================================
// Fee Table
// =============================================================================

/// In-memory view of the merchant's payment_fees rows.
#[derive(Debug, Clone, Default)]
pub struct FeeTable {
    rows: Vec<PaymentFee>,
}

impl FeeTable {
    pub fn new(rows: Vec<PaymentFee>) -> Self {
        FeeTable { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Finds the fee row for (method, installments). Linear search; the
    /// table never has more than a handful of rows per method.
    pub fn lookup(&self, method: PaymentMethod, installments: i64) -> Option<&PaymentFee> {
        self.rows
            .iter()
            .find(|f| f.method == method && f.installments == installments)
    }

    /// Prices a balance for the given method and installment count.
    ///
    /// A missing table entry yields a zero-fee quote and a warning; the
    /// sale still goes through.
    pub fn quote(
        &self,
        balance: Money,
        method: PaymentMethod,
        installments: i64,
    ) -> InstallmentQuote {
        let installments = installments.max(1);

        let applied_bps = match self.lookup(method, installments) {
            Some(fee) => fee.applied_fee_bps,
            None => {
                warn!(
                    method = method.label(),
                    installments, "no fee configured, assuming zero"
                );
                0
            }
        };

        let fee = balance.apply_bps(applied_bps);
        let total = balance + fee;

        InstallmentQuote {
            method,
            installments,
            applied_fee_bps: applied_bps,
            fee_cents: fee.cents(),
            total_with_fee_cents: total.cents(),
            monthly_cents: total.divide_rounded(installments).cents(),
        }
    }

    /// Prices a balance across every configured installment count for a
    /// method, sorted by installments. Drives the installment picker.
    pub fn installment_options(
        &self,
        balance: Money,
        method: PaymentMethod,
    ) -> Vec<InstallmentQuote> {
        let mut counts: Vec<i64> = self
            .rows
            .iter()
            .filter(|f| f.method == method)
            .map(|f| f.installments)
            .collect();
        counts.sort_unstable();
        counts.dedup();

        counts
            .into_iter()
            .map(|n| self.quote(balance, method, n))
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn fee(method: PaymentMethod, installments: i64, operator: i64, applied: i64) -> PaymentFee {
        PaymentFee {
            id: format!("fee-{installments}"),
            company_id: "c1".to_string(),
            method,
            installments,
            operator_fee_bps: operator,
            applied_fee_bps: applied,
            updated_at: Utc::now(),
        }
    }

    fn table() -> FeeTable {
        FeeTable::new(vec![
            fee(PaymentMethod::Debit, 1, 99, 150),
            fee(PaymentMethod::Credit, 1, 300, 400),
            fee(PaymentMethod::Credit, 3, 450, 600),
            fee(PaymentMethod::Credit, 6, 550, 800),
        ])
    }

    #[test]
    fn test_quote_applies_configured_fee() {
        // R$ 1.000,00 in 3x at 6%: fee R$ 60,00, total R$ 1.060,00,
        // monthly round(106000/3) = 35333
        let q = table().quote(Money::from_cents(100_000), PaymentMethod::Credit, 3);
        assert_eq!(q.applied_fee_bps, 600);
        assert_eq!(q.fee_cents, 6_000);
        assert_eq!(q.total_with_fee_cents, 106_000);
        assert_eq!(q.monthly_cents, 35_333);
    }

    #[test]
    fn test_missing_entry_falls_back_to_zero_fee() {
        let q = table().quote(Money::from_cents(100_000), PaymentMethod::Credit, 12);
        assert_eq!(q.applied_fee_bps, 0);
        assert_eq!(q.fee_cents, 0);
        assert_eq!(q.total_with_fee_cents, 100_000);
        assert_eq!(q.monthly_cents, 8_333);
    }

    #[test]
    fn test_surcharge_rounding_half_up() {
        // 9999 at 4% = 399.96 => 400
        let q = table().quote(Money::from_cents(9_999), PaymentMethod::Credit, 1);
        assert_eq!(q.fee_cents, 400);
    }

    #[test]
    fn test_installments_clamped_to_one() {
        let q = table().quote(Money::from_cents(10_000), PaymentMethod::Pix, 0);
        assert_eq!(q.installments, 1);
        assert_eq!(q.monthly_cents, q.total_with_fee_cents);
    }

    #[test]
    fn test_installment_options_sorted() {
        let options = table().installment_options(Money::from_cents(100_000), PaymentMethod::Credit);
        let counts: Vec<i64> = options.iter().map(|o| o.installments).collect();
        assert_eq!(counts, vec![1, 3, 6]);
    }

    #[test]
    fn test_debit_single_installment_fee() {
        let q = table().quote(Money::from_cents(20_000), PaymentMethod::Debit, 1);
        assert_eq!(q.fee_cents, 300); // 1.5%
        assert_eq!(q.total_with_fee_cents, 20_300);
    }
}
