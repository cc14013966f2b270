//! # Payment Fee Repository
//!
//! The merchant fee table, keyed by (method, installment count).
//!
//! The `applied >= operator` invariant is enforced here on every upsert,
//! not only in the settings screen, so no edit path can store an
//! underwater fee row.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use vitrine_core::validation::validate_payment_fee;
use vitrine_core::{CompanyId, FeeTable, PaymentFee, PaymentMethod};

#[derive(Debug, Clone)]
pub struct PaymentFeeRepository {
    pool: SqlitePool,
}

const FEE_COLUMNS: &str =
    "id, company_id, method, installments, operator_fee_bps, applied_fee_bps, updated_at";

impl PaymentFeeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PaymentFeeRepository { pool }
    }

    /// Lists all fee rows for the settings screen, method then installments.
    pub async fn list(&self, company: &CompanyId) -> DbResult<Vec<PaymentFee>> {
        let fees = sqlx::query_as::<_, PaymentFee>(&format!(
            "SELECT {FEE_COLUMNS} FROM payment_fees
             WHERE company_id = ?1
             ORDER BY method, installments"
        ))
        .bind(company.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(fees)
    }

    /// Loads the whole table as the in-memory [`FeeTable`] the checkout
    /// engine quotes from.
    pub async fn load_table(&self, company: &CompanyId) -> DbResult<FeeTable> {
        Ok(FeeTable::new(self.list(company).await?))
    }

    pub async fn get(
        &self,
        company: &CompanyId,
        method: PaymentMethod,
        installments: i64,
    ) -> DbResult<Option<PaymentFee>> {
        let fee = sqlx::query_as::<_, PaymentFee>(&format!(
            "SELECT {FEE_COLUMNS} FROM payment_fees
             WHERE company_id = ?1 AND method = ?2 AND installments = ?3"
        ))
        .bind(company.as_str())
        .bind(method)
        .bind(installments)
        .fetch_optional(&self.pool)
        .await?;

        Ok(fee)
    }

    /// Creates or replaces the fee row for (method, installments).
    /// Rejects rows where the applied fee is below the operator cost.
    pub async fn upsert(
        &self,
        company: &CompanyId,
        method: PaymentMethod,
        installments: i64,
        operator_fee_bps: i64,
        applied_fee_bps: i64,
    ) -> DbResult<PaymentFee> {
        validate_payment_fee(installments, operator_fee_bps, applied_fee_bps)?;

        debug!(
            method = method.label(),
            installments, operator_fee_bps, applied_fee_bps, "Upserting payment fee"
        );

        sqlx::query(
            r#"
            INSERT INTO payment_fees (
                id, company_id, method, installments,
                operator_fee_bps, applied_fee_bps, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT (company_id, method, installments)
            DO UPDATE SET
                operator_fee_bps = excluded.operator_fee_bps,
                applied_fee_bps = excluded.applied_fee_bps,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(generate_id())
        .bind(company.as_str())
        .bind(method)
        .bind(installments)
        .bind(operator_fee_bps)
        .bind(applied_fee_bps)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.get(company, method, installments)
            .await?
            .ok_or_else(|| DbError::not_found("PaymentFee", format!("{}x", installments)))
    }

    pub async fn delete(
        &self,
        company: &CompanyId,
        method: PaymentMethod,
        installments: i64,
    ) -> DbResult<()> {
        let result = sqlx::query(
            "DELETE FROM payment_fees
             WHERE company_id = ?1 AND method = ?2 AND installments = ?3",
        )
        .bind(company.as_str())
        .bind(method)
        .bind(installments)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PaymentFee", format!("{}x", installments)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use vitrine_core::Money;

    async fn setup() -> (Database, CompanyId) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let company = db
            .companies()
            .ensure("loja-central", "Loja Central")
            .await
            .unwrap();
        let id = company.company_id();
        (db, id)
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_row() {
        let (db, company) = setup().await;
        let repo = db.fees();

        repo.upsert(&company, PaymentMethod::Credit, 3, 450, 600)
            .await
            .unwrap();
        let updated = repo
            .upsert(&company, PaymentMethod::Credit, 3, 450, 700)
            .await
            .unwrap();

        assert_eq!(updated.applied_fee_bps, 700);
        assert_eq!(repo.list(&company).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_underwater_fee_rejected_centrally() {
        let (db, company) = setup().await;

        let err = db
            .fees()
            .upsert(&company, PaymentMethod::Credit, 3, 450, 300)
            .await;
        assert!(matches!(err, Err(DbError::Validation(_))));
    }

    #[tokio::test]
    async fn test_loaded_table_quotes_checkout() {
        let (db, company) = setup().await;
        db.fees()
            .upsert(&company, PaymentMethod::Credit, 3, 450, 600)
            .await
            .unwrap();

        let table = db.fees().load_table(&company).await.unwrap();
        let quote = table.quote(Money::from_cents(100_000), PaymentMethod::Credit, 3);
        assert_eq!(quote.fee_cents, 6_000);
    }
}
