//! # Sale Repository
//!
//! Persistence for sales, line items, payments, and delivery credits.
//!
//! ## Checkout Write
//! A checkout touches four tables (sales, sale_items, sale_payments,
//! delivery_credits). The write is one transaction: either every row
//! lands or none does.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use vitrine_core::{
    CompanyId, DeliveryCredit, Sale, SaleItem, SalePayment, SaleStatus,
};

#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

const SALE_COLUMNS: &str = "id, company_id, receipt_number, customer_id, status, delivery_mode, \
     subtotal_cents, discount_cents, delivery_store_cents, delivery_customer_cents, \
     total_cents, cost_cents, profit_cents, notes, created_at, updated_at, voided_at";

const ITEM_COLUMNS: &str = "id, sale_id, product_id, name_snapshot, quantity, unit_price_cents, \
     unit_cost_cents, discount_cents, is_gift, line_total_cents, created_at";

const PAYMENT_COLUMNS: &str = "id, sale_id, method, amount_cents, installments, \
     applied_fee_bps, fee_cents, total_with_fee_cents, created_at";

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    // =========================================================================
    // Checkout write
    // =========================================================================

    /// Persists a whole checkout atomically: the sale, its items, its
    /// payments, and the delivery credit when the sale is delivered.
    pub async fn insert_checkout(
        &self,
        sale: &Sale,
        items: &[SaleItem],
        payments: &[SalePayment],
        delivery_credit: Option<&DeliveryCredit>,
    ) -> DbResult<()> {
        debug!(
            id = %sale.id,
            receipt_number = %sale.receipt_number,
            items = items.len(),
            payments = payments.len(),
            "Persisting checkout"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, company_id, receipt_number, customer_id, status, delivery_mode,
                subtotal_cents, discount_cents, delivery_store_cents, delivery_customer_cents,
                total_cents, cost_cents, profit_cents, notes,
                created_at, updated_at, voided_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14,
                ?15, ?16, ?17
            )
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.company_id)
        .bind(&sale.receipt_number)
        .bind(&sale.customer_id)
        .bind(sale.status)
        .bind(sale.delivery_mode)
        .bind(sale.subtotal_cents)
        .bind(sale.discount_cents)
        .bind(sale.delivery_store_cents)
        .bind(sale.delivery_customer_cents)
        .bind(sale.total_cents)
        .bind(sale.cost_cents)
        .bind(sale.profit_cents)
        .bind(&sale.notes)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .bind(sale.voided_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id, name_snapshot, quantity,
                    unit_price_cents, unit_cost_cents, discount_cents,
                    is_gift, line_total_cents, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                "#,
            )
            .bind(&item.id)
            .bind(&item.sale_id)
            .bind(&item.product_id)
            .bind(&item.name_snapshot)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.unit_cost_cents)
            .bind(item.discount_cents)
            .bind(item.is_gift)
            .bind(item.line_total_cents)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;
        }

        for payment in payments {
            Self::insert_payment_tx(&mut tx, payment).await?;
        }

        if let Some(credit) = delivery_credit {
            sqlx::query(
                r#"
                INSERT INTO delivery_credits (
                    id, company_id, sale_id, mode, store_cents, customer_cents, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&credit.id)
            .bind(&credit.company_id)
            .bind(&credit.sale_id)
            .bind(credit.mode)
            .bind(credit.store_cents)
            .bind(credit.customer_cents)
            .bind(credit.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            sale_id = %sale.id,
            total = sale.total_cents,
            "Checkout persisted"
        );
        Ok(())
    }

    async fn insert_payment_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        payment: &SalePayment,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sale_payments (
                id, sale_id, method, amount_cents, installments,
                applied_fee_bps, fee_cents, total_with_fee_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.sale_id)
        .bind(payment.method)
        .bind(payment.amount_cents)
        .bind(payment.installments)
        .bind(payment.applied_fee_bps)
        .bind(payment.fee_cents)
        .bind(payment.total_with_fee_cents)
        .bind(payment.created_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn get_by_id(&self, company: &CompanyId, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1 AND company_id = ?2"
        ))
        .bind(id)
        .bind(company.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Recent sales for the console, newest first.
    pub async fn list_recent(&self, company: &CompanyId, limit: u32) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales
             WHERE company_id = ?1
             ORDER BY created_at DESC
             LIMIT ?2"
        ))
        .bind(company.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY created_at"
        ))
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn get_payments(&self, sale_id: &str) -> DbResult<Vec<SalePayment>> {
        let payments = sqlx::query_as::<_, SalePayment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM sale_payments WHERE sale_id = ?1 ORDER BY created_at"
        ))
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    pub async fn get_delivery_credit(&self, sale_id: &str) -> DbResult<Option<DeliveryCredit>> {
        let credit = sqlx::query_as::<_, DeliveryCredit>(
            r#"
            SELECT id, company_id, sale_id, mode, store_cents, customer_cents, created_at
            FROM delivery_credits
            WHERE sale_id = ?1
            "#,
        )
        .bind(sale_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credit)
    }

    /// Sum of settled payment amounts (total with fee when present).
    pub async fn get_total_paid(&self, sale_id: &str) -> DbResult<i64> {
        let total: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT SUM(COALESCE(total_with_fee_cents, amount_cents))
            FROM sale_payments
            WHERE sale_id = ?1
            "#,
        )
        .bind(sale_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total.unwrap_or(0))
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Records an additional payment towards an existing sale.
    pub async fn add_payment(&self, payment: &SalePayment) -> DbResult<()> {
        debug!(
            sale_id = %payment.sale_id,
            amount = payment.amount_cents,
            "Recording payment"
        );

        let mut tx = self.pool.begin().await?;
        Self::insert_payment_tx(&mut tx, payment).await?;
        tx.commit().await?;

        Ok(())
    }

    /// Voids a completed sale. History stays; status flips.
    pub async fn void(&self, company: &CompanyId, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE sales SET status = 'voided', voided_at = ?3, updated_at = ?3
            WHERE id = ?1 AND company_id = ?2 AND status = 'completed'
            "#,
        )
        .bind(id)
        .bind(company.as_str())
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale (completed)", id));
        }

        info!(sale_id = %id, "Sale voided");
        Ok(())
    }
}

/// Generates a receipt number: `YYYYMMDD-HHMMSS-NNNN`.
///
/// The trailing sequence comes from the subsecond clock; the UNIQUE
/// constraint on sales.receipt_number catches the (unlikely) collision.
pub fn generate_receipt_number() -> String {
    let now = Utc::now();
    let seq = (now.timestamp_subsec_micros() % 10_000) as u32;
    format!("{}-{:04}", now.format("%Y%m%d-%H%M%S"), seq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::generate_id;
    use vitrine_core::{DeliveryMode, PaymentMethod};

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

    fn sale(company: &CompanyId) -> Sale {
        let now = Utc::now();
        Sale {
            id: generate_id(),
            company_id: company.as_str().to_string(),
            receipt_number: generate_receipt_number(),
            customer_id: None,
            status: SaleStatus::Completed,
            delivery_mode: DeliveryMode::Hybrid,
            subtotal_cents: 20_000,
            discount_cents: 0,
            delivery_store_cents: 750,
            delivery_customer_cents: 750,
            total_cents: 20_750,
            cost_cents: 12_000,
            profit_cents: 7_250,
            notes: None,
            created_at: now,
            updated_at: now,
            voided_at: None,
        }
    }

    fn item(sale_id: &str) -> SaleItem {
        SaleItem {
            id: generate_id(),
            sale_id: sale_id.to_string(),
            product_id: generate_id(),
            name_snapshot: "iPhone 13 128GB".to_string(),
            quantity: 2,
            unit_price_cents: 10_000,
            unit_cost_cents: 6_000,
            discount_cents: 0,
            is_gift: false,
            line_total_cents: 20_000,
            created_at: Utc::now(),
        }
    }

    fn payment(sale_id: &str, amount: i64) -> SalePayment {
        SalePayment {
            id: generate_id(),
            sale_id: sale_id.to_string(),
            method: PaymentMethod::Pix,
            amount_cents: amount,
            installments: None,
            applied_fee_bps: None,
            fee_cents: None,
            total_with_fee_cents: None,
            created_at: Utc::now(),
        }
    }

    fn credit(company: &CompanyId, sale: &Sale) -> DeliveryCredit {
        DeliveryCredit {
            id: generate_id(),
            company_id: company.as_str().to_string(),
            sale_id: sale.id.clone(),
            mode: sale.delivery_mode,
            store_cents: sale.delivery_store_cents,
            customer_cents: sale.delivery_customer_cents,
            created_at: Utc::now(),
        }
    }

    // NOTE: products are not FK-referenced by generated ids here because
    // sale_items.product_id references products; insert a real product.
    async fn seed_product(db: &Database, company: &CompanyId) -> String {
        use vitrine_core::{Brand, Condition, PhoneModel, Product};
        let now = Utc::now();
        let brand = Brand {
            id: generate_id(),
            company_id: company.as_str().to_string(),
            name: "Apple".to_string(),
            slug: "apple".to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.brands().insert(&brand).await.unwrap();
        let model = PhoneModel {
            id: generate_id(),
            company_id: company.as_str().to_string(),
            brand_id: brand.id.clone(),
            name: "iPhone 13".to_string(),
            slug: "iphone-13".to_string(),
            template_specs: "{}".to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.models().insert(&model).await.unwrap();
        let product = Product {
            id: generate_id(),
            company_id: company.as_str().to_string(),
            brand_id: brand.id,
            model_id: model.id,
            name: "iPhone 13 128GB".to_string(),
            ean: None,
            imei: None,
            serial_number: None,
            color: None,
            storage: Some("128GB".to_string()),
            condition: Condition::Used,
            cost_cents: 6_000,
            retail_price_cents: 10_000,
            reseller_price_cents: None,
            wholesale_price_cents: None,
            specs: "{}".to_string(),
            image_urls: "[]".to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();
        product.id
    }

    #[tokio::test]
    async fn test_checkout_persists_all_rows() {
        let (db, company) = setup().await;
        let product_id = seed_product(&db, &company).await;

        let s = sale(&company);
        let mut i = item(&s.id);
        i.product_id = product_id;
        let p = payment(&s.id, 20_750);
        let c = credit(&company, &s);

        db.sales()
            .insert_checkout(&s, &[i], &[p], Some(&c))
            .await
            .unwrap();

        let loaded = db.sales().get_by_id(&company, &s.id).await.unwrap().unwrap();
        assert_eq!(loaded.total_cents, 20_750);
        assert_eq!(db.sales().get_items(&s.id).await.unwrap().len(), 1);
        assert_eq!(db.sales().get_payments(&s.id).await.unwrap().len(), 1);
        assert!(db.sales().get_delivery_credit(&s.id).await.unwrap().is_some());
        assert_eq!(db.sales().get_total_paid(&s.id).await.unwrap(), 20_750);
    }

    #[tokio::test]
    async fn test_checkout_rolls_back_on_bad_item() {
        let (db, company) = setup().await;

        let s = sale(&company);
        // item references a product that does not exist -> FK failure
        let bad_item = item(&s.id);

        let err = db
            .sales()
            .insert_checkout(&s, &[bad_item], &[], None)
            .await;
        assert!(err.is_err());

        // the sale row must not have survived the failed transaction
        assert!(db.sales().get_by_id(&company, &s.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_total_paid_prefers_total_with_fee() {
        let (db, company) = setup().await;
        let product_id = seed_product(&db, &company).await;

        let s = sale(&company);
        let mut i = item(&s.id);
        i.product_id = product_id;

        let mut p = payment(&s.id, 20_000);
        p.method = PaymentMethod::Credit;
        p.installments = Some(3);
        p.applied_fee_bps = Some(600);
        p.fee_cents = Some(1_200);
        p.total_with_fee_cents = Some(21_200);

        db.sales()
            .insert_checkout(&s, &[i], &[p], None)
            .await
            .unwrap();

        assert_eq!(db.sales().get_total_paid(&s.id).await.unwrap(), 21_200);
    }

    #[tokio::test]
    async fn test_void_only_completed_sales() {
        let (db, company) = setup().await;
        let product_id = seed_product(&db, &company).await;

        let s = sale(&company);
        let mut i = item(&s.id);
        i.product_id = product_id;
        db.sales().insert_checkout(&s, &[i], &[], None).await.unwrap();

        db.sales().void(&company, &s.id).await.unwrap();

        let loaded = db.sales().get_by_id(&company, &s.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, SaleStatus::Voided);
        assert!(loaded.voided_at.is_some());

        // voiding twice fails
        assert!(db.sales().void(&company, &s.id).await.is_err());
    }

    #[tokio::test]
    async fn test_list_recent_newest_first() {
        let (db, company) = setup().await;
        let product_id = seed_product(&db, &company).await;

        for _ in 0..3 {
            let s = sale(&company);
            let mut i = item(&s.id);
            i.product_id = product_id.clone();
            db.sales().insert_checkout(&s, &[i], &[], None).await.unwrap();
        }

        let sales = db.sales().list_recent(&company, 2).await.unwrap();
        assert_eq!(sales.len(), 2);
    }
}
