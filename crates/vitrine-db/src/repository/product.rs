//! # Product Repository
//!
//! Catalog lookups and CRUD for sellable units.
//!
//! ## Key Operations
//! - Listing and name search for the console
//! - EAN / IMEI exact lookup for the product-entry form auto-fill
//! - Storage capacity options for the form

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use vitrine_core::{CompanyId, Product, StorageOption};

#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

const PRODUCT_COLUMNS: &str = "id, company_id, brand_id, model_id, name, ean, imei, \
     serial_number, color, storage, condition, cost_cents, retail_price_cents, \
     reseller_price_cents, wholesale_price_cents, specs, image_urls, is_active, \
     created_at, updated_at";

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Searches active products by name fragment. An empty query lists
    /// active products sorted by name.
    pub async fn search(
        &self,
        company: &CompanyId,
        query: &str,
        limit: u32,
    ) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list_active(company, limit).await;
        }

        let pattern = format!("%{}%", query);

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE company_id = ?1 AND is_active = 1 AND name LIKE ?2
             ORDER BY name
             LIMIT ?3"
        ))
        .bind(company.as_str())
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Lists active products sorted by name.
    pub async fn list_active(&self, company: &CompanyId, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE company_id = ?1 AND is_active = 1
             ORDER BY name
             LIMIT ?2"
        ))
        .bind(company.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    pub async fn get_by_id(&self, company: &CompanyId, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1 AND company_id = ?2"
        ))
        .bind(id)
        .bind(company.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Barcode lookup for the entry form: most recent match wins when the
    /// same EAN was registered more than once (same sealed model).
    pub async fn get_by_ean(&self, company: &CompanyId, ean: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE ean = ?1 AND company_id = ?2
             ORDER BY created_at DESC
             LIMIT 1"
        ))
        .bind(ean)
        .bind(company.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Device lookup by IMEI; unique per unit.
    pub async fn get_by_imei(&self, company: &CompanyId, imei: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE imei = ?1 AND company_id = ?2"
        ))
        .bind(imei)
        .bind(company.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, company_id, brand_id, model_id, name, ean, imei,
                serial_number, color, storage, condition,
                cost_cents, retail_price_cents, reseller_price_cents, wholesale_price_cents,
                specs, image_urls, is_active, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7,
                ?8, ?9, ?10, ?11,
                ?12, ?13, ?14, ?15,
                ?16, ?17, ?18, ?19, ?20
            )
            "#,
        )
        .bind(&product.id)
        .bind(&product.company_id)
        .bind(&product.brand_id)
        .bind(&product.model_id)
        .bind(&product.name)
        .bind(&product.ean)
        .bind(&product.imei)
        .bind(&product.serial_number)
        .bind(&product.color)
        .bind(&product.storage)
        .bind(product.condition)
        .bind(product.cost_cents)
        .bind(product.retail_price_cents)
        .bind(product.reseller_price_cents)
        .bind(product.wholesale_price_cents)
        .bind(&product.specs)
        .bind(&product.image_urls)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                brand_id = ?3, model_id = ?4, name = ?5, ean = ?6, imei = ?7,
                serial_number = ?8, color = ?9, storage = ?10, condition = ?11,
                cost_cents = ?12, retail_price_cents = ?13,
                reseller_price_cents = ?14, wholesale_price_cents = ?15,
                specs = ?16, image_urls = ?17, is_active = ?18, updated_at = ?19
            WHERE id = ?1 AND company_id = ?2
            "#,
        )
        .bind(&product.id)
        .bind(&product.company_id)
        .bind(&product.brand_id)
        .bind(&product.model_id)
        .bind(&product.name)
        .bind(&product.ean)
        .bind(&product.imei)
        .bind(&product.serial_number)
        .bind(&product.color)
        .bind(&product.storage)
        .bind(product.condition)
        .bind(product.cost_cents)
        .bind(product.retail_price_cents)
        .bind(product.reseller_price_cents)
        .bind(product.wholesale_price_cents)
        .bind(&product.specs)
        .bind(&product.image_urls)
        .bind(product.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Soft delete: historical sales keep referencing the row.
    pub async fn soft_delete(&self, company: &CompanyId, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let result = sqlx::query(
            r#"
            UPDATE products SET is_active = 0, updated_at = ?3
            WHERE id = ?1 AND company_id = ?2
            "#,
        )
        .bind(id)
        .bind(company.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self, company: &CompanyId) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE company_id = ?1 AND is_active = 1",
        )
        .bind(company.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Storage capacity options for the product-entry form.
    pub async fn list_storage_options(&self) -> DbResult<Vec<StorageOption>> {
        let options = sqlx::query_as::<_, StorageOption>(
            "SELECT id, label, sort_order FROM storages ORDER BY sort_order",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::generate_id;
    use vitrine_core::{Brand, Condition, PhoneModel};

    async fn setup() -> (Database, CompanyId, String, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let company = db
            .companies()
            .ensure("loja-central", "Loja Central")
            .await
            .unwrap();
        let company_id = company.company_id();
        let now = Utc::now();

        let brand = Brand {
            id: generate_id(),
            company_id: company.id.clone(),
            name: "Apple".to_string(),
            slug: "apple".to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.brands().insert(&brand).await.unwrap();

        let model = PhoneModel {
            id: generate_id(),
            company_id: company.id.clone(),
            brand_id: brand.id.clone(),
            name: "iPhone 13".to_string(),
            slug: "iphone-13".to_string(),
            template_specs: "{}".to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.models().insert(&model).await.unwrap();

        (db, company_id, brand.id, model.id)
    }

    fn product(company: &CompanyId, brand_id: &str, model_id: &str, name: &str) -> Product {
        let now = Utc::now();
        Product {
            id: generate_id(),
            company_id: company.as_str().to_string(),
            brand_id: brand_id.to_string(),
            model_id: model_id.to_string(),
            name: name.to_string(),
            ean: Some("7891234567895".to_string()),
            imei: None,
            serial_number: None,
            color: Some("midnight".to_string()),
            storage: Some("128GB".to_string()),
            condition: Condition::Used,
            cost_cents: 250_000,
            retail_price_cents: 320_000,
            reseller_price_cents: Some(300_000),
            wholesale_price_cents: None,
            specs: "{}".to_string(),
            image_urls: "[]".to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_search_by_name_fragment() {
        let (db, company, brand_id, model_id) = setup().await;
        let repo = db.products();

        repo.insert(&product(&company, &brand_id, &model_id, "iPhone 13 128GB"))
            .await
            .unwrap();
        repo.insert(&product(&company, &brand_id, &model_id, "Galaxy S23"))
            .await
            .unwrap();

        let hits = repo.search(&company, "iphone", 20).await.unwrap();
        // LIKE is case-insensitive for ASCII in SQLite
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "iPhone 13 128GB");

        let all = repo.search(&company, "", 20).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(repo.count(&company).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_ean_lookup_for_autofill() {
        let (db, company, brand_id, model_id) = setup().await;
        let repo = db.products();

        let p = product(&company, &brand_id, &model_id, "iPhone 13 128GB");
        repo.insert(&p).await.unwrap();

        let hit = repo
            .get_by_ean(&company, "7891234567895")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.id, p.id);

        assert!(repo
            .get_by_ean(&company, "0000000000000")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_imei_unique_per_unit() {
        let (db, company, brand_id, model_id) = setup().await;
        let repo = db.products();

        let mut a = product(&company, &brand_id, &model_id, "iPhone 13 A");
        a.imei = Some("356789104321987".to_string());
        repo.insert(&a).await.unwrap();

        let mut b = product(&company, &brand_id, &model_id, "iPhone 13 B");
        b.imei = Some("356789104321987".to_string());
        let err = repo.insert(&b).await;
        assert!(matches!(err, Err(DbError::UniqueViolation { .. })));

        let hit = repo
            .get_by_imei(&company, "356789104321987")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.id, a.id);
    }

    #[tokio::test]
    async fn test_storage_options_seeded() {
        let (db, _company, _brand, _model) = setup().await;

        let options = db.products().list_storage_options().await.unwrap();
        assert!(!options.is_empty());
        assert_eq!(options[0].label, "32GB"); // sorted by sort_order
    }
}
