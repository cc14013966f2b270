//! # Brand Repository

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use vitrine_core::{Brand, CompanyId};

#[derive(Debug, Clone)]
pub struct BrandRepository {
    pool: SqlitePool,
}

const BRAND_COLUMNS: &str = "id, company_id, name, slug, is_active, created_at, updated_at";

impl BrandRepository {
    pub fn new(pool: SqlitePool) -> Self {
        BrandRepository { pool }
    }

    /// Lists brands for the company, active only unless asked otherwise.
    pub async fn list(&self, company: &CompanyId, include_inactive: bool) -> DbResult<Vec<Brand>> {
        let sql = if include_inactive {
            format!(
                "SELECT {BRAND_COLUMNS} FROM brands WHERE company_id = ?1 ORDER BY name"
            )
        } else {
            format!(
                "SELECT {BRAND_COLUMNS} FROM brands WHERE company_id = ?1 AND is_active = 1 ORDER BY name"
            )
        };

        let brands = sqlx::query_as::<_, Brand>(&sql)
            .bind(company.as_str())
            .fetch_all(&self.pool)
            .await?;

        Ok(brands)
    }

    pub async fn get_by_id(&self, company: &CompanyId, id: &str) -> DbResult<Option<Brand>> {
        let brand = sqlx::query_as::<_, Brand>(&format!(
            "SELECT {BRAND_COLUMNS} FROM brands WHERE id = ?1 AND company_id = ?2"
        ))
        .bind(id)
        .bind(company.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(brand)
    }

    pub async fn get_by_slug(&self, company: &CompanyId, slug: &str) -> DbResult<Option<Brand>> {
        let brand = sqlx::query_as::<_, Brand>(&format!(
            "SELECT {BRAND_COLUMNS} FROM brands WHERE slug = ?1 AND company_id = ?2"
        ))
        .bind(slug)
        .bind(company.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(brand)
    }

    pub async fn insert(&self, brand: &Brand) -> DbResult<()> {
        debug!(slug = %brand.slug, "Inserting brand");

        sqlx::query(
            r#"
            INSERT INTO brands (id, company_id, name, slug, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&brand.id)
        .bind(&brand.company_id)
        .bind(&brand.name)
        .bind(&brand.slug)
        .bind(brand.is_active)
        .bind(brand.created_at)
        .bind(brand.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn update(&self, brand: &Brand) -> DbResult<()> {
        debug!(id = %brand.id, "Updating brand");

        let result = sqlx::query(
            r#"
            UPDATE brands SET name = ?3, slug = ?4, is_active = ?5, updated_at = ?6
            WHERE id = ?1 AND company_id = ?2
            "#,
        )
        .bind(&brand.id)
        .bind(&brand.company_id)
        .bind(&brand.name)
        .bind(&brand.slug)
        .bind(brand.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Brand", &brand.id));
        }

        Ok(())
    }

    /// Soft delete: historical products and sales keep referencing the row.
    pub async fn soft_delete(&self, company: &CompanyId, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting brand");

        let result = sqlx::query(
            r#"
            UPDATE brands SET is_active = 0, updated_at = ?3
            WHERE id = ?1 AND company_id = ?2
            "#,
        )
        .bind(id)
        .bind(company.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Brand", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::generate_id;

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

    fn brand(company: &CompanyId, name: &str, slug: &str) -> Brand {
        let now = Utc::now();
        Brand {
            id: generate_id(),
            company_id: company.as_str().to_string(),
            name: name.to_string(),
            slug: slug.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let (db, company) = setup().await;
        let repo = db.brands();

        repo.insert(&brand(&company, "Apple", "apple")).await.unwrap();
        repo.insert(&brand(&company, "Samsung", "samsung")).await.unwrap();

        let brands = repo.list(&company, false).await.unwrap();
        assert_eq!(brands.len(), 2);
        assert_eq!(brands[0].name, "Apple"); // ordered by name
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() {
        let (db, company) = setup().await;
        let repo = db.brands();

        repo.insert(&brand(&company, "Apple", "apple")).await.unwrap();
        let err = repo.insert(&brand(&company, "Apple 2", "apple")).await;
        assert!(matches!(err, Err(DbError::UniqueViolation { .. })));
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_active_list() {
        let (db, company) = setup().await;
        let repo = db.brands();

        let b = brand(&company, "Apple", "apple");
        repo.insert(&b).await.unwrap();
        repo.soft_delete(&company, &b.id).await.unwrap();

        assert!(repo.list(&company, false).await.unwrap().is_empty());
        assert_eq!(repo.list(&company, true).await.unwrap().len(), 1);
    }
}
