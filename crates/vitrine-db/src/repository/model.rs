//! # Model Repository
//!
//! Phone models and the shared (model, color) image sets used by new
//! (sealed) units.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use vitrine_core::{CompanyId, ModelColorImages, PhoneModel};

#[derive(Debug, Clone)]
pub struct ModelRepository {
    pool: SqlitePool,
}

const MODEL_COLUMNS: &str =
    "id, company_id, brand_id, name, slug, template_specs, is_active, created_at, updated_at";

impl ModelRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ModelRepository { pool }
    }

    /// Lists active models, optionally restricted to one brand.
    pub async fn list(
        &self,
        company: &CompanyId,
        brand_id: Option<&str>,
    ) -> DbResult<Vec<PhoneModel>> {
        let models = match brand_id {
            Some(brand_id) => {
                sqlx::query_as::<_, PhoneModel>(&format!(
                    "SELECT {MODEL_COLUMNS} FROM models
                     WHERE company_id = ?1 AND brand_id = ?2 AND is_active = 1
                     ORDER BY name"
                ))
                .bind(company.as_str())
                .bind(brand_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, PhoneModel>(&format!(
                    "SELECT {MODEL_COLUMNS} FROM models
                     WHERE company_id = ?1 AND is_active = 1
                     ORDER BY name"
                ))
                .bind(company.as_str())
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(models)
    }

    pub async fn get_by_id(&self, company: &CompanyId, id: &str) -> DbResult<Option<PhoneModel>> {
        let model = sqlx::query_as::<_, PhoneModel>(&format!(
            "SELECT {MODEL_COLUMNS} FROM models WHERE id = ?1 AND company_id = ?2"
        ))
        .bind(id)
        .bind(company.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(model)
    }

    pub async fn insert(&self, model: &PhoneModel) -> DbResult<()> {
        debug!(slug = %model.slug, "Inserting model");

        sqlx::query(
            r#"
            INSERT INTO models (
                id, company_id, brand_id, name, slug,
                template_specs, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&model.id)
        .bind(&model.company_id)
        .bind(&model.brand_id)
        .bind(&model.name)
        .bind(&model.slug)
        .bind(&model.template_specs)
        .bind(model.is_active)
        .bind(model.created_at)
        .bind(model.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn update(&self, model: &PhoneModel) -> DbResult<()> {
        debug!(id = %model.id, "Updating model");

        let result = sqlx::query(
            r#"
            UPDATE models SET
                brand_id = ?3, name = ?4, slug = ?5,
                template_specs = ?6, is_active = ?7, updated_at = ?8
            WHERE id = ?1 AND company_id = ?2
            "#,
        )
        .bind(&model.id)
        .bind(&model.company_id)
        .bind(&model.brand_id)
        .bind(&model.name)
        .bind(&model.slug)
        .bind(&model.template_specs)
        .bind(model.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Model", &model.id));
        }

        Ok(())
    }

    pub async fn soft_delete(&self, company: &CompanyId, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting model");

        let result = sqlx::query(
            r#"
            UPDATE models SET is_active = 0, updated_at = ?3
            WHERE id = ?1 AND company_id = ?2
            "#,
        )
        .bind(id)
        .bind(company.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Model", id));
        }

        Ok(())
    }

    // =========================================================================
    // Shared image sets
    // =========================================================================

    /// Fetches the shared image set for a (model, color) pair.
    pub async fn get_color_images(
        &self,
        company: &CompanyId,
        model_id: &str,
        color: &str,
    ) -> DbResult<Option<ModelColorImages>> {
        let images = sqlx::query_as::<_, ModelColorImages>(
            r#"
            SELECT id, company_id, model_id, color, image_urls, updated_at
            FROM model_color_images
            WHERE company_id = ?1 AND model_id = ?2 AND color = ?3
            "#,
        )
        .bind(company.as_str())
        .bind(model_id)
        .bind(color)
        .fetch_optional(&self.pool)
        .await?;

        Ok(images)
    }

    /// Creates or replaces the shared image set for a (model, color) pair.
    pub async fn upsert_color_images(
        &self,
        company: &CompanyId,
        model_id: &str,
        color: &str,
        image_urls: &[String],
    ) -> DbResult<ModelColorImages> {
        let urls_json =
            serde_json::to_string(image_urls).map_err(|e| DbError::Internal(e.to_string()))?;
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO model_color_images (id, company_id, model_id, color, image_urls, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT (model_id, color)
            DO UPDATE SET image_urls = excluded.image_urls, updated_at = excluded.updated_at
            "#,
        )
        .bind(generate_id())
        .bind(company.as_str())
        .bind(model_id)
        .bind(color)
        .bind(&urls_json)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_color_images(company, model_id, color)
            .await?
            .ok_or_else(|| DbError::not_found("ModelColorImages", model_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use vitrine_core::Brand;

    async fn setup() -> (Database, CompanyId, String) {
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

        (db, company_id, brand.id)
    }

    fn model(company: &CompanyId, brand_id: &str, name: &str, slug: &str) -> PhoneModel {
        let now = Utc::now();
        PhoneModel {
            id: generate_id(),
            company_id: company.as_str().to_string(),
            brand_id: brand_id.to_string(),
            name: name.to_string(),
            slug: slug.to_string(),
            template_specs: r#"{"screen":"6.1\"","battery":"100%"}"#.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_filter_by_brand() {
        let (db, company, brand_id) = setup().await;
        let repo = db.models();

        repo.insert(&model(&company, &brand_id, "iPhone 13", "iphone-13"))
            .await
            .unwrap();

        let all = repo.list(&company, None).await.unwrap();
        assert_eq!(all.len(), 1);

        let by_brand = repo.list(&company, Some(&brand_id)).await.unwrap();
        assert_eq!(by_brand.len(), 1);
        assert!(repo.list(&company, Some("other")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_template_roundtrip() {
        let (db, company, brand_id) = setup().await;
        let repo = db.models();

        let m = model(&company, &brand_id, "iPhone 13", "iphone-13");
        repo.insert(&m).await.unwrap();

        let loaded = repo.get_by_id(&company, &m.id).await.unwrap().unwrap();
        let template = loaded.template_map();
        assert_eq!(template.get("screen").map(String::as_str), Some("6.1\""));
    }

    #[tokio::test]
    async fn test_color_images_upsert_replaces() {
        let (db, company, brand_id) = setup().await;
        let repo = db.models();

        let m = model(&company, &brand_id, "iPhone 13", "iphone-13");
        repo.insert(&m).await.unwrap();

        repo.upsert_color_images(&company, &m.id, "midnight", &["a.jpg".to_string()])
            .await
            .unwrap();
        let replaced = repo
            .upsert_color_images(
                &company,
                &m.id,
                "midnight",
                &["b.jpg".to_string(), "c.jpg".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(replaced.images(), vec!["b.jpg", "c.jpg"]);
    }
}
