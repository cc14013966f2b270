//! # Company Repository
//!
//! Tenant resolution. The server resolves its configured slug to a row
//! once at startup and passes the resulting [`CompanyId`] everywhere.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;
use crate::repository::generate_id;
use vitrine_core::Company;

#[derive(Debug, Clone)]
pub struct CompanyRepository {
    pool: SqlitePool,
}

impl CompanyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CompanyRepository { pool }
    }

    /// Looks up a company by its slug.
    pub async fn get_by_slug(&self, slug: &str) -> DbResult<Option<Company>> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            SELECT id, slug, name, created_at
            FROM companies
            WHERE slug = ?1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(company)
    }

    /// Returns the company for a slug, creating the row on first startup.
    pub async fn ensure(&self, slug: &str, name: &str) -> DbResult<Company> {
        if let Some(company) = self.get_by_slug(slug).await? {
            return Ok(company);
        }

        let company = Company {
            id: generate_id(),
            slug: slug.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO companies (id, slug, name, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&company.id)
        .bind(&company.slug)
        .bind(&company.name)
        .bind(company.created_at)
        .execute(&self.pool)
        .await?;

        info!(slug = %slug, id = %company.id, "Company created");
        Ok(company)
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_ensure_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let first = db.companies().ensure("loja-central", "Loja Central").await.unwrap();
        let second = db.companies().ensure("loja-central", "Loja Central").await.unwrap();

        assert_eq!(first.id, second.id);
    }
}
