//! # Customer Repository
//!
//! Customer lookup for the checkout flow: search by name or phone
//! fragment, create on the fly when the customer is new.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use vitrine_core::{CompanyId, Customer};

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

const CUSTOMER_COLUMNS: &str =
    "id, company_id, name, phone, email, notes, created_at, updated_at";

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Searches customers by name or phone fragment.
    pub async fn search(
        &self,
        company: &CompanyId,
        query: &str,
        limit: u32,
    ) -> DbResult<Vec<Customer>> {
        let pattern = format!("%{}%", query.trim());

        debug!(query = %query, "Searching customers");

        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers
             WHERE company_id = ?1 AND (name LIKE ?2 OR phone LIKE ?2)
             ORDER BY name
             LIMIT ?3"
        ))
        .bind(company.as_str())
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    pub async fn get_by_id(&self, company: &CompanyId, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1 AND company_id = ?2"
        ))
        .bind(id)
        .bind(company.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(name = %customer.name, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (id, company_id, name, phone, email, notes, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.company_id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.notes)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn update(&self, customer: &Customer) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE customers SET name = ?3, phone = ?4, email = ?5, notes = ?6, updated_at = ?7
            WHERE id = ?1 AND company_id = ?2
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.company_id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.notes)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &customer.id));
        }

        Ok(())
    }
}
