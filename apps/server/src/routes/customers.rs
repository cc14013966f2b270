//! # Customer Handlers
//!
//! Checkout-time customer lookup and create-on-the-fly.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use vitrine_core::validation::validate_name;
use vitrine_core::Customer;
use vitrine_db::generate_id;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CustomerSearchQuery {
    pub q: Option<String>,
    pub limit: Option<u32>,
}

/// Searches customers by name or phone fragment.
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<CustomerSearchQuery>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    let limit = query.limit.unwrap_or(20).min(100);
    let customers = state
        .db
        .customers()
        .search(&state.company, query.q.as_deref().unwrap_or(""), limit)
        .await?;
    Ok(Json(customers))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateCustomerRequest>,
) -> Result<Json<Customer>, ApiError> {
    validate_name("name", &req.name)?;

    let now = Utc::now();
    let customer = Customer {
        id: generate_id(),
        company_id: state.company.as_str().to_string(),
        name: req.name.trim().to_string(),
        phone: req.phone,
        email: req.email,
        notes: req.notes,
        created_at: now,
        updated_at: now,
    };

    state.db.customers().insert(&customer).await?;
    info!(customer_id = %customer.id, "Customer created");

    Ok(Json(customer))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CreateCustomerRequest>,
) -> Result<Json<Customer>, ApiError> {
    validate_name("name", &req.name)?;

    let mut customer = state
        .db
        .customers()
        .get_by_id(&state.company, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer", &id))?;

    customer.name = req.name.trim().to_string();
    customer.phone = req.phone;
    customer.email = req.email;
    customer.notes = req.notes;

    state.db.customers().update(&customer).await?;
    Ok(Json(customer))
}
