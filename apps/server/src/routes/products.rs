//! # Product Handlers
//!
//! The product-entry workflow: creation with model-template fill, EAN/IMEI
//! auto-fill lookup, and image resolution (shared set for new units, own
//! list for used ones).

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

use vitrine_core::validation::{
    validate_ean, validate_imei, validate_name, validate_price_cents,
};
use vitrine_core::{merge_template_specs, Condition, Product, StorageOption};
use vitrine_db::generate_id;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// DTOs
// =============================================================================

/// A product plus its resolved image list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    #[serde(flatten)]
    pub product: Product,
    /// Shared (model, color) set for new units, own list otherwise.
    pub images: Vec<String>,
}

async fn resolve_images(state: &AppState, product: &Product) -> Result<Vec<String>, ApiError> {
    if product.uses_shared_images() {
        if let Some(color) = &product.color {
            if let Some(shared) = state
                .db
                .models()
                .get_color_images(&state.company, &product.model_id, color)
                .await?
            {
                return Ok(shared.images());
            }
        }
    }
    Ok(product.own_images())
}

async fn to_response(state: &AppState, product: Product) -> Result<ProductResponse, ApiError> {
    let images = resolve_images(state, &product).await?;
    Ok(ProductResponse { product, images })
}

// =============================================================================
// List / get / lookup
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub q: Option<String>,
    pub limit: Option<u32>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let limit = query.limit.unwrap_or(50).min(200);
    let products = state
        .db
        .products()
        .search(&state.company, query.q.as_deref().unwrap_or(""), limit)
        .await?;
    Ok(Json(products))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state
        .db
        .products()
        .get_by_id(&state.company, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &id))?;

    Ok(Json(to_response(&state, product).await?))
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub ean: Option<String>,
    pub imei: Option<String>,
}

/// Auto-fill lookup for the entry form: by EAN or by IMEI.
pub async fn lookup(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = match (&query.ean, &query.imei) {
        (Some(ean), _) => {
            validate_ean(ean)?;
            state.db.products().get_by_ean(&state.company, ean).await?
        }
        (None, Some(imei)) => {
            validate_imei(imei)?;
            state.db.products().get_by_imei(&state.company, imei).await?
        }
        (None, None) => {
            return Err(ApiError::validation("pass either ean or imei"));
        }
    };

    let product = product.ok_or_else(|| {
        let key = query.ean.or(query.imei).unwrap_or_default();
        ApiError::not_found("Product", &key)
    })?;

    Ok(Json(to_response(&state, product).await?))
}

pub async fn storages(
    State(state): State<AppState>,
) -> Result<Json<Vec<StorageOption>>, ApiError> {
    Ok(Json(state.db.products().list_storage_options().await?))
}

// =============================================================================
// Create / update / delete
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub model_id: String,
    /// Defaults to "<model name> <storage>" when absent.
    pub name: Option<String>,
    pub ean: Option<String>,
    pub imei: Option<String>,
    pub serial_number: Option<String>,
    pub color: Option<String>,
    pub storage: Option<String>,
    pub condition: Condition,
    pub cost_cents: i64,
    pub retail_price_cents: i64,
    pub reseller_price_cents: Option<i64>,
    pub wholesale_price_cents: Option<i64>,
    /// Own spec values; the model template fills the gaps.
    pub specs: Option<HashMap<String, String>>,
    pub image_urls: Option<Vec<String>>,
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    if let Some(ean) = &req.ean {
        validate_ean(ean)?;
    }
    if let Some(imei) = &req.imei {
        validate_imei(imei)?;
    }
    validate_price_cents("cost_cents", req.cost_cents)?;
    validate_price_cents("retail_price_cents", req.retail_price_cents)?;

    let model = state
        .db
        .models()
        .get_by_id(&state.company, &req.model_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Model", &req.model_id))?;

    let name = req.name.unwrap_or_else(|| match &req.storage {
        Some(storage) => format!("{} {}", model.name, storage),
        None => model.name.clone(),
    });
    validate_name("name", &name)?;

    // Template fill: model defaults under the product's own values.
    let own_specs = req.specs.unwrap_or_default();
    let merged = merge_template_specs(&own_specs, &model.template_map());
    let specs = serde_json::to_string(&merged)
        .map_err(|e| ApiError::validation(format!("bad specs: {e}")))?;

    let image_urls = serde_json::to_string(&req.image_urls.unwrap_or_default())
        .map_err(|e| ApiError::validation(format!("bad images: {e}")))?;

    let now = Utc::now();
    let product = Product {
        id: generate_id(),
        company_id: state.company.as_str().to_string(),
        brand_id: model.brand_id.clone(),
        model_id: model.id.clone(),
        name: name.trim().to_string(),
        ean: req.ean,
        imei: req.imei,
        serial_number: req.serial_number,
        color: req.color,
        storage: req.storage,
        condition: req.condition,
        cost_cents: req.cost_cents,
        retail_price_cents: req.retail_price_cents,
        reseller_price_cents: req.reseller_price_cents,
        wholesale_price_cents: req.wholesale_price_cents,
        specs,
        image_urls,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    state.db.products().insert(&product).await?;
    info!(product_id = %product.id, name = %product.name, "Product created");

    Ok(Json(to_response(&state, product).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: String,
    pub ean: Option<String>,
    pub imei: Option<String>,
    pub serial_number: Option<String>,
    pub color: Option<String>,
    pub storage: Option<String>,
    pub condition: Condition,
    pub cost_cents: i64,
    pub retail_price_cents: i64,
    pub reseller_price_cents: Option<i64>,
    pub wholesale_price_cents: Option<i64>,
    pub specs: Option<HashMap<String, String>>,
    pub image_urls: Option<Vec<String>>,
    pub is_active: bool,
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    validate_name("name", &req.name)?;
    if let Some(ean) = &req.ean {
        validate_ean(ean)?;
    }
    if let Some(imei) = &req.imei {
        validate_imei(imei)?;
    }
    validate_price_cents("cost_cents", req.cost_cents)?;
    validate_price_cents("retail_price_cents", req.retail_price_cents)?;

    let mut product = state
        .db
        .products()
        .get_by_id(&state.company, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &id))?;

    product.name = req.name.trim().to_string();
    product.ean = req.ean;
    product.imei = req.imei;
    product.serial_number = req.serial_number;
    product.color = req.color;
    product.storage = req.storage;
    product.condition = req.condition;
    product.cost_cents = req.cost_cents;
    product.retail_price_cents = req.retail_price_cents;
    product.reseller_price_cents = req.reseller_price_cents;
    product.wholesale_price_cents = req.wholesale_price_cents;
    if let Some(specs) = req.specs {
        product.specs = serde_json::to_string(&specs)
            .map_err(|e| ApiError::validation(format!("bad specs: {e}")))?;
    }
    if let Some(images) = req.image_urls {
        product.image_urls = serde_json::to_string(&images)
            .map_err(|e| ApiError::validation(format!("bad images: {e}")))?;
    }
    product.is_active = req.is_active;

    state.db.products().update(&product).await?;
    Ok(Json(to_response(&state, product).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.db.products().soft_delete(&state.company, &id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
