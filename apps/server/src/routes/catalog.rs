//! # Catalog Handlers
//!
//! Brand and model editors, plus the shared (model, color) image sets.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::info;

use vitrine_core::validation::{slugify, validate_name, validate_slug};
use vitrine_core::{Brand, ModelColorImages, PhoneModel};
use vitrine_db::generate_id;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Brands
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct BrandListQuery {
    /// Include inactive (soft-deleted) brands.
    pub all: Option<bool>,
}

pub async fn list_brands(
    State(state): State<AppState>,
    Query(query): Query<BrandListQuery>,
) -> Result<Json<Vec<Brand>>, ApiError> {
    let brands = state
        .db
        .brands()
        .list(&state.company, query.all.unwrap_or(false))
        .await?;
    Ok(Json(brands))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBrandRequest {
    pub name: String,
    /// Derived from the name when absent.
    pub slug: Option<String>,
}

pub async fn create_brand(
    State(state): State<AppState>,
    Json(req): Json<CreateBrandRequest>,
) -> Result<Json<Brand>, ApiError> {
    validate_name("name", &req.name)?;
    let slug = req.slug.unwrap_or_else(|| slugify(&req.name));
    validate_slug(&slug)?;

    let now = Utc::now();
    let brand = Brand {
        id: generate_id(),
        company_id: state.company.as_str().to_string(),
        name: req.name.trim().to_string(),
        slug,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    state.db.brands().insert(&brand).await?;
    info!(brand_id = %brand.id, name = %brand.name, "Brand created");

    Ok(Json(brand))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBrandRequest {
    pub name: String,
    pub slug: String,
    pub is_active: bool,
}

pub async fn update_brand(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateBrandRequest>,
) -> Result<Json<Brand>, ApiError> {
    validate_name("name", &req.name)?;
    validate_slug(&req.slug)?;

    let mut brand = state
        .db
        .brands()
        .get_by_id(&state.company, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Brand", &id))?;

    brand.name = req.name.trim().to_string();
    brand.slug = req.slug;
    brand.is_active = req.is_active;

    state.db.brands().update(&brand).await?;
    Ok(Json(brand))
}

pub async fn delete_brand(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.db.brands().soft_delete(&state.company, &id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

// =============================================================================
// Models
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelListQuery {
    pub brand_id: Option<String>,
}

pub async fn list_models(
    State(state): State<AppState>,
    Query(query): Query<ModelListQuery>,
) -> Result<Json<Vec<PhoneModel>>, ApiError> {
    let models = state
        .db
        .models()
        .list(&state.company, query.brand_id.as_deref())
        .await?;
    Ok(Json(models))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateModelRequest {
    pub brand_id: String,
    pub name: String,
    pub slug: Option<String>,
    /// Default field values copied onto new products of this model.
    pub template_specs: Option<HashMap<String, String>>,
}

pub async fn create_model(
    State(state): State<AppState>,
    Json(req): Json<CreateModelRequest>,
) -> Result<Json<PhoneModel>, ApiError> {
    validate_name("name", &req.name)?;
    let slug = req.slug.unwrap_or_else(|| slugify(&req.name));
    validate_slug(&slug)?;

    // the brand must exist and belong to this company
    state
        .db
        .brands()
        .get_by_id(&state.company, &req.brand_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Brand", &req.brand_id))?;

    let template = req.template_specs.unwrap_or_default();
    let template_specs = serde_json::to_string(&template)
        .map_err(|e| ApiError::validation(format!("bad template: {e}")))?;

    let now = Utc::now();
    let model = PhoneModel {
        id: generate_id(),
        company_id: state.company.as_str().to_string(),
        brand_id: req.brand_id,
        name: req.name.trim().to_string(),
        slug,
        template_specs,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    state.db.models().insert(&model).await?;
    info!(model_id = %model.id, name = %model.name, "Model created");

    Ok(Json(model))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateModelRequest {
    pub brand_id: String,
    pub name: String,
    pub slug: String,
    pub template_specs: Option<HashMap<String, String>>,
    pub is_active: bool,
}

pub async fn update_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateModelRequest>,
) -> Result<Json<PhoneModel>, ApiError> {
    validate_name("name", &req.name)?;
    validate_slug(&req.slug)?;

    let mut model = state
        .db
        .models()
        .get_by_id(&state.company, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Model", &id))?;

    model.brand_id = req.brand_id;
    model.name = req.name.trim().to_string();
    model.slug = req.slug;
    model.is_active = req.is_active;
    if let Some(template) = req.template_specs {
        model.template_specs = serde_json::to_string(&template)
            .map_err(|e| ApiError::validation(format!("bad template: {e}")))?;
    }

    state.db.models().update(&model).await?;
    Ok(Json(model))
}

pub async fn delete_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.db.models().soft_delete(&state.company, &id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

// =============================================================================
// Shared image sets
// =============================================================================

pub async fn get_model_images(
    State(state): State<AppState>,
    Path((id, color)): Path<(String, String)>,
) -> Result<Json<ModelColorImages>, ApiError> {
    let images = state
        .db
        .models()
        .get_color_images(&state.company, &id, &color)
        .await?
        .ok_or_else(|| ApiError::not_found("Images", &format!("{}/{}", id, color)))?;
    Ok(Json(images))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutModelImagesRequest {
    pub image_urls: Vec<String>,
}

pub async fn put_model_images(
    State(state): State<AppState>,
    Path((id, color)): Path<(String, String)>,
    Json(req): Json<PutModelImagesRequest>,
) -> Result<Json<ModelColorImages>, ApiError> {
    state
        .db
        .models()
        .get_by_id(&state.company, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Model", &id))?;

    let images = state
        .db
        .models()
        .upsert_color_images(&state.company, &id, &color, &req.image_urls)
        .await?;
    Ok(Json(images))
}
