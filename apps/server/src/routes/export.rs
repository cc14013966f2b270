//! # Catalog Export Handler
//!
//! The shareable WhatsApp catalog: active products grouped by brand,
//! rendered as plain text by vitrine-core.

use std::collections::HashMap;

use axum::extract::State;
use chrono::Utc;

use vitrine_core::export::{whatsapp_catalog, CatalogEntry};

use crate::error::ApiError;
use crate::state::AppState;

/// Text body for the WhatsApp catalog.
pub async fn whatsapp(State(state): State<AppState>) -> Result<String, ApiError> {
    let brands = state.db.brands().list(&state.company, false).await?;
    let brand_names: HashMap<String, String> = brands
        .into_iter()
        .map(|b| (b.id, b.name))
        .collect();

    let products = state.db.products().list_active(&state.company, 500).await?;

    let entries: Vec<CatalogEntry> = products
        .into_iter()
        .map(|p| CatalogEntry {
            brand_name: brand_names
                .get(&p.brand_id)
                .cloned()
                .unwrap_or_else(|| "Outros".to_string()),
            product_name: p.name,
            storage: p.storage,
            condition: p.condition,
            price_cents: p.retail_price_cents,
        })
        .collect();

    Ok(whatsapp_catalog(
        &state.config.store_name,
        Utc::now(),
        &entries,
    ))
}
