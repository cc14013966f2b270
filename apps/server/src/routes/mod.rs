//! # Routes
//!
//! The full API surface of the console and the POS.

pub mod catalog;
pub mod checkout;
pub mod customers;
pub mod export;
pub mod fees;
pub mod products;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // Catalog: brands and models
        .route(
            "/api/brands",
            get(catalog::list_brands).post(catalog::create_brand),
        )
        .route(
            "/api/brands/{id}",
            put(catalog::update_brand).delete(catalog::delete_brand),
        )
        .route(
            "/api/models",
            get(catalog::list_models).post(catalog::create_model),
        )
        .route(
            "/api/models/{id}",
            put(catalog::update_model).delete(catalog::delete_model),
        )
        .route(
            "/api/models/{id}/images/{color}",
            get(catalog::get_model_images).put(catalog::put_model_images),
        )
        // Products
        .route(
            "/api/products",
            get(products::list).post(products::create),
        )
        .route("/api/products/lookup", get(products::lookup))
        .route(
            "/api/products/{id}",
            get(products::get).put(products::update).delete(products::delete),
        )
        .route("/api/storages", get(products::storages))
        // Customers
        .route(
            "/api/customers",
            get(customers::search).post(customers::create),
        )
        .route("/api/customers/{id}", put(customers::update))
        // Fee settings
        .route("/api/fees", get(fees::list).put(fees::upsert))
        .route(
            "/api/fees/{method}/{installments}",
            delete(fees::delete),
        )
        // POS
        .route("/api/pos/installments", get(checkout::installment_options))
        .route("/api/pos/quote", post(checkout::quote))
        .route("/api/pos/checkout", post(checkout::checkout))
        .route("/api/sales", get(checkout::list_sales))
        .route("/api/sales/{id}", get(checkout::get_sale))
        .route("/api/sales/{id}/receipt", get(checkout::receipt))
        .route("/api/sales/{id}/payments", post(checkout::add_payment))
        .route("/api/sales/{id}/void", post(checkout::void_sale))
        // Catalog export
        .route("/api/export/whatsapp", get(export::whatsapp))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
