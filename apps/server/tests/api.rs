//! End-to-end API tests against an in-memory database: catalog setup
//! through the HTTP surface, then a full checkout.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use vitrine_db::{Database, DbConfig};
use vitrine_server::config::ServerConfig;
use vitrine_server::routes;
use vitrine_server::state::AppState;

async fn test_app() -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let company = db
        .companies()
        .ensure("loja-central", "Loja Central")
        .await
        .unwrap();

    let config = ServerConfig {
        port: 0,
        database_path: ":memory:".to_string(),
        company_slug: "loja-central".to_string(),
        store_name: "Loja Central".to_string(),
        delivery_cost_cents: 1500,
    };

    routes::router(AppState::new(db, company.company_id(), config))
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn put(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn text_body(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Creates brand -> model -> product through the API; returns product id.
async fn seed_product(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(post("/api/brands", json!({ "name": "Apple" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let brand = json_body(response).await;

    let response = app
        .clone()
        .oneshot(post(
            "/api/models",
            json!({
                "brandId": brand["id"],
                "name": "iPhone 13",
                "templateSpecs": { "screen": "6.1\"" }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let model = json_body(response).await;

    let response = app
        .clone()
        .oneshot(post(
            "/api/products",
            json!({
                "modelId": model["id"],
                "storage": "128GB",
                "condition": "used",
                "costCents": 6_000,
                "retailPriceCents": 10_000,
                "ean": "7891234567895"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let product = json_body(response).await;

    // name defaulted from model + storage; template filled the specs
    assert_eq!(product["name"], "iPhone 13 128GB");
    let specs: Value = serde_json::from_str(product["specs"].as_str().unwrap()).unwrap();
    assert_eq!(specs["screen"], "6.1\"");

    product["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_ok() {
    let app = test_app().await;
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn product_lookup_by_ean() {
    let app = test_app().await;
    let id = seed_product(&app).await;

    let response = app
        .clone()
        .oneshot(get("/api/products/lookup?ean=7891234567895"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["id"], Value::String(id));

    let response = app
        .oneshot(get("/api/products/lookup?ean=0000000000000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn checkout_pix_exact_payment() {
    let app = test_app().await;
    let product_id = seed_product(&app).await;

    let response = app
        .clone()
        .oneshot(post(
            "/api/pos/checkout",
            json!({
                "lines": [{ "productId": product_id, "quantity": 2 }],
                "payments": [{ "method": "pix", "amountCents": 20_000 }],
                "deliveryMode": "pickup"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    assert_eq!(body["totals"]["subtotalCents"], 20_000);
    assert_eq!(body["totals"]["totalCents"], 20_000);
    assert_eq!(body["reconciliation"]["changeCents"], 0);
    assert_eq!(body["reconciliation"]["isComplete"], true);

    // the receipt renders from the persisted rows
    let sale_id = body["saleId"].as_str().unwrap();
    let response = app
        .oneshot(get(&format!("/api/sales/{}/receipt", sale_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let receipt = text_body(response).await;
    assert!(receipt.contains("LOJA CENTRAL"));
    assert!(receipt.contains("TOTAL"));
    assert!(receipt.contains("R$ 200,00"));
}

#[tokio::test]
async fn checkout_credit_applies_configured_fee() {
    let app = test_app().await;
    let product_id = seed_product(&app).await;

    // configure 3x credit at 6% applied (4.5% operator)
    let response = app
        .clone()
        .oneshot(put(
            "/api/fees",
            json!({
                "method": "credit",
                "installments": 3,
                "operatorFeeBps": 450,
                "appliedFeeBps": 600
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post(
            "/api/pos/quote",
            json!({
                "lines": [{ "productId": product_id, "quantity": 2 }],
                "payments": [{ "method": "credit", "amountCents": 20_000, "installments": 3 }]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    assert_eq!(body["payments"][0]["feeCents"], 1_200);
    assert_eq!(body["payments"][0]["totalWithFeeCents"], 21_200);
    assert_eq!(body["payments"][0]["monthlyCents"], 7_067);
    // fee is owed on top of the sale total, so exact payment still closes
    assert_eq!(body["totalDueCents"], 21_200);
    assert_eq!(body["reconciliation"]["isComplete"], true);
    assert_eq!(body["reconciliation"]["changeCents"], 0);
}

#[tokio::test]
async fn installment_options_follow_fee_table() {
    let app = test_app().await;

    for (installments, applied) in [(3, 600), (6, 800)] {
        let response = app
            .clone()
            .oneshot(put(
                "/api/fees",
                json!({
                    "method": "credit",
                    "installments": installments,
                    "operatorFeeBps": 450,
                    "appliedFeeBps": applied
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(get("/api/pos/installments?amountCents=100000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    let options = body.as_array().unwrap();
    assert_eq!(options.len(), 2);
    assert_eq!(options[0]["installments"], 3);
    assert_eq!(options[0]["feeCents"], 6_000);
    assert_eq!(options[1]["installments"], 6);
    assert_eq!(options[1]["totalWithFeeCents"], 108_000);
}

#[tokio::test]
async fn fee_below_operator_cost_rejected() {
    let app = test_app().await;

    let response = app
        .oneshot(put(
            "/api/fees",
            json!({
                "method": "credit",
                "installments": 3,
                "operatorFeeBps": 450,
                "appliedFeeBps": 200
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn whatsapp_catalog_lists_products() {
    let app = test_app().await;
    seed_product(&app).await;

    let response = app.oneshot(get("/api/export/whatsapp")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = text_body(response).await;

    assert!(text.contains("*Loja Central*"));
    assert!(text.contains("*Apple*"));
    assert!(text.contains("iPhone 13 128GB"));
    assert!(text.contains("R$ 100,00"));
}

#[tokio::test]
async fn checkout_with_empty_cart_rejected() {
    let app = test_app().await;

    let response = app
        .oneshot(post(
            "/api/pos/checkout",
            json!({ "lines": [], "payments": [] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
