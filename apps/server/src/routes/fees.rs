//! # Fee Settings Handlers
//!
//! The payment fee table editor. The `applied >= operator` invariant is
//! enforced by the repository on every write, so this layer only parses
//! and forwards.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use vitrine_core::{PaymentFee, PaymentMethod};

use crate::error::ApiError;
use crate::state::AppState;

/// A fee row plus the derived store margin, for the settings screen.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRow {
    #[serde(flatten)]
    pub fee: PaymentFee,
    pub margin_bps: i64,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<FeeRow>>, ApiError> {
    let fees = state.db.fees().list(&state.company).await?;
    let rows = fees
        .into_iter()
        .map(|fee| FeeRow {
            margin_bps: fee.margin_bps(),
            fee,
        })
        .collect();
    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertFeeRequest {
    pub method: PaymentMethod,
    pub installments: i64,
    pub operator_fee_bps: i64,
    pub applied_fee_bps: i64,
}

pub async fn upsert(
    State(state): State<AppState>,
    Json(req): Json<UpsertFeeRequest>,
) -> Result<Json<FeeRow>, ApiError> {
    let fee = state
        .db
        .fees()
        .upsert(
            &state.company,
            req.method,
            req.installments,
            req.operator_fee_bps,
            req.applied_fee_bps,
        )
        .await?;

    info!(
        method = fee.method.label(),
        installments = fee.installments,
        "Fee row saved"
    );

    Ok(Json(FeeRow {
        margin_bps: fee.margin_bps(),
        fee,
    }))
}

/// Parses the method path segment ("money", "pix", "debit", "credit").
pub(crate) fn parse_method(s: &str) -> Result<PaymentMethod, ApiError> {
    match s {
        "money" => Ok(PaymentMethod::Money),
        "pix" => Ok(PaymentMethod::Pix),
        "debit" => Ok(PaymentMethod::Debit),
        "credit" => Ok(PaymentMethod::Credit),
        other => Err(ApiError::validation(format!(
            "unknown payment method: {other}"
        ))),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    Path((method, installments)): Path<(String, i64)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let method = parse_method(&method)?;
    state
        .db
        .fees()
        .delete(&state.company, method, installments)
        .await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
