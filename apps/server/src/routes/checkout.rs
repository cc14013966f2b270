//! # POS Handlers
//!
//! The checkout flow: quote a cart, persist a sale, record payments,
//! render the receipt, void.
//!
//! The server recomputes every figure through the checkout engine; prices
//! and totals sent by the client are never trusted. The engine is the same
//! one the quote endpoint and the receipt renderer use, so the numbers a
//! cashier sees before, during, and after checkout always agree.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use vitrine_core::validation::{validate_payment_amount, validate_price_cents, validate_quantity};
use vitrine_core::{
    reconcile, CoreError, DeliveryCredit, DeliveryMode, FeeTable, Money, PaymentMethod,
    Reconciliation, Sale, SaleItem, SaleLine, SalePayment, SaleStatus, SaleTotals,
};
use vitrine_db::{generate_id, generate_receipt_number};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request / response DTOs
// =============================================================================

/// Which pricing tier the cashier sold at. Falls back to retail when the
/// product has no price for the requested tier.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTier {
    Retail,
    Reseller,
    Wholesale,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineRequest {
    pub product_id: String,
    pub quantity: i64,
    /// Per-unit discount in centavos.
    pub discount_cents: Option<i64>,
    pub is_gift: Option<bool>,
    pub price_tier: Option<PriceTier>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub method: PaymentMethod,
    pub amount_cents: i64,
    pub installments: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub customer_id: Option<String>,
    pub delivery_mode: Option<DeliveryMode>,
    /// Overrides the configured delivery cost for this sale.
    pub delivery_cost_cents: Option<i64>,
    #[serde(default)]
    pub lines: Vec<CartLineRequest>,
    #[serde(default)]
    pub payments: Vec<PaymentRequest>,
    pub notes: Option<String>,
}

/// A payment priced by the fee table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotedPayment {
    pub method: PaymentMethod,
    pub amount_cents: i64,
    pub installments: Option<i64>,
    pub applied_fee_bps: Option<i64>,
    pub fee_cents: Option<i64>,
    pub total_with_fee_cents: Option<i64>,
    pub monthly_cents: Option<i64>,
}

impl QuotedPayment {
    fn settled_cents(&self) -> i64 {
        self.total_with_fee_cents.unwrap_or(self.amount_cents)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub totals: SaleTotals,
    pub payments: Vec<QuotedPayment>,
    /// Sale total plus payment surcharges; what the payments must cover.
    pub total_due_cents: i64,
    pub reconciliation: Reconciliation,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub sale_id: String,
    pub receipt_number: String,
    pub totals: SaleTotals,
    pub total_due_cents: i64,
    pub reconciliation: Reconciliation,
}

// =============================================================================
// Cart assembly
// =============================================================================

/// Builds priced sale lines from the cart payload, snapshotting name,
/// price, and cost from the catalog.
async fn build_lines(
    state: &AppState,
    lines: &[CartLineRequest],
) -> Result<Vec<SaleLine>, ApiError> {
    let mut out = Vec::with_capacity(lines.len());

    for line in lines {
        validate_quantity(line.quantity)?;
        let discount = line.discount_cents.unwrap_or(0);
        validate_price_cents("discount_cents", discount)?;

        let product = state
            .db
            .products()
            .get_by_id(&state.company, &line.product_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Product", &line.product_id))?;

        if !product.is_active {
            return Err(ApiError::business(format!(
                "Product {} is no longer for sale",
                product.name
            )));
        }

        let unit_price = match line.price_tier.unwrap_or(PriceTier::Retail) {
            PriceTier::Retail => product.retail_price_cents,
            PriceTier::Reseller => product
                .reseller_price_cents
                .unwrap_or(product.retail_price_cents),
            PriceTier::Wholesale => product
                .wholesale_price_cents
                .unwrap_or(product.retail_price_cents),
        };

        out.push(SaleLine {
            product_id: product.id,
            name: product.name,
            quantity: line.quantity,
            unit_price_cents: unit_price,
            unit_cost_cents: product.cost_cents,
            discount_cents: discount,
            is_gift: line.is_gift.unwrap_or(false),
        });
    }

    Ok(out)
}

/// Prices the payments against the fee table. Card methods get a fee
/// quote; cash and PIX settle at face value.
fn price_payments(
    table: &FeeTable,
    payments: &[PaymentRequest],
) -> Result<Vec<QuotedPayment>, ApiError> {
    let mut out = Vec::with_capacity(payments.len());

    for payment in payments {
        validate_payment_amount(payment.amount_cents)?;

        let quoted = match payment.method {
            PaymentMethod::Debit | PaymentMethod::Credit => {
                let installments = payment.installments.unwrap_or(1);
                let quote = table.quote(
                    Money::from_cents(payment.amount_cents),
                    payment.method,
                    installments,
                );
                QuotedPayment {
                    method: payment.method,
                    amount_cents: payment.amount_cents,
                    installments: Some(quote.installments),
                    applied_fee_bps: Some(quote.applied_fee_bps),
                    fee_cents: Some(quote.fee_cents),
                    total_with_fee_cents: Some(quote.total_with_fee_cents),
                    monthly_cents: Some(quote.monthly_cents),
                }
            }
            PaymentMethod::Money | PaymentMethod::Pix => QuotedPayment {
                method: payment.method,
                amount_cents: payment.amount_cents,
                installments: None,
                applied_fee_bps: None,
                fee_cents: None,
                total_with_fee_cents: None,
                monthly_cents: None,
            },
        };

        out.push(quoted);
    }

    Ok(out)
}

fn reconcile_quote(totals: &SaleTotals, payments: &[QuotedPayment]) -> (i64, Reconciliation) {
    // Surcharges are owed on top of the sale total.
    let fees: i64 = payments.iter().filter_map(|p| p.fee_cents).sum();
    let total_due = totals.total_cents + fees;
    let rec = reconcile(total_due, payments.iter().map(QuotedPayment::settled_cents));
    (total_due, rec)
}

// =============================================================================
// Installment options
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentOptionsQuery {
    pub amount_cents: i64,
    pub method: Option<PaymentMethod>,
}

/// Prices a balance across every configured installment count for a
/// method (credit by default). Drives the installment picker on the
/// payment screen.
pub async fn installment_options(
    State(state): State<AppState>,
    Query(query): Query<InstallmentOptionsQuery>,
) -> Result<Json<Vec<vitrine_core::InstallmentQuote>>, ApiError> {
    validate_payment_amount(query.amount_cents)?;

    let table = state.db.fees().load_table(&state.company).await?;
    let options = table.installment_options(
        Money::from_cents(query.amount_cents),
        query.method.unwrap_or(PaymentMethod::Credit),
    );

    Ok(Json(options))
}

// =============================================================================
// Quote
// =============================================================================

/// Prices a cart without persisting anything. Drives the checkout screen:
/// totals, per-payment fees, change/remaining.
pub async fn quote(
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let lines = build_lines(&state, &req.lines).await?;

    let mode = req.delivery_mode.unwrap_or_default();
    let split = mode.split(
        req.delivery_cost_cents
            .unwrap_or(state.config.delivery_cost_cents),
    );
    let totals = SaleTotals::compute(&lines, split);

    let table = state.db.fees().load_table(&state.company).await?;
    let payments = price_payments(&table, &req.payments)?;
    let (total_due, reconciliation) = reconcile_quote(&totals, &payments);

    Ok(Json(QuoteResponse {
        totals,
        payments,
        total_due_cents: total_due,
        reconciliation,
    }))
}

// =============================================================================
// Checkout
// =============================================================================

/// Persists a sale: recomputes everything server-side, then writes sale,
/// items, payments, and delivery credit in one transaction.
pub async fn checkout(
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    if req.lines.is_empty() {
        return Err(CoreError::EmptySale.into());
    }

    if let Some(customer_id) = &req.customer_id {
        state
            .db
            .customers()
            .get_by_id(&state.company, customer_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Customer", customer_id))?;
    }

    let lines = build_lines(&state, &req.lines).await?;

    let mode = req.delivery_mode.unwrap_or_default();
    let split = mode.split(
        req.delivery_cost_cents
            .unwrap_or(state.config.delivery_cost_cents),
    );
    let totals = SaleTotals::compute(&lines, split);

    let table = state.db.fees().load_table(&state.company).await?;
    let payments = price_payments(&table, &req.payments)?;
    let (total_due, reconciliation) = reconcile_quote(&totals, &payments);

    if !reconciliation.is_complete {
        warn!(
            remaining = reconciliation.remaining_cents,
            "Checkout with outstanding balance"
        );
    }

    let now = Utc::now();
    let sale_id = generate_id();

    let sale = Sale {
        id: sale_id.clone(),
        company_id: state.company.as_str().to_string(),
        receipt_number: generate_receipt_number(),
        customer_id: req.customer_id,
        status: SaleStatus::Completed,
        delivery_mode: mode,
        subtotal_cents: totals.subtotal_cents,
        discount_cents: totals.discount_cents,
        delivery_store_cents: totals.delivery_store_cents,
        delivery_customer_cents: totals.delivery_customer_cents,
        total_cents: totals.total_cents,
        cost_cents: totals.cost_cents,
        profit_cents: totals.profit_cents,
        notes: req.notes,
        created_at: now,
        updated_at: now,
        voided_at: None,
    };

    let items: Vec<SaleItem> = lines
        .iter()
        .map(|line| SaleItem {
            id: generate_id(),
            sale_id: sale_id.clone(),
            product_id: line.product_id.clone(),
            name_snapshot: line.name.clone(),
            quantity: line.quantity,
            unit_price_cents: line.unit_price_cents,
            unit_cost_cents: line.unit_cost_cents,
            discount_cents: line.discount_cents,
            is_gift: line.is_gift,
            line_total_cents: line.line_total_cents(),
            created_at: now,
        })
        .collect();

    let payment_rows: Vec<SalePayment> = payments
        .iter()
        .map(|p| SalePayment {
            id: generate_id(),
            sale_id: sale_id.clone(),
            method: p.method,
            amount_cents: p.amount_cents,
            installments: p.installments,
            applied_fee_bps: p.applied_fee_bps,
            fee_cents: p.fee_cents,
            total_with_fee_cents: p.total_with_fee_cents,
            created_at: now,
        })
        .collect();

    let delivery_credit = (split.total() > 0).then(|| DeliveryCredit {
        id: generate_id(),
        company_id: state.company.as_str().to_string(),
        sale_id: sale_id.clone(),
        mode,
        store_cents: split.store_cents,
        customer_cents: split.customer_cents,
        created_at: now,
    });

    state
        .db
        .sales()
        .insert_checkout(&sale, &items, &payment_rows, delivery_credit.as_ref())
        .await?;

    info!(
        sale_id = %sale_id,
        receipt_number = %sale.receipt_number,
        total = totals.total_cents,
        "Sale completed"
    );

    Ok(Json(CheckoutResponse {
        sale_id,
        receipt_number: sale.receipt_number,
        totals,
        total_due_cents: total_due,
        reconciliation,
    }))
}

// =============================================================================
// Sales listing / detail / receipt
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SalesListQuery {
    pub limit: Option<u32>,
}

pub async fn list_sales(
    State(state): State<AppState>,
    Query(query): Query<SalesListQuery>,
) -> Result<Json<Vec<Sale>>, ApiError> {
    let limit = query.limit.unwrap_or(50).min(200);
    let sales = state.db.sales().list_recent(&state.company, limit).await?;
    Ok(Json(sales))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetailResponse {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    pub payments: Vec<SalePayment>,
    pub delivery_credit: Option<DeliveryCredit>,
    pub reconciliation: Reconciliation,
}

async fn load_sale(state: &AppState, id: &str) -> Result<SaleDetailResponse, ApiError> {
    let sale = state
        .db
        .sales()
        .get_by_id(&state.company, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", id))?;

    let items = state.db.sales().get_items(id).await?;
    let payments = state.db.sales().get_payments(id).await?;
    let delivery_credit = state.db.sales().get_delivery_credit(id).await?;

    let fees: i64 = payments.iter().filter_map(|p| p.fee_cents).sum();
    let reconciliation = reconcile(
        sale.total_cents + fees,
        payments.iter().map(SalePayment::settled_cents),
    );

    Ok(SaleDetailResponse {
        sale,
        items,
        payments,
        delivery_credit,
        reconciliation,
    })
}

pub async fn get_sale(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SaleDetailResponse>, ApiError> {
    Ok(Json(load_sale(&state, &id).await?))
}

/// Plain-text receipt for printing or sharing.
pub async fn receipt(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<String, ApiError> {
    let detail = load_sale(&state, &id).await?;
    Ok(vitrine_core::export::render_receipt(
        &state.config.store_name,
        &detail.sale,
        &detail.items,
        &detail.payments,
    ))
}

// =============================================================================
// Payments after checkout / void
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPaymentResponse {
    pub payment_id: String,
    pub amount_cents: i64,
    pub total_paid_cents: i64,
    pub remaining_cents: i64,
    pub change_cents: i64,
}

/// Records a payment towards the outstanding balance of a sale.
pub async fn add_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<PaymentRequest>,
) -> Result<Json<AddPaymentResponse>, ApiError> {
    let sale = state
        .db
        .sales()
        .get_by_id(&state.company, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", &id))?;

    if sale.status != SaleStatus::Completed {
        return Err(CoreError::InvalidSaleStatus {
            sale_id: sale.id,
            current_status: "voided".to_string(),
        }
        .into());
    }

    let table = state.db.fees().load_table(&state.company).await?;
    let quoted = price_payments(&table, std::slice::from_ref(&req))?.remove(0);

    let payment = SalePayment {
        id: generate_id(),
        sale_id: sale.id.clone(),
        method: quoted.method,
        amount_cents: quoted.amount_cents,
        installments: quoted.installments,
        applied_fee_bps: quoted.applied_fee_bps,
        fee_cents: quoted.fee_cents,
        total_with_fee_cents: quoted.total_with_fee_cents,
        created_at: Utc::now(),
    };

    state.db.sales().add_payment(&payment).await?;

    let payments = state.db.sales().get_payments(&sale.id).await?;
    let fees: i64 = payments.iter().filter_map(|p| p.fee_cents).sum();
    let rec = reconcile(
        sale.total_cents + fees,
        payments.iter().map(SalePayment::settled_cents),
    );

    info!(
        sale_id = %sale.id,
        payment_id = %payment.id,
        amount = payment.amount_cents,
        remaining = rec.remaining_cents,
        "Payment added"
    );

    Ok(Json(AddPaymentResponse {
        payment_id: payment.id,
        amount_cents: payment.amount_cents,
        total_paid_cents: rec.paid_cents,
        remaining_cents: rec.remaining_cents,
        change_cents: rec.change_cents,
    }))
}

pub async fn void_sale(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.db.sales().void(&state.company, &id).await?;
    Ok(Json(serde_json::json!({ "status": "voided" })))
}
