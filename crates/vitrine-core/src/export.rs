//! # Text Export
//!
//! Plain-text renderings shared with customers: the WhatsApp catalog and
//! the printable receipt.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::checkout::reconcile;
use crate::money::format_brl;
use crate::types::{Condition, Sale, SaleItem, SalePayment};

// =============================================================================
// WhatsApp catalog
// =============================================================================

/// A catalog line ready for formatting. Built by the caller from active
/// products joined with their brand names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub brand_name: String,
    pub product_name: String,
    pub storage: Option<String>,
    pub condition: Condition,
    pub price_cents: i64,
}

/// Renders the shareable WhatsApp catalog: products grouped by brand, one
/// line per product, WhatsApp `*bold*` markup.
///
/// ```text
/// *Loja Central* — catálogo 05/08/2026
///
/// *Apple*
/// • iPhone 13 128GB (seminovo) — R$ 3.200,00
/// ```
pub fn whatsapp_catalog(
    store_name: &str,
    generated_at: DateTime<Utc>,
    entries: &[CatalogEntry],
) -> String {
    // BTreeMap keeps brands in alphabetical order.
    let mut by_brand: BTreeMap<&str, Vec<&CatalogEntry>> = BTreeMap::new();
    for entry in entries {
        by_brand.entry(&entry.brand_name).or_default().push(entry);
    }

    let mut out = String::new();
    out.push_str(&format!(
        "*{}* — catálogo {}\n",
        store_name,
        generated_at.format("%d/%m/%Y")
    ));

    for (brand, products) in &by_brand {
        out.push('\n');
        out.push_str(&format!("*{}*\n", brand));
        for p in products {
            let storage = p
                .storage
                .as_deref()
                .map(|s| format!(" {}", s))
                .unwrap_or_default();
            out.push_str(&format!(
                "• {}{} ({}) — {}\n",
                p.product_name,
                storage,
                p.condition.label(),
                format_brl(p.price_cents)
            ));
        }
    }

    out.push_str("\nChame no WhatsApp para reservar o seu!\n");
    out
}

// =============================================================================
// Receipt
// =============================================================================

const RECEIPT_WIDTH: usize = 40;

fn receipt_row(label: &str, value: &str) -> String {
    let pad = RECEIPT_WIDTH.saturating_sub(label.chars().count() + value.chars().count());
    format!("{}{}{}\n", label, " ".repeat(pad), value)
}

/// Renders a printable plain-text receipt for a persisted sale.
///
/// All figures come straight from the persisted rows, which in turn came
/// from the checkout engine; nothing is recomputed here except the change,
/// derived from the same reconciliation the checkout used.
pub fn render_receipt(
    store_name: &str,
    sale: &Sale,
    items: &[SaleItem],
    payments: &[SalePayment],
) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", store_name.to_uppercase()));
    out.push_str(&format!("Recibo {}\n", sale.receipt_number));
    out.push_str(&format!("{}\n", sale.created_at.format("%d/%m/%Y %H:%M")));
    out.push_str(&format!("{}\n", "-".repeat(RECEIPT_WIDTH)));

    for item in items {
        let name = if item.is_gift {
            format!("{} (brinde)", item.name_snapshot)
        } else {
            item.name_snapshot.clone()
        };
        out.push_str(&receipt_row(
            &format!("{}x {}", item.quantity, name),
            &format_brl(item.line_total_cents),
        ));
        if !item.is_gift && item.discount_cents > 0 {
            out.push_str(&receipt_row(
                "   desconto",
                &format!("-{}", format_brl(item.discount_cents * item.quantity)),
            ));
        }
    }

    out.push_str(&format!("{}\n", "-".repeat(RECEIPT_WIDTH)));
    out.push_str(&receipt_row("Subtotal", &format_brl(sale.subtotal_cents)));
    if sale.discount_cents > 0 {
        out.push_str(&receipt_row(
            "Descontos",
            &format!("-{}", format_brl(sale.discount_cents)),
        ));
    }
    if sale.delivery_customer_cents > 0 {
        out.push_str(&receipt_row(
            "Entrega",
            &format_brl(sale.delivery_customer_cents),
        ));
    }
    out.push_str(&receipt_row("TOTAL", &format_brl(sale.total_cents)));

    if !payments.is_empty() {
        out.push('\n');
        out.push_str("Pagamentos:\n");
        for p in payments {
            let label = match p.installments {
                Some(n) if n > 1 => format!("  {} {}x", p.method.label(), n),
                _ => format!("  {}", p.method.label()),
            };
            out.push_str(&receipt_row(&label, &format_brl(p.settled_cents())));
        }

        // Surcharges are owed on top of the sale total, so the change is
        // measured against total + fees.
        let fees: i64 = payments.iter().filter_map(|p| p.fee_cents).sum();
        if fees > 0 {
            out.push_str(&receipt_row("Taxa parcelamento", &format_brl(fees)));
        }
        let rec = reconcile(
            sale.total_cents + fees,
            payments.iter().map(|p| p.settled_cents()),
        );
        if rec.change_cents > 0 {
            out.push_str(&receipt_row("Troco", &format_brl(rec.change_cents)));
        }
    }

    out.push_str(&format!("{}\n", "-".repeat(RECEIPT_WIDTH)));
    out.push_str("Obrigado pela preferência!\n");
    out
}

// =============================================================================
// Unit Tests
// =============================================================================
