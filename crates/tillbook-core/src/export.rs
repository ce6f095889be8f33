//! # Export
//!
//! Catalog and ledger export to comma-separated text.
//!
//! ## Ledger Columns
//! ```text
//! ┌──────────────────┬──────────────────────────────────────────────────────┐
//! │ ID               │ transaction id                                       │
//! │ Date             │ RFC 3339, UTC                                        │
//! │ Subtotal         │ 2 decimals                                           │
//! │ Discount Applied │ 2 decimals, the amount taken off                     │
//! │ Discount Type    │ "10%" or "5.00", as entered                          │
//! │ Discount Value   │ the entered value, 2 decimals                        │
//! │ Total Taxes      │ 2 decimals                                           │
//! │ Total            │ 2 decimals                                           │
//! │ Items            │ Coffee (x2, 4.50 unit., Total Item: 9.00); ...       │
//! │ Taxes            │ Service (10%); Bag fee (0.50)                        │
//! └──────────────────┴──────────────────────────────────────────────────────┘
//! ```
//!
//! The `csv` crate handles quoting, so names containing commas or quotes
//! survive a round trip through [`parse_ledger_csv`].

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use std::io;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CartLine, FixedTax, Product, Transaction};

/// Header row of the catalog export.
pub const CATALOG_HEADER: [&str; 4] = ["ID", "Name", "Stock", "Price"];

/// Header row of the ledger export.
pub const LEDGER_HEADER: [&str; 10] = [
    "ID",
    "Date",
    "Subtotal",
    "Discount Applied",
    "Discount Type",
    "Discount Value",
    "Total Taxes",
    "Total",
    "Items",
    "Taxes",
];

// =============================================================================
// Writers
// =============================================================================

/// Renders products as CSV. An empty slice yields the header only.
pub fn catalog_to_csv(products: &[Product]) -> CoreResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CATALOG_HEADER)?;

    for product in products {
        writer.write_record([
            product.id.clone(),
            product.name.clone(),
            product.stock.to_string(),
            product.price.to_string(),
        ])?;
    }

    finish(writer)
}

/// Renders transactions as CSV. An empty slice yields the header only.
pub fn ledger_to_csv<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> CoreResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(LEDGER_HEADER)?;

    for t in transactions {
        writer.write_record([
            t.id.clone(),
            t.date.to_rfc3339_opts(SecondsFormat::Millis, true),
            t.subtotal.to_string(),
            t.applied_discount_value.to_string(),
            t.discount.kind.describe(t.discount.value),
            Money::new(t.discount.value).to_string(),
            t.total_tax_amount.to_string(),
            t.total.to_string(),
            describe_items(&t.items),
            describe_taxes(&t.applied_fixed_taxes),
        ])?;
    }

    finish(writer)
}

/// `Coffee (x2, 4.50 unit., Total Item: 9.00); Tea (x1, ...)`
pub fn describe_items(items: &[CartLine]) -> String {
    items
        .iter()
        .map(|item| {
            format!(
                "{} (x{}, {} unit., Total Item: {})",
                item.name,
                item.quantity,
                item.price,
                item.line_total()
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// `Service (10%); Bag fee (0.50)`
pub fn describe_taxes(taxes: &[FixedTax]) -> String {
    taxes
        .iter()
        .map(|tax| format!("{} ({})", tax.name, tax.kind.describe(tax.value)))
        .collect::<Vec<_>>()
        .join("; ")
}

fn finish(writer: csv::Writer<Vec<u8>>) -> CoreResult<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, e)).into())
}

// =============================================================================
// Reader
// =============================================================================

/// One row of a ledger export, read back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRow {
    pub id: String,
    pub date: DateTime<Utc>,
    pub subtotal: Money,
    pub applied_discount_value: Money,
    pub total_tax_amount: Money,
    pub total: Money,
}

#[derive(Debug, Deserialize)]
struct RawLedgerRow {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Subtotal")]
    subtotal: String,
    #[serde(rename = "Discount Applied")]
    discount_applied: String,
    #[serde(rename = "Total Taxes")]
    total_taxes: String,
    #[serde(rename = "Total")]
    total: String,
}

/// Reads a ledger export back into rows.
///
/// Columns are matched by header name; the descriptive columns are ignored.
pub fn parse_ledger_csv(text: &str) -> CoreResult<Vec<LedgerRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let raw: RawLedgerRow = record?;
        rows.push(LedgerRow {
            date: parse_date(&raw.date)?,
            subtotal: parse_money("Subtotal", &raw.subtotal)?,
            applied_discount_value: parse_money("Discount Applied", &raw.discount_applied)?,
            total_tax_amount: parse_money("Total Taxes", &raw.total_taxes)?,
            total: parse_money("Total", &raw.total)?,
            id: raw.id,
        });
    }
    Ok(rows)
}

fn parse_money(field: &str, text: &str) -> Result<Money, ValidationError> {
    text.parse().map_err(|_| ValidationError::InvalidNumber {
        field: field.to_string(),
        value: text.to_string(),
    })
}

fn parse_date(text: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(text)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| ValidationError::InvalidFormat {
            field: "Date".to_string(),
            reason: e.to_string(),
        })
}

// =============================================================================
// Unit Tests
// =============================================================================
