//! # Validation Module
//!
//! Form input parsing and validation for Tillbook.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI                                                           │
//! │  ├── Numeric keyboards, required markers                               │
//! │  └── Immediate user feedback                                           │
//! │           │  (raw text fields)                                          │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Text → typed values (i64, Money, Decimal, AdjustmentKind)         │
//! │  └── Range rules (bounded stock, price, tax value, discount)           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Collections (catalog, tax table)                             │
//! │  └── Identifier uniqueness                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed validation never changes state; the form keeps its input and the
//! user sees the message.
//!
//! ## Usage
//! ```rust
//! use tillbook_core::validation::ProductInput;
//!
//! let input = ProductInput::parse("Coffee", "12", "4.50").unwrap();
//! assert_eq!(input.stock, 12);
//!
//! assert!(ProductInput::parse("", "12", "4.50").is_err());
//! assert!(ProductInput::parse("Coffee", "twelve", "4.50").is_err());
//! ```

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::AdjustmentKind;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Limits
// =============================================================================

/// Largest price, flat tax or flat discount accepted from a form.
pub const MAX_AMOUNT: i64 = 1_000_000_000;

/// Largest stock count accepted from a form.
pub const MAX_STOCK: i64 = 1_000_000_000;

/// Largest quantity a single cart line may hold.
pub const MAX_QUANTITY: i64 = 1_000_000;

/// Largest percentage tax or discount.
pub const MAX_PERCENTAGE: i64 = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product or tax name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be at most 200 characters".to_string(),
        });
    }

    Ok(name.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Parses a stock count.
///
/// ## Rules
/// - Required
/// - Whole number
/// - Zero up to [`MAX_STOCK`]
pub fn parse_stock(text: &str) -> ValidationResult<i64> {
    let text = required("stock", text)?;

    let stock = text
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidNumber {
            field: "stock".to_string(),
            value: text.to_string(),
        })?;

    if stock < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "stock".to_string(),
        });
    }

    if stock > MAX_STOCK {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: MAX_STOCK,
        });
    }

    Ok(stock)
}

/// Parses a unit price.
///
/// ## Rules
/// - Required
/// - Decimal number
/// - Zero is allowed (free items), negative is not
/// - At most [`MAX_AMOUNT`]
///
/// ## Example
/// ```rust
/// use tillbook_core::validation::parse_price;
/// use tillbook_core::Money;
///
/// assert_eq!(parse_price("10.99").unwrap(), Money::from_cents(1099));
/// assert!(parse_price("0").is_ok());
/// assert!(parse_price("-1").is_err());
/// ```
pub fn parse_price(text: &str) -> ValidationResult<Money> {
    parse_bounded("price", text, MAX_AMOUNT).map(Money::new)
}

/// Parses the value of a fixed tax (an amount or a percentage).
pub fn parse_tax_value(text: &str, kind: AdjustmentKind) -> ValidationResult<Decimal> {
    parse_bounded("tax value", text, max_for(kind))
}

/// Parses the discount field.
///
/// ## Rules
/// - Empty text means "remove the discount" and yields `None`
/// - Otherwise a non-negative decimal, at most 100 for a percentage and
///   [`MAX_AMOUNT`] for a flat amount
pub fn parse_discount_value(
    text: &str,
    kind: AdjustmentKind,
) -> ValidationResult<Option<Decimal>> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    parse_bounded("discount", text, max_for(kind)).map(Some)
}

/// Parses an adjustment type picker value.
///
/// Accepts `amount`, `value` (older spelling), `percentage` and `%`.
pub fn parse_adjustment_kind(text: &str) -> ValidationResult<AdjustmentKind> {
    match text.trim().to_lowercase().as_str() {
        "amount" | "value" => Ok(AdjustmentKind::Amount),
        "percentage" | "percent" | "%" => Ok(AdjustmentKind::Percentage),
        other => Err(ValidationError::InvalidFormat {
            field: "type".to_string(),
            reason: format!("'{}' is not one of amount, percentage", other),
        }),
    }
}

/// Parses a month number (1-12) for the ledger filter.
///
/// Empty text means "all months" and yields `None`.
pub fn parse_month(text: &str) -> ValidationResult<Option<u32>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let month = text
        .parse::<u32>()
        .map_err(|_| ValidationError::InvalidNumber {
            field: "month".to_string(),
            value: text.to_string(),
        })?;

    if !(1..=12).contains(&month) {
        return Err(ValidationError::OutOfRange {
            field: "month".to_string(),
            min: 1,
            max: 12,
        });
    }

    Ok(Some(month))
}

fn required<'a>(field: &str, text: &'a str) -> ValidationResult<&'a str> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(text)
}

fn max_for(kind: AdjustmentKind) -> i64 {
    match kind {
        AdjustmentKind::Amount => MAX_AMOUNT,
        AdjustmentKind::Percentage => MAX_PERCENTAGE,
    }
}

fn parse_bounded(field: &str, text: &str, max: i64) -> ValidationResult<Decimal> {
    let text = required(field, text)?;

    let value = Decimal::from_str(text).map_err(|_| ValidationError::InvalidNumber {
        field: field.to_string(),
        value: text.to_string(),
    })?;

    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }

    if value > Decimal::from(max) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max,
        });
    }

    Ok(value)
}

// =============================================================================
// Form Inputs
// =============================================================================

/// A validated product form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub name: String,
    pub stock: i64,
    pub price: Money,
}

impl ProductInput {
    /// Parses the three text fields of the product form.
    pub fn parse(name: &str, stock: &str, price: &str) -> ValidationResult<Self> {
        Ok(ProductInput {
            name: validate_name("name", name)?,
            stock: parse_stock(stock)?,
            price: parse_price(price)?,
        })
    }
}

/// A validated fixed-tax form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxInput {
    pub name: String,
    pub value: Decimal,
    pub kind: AdjustmentKind,
}

impl TaxInput {
    /// Parses the fields of the fixed-tax form.
    pub fn parse(name: &str, value: &str, kind: AdjustmentKind) -> ValidationResult<Self> {
        Ok(TaxInput {
            name: validate_name("tax name", name)?,
            value: parse_tax_value(value, kind)?,
            kind,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
