//! # Domain Types
//!
//! Core domain records used throughout Tillbook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    CartLine     │   │   Transaction   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │──►│  id (=product)  │──►│  id (UUID v7)   │       │
//! │  │  name           │   │  name, price    │   │  items snapshot │       │
//! │  │  stock          │   │  quantity       │   │  totals         │       │
//! │  │  price          │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                ▲                  │
//! │                                                     │ snapshot         │
//! │  ┌─────────────────┐   ┌─────────────────┐          │                  │
//! │  │    Discount     │   │    FixedTax     │──────────┘                  │
//! │  │  value, kind    │   │  id, name       │                             │
//! │  └─────────────────┘   │  value, kind    │                             │
//! │                        └─────────────────┘                             │
//! │                                                                         │
//! │  AdjustmentKind: Amount (fixed value) | Percentage                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A cart line copies the product's name and price when it is created, and a
//! transaction copies the cart lines, the discount and the selected taxes.
//! Later catalog or tax edits never reach back into either.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;

// =============================================================================
// Adjustment Kind
// =============================================================================

/// How a discount or fixed tax value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    /// A flat amount of money.
    ///
    /// Older stored records spell this `"value"`.
    #[default]
    #[serde(alias = "value")]
    Amount,
    /// A percentage of the base it applies to.
    Percentage,
}

impl AdjustmentKind {
    /// Applies this kind of adjustment with `value` against `base`.
    ///
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use tillbook_core::{AdjustmentKind, Money};
    ///
    /// let base = Money::from_cents(9000);
    /// let pct = AdjustmentKind::Percentage.apply(Decimal::from(10), base);
    /// assert_eq!(pct, Money::from_cents(900));
    ///
    /// let flat = AdjustmentKind::Amount.apply(Decimal::from(5), base);
    /// assert_eq!(flat, Money::from_cents(500));
    /// ```
    pub fn apply(self, value: Decimal, base: Money) -> Money {
        match self {
            AdjustmentKind::Amount => Money::new(value),
            AdjustmentKind::Percentage => base.percentage(value),
        }
    }

    /// Renders a value of this kind for receipts and exports: `10%` or `5.00`.
    pub fn describe(self, value: Decimal) -> String {
        match self {
            AdjustmentKind::Amount => Money::new(value).to_string(),
            AdjustmentKind::Percentage => format!("{}%", value.normalize()),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique identifier.
    pub id: String,

    /// Display name shown in the catalog and on receipts.
    pub name: String,

    /// Units on hand. Changed by catalog edits and checkout deduction only.
    pub stock: i64,

    /// Unit price.
    #[ts(type = "string")]
    pub price: Money,
}

impl Product {
    /// Creates a product with a fresh UUID v4 identifier.
    pub fn new(name: impl Into<String>, stock: i64, price: Money) -> Self {
        Product {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            stock,
            price,
        }
    }

    /// Checks whether `quantity` units can be sold from current stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// A line in the shopping cart.
///
/// ## Design Notes
/// - `id` is the product id; a cart holds at most one line per product
/// - `name` and `price` are frozen when the line is created, so the cart
///   keeps its price even if the catalog price is edited afterwards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    /// Product id this line was created from.
    pub id: String,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Unit price at time of adding (frozen).
    #[ts(type = "string")]
    pub price: Money,

    /// Quantity in cart, always at least 1.
    pub quantity: i64,
}

impl CartLine {
    /// Creates a cart line.
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Money, quantity: i64) -> Self {
        CartLine {
            id: id.into(),
            name: name.into(),
            price,
            quantity,
        }
    }

    /// Creates a one-unit line from a product, freezing its name and price.
    pub fn from_product(product: &Product) -> Self {
        CartLine::new(product.id.clone(), product.name.clone(), product.price, 1)
    }

    /// Calculates the line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Discount
// =============================================================================

/// The discount applied to the current cart.
///
/// There is one discount at a time; checkout resets it to [`Discount::none`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Discount {
    #[ts(type = "string")]
    pub value: Decimal,
    #[serde(rename = "type")]
    pub kind: AdjustmentKind,
}

impl Discount {
    pub fn new(value: Decimal, kind: AdjustmentKind) -> Self {
        Discount { value, kind }
    }

    /// The zero discount, `{0, Amount}`.
    pub fn none() -> Self {
        Discount::default()
    }

    pub fn is_none(&self) -> bool {
        self.value.is_zero()
    }

    /// Discount amount for a given subtotal.
    ///
    /// Not clamped: a discount bigger than the subtotal is returned as is.
    pub fn applied_to(&self, subtotal: Money) -> Money {
        if self.is_none() {
            return Money::zero();
        }
        self.kind.apply(self.value, subtotal)
    }
}

// =============================================================================
// Fixed Tax
// =============================================================================

/// A reusable, named tax or fee definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FixedTax {
    pub id: String,
    pub name: String,
    #[ts(type = "string")]
    pub value: Decimal,
    #[serde(rename = "type")]
    pub kind: AdjustmentKind,
}

impl FixedTax {
    /// Creates a tax definition with a fresh UUID v4 identifier.
    pub fn new(name: impl Into<String>, value: Decimal, kind: AdjustmentKind) -> Self {
        FixedTax {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            value,
            kind,
        }
    }

    /// This tax's contribution on the post-discount subtotal.
    #[inline]
    pub fn contribution(&self, subtotal_after_discount: Money) -> Money {
        self.kind.apply(self.value, subtotal_after_discount)
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A committed checkout. Immutable once appended to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// UUID v7, so ids sort in creation order.
    pub id: String,

    #[ts(as = "String")]
    pub date: DateTime<Utc>,

    /// Cart lines at time of checkout (frozen).
    pub items: Vec<CartLine>,

    #[ts(type = "string")]
    pub subtotal: Money,

    /// Discount at time of checkout (frozen).
    pub discount: Discount,

    #[ts(type = "string")]
    pub applied_discount_value: Money,

    /// Selected fixed taxes at time of checkout (frozen).
    pub applied_fixed_taxes: Vec<FixedTax>,

    #[ts(type = "string")]
    pub total_tax_amount: Money,

    #[ts(type = "string")]
    pub total: Money,
}

impl Transaction {
    /// Total number of units sold in this transaction.
    pub fn unit_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// Generates a new time-ordered transaction id.
pub fn generate_transaction_id() -> String {
    Uuid::now_v7().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
