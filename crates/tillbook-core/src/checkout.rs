//! # Checkout Engine
//!
//! Pricing, stock validation and the checkout commit.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Checkout Flow                                   │
//! │                                                                         │
//! │  1. TOTALS (pure, any time)                                             │
//! │     subtotal              = Σ price × quantity                          │
//! │     applied_discount      = subtotal × v/100  |  v                      │
//! │     after_discount        = subtotal − applied_discount                 │
//! │     tax_i                 = after_discount × v_i/100  |  v_i            │
//! │     total                 = after_discount + Σ tax_i                    │
//! │                                                                         │
//! │  2. VALIDATE                                                            │
//! │     cart empty?                       ──► EmptyCart                     │
//! │     product missing from catalog?     ──► ProductNotFound               │
//! │     stock < quantity?                 ──► InsufficientStock             │
//! │                                                                         │
//! │  3. COMMIT (only if 2 passed)                                           │
//! │     catalog'  = catalog with stock deducted                             │
//! │     tx        = snapshot of lines, discount, taxes, totals              │
//! │     cart'     = empty                                                   │
//! │     discount' = {0, Amount}                                             │
//! │                                                                         │
//! │  Nothing is mutated in place: the caller swaps the outcome in.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All arithmetic keeps full decimal precision. Use [`Totals::rounded`] for
//! the two-decimal view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::cart::Cart;
use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{generate_transaction_id, Discount, FixedTax, Transaction};

// =============================================================================
// Totals
// =============================================================================

/// The computed amounts for a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    #[ts(type = "string")]
    pub subtotal: Money,

    #[ts(type = "string")]
    pub applied_discount_value: Money,

    /// Negative when the discount exceeds the subtotal.
    #[ts(type = "string")]
    pub subtotal_after_discount: Money,

    #[ts(type = "string")]
    pub total_tax_amount: Money,

    #[ts(type = "string")]
    pub total: Money,
}

impl Totals {
    /// Every amount rounded to two decimals, for display.
    pub fn rounded(&self) -> Totals {
        Totals {
            subtotal: self.subtotal.rounded(),
            applied_discount_value: self.applied_discount_value.rounded(),
            subtotal_after_discount: self.subtotal_after_discount.rounded(),
            total_tax_amount: self.total_tax_amount.rounded(),
            total: self.total.rounded(),
        }
    }
}

/// Computes the totals of a cart with a discount and a set of fixed taxes.
///
/// Taxes apply to the post-discount subtotal. Their order does not matter.
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use tillbook_core::checkout::compute_totals;
/// use tillbook_core::{AdjustmentKind, Cart, CartLine, Discount, FixedTax, Money};
///
/// let cart = Cart::from_lines(vec![CartLine::new("p1", "Coffee", Money::from_cents(10000), 1)]);
/// let discount = Discount::new(Decimal::from(10), AdjustmentKind::Percentage);
/// let fee = FixedTax::new("Delivery", Decimal::from(5), AdjustmentKind::Amount);
///
/// let totals = compute_totals(&cart, &discount, &[fee]);
/// assert_eq!(totals.subtotal_after_discount, Money::from_cents(9000));
/// assert_eq!(totals.total, Money::from_cents(9500));
/// ```
pub fn compute_totals(cart: &Cart, discount: &Discount, taxes: &[FixedTax]) -> Totals {
    let subtotal = cart.subtotal();
    let applied_discount_value = discount.applied_to(subtotal);
    let subtotal_after_discount = subtotal - applied_discount_value;
    let total_tax_amount: Money = taxes
        .iter()
        .map(|tax| tax.contribution(subtotal_after_discount))
        .sum();

    Totals {
        subtotal,
        applied_discount_value,
        subtotal_after_discount,
        total_tax_amount,
        total: subtotal_after_discount + total_tax_amount,
    }
}

// =============================================================================
// Stock Validation
// =============================================================================

/// Checks every cart line against catalog stock and reports the first problem.
///
/// Quantities are summed per product id first, so a cart holding the same
/// product on two lines is checked against the combined quantity.
pub fn check_stock(cart: &Cart, catalog: &Catalog) -> CoreResult<()> {
    let mut requested: Vec<(&str, i64)> = Vec::with_capacity(cart.len());
    for line in cart.lines() {
        match requested.iter_mut().find(|(id, _)| *id == line.id) {
            Some((_, quantity)) => *quantity = quantity.saturating_add(line.quantity),
            None => requested.push((&line.id, line.quantity)),
        }
    }

    for (id, quantity) in requested {
        let product = catalog
            .get(id)
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;

        if !product.can_sell(quantity) {
            return Err(CoreError::InsufficientStock {
                product_id: product.id.clone(),
                name: product.name.clone(),
                available: product.stock,
                requested: quantity,
            });
        }
    }
    Ok(())
}

/// True when every cart line's product exists with enough stock.
pub fn validate_stock(cart: &Cart, catalog: &Catalog) -> bool {
    check_stock(cart, catalog).is_ok()
}

// =============================================================================
// Commit
// =============================================================================

/// The state that replaces the old one after a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutOutcome {
    /// Catalog with sold units deducted.
    pub catalog: Catalog,
    /// The new ledger entry.
    pub transaction: Transaction,
    /// Always empty.
    pub cart: Cart,
    /// Always [`Discount::none`].
    pub discount: Discount,
}

/// Commits a checkout.
///
/// ## Returns
/// - `Err(EmptyCart)` when there is nothing to sell
/// - `Err(ProductNotFound | InsufficientStock)` when stock does not cover the cart
/// - Otherwise the new catalog, the transaction, an empty cart and a reset discount
///
/// Inputs are only borrowed, so a failure leaves the caller's state exactly
/// as it was.
pub fn commit_checkout(
    cart: &Cart,
    catalog: &Catalog,
    discount: &Discount,
    taxes: &[FixedTax],
    now: DateTime<Utc>,
) -> CoreResult<CheckoutOutcome> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }
    check_stock(cart, catalog)?;

    let mut next_catalog = catalog.clone();
    for line in cart.lines() {
        next_catalog.deduct_stock(&line.id, line.quantity)?;
    }

    let totals = compute_totals(cart, discount, taxes);
    let transaction = Transaction {
        id: generate_transaction_id(),
        date: now,
        items: cart.lines().to_vec(),
        subtotal: totals.subtotal,
        discount: *discount,
        applied_discount_value: totals.applied_discount_value,
        applied_fixed_taxes: taxes.to_vec(),
        total_tax_amount: totals.total_tax_amount,
        total: totals.total,
    };

    debug!(
        id = %transaction.id,
        lines = cart.len(),
        total = %transaction.total,
        "Checkout computed"
    );

    Ok(CheckoutOutcome {
        catalog: next_catalog,
        transaction,
        cart: Cart::new(),
        discount: Discount::none(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
