//! # Cart
//!
//! The in-progress purchase.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  UI Action                Cart method             Change                │
//! │  ─────────                ───────────             ──────                │
//! │                                                                         │
//! │  Tap product ────────────► add_product() ───────► qty+1 or new line     │
//! │                                                                         │
//! │  Change quantity ────────► set_quantity() ──────► lines[i].qty = n      │
//! │                            (n < 1 removes)                              │
//! │                                                                         │
//! │  Tap remove ─────────────► remove() ────────────► lines.remove(i)       │
//! │                                                                         │
//! │  Checkout commit ────────► (replaced by an empty cart)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CartLine, Product};
use crate::validation::MAX_QUANTITY;

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by product id (adding the same product bumps quantity)
/// - Every quantity is between 1 and [`MAX_QUANTITY`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Rebuilds a cart from stored lines, restoring the invariants.
    ///
    /// Lines for the same product id are merged into the first one, lines
    /// with a quantity below 1 are dropped, and quantities are capped at
    /// [`MAX_QUANTITY`].
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut merged: Vec<CartLine> = Vec::with_capacity(lines.len());

        for line in lines.into_iter().filter(|l| l.quantity >= 1) {
            match merged.iter_mut().find(|m| m.id == line.id) {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .saturating_add(line.quantity)
                        .min(MAX_QUANTITY);
                }
                None => merged.push(CartLine {
                    quantity: line.quantity.min(MAX_QUANTITY),
                    ..line
                }),
            }
        }

        Cart { lines: merged }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Gets the line for a product id.
    pub fn line(&self, id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    /// Adds one unit of a product.
    ///
    /// ## Behavior
    /// - If the product is already in the cart: quantity + 1, price unchanged
    /// - Otherwise: new line with the product's current name and price
    ///
    /// Stock is not checked here; checkout does that. A line already at
    /// [`MAX_QUANTITY`] is left alone and reported as out of range.
    pub fn add_product(&mut self, product: &Product) -> CoreResult<&CartLine> {
        if let Some(index) = self.lines.iter().position(|l| l.id == product.id) {
            if self.lines[index].quantity >= MAX_QUANTITY {
                return Err(quantity_out_of_range());
            }
            self.lines[index].quantity += 1;
            return Ok(&self.lines[index]);
        }

        self.lines.push(CartLine::from_product(product));
        Ok(&self.lines[self.lines.len() - 1])
    }

    /// Sets the quantity of a line.
    ///
    /// ## Behavior
    /// - Quantity below 1 removes the line
    /// - Quantity above [`MAX_QUANTITY`] is rejected, the line is unchanged
    /// - Unknown product id is an error
    pub fn set_quantity(&mut self, id: &str, quantity: i64) -> CoreResult<()> {
        if quantity < 1 {
            return self.remove(id);
        }
        if quantity > MAX_QUANTITY {
            return Err(quantity_out_of_range());
        }

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| CoreError::CartLineNotFound(id.to_string()))?;
        line.quantity = quantity;
        Ok(())
    }

    /// Removes a line by product id.
    pub fn remove(&mut self, id: &str) -> CoreResult<()> {
        let initial_len = self.lines.len();
        self.lines.retain(|l| l.id != id);

        if self.lines.len() == initial_len {
            Err(CoreError::CartLineNotFound(id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Clears all lines from the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Returns the number of lines in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity of all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines
            .iter()
            .fold(0i64, |acc, l| acc.saturating_add(l.quantity))
    }

    /// Σ price × quantity, at full precision.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn quantity_out_of_range() -> CoreError {
    ValidationError::OutOfRange {
        field: "quantity".to_string(),
        min: 1,
        max: MAX_QUANTITY,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_product(id: &str, price_cents: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            stock: 10,
            price: Money::from_cents(price_cents),
        }
    }

    #[test]
    fn test_cart_add_product() {
        let mut cart = Cart::new();
        let product = test_product("1", 999);

        cart.add_product(&product).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_quantity(), 1);
        assert_eq!(cart.subtotal(), Money::from_cents(999));
    }

    #[test]
    fn test_cart_add_same_product_increases_quantity() {
        let mut cart = Cart::new();
        let product = test_product("1", 999);

        cart.add_product(&product).unwrap();
        let line = cart.add_product(&product).unwrap();

        assert_eq!(line.quantity, 2);
        assert_eq!(cart.len(), 1); // Still one line
    }

    #[test]
    fn test_existing_line_keeps_its_price() {
        let mut cart = Cart::new();
        let mut product = test_product("1", 500);
        cart.add_product(&product).unwrap();

        product.price = Money::from_cents(800);
        cart.add_product(&product).unwrap();

        assert_eq!(cart.subtotal(), Money::from_cents(1000));
    }

    #[test]
    fn test_set_quantity_below_one_removes() {
        let mut cart = Cart::new();
        cart.add_product(&test_product("1", 100)).unwrap();
        cart.add_product(&test_product("2", 100)).unwrap();

        cart.set_quantity("1", 4).unwrap();
        assert_eq!(cart.line("1").unwrap().quantity, 4);

        cart.set_quantity("1", 0).unwrap();
        assert!(cart.line("1").is_none());
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_unknown_line() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.set_quantity("x", 2),
            Err(CoreError::CartLineNotFound(_))
        ));
        assert!(cart.remove("x").is_err());
    }

    #[test]
    fn test_subtotal_of_mixed_lines() {
        let cart = Cart::from_lines(vec![
            CartLine::new("a", "A", Money::from_cents(1000), 2),
            CartLine::new("b", "B", Money::from_cents(500), 3),
        ]);
        assert_eq!(cart.subtotal(), Money::from_cents(3500));
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_set_quantity_rejects_oversized() {
        let mut cart = Cart::new();
        cart.add_product(&test_product("1", 100)).unwrap();

        cart.set_quantity("1", MAX_QUANTITY).unwrap();
        assert!(matches!(
            cart.set_quantity("1", i64::MAX),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert_eq!(cart.line("1").unwrap().quantity, MAX_QUANTITY);
    }

    #[test]
    fn test_add_product_stops_at_max_quantity() {
        let product = test_product("1", 100);
        let mut cart = Cart::from_lines(vec![CartLine::new(
            "1",
            "Product 1",
            Money::from_cents(100),
            MAX_QUANTITY,
        )]);

        assert!(cart.add_product(&product).is_err());
        assert_eq!(cart.line("1").unwrap().quantity, MAX_QUANTITY);
    }

    #[test]
    fn test_from_lines_merges_duplicate_ids() {
        let cart = Cart::from_lines(vec![
            CartLine::new("a", "A", Money::from_cents(1000), 2),
            CartLine::new("b", "B", Money::from_cents(500), 0),
            CartLine::new("a", "A (renamed)", Money::from_cents(1200), 3),
            CartLine::new("c", "C", Money::from_cents(100), i64::MAX),
        ]);

        assert_eq!(cart.len(), 2);
        let a = cart.line("a").unwrap();
        assert_eq!(a.quantity, 5);
        assert_eq!(a.name, "A");
        assert_eq!(a.price, Money::from_cents(1000));
        assert!(cart.line("b").is_none());
        assert_eq!(cart.line("c").unwrap().quantity, MAX_QUANTITY);
    }
}
