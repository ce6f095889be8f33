//! # tillbook-core: Pure Business Logic for Tillbook
//!
//! This crate is the **heart** of Tillbook. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tillbook Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Touch UI (external)                          │   │
//! │  │   Catalog screen ──► Cart screen ──► Ledger screen             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ user events                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    Register (apps/register)                     │   │
//! │  │    add_product, add_to_cart, set_discount, checkout, ...       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ tillbook-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌─────────┐ ┌─────────┐ │   │
//! │  │  │  types  │ │  money  │ │ checkout │ │ ledger  │ │ import/ │ │   │
//! │  │  │ Product │ │  Money  │ │  Totals  │ │ filters │ │ export  │ │   │
//! │  │  │  Cart   │ │         │ │  commit  │ │         │ │  (CSV)  │ │   │
//! │  │  └─────────┘ └─────────┘ └──────────┘ └─────────┘ └─────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 tillbook-db (Storage Layer)                     │   │
//! │  │            SQLite key-value store, migrations                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Product, CartLine, Discount, FixedTax, Transaction)
//! - [`money`] - Money type with exact decimal arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Form input parsing and rules
//! - [`catalog`] - Product collection (CRUD, search)
//! - [`cart`] - Cart collection
//! - [`taxes`] - Fixed-tax table and the transient selection
//! - [`checkout`] - Pricing, stock validation, checkout commit
//! - [`ledger`] - Append-only transaction ledger and its filters
//! - [`import`] - Permissive catalog import from delimited text
//! - [`export`] - Catalog and ledger export to delimited text
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output; the current time is a parameter
//! 2. **No I/O**: storage lives in `tillbook-db`
//! 3. **Exact Money**: decimals, never floats; round only for display
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use tillbook_core::checkout::compute_totals;
//! use tillbook_core::{AdjustmentKind, Cart, CartLine, Discount, Money};
//!
//! let cart = Cart::from_lines(vec![CartLine::new("p1", "Coffee", Money::from_cents(1000), 2)]);
//! let discount = Discount::new(Decimal::from(10), AdjustmentKind::Percentage);
//!
//! let totals = compute_totals(&cart, &discount, &[]);
//! assert_eq!(totals.total, Money::from_cents(1800));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod export;
pub mod import;
pub mod ledger;
pub mod money;
pub mod taxes;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tillbook_core::Money` instead of
// `use tillbook_core::money::Money`

pub use cart::Cart;
pub use catalog::Catalog;
pub use checkout::{CheckoutOutcome, Totals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::{Ledger, TransactionFilter};
pub use money::Money;
pub use taxes::{TaxSelection, TaxTable};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Decimal places used when money is shown or exported.
pub const DISPLAY_DECIMALS: u32 = 2;

/// Number of name suggestions offered while typing a product search.
pub const SUGGESTION_LIMIT: usize = 5;
