//! # Register State
//!
//! Everything a register session holds in memory.
//!
//! ## What Is Persisted
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        AppState                                         │
//! │                                                                         │
//! │  Field        Stored under                  Lifetime                    │
//! │  ─────        ────────────                  ────────                    │
//! │  catalog      tillbook:inventory            survives restarts           │
//! │  cart         tillbook:cart                 survives restarts           │
//! │  ledger       tillbook:transactions         survives restarts           │
//! │  taxes        tillbook:fixed_taxes          survives restarts           │
//! │  discount     (not stored)                  session only                │
//! │  selection    (not stored)                  session only                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tillbook_core::{
    Cart, CartLine, Catalog, Discount, FixedTax, Ledger, Product, TaxSelection, TaxTable,
    Transaction,
};
use tillbook_db::{read_collection, DbResult, KeyValueStore, StoreKey};
use tracing::info;

/// In-memory register state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub catalog: Catalog,
    pub cart: Cart,
    pub ledger: Ledger,
    pub taxes: TaxTable,
    pub discount: Discount,
    /// Fixed taxes ticked for the current sale.
    pub selection: TaxSelection,
}

impl AppState {
    /// Loads the four stored collections.
    ///
    /// Missing keys load as empty collections. The discount and the tax
    /// selection always start empty.
    pub async fn load<S>(store: &S) -> DbResult<Self>
    where
        S: KeyValueStore + ?Sized,
    {
        Ok(AppState::load_checked(store).await?.0)
    }

    /// Like [`AppState::load`], also returning the keys whose payload could
    /// not be read at all.
    pub async fn load_checked<S>(store: &S) -> DbResult<(Self, Vec<StoreKey>)>
    where
        S: KeyValueStore + ?Sized,
    {
        let products = read_collection::<Product, _>(store, StoreKey::Inventory).await?;
        let lines = read_collection::<CartLine, _>(store, StoreKey::Cart).await?;
        let transactions = read_collection::<Transaction, _>(store, StoreKey::Transactions).await?;
        let taxes = read_collection::<FixedTax, _>(store, StoreKey::FixedTaxes).await?;

        let unreadable: Vec<StoreKey> = [
            (StoreKey::Inventory, products.unreadable),
            (StoreKey::Cart, lines.unreadable),
            (StoreKey::Transactions, transactions.unreadable),
            (StoreKey::FixedTaxes, taxes.unreadable),
        ]
        .into_iter()
        .filter_map(|(key, unreadable)| unreadable.then_some(key))
        .collect();

        info!(
            products = products.items.len(),
            cart_lines = lines.items.len(),
            transactions = transactions.items.len(),
            fixed_taxes = taxes.items.len(),
            skipped = products.skipped + lines.skipped + transactions.skipped + taxes.skipped,
            "Register state loaded"
        );

        let state = AppState {
            catalog: Catalog::from_products(products.items),
            cart: Cart::from_lines(lines.items),
            ledger: Ledger::from_transactions(transactions.items),
            taxes: TaxTable::from_taxes(taxes.items),
            discount: Discount::none(),
            selection: TaxSelection::new(),
        };
        Ok((state, unreadable))
    }

    /// The fixed taxes currently ticked, in table order.
    pub fn selected_taxes(&self) -> Vec<FixedTax> {
        self.selection.resolve(&self.taxes)
    }
}
