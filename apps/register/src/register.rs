//! # Register Controller
//!
//! The surface a UI talks to. Each method validates form text, applies the
//! rule from `tillbook-core` to [`AppState`], then persists what changed.
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Register Operation                                   │
//! │                                                                         │
//! │  form text ──► validation ──► core rule ──► AppState ──► store write    │
//! │                    │              │                          │          │
//! │                    ▼              ▼                          ▼          │
//! │              ApiError         ApiError               error! logged      │
//! │          (state untouched) (state untouched)    (memory stays committed)│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Persistence
//! | Operation                        | Keys written                          |
//! |----------------------------------|---------------------------------------|
//! | product add/edit/delete/import   | inventory                             |
//! | cart add/quantity/remove         | cart                                  |
//! | fixed tax add/edit/delete        | fixed taxes                           |
//! | checkout                         | inventory + cart + transactions (one) |
//! | clear ledger / clear catalog     | transactions / inventory              |
//! | discount, tax selection          | nothing (session only)                |
//!
//! A failed write never rolls back memory: the session keeps working and the
//! next successful write of the same key carries the full collection.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tillbook_core::checkout::{commit_checkout, compute_totals};
use tillbook_core::export::{catalog_to_csv, ledger_to_csv};
use tillbook_core::import::{import_products, ImportReport};
use tillbook_core::validation::{parse_discount_value, ProductInput, TaxInput};
use tillbook_core::{
    AdjustmentKind, CartLine, CoreError, Discount, FixedTax, Product, Totals, Transaction,
    TransactionFilter, SUGGESTION_LIMIT,
};
use tillbook_db::{encode_collection, DbResult, KeyValueStore, StoreKey};
use tracing::{debug, error, info, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Result type for register operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// A register session over a key-value store.
pub struct Register {
    state: AppState,
    store: Arc<dyn KeyValueStore>,
    /// Keys whose stored payload could not be read when the session opened.
    unreadable: Vec<StoreKey>,
}

impl std::fmt::Debug for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Register")
            .field("state", &self.state)
            .field("unreadable", &self.unreadable)
            .finish_non_exhaustive()
    }
}

impl Register {
    /// Opens a session, loading the stored collections.
    pub async fn open(store: Arc<dyn KeyValueStore>) -> ApiResult<Self> {
        let (state, unreadable) = AppState::load_checked(store.as_ref()).await?;
        Ok(Register {
            state,
            store,
            unreadable,
        })
    }

    /// Wraps an already-built state.
    pub fn with_state(state: AppState, store: Arc<dyn KeyValueStore>) -> Self {
        Register {
            state,
            store,
            unreadable: Vec::new(),
        }
    }

    /// Stored keys that were unreadable at open and have not been written since.
    pub fn unreadable_keys(&self) -> &[StoreKey] {
        &self.unreadable
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn products(&self) -> &[Product] {
        self.state.catalog.products()
    }

    pub fn cart_lines(&self) -> &[CartLine] {
        self.state.cart.lines()
    }

    pub fn fixed_taxes(&self) -> &[FixedTax] {
        self.state.taxes.taxes()
    }

    pub fn discount(&self) -> Discount {
        self.state.discount
    }

    pub fn is_tax_selected(&self, tax_id: &str) -> bool {
        self.state.selection.is_selected(tax_id)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Adds a product from the product form.
    pub async fn add_product(&mut self, name: &str, stock: &str, price: &str) -> ApiResult<Product> {
        let input = ProductInput::parse(name, stock, price)?;
        let product = self.state.catalog.add_input(input)?.clone();

        info!(id = %product.id, name = %product.name, "Product added");
        self.persist(StoreKey::Inventory).await;
        Ok(product)
    }

    /// Replaces a product's name, stock and price from the product form.
    ///
    /// Cart lines keep the name and price they were added with.
    pub async fn edit_product(
        &mut self,
        id: &str,
        name: &str,
        stock: &str,
        price: &str,
    ) -> ApiResult<Product> {
        let input = ProductInput::parse(name, stock, price)?;
        let product = self.state.catalog.update(id, input)?.clone();

        info!(id = %product.id, stock = product.stock, "Product updated");
        self.persist(StoreKey::Inventory).await;
        Ok(product)
    }

    /// Deletes a product. A cart line for it stays until checkout rejects it.
    pub async fn delete_product(&mut self, id: &str) -> ApiResult<Product> {
        let product = self.state.catalog.remove(id)?;

        info!(id = %product.id, name = %product.name, "Product deleted");
        self.persist(StoreKey::Inventory).await;
        Ok(product)
    }

    /// Imports `name,stock,price` rows into the catalog.
    pub async fn import_products(&mut self, text: &str) -> ImportReport {
        let report = import_products(text);
        let added = self.state.catalog.extend(report.products.iter().cloned());

        info!(
            imported = report.imported,
            skipped = report.skipped,
            "Catalog import finished"
        );
        if added > 0 {
            self.persist(StoreKey::Inventory).await;
        }
        report
    }

    /// Removes every product.
    pub async fn clear_catalog(&mut self) {
        let removed = self.state.catalog.len();
        self.state.catalog.clear();

        info!(removed, "Catalog cleared");
        self.persist(StoreKey::Inventory).await;
    }

    /// Products whose name contains `term`, ignoring case.
    pub fn search_products(&self, term: &str) -> Vec<&Product> {
        self.state.catalog.search(term)
    }

    /// First few name matches for the search box.
    pub fn suggest_products(&self, term: &str) -> Vec<&Product> {
        self.state.catalog.suggest(term, SUGGESTION_LIMIT)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Adds one unit of a catalog product to the cart.
    pub async fn add_to_cart(&mut self, product_id: &str) -> ApiResult<CartLine> {
        let product = self
            .state
            .catalog
            .get(product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;
        let line = self.state.cart.add_product(product)?.clone();

        debug!(id = %line.id, quantity = line.quantity, "Added to cart");
        self.persist(StoreKey::Cart).await;
        Ok(line)
    }

    /// Sets a cart line's quantity; below 1 removes the line.
    pub async fn set_cart_quantity(&mut self, id: &str, quantity: i64) -> ApiResult<()> {
        self.state.cart.set_quantity(id, quantity)?;

        debug!(id = %id, quantity, "Cart quantity set");
        self.persist(StoreKey::Cart).await;
        Ok(())
    }

    pub async fn remove_from_cart(&mut self, id: &str) -> ApiResult<()> {
        self.state.cart.remove(id)?;

        debug!(id = %id, "Removed from cart");
        self.persist(StoreKey::Cart).await;
        Ok(())
    }

    // =========================================================================
    // Discount and Fixed Taxes
    // =========================================================================

    /// Sets the discount from the discount field.
    ///
    /// Empty text removes the discount. Non-numeric, negative or oversized
    /// text is rejected and the current discount is kept.
    pub fn set_discount(&mut self, value_text: &str, kind: AdjustmentKind) -> ApiResult<Discount> {
        let discount = match parse_discount_value(value_text, kind)? {
            Some(value) => Discount::new(value, kind),
            None => Discount::none(),
        };

        debug!(value = %discount.value, kind = ?discount.kind, "Discount set");
        self.state.discount = discount;
        Ok(discount)
    }

    pub async fn add_fixed_tax(
        &mut self,
        name: &str,
        value: &str,
        kind: AdjustmentKind,
    ) -> ApiResult<FixedTax> {
        let input = TaxInput::parse(name, value, kind)?;
        let tax = self.state.taxes.add(input).clone();

        info!(id = %tax.id, name = %tax.name, "Fixed tax added");
        self.persist(StoreKey::FixedTaxes).await;
        Ok(tax)
    }

    pub async fn edit_fixed_tax(
        &mut self,
        id: &str,
        name: &str,
        value: &str,
        kind: AdjustmentKind,
    ) -> ApiResult<FixedTax> {
        let input = TaxInput::parse(name, value, kind)?;
        let tax = self.state.taxes.update(id, input)?.clone();

        info!(id = %tax.id, name = %tax.name, "Fixed tax updated");
        self.persist(StoreKey::FixedTaxes).await;
        Ok(tax)
    }

    /// Deletes a fixed tax and drops it from the selection.
    pub async fn delete_fixed_tax(&mut self, id: &str) -> ApiResult<FixedTax> {
        let tax = self.state.taxes.remove(id)?;
        self.state.selection.retain_existing(&self.state.taxes);

        info!(id = %tax.id, name = %tax.name, "Fixed tax deleted");
        self.persist(StoreKey::FixedTaxes).await;
        Ok(tax)
    }

    /// Ticks or unticks a fixed tax for the current sale.
    ///
    /// Returns whether the tax is selected afterwards.
    pub fn toggle_tax_selection(&mut self, tax_id: &str) -> ApiResult<bool> {
        if self.state.taxes.get(tax_id).is_none() {
            return Err(CoreError::TaxNotFound(tax_id.to_string()).into());
        }
        let selected = self.state.selection.toggle(tax_id);

        debug!(id = %tax_id, selected, "Fixed tax toggled");
        Ok(selected)
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Live totals for the cart, discount and ticked taxes.
    pub fn totals(&self) -> Totals {
        compute_totals(
            &self.state.cart,
            &self.state.discount,
            &self.state.selected_taxes(),
        )
    }

    /// Commits the current sale, stamped with the current time.
    pub async fn checkout(&mut self) -> ApiResult<Transaction> {
        self.checkout_at(Utc::now()).await
    }

    /// Commits the current sale with an explicit timestamp.
    ///
    /// ## On Success
    /// - Stock deducted, transaction appended to the ledger
    /// - Cart emptied, discount reset, tax selection cleared
    /// - Inventory, cart and transactions written in one store call
    ///
    /// ## On Failure
    /// Empty cart or insufficient stock: nothing changes.
    pub async fn checkout_at(&mut self, now: DateTime<Utc>) -> ApiResult<Transaction> {
        let taxes = self.state.selected_taxes();
        let outcome = commit_checkout(
            &self.state.cart,
            &self.state.catalog,
            &self.state.discount,
            &taxes,
            now,
        )?;

        let transaction = outcome.transaction;
        self.state.catalog = outcome.catalog;
        self.state.cart = outcome.cart;
        self.state.discount = outcome.discount;
        self.state.ledger.append(transaction.clone());
        self.state.selection.clear();

        info!(
            id = %transaction.id,
            units = transaction.unit_count(),
            total = %transaction.total.rounded(),
            "Checkout committed"
        );
        self.persist_many(&[StoreKey::Inventory, StoreKey::Cart, StoreKey::Transactions])
            .await;
        Ok(transaction)
    }

    // =========================================================================
    // Ledger
    // =========================================================================

    /// Ledger entries matching `filter`, relative to the current time.
    pub fn transactions(&self, filter: TransactionFilter) -> Vec<&Transaction> {
        self.transactions_at(filter, Utc::now())
    }

    pub fn transactions_at(&self, filter: TransactionFilter, now: DateTime<Utc>) -> Vec<&Transaction> {
        self.state.ledger.filter(&filter, now)
    }

    /// Removes every transaction.
    pub async fn clear_ledger(&mut self) {
        let removed = self.state.ledger.len();
        self.state.ledger.clear();

        info!(removed, "Ledger cleared");
        self.persist(StoreKey::Transactions).await;
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// The catalog as CSV. An empty catalog gives the header row only.
    pub fn export_catalog(&self) -> ApiResult<String> {
        Ok(catalog_to_csv(self.state.catalog.products())?)
    }

    /// The filtered ledger as CSV, relative to the current time.
    pub fn export_ledger(&self, filter: TransactionFilter) -> ApiResult<String> {
        self.export_ledger_at(filter, Utc::now())
    }

    pub fn export_ledger_at(&self, filter: TransactionFilter, now: DateTime<Utc>) -> ApiResult<String> {
        Ok(ledger_to_csv(self.transactions_at(filter, now))?)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    fn encode(&self, key: StoreKey) -> DbResult<String> {
        match key {
            StoreKey::Inventory => encode_collection(key, &self.state.catalog),
            StoreKey::Cart => encode_collection(key, &self.state.cart),
            StoreKey::Transactions => encode_collection(key, &self.state.ledger),
            StoreKey::FixedTaxes => encode_collection(key, &self.state.taxes),
        }
    }

    async fn persist(&mut self, key: StoreKey) {
        self.warn_before_overwrite(&[key]);
        let result = match self.encode(key) {
            Ok(value) => self.store.save(key, value).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => self.unreadable.retain(|k| *k != key),
            Err(e) => error!(key = %key, error = %e, "Failed to persist collection"),
        }
    }

    async fn persist_many(&mut self, keys: &[StoreKey]) {
        self.warn_before_overwrite(keys);
        let entries: DbResult<Vec<(StoreKey, String)>> = keys
            .iter()
            .map(|&key| self.encode(key).map(|value| (key, value)))
            .collect();

        let result = match entries {
            Ok(entries) => self.store.save_many(entries).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => self.unreadable.retain(|k| !keys.contains(k)),
            Err(e) => error!(keys = ?keys, error = %e, "Failed to persist collections"),
        }
    }

    fn warn_before_overwrite(&self, keys: &[StoreKey]) {
        for key in keys.iter().filter(|key| self.unreadable.contains(key)) {
            warn!(
                key = %key,
                "Overwriting a stored collection that was unreadable at open, its old payload is lost"
            );
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use tillbook_core::validation::{MAX_AMOUNT, MAX_QUANTITY};
    use tillbook_core::{Cart, Money};
    use tillbook_db::{load_collection, Database, DbConfig, DbError, MemoryStore};

    /// Loads nothing and refuses every write.
    struct FailingStore;

    #[async_trait]
    impl KeyValueStore for FailingStore {
        async fn load(&self, _key: StoreKey) -> DbResult<Option<String>> {
            Ok(None)
        }

        async fn save(&self, _key: StoreKey, _value: String) -> DbResult<()> {
            Err(DbError::QueryFailed("disk full".to_string()))
        }

        async fn save_many(&self, _entries: Vec<(StoreKey, String)>) -> DbResult<()> {
            Err(DbError::TransactionFailed("disk full".to_string()))
        }

        async fn remove(&self, _key: StoreKey) -> DbResult<()> {
            Err(DbError::QueryFailed("disk full".to_string()))
        }
    }

    async fn register() -> (Register, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let register = Register::open(store.clone()).await.unwrap();
        (register, store)
    }

    fn march_15() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_bad_stored_record_does_not_wipe_inventory() {
        let store = Arc::new(MemoryStore::new());
        let good = Product::new("Good", 1, Money::from_cents(250));
        let mut bad = serde_json::to_value(Product::new("Bad", 1, Money::from_cents(100))).unwrap();
        bad["price"] = serde_json::Value::Null;
        let payload = serde_json::to_string(&vec![serde_json::to_value(&good).unwrap(), bad]).unwrap();
        store.save(StoreKey::Inventory, payload).await.unwrap();

        let mut register = Register::open(store.clone()).await.unwrap();
        assert_eq!(register.products(), &[good.clone()]);
        assert!(register.unreadable_keys().is_empty());

        register.add_product("New", "1", "3").await.unwrap();

        let stored: Vec<Product> = load_collection(store.as_ref(), StoreKey::Inventory)
            .await
            .unwrap();
        let names: Vec<&str> = stored.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Good", "New"]);
    }

    #[tokio::test]
    async fn test_unreadable_key_is_tracked_until_rewritten() {
        let store = Arc::new(MemoryStore::new());
        store
            .save(StoreKey::Inventory, "{\"truncated".to_string())
            .await
            .unwrap();

        let mut register = Register::open(store.clone()).await.unwrap();
        assert!(register.products().is_empty());
        assert_eq!(register.unreadable_keys(), &[StoreKey::Inventory]);

        // Writing another key leaves the unreadable one alone
        register
            .add_fixed_tax("VAT", "5", AdjustmentKind::Percentage)
            .await
            .unwrap();
        assert_eq!(register.unreadable_keys(), &[StoreKey::Inventory]);
        assert_eq!(
            store.load(StoreKey::Inventory).await.unwrap().as_deref(),
            Some("{\"truncated")
        );

        register.add_product("New", "1", "3").await.unwrap();
        assert!(register.unreadable_keys().is_empty());
    }

    #[tokio::test]
    async fn test_add_product_persists_inventory() {
        let (mut register, store) = register().await;

        let product = register.add_product("Coffee", "5", "4.50").await.unwrap();
        assert_eq!(product.price, Money::from_cents(450));

        let stored: Vec<Product> = load_collection(store.as_ref(), StoreKey::Inventory)
            .await
            .unwrap();
        assert_eq!(stored, vec![product]);
    }

    #[tokio::test]
    async fn test_invalid_product_form_changes_nothing() {
        let (mut register, store) = register().await;

        let err = register.add_product("", "5", "4.50").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = register.add_product("Tea", "-1", "2").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        assert!(register.products().is_empty());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_edit_and_delete_product() {
        let (mut register, _store) = register().await;
        let product = register.add_product("Coffee", "5", "4.50").await.unwrap();

        let edited = register
            .edit_product(&product.id, "Dark Coffee", "7", "5.00")
            .await
            .unwrap();
        assert_eq!(edited.name, "Dark Coffee");
        assert_eq!(edited.stock, 7);

        register.delete_product(&product.id).await.unwrap();
        assert!(register.products().is_empty());

        let err = register.delete_product(&product.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_import_products() {
        let (mut register, store) = register().await;

        let report = register
            .import_products("Coffee,10,4.50\nTea,3\n\nMug,lots,9\nCake,2,6")
            .await;
        assert_eq!(report.imported, 2);
        assert_eq!(report.skipped, 2);

        let stored: Vec<Product> = load_collection(store.as_ref(), StoreKey::Inventory)
            .await
            .unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[tokio::test]
    async fn test_search_and_suggest() {
        let (mut register, _store) = register().await;
        for name in ["Latte", "Iced Latte", "Tea", "Latte Large", "Oat Latte", "Latte Small", "Mocha Latte"] {
            register.add_product(name, "1", "1").await.unwrap();
        }

        assert_eq!(register.search_products("LATTE").len(), 6);
        assert_eq!(register.suggest_products("latte").len(), SUGGESTION_LIMIT);
        assert!(register.suggest_products("  ").is_empty());
    }

    #[tokio::test]
    async fn test_cart_operations() {
        let (mut register, store) = register().await;
        let product = register.add_product("Coffee", "5", "4.50").await.unwrap();

        register.add_to_cart(&product.id).await.unwrap();
        let line = register.add_to_cart(&product.id).await.unwrap();
        assert_eq!(line.quantity, 2);

        register.set_cart_quantity(&product.id, 4).await.unwrap();
        assert_eq!(register.cart_lines()[0].quantity, 4);

        register.set_cart_quantity(&product.id, 0).await.unwrap();
        assert!(register.cart_lines().is_empty());

        let stored: Vec<CartLine> = load_collection(store.as_ref(), StoreKey::Cart).await.unwrap();
        assert!(stored.is_empty());

        let err = register.add_to_cart("missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_add_to_cart_ignores_stock() {
        let (mut register, _store) = register().await;
        let product = register.add_product("Coffee", "0", "4.50").await.unwrap();

        register.add_to_cart(&product.id).await.unwrap();
        assert_eq!(register.cart_lines().len(), 1);

        let err = register.checkout_at(march_15()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
    }

    #[tokio::test]
    async fn test_set_discount() {
        let (mut register, _store) = register().await;

        let discount = register.set_discount("10", AdjustmentKind::Percentage).unwrap();
        assert_eq!(discount.value, Decimal::from(10));

        let err = register.set_discount("-5", AdjustmentKind::Amount).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(register.discount().kind, AdjustmentKind::Percentage);

        assert!(register.set_discount("abc", AdjustmentKind::Amount).is_err());

        let cleared = register.set_discount("", AdjustmentKind::Percentage).unwrap();
        assert_eq!(cleared, Discount::none());
    }

    #[tokio::test]
    async fn test_oversized_input_is_rejected() {
        let (mut register, _store) = register().await;

        let err = register
            .set_discount("79228162514264337593543950335", AdjustmentKind::Percentage)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(register.discount(), Discount::none());

        let err = register
            .add_product("Yacht", "1", "100000000000")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let product = register.add_product("Yacht", "1", "1000000000").await.unwrap();
        register.add_to_cart(&product.id).await.unwrap();
        let err = register
            .set_cart_quantity(&product.id, i64::MAX)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(register.cart_lines()[0].quantity, 1);

        register.set_cart_quantity(&product.id, MAX_QUANTITY).await.unwrap();
        register.set_discount("100", AdjustmentKind::Percentage).unwrap();
        let totals = register.totals();
        assert_eq!(
            totals.subtotal,
            Money::new(Decimal::from(MAX_AMOUNT) * Decimal::from(MAX_QUANTITY))
        );
        assert_eq!(totals.subtotal_after_discount, Money::zero());
    }

    #[tokio::test]
    async fn test_totals_over_unvalidated_stored_values_do_not_panic() {
        let state = AppState {
            cart: Cart::from_lines(vec![
                CartLine::new("a", "A", Money::new(Decimal::MAX), MAX_QUANTITY),
                CartLine::new("b", "B", Money::new(Decimal::MAX), 1),
            ]),
            discount: Discount::new(Decimal::MAX, AdjustmentKind::Percentage),
            ..AppState::default()
        };
        let register = Register::with_state(state, Arc::new(MemoryStore::new()));

        let totals = register.totals();
        assert_eq!(totals.subtotal, Money::new(Decimal::MAX));
    }

    #[tokio::test]
    async fn test_totals_use_selected_taxes_only() {
        let (mut register, _store) = register().await;
        let product = register.add_product("Board game", "3", "100").await.unwrap();
        register.add_to_cart(&product.id).await.unwrap();
        register.set_discount("10", AdjustmentKind::Percentage).unwrap();

        let service = register
            .add_fixed_tax("Service", "10", AdjustmentKind::Percentage)
            .await
            .unwrap();
        register
            .add_fixed_tax("Bag", "5", AdjustmentKind::Amount)
            .await
            .unwrap();

        let totals = register.totals().rounded();
        assert_eq!(totals.subtotal_after_discount, Money::from_cents(9000));
        assert_eq!(totals.total_tax_amount, Money::zero());

        assert!(register.toggle_tax_selection(&service.id).unwrap());
        let totals = register.totals().rounded();
        assert_eq!(totals.total_tax_amount, Money::from_cents(900));
        assert_eq!(totals.total, Money::from_cents(9900));
    }

    #[tokio::test]
    async fn test_fixed_tax_crud() {
        let (mut register, store) = register().await;

        let err = register
            .add_fixed_tax("", "5", AdjustmentKind::Amount)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let tax = register
            .add_fixed_tax("Bag", "0.50", AdjustmentKind::Amount)
            .await
            .unwrap();
        let tax = register
            .edit_fixed_tax(&tax.id, "Bag fee", "0.75", AdjustmentKind::Amount)
            .await
            .unwrap();
        assert_eq!(tax.name, "Bag fee");

        register.toggle_tax_selection(&tax.id).unwrap();
        register.delete_fixed_tax(&tax.id).await.unwrap();
        assert!(!register.is_tax_selected(&tax.id));

        let stored: Vec<FixedTax> = load_collection(store.as_ref(), StoreKey::FixedTaxes)
            .await
            .unwrap();
        assert!(stored.is_empty());

        let err = register.toggle_tax_selection(&tax.id).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_checkout_commits_and_resets() {
        let (mut register, store) = register().await;
        let product = register.add_product("Coffee", "5", "10").await.unwrap();
        let tax = register
            .add_fixed_tax("Bag", "5", AdjustmentKind::Amount)
            .await
            .unwrap();
        register.add_to_cart(&product.id).await.unwrap();
        register.add_to_cart(&product.id).await.unwrap();
        register.set_discount("10", AdjustmentKind::Percentage).unwrap();
        register.toggle_tax_selection(&tax.id).unwrap();
        let expected = register.totals();

        let transaction = register.checkout_at(march_15()).await.unwrap();

        assert_eq!(transaction.total, expected.total);
        assert_eq!(transaction.date, march_15());
        assert_eq!(transaction.applied_fixed_taxes, vec![tax.clone()]);
        assert_eq!(register.products()[0].stock, 3);
        assert!(register.cart_lines().is_empty());
        assert_eq!(register.discount(), Discount::none());
        assert!(!register.is_tax_selected(&tax.id));

        let stored: Vec<Transaction> = load_collection(store.as_ref(), StoreKey::Transactions)
            .await
            .unwrap();
        assert_eq!(stored, vec![transaction]);
        let stored: Vec<Product> = load_collection(store.as_ref(), StoreKey::Inventory)
            .await
            .unwrap();
        assert_eq!(stored[0].stock, 3);
        let stored: Vec<CartLine> = load_collection(store.as_ref(), StoreKey::Cart).await.unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn test_failed_checkout_changes_nothing() {
        let (mut register, _store) = register().await;

        let err = register.checkout_at(march_15()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyCart);

        let product = register.add_product("Coffee", "1", "10").await.unwrap();
        register.add_to_cart(&product.id).await.unwrap();
        register.set_cart_quantity(&product.id, 3).await.unwrap();
        register.set_discount("2", AdjustmentKind::Amount).unwrap();
        let before = register.state().clone();

        let err = register.checkout_at(march_15()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(register.state(), &before);
    }

    #[tokio::test]
    async fn test_checkout_with_deleted_product_fails() {
        let (mut register, _store) = register().await;
        let product = register.add_product("Coffee", "5", "10").await.unwrap();
        register.add_to_cart(&product.id).await.unwrap();
        register.delete_product(&product.id).await.unwrap();

        assert_eq!(register.cart_lines().len(), 1);
        let err = register.checkout_at(march_15()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_persistence_failure_keeps_memory_committed() {
        let mut register = Register::open(Arc::new(FailingStore)).await.unwrap();

        let product = register.add_product("Coffee", "5", "10").await.unwrap();
        register.add_to_cart(&product.id).await.unwrap();
        let transaction = register.checkout_at(march_15()).await.unwrap();

        assert_eq!(register.products()[0].stock, 4);
        assert!(register.cart_lines().is_empty());
        assert_eq!(
            register.transactions_at(TransactionFilter::all(), march_15()),
            vec![&transaction]
        );
    }

    #[tokio::test]
    async fn test_reopen_restores_collections() {
        let (mut register, store) = register().await;
        let product = register.add_product("Coffee", "5", "10").await.unwrap();
        register.add_to_cart(&product.id).await.unwrap();
        register.set_discount("1", AdjustmentKind::Amount).unwrap();
        register.checkout_at(march_15()).await.unwrap();
        register.add_to_cart(&product.id).await.unwrap();

        let reopened = Register::open(store).await.unwrap();
        assert_eq!(reopened.products(), register.products());
        assert_eq!(reopened.cart_lines(), register.cart_lines());
        assert_eq!(reopened.state().ledger, register.state().ledger);
        assert_eq!(reopened.discount(), Discount::none());
    }

    #[tokio::test]
    async fn test_sqlite_session_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tillbook.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let mut register = Register::open(Arc::new(db.store())).await.unwrap();
        let product = register.add_product("Coffee", "5", "10").await.unwrap();
        register.add_to_cart(&product.id).await.unwrap();
        let transaction = register.checkout_at(march_15()).await.unwrap();
        db.close().await;

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let reopened = Register::open(Arc::new(db.store())).await.unwrap();
        assert_eq!(reopened.products()[0].stock, 4);
        assert!(reopened.cart_lines().is_empty());
        assert_eq!(
            reopened.transactions_at(TransactionFilter::all(), march_15()),
            vec![&transaction]
        );
        db.close().await;
    }

    #[tokio::test]
    async fn test_transaction_filters_and_clear() {
        let (mut register, _store) = register().await;
        let product = register.add_product("Coffee", "10", "10").await.unwrap();

        register.add_to_cart(&product.id).await.unwrap();
        let march = register.checkout_at(march_15()).await.unwrap();

        let april_2 = Utc.with_ymd_and_hms(2024, 4, 2, 9, 0, 0).unwrap();
        register.add_to_cart(&product.id).await.unwrap();
        let april = register.checkout_at(april_2).await.unwrap();

        let now = Utc.with_ymd_and_hms(2024, 4, 4, 18, 0, 0).unwrap();
        assert_eq!(
            register.transactions_at(TransactionFilter::for_month(3), now),
            vec![&march]
        );
        assert_eq!(
            register.transactions_at(TransactionFilter::this_week(), now),
            vec![&april]
        );
        assert_eq!(register.transactions_at(TransactionFilter::all(), now).len(), 2);

        register.clear_ledger().await;
        assert!(register.transactions_at(TransactionFilter::all(), now).is_empty());
    }

    #[tokio::test]
    async fn test_exports() {
        let (mut register, _store) = register().await;
        assert_eq!(
            register.export_catalog().unwrap().trim_end(),
            "ID,Name,Stock,Price"
        );

        let product = register.add_product("Coffee", "5", "4.5").await.unwrap();
        register.add_to_cart(&product.id).await.unwrap();
        let transaction = register.checkout_at(march_15()).await.unwrap();

        let catalog = register.export_catalog().unwrap();
        assert!(catalog.contains(&format!("{},Coffee,4,4.50", product.id)));

        let ledger = register
            .export_ledger_at(TransactionFilter::for_month(3), march_15())
            .unwrap();
        assert!(ledger.contains(&transaction.id));

        let empty = register
            .export_ledger_at(TransactionFilter::for_month(4), march_15())
            .unwrap();
        assert!(!empty.contains(&transaction.id));
    }

    #[tokio::test]
    async fn test_clear_catalog() {
        let (mut register, store) = register().await;
        register.add_product("Coffee", "5", "4.5").await.unwrap();
        register.add_product("Tea", "5", "3").await.unwrap();

        register.clear_catalog().await;
        assert!(register.products().is_empty());

        let stored: Vec<Product> = load_collection(store.as_ref(), StoreKey::Inventory)
            .await
            .unwrap();
        assert!(stored.is_empty());
    }
}
