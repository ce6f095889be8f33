//! # Catalog
//!
//! The collection of products available for sale.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Catalog screen action      Catalog method        Collection change     │
//! │  ─────────────────────      ──────────────        ─────────────────     │
//! │  Save new product  ───────► add()  ─────────────► push                  │
//! │  Save edited product ─────► update() ───────────► replace by id         │
//! │  Delete ──────────────────► remove() ───────────► filter out by id      │
//! │  Import CSV ──────────────► extend() ───────────► push many             │
//! │  Clear inventory ─────────► clear() ────────────► empty                 │
//! │  Type in search box ──────► search()/suggest() ─► (read only)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The only invariant is identifier uniqueness. Stock is otherwise changed
//! by checkout alone, through [`Catalog::deduct_stock`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::Product;
use crate::validation::ProductInput;

/// Product collection, stored as a plain list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog::default()
    }

    pub fn from_products(products: Vec<Product>) -> Self {
        Catalog { products }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn into_products(self) -> Vec<Product> {
        self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Gets a product by id.
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Appends a product.
    ///
    /// ## Returns
    /// - `Err(Validation(Duplicate))` if the id is already in the catalog
    pub fn add(&mut self, product: Product) -> CoreResult<&Product> {
        if self.get(&product.id).is_some() {
            return Err(ValidationError::Duplicate {
                field: "product id".to_string(),
                value: product.id,
            }
            .into());
        }

        debug!(id = %product.id, name = %product.name, "Adding product");
        self.products.push(product);
        Ok(&self.products[self.products.len() - 1])
    }

    /// Creates a product from a validated form and appends it.
    pub fn add_input(&mut self, input: ProductInput) -> CoreResult<&Product> {
        self.add(Product::new(input.name, input.stock, input.price))
    }

    /// Appends many products, skipping any whose id already exists.
    ///
    /// Returns the number appended.
    pub fn extend(&mut self, products: impl IntoIterator<Item = Product>) -> usize {
        let mut added = 0;
        for product in products {
            if self.add(product).is_ok() {
                added += 1;
            }
        }
        added
    }

    /// Replaces the name, stock and price of an existing product.
    pub fn update(&mut self, id: &str, input: ProductInput) -> CoreResult<&Product> {
        let product = self
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;

        debug!(id = %id, name = %input.name, stock = input.stock, "Updating product");
        product.name = input.name;
        product.stock = input.stock;
        product.price = input.price;
        Ok(product)
    }

    /// Removes a product by id and returns it.
    pub fn remove(&mut self, id: &str) -> CoreResult<Product> {
        let index = self
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;

        debug!(id = %id, "Removing product");
        Ok(self.products.remove(index))
    }

    /// Removes every product.
    pub fn clear(&mut self) {
        self.products.clear();
    }

    /// Products whose name contains `term`, case-insensitively.
    ///
    /// An empty term matches every product.
    pub fn search(&self, term: &str) -> Vec<&Product> {
        let term = term.trim().to_lowercase();
        self.products
            .iter()
            .filter(|p| term.is_empty() || p.name.to_lowercase().contains(&term))
            .collect()
    }

    /// Up to `limit` name matches for a search box; nothing for an empty term.
    pub fn suggest(&self, term: &str, limit: usize) -> Vec<&Product> {
        if term.trim().is_empty() {
            return Vec::new();
        }
        self.search(term).into_iter().take(limit).collect()
    }

    /// Subtracts sold units from a product's stock.
    ///
    /// Callers check stock first; this does not refuse to go below zero.
    pub(crate) fn deduct_stock(&mut self, id: &str, quantity: i64) -> CoreResult<()> {
        let product = self
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;
        product.stock -= quantity;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
