//! # Fixed Taxes
//!
//! The persisted table of reusable tax/fee definitions, and the transient
//! selection of which of them apply to the current cart.
//!
//! The selection holds ids, not copies. It is resolved against the table
//! whenever totals are computed, so editing a selected tax changes the cart
//! totals and deleting it drops it from the selection.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::types::FixedTax;
use crate::validation::TaxInput;

// =============================================================================
// Tax Table
// =============================================================================

/// Fixed-tax collection, stored as a plain list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxTable {
    taxes: Vec<FixedTax>,
}

impl TaxTable {
    pub fn new() -> Self {
        TaxTable::default()
    }

    pub fn from_taxes(taxes: Vec<FixedTax>) -> Self {
        TaxTable { taxes }
    }

    pub fn taxes(&self) -> &[FixedTax] {
        &self.taxes
    }

    pub fn len(&self) -> usize {
        self.taxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taxes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&FixedTax> {
        self.taxes.iter().find(|t| t.id == id)
    }

    /// Creates a tax from a validated form and appends it.
    pub fn add(&mut self, input: TaxInput) -> &FixedTax {
        let tax = FixedTax::new(input.name, input.value, input.kind);
        debug!(id = %tax.id, name = %tax.name, "Adding fixed tax");
        self.taxes.push(tax);
        &self.taxes[self.taxes.len() - 1]
    }

    /// Replaces the name, value and kind of an existing tax.
    pub fn update(&mut self, id: &str, input: TaxInput) -> CoreResult<&FixedTax> {
        let tax = self
            .taxes
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::TaxNotFound(id.to_string()))?;

        debug!(id = %id, name = %input.name, "Updating fixed tax");
        tax.name = input.name;
        tax.value = input.value;
        tax.kind = input.kind;
        Ok(tax)
    }

    /// Removes a tax by id and returns it.
    pub fn remove(&mut self, id: &str) -> CoreResult<FixedTax> {
        let index = self
            .taxes
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CoreError::TaxNotFound(id.to_string()))?;

        debug!(id = %id, "Removing fixed tax");
        Ok(self.taxes.remove(index))
    }
}

// =============================================================================
// Tax Selection
// =============================================================================

/// Which fixed taxes apply to the current cart, in the order they were picked.
///
/// Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxSelection {
    ids: Vec<String>,
}

impl TaxSelection {
    pub fn new() -> Self {
        TaxSelection::default()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.ids.iter().any(|s| s == id)
    }

    /// Selects the tax if it was not selected, deselects it otherwise.
    ///
    /// Returns whether the tax is selected afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.is_selected(id) {
            self.ids.retain(|s| s != id);
            false
        } else {
            self.ids.push(id.to_string());
            true
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drops ids that no longer exist in the table.
    pub fn retain_existing(&mut self, table: &TaxTable) {
        self.ids.retain(|id| table.get(id).is_some());
    }

    /// The selected taxes as they currently stand in the table.
    pub fn resolve(&self, table: &TaxTable) -> Vec<FixedTax> {
        self.ids
            .iter()
            .filter_map(|id| table.get(id))
            .cloned()
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
