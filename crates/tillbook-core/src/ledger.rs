//! # Ledger
//!
//! The append-only list of committed transactions, and the filters the
//! ledger screen applies to it.
//!
//! ## Week Boundaries
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Weeks start on Monday, UTC.                                            │
//! │                                                                         │
//! │   Mon  Tue  Wed  Thu  Fri  Sat  Sun                                     │
//! │   ─0─  ─1─  ─2─  ─3─  ─4─  ─5─  ─6─   days back to the week start       │
//! │                                                                         │
//! │   now = Sun 2024-03-17 15:00  ──►  week start = Mon 2024-03-11          │
//! │   now = Wed 2024-03-13 08:00  ──►  week start = Mon 2024-03-11          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The clock is always a parameter; nothing in this module reads it.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Transaction;

// =============================================================================
// Ledger
// =============================================================================

/// Committed transactions, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Ledger::default()
    }

    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        Ledger { transactions }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// Appends a transaction. There is no way to edit or remove one.
    pub fn append(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    /// Drops the whole history.
    pub fn clear(&mut self) {
        self.transactions.clear();
    }

    /// Transactions matching a filter, in ledger order.
    pub fn filter(&self, filter: &TransactionFilter, now: DateTime<Utc>) -> Vec<&Transaction> {
        filter.apply(&self.transactions, now)
    }
}

// =============================================================================
// Filters
// =============================================================================

/// Keeps transactions dated in the given UTC month (1-12). `None` keeps all.
pub fn filter_by_month(transactions: &[Transaction], month: Option<u32>) -> Vec<&Transaction> {
    transactions
        .iter()
        .filter(|t| month.map_or(true, |m| t.date.month() == m))
        .collect()
}

/// Keeps transactions in the same Monday-starting UTC week as `now`.
///
/// When `enabled` is false every transaction is kept.
pub fn filter_by_current_week(
    transactions: &[Transaction],
    enabled: bool,
    now: DateTime<Utc>,
) -> Vec<&Transaction> {
    let start = week_start(now);
    transactions
        .iter()
        .filter(|t| !enabled || week_start(t.date) == start)
        .collect()
}

/// The Monday that starts the UTC week containing `at`.
pub fn week_start(at: DateTime<Utc>) -> NaiveDate {
    let day = at.date_naive();
    let days_back = day.weekday().num_days_from_monday();
    day - Duration::days(i64::from(days_back))
}

/// The filters selected on the ledger screen, combined with AND.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
    /// Calendar month 1-12, or `None` for every month.
    pub month: Option<u32>,
    pub current_week: bool,
}

impl TransactionFilter {
    /// No filtering at all.
    pub fn all() -> Self {
        TransactionFilter::default()
    }

    pub fn for_month(month: u32) -> Self {
        TransactionFilter {
            month: Some(month),
            current_week: false,
        }
    }

    pub fn this_week() -> Self {
        TransactionFilter {
            month: None,
            current_week: true,
        }
    }

    pub fn is_active(&self) -> bool {
        self.month.is_some() || self.current_week
    }

    pub fn matches(&self, transaction: &Transaction, now: DateTime<Utc>) -> bool {
        let month_ok = self.month.map_or(true, |m| transaction.date.month() == m);
        let week_ok = !self.current_week || week_start(transaction.date) == week_start(now);
        month_ok && week_ok
    }

    pub fn apply<'a>(
        &self,
        transactions: &'a [Transaction],
        now: DateTime<Utc>,
    ) -> Vec<&'a Transaction> {
        transactions.iter().filter(|t| self.matches(t, now)).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
