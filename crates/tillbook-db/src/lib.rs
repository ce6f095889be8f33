//! # tillbook-db: Storage Layer for Tillbook
//!
//! Persists the four Tillbook collections as JSON documents in a SQLite
//! key-value table, using sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tillbook Data Flow                               │
//! │                                                                         │
//! │  Register::checkout()                                                  │
//! │       │  save_many([inventory, cart, transactions])                     │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   tillbook-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │     Store     │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (store.rs)   │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SqliteStore   │    │ 001_key_     │  │   │
//! │  │   │ WAL, pooling  │    │ MemoryStore   │    │ value_store  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │   SQLite database: kv_store(key, value, updated_at)             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Storage error types
//! - [`store`] - The `KeyValueStore` seam, store keys, in-memory store
//! - [`repository`] - SQLite implementation of the seam
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tillbook_db::{load_collection, Database, DbConfig, StoreKey};
//! use tillbook_core::Product;
//!
//! let db = Database::new(DbConfig::new("path/to/tillbook.db")).await?;
//! let store = db.store();
//!
//! let products: Vec<Product> = load_collection(&store, StoreKey::Inventory).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::kv::SqliteStore;
pub use store::{
    encode_collection, load_collection, read_collection, save_collection, KeyValueStore,
    LoadedCollection, MemoryStore, StoreKey,
};
