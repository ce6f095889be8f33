//! # Repository Module
//!
//! SQL-backed implementations of the storage seams.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Register                                                               │
//! │       │  store.save_many([...])                                         │
//! │       ▼                                                                 │
//! │  dyn KeyValueStore ──┬──► SqliteStore (kv.rs)  ──► kv_store table      │
//! │                      └──► MemoryStore (store.rs, no SQL)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - [`kv::SqliteStore`] - the `kv_store` table

pub mod kv;
