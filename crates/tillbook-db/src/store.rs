//! # Key-Value Store
//!
//! The persistence seam: four named collections, each stored as one JSON
//! array under a fixed key.
//!
//! ## Keys
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  StoreKey              Key string                Payload               │
//! │  ─────────             ──────────                ───────               │
//! │  Inventory      ──►    tillbook:inventory    ──► [Product, ...]        │
//! │  Cart           ──►    tillbook:cart         ──► [CartLine, ...]       │
//! │  Transactions   ──►    tillbook:transactions ──► [Transaction, ...]    │
//! │  FixedTaxes     ──►    tillbook:fixed_taxes  ──► [FixedTax, ...]       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Implementations
//! - [`SqliteStore`](crate::repository::kv::SqliteStore) - durable, over the `kv_store` table
//! - [`MemoryStore`] - tests and throwaway sessions
//!
//! Loading is forgiving: a missing key is an empty collection, a record that
//! no longer parses is logged and skipped, and a payload that is not an array
//! at all is logged and reported as unreadable.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};

// =============================================================================
// Store Keys
// =============================================================================

/// The four persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Inventory,
    Cart,
    Transactions,
    FixedTaxes,
}

impl StoreKey {
    pub const ALL: [StoreKey; 4] = [
        StoreKey::Inventory,
        StoreKey::Cart,
        StoreKey::Transactions,
        StoreKey::FixedTaxes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::Inventory => "tillbook:inventory",
            StoreKey::Cart => "tillbook:cart",
            StoreKey::Transactions => "tillbook:transactions",
            StoreKey::FixedTaxes => "tillbook:fixed_taxes",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Store Trait
// =============================================================================

/// String-keyed storage of serialized collections.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the raw value under `key`, `None` if it was never written.
    async fn load(&self, key: StoreKey) -> DbResult<Option<String>>;

    /// Replaces the value under `key`.
    async fn save(&self, key: StoreKey, value: String) -> DbResult<()>;

    /// Replaces several values at once. Either all are written or none are.
    async fn save_many(&self, entries: Vec<(StoreKey, String)>) -> DbResult<()>;

    /// Deletes the value under `key`. Deleting a missing key is not an error.
    async fn remove(&self, key: StoreKey) -> DbResult<()>;
}

// =============================================================================
// Collection Helpers
// =============================================================================

/// Serializes a collection for [`KeyValueStore::save`].
pub fn encode_collection<T: Serialize + ?Sized>(key: StoreKey, value: &T) -> DbResult<String> {
    serde_json::to_string(value).map_err(|e| DbError::serialization(key.as_str(), &e))
}

/// What [`read_collection`] found under one key.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedCollection<T> {
    /// Records that deserialized, in stored order.
    pub items: Vec<T>,

    /// Records dropped because they no longer match `T`.
    pub skipped: usize,

    /// A payload exists but is not a JSON array at all. Saving over this key
    /// discards whatever it held.
    pub unreadable: bool,
}

impl<T> LoadedCollection<T> {
    fn empty() -> Self {
        LoadedCollection {
            items: Vec::new(),
            skipped: 0,
            unreadable: false,
        }
    }
}

/// Reads a collection record by record.
///
/// ## Behavior
/// - Key never written → empty
/// - Payload is not a JSON array → logged, empty, `unreadable`
/// - A record does not deserialize as `T` → logged and skipped, the rest load
/// - Storage itself fails → `Err`
pub async fn read_collection<T, S>(store: &S, key: StoreKey) -> DbResult<LoadedCollection<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.load(key).await? else {
        debug!(key = %key, "No stored collection, starting empty");
        return Ok(LoadedCollection::empty());
    };

    let records = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
        Ok(records) => records,
        Err(e) => {
            warn!(
                key = %key,
                payload_len = raw.len(),
                error = %e,
                "Stored collection is unreadable, starting empty"
            );
            return Ok(LoadedCollection {
                unreadable: true,
                ..LoadedCollection::empty()
            });
        }
    };

    let mut loaded = LoadedCollection::empty();
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<T>(record) {
            Ok(item) => loaded.items.push(item),
            Err(e) => {
                warn!(key = %key, index, error = %e, "Skipping unreadable record");
                loaded.skipped += 1;
            }
        }
    }

    debug!(
        key = %key,
        count = loaded.items.len(),
        skipped = loaded.skipped,
        "Loaded collection"
    );
    Ok(loaded)
}

/// Loads a collection, keeping every record that still reads.
///
/// See [`read_collection`] for the fallback rules.
pub async fn load_collection<T, S>(store: &S, key: StoreKey) -> DbResult<Vec<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    Ok(read_collection(store, key).await?.items)
}

/// Serializes and saves a collection under `key`.
pub async fn save_collection<T, S>(store: &S, key: StoreKey, items: &T) -> DbResult<()>
where
    T: Serialize + ?Sized + Sync,
    S: KeyValueStore + ?Sized,
{
    let value = encode_collection(key, items)?;
    store.save(key, value).await
}

// =============================================================================
// Memory Store
// =============================================================================

/// A store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<StoreKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Number of keys currently written.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn load(&self, key: StoreKey) -> DbResult<Option<String>> {
        Ok(self.entries.lock().await.get(&key).cloned())
    }

    async fn save(&self, key: StoreKey, value: String) -> DbResult<()> {
        self.entries.lock().await.insert(key, value);
        Ok(())
    }

    async fn save_many(&self, entries: Vec<(StoreKey, String)>) -> DbResult<()> {
        let mut guard = self.entries.lock().await;
        guard.extend(entries);
        Ok(())
    }

    async fn remove(&self, key: StoreKey) -> DbResult<()> {
        self.entries.lock().await.remove(&key);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_strings() {
        assert_eq!(StoreKey::Inventory.as_str(), "tillbook:inventory");
        assert_eq!(StoreKey::Cart.to_string(), "tillbook:cart");
        assert_eq!(StoreKey::Transactions.as_str(), "tillbook:transactions");
        assert_eq!(StoreKey::FixedTaxes.as_str(), "tillbook:fixed_taxes");
    }

    #[tokio::test]
    async fn test_missing_key_loads_empty() {
        let store = MemoryStore::new();
        let items: Vec<String> = load_collection(&store, StoreKey::Cart).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_payload_loads_empty() {
        let store = MemoryStore::new();
        store
            .save(StoreKey::Inventory, "{not json".to_string())
            .await
            .unwrap();

        let items: Vec<String> = load_collection(&store, StoreKey::Inventory).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_payload_is_reported() {
        let store = MemoryStore::new();
        store
            .save(StoreKey::Inventory, "{not json".to_string())
            .await
            .unwrap();

        let loaded: LoadedCollection<String> =
            read_collection(&store, StoreKey::Inventory).await.unwrap();
        assert!(loaded.unreadable);
        assert!(loaded.items.is_empty());

        let missing: LoadedCollection<String> =
            read_collection(&store, StoreKey::Cart).await.unwrap();
        assert!(!missing.unreadable);
    }

    #[derive(Debug, PartialEq, serde::Deserialize)]
    struct Item {
        name: String,
        price: f64,
    }

    #[tokio::test]
    async fn test_bad_record_does_not_drop_the_rest() {
        let store = MemoryStore::new();
        store
            .save(
                StoreKey::Inventory,
                r#"[{"name":"Good","price":2.5},{"name":"Bad","price":null},{"name":"Also good","price":1.0}]"#
                    .to_string(),
            )
            .await
            .unwrap();

        let loaded: LoadedCollection<Item> =
            read_collection(&store, StoreKey::Inventory).await.unwrap();
        assert_eq!(loaded.skipped, 1);
        assert!(!loaded.unreadable);
        assert_eq!(
            loaded.items,
            vec![
                Item { name: "Good".to_string(), price: 2.5 },
                Item { name: "Also good".to_string(), price: 1.0 },
            ]
        );

        let items: Vec<Item> = load_collection(&store, StoreKey::Inventory).await.unwrap();
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_save_and_load_collection() {
        let store = MemoryStore::new();
        let names = vec!["a".to_string(), "b".to_string()];

        save_collection(&store, StoreKey::Cart, &names).await.unwrap();
        let loaded: Vec<String> = load_collection(&store, StoreKey::Cart).await.unwrap();
        assert_eq!(loaded, names);
    }

    #[tokio::test]
    async fn test_save_many_and_remove() {
        let store = MemoryStore::new();
        store
            .save_many(vec![
                (StoreKey::Cart, "[]".to_string()),
                (StoreKey::Transactions, "[]".to_string()),
            ])
            .await
            .unwrap();
        assert_eq!(store.len().await, 2);

        store.remove(StoreKey::Cart).await.unwrap();
        store.remove(StoreKey::Cart).await.unwrap();
        assert_eq!(store.load(StoreKey::Cart).await.unwrap(), None);
        assert_eq!(store.len().await, 1);
    }
}
