//! # SQLite Key-Value Store
//!
//! [`KeyValueStore`] over the `kv_store` table.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  save(key, json)                                                        │
//! │       └── INSERT ... ON CONFLICT(key) DO UPDATE   (one statement)       │
//! │                                                                         │
//! │  save_many([(inventory, json), (cart, json), (transactions, json)])     │
//! │       ├── BEGIN                                                         │
//! │       ├── upsert inventory                                              │
//! │       ├── upsert cart                                                   │
//! │       ├── upsert transactions                                           │
//! │       └── COMMIT   (any failure → ROLLBACK, nothing written)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::store::{KeyValueStore, StoreKey};

const UPSERT: &str = r#"
    INSERT INTO kv_store (key, value, updated_at)
    VALUES (?1, ?2, ?3)
    ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at
"#;

/// Durable key-value store backed by SQLite.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Creates a new SqliteStore.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteStore { pool }
    }

    /// When the value under `key` was last written, as RFC 3339 text.
    pub async fn updated_at(&self, key: StoreKey) -> DbResult<Option<String>> {
        let updated: Option<String> =
            sqlx::query_scalar("SELECT updated_at FROM kv_store WHERE key = ?1")
                .bind(key.as_str())
                .fetch_optional(&self.pool)
                .await?;
        Ok(updated)
    }
}

fn upsert<'q>(
    key: StoreKey,
    value: String,
    now: String,
) -> sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    sqlx::query(UPSERT)
        .bind(key.as_str())
        .bind(value)
        .bind(now)
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn load(&self, key: StoreKey) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn save(&self, key: StoreKey, value: String) -> DbResult<()> {
        debug!(key = %key, bytes = value.len(), "Saving collection");

        upsert(key, value, Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn save_many(&self, entries: Vec<(StoreKey, String)>) -> DbResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        for (key, value) in entries {
            debug!(key = %key, bytes = value.len(), "Saving collection in batch");
            upsert(key, value, now.clone()).execute(&mut *tx).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        Ok(())
    }

    async fn remove(&self, key: StoreKey) -> DbResult<()> {
        debug!(key = %key, "Removing collection");

        sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::store::load_collection;

    async fn store() -> SqliteStore {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.store()
    }

    #[tokio::test]
    async fn test_load_missing_key() {
        let store = store().await;
        assert_eq!(store.load(StoreKey::Inventory).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let store = store().await;

        store.save(StoreKey::Cart, "[1]".to_string()).await.unwrap();
        store.save(StoreKey::Cart, "[1,2]".to_string()).await.unwrap();

        assert_eq!(
            store.load(StoreKey::Cart).await.unwrap().as_deref(),
            Some("[1,2]")
        );
        assert!(store.updated_at(StoreKey::Cart).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_save_many_writes_every_key() {
        let store = store().await;

        store
            .save_many(vec![
                (StoreKey::Inventory, "[\"a\"]".to_string()),
                (StoreKey::Cart, "[]".to_string()),
                (StoreKey::Transactions, "[\"t\"]".to_string()),
            ])
            .await
            .unwrap();

        let inventory: Vec<String> = load_collection(&store, StoreKey::Inventory).await.unwrap();
        let ledger: Vec<String> = load_collection(&store, StoreKey::Transactions).await.unwrap();
        assert_eq!(inventory, vec!["a"]);
        assert_eq!(ledger, vec!["t"]);
    }

    #[tokio::test]
    async fn test_failed_batch_keeps_previous_values() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = db.store();
        store
            .save(StoreKey::Inventory, "[\"old\"]".to_string())
            .await
            .unwrap();

        // Make the second write of the batch fail
        sqlx::query(
            "CREATE TRIGGER reject_cart BEFORE INSERT ON kv_store \
             WHEN NEW.key = 'tillbook:cart' \
             BEGIN SELECT RAISE(ABORT, 'cart writes rejected'); END",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let result = store
            .save_many(vec![
                (StoreKey::Inventory, "[\"new\"]".to_string()),
                (StoreKey::Cart, "[]".to_string()),
            ])
            .await;
        assert!(result.is_err());

        assert_eq!(
            store.load(StoreKey::Inventory).await.unwrap().as_deref(),
            Some("[\"old\"]")
        );
        assert_eq!(store.load(StoreKey::Cart).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove() {
        let store = store().await;
        store.save(StoreKey::FixedTaxes, "[]".to_string()).await.unwrap();

        store.remove(StoreKey::FixedTaxes).await.unwrap();
        assert_eq!(store.load(StoreKey::FixedTaxes).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_survives_reopen_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tillbook.db");

        {
            let db = Database::new(DbConfig::new(&path)).await.unwrap();
            db.store()
                .save(StoreKey::Inventory, "[\"kept\"]".to_string())
                .await
                .unwrap();
            db.close().await;
        }

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let inventory: Vec<String> = load_collection(&db.store(), StoreKey::Inventory)
            .await
            .unwrap();
        assert_eq!(inventory, vec!["kept"]);
    }
}
