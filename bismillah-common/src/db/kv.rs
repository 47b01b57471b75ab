//! Key/value storage with per-entry expiry
//!
//! Values are opaque strings. An entry past its `expires_at` is invisible to
//! `get` and is physically removed by `purge_expired`.

use crate::time::{expiry_from_now, now};
use crate::Result;
use sqlx::SqlitePool;
use std::time::Duration;

/// Namespaced key/value store over the `kv_store` table
#[derive(Clone)]
pub struct KvStore {
    pool: SqlitePool,
    namespace: String,
}

impl KvStore {
    pub fn new(pool: SqlitePool, namespace: impl Into<String>) -> Self {
        Self {
            pool,
            namespace: namespace.into(),
        }
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.namespace, key)
    }

    /// Fetch a live value
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = sqlx::query_scalar(
            "SELECT value FROM kv_store WHERE key = ? AND expires_at > ?",
        )
        .bind(self.full_key(key))
        .bind(now().timestamp())
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }

    /// Store a value, replacing any previous one, expiring after `ttl`
    pub async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, expires_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                expires_at = excluded.expires_at
            "#,
        )
        .bind(self.full_key(key))
        .bind(value)
        .bind(expiry_from_now(ttl))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(self.full_key(key))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Remove every expired entry (all namespaces), returning the count
    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM kv_store WHERE expires_at <= ?")
            .bind(now().timestamp())
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected();
        if removed > 0 {
            tracing::info!(removed, "Purged expired key/value entries");
        }
        Ok(removed)
    }
}
