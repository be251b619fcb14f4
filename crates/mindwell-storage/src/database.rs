//! SQLite document store.
//!
//! Every collection lives in one `documents` table; the JSON body is stored
//! as text and the autoincrement `seq` column keeps insertion order.

use std::str::FromStr;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::traits::DocumentStore;
use crate::{Error, Result};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS documents (
    seq        INTEGER PRIMARY KEY AUTOINCREMENT,
    collection TEXT NOT NULL,
    id         TEXT NOT NULL,
    body       TEXT NOT NULL,
    UNIQUE (collection, id)
)";

/// Document store backed by a SQLite database.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to `url` (e.g. `sqlite://mindwell.db` or `sqlite::memory:`),
    /// creating the database file and schema if missing.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        // Each connection to an in-memory database sees its own database,
        // so those get a single connection that is never recycled.
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        sqlx::query(SCHEMA).execute(&pool).await?;
        log::debug!("SQLite schema ready");
        Ok(Self { pool })
    }

    /// Close all pooled connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn encode(collection: &str, doc: &Value) -> Result<String> {
    serde_json::to_string(doc).map_err(|e| Error::serialization(collection, e))
}

fn decode(collection: &str, body: &str) -> Result<Value> {
    serde_json::from_str(body).map_err(|e| Error::serialization(collection, e))
}

#[async_trait]
impl DocumentStore for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn insert(&self, collection: &str, id: &str, doc: Value) -> Result<()> {
        let body = encode(collection, &doc)?;
        let result = sqlx::query("INSERT INTO documents (collection, id, body) VALUES (?, ?, ?)")
            .bind(collection)
            .bind(id)
            .bind(body)
            .execute(&self.pool)
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(Error::duplicate(collection, id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let row = sqlx::query("SELECT body FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => {
                let body: String = row.try_get("body")?;
                Ok(Some(decode(collection, &body)?))
            }
            None => Ok(None),
        }
    }

    async fn replace(&self, collection: &str, id: &str, doc: Value) -> Result<bool> {
        let body = encode(collection, &doc)?;
        let result = sqlx::query("UPDATE documents SET body = ? WHERE collection = ? AND id = ?")
            .bind(body)
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>> {
        let rows = sqlx::query("SELECT body FROM documents WHERE collection = ? ORDER BY seq")
            .bind(collection)
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| {
                let body: String = row.try_get("body")?;
                decode(collection, &body)
            })
            .collect()
    }
}
