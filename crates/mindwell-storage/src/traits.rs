//! The storage abstraction.

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

/// A store of JSON documents grouped into named collections.
///
/// Documents are keyed by `(collection, id)`. `list` returns a collection's
/// documents in insertion order. Implementations must be safe to share
/// between request handlers.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Short backend name, reported by the health endpoint.
    fn backend(&self) -> &'static str;

    /// Insert a new document. Fails with [`Error::Duplicate`](crate::Error::Duplicate)
    /// if the id is taken.
    async fn insert(&self, collection: &str, id: &str, doc: Value) -> Result<()>;

    /// Fetch a document by id.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>>;

    /// Replace an existing document. Returns `false` if it does not exist.
    async fn replace(&self, collection: &str, id: &str, doc: Value) -> Result<bool>;

    /// Delete a document. Returns `false` if it did not exist.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool>;

    /// All documents of a collection, oldest first.
    async fn list(&self, collection: &str) -> Result<Vec<Value>>;
}
