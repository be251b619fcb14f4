//! Typed access to one collection.

use std::marker::PhantomData;
use std::sync::Arc;

use mindwell_core::Document;

use crate::traits::DocumentStore;
use crate::{Error, Result};

/// Typed view over the collection of `T`.
///
/// Filtering happens in process: the clinic's collections are small and
/// every backend can list a collection.
pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Document> Repository<T> {
    /// Wrap a store.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// Insert a new document.
    pub async fn insert(&self, doc: &T) -> Result<()> {
        self.store
            .insert(T::COLLECTION, doc.id(), to_value(doc)?)
            .await
    }

    /// Fetch by id.
    pub async fn get(&self, id: &str) -> Result<Option<T>> {
        match self.store.get(T::COLLECTION, id).await? {
            Some(value) => Ok(Some(from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Overwrite an existing document. Returns `false` if it is gone.
    pub async fn update(&self, doc: &T) -> Result<bool> {
        self.store
            .replace(T::COLLECTION, doc.id(), to_value(doc)?)
            .await
    }

    /// Delete by id. Returns `false` if it did not exist.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        self.store.delete(T::COLLECTION, id).await
    }

    /// Every document, oldest first.
    pub async fn all(&self) -> Result<Vec<T>> {
        self.store
            .list(T::COLLECTION)
            .await?
            .into_iter()
            .map(from_value)
            .collect()
    }

    /// Documents matching `predicate`, oldest first.
    pub async fn find<F>(&self, predicate: F) -> Result<Vec<T>>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self.all().await?.into_iter().filter(|d| predicate(d)).collect())
    }

    /// First document matching `predicate`.
    pub async fn find_one<F>(&self, predicate: F) -> Result<Option<T>>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self.all().await?.into_iter().find(|d| predicate(d)))
    }

    /// Whether any document matches `predicate`.
    pub async fn exists<F>(&self, predicate: F) -> Result<bool>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self.find_one(predicate).await?.is_some())
    }

    /// Delete every document matching `predicate`; returns how many went.
    pub async fn delete_where<F>(&self, predicate: F) -> Result<usize>
    where
        F: Fn(&T) -> bool,
    {
        let mut deleted = 0;
        for doc in self.find(predicate).await? {
            if self.store.delete(T::COLLECTION, doc.id()).await? {
                deleted += 1;
            }
        }
        log::debug!("Deleted {deleted} document(s) from '{}'", T::COLLECTION);
        Ok(deleted)
    }
}

fn to_value<T: Document>(doc: &T) -> Result<serde_json::Value> {
    serde_json::to_value(doc).map_err(|e| Error::serialization(T::COLLECTION, e))
}

fn from_value<T: Document>(value: serde_json::Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::serialization(T::COLLECTION, e))
}
