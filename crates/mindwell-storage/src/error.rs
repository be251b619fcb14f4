//! Error types for mindwell-storage

use thiserror::Error;

/// Result type alias for mindwell-storage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mindwell-storage
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A document with this id already exists in the collection
    #[error("Duplicate document '{id}' in '{collection}'")]
    Duplicate {
        /// Collection name
        collection: String,
        /// Document id
        id: String,
    },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored document could not be (de)serialized
    #[error("Serialization error in '{collection}': {source}")]
    Serialization {
        /// Collection name
        collection: String,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Creates a serialization error for `collection`.
    pub fn serialization(collection: &str, source: serde_json::Error) -> Self {
        Error::Serialization {
            collection: collection.to_string(),
            source,
        }
    }

    /// Creates a duplicate-id error.
    pub fn duplicate(collection: &str, id: &str) -> Self {
        Error::Duplicate {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}
