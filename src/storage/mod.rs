//! Storage implementations.
//!
//! The seeder talks to the database through [`SeedStore`]. Implementations:
//! - `MongoSeedStore`: MongoDB via the official driver
//! - `MemorySeedStore`: in-process store for dry runs and tests

use std::sync::Arc;

use async_trait::async_trait;
use bson::Document;
use tracing::info;

use crate::config::{StorageConfig, StorageType};
use crate::indexes::IndexSpec;

pub mod memory;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use memory::MemorySeedStore;

#[cfg(feature = "mongodb")]
pub use self::mongodb::MongoSeedStore;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Duplicate key in {collection}: {message}")]
    DuplicateKey { collection: String, message: String },

    #[error("Document in {collection} has no ObjectId _id")]
    MissingId { collection: String },

    #[error("BSON serialization error: {0}")]
    Serialize(#[from] bson::ser::Error),

    #[error("BSON deserialization error: {0}")]
    Deserialize(#[from] bson::de::Error),

    #[cfg(feature = "mongodb")]
    #[error("MongoDB error: {0}")]
    Mongo(#[from] ::mongodb::error::Error),

    #[error("Gave up connecting to {address} after {attempts} attempts: {source}")]
    ConnectionExhausted {
        address: String,
        attempts: u32,
        #[source]
        source: Box<StorageError>,
    },

    #[error("Storage type {0:?} is not available in this build")]
    Unavailable(StorageType),
}

/// Database operations needed to load and inspect the fixture.
#[async_trait]
pub trait SeedStore: Send + Sync {
    /// Name of the target database.
    fn database_name(&self) -> &str;

    /// Check the server is reachable.
    async fn ping(&self) -> Result<()>;

    /// Drop a collection, including its indexes. Missing collections are fine.
    async fn drop_collection(&self, collection: &str) -> Result<()>;

    /// Insert documents in order, returning how many were written.
    ///
    /// A unique index violation fails with [`StorageError::DuplicateKey`].
    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<usize>;

    /// First document whose fields equal every field of `filter`.
    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>>;

    /// Every document in a collection.
    async fn find_all(&self, collection: &str) -> Result<Vec<Document>>;

    /// Create an index, returning its name.
    async fn create_index(&self, index: &IndexSpec) -> Result<String>;

    /// Names of the indexes on a collection, excluding `_id_`.
    async fn list_index_names(&self, collection: &str) -> Result<Vec<String>>;

    /// Names of all collections in the database.
    async fn list_collection_names(&self) -> Result<Vec<String>>;

    /// Number of documents in a collection.
    async fn count_documents(&self, collection: &str) -> Result<u64>;
}

/// Initialize storage based on configuration.
pub async fn init_storage(config: &StorageConfig) -> Result<Arc<dyn SeedStore>> {
    match config.storage_type {
        StorageType::Memory => {
            info!(database = %config.mongodb.database, "Storage: in-memory");
            Ok(Arc::new(MemorySeedStore::new(&config.mongodb.database)))
        }
        #[cfg(feature = "mongodb")]
        StorageType::Mongodb => {
            info!(
                uri = %config.mongodb.uri,
                database = %config.mongodb.database,
                "Storage: mongodb"
            );
            let store = MongoSeedStore::connect(&config.mongodb).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "mongodb"))]
        StorageType::Mongodb => {
            tracing::error!("MongoDB storage requested but 'mongodb' feature is not enabled");
            Err(StorageError::Unavailable(StorageType::Mongodb))
        }
    }
}

/// Whether `document` matches every field of an equality filter.
pub(crate) fn matches_filter(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, value)| document.get(key) == Some(value))
}
