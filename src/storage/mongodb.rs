//! MongoDB SeedStore implementation.

use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use tracing::debug;

use crate::config::MongodbConfig;
use crate::indexes::IndexSpec;
use crate::storage::{Result, SeedStore, StorageError};
use crate::utils::bootstrap::connect_with_retry;

/// Server error code for unique index violations.
const DUPLICATE_KEY_CODE: i32 = 11000;

/// MongoDB implementation of SeedStore.
pub struct MongoSeedStore {
    database: Database,
}

impl MongoSeedStore {
    /// Create a store on an existing client.
    pub fn new(client: &Client, database_name: &str) -> Self {
        Self {
            database: client.database(database_name),
        }
    }

    /// Connect using configuration, retrying until the server answers a ping.
    pub async fn connect(config: &MongodbConfig) -> Result<Self> {
        let client = Client::with_uri_str(&config.uri).await?;
        let store = Self::new(&client, &config.database);

        connect_with_retry("mongodb", &config.uri, config.connect_retries, || store.ping())
            .await
            .map_err(|e| StorageError::ConnectionExhausted {
                address: config.uri.clone(),
                attempts: config.connect_retries.max(1),
                source: Box::new(e),
            })?;

        Ok(store)
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection(name)
    }
}

/// Map duplicate key failures to [`StorageError::DuplicateKey`].
fn map_write_error(collection: &str, error: mongodb::error::Error) -> StorageError {
    let duplicate = match *error.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref write_err)) => {
            (write_err.code == DUPLICATE_KEY_CODE).then(|| write_err.message.clone())
        }
        ErrorKind::InsertMany(ref failure) => failure
            .write_errors
            .as_ref()
            .and_then(|errors| errors.iter().find(|e| e.code == DUPLICATE_KEY_CODE))
            .map(|e| e.message.clone()),
        ErrorKind::Command(ref command_err) if command_err.code == DUPLICATE_KEY_CODE => {
            Some(command_err.message.clone())
        }
        _ => None,
    };

    match duplicate {
        Some(message) => StorageError::DuplicateKey {
            collection: collection.to_string(),
            message,
        },
        None => StorageError::from(error),
    }
}

#[async_trait]
impl SeedStore for MongoSeedStore {
    fn database_name(&self) -> &str {
        self.database.name()
    }

    async fn ping(&self) -> Result<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn drop_collection(&self, collection: &str) -> Result<()> {
        self.collection(collection).drop().await?;
        Ok(())
    }

    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<usize> {
        if documents.is_empty() {
            return Ok(0);
        }

        let result = self
            .collection(collection)
            .insert_many(documents)
            .await
            .map_err(|e| map_write_error(collection, e))?;

        Ok(result.inserted_ids.len())
    }

    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
        Ok(self.collection(collection).find_one(filter).await?)
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Document>> {
        let mut cursor = self.collection(collection).find(doc! {}).await?;

        let mut documents = Vec::new();
        while cursor.advance().await? {
            documents.push(cursor.deserialize_current()?);
        }
        Ok(documents)
    }

    async fn create_index(&self, index: &IndexSpec) -> Result<String> {
        let model = IndexModel::builder()
            .keys(index.keys_document())
            .options(IndexOptions::builder().unique(index.unique).build())
            .build();

        let result = self
            .collection(index.collection)
            .create_index(model)
            .await
            .map_err(|e| map_write_error(index.collection, e))?;

        debug!(index = %index, name = %result.index_name, "Index created");
        Ok(result.index_name)
    }

    async fn list_index_names(&self, collection: &str) -> Result<Vec<String>> {
        let names = self.collection(collection).list_index_names().await?;
        Ok(names.into_iter().filter(|name| name != "_id_").collect())
    }

    async fn list_collection_names(&self) -> Result<Vec<String>> {
        Ok(self.database.list_collection_names().await?)
    }

    async fn count_documents(&self, collection: &str) -> Result<u64> {
        Ok(self.collection(collection).count_documents(doc! {}).await?)
    }
}
