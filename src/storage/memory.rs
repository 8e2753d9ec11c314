//! In-memory SeedStore implementation.
//!
//! Keeps collections as ordered document lists and enforces unique indexes
//! on insert, so a second seeding run fails the same way it does on MongoDB.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Bson, Document};
use tokio::sync::RwLock;

use super::{matches_filter, Result, SeedStore, StorageError};
use crate::indexes::IndexSpec;

#[derive(Default)]
struct MemoryCollection {
    documents: Vec<Document>,
    indexes: Vec<IndexSpec>,
}

impl MemoryCollection {
    /// Key values of `document` under a unique index, `None` if not unique.
    fn unique_key(index: &IndexSpec, document: &Document) -> Option<Vec<Bson>> {
        if !index.unique {
            return None;
        }
        Some(
            index
                .fields()
                .map(|field| document.get(field).cloned().unwrap_or(Bson::Null))
                .collect(),
        )
    }

    fn check_unique(&self, collection: &str, document: &Document) -> Result<()> {
        for index in &self.indexes {
            let Some(key) = Self::unique_key(index, document) else {
                continue;
            };
            let clash = self
                .documents
                .iter()
                .any(|existing| Self::unique_key(index, existing).as_ref() == Some(&key));
            if clash {
                return Err(StorageError::DuplicateKey {
                    collection: collection.to_string(),
                    message: format!("index {} dup key {:?}", index.name(), key),
                });
            }
        }

        if let Some(id) = document.get("_id") {
            if self.documents.iter().any(|existing| existing.get("_id") == Some(id)) {
                return Err(StorageError::DuplicateKey {
                    collection: collection.to_string(),
                    message: format!("index _id_ dup key {}", id),
                });
            }
        }

        Ok(())
    }
}

/// Prepend a fresh ObjectId `_id` when the document has none, as the server does.
fn with_generated_id(document: Document) -> Document {
    if document.contains_key("_id") {
        return document;
    }
    let mut with_id = doc! { "_id": ObjectId::new() };
    with_id.extend(document);
    with_id
}

/// SeedStore that holds everything in process memory.
pub struct MemorySeedStore {
    database: String,
    collections: RwLock<BTreeMap<String, MemoryCollection>>,
}

impl MemorySeedStore {
    pub fn new(database: &str) -> Self {
        Self {
            database: database.to_string(),
            collections: RwLock::new(BTreeMap::new()),
        }
    }
}

#[async_trait]
impl SeedStore for MemorySeedStore {
    fn database_name(&self) -> &str {
        &self.database
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn drop_collection(&self, collection: &str) -> Result<()> {
        self.collections.write().await.remove(collection);
        Ok(())
    }

    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<usize> {
        let mut collections = self.collections.write().await;
        let target = collections.entry(collection.to_string()).or_default();

        // Ordered insert: documents before the first failure stay written.
        let mut inserted = 0;
        for document in documents {
            let document = with_generated_id(document);
            target.check_unique(collection, &document)?;
            target.documents.push(document);
            inserted += 1;
        }

        Ok(inserted)
    }

    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|c| {
            c.documents
                .iter()
                .find(|document| matches_filter(document, &filter))
                .cloned()
        }))
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|c| c.documents.clone())
            .unwrap_or_default())
    }

    async fn create_index(&self, index: &IndexSpec) -> Result<String> {
        let mut collections = self.collections.write().await;
        let target = collections.entry(index.collection.to_string()).or_default();

        if index.unique {
            let mut seen: Vec<Vec<Bson>> = Vec::new();
            for document in &target.documents {
                if let Some(key) = MemoryCollection::unique_key(index, document) {
                    if seen.contains(&key) {
                        return Err(StorageError::DuplicateKey {
                            collection: index.collection.to_string(),
                            message: format!("index {} dup key {:?}", index.name(), key),
                        });
                    }
                    seen.push(key);
                }
            }
        }

        let name = index.name();
        if !target.indexes.iter().any(|existing| existing.name() == name) {
            target.indexes.push(index.clone());
        }
        Ok(name)
    }

    async fn list_index_names(&self, collection: &str) -> Result<Vec<String>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|c| c.indexes.iter().map(IndexSpec::name).collect())
            .unwrap_or_default())
    }

    async fn list_collection_names(&self) -> Result<Vec<String>> {
        Ok(self.collections.read().await.keys().cloned().collect())
    }

    async fn count_documents(&self, collection: &str) -> Result<u64> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|c| c.documents.len() as u64)
            .unwrap_or(0))
    }
}
