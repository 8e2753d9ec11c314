//! Loads the demo fixture into a [`SeedStore`].
//!
//! The run is a straight sequence: (optionally) drop the fixture
//! collections, insert users, insert posts and orders with their `userId`
//! looked up by username, create the secondary indexes, then summarize
//! every collection in the database. Any failure aborts the run.

use std::fmt;
use std::sync::Arc;

use bson::oid::ObjectId;
use bson::{doc, DateTime, Document};
use tracing::{debug, info};

use crate::fixtures;
use crate::indexes::standard_indexes;
use crate::models::{FIXTURE_COLLECTIONS, ORDERS_COLLECTION, POSTS_COLLECTION, USERS_COLLECTION};
use crate::storage::{SeedStore, StorageError};

/// Result type for seeding.
pub type Result<T> = std::result::Result<T, SeedError>;

/// Errors that abort a seeding run.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("No user with username {username:?} to reference")]
    UnknownUser { username: String },
}

/// Document count of one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSummary {
    pub name: String,
    pub documents: u64,
}

/// Outcome of a seeding run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub database: String,
    pub users_inserted: usize,
    pub posts_inserted: usize,
    pub orders_inserted: usize,
    /// Names of the indexes created, in creation order.
    pub indexes: Vec<String>,
    /// Every collection in the database after seeding, sorted by name.
    pub collections: Vec<CollectionSummary>,
}

impl fmt::Display for SeedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created collections:")?;
        for collection in &self.collections {
            writeln!(f, "  - {}: {} documents", collection.name, collection.documents)?;
        }
        Ok(())
    }
}

/// Seeds the demo collections.
pub struct Seeder {
    store: Arc<dyn SeedStore>,
    reset: bool,
}

impl Seeder {
    pub fn new(store: Arc<dyn SeedStore>) -> Self {
        Self { store, reset: false }
    }

    /// Drop the fixture collections before inserting.
    pub fn with_reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }

    /// Seed with the current time on every document.
    pub async fn run(&self) -> Result<SeedReport> {
        self.run_at(DateTime::now()).await
    }

    /// Seed with `now` as every `createdAt`/`updatedAt`.
    pub async fn run_at(&self, now: DateTime) -> Result<SeedReport> {
        let database = self.store.database_name().to_string();
        info!(database = %database, reset = self.reset, "Seeding demo database");

        if self.reset {
            self.reset_collections().await?;
        }

        let users_inserted = self.seed_users(now).await?;
        let posts_inserted = self.seed_posts(now).await?;
        let orders_inserted = self.seed_orders(now).await?;
        let indexes = self.create_indexes().await?;
        let collections = summarize(self.store.as_ref()).await?;

        info!(
            database = %database,
            users = users_inserted,
            posts = posts_inserted,
            orders = orders_inserted,
            indexes = indexes.len(),
            "Seeding complete"
        );

        Ok(SeedReport {
            database,
            users_inserted,
            posts_inserted,
            orders_inserted,
            indexes,
            collections,
        })
    }

    async fn reset_collections(&self) -> Result<()> {
        for collection in FIXTURE_COLLECTIONS {
            info!(collection, "Dropping collection");
            self.store.drop_collection(collection).await?;
        }
        Ok(())
    }

    async fn seed_users(&self, now: DateTime) -> Result<usize> {
        let documents = fixtures::users(now)
            .iter()
            .map(bson::to_document)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StorageError::from)?;

        self.insert(USERS_COLLECTION, documents).await
    }

    async fn seed_posts(&self, now: DateTime) -> Result<usize> {
        let mut documents = Vec::new();
        for fixture in fixtures::posts() {
            let user_id = self.user_id(fixture.author).await?;
            let post = fixture.into_post(user_id, now);
            documents.push(bson::to_document(&post).map_err(StorageError::from)?);
        }

        self.insert(POSTS_COLLECTION, documents).await
    }

    async fn seed_orders(&self, now: DateTime) -> Result<usize> {
        let mut documents = Vec::new();
        for fixture in fixtures::orders() {
            let user_id = self.user_id(fixture.customer).await?;
            let order = fixture.into_order(user_id, now);
            documents.push(bson::to_document(&order).map_err(StorageError::from)?);
        }

        self.insert(ORDERS_COLLECTION, documents).await
    }

    async fn insert(&self, collection: &str, documents: Vec<Document>) -> Result<usize> {
        let inserted = self.store.insert_many(collection, documents).await?;
        info!(collection, inserted, "Inserted documents");
        Ok(inserted)
    }

    /// Look up a stored user's id by username.
    async fn user_id(&self, username: &str) -> Result<ObjectId> {
        let user = self
            .store
            .find_one(USERS_COLLECTION, doc! { "username": username })
            .await?
            .ok_or_else(|| SeedError::UnknownUser {
                username: username.to_string(),
            })?;

        let id = user
            .get_object_id("_id")
            .map_err(|_| StorageError::MissingId {
                collection: USERS_COLLECTION.to_string(),
            })?;
        debug!(username, user_id = %id, "Resolved user");
        Ok(id)
    }

    async fn create_indexes(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for index in standard_indexes() {
            let name = self.store.create_index(&index).await?;
            info!(index = %index, "Created index");
            names.push(name);
        }
        Ok(names)
    }
}

/// Document counts for every collection in the store's database.
pub async fn summarize(store: &dyn SeedStore) -> Result<Vec<CollectionSummary>> {
    let mut names = store.list_collection_names().await?;
    names.sort();

    let mut summaries = Vec::with_capacity(names.len());
    for name in names {
        let documents = store.count_documents(&name).await?;
        summaries.push(CollectionSummary { name, documents });
    }
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::indexes::IndexSpec;
    use crate::storage::{MemorySeedStore, Result as StorageResult};

    /// Memory store that lists collections in reverse, like a server with no defined order.
    struct ReversedListing(MemorySeedStore);

    #[async_trait]
    impl SeedStore for ReversedListing {
        fn database_name(&self) -> &str {
            self.0.database_name()
        }

        async fn ping(&self) -> StorageResult<()> {
            self.0.ping().await
        }

        async fn drop_collection(&self, collection: &str) -> StorageResult<()> {
            self.0.drop_collection(collection).await
        }

        async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> StorageResult<usize> {
            self.0.insert_many(collection, documents).await
        }

        async fn find_one(&self, collection: &str, filter: Document) -> StorageResult<Option<Document>> {
            self.0.find_one(collection, filter).await
        }

        async fn find_all(&self, collection: &str) -> StorageResult<Vec<Document>> {
            self.0.find_all(collection).await
        }

        async fn create_index(&self, index: &IndexSpec) -> StorageResult<String> {
            self.0.create_index(index).await
        }

        async fn list_index_names(&self, collection: &str) -> StorageResult<Vec<String>> {
            self.0.list_index_names(collection).await
        }

        async fn list_collection_names(&self) -> StorageResult<Vec<String>> {
            let mut names = self.0.list_collection_names().await?;
            names.reverse();
            Ok(names)
        }

        async fn count_documents(&self, collection: &str) -> StorageResult<u64> {
            self.0.count_documents(collection).await
        }
    }

    fn store() -> Arc<MemorySeedStore> {
        Arc::new(MemorySeedStore::new("cdc_demo"))
    }

    #[tokio::test]
    async fn test_run_inserts_fixture() {
        let store = store();
        let report = Seeder::new(store.clone()).run().await.unwrap();

        assert_eq!(report.database, "cdc_demo");
        assert_eq!(report.users_inserted, 3);
        assert_eq!(report.posts_inserted, 3);
        assert_eq!(report.orders_inserted, 3);
        assert_eq!(report.indexes.len(), 8);
        assert_eq!(
            report.collections,
            vec![
                CollectionSummary { name: "orders".to_string(), documents: 3 },
                CollectionSummary { name: "posts".to_string(), documents: 3 },
                CollectionSummary { name: "users".to_string(), documents: 3 },
            ]
        );
    }

    #[tokio::test]
    async fn test_posts_reference_their_authors() {
        let store = store();
        Seeder::new(store.clone()).run().await.unwrap();

        let john = store
            .find_one(USERS_COLLECTION, doc! { "username": "john_doe" })
            .await
            .unwrap()
            .unwrap();
        let john_id = john.get_object_id("_id").unwrap();

        let johns_posts: Vec<_> = store
            .find_all(POSTS_COLLECTION)
            .await
            .unwrap()
            .into_iter()
            .filter(|p| p.get_object_id("userId").unwrap() == john_id)
            .collect();
        assert_eq!(johns_posts.len(), 2);

        let johns_order = store
            .find_one(ORDERS_COLLECTION, doc! { "userId": john_id })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(johns_order.get_str("status").unwrap(), "completed");
        assert_eq!(johns_order.get_f64("total").unwrap(), 999.99);
    }

    #[tokio::test]
    async fn test_run_at_stamps_documents() {
        let store = store();
        let now = DateTime::from_millis(1_700_000_000_000);
        Seeder::new(store.clone()).run_at(now).await.unwrap();

        for collection in FIXTURE_COLLECTIONS {
            for document in store.find_all(collection).await.unwrap() {
                assert_eq!(*document.get_datetime("createdAt").unwrap(), now);
                assert_eq!(*document.get_datetime("updatedAt").unwrap(), now);
            }
        }
    }

    #[tokio::test]
    async fn test_second_run_rejected_by_unique_index() {
        let store = store();
        Seeder::new(store.clone()).run().await.unwrap();

        let err = Seeder::new(store.clone()).run().await.unwrap_err();
        assert!(matches!(
            err,
            SeedError::Storage(StorageError::DuplicateKey { ref collection, .. }) if collection == "users"
        ));
        assert_eq!(store.count_documents(POSTS_COLLECTION).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_reset_makes_run_repeatable() {
        let store = store();
        Seeder::new(store.clone()).run().await.unwrap();

        let report = Seeder::new(store.clone()).with_reset(true).run().await.unwrap();
        assert_eq!(report.users_inserted, 3);
        assert_eq!(store.count_documents(USERS_COLLECTION).await.unwrap(), 3);
        assert_eq!(store.list_index_names(USERS_COLLECTION).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_reset_leaves_other_collections() {
        let store = store();
        store
            .insert_many("audit", vec![doc! { "event": "boot" }])
            .await
            .unwrap();

        let report = Seeder::new(store.clone()).with_reset(true).run().await.unwrap();
        let names: Vec<_> = report.collections.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["audit", "orders", "posts", "users"]);
    }

    #[tokio::test]
    async fn test_unknown_user_aborts() {
        let store = store();
        let seeder = Seeder::new(store.clone());

        let err = seeder.user_id("nobody").await.unwrap_err();
        assert!(matches!(err, SeedError::UnknownUser { ref username } if username == "nobody"));
    }

    #[tokio::test]
    async fn test_summarize_sorts_unordered_listing() {
        let store = ReversedListing(MemorySeedStore::new("cdc_demo"));
        for name in ["audit", "orders", "users"] {
            store.insert_many(name, vec![doc! {}]).await.unwrap();
        }
        assert_eq!(
            store.list_collection_names().await.unwrap(),
            vec!["users", "orders", "audit"]
        );

        let names: Vec<String> = summarize(&store)
            .await
            .unwrap()
            .into_iter()
            .map(|summary| summary.name)
            .collect();
        assert_eq!(names, vec!["audit", "orders", "users"]);
    }

    #[test]
    fn test_report_display() {
        let report = SeedReport {
            database: "cdc_demo".to_string(),
            users_inserted: 3,
            posts_inserted: 3,
            orders_inserted: 3,
            indexes: vec![],
            collections: vec![
                CollectionSummary { name: "orders".to_string(), documents: 3 },
                CollectionSummary { name: "users".to_string(), documents: 1 },
            ],
        };
        assert_eq!(
            report.to_string(),
            "Created collections:\n  - orders: 3 documents\n  - users: 1 documents\n"
        );
    }
}
