//! MongoDB seeding integration tests using testcontainers.
//!
//! Run with: cargo test --test seed_mongodb -- --ignored --nocapture
//!
//! These tests spin up MongoDB in a container, seed it and check the
//! fixture properties against the real server.

use std::sync::Arc;
use std::time::Duration;

use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    GenericImage, ImageExt,
};

use cdc_seed::config::MongodbConfig;
use cdc_seed::models::{ORDERS_COLLECTION, POSTS_COLLECTION, USERS_COLLECTION};
use cdc_seed::storage::MongoSeedStore;
use cdc_seed::verify::verify;
use cdc_seed::{SeedError, SeedStore, Seeder, StorageError};

/// Start MongoDB container.
///
/// Returns (container, uri).
async fn start_mongodb() -> (testcontainers::ContainerAsync<GenericImage>, String) {
    let image = GenericImage::new("mongo", "7")
        .with_exposed_port(27017.tcp())
        .with_wait_for(WaitFor::message_on_stdout("Waiting for connections"));

    let container = image
        .with_startup_timeout(Duration::from_secs(60))
        .start()
        .await
        .expect("Failed to start mongodb container");

    let host_port = container
        .get_host_port_ipv4(27017)
        .await
        .expect("Failed to get mapped port");

    let host = container
        .get_host()
        .await
        .expect("Failed to get container host");

    let uri = format!("mongodb://{}:{}", host, host_port);
    println!("MongoDB available at: {}", uri);

    (container, uri)
}

async fn connect(uri: &str, database: &str) -> Arc<MongoSeedStore> {
    let config = MongodbConfig {
        uri: uri.to_string(),
        database: database.to_string(),
        connect_retries: 10,
    };
    Arc::new(
        MongoSeedStore::connect(&config)
            .await
            .expect("Failed to connect to MongoDB"),
    )
}

#[tokio::test]
#[ignore = "requires Docker for the MongoDB container"]
async fn test_mongodb_seed_and_verify() {
    let (_container, uri) = start_mongodb().await;
    let store = connect(&uri, "cdc_demo").await;

    let report = Seeder::new(store.clone()).run().await.expect("Seeding failed");
    println!("{}", report);

    assert_eq!(report.indexes.len(), 8);
    for collection in [USERS_COLLECTION, POSTS_COLLECTION, ORDERS_COLLECTION] {
        assert_eq!(store.count_documents(collection).await.unwrap(), 3);
    }

    let verification = verify(&*store).await.unwrap();
    assert!(verification.is_ok(), "{}", verification);

    let mut user_indexes = store.list_index_names(USERS_COLLECTION).await.unwrap();
    user_indexes.sort();
    assert_eq!(user_indexes, vec!["email_1", "username_1"]);

    let mut post_indexes = store.list_index_names(POSTS_COLLECTION).await.unwrap();
    post_indexes.sort();
    assert_eq!(post_indexes, vec!["createdAt_-1", "status_1", "userId_1"]);
}

#[tokio::test]
#[ignore = "requires Docker for the MongoDB container"]
async fn test_mongodb_second_run_rejected() {
    let (_container, uri) = start_mongodb().await;
    let store = connect(&uri, "cdc_demo_rerun").await;

    Seeder::new(store.clone()).run().await.expect("First run failed");

    let err = Seeder::new(store.clone()).run().await.unwrap_err();
    assert!(
        matches!(err, SeedError::Storage(StorageError::DuplicateKey { .. })),
        "unexpected error: {}",
        err
    );

    let report = Seeder::new(store.clone())
        .with_reset(true)
        .run()
        .await
        .expect("Reset run failed");
    assert_eq!(report.users_inserted, 3);
    assert_eq!(store.count_documents(USERS_COLLECTION).await.unwrap(), 3);
}
