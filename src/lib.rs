//! cdc-seed - fixture loader for the MongoDB CDC demo database
//!
//! Populates `users`, `posts` and `orders` with sample documents, creates
//! their secondary indexes and reports per-collection document counts.

pub mod config;
pub mod fixtures;
pub mod indexes;
pub mod models;
pub mod seeder;
pub mod storage;
pub mod utils;
pub mod verify;

pub use seeder::{SeedError, SeedReport, Seeder};
pub use storage::{init_storage, SeedStore, StorageError};
