//! cdc-seed: populate the CDC demo database
//!
//! Inserts the sample users, posts and orders, creates the secondary
//! indexes and prints every collection with its document count.
//!
//! ## Configuration
//! - `cdc-seed.yaml` in the working directory, `--config`, or CDC_SEED_CONFIG
//! - CDC_SEED__STORAGE__MONGODB__URI / CDC_SEED__STORAGE__MONGODB__DATABASE
//! - CDC_SEED_LOG: tracing filter (default: info)
//!
//! Command line flags override both.

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use cdc_seed::config::{Config, StorageType};
use cdc_seed::utils::bootstrap::init_tracing;
use cdc_seed::verify::verify;
use cdc_seed::{init_storage, Seeder};

/// Seed the MongoDB CDC demo database with sample users, posts and orders.
#[derive(Parser, Debug)]
#[command(name = "cdc-seed", version)]
#[command(about = "Seed the MongoDB CDC demo database", long_about = None)]
struct Args {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// MongoDB connection URI
    #[arg(long)]
    uri: Option<String>,

    /// Target database name
    #[arg(short, long)]
    database: Option<String>,

    /// Drop users, posts and orders before seeding
    #[arg(long)]
    reset: bool,

    /// Verify counts and user references after seeding
    #[arg(long)]
    verify: bool,

    /// Seed an in-memory store instead of MongoDB
    #[arg(short = 'n', long)]
    dry_run: bool,
}

impl Args {
    /// Apply flag overrides on top of loaded configuration.
    fn apply(&self, config: &mut Config) {
        if let Some(uri) = &self.uri {
            config.storage.mongodb.uri = uri.clone();
        }
        if let Some(database) = &self.database {
            config.storage.mongodb.database = database.clone();
        }
        if self.dry_run {
            config.storage.storage_type = StorageType::Memory;
        }
        config.seed.reset |= self.reset;
        config.seed.verify |= self.verify;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply(&mut config);

    info!(
        storage = ?config.storage.storage_type,
        database = %config.storage.mongodb.database,
        reset = config.seed.reset,
        verify = config.seed.verify,
        "cdc-seed starting"
    );

    let store = init_storage(&config.storage)
        .await
        .context("Failed to initialize storage")?;

    let report = Seeder::new(store.clone())
        .with_reset(config.seed.reset)
        .run()
        .await
        .context("Seeding failed")?;

    print!("{}", report);

    if config.seed.verify {
        let verification = verify(store.as_ref())
            .await
            .context("Verification failed to run")?;
        print!("{}", verification);
        if !verification.is_ok() {
            bail!("fixture verification failed");
        }
    }

    if config.storage.storage_type == StorageType::Memory {
        println!("Dry run complete - nothing was written to MongoDB.");
    } else {
        println!("MongoDB CDC demo database initialized successfully!");
    }

    Ok(())
}
