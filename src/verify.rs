//! Post-seed checks on the demo fixture.

use std::collections::HashSet;
use std::fmt;

use bson::oid::ObjectId;
use tracing::{info, warn};

use crate::models::{FIXTURE_COLLECTIONS, ORDERS_COLLECTION, POSTS_COLLECTION, USERS_COLLECTION};
use crate::storage::{Result, SeedStore};

/// Documents each fixture collection holds after a clean run.
pub const EXPECTED_DOCUMENTS: u64 = 3;

/// A collection whose size differs from the fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountMismatch {
    pub collection: String,
    pub expected: u64,
    pub actual: u64,
}

/// A post or order whose `userId` does not resolve to a user.
#[derive(Debug, Clone, PartialEq)]
pub struct DanglingReference {
    pub collection: String,
    /// `_id` of the referencing document, when it has an ObjectId one.
    pub document_id: Option<ObjectId>,
    /// The unresolved `userId`, `None` when absent or not an ObjectId.
    pub user_id: Option<ObjectId>,
}

/// Findings of [`verify`]. Empty means the fixture is intact.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Verification {
    pub count_mismatches: Vec<CountMismatch>,
    pub dangling_references: Vec<DanglingReference>,
}

impl Verification {
    pub fn is_ok(&self) -> bool {
        self.count_mismatches.is_empty() && self.dangling_references.is_empty()
    }
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return writeln!(f, "Fixture verified: all counts and user references check out.");
        }
        writeln!(f, "Fixture verification failed:")?;
        for m in &self.count_mismatches {
            writeln!(
                f,
                "  - {}: expected {} documents, found {}",
                m.collection, m.expected, m.actual
            )?;
        }
        for d in &self.dangling_references {
            let document = d.document_id.map(|id| id.to_hex()).unwrap_or_else(|| "?".to_string());
            let user = d.user_id.map(|id| id.to_hex()).unwrap_or_else(|| "missing".to_string());
            writeln!(f, "  - {} {}: userId {} has no user", d.collection, document, user)?;
        }
        Ok(())
    }
}

/// Check fixture counts and that every post and order references a stored user.
pub async fn verify(store: &dyn SeedStore) -> Result<Verification> {
    let mut verification = Verification::default();

    for collection in FIXTURE_COLLECTIONS {
        let actual = store.count_documents(collection).await?;
        if actual != EXPECTED_DOCUMENTS {
            warn!(collection, expected = EXPECTED_DOCUMENTS, actual, "Unexpected document count");
            verification.count_mismatches.push(CountMismatch {
                collection: collection.to_string(),
                expected: EXPECTED_DOCUMENTS,
                actual,
            });
        }
    }

    let user_ids: HashSet<ObjectId> = store
        .find_all(USERS_COLLECTION)
        .await?
        .iter()
        .filter_map(|user| user.get_object_id("_id").ok())
        .collect();

    for collection in [POSTS_COLLECTION, ORDERS_COLLECTION] {
        for document in store.find_all(collection).await? {
            let user_id = document.get_object_id("userId").ok();
            if user_id.is_some_and(|id| user_ids.contains(&id)) {
                continue;
            }
            let dangling = DanglingReference {
                collection: collection.to_string(),
                document_id: document.get_object_id("_id").ok(),
                user_id,
            };
            warn!(?dangling, "Dangling user reference");
            verification.dangling_references.push(dangling);
        }
    }

    info!(ok = verification.is_ok(), "Fixture verification finished");
    Ok(verification)
}
