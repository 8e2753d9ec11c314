//! Secondary index declarations for the demo collections.

use std::fmt;

use bson::{doc, Document};

use crate::models::{ORDERS_COLLECTION, POSTS_COLLECTION, USERS_COLLECTION};

/// Sort direction of an index key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexDirection {
    Ascending,
    Descending,
}

impl IndexDirection {
    /// Value MongoDB uses for this direction in a key document.
    pub fn as_i32(self) -> i32 {
        match self {
            IndexDirection::Ascending => 1,
            IndexDirection::Descending => -1,
        }
    }
}

/// A secondary index on one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub collection: &'static str,
    pub keys: Vec<(&'static str, IndexDirection)>,
    pub unique: bool,
}

impl IndexSpec {
    pub fn ascending(collection: &'static str, field: &'static str) -> Self {
        Self {
            collection,
            keys: vec![(field, IndexDirection::Ascending)],
            unique: false,
        }
    }

    pub fn descending(collection: &'static str, field: &'static str) -> Self {
        Self {
            collection,
            keys: vec![(field, IndexDirection::Descending)],
            unique: false,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Key document, e.g. `{ "createdAt": -1 }`.
    pub fn keys_document(&self) -> Document {
        let mut keys = doc! {};
        for (field, direction) in &self.keys {
            keys.insert(*field, direction.as_i32());
        }
        keys
    }

    /// Name the server assigns when none is given: `field_dir` pairs joined by `_`.
    pub fn name(&self) -> String {
        self.keys
            .iter()
            .map(|(field, direction)| format!("{}_{}", field, direction.as_i32()))
            .collect::<Vec<_>>()
            .join("_")
    }

    /// Field names covered by the index.
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.keys.iter().map(|(field, _)| *field)
    }
}

impl fmt::Display for IndexSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.collection, self.name())?;
        if self.unique {
            write!(f, " (unique)")?;
        }
        Ok(())
    }
}

/// Indexes created after seeding, in creation order.
pub fn standard_indexes() -> Vec<IndexSpec> {
    vec![
        IndexSpec::ascending(USERS_COLLECTION, "username").unique(),
        IndexSpec::ascending(USERS_COLLECTION, "email").unique(),
        IndexSpec::ascending(POSTS_COLLECTION, "userId"),
        IndexSpec::ascending(POSTS_COLLECTION, "status"),
        IndexSpec::descending(POSTS_COLLECTION, "createdAt"),
        IndexSpec::ascending(ORDERS_COLLECTION, "userId"),
        IndexSpec::ascending(ORDERS_COLLECTION, "status"),
        IndexSpec::descending(ORDERS_COLLECTION, "createdAt"),
    ]
}
