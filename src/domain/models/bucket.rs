use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bucket discovered in one region of the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bucket {
    pub name: String,
    pub region: String,
    pub created: DateTime<Utc>,
}

impl Bucket {
    pub fn new(name: impl Into<String>, region: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            created,
        }
    }
}

/// Oldest first; equal creation times fall back to name, then region
impl Ord for Bucket {
    fn cmp(&self, other: &Self) -> Ordering {
        self.created
            .cmp(&other.created)
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.region.cmp(&other.region))
    }
}

impl PartialOrd for Bucket {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}, created {})", self.name, self.region, self.created.to_rfc3339())
    }
}
