use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::{errors::StorageResult, models::Bucket};

/// Field holding the entry list of a bucket page
pub const BUCKETS_FIELD: &str = "Buckets";
/// Field holding the entry list of an object page
pub const CONTENTS_FIELD: &str = "Contents";

/// Port for an authenticated object store client bound to one account/region.
///
/// Implementations apply their own transient-failure retry policy before
/// returning an error; callers never retry. Bucket listings are scoped to
/// the client's region. Object operations take the [`Bucket`] so they can
/// be addressed to the bucket's own region, and keys are passed through
/// exactly as listed.
#[async_trait]
pub trait ObjectStoreClient: Send + Sync + 'static {
    /// Fetch one page of buckets
    async fn list_buckets_page(&self, continuation_token: Option<&str>) -> StorageResult<ListPage>;

    /// Fetch one page of objects in a bucket
    async fn list_objects_page(
        &self,
        bucket: &Bucket,
        prefix: Option<&str>,
        continuation_token: Option<&str>,
    ) -> StorageResult<ListPage>;

    /// Find a bucket by exact name in any region
    async fn locate_bucket(&self, name: &str) -> StorageResult<Option<BucketEntry>>;

    /// Modification time and size of a single object
    async fn head_object(&self, bucket: &Bucket, key: &str) -> StorageResult<ObjectEntry>;

    /// Download a whole object to a local file
    async fn get_to_file(&self, bucket: &Bucket, key: &str, local_path: &Path) -> StorageResult<()>;

    /// Upload a local file as a whole object
    async fn put_from_file(&self, bucket: &Bucket, key: &str, local_path: &Path) -> StorageResult<()>;

    async fn delete_object(&self, bucket: &Bucket, key: &str) -> StorageResult<()>;

    async fn create_bucket(&self, name: &str) -> StorageResult<()>;

    async fn delete_bucket(&self, name: &str) -> StorageResult<()>;
}

/// One page of a list call: the raw page document plus the marker for the next page
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage {
    pub body: Value,
    pub continuation_token: Option<String>,
}

impl ListPage {
    pub fn new(body: Value, continuation_token: Option<String>) -> Self {
        Self {
            body,
            continuation_token,
        }
    }

    pub fn buckets(entries: Vec<BucketEntry>, continuation_token: Option<String>) -> Self {
        Self::new(json!({ BUCKETS_FIELD: entries }), continuation_token)
    }

    pub fn objects(entries: Vec<ObjectEntry>, continuation_token: Option<String>) -> Self {
        Self::new(json!({ CONTENTS_FIELD: entries }), continuation_token)
    }

    /// A page with no entry collection at all
    pub fn empty(continuation_token: Option<String>) -> Self {
        Self::new(json!({}), continuation_token)
    }
}

/// Bucket entry as the store lists it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BucketEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_region: Option<String>,
    pub creation_date: DateTime<Utc>,
}

/// Object entry as the store lists it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectEntry {
    pub key: String,
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    pub size: u64,
}
