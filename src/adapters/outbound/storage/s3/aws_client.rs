use std::{collections::HashMap, path::Path};

use async_trait::async_trait;
use aws_sdk_s3::{
    config::Region,
    primitives::{ByteStream, DateTime as SmithyDateTime},
    types::{BucketLocationConstraint, CreateBucketConfiguration},
    Client,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::debug;

use crate::{
    adapters::outbound::storage::{error::from_sdk_error, transfer},
    domain::{
        errors::{StorageError, StorageResult},
        models::Bucket,
    },
    ports::storage::{
        BucketEntry, ListPage, ObjectEntry, ObjectStoreClient, BUCKETS_FIELD, CONTENTS_FIELD,
    },
};

/// Region that rejects an explicit location constraint on bucket creation
const US_EAST_1: &str = "us-east-1";

/// [`ObjectStoreClient`] backed by the AWS SDK.
///
/// Bucket listings use the session region. Object requests go to a client
/// for the bucket's own region, derived from the session client's config so
/// credentials, retry policy and endpoint overrides carry over. Keys are
/// sent exactly as listed.
pub struct AwsS3Client {
    client: Client,
    region: String,
    regional: RwLock<HashMap<String, Client>>,
}

impl AwsS3Client {
    pub fn new(client: Client, region: impl Into<String>) -> Self {
        Self {
            client,
            region: region.into(),
            regional: RwLock::new(HashMap::new()),
        }
    }

    /// SDK client addressing `region`, built on first use
    async fn client_for(&self, region: &str) -> Client {
        if region.is_empty() || region == self.region {
            return self.client.clone();
        }
        if let Some(client) = self.regional.read().await.get(region) {
            return client.clone();
        }

        let config = self
            .client
            .config()
            .to_builder()
            .region(Region::new(region.to_string()))
            .build();
        let client = Client::from_conf(config);
        debug!(region, "Built regional client");

        self.regional
            .write()
            .await
            .insert(region.to_string(), client.clone());
        client
    }
}

fn to_chrono(t: &SmithyDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(t.secs(), t.subsec_nanos())
}

#[async_trait]
impl ObjectStoreClient for AwsS3Client {
    async fn list_buckets_page(&self, continuation_token: Option<&str>) -> StorageResult<ListPage> {
        let output = self
            .client
            .list_buckets()
            .bucket_region(&self.region)
            .set_continuation_token(continuation_token.map(str::to_string))
            .send()
            .await
            .map_err(|e| from_sdk_error("list_buckets", &self.region, e))?;

        // Absent fields stay null so the lister can tell a bad entry apart
        let body = match output.buckets {
            None => json!({}),
            Some(buckets) => {
                let entries: Vec<Value> = buckets
                    .iter()
                    .map(|bucket| {
                        json!({
                            "Name": bucket.name(),
                            "BucketRegion": bucket.bucket_region(),
                            "CreationDate": bucket.creation_date().and_then(to_chrono),
                        })
                    })
                    .collect();
                json!({ BUCKETS_FIELD: entries })
            }
        };

        Ok(ListPage::new(body, output.continuation_token))
    }

    async fn list_objects_page(
        &self,
        bucket: &Bucket,
        prefix: Option<&str>,
        continuation_token: Option<&str>,
    ) -> StorageResult<ListPage> {
        let output = self
            .client_for(&bucket.region)
            .await
            .list_objects_v2()
            .bucket(&bucket.name)
            .set_prefix(prefix.map(str::to_string))
            .set_continuation_token(continuation_token.map(str::to_string))
            .send()
            .await
            .map_err(|e| from_sdk_error("list_objects_v2", &bucket.name, e))?;

        let body = match output.contents {
            None => json!({}),
            Some(contents) => {
                let entries: Vec<Value> = contents
                    .iter()
                    .map(|object| {
                        json!({
                            "Key": object.key(),
                            "LastModified": object.last_modified().and_then(to_chrono),
                            "Size": object.size().unwrap_or(0).max(0),
                        })
                    })
                    .collect();
                json!({ CONTENTS_FIELD: entries })
            }
        };

        let next = if output.is_truncated == Some(true) {
            output.next_continuation_token
        } else {
            None
        };
        Ok(ListPage::new(body, next))
    }

    async fn locate_bucket(&self, name: &str) -> StorageResult<Option<BucketEntry>> {
        let mut continuation_token: Option<String> = None;
        loop {
            let output = self
                .client
                .list_buckets()
                .prefix(name)
                .set_continuation_token(continuation_token.take())
                .send()
                .await
                .map_err(|e| from_sdk_error("list_buckets", name, e))?;

            if let Some(found) = output.buckets().iter().find(|b| b.name() == Some(name)) {
                let creation_date = found
                    .creation_date()
                    .and_then(to_chrono)
                    .ok_or_else(|| StorageError::backend(format!("No creation date for bucket {}", name)))?;
                return Ok(Some(BucketEntry {
                    name: name.to_string(),
                    bucket_region: found.bucket_region().map(str::to_string),
                    creation_date,
                }));
            }

            match output.continuation_token.filter(|t| !t.is_empty()) {
                Some(next) => continuation_token = Some(next),
                None => return Ok(None),
            }
        }
    }

    async fn head_object(&self, bucket: &Bucket, key: &str) -> StorageResult<ObjectEntry> {
        let resource = format!("{}/{}", bucket.name, key);
        let output = self
            .client_for(&bucket.region)
            .await
            .head_object()
            .bucket(&bucket.name)
            .key(key)
            .send()
            .await
            .map_err(|e| from_sdk_error("head_object", &resource, e))?;

        let last_modified = output
            .last_modified()
            .and_then(to_chrono)
            .ok_or_else(|| StorageError::backend(format!("No modification time for {}", resource)))?;

        Ok(ObjectEntry {
            key: key.to_string(),
            last_modified,
            size: output.content_length().unwrap_or(0).max(0) as u64,
        })
    }

    async fn get_to_file(&self, bucket: &Bucket, key: &str, local_path: &Path) -> StorageResult<()> {
        let resource = format!("{}/{}", bucket.name, key);
        let output = self
            .client_for(&bucket.region)
            .await
            .get_object()
            .bucket(&bucket.name)
            .key(key)
            .send()
            .await
            .map_err(|e| from_sdk_error("get_object", &resource, e))?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::transport("get_object", e.to_string()))?
            .into_bytes();
        transfer::write_local(local_path, &data).await?;

        debug!(object = %resource, path = %local_path.display(), bytes = data.len(), "Downloaded object");
        Ok(())
    }

    async fn put_from_file(&self, bucket: &Bucket, key: &str, local_path: &Path) -> StorageResult<()> {
        let resource = format!("{}/{}", bucket.name, key);
        let data = transfer::read_local(local_path).await?;
        let size = data.len();

        self.client_for(&bucket.region)
            .await
            .put_object()
            .bucket(&bucket.name)
            .key(key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| from_sdk_error("put_object", &resource, e))?;

        debug!(object = %resource, path = %local_path.display(), bytes = size, "Uploaded object");
        Ok(())
    }

    async fn delete_object(&self, bucket: &Bucket, key: &str) -> StorageResult<()> {
        let resource = format!("{}/{}", bucket.name, key);
        self.client_for(&bucket.region)
            .await
            .delete_object()
            .bucket(&bucket.name)
            .key(key)
            .send()
            .await
            .map_err(|e| from_sdk_error("delete_object", &resource, e))?;
        Ok(())
    }

    async fn create_bucket(&self, name: &str) -> StorageResult<()> {
        let mut request = self.client.create_bucket().bucket(name);
        if self.region != US_EAST_1 {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }

        request
            .send()
            .await
            .map_err(|e| from_sdk_error("create_bucket", name, e))?;
        Ok(())
    }

    async fn delete_bucket(&self, name: &str) -> StorageResult<()> {
        self.client
            .delete_bucket()
            .bucket(name)
            .send()
            .await
            .map_err(|e| from_sdk_error("delete_bucket", name, e))?;
        Ok(())
    }
}
