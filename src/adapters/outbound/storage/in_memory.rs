use std::{
    collections::{BTreeMap, VecDeque},
    path::Path,
    sync::Arc,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use object_store::{memory::InMemory, ObjectStore, PutPayload};
use tokio::sync::RwLock;

use super::transfer;
use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        models::Bucket,
    },
    ports::storage::{BucketEntry, ListPage, ObjectEntry, ObjectStoreClient},
};

const DEFAULT_PAGE_SIZE: usize = 1000;

/// In-memory implementation of ObjectStoreClient for testing and development.
///
/// Listings are served from seeded data in pages of `page_size`, unless
/// scripted pages have been queued, in which case those are returned first
/// verbatim. Like S3, bucket listings only show buckets in the client's
/// region (or with no region), while object operations reject a bucket
/// addressed to the wrong region. Object bodies live in an `object_store`
/// [`InMemory`] per bucket.
#[derive(Clone)]
pub struct InMemoryStoreClient {
    region: String,
    page_size: usize,
    data: Arc<RwLock<StoreData>>,
}

#[derive(Default)]
struct StoreData {
    buckets: BTreeMap<String, StoredBucket>,
    scripted_bucket_pages: VecDeque<StorageResult<ListPage>>,
    scripted_object_pages: VecDeque<StorageResult<ListPage>>,
    bucket_page_requests: usize,
    object_page_requests: usize,
}

struct StoredBucket {
    region: Option<String>,
    created: DateTime<Utc>,
    entries: BTreeMap<String, ObjectEntry>,
    contents: Arc<InMemory>,
}

impl StoredBucket {
    fn new(region: Option<String>, created: DateTime<Utc>) -> Self {
        Self {
            region,
            created,
            entries: BTreeMap::new(),
            contents: Arc::new(InMemory::new()),
        }
    }

    fn entry(&self, name: &str) -> BucketEntry {
        BucketEntry {
            name: name.to_string(),
            bucket_region: self.region.clone(),
            creation_date: self.created,
        }
    }
}

/// Builder for seeding an [`InMemoryStoreClient`]
pub struct InMemoryStoreBuilder {
    region: String,
    page_size: usize,
    data: StoreData,
    seeded: Vec<(String, String, Vec<u8>)>,
}

impl InMemoryStoreBuilder {
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Add a bucket located in the client's region
    pub fn bucket(self, name: &str, created: DateTime<Utc>) -> Self {
        let region = self.region.clone();
        self.bucket_in(name, Some(&region), created)
    }

    /// Add a bucket with an explicit (or absent) region
    pub fn bucket_in(mut self, name: &str, region: Option<&str>, created: DateTime<Utc>) -> Self {
        self.data.buckets.insert(
            name.to_string(),
            StoredBucket::new(region.map(str::to_string), created),
        );
        self
    }

    /// Add an object whose body is `size` filler bytes; creates the bucket if needed
    pub fn object(self, bucket: &str, key: &str, modified: DateTime<Utc>, size: u64) -> Self {
        let body = vec![b'x'; size as usize];
        self.object_with_body(bucket, key, modified, body)
    }

    pub fn object_with_body(
        mut self,
        bucket: &str,
        key: &str,
        modified: DateTime<Utc>,
        body: Vec<u8>,
    ) -> Self {
        let region = Some(self.region.clone());
        let stored = self
            .data
            .buckets
            .entry(bucket.to_string())
            .or_insert_with(|| StoredBucket::new(region, modified));
        stored.entries.insert(
            key.to_string(),
            ObjectEntry {
                key: key.to_string(),
                last_modified: modified,
                size: body.len() as u64,
            },
        );
        self.seeded.push((bucket.to_string(), key.to_string(), body));
        self
    }

    /// Queue a raw page (or failure) to be returned by the next bucket listing call
    pub fn scripted_bucket_page(mut self, page: StorageResult<ListPage>) -> Self {
        self.data.scripted_bucket_pages.push_back(page);
        self
    }

    /// Queue a raw page (or failure) to be returned by the next object listing call
    pub fn scripted_object_page(mut self, page: StorageResult<ListPage>) -> Self {
        self.data.scripted_object_pages.push_back(page);
        self
    }

    pub async fn build(self) -> StorageResult<InMemoryStoreClient> {
        for (bucket, key, body) in self.seeded {
            if let Some(stored) = self.data.buckets.get(&bucket) {
                stored
                    .contents
                    .put(&transfer::object_path(&key), PutPayload::from(body))
                    .await?;
            }
        }

        Ok(InMemoryStoreClient {
            region: self.region,
            page_size: self.page_size,
            data: Arc::new(RwLock::new(self.data)),
        })
    }
}

impl InMemoryStoreClient {
    pub fn builder(region: impl Into<String>) -> InMemoryStoreBuilder {
        InMemoryStoreBuilder {
            region: region.into(),
            page_size: DEFAULT_PAGE_SIZE,
            data: StoreData::default(),
            seeded: Vec::new(),
        }
    }

    /// An empty store for `region`
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            page_size: DEFAULT_PAGE_SIZE,
            data: Arc::new(RwLock::new(StoreData::default())),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Number of bucket listing pages requested so far
    pub async fn bucket_page_requests(&self) -> usize {
        self.data.read().await.bucket_page_requests
    }

    /// Number of object listing pages requested so far
    pub async fn object_page_requests(&self) -> usize {
        self.data.read().await.object_page_requests
    }

    /// Keys currently stored in `bucket`, in key order
    pub async fn object_keys(&self, bucket: &str) -> Vec<String> {
        self.data
            .read()
            .await
            .buckets
            .get(bucket)
            .map(|stored| stored.entries.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn lives_here(&self, stored: &StoredBucket) -> bool {
        stored.region.as_deref().map_or(true, |r| r == self.region)
    }

    /// Body store of `bucket`, refusing requests addressed to another region
    async fn contents_of(&self, bucket: &Bucket) -> StorageResult<Arc<InMemory>> {
        let data = self.data.read().await;
        let stored = data.buckets.get(&bucket.name).ok_or_else(|| StorageError::NotFound {
            resource: bucket.name.clone(),
        })?;

        let actual = stored.region.as_deref().unwrap_or(&self.region);
        if actual != bucket.region {
            return Err(StorageError::backend(format!(
                "PermanentRedirect: bucket {} is in {}, not {}",
                bucket.name, actual, bucket.region
            )));
        }
        Ok(stored.contents.clone())
    }

    fn page_bounds(&self, total: usize, token: Option<&str>) -> StorageResult<(usize, usize, Option<String>)> {
        let start = match token {
            None => 0,
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| StorageError::backend(format!("Invalid continuation token: {}", token)))?,
        };
        let start = start.min(total);
        let end = (start + self.page_size).min(total);
        let next = (end < total).then(|| end.to_string());
        Ok((start, end, next))
    }
}

#[async_trait]
impl ObjectStoreClient for InMemoryStoreClient {
    async fn list_buckets_page(&self, continuation_token: Option<&str>) -> StorageResult<ListPage> {
        let mut data = self.data.write().await;
        data.bucket_page_requests += 1;

        if let Some(page) = data.scripted_bucket_pages.pop_front() {
            return page;
        }

        let visible: Vec<BucketEntry> = data
            .buckets
            .iter()
            .filter(|(_, stored)| self.lives_here(stored))
            .map(|(name, stored)| stored.entry(name))
            .collect();
        let (start, end, next) = self.page_bounds(visible.len(), continuation_token)?;
        let entries = visible[start..end].to_vec();

        Ok(ListPage::buckets(entries, next))
    }

    async fn list_objects_page(
        &self,
        bucket: &Bucket,
        prefix: Option<&str>,
        continuation_token: Option<&str>,
    ) -> StorageResult<ListPage> {
        {
            let mut data = self.data.write().await;
            data.object_page_requests += 1;
            if let Some(page) = data.scripted_object_pages.pop_front() {
                return page;
            }
        }
        self.contents_of(bucket).await?;

        let data = self.data.read().await;
        let stored = data.buckets.get(&bucket.name).ok_or_else(|| StorageError::NotFound {
            resource: bucket.name.clone(),
        })?;
        let matching: Vec<&ObjectEntry> = stored
            .entries
            .values()
            .filter(|entry| prefix.map_or(true, |p| entry.key.starts_with(p)))
            .collect();

        if matching.is_empty() && continuation_token.is_none() {
            // An empty listing carries no entry collection
            return Ok(ListPage::empty(None));
        }

        let (start, end, next) = self.page_bounds(matching.len(), continuation_token)?;
        let entries = matching[start..end].iter().map(|e| (*e).clone()).collect();

        Ok(ListPage::objects(entries, next))
    }

    async fn locate_bucket(&self, name: &str) -> StorageResult<Option<BucketEntry>> {
        let data = self.data.read().await;
        Ok(data.buckets.get(name).map(|stored| stored.entry(name)))
    }

    async fn head_object(&self, bucket: &Bucket, key: &str) -> StorageResult<ObjectEntry> {
        self.contents_of(bucket).await?;
        let data = self.data.read().await;
        data.buckets
            .get(&bucket.name)
            .and_then(|stored| stored.entries.get(key))
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                resource: format!("{}/{}", bucket.name, key),
            })
    }

    async fn get_to_file(&self, bucket: &Bucket, key: &str, local_path: &Path) -> StorageResult<()> {
        let contents = self.contents_of(bucket).await?;
        transfer::download_to_file(contents.as_ref(), key, local_path).await?;
        Ok(())
    }

    async fn put_from_file(&self, bucket: &Bucket, key: &str, local_path: &Path) -> StorageResult<()> {
        let contents = self.contents_of(bucket).await?;
        let size = transfer::upload_from_file(contents.as_ref(), key, local_path).await?;

        let mut data = self.data.write().await;
        if let Some(stored) = data.buckets.get_mut(&bucket.name) {
            stored.entries.insert(
                key.to_string(),
                ObjectEntry {
                    key: key.to_string(),
                    last_modified: Utc::now(),
                    size,
                },
            );
        }
        Ok(())
    }

    async fn delete_object(&self, bucket: &Bucket, key: &str) -> StorageResult<()> {
        let contents = self.contents_of(bucket).await?;
        transfer::delete(contents.as_ref(), key).await?;

        let mut data = self.data.write().await;
        if let Some(stored) = data.buckets.get_mut(&bucket.name) {
            stored.entries.remove(key);
        }
        Ok(())
    }

    async fn create_bucket(&self, name: &str) -> StorageResult<()> {
        let mut data = self.data.write().await;
        if data.buckets.contains_key(name) {
            return Err(StorageError::backend(format!(
                "BucketAlreadyOwnedByYou: {}",
                name
            )));
        }
        data.buckets.insert(
            name.to_string(),
            StoredBucket::new(Some(self.region.clone()), Utc::now()),
        );
        Ok(())
    }

    async fn delete_bucket(&self, name: &str) -> StorageResult<()> {
        let mut data = self.data.write().await;
        match data.buckets.get(name) {
            None => Err(StorageError::NotFound {
                resource: name.to_string(),
            }),
            Some(stored) if !stored.entries.is_empty() => Err(StorageError::backend(format!(
                "BucketNotEmpty: {}",
                name
            ))),
            Some(_) => {
                data.buckets.remove(name);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_seeded_buckets_are_paged() {
        let client = InMemoryStoreClient::builder("us-east-1")
            .page_size(2)
            .bucket("a", at(1))
            .bucket("b", at(2))
            .bucket("c", at(3))
            .build()
            .await
            .unwrap();

        let first = client.list_buckets_page(None).await.unwrap();
        assert_eq!(first.body["Buckets"].as_array().unwrap().len(), 2);
        assert_eq!(first.continuation_token.as_deref(), Some("2"));

        let second = client.list_buckets_page(Some("2")).await.unwrap();
        assert_eq!(second.body["Buckets"][0]["Name"], "c");
        assert!(second.continuation_token.is_none());
        assert_eq!(client.bucket_page_requests().await, 2);
    }

    #[tokio::test]
    async fn test_scripted_pages_take_precedence() {
        let client = InMemoryStoreClient::builder("us-east-1")
            .bucket("real", at(1))
            .scripted_bucket_page(Err(StorageError::transport("list_buckets", "reset")))
            .build()
            .await
            .unwrap();

        assert!(client.list_buckets_page(None).await.is_err());
        let page = client.list_buckets_page(None).await.unwrap();
        assert_eq!(page.body["Buckets"][0]["Name"], "real");
    }

    #[tokio::test]
    async fn test_empty_bucket_listing_has_no_contents_field() {
        let client = InMemoryStoreClient::builder("us-east-1")
            .bucket("empty", at(1))
            .build()
            .await
            .unwrap();

        let empty = Bucket::new("empty", "us-east-1", at(1));
        let page = client.list_objects_page(&empty, None, None).await.unwrap();
        assert!(page.body.get("Contents").is_none());
    }

    #[tokio::test]
    async fn test_listing_is_scoped_to_region_but_lookup_is_not() {
        let client = InMemoryStoreClient::builder("us-east-1")
            .bucket("home", at(1))
            .bucket_in("away", Some("eu-west-1"), at(2))
            .build()
            .await
            .unwrap();

        let page = client.list_buckets_page(None).await.unwrap();
        assert_eq!(page.body["Buckets"].as_array().unwrap().len(), 1);
        assert_eq!(page.body["Buckets"][0]["Name"], "home");

        let away = client.locate_bucket("away").await.unwrap().unwrap();
        assert_eq!(away.bucket_region.as_deref(), Some("eu-west-1"));
        assert!(client.locate_bucket("nowhere").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_object_requests_must_use_bucket_region() {
        let client = InMemoryStoreClient::builder("us-east-1")
            .bucket_in("away", Some("eu-west-1"), at(1))
            .object("away", "k", at(2), 3)
            .build()
            .await
            .unwrap();

        let wrong = Bucket::new("away", "us-east-1", at(1));
        assert!(matches!(
            client.head_object(&wrong, "k").await,
            Err(StorageError::Backend { .. })
        ));
        let right = Bucket::new("away", "eu-west-1", at(1));
        assert_eq!(client.head_object(&right, "k").await.unwrap().size, 3);
    }

    #[tokio::test]
    async fn test_delete_bucket_requires_empty() {
        let client = InMemoryStoreClient::builder("us-east-1")
            .object("bkt", "k", at(1), 3)
            .build()
            .await
            .unwrap();

        assert!(client.delete_bucket("bkt").await.is_err());
        client
            .delete_object(&Bucket::new("bkt", "us-east-1", at(1)), "k")
            .await
            .unwrap();
        client.delete_bucket("bkt").await.unwrap();
        assert!(matches!(
            client.delete_bucket("bkt").await,
            Err(StorageError::NotFound { .. })
        ));
    }
}
