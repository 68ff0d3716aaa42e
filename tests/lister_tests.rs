use chrono::{DateTime, TimeZone, Utc};
use s3_finder::{
    AwsAccount, Bucket, BucketEntry, DateRange, FinderError, InMemoryStoreClient, ListPage,
    NameMatcher, ObjectEntry, PaginatedFilteredLister, Session, StorageError,
};
use serde_json::json;
use std::sync::Arc;

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, d, 12, 0, 0).unwrap()
}

fn session_for(client: &InMemoryStoreClient) -> Session {
    Session {
        account: AwsAccount {
            name: "dev.us-east-1".to_string(),
            region: client.region().to_string(),
            id: "123456789012".to_string(),
        },
        client: Arc::new(client.clone()),
    }
}

fn any() -> NameMatcher {
    NameMatcher::like(".*").unwrap()
}

fn bucket(name: &str) -> Arc<Bucket> {
    Arc::new(Bucket::new(name, "us-east-1", day(1)))
}

#[tokio::test]
async fn test_pagination_follows_markers_until_exhausted() {
    let client = InMemoryStoreClient::builder("us-east-1")
        .page_size(2)
        .bucket("alpha", day(1))
        .bucket("bravo", day(2))
        .bucket("charlie", day(3))
        .bucket("delta", day(4))
        .bucket("echo", day(5))
        .build()
        .await
        .unwrap();
    let lister = PaginatedFilteredLister::new(&session_for(&client));

    let buckets = lister.list_buckets(&any(), &DateRange::unbounded()).await.unwrap();

    assert_eq!(buckets.len(), 5);
    assert_eq!(client.bucket_page_requests().await, 3);
}

#[tokio::test]
async fn test_scripted_object_pages_are_concatenated() {
    let entry = |key: &str, d: u32| ObjectEntry {
        key: key.to_string(),
        last_modified: day(d),
        size: 1,
    };
    let client = InMemoryStoreClient::builder("us-east-1")
        .bucket("logs", day(1))
        .scripted_object_page(Ok(ListPage::objects(
            vec![entry("a", 1), entry("b", 2)],
            Some("t1".to_string()),
        )))
        .scripted_object_page(Ok(ListPage::objects(
            vec![entry("c", 3), entry("d", 4)],
            Some("t2".to_string()),
        )))
        .scripted_object_page(Ok(ListPage::objects(vec![entry("e", 5)], None)))
        .build()
        .await
        .unwrap();
    let lister = PaginatedFilteredLister::new(&session_for(&client));

    let objects = lister
        .list_objects(&bucket("logs"), &any(), &DateRange::unbounded())
        .await
        .unwrap();

    let keys: Vec<String> = objects.iter().map(|o| o.full_key()).collect();
    assert_eq!(keys, vec!["a", "b", "c", "d", "e"]);
    assert_eq!(client.object_page_requests().await, 3);
}

#[tokio::test]
async fn test_page_without_collection_is_empty() {
    let client = InMemoryStoreClient::builder("us-east-1")
        .scripted_bucket_page(Ok(ListPage::empty(None)))
        .scripted_object_page(Ok(ListPage::new(json!({ "Contents": null }), None)))
        .build()
        .await
        .unwrap();
    let lister = PaginatedFilteredLister::new(&session_for(&client));

    let buckets = lister.list_buckets(&any(), &DateRange::unbounded()).await.unwrap();
    let objects = lister
        .list_objects(&bucket("empty"), &any(), &DateRange::unbounded())
        .await
        .unwrap();

    assert!(buckets.is_empty());
    assert!(objects.is_empty());
}

#[tokio::test]
async fn test_malformed_page_is_reported_with_raw_content() {
    let client = InMemoryStoreClient::builder("us-east-1")
        .scripted_bucket_page(Ok(ListPage::new(
            json!({ "Buckets": { "Name": "not-a-list" } }),
            None,
        )))
        .build()
        .await
        .unwrap();
    let lister = PaginatedFilteredLister::new(&session_for(&client));

    let err = lister
        .list_buckets(&any(), &DateRange::unbounded())
        .await
        .unwrap_err();

    match err {
        FinderError::MalformedResponse { operation, raw, .. } => {
            assert_eq!(operation, "list_buckets");
            assert!(raw.contains("not-a-list"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(client.bucket_page_requests().await, 1);
}

#[tokio::test]
async fn test_transport_failure_discards_partial_results_and_carries_context() {
    let client = InMemoryStoreClient::builder("us-east-1")
        .bucket("logs", day(1))
        .scripted_object_page(Ok(ListPage::objects(
            vec![ObjectEntry {
                key: "app.log".to_string(),
                last_modified: day(2),
                size: 10,
            }],
            Some("next".to_string()),
        )))
        .scripted_object_page(Err(StorageError::transport(
            "list_objects_v2",
            "connection reset after retries",
        )))
        .build()
        .await
        .unwrap();
    let lister = PaginatedFilteredLister::new(&session_for(&client));
    let filter = NameMatcher::like("app").unwrap();

    let err = lister
        .list_objects(&bucket("logs"), &filter, &DateRange::unbounded())
        .await
        .unwrap_err();

    match err {
        FinderError::ListingFailed { context, source } => {
            assert_eq!(context.operation, "list_objects");
            assert_eq!(context.account, "dev.us-east-1");
            assert_eq!(context.region, "us-east-1");
            assert_eq!(context.bucket.as_deref(), Some("logs"));
            assert!(context.filter.contains("like 'app'"));
            assert!(matches!(source, StorageError::Transport { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_objects_are_filtered_on_leaf_name_and_inclusive_dates() {
    let client = InMemoryStoreClient::builder("us-east-1")
        .object("logs", "2024/app-server.log", day(10), 5)
        .object("logs", "2024/APP-worker.log", day(20), 5)
        .object("logs", "app/other.log", day(10), 5)
        .object("logs", "2024/app-late.log", day(25), 5)
        .object("logs", "app-dir/", day(10), 0)
        .build()
        .await
        .unwrap();
    let lister = PaginatedFilteredLister::new(&session_for(&client));
    let range = DateRange::between(day(10), day(20));

    let objects = lister
        .list_objects(&bucket("logs"), &NameMatcher::like("app").unwrap(), &range)
        .await
        .unwrap();

    let mut keys: Vec<String> = objects.iter().map(|o| o.full_key()).collect();
    keys.sort();
    assert_eq!(keys, vec!["2024/APP-worker.log", "2024/app-server.log"]);
}

#[tokio::test]
async fn test_bucket_without_region_takes_session_region() {
    let client = InMemoryStoreClient::builder("eu-west-1")
        .bucket_in("regionless", None, day(1))
        .bucket_in("placed", Some("eu-west-1"), day(1))
        .bucket_in("elsewhere", Some("eu-central-1"), day(1))
        .build()
        .await
        .unwrap();
    let lister = PaginatedFilteredLister::new(&session_for(&client));

    let mut buckets = lister.list_buckets(&any(), &DateRange::unbounded()).await.unwrap();
    buckets.sort_by(|a, b| a.name.cmp(&b.name));

    let names: Vec<&str> = buckets.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["placed", "regionless"]);
    assert!(buckets.iter().all(|b| b.region == "eu-west-1"));
}

#[tokio::test]
async fn test_get_bucket_finds_buckets_outside_session_region() {
    let client = InMemoryStoreClient::builder("us-east-1")
        .bucket_in("eu-data", Some("eu-west-1"), day(3))
        .object("eu-data", "exports/a.csv", day(4), 2)
        .build()
        .await
        .unwrap();
    let lister = PaginatedFilteredLister::new(&session_for(&client));

    let found = Arc::new(lister.get_bucket("eu-data", &DateRange::unbounded()).await.unwrap());
    assert_eq!(found.region, "eu-west-1");
    assert_eq!(found.created, day(3));

    let objects = lister.list_objects_with_prefix(&found, None).await.unwrap();
    assert_eq!(objects.len(), 1);

    assert!(matches!(
        lister.get_bucket("eu-data", &DateRange::new(Some(day(10)), None)).await,
        Err(FinderError::BucketNotFound { .. })
    ));
}

#[tokio::test]
async fn test_bucket_date_range_filters_on_creation() {
    let client = InMemoryStoreClient::builder("us-east-1")
        .scripted_bucket_page(Ok(ListPage::buckets(
            vec![
                BucketEntry {
                    name: "old".to_string(),
                    bucket_region: None,
                    creation_date: day(1),
                },
                BucketEntry {
                    name: "new".to_string(),
                    bucket_region: None,
                    creation_date: day(15),
                },
            ],
            None,
        )))
        .build()
        .await
        .unwrap();
    let lister = PaginatedFilteredLister::new(&session_for(&client));
    let range = DateRange::new(Some(day(15)), None);

    let buckets = lister.list_buckets(&any(), &range).await.unwrap();

    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].name, "new");
}

#[tokio::test]
async fn test_get_bucket_is_exact() {
    let client = InMemoryStoreClient::builder("us-east-1")
        .bucket("logs", day(1))
        .bucket("logs-archive", day(2))
        .build()
        .await
        .unwrap();
    let lister = PaginatedFilteredLister::new(&session_for(&client));

    let found = lister.get_bucket("logs", &DateRange::unbounded()).await.unwrap();
    assert_eq!(found.name, "logs");

    assert!(matches!(
        lister.get_bucket("log", &DateRange::unbounded()).await,
        Err(FinderError::BucketNotFound { name }) if name == "log"
    ));
}

#[tokio::test]
async fn test_prefix_listing_returns_everything_under_prefix() {
    let client = InMemoryStoreClient::builder("us-east-1")
        .page_size(1)
        .object("data", "raw/a.csv", day(1), 1)
        .object("data", "raw/b.csv", day(2), 1)
        .object("data", "clean/a.csv", day(3), 1)
        .build()
        .await
        .unwrap();
    let lister = PaginatedFilteredLister::new(&session_for(&client));

    let objects = lister
        .list_objects_with_prefix(&bucket("data"), Some("raw/"))
        .await
        .unwrap();

    let keys: Vec<String> = objects.iter().map(|o| o.full_key()).collect();
    assert_eq!(keys, vec!["raw/a.csv", "raw/b.csv"]);
    assert_eq!(client.object_page_requests().await, 2);
}

#[tokio::test]
async fn test_get_object_reads_metadata() {
    let client = InMemoryStoreClient::builder("us-east-1")
        .object("data", "raw/a.csv", day(4), 12)
        .build()
        .await
        .unwrap();
    let lister = PaginatedFilteredLister::new(&session_for(&client));

    let object = lister.get_object(&bucket("data"), "raw/a.csv").await.unwrap();
    assert_eq!(object.size, 12);
    assert_eq!(object.modified, day(4));
    assert_eq!(object.leaf_name(), "a.csv");

    assert!(matches!(
        lister.get_object(&bucket("data"), "missing").await,
        Err(FinderError::Storage(StorageError::NotFound { .. }))
    ));
}
