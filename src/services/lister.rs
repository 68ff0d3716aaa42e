//! Paginated, filtered enumeration of buckets and objects.

use std::{future::Future, sync::Arc};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info_span, Instrument, Span};

use crate::{
    domain::{
        errors::{FinderError, FinderResult, ListingContext, StorageResult},
        models::{leaf_of, Bucket, DateRange, Object},
        value_objects::NameMatcher,
    },
    ports::{
        session::Session,
        storage::{BucketEntry, ListPage, ObjectEntry, ObjectStoreClient, BUCKETS_FIELD, CONTENTS_FIELD},
    },
};

/// Drives a store's paged list calls and keeps the entries that pass a
/// [`NameMatcher`] and a [`DateRange`].
///
/// Each page is fetched with the continuation marker of the previous one
/// until a page arrives without a marker. A page without an entry
/// collection counts as empty. Retrying transient failures is left to the
/// client; a failed fetch ends the call and drops what had been gathered.
/// Results come back in store order; sort them once after every unit of
/// work is collected.
pub struct PaginatedFilteredLister {
    client: Arc<dyn ObjectStoreClient>,
    account: String,
    region: String,
    span: Span,
}

impl PaginatedFilteredLister {
    pub fn new(session: &Session) -> Self {
        let span = info_span!(
            "lister",
            account = %session.account.name,
            region = %session.account.region
        );
        Self::with_span(session, span)
    }

    /// Create a lister that logs under the given span
    pub fn with_span(session: &Session, span: Span) -> Self {
        Self {
            client: session.client.clone(),
            account: session.account.name.clone(),
            region: session.account.region.clone(),
            span,
        }
    }

    /// Buckets whose name matches and whose creation time is in range.
    ///
    /// Entries without a region are attributed to the session's region.
    pub async fn list_buckets(
        &self,
        name_filter: &NameMatcher,
        date_range: &DateRange,
    ) -> FinderResult<Vec<Bucket>> {
        let context = self.context("list_buckets", None, format!("{} in {}", name_filter, date_range));
        let client = self.client.clone();

        self.paginate(
            context,
            BUCKETS_FIELD,
            move |token| {
                let client = client.clone();
                async move { client.list_buckets_page(token.as_deref()).await }
            },
            |entry: BucketEntry| {
                if !name_filter.matches(&entry.name) || !date_range.in_range(entry.creation_date) {
                    return None;
                }
                let region = entry.bucket_region.unwrap_or_else(|| self.region.clone());
                Some(Bucket::new(entry.name, region, entry.creation_date))
            },
        )
        .instrument(self.span.clone())
        .await
    }

    /// Objects in `bucket` whose last path segment matches and whose
    /// modification time is in range. Directory markers are skipped.
    pub async fn list_objects(
        &self,
        bucket: &Arc<Bucket>,
        name_filter: &NameMatcher,
        date_range: &DateRange,
    ) -> FinderResult<Vec<Object>> {
        let context = self.context(
            "list_objects",
            Some(&bucket.name),
            format!("{} in {}", name_filter, date_range),
        );
        self.list_bucket_contents(bucket, None, context, |entry| {
            name_filter.matches(leaf_of(&entry.key)) && date_range.in_range(entry.last_modified)
        })
        .instrument(self.span.clone())
        .await
    }

    /// Every object in `bucket` under an optional key prefix
    pub async fn list_objects_with_prefix(
        &self,
        bucket: &Arc<Bucket>,
        prefix: Option<&str>,
    ) -> FinderResult<Vec<Object>> {
        let context = self.context(
            "list_objects_with_prefix",
            Some(&bucket.name),
            format!("prefix '{}'", prefix.unwrap_or_default()),
        );
        self.list_bucket_contents(bucket, prefix, context, |_| true)
            .instrument(self.span.clone())
            .await
    }

    /// The bucket with exactly this name, in whatever region it lives,
    /// if its creation time is in range
    pub async fn get_bucket(&self, name: &str, date_range: &DateRange) -> FinderResult<Bucket> {
        let context = self.context("get_bucket", Some(name), format!("exact '{}' in {}", name, date_range));
        let entry = match self.client.locate_bucket(name).instrument(self.span.clone()).await {
            Ok(entry) => entry,
            Err(source) => {
                error!(%context, error = %source, "Bucket lookup failed");
                return Err(FinderError::ListingFailed { context, source });
            }
        };

        entry
            .filter(|entry| date_range.in_range(entry.creation_date))
            .map(|entry| {
                let region = entry.bucket_region.unwrap_or_else(|| self.region.clone());
                Bucket::new(entry.name, region, entry.creation_date)
            })
            .ok_or_else(|| FinderError::BucketNotFound {
                name: name.to_string(),
            })
    }

    /// A single object looked up by key
    pub async fn get_object(&self, bucket: &Arc<Bucket>, key: &str) -> FinderResult<Object> {
        let entry = self.client.head_object(bucket, key).await?;
        Ok(Object::new(bucket.clone(), key, entry.last_modified, entry.size))
    }

    async fn list_bucket_contents<F>(
        &self,
        bucket: &Arc<Bucket>,
        prefix: Option<&str>,
        context: ListingContext,
        keep: F,
    ) -> FinderResult<Vec<Object>>
    where
        F: Fn(&ObjectEntry) -> bool,
    {
        let client = self.client.clone();
        let target = bucket.clone();
        let prefix = prefix.map(str::to_string);

        self.paginate(
            context,
            CONTENTS_FIELD,
            move |token| {
                let client = client.clone();
                let target = target.clone();
                let prefix = prefix.clone();
                async move {
                    client
                        .list_objects_page(&target, prefix.as_deref(), token.as_deref())
                        .await
                }
            },
            |entry: ObjectEntry| {
                if entry.key.is_empty() || entry.key.ends_with('/') || !keep(&entry) {
                    return None;
                }
                Some(Object::new(
                    bucket.clone(),
                    &entry.key,
                    entry.last_modified,
                    entry.size,
                ))
            },
        )
        .await
    }

    async fn paginate<E, T, Fetch, Fut, Accept>(
        &self,
        context: ListingContext,
        field: &'static str,
        mut fetch: Fetch,
        mut accept: Accept,
    ) -> FinderResult<Vec<T>>
    where
        E: DeserializeOwned,
        Fetch: FnMut(Option<String>) -> Fut,
        Fut: Future<Output = StorageResult<ListPage>>,
        Accept: FnMut(E) -> Option<T>,
    {
        let mut results = Vec::new();
        let mut continuation_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = match fetch(continuation_token.take()).await {
                Ok(page) => page,
                Err(source) => {
                    error!(
                        %context,
                        error = %source,
                        discarded = results.len(),
                        "Page fetch failed"
                    );
                    return Err(FinderError::ListingFailed { context, source });
                }
            };
            pages += 1;

            let entries: Vec<E> = parse_entries(context.operation, &page.body, field)?;
            let seen = entries.len();
            let before = results.len();
            results.extend(entries.into_iter().filter_map(&mut accept));

            debug!(
                operation = context.operation,
                page = pages,
                entries = seen,
                matched = results.len() - before,
                "Fetched page"
            );

            match page.continuation_token.filter(|token| !token.is_empty()) {
                Some(next) => continuation_token = Some(next),
                None => break,
            }
        }

        debug!(
            operation = context.operation,
            pages,
            matched = results.len(),
            "Listing complete"
        );
        Ok(results)
    }

    fn context(&self, operation: &'static str, bucket: Option<&str>, filter: String) -> ListingContext {
        ListingContext {
            operation,
            account: self.account.clone(),
            region: self.region.clone(),
            bucket: bucket.map(str::to_string),
            filter,
        }
    }
}

/// Pull the entry collection out of a page.
///
/// A missing or null collection is an empty page; anything present but not
/// shaped like a list of entries is a malformed response.
fn parse_entries<E: DeserializeOwned>(
    operation: &'static str,
    body: &Value,
    field: &str,
) -> FinderResult<Vec<E>> {
    let malformed = |detail: String| {
        let raw = body.to_string();
        error!(operation, field, raw = %raw, detail = %detail, "Malformed list page");
        FinderError::MalformedResponse {
            operation,
            detail,
            raw,
        }
    };

    if !body.is_object() {
        return Err(malformed("page is not a JSON object".to_string()));
    }

    match body.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(entries) => serde_json::from_value(entries.clone())
            .map_err(|e| malformed(format!("'{}' field: {}", field, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_or_null_collection_is_empty() {
        let entries: Vec<BucketEntry> =
            parse_entries("list_buckets", &json!({}), BUCKETS_FIELD).unwrap();
        assert!(entries.is_empty());

        let entries: Vec<ObjectEntry> =
            parse_entries("list_objects", &json!({ "Contents": null }), CONTENTS_FIELD).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_wrong_shape_is_malformed() {
        let body = json!({ "Contents": "not-a-list" });
        let err = parse_entries::<ObjectEntry>("list_objects", &body, CONTENTS_FIELD).unwrap_err();

        match err {
            FinderError::MalformedResponse { operation, raw, .. } => {
                assert_eq!(operation, "list_objects");
                assert!(raw.contains("not-a-list"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let body = json!([1, 2, 3]);
        assert!(matches!(
            parse_entries::<ObjectEntry>("list_objects", &body, CONTENTS_FIELD),
            Err(FinderError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_entry_missing_required_field_is_malformed() {
        let body = json!({ "Buckets": [{ "Name": "bkt" }] });

        assert!(matches!(
            parse_entries::<BucketEntry>("list_buckets", &body, BUCKETS_FIELD),
            Err(FinderError::MalformedResponse { .. })
        ));
    }
}
