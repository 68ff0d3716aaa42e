//! Per-region collectors used by the listing commands.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::{lister::PaginatedFilteredLister, region_fanout::RegionCollector};
use crate::{
    domain::{
        errors::FinderResult,
        models::{Bucket, DateRange, Object},
        value_objects::NameMatcher,
    },
    ports::session::Session,
};

/// Buckets passing a name filter and creation-time range
pub struct BucketCollector {
    pub name_filter: NameMatcher,
    pub date_range: DateRange,
}

#[async_trait]
impl RegionCollector for BucketCollector {
    type Item = Bucket;

    async fn collect(&self, session: &Session) -> FinderResult<Vec<Bucket>> {
        PaginatedFilteredLister::new(session)
            .list_buckets(&self.name_filter, &self.date_range)
            .await
    }
}

/// Objects passing a leaf-name filter and modification-time range, inside
/// every bucket that passes the bucket filter and range
pub struct ObjectCollector {
    pub bucket_filter: NameMatcher,
    pub bucket_range: DateRange,
    pub object_filter: NameMatcher,
    pub object_range: DateRange,
}

#[async_trait]
impl RegionCollector for ObjectCollector {
    type Item = Object;

    async fn collect(&self, session: &Session) -> FinderResult<Vec<Object>> {
        let lister = PaginatedFilteredLister::new(session);
        let buckets = lister
            .list_buckets(&self.bucket_filter, &self.bucket_range)
            .await?;

        let mut objects = Vec::new();
        for bucket in buckets {
            let bucket = Arc::new(bucket);
            let found = lister
                .list_objects(&bucket, &self.object_filter, &self.object_range)
                .await?;
            info!(bucket = %bucket.name, found = found.len(), "Listed bucket");
            objects.extend(found);
        }
        Ok(objects)
    }
}
