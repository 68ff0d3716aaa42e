mod object_store;

pub use object_store::{
    BucketEntry, ListPage, ObjectEntry, ObjectStoreClient, BUCKETS_FIELD, CONTENTS_FIELD,
};
