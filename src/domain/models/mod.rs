pub mod bucket;
pub mod date_range;
pub mod object;
pub mod result_file;

pub use bucket::Bucket;
pub use date_range::{parse_utc_datetime, DateRange};
pub use object::{leaf_of, split_key, Object};
pub use result_file::{
    buckets_from_value, objects_from_value, unwrap_envelope, DiscoveryResult, DownloadRecord,
    DownloadResult, ResultFile, UrlRecord,
};
