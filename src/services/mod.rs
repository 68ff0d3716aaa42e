pub mod aggregation;
mod collectors;
mod lister;
mod region_fanout;
mod transfer_service;
mod url_formatter;

pub use aggregation::{most_recent_first, sorted, top_n};
pub use collectors::{BucketCollector, ObjectCollector};
pub use lister::PaginatedFilteredLister;
pub use region_fanout::{
    split_regions, FanoutPolicy, FanoutReport, RegionCollector, RegionFailure, RegionFanout,
};
pub use transfer_service::{TransferService, TransferSummary};
pub use url_formatter::{ToUrl, UrlFormatter};
