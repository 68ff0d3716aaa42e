pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types - entities, filters and errors
pub use domain::{
    Bucket, DateRange, DiscoveryResult, DownloadRecord, DownloadResult, FinderError, FinderResult,
    ListingContext, NameMatcher, Object, Placeholder, ResultFile, StorageError, StorageResult,
    UrlRecord, UrlTemplate, ValidationError,
};

// Port types - interfaces for external systems
pub use ports::{
    session::{AwsAccount, Session, SessionProvider},
    storage::{BucketEntry, ListPage, ObjectEntry, ObjectStoreClient},
};

// Services - enumeration, fan-out, formatting and transfers
pub use services::{
    BucketCollector, FanoutPolicy, FanoutReport, ObjectCollector, PaginatedFilteredLister,
    RegionCollector, RegionFanout, ToUrl, TransferService, TransferSummary, UrlFormatter,
};

// Application factory and configuration
pub use app::{create_aws_app, AppBuilder, FinderApp, FinderConfig, SessionBackend};

// Adapter types - infrastructure implementations
pub use adapters::outbound::{
    session::{AwsSessionProvider, SsoLogin, StaticSessionProvider},
    storage::{AwsS3Client, InMemoryStoreClient},
};
