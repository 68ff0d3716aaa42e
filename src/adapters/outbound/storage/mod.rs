// SDK and object_store error conversions
pub mod error;

// Store client implementations
pub mod in_memory;
pub mod s3;
pub mod transfer;

pub use in_memory::{InMemoryStoreBuilder, InMemoryStoreClient};
pub use s3::AwsS3Client;
