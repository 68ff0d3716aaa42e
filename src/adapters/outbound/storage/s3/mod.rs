//! AWS-backed store client.
//!
//! Listing, lookups, bucket management and whole-object transfers all go
//! through `aws-sdk-s3`, one client per region a bucket lives in.

mod aws_client;

pub use aws_client::AwsS3Client;
