pub mod session;
pub mod storage;

// Re-export all port traits for convenience
pub use session::{AwsAccount, Session, SessionProvider};
pub use storage::{BucketEntry, ListPage, ObjectEntry, ObjectStoreClient};
