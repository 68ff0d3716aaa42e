use std::path::PathBuf;

use thiserror::Error as ThisError;

use super::{StorageError, ValidationError};

/// Where a listing call was pointed when it failed
#[derive(Debug, Clone, PartialEq)]
pub struct ListingContext {
    pub operation: &'static str,
    pub account: String,
    pub region: String,
    pub bucket: Option<String>,
    pub filter: String,
}

impl std::fmt::Display for ListingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} account={} region={}",
            self.operation, self.account, self.region
        )?;
        if let Some(bucket) = &self.bucket {
            write!(f, " bucket={}", bucket)?;
        }
        write!(f, " filter={}", self.filter)
    }
}

/// Errors surfaced by the enumeration and transfer layer
#[derive(Debug, ThisError)]
pub enum FinderError {
    /// A page was returned but its entry collection had the wrong shape
    #[error("Malformed {operation} response: {detail}")]
    MalformedResponse {
        operation: &'static str,
        detail: String,
        raw: String,
    },

    /// A page fetch failed after the client exhausted its retries
    #[error("Listing failed ({context}): {source}")]
    ListingFailed {
        context: ListingContext,
        #[source]
        source: StorageError,
    },

    /// Session or credential setup failed for a profile/region/role
    #[error("Unable to acquire session for profile '{profile}' (region: {}, role: {}): {message}",
        .region.as_deref().unwrap_or("default"),
        .role.as_deref().unwrap_or("none"))]
    AcquisitionFailed {
        profile: String,
        region: Option<String>,
        role: Option<String>,
        message: String,
    },

    /// Exact bucket lookup found nothing
    #[error("Bucket not found: {name}")]
    BucketNotFound { name: String },

    /// Reading or writing a local file failed
    #[error("IO error on {}: {source}", .path.display())]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A persisted result file did not hold the expected entity list
    #[error("Malformed result file: {detail}")]
    MalformedResultFile { detail: String },

    /// Interactive login subprocess failed
    #[error("Login failed for profile '{profile}': {message}")]
    LoginFailed { profile: String, message: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl FinderError {
    pub fn local_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FinderError::LocalIo {
            path: path.into(),
            source,
        }
    }
}

/// Result type for finder operations
pub type FinderResult<T> = Result<T, FinderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_context_display() {
        let context = ListingContext {
            operation: "list_objects",
            account: "dev.us-east-1".to_string(),
            region: "us-east-1".to_string(),
            bucket: Some("logs".to_string()),
            filter: "like 'app'".to_string(),
        };

        assert_eq!(
            context.to_string(),
            "list_objects account=dev.us-east-1 region=us-east-1 bucket=logs filter=like 'app'"
        );
    }

    #[test]
    fn test_acquisition_failed_message_defaults() {
        let err = FinderError::AcquisitionFailed {
            profile: "dev".to_string(),
            region: None,
            role: None,
            message: "no credentials".to_string(),
        };

        assert_eq!(
            err.to_string(),
            "Unable to acquire session for profile 'dev' (region: default, role: none): no credentials"
        );
    }
}
