use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

use crate::domain::errors::StorageError;

/// Codes S3 returns for throttling and transient server faults
const TRANSIENT_CODES: &[&str] = &[
    "SlowDown",
    "Throttling",
    "ThrottlingException",
    "RequestTimeout",
    "RequestTimeTooSkewed",
    "InternalError",
    "ServiceUnavailable",
];

/// Convert object_store errors to domain storage errors
impl From<object_store::Error> for StorageError {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { path, .. } => StorageError::NotFound { resource: path },
            object_store::Error::PermissionDenied { path, .. }
            | object_store::Error::Unauthenticated { path, .. } => StorageError::AccessDenied {
                operation: "transfer".to_string(),
                resource: path,
            },
            object_store::Error::Generic { store, source } => StorageError::Transport {
                operation: store.to_string(),
                message: source.to_string(),
            },
            other => StorageError::backend(other.to_string()),
        }
    }
}

/// Classify an SDK failure for `operation` on `resource`.
///
/// The SDK has already applied its retry policy by the time this runs, so
/// dispatch and timeout failures surface as transport errors as they are.
pub fn from_sdk_error<E, R>(operation: &str, resource: &str, err: SdkError<E, R>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(&err).to_string();

    match &err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            StorageError::transport(operation, message)
        }
        SdkError::ServiceError(service) => match service.err().code() {
            Some("AccessDenied" | "AllAccessDisabled" | "InvalidAccessKeyId" | "ExpiredToken") => {
                StorageError::AccessDenied {
                    operation: operation.to_string(),
                    resource: resource.to_string(),
                }
            }
            Some("NoSuchBucket" | "NoSuchKey" | "NotFound") => StorageError::NotFound {
                resource: resource.to_string(),
            },
            Some(code) if TRANSIENT_CODES.contains(&code) => StorageError::transport(operation, message),
            _ => StorageError::backend(message),
        },
        _ => StorageError::backend(message),
    }
}
