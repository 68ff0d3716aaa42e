//! Persisted JSON envelope for discovery and download results.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use super::{Bucket, Object};
use crate::domain::errors::{FinderError, FinderResult};

pub const BUCKETS_KEY: &str = "s3_buckets";
pub const OBJECTS_KEY: &str = "s3_objects";
const RESULT_KEY: &str = "result";

/// `{datetime, args, result}` envelope written by every listing command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultFile<R> {
    pub datetime: Option<String>,
    pub args: Value,
    pub result: R,
}

impl<R> ResultFile<R> {
    /// Stamp a result with the current time
    pub fn now(args: Value, result: R) -> Self {
        Self {
            datetime: Some(Utc::now().to_rfc3339()),
            args,
            result,
        }
    }
}

/// Entities found by a listing command; absent sections are omitted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_buckets: Option<Vec<Bucket>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_objects: Option<Vec<Object>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_urls: Option<Vec<UrlRecord>>,
}

impl DiscoveryResult {
    pub fn buckets(buckets: Vec<Bucket>) -> Self {
        Self {
            s3_buckets: Some(buckets),
            ..Default::default()
        }
    }

    pub fn objects(objects: Vec<Object>) -> Self {
        Self {
            s3_objects: Some(objects),
            ..Default::default()
        }
    }

    pub fn urls(urls: Vec<UrlRecord>) -> Self {
        Self {
            s3_urls: Some(urls),
            ..Default::default()
        }
    }
}

/// A rendered object url with the object's modification time and size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlRecord {
    pub url: String,
    pub date: DateTime<Utc>,
    pub size: u64,
}

/// Summary written next to a result file after downloading its top entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadResult {
    pub input_count: usize,
    pub output_count: usize,
    pub s3_downloads: Vec<DownloadRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadRecord {
    pub filename: String,
    pub metadata: String,
}

/// Peel an optional `result` wrapper and then an optional `section` wrapper
/// off a JSON document, leaving whatever is underneath.
pub fn unwrap_envelope<'a>(document: &'a Value, section: &str) -> &'a Value {
    let mut data = document;
    if let Some(inner) = data.get(RESULT_KEY) {
        data = inner;
    }
    if let Some(inner) = data.get(section) {
        data = inner;
    }
    data
}

fn entities_from_value<T: DeserializeOwned>(document: &Value, section: &str) -> FinderResult<Vec<T>> {
    let data = unwrap_envelope(document, section);
    if !data.is_array() {
        return Err(FinderError::MalformedResultFile {
            detail: format!("expected a list of {} but found {}", section, kind_of(data)),
        });
    }
    Ok(serde_json::from_value(data.clone())?)
}

/// Read objects from a document that may or may not be wrapped in `result` / `s3_objects`
pub fn objects_from_value(document: &Value) -> FinderResult<Vec<Object>> {
    entities_from_value(document, OBJECTS_KEY)
}

/// Read buckets from a document that may or may not be wrapped in `result` / `s3_buckets`
pub fn buckets_from_value(document: &Value) -> FinderResult<Vec<Bucket>> {
    entities_from_value(document, BUCKETS_KEY)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
