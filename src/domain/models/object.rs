use std::{cmp::Ordering, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Bucket;

/// An object discovered inside a bucket
///
/// The key is held as its `/`-separated segments; the bucket is shared
/// between every object listed from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Object {
    pub bucket: Arc<Bucket>,
    #[serde(rename = "full_path")]
    pub path_segments: Vec<String>,
    pub modified: DateTime<Utc>,
    #[serde(default)]
    pub size: u64,
}

impl Object {
    pub fn new(bucket: Arc<Bucket>, key: &str, modified: DateTime<Utc>, size: u64) -> Self {
        Self {
            bucket,
            path_segments: split_key(key),
            modified,
            size,
        }
    }

    /// The object key, segments joined by `/`
    pub fn full_key(&self) -> String {
        self.path_segments.join("/")
    }

    /// Last path segment; this is what name filters are applied to
    pub fn leaf_name(&self) -> &str {
        self.path_segments.last().map(String::as_str).unwrap_or_default()
    }

    /// `bucket.key.with.dots` form used for flat local file names
    pub fn fully_qualified_name(&self) -> String {
        format!("{}/{}", self.bucket.name, self.full_key()).replace('/', ".")
    }
}

/// Split a key on `/` into its path segments
pub fn split_key(key: &str) -> Vec<String> {
    key.split('/').map(str::to_string).collect()
}

/// Last `/`-separated segment of a key
pub fn leaf_of(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Ascending by `(modified, full_key, size)`; remaining ties fall back to the bucket
impl Ord for Object {
    fn cmp(&self, other: &Self) -> Ordering {
        self.modified
            .cmp(&other.modified)
            .then_with(|| self.path_segments.join("/").cmp(&other.path_segments.join("/")))
            .then_with(|| self.size.cmp(&other.size))
            .then_with(|| self.bucket.cmp(&other.bucket))
    }
}

impl PartialOrd for Object {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} ({} bytes, modified {})",
            self.bucket.name,
            self.full_key(),
            self.size,
            self.modified.to_rfc3339()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bucket() -> Arc<Bucket> {
        Arc::new(Bucket::new(
            "bkt",
            "us-east-1",
            Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn test_key_segments() {
        let modified = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let object = Object::new(bucket(), "a/b/c.txt", modified, 3);

        assert_eq!(object.path_segments, vec!["a", "b", "c.txt"]);
        assert_eq!(object.full_key(), "a/b/c.txt");
        assert_eq!(object.leaf_name(), "c.txt");
        assert_eq!(object.fully_qualified_name(), "bkt.a.b.c.txt");
        assert_eq!(leaf_of("a/b/c.txt"), "c.txt");
        assert_eq!(leaf_of("plain"), "plain");
    }

    #[test]
    fn test_size_breaks_full_ties() {
        let modified = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let large = Object::new(bucket(), "a/b.txt", modified, 20);
        let small = Object::new(bucket(), "a/b.txt", modified, 10);

        let mut objects = vec![large, small];
        objects.sort();

        assert_eq!(objects[0].size, 10);
        assert_eq!(objects[1].size, 20);
    }

    #[test]
    fn test_key_breaks_time_ties() {
        let modified = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let b = Object::new(bucket(), "b.txt", modified, 1);
        let a = Object::new(bucket(), "a.txt", modified, 100);

        assert!(a < b);
    }

    #[test]
    fn test_json_round_trip() {
        let modified = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let object = Object::new(bucket(), "logs/app.log", modified, 42);

        let json = serde_json::to_value(&object).unwrap();
        assert_eq!(json["full_path"], serde_json::json!(["logs", "app.log"]));
        assert_eq!(json["bucket"]["name"], "bkt");
        assert_eq!(json["modified"], "2024-05-06T07:08:09Z");
        assert_eq!(json["size"], 42);

        let back: Object = serde_json::from_value(json).unwrap();
        assert_eq!(back, object);
    }

    #[test]
    fn test_missing_size_defaults_to_zero() {
        let json = serde_json::json!({
            "bucket": {"name": "bkt", "region": "us-east-1", "created": "2023-01-01T00:00:00Z"},
            "full_path": ["k"],
            "modified": "2024-01-01T00:00:00+00:00"
        });

        let object: Object = serde_json::from_value(json).unwrap();
        assert_eq!(object.size, 0);
        assert_eq!(object.full_key(), "k");
    }
}
