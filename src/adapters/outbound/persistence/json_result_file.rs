//! Reading and writing result files on the local filesystem.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Serializer, Value};
use tracing::info;

use crate::domain::{
    errors::{FinderError, FinderResult},
    models::{objects_from_value, Object},
};

const INDENT: &[u8] = b"    ";

/// Serialize with sorted keys and four-space indentation
pub fn to_pretty_json<T: Serialize>(value: &T) -> FinderResult<Vec<u8>> {
    // Round-tripping through Value orders object keys
    let value = serde_json::to_value(value)?;
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut serializer)?;
    buffer.push(b'\n');
    Ok(buffer)
}

/// Write `value` to `path`, creating parent directories
pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> FinderResult<()> {
    let bytes = to_pretty_json(value)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| FinderError::local_io(parent, e))?;
    }
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| FinderError::local_io(path, e))?;

    info!(path = %path.display(), "Wrote result file");
    Ok(())
}

pub async fn read_json(path: &Path) -> FinderResult<Value> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| FinderError::local_io(path, e))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Objects recorded in a result file, however it is wrapped
pub async fn load_objects(path: &Path) -> FinderResult<Vec<Object>> {
    let document = read_json(path).await?;
    objects_from_value(&document)
}

/// `<dir>/<stem>-downloads<ext>` next to `input`
pub fn downloads_path_for(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match input.extension() {
        Some(ext) => format!("{}-downloads.{}", stem, ext.to_string_lossy()),
        None => format!("{}-downloads", stem),
    };
    input.with_file_name(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pretty_json_sorts_keys_and_indents_four_spaces() {
        let bytes = to_pretty_json(&json!({ "b": 1, "a": { "d": 2, "c": 3 } })).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert_eq!(
            text,
            "{\n    \"a\": {\n        \"c\": 3,\n        \"d\": 2\n    },\n    \"b\": 1\n}\n"
        );
    }

    #[test]
    fn test_downloads_path() {
        assert_eq!(
            downloads_path_for(Path::new("/tmp/out/objects.json")),
            PathBuf::from("/tmp/out/objects-downloads.json")
        );
        assert_eq!(
            downloads_path_for(Path::new("objects")),
            PathBuf::from("objects-downloads")
        );
    }
}
