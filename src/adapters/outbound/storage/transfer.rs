//! Whole-object transfers between a store and local files.

use std::path::Path;

use object_store::{path::Path as ObjectPath, ObjectStore, PutPayload};
use tracing::debug;

use crate::domain::errors::{StorageError, StorageResult};

fn io_error(path: &Path, err: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// Location of `key` inside an `object_store` backend.
///
/// The key is kept as a single percent-encoded segment, so every store key
/// (`~`, `%`, brackets, empty segments) maps to exactly one location.
pub fn object_path(key: &str) -> ObjectPath {
    ObjectPath::from_iter([key])
}

/// Write `data` to `local_path`, creating parent directories
pub async fn write_local(local_path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = local_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| io_error(parent, e))?;
    }
    tokio::fs::write(local_path, data)
        .await
        .map_err(|e| io_error(local_path, e))
}

pub async fn read_local(local_path: &Path) -> StorageResult<Vec<u8>> {
    tokio::fs::read(local_path)
        .await
        .map_err(|e| io_error(local_path, e))
}

/// Fetch `key` and write it to `local_path`
pub async fn download_to_file(
    store: &dyn ObjectStore,
    key: &str,
    local_path: &Path,
) -> StorageResult<u64> {
    let bytes = store.get(&object_path(key)).await?.bytes().await?;
    write_local(local_path, &bytes).await?;

    debug!(key, path = %local_path.display(), bytes = bytes.len(), "Downloaded object");
    Ok(bytes.len() as u64)
}

/// Read `local_path` and store it under `key`
pub async fn upload_from_file(
    store: &dyn ObjectStore,
    key: &str,
    local_path: &Path,
) -> StorageResult<u64> {
    let data = read_local(local_path).await?;
    let size = data.len() as u64;

    store.put(&object_path(key), PutPayload::from(data)).await?;

    debug!(key, path = %local_path.display(), bytes = size, "Uploaded object");
    Ok(size)
}

pub async fn delete(store: &dyn ObjectStore, key: &str) -> StorageResult<()> {
    store.delete(&object_path(key)).await?;
    Ok(())
}
