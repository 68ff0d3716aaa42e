use std::{
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use tracing::{debug, error, info, info_span, warn, Instrument, Span};

use super::{aggregation::top_n, lister::PaginatedFilteredLister};
use crate::{
    domain::{
        errors::{FinderError, FinderResult},
        models::{Bucket, DownloadRecord, DownloadResult, Object},
    },
    ports::{session::Session, storage::ObjectStoreClient},
};

/// Tally of a batch transfer; individual failures are logged, not raised
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferSummary {
    pub attempted: usize,
    pub succeeded: usize,
}

impl TransferSummary {
    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }
}

/// Whole-object downloads and uploads through a session's client
pub struct TransferService {
    client: Arc<dyn ObjectStoreClient>,
    span: Span,
}

impl TransferService {
    pub fn new(session: &Session) -> Self {
        let span = info_span!("transfer", account = %session.account.name);
        Self::with_span(session, span)
    }

    pub fn with_span(session: &Session, span: Span) -> Self {
        Self {
            client: session.client.clone(),
            span,
        }
    }

    /// Download the `top_count` most recent objects into `output_dir`, each
    /// named by its dotted fully qualified name.
    pub async fn download_top(
        &self,
        objects: Vec<Object>,
        top_count: usize,
        output_dir: &Path,
    ) -> DownloadResult {
        let input_count = objects.len();
        let selected = top_n(objects, top_count);

        async {
            info!(
                selected = selected.len(),
                input_count,
                dir = %output_dir.display(),
                "Downloading most recent objects"
            );

            let mut downloads = Vec::new();
            for object in &selected {
                let filename = object.fully_qualified_name();
                let path = output_dir.join(&filename);
                match self
                    .client
                    .get_to_file(&object.bucket, &object.full_key(), &path)
                    .await
                {
                    Ok(()) => {
                        debug!(object = %object, path = %path.display(), "Downloaded");
                        downloads.push(DownloadRecord {
                            filename,
                            metadata: object.to_string(),
                        });
                    }
                    Err(e) => {
                        error!(object = %object, path = %path.display(), error = %e, "Download failed")
                    }
                }
            }

            info!(
                downloaded = downloads.len(),
                selected = selected.len(),
                "Downloads complete"
            );
            DownloadResult {
                input_count,
                output_count: downloads.len(),
                s3_downloads: downloads,
            }
        }
        .instrument(self.span.clone())
        .await
    }

    /// Download every object under `prefix` in `bucket`, mirroring keys as
    /// relative paths under `output_dir`
    pub async fn download_prefix(
        &self,
        lister: &PaginatedFilteredLister,
        bucket: &Arc<Bucket>,
        prefix: Option<&str>,
        output_dir: &Path,
    ) -> FinderResult<TransferSummary> {
        let objects = lister.list_objects_with_prefix(bucket, prefix).await?;

        async {
            let mut summary = TransferSummary::default();
            for object in &objects {
                summary.attempted += 1;
                let key = object.full_key();
                let Some(path) = local_path_for(output_dir, &key) else {
                    warn!(bucket = %bucket.name, key, "Key escapes the output directory, skipping");
                    continue;
                };

                match self.client.get_to_file(bucket, &key, &path).await {
                    Ok(()) => summary.succeeded += 1,
                    Err(e) => error!(
                        bucket = %bucket.name,
                        key,
                        path = %path.display(),
                        error = %e,
                        "Download failed"
                    ),
                }
            }

            info!(
                downloaded = summary.succeeded,
                total = summary.attempted,
                dir = %output_dir.display(),
                "Bucket download complete"
            );
            Ok(summary)
        }
        .instrument(self.span.clone())
        .await
    }

    /// Upload each regular file directly inside `input_dir`, keyed by file name
    pub async fn upload_directory(&self, bucket: &Bucket, input_dir: &Path) -> FinderResult<TransferSummary> {
        let files = regular_files(input_dir).await?;

        async {
            let mut summary = TransferSummary::default();
            for (name, path) in &files {
                summary.attempted += 1;
                match self.client.put_from_file(bucket, name, path).await {
                    Ok(()) => summary.succeeded += 1,
                    Err(e) => error!(
                        bucket = %bucket.name,
                        key = %name,
                        path = %path.display(),
                        error = %e,
                        "Upload failed"
                    ),
                }
            }

            info!(
                uploaded = summary.succeeded,
                total = summary.attempted,
                dir = %input_dir.display(),
                bucket = %bucket.name,
                "Directory upload complete"
            );
            Ok(summary)
        }
        .instrument(self.span.clone())
        .await
    }
}

/// `output_dir/key`, unless the key would resolve outside `output_dir`
fn local_path_for(output_dir: &Path, key: &str) -> Option<PathBuf> {
    let relative = Path::new(key);
    let contained = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    contained.then(|| output_dir.join(relative))
}

/// Regular files (following symlinks) directly inside `dir`, sorted by name
async fn regular_files(dir: &Path) -> FinderResult<Vec<(String, PathBuf)>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| FinderError::local_io(dir, e))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| FinderError::local_io(dir, e))?
    {
        let path = entry.path();
        let is_file = tokio::fs::metadata(&path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if is_file {
            files.push((entry.file_name().to_string_lossy().into_owned(), path));
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_path_stays_inside_output_dir() {
        let dir = Path::new("/data/out");

        assert_eq!(
            local_path_for(dir, "logs/2024/app.log"),
            Some(PathBuf::from("/data/out/logs/2024/app.log"))
        );
        assert_eq!(local_path_for(dir, "../etc/passwd"), None);
        assert_eq!(local_path_for(dir, "/abs/key"), None);
    }

    #[test]
    fn test_summary_failed_count() {
        let summary = TransferSummary {
            attempted: 5,
            succeeded: 3,
        };
        assert_eq!(summary.failed(), 2);
    }
}
