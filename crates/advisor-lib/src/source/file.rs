use std::path::{Path, PathBuf};

use tracing::debug;

use super::{async_trait, SnapshotSource, SourceError};
use crate::models::ClusterSnapshot;

/// Reads a snapshot previously written by `write_snapshot`
#[derive(Debug, Clone)]
pub struct FileSnapshotSource {
    path: PathBuf,
}

impl FileSnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotSource for FileSnapshotSource {
    async fn fetch(&self) -> Result<ClusterSnapshot, SourceError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })?;

        let snapshot: ClusterSnapshot =
            serde_json::from_str(&content).map_err(|source| SourceError::Decode {
                path: self.path.clone(),
                source,
            })?;

        debug!(
            path = %self.path.display(),
            bytes = content.len(),
            "Read snapshot file"
        );
        Ok(snapshot)
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

/// Write `snapshot` as pretty-printed JSON
pub async fn write_snapshot(path: &Path, snapshot: &ClusterSnapshot) -> Result<(), SourceError> {
    let json = serde_json::to_string_pretty(snapshot)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })
}
