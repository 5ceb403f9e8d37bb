//! On-disk bitstream content, addressed by internal id.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Directory tree holding one file per stored bitstream.
///
/// Files are spread over two levels of subdirectories taken from the start of
/// the id, so `1a2b3c...` lives at `1a/2b/1a2b3c...`.
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, internal_id: Uuid) -> PathBuf {
        let id = internal_id.simple().to_string();
        self.root.join(&id[0..2]).join(&id[2..4]).join(id)
    }

    /// Writes the bytes under a fresh id and returns it.
    pub async fn store(&self, bytes: &[u8]) -> AppResult<Uuid> {
        let internal_id = Uuid::new_v4();
        let path = self.path_for(internal_id);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error("create asset directory", e))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| storage_error("write asset", e))?;

        tracing::debug!(%internal_id, size = bytes.len(), "Stored asset");
        Ok(internal_id)
    }

    /// Deletes the file. A file that is already gone is not an error.
    pub async fn discard(&self, internal_id: Uuid) -> AppResult<()> {
        match tokio::fs::remove_file(self.path_for(internal_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error("remove asset", e)),
        }
    }
}

fn storage_error(operation: &str, error: std::io::Error) -> AppError {
    AppError::Storage {
        operation: operation.to_string(),
        source: anyhow::Error::from(error),
    }
}
