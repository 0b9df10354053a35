use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::error::StorageError;
use super::key::StorageKey;
use super::traits::BlobStore;

/// Filesystem-backed blob store.
///
/// Blobs live directly under `{base_path}/{key}`. Writes are staged in
/// `{base_path}/.tmp` and renamed into place so readers never observe a
/// half-written file.
pub struct FilesystemBlobStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemBlobStore {
    /// Create a new filesystem blob store, creating its directories.
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Compute the filesystem path for a given key.
    pub fn blob_path(&self, key: &StorageKey) -> PathBuf {
        self.base_path.join(key.as_str())
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn put(&self, key: &StorageKey, data: &[u8]) -> Result<(), StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let blob_path = self.blob_path(key);
        if fs::try_exists(&blob_path).await? {
            return Err(StorageError::AlreadyExists(key.to_string()));
        }

        // The upload directory may have been removed since startup.
        fs::create_dir_all(self.base_path.join(".tmp")).await?;

        let temp_path = self.temp_path();
        let written = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(data).await?;
            file.flush().await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, &blob_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        tracing::debug!(key = %key, size = data.len(), "Stored blob");
        Ok(())
    }

    async fn get(&self, key: &StorageKey) -> Result<Vec<u8>, StorageError> {
        match fs::read(self.blob_path(key)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &StorageKey) -> Result<bool, StorageError> {
        Ok(fs::try_exists(self.blob_path(key)).await?)
    }

    async fn delete(&self, key: &StorageKey) -> Result<bool, StorageError> {
        match fs::remove_file(self.blob_path(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
