use async_trait::async_trait;

use super::error::StorageError;
use super::key::StorageKey;

/// Key-addressed blob storage for uploaded files.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under `key`. Fails with `AlreadyExists` rather than
    /// overwriting another blob.
    async fn put(&self, key: &StorageKey, data: &[u8]) -> Result<(), StorageError>;

    /// Retrieve all bytes stored under `key`.
    async fn get(&self, key: &StorageKey) -> Result<Vec<u8>, StorageError>;

    /// Check whether a blob exists.
    async fn exists(&self, key: &StorageKey) -> Result<bool, StorageError>;

    /// Delete a blob.
    ///
    /// Returns `true` if the blob was deleted, `false` if it did not exist.
    async fn delete(&self, key: &StorageKey) -> Result<bool, StorageError>;
}
