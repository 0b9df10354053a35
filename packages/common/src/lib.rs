pub mod storage;

pub use storage::{BlobStore, StorageError, StorageKey};
