use std::fmt;

use uuid::Uuid;

use super::error::StorageError;

/// A validated, flat on-disk name for one uploaded blob.
///
/// Generated keys have the form `{account_id}_{uuid}_{filename}`. The UUIDv7
/// segment makes every key unique without relying on wall-clock precision.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    /// Compose a fresh key for an upload owned by `account_id`.
    ///
    /// `filename` must already be sanitized; it is validated again here.
    pub fn generate(account_id: i32, filename: &str) -> Result<Self, StorageError> {
        let id = Uuid::now_v7().simple();
        Self::parse(format!("{account_id}_{id}_{filename}"))
    }

    /// Validate an existing key, e.g. one read back from the database.
    pub fn parse(key: impl Into<String>) -> Result<Self, StorageError> {
        let key = key.into();

        if key.is_empty() {
            return Err(StorageError::InvalidKey("key is empty".into()));
        }
        if key == "." || key == ".." || key.starts_with('.') {
            return Err(StorageError::InvalidKey(format!("{key:?} starts with '.'")));
        }
        if key
            .chars()
            .any(|c| c == '/' || c == '\\' || c == '\0' || c.is_ascii_control())
        {
            return Err(StorageError::InvalidKey(format!(
                "{key:?} contains a path separator or control character"
            )));
        }

        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StorageKey({})", self.0)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
