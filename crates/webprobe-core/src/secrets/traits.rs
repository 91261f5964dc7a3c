//! Core traits and types for secret and environment lookups

use thiserror::Error;

/// Errors that can occur during secret store operations
#[derive(Error, Debug)]
pub enum SecretStoreError {
    #[error("Store is read-only")]
    ReadOnly,

    #[error("Store error: {0}")]
    Other(String),
}

pub type SecretStoreResult<T> = Result<T, SecretStoreError>;

/// Key/value lookup used for credentials and environment-style settings
///
/// Settings resolution reads every environment variable through this trait,
/// so tests can swap the process environment for a `MemorySecretStore`.
pub trait SecretStore: Send + Sync {
    /// Human-readable name of this store
    fn name(&self) -> &str;

    /// Retrieve a value by key
    ///
    /// The key can be a provider name (e.g. "openai", mapped to its API key
    /// variable by stores that know the mapping) or a literal variable name.
    fn get(&self, key: &str) -> Option<String>;

    /// Store a value
    ///
    /// Returns `Err(SecretStoreError::ReadOnly)` if the store doesn't support writing.
    fn store(&self, key: &str, value: &str) -> SecretStoreResult<()>;

    /// Check if a value exists
    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}
