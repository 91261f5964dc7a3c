//! Chained store with fallback behavior

use std::sync::Arc;

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};

/// A store that chains multiple stores together
///
/// Reads try each store in order and return the first match. Writes go to
/// the first store.
///
/// # Example
///
/// ```
/// use webprobe_core::secrets::{SecretStore, ChainSecretStore, EnvSecretStore, MemorySecretStore};
/// use std::sync::Arc;
///
/// let overrides = Arc::new(MemorySecretStore::new());
/// let chain = ChainSecretStore::new(vec![overrides.clone(), Arc::new(EnvSecretStore::new())]);
///
/// chain.store("openai", "sk-cli").unwrap();
/// assert_eq!(chain.get("openai"), Some("sk-cli".to_string()));
/// ```
pub struct ChainSecretStore {
    stores: Vec<Arc<dyn SecretStore>>,
}

impl ChainSecretStore {
    pub fn new(stores: Vec<Arc<dyn SecretStore>>) -> Self {
        Self { stores }
    }

    /// Explicit overrides first, then the process environment
    pub fn overrides_then_env(overrides: Arc<dyn SecretStore>) -> Self {
        Self::new(vec![overrides, Arc::new(super::EnvSecretStore::new())])
    }
}

impl SecretStore for ChainSecretStore {
    fn name(&self) -> &str {
        "chain"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.stores.iter().find_map(|store| store.get(key))
    }

    fn store(&self, key: &str, value: &str) -> SecretStoreResult<()> {
        match self.stores.first() {
            Some(store) => store.store(key, value),
            None => Err(SecretStoreError::Other("chain has no stores".to_string())),
        }
    }
}

impl std::fmt::Debug for ChainSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.stores.iter().map(|s| s.name()).collect();
        f.debug_struct("ChainSecretStore")
            .field("stores", &names)
            .finish()
    }
}
