//! Secret and environment lookups
//!
//! Credentials and environment-style settings are read through the
//! `SecretStore` trait:
//! - `EnvSecretStore`: the process environment, with provider -> API key mapping
//! - `MemorySecretStore`: explicit overrides and test fixtures
//! - `ChainSecretStore`: ordered fallback across stores

mod traits;
mod env_store;
mod memory_store;
mod chain_store;

pub use traits::{SecretStore, SecretStoreError, SecretStoreResult};
pub use env_store::EnvSecretStore;
pub use memory_store::MemorySecretStore;
pub use chain_store::ChainSecretStore;
