//! Configuration loading, secret resolution and startup validation.

pub mod config;
pub mod vault;

pub use config::{Config, StoreBackend};
pub use vault::{EnvVaultProvider, Secret, VaultProvider};
