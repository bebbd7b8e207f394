mod env;
mod types;

#[cfg(test)]
mod tests;

pub use types::*;

use std::path::Path;

use anyhow::{Context, bail};

use crate::vault::{Secret, VaultProvider};

/// Vault key of the embedding provider's API key.
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str::<Self>(&content)
                .with_context(|| format!("failed to parse config file {}", path.display()))?
        } else {
            tracing::debug!("config file {} not found, using defaults", path.display());
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Resolve API keys through the vault. Only the key of the selected
    /// store backend is looked up.
    ///
    /// # Errors
    ///
    /// Returns an error if the vault backend fails.
    pub async fn resolve_secrets(&mut self, vault: &dyn VaultProvider) -> anyhow::Result<()> {
        if let Some(val) = vault.get_secret(OPENAI_API_KEY).await? {
            self.secrets.openai_api_key = Some(Secret::new(val));
        }
        if let Some(val) = vault.get_secret(self.store.backend.api_key_name()).await? {
            self.secrets.store_api_key = Some(Secret::new(val));
        }
        Ok(())
    }

    /// Check that a run can start with this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first missing or empty setting.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.embedding.provider != "openai" {
            bail!(
                "unsupported embedding provider {:?} (expected \"openai\")",
                self.embedding.provider
            );
        }
        if self.embedding.model.trim().is_empty() {
            bail!("embedding.model must not be empty");
        }
        if self.store.index_name.trim().is_empty() {
            bail!("store.index_name must not be empty");
        }
        if self.store.namespace.trim().is_empty() {
            bail!("store.namespace must not be empty");
        }
        if self.secrets.openai_api_key.is_none() {
            bail!("{OPENAI_API_KEY} is not set");
        }
        if self.store.backend == StoreBackend::Pinecone && self.secrets.store_api_key.is_none() {
            bail!("{} is not set", StoreBackend::Pinecone.api_key_name());
        }
        Ok(())
    }
}
