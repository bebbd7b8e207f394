use serde::{Deserialize, Serialize};

use crate::vault::Secret;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub embedding: EmbeddingConfig,
    pub store: StoreConfig,
    pub index: IndexConfig,
    #[serde(skip)]
    pub secrets: ResolvedSecrets,
}

fn default_embedding_provider() -> String {
    "openai".into()
}

fn default_embedding_base_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}

fn default_max_attempts() -> u32 {
    2
}

fn default_retry_delay_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub base_url: String,
    pub model: String,
    pub max_attempts: u32,
    pub retry_delay_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            base_url: default_embedding_base_url(),
            model: default_embedding_model(),
            max_attempts: default_max_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Pinecone,
    Qdrant,
}

impl StoreBackend {
    /// Vault key holding the API key for this backend.
    #[must_use]
    pub fn api_key_name(self) -> &'static str {
        match self {
            Self::Pinecone => "PINECONE_API_KEY",
            Self::Qdrant => "QDRANT_API_KEY",
        }
    }
}

fn default_index_name() -> String {
    "code-embeddings".into()
}

fn default_namespace() -> String {
    "code-analysis".into()
}

fn default_qdrant_url() -> String {
    "http://localhost:6334".into()
}

fn default_pinecone_api_url() -> String {
    "https://api.pinecone.io".into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub index_name: String,
    pub namespace: String,
    pub qdrant_url: String,
    pub pinecone_api_url: String,
    /// Data-plane host of the Pinecone index; looked up through the control
    /// plane when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinecone_host: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            index_name: default_index_name(),
            namespace: default_namespace(),
            qdrant_url: default_qdrant_url(),
            pinecone_api_url: default_pinecone_api_url(),
            pinecone_host: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct IndexConfig {
    pub respect_ignore_files: bool,
}

#[derive(Debug, Default)]
pub struct ResolvedSecrets {
    pub openai_api_key: Option<Secret>,
    pub store_api_key: Option<Secret>,
}
