use std::io::Write;
use std::path::Path;

use serial_test::serial;

use super::*;
use crate::vault::{MockVaultProvider, Secret};

const ENV_KEYS: [&str; 10] = [
    "CODEVEC_EMBEDDING_MODEL",
    "CODEVEC_EMBEDDING_BASE_URL",
    "CODEVEC_EMBEDDING_MAX_ATTEMPTS",
    "CODEVEC_EMBEDDING_RETRY_DELAY_SECS",
    "CODEVEC_STORE_BACKEND",
    "CODEVEC_STORE_INDEX",
    "CODEVEC_STORE_NAMESPACE",
    "CODEVEC_QDRANT_URL",
    "CODEVEC_PINECONE_HOST",
    "CODEVEC_INDEX_RESPECT_IGNORE_FILES",
];

fn clear_env() {
    for key in ENV_KEYS {
        unsafe { std::env::remove_var(key) };
    }
}

fn write_config(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("codevec.toml");
    let mut f = std::fs::File::create(&path).unwrap();
    write!(f, "{body}").unwrap();
    path
}

async fn with_keys(mut config: Config, vault: MockVaultProvider) -> Config {
    config.resolve_secrets(&vault).await.unwrap();
    config
}

#[test]
fn defaults_match_pipeline_constants() {
    let config = Config::default();
    assert_eq!(config.embedding.provider, "openai");
    assert_eq!(config.embedding.base_url, "https://api.openai.com/v1");
    assert_eq!(config.embedding.model, "text-embedding-3-small");
    assert_eq!(config.embedding.max_attempts, 2);
    assert_eq!(config.embedding.retry_delay_secs, 10);
    assert_eq!(config.store.backend, StoreBackend::Pinecone);
    assert_eq!(config.store.index_name, "code-embeddings");
    assert_eq!(config.store.namespace, "code-analysis");
    assert_eq!(config.store.qdrant_url, "http://localhost:6334");
    assert!(config.store.pinecone_host.is_none());
    assert!(!config.index.respect_ignore_files);
}

#[test]
#[serial]
fn missing_file_falls_back_to_defaults() {
    clear_env();
    let config = Config::load(Path::new("/nonexistent/codevec.toml")).unwrap();
    assert_eq!(config.store.index_name, "code-embeddings");
}

#[test]
#[serial]
fn parse_partial_toml() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
[embedding]
model = "text-embedding-3-large"

[store]
backend = "qdrant"
namespace = "team-a"
"#,
    );

    let config = Config::load(&path).unwrap();
    assert_eq!(config.embedding.model, "text-embedding-3-large");
    assert_eq!(config.embedding.max_attempts, 2);
    assert_eq!(config.store.backend, StoreBackend::Qdrant);
    assert_eq!(config.store.namespace, "team-a");
    assert_eq!(config.store.index_name, "code-embeddings");
}

#[test]
#[serial]
fn invalid_toml_is_an_error() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[store]\nbackend = \"milvus\"\n");
    let err = Config::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("failed to parse config file"));
}

#[test]
#[serial]
fn env_overrides_file_values() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[store]\nindex_name = \"from-file\"\n");

    unsafe {
        std::env::set_var("CODEVEC_STORE_INDEX", "from-env");
        std::env::set_var("CODEVEC_STORE_BACKEND", "qdrant");
        std::env::set_var("CODEVEC_EMBEDDING_MAX_ATTEMPTS", "5");
        std::env::set_var("CODEVEC_EMBEDDING_RETRY_DELAY_SECS", "0");
        std::env::set_var("CODEVEC_INDEX_RESPECT_IGNORE_FILES", "true");
        std::env::set_var("CODEVEC_PINECONE_HOST", "idx-abc.svc.pinecone.io");
    }
    let config = Config::load(&path).unwrap();
    clear_env();

    assert_eq!(config.store.index_name, "from-env");
    assert_eq!(config.store.backend, StoreBackend::Qdrant);
    assert_eq!(config.embedding.max_attempts, 5);
    assert_eq!(config.embedding.retry_delay_secs, 0);
    assert!(config.index.respect_ignore_files);
    assert_eq!(
        config.store.pinecone_host.as_deref(),
        Some("idx-abc.svc.pinecone.io")
    );
}

#[test]
#[serial]
fn invalid_env_values_are_ignored() {
    clear_env();
    unsafe {
        std::env::set_var("CODEVEC_STORE_BACKEND", "milvus");
        std::env::set_var("CODEVEC_EMBEDDING_MAX_ATTEMPTS", "many");
        std::env::set_var("CODEVEC_INDEX_RESPECT_IGNORE_FILES", "yes please");
    }
    let config = Config::load(Path::new("/nonexistent/codevec.toml")).unwrap();
    clear_env();

    assert_eq!(config.store.backend, StoreBackend::Pinecone);
    assert_eq!(config.embedding.max_attempts, 2);
    assert!(!config.index.respect_ignore_files);
}

#[tokio::test]
async fn resolve_secrets_picks_backend_key() {
    let vault = MockVaultProvider::new()
        .with_secret("OPENAI_API_KEY", "sk-openai")
        .with_secret("PINECONE_API_KEY", "pc-key")
        .with_secret("QDRANT_API_KEY", "qd-key");

    let pinecone = with_keys(Config::default(), vault).await;
    assert_eq!(
        pinecone.secrets.openai_api_key.as_ref().map(Secret::expose),
        Some("sk-openai")
    );
    assert_eq!(
        pinecone.secrets.store_api_key.as_ref().map(Secret::expose),
        Some("pc-key")
    );

    let mut qdrant = Config::default();
    qdrant.store.backend = StoreBackend::Qdrant;
    let vault = MockVaultProvider::new().with_secret("QDRANT_API_KEY", "qd-key");
    let qdrant = with_keys(qdrant, vault).await;
    assert_eq!(
        qdrant.secrets.store_api_key.as_ref().map(Secret::expose),
        Some("qd-key")
    );
}

#[tokio::test]
async fn validate_requires_embedding_key() {
    let config = with_keys(
        Config::default(),
        MockVaultProvider::new().with_secret("PINECONE_API_KEY", "pc"),
    )
    .await;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("OPENAI_API_KEY"));
}

#[tokio::test]
async fn validate_requires_pinecone_key_only_for_pinecone() {
    let vault = || MockVaultProvider::new().with_secret("OPENAI_API_KEY", "sk");

    let pinecone = with_keys(Config::default(), vault()).await;
    assert!(
        pinecone
            .validate()
            .unwrap_err()
            .to_string()
            .contains("PINECONE_API_KEY")
    );

    let mut qdrant = Config::default();
    qdrant.store.backend = StoreBackend::Qdrant;
    let qdrant = with_keys(qdrant, vault()).await;
    qdrant.validate().unwrap();
}

#[tokio::test]
async fn validate_rejects_empty_namespace() {
    let mut config = Config::default();
    config.store.namespace = "  ".into();
    let config = with_keys(
        config,
        MockVaultProvider::new()
            .with_secret("OPENAI_API_KEY", "sk")
            .with_secret("PINECONE_API_KEY", "pc"),
    )
    .await;
    assert!(
        config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("store.namespace")
    );
}

#[test]
fn secrets_are_not_serialized() {
    let mut config = Config::default();
    config.secrets.openai_api_key = Some(Secret::new("sk-hidden"));
    let text = toml::to_string(&config).unwrap();
    assert!(!text.contains("sk-hidden"));
    assert!(text.contains("[store]"));
}
