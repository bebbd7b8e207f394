use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use codevec_core::config::Config;
use codevec_core::{EnvVaultProvider, StoreBackend};
use codevec_index::discovery::is_python_source;
use codevec_index::{CodeIndexer, ElementIndexer, IndexerConfig, StoreTarget};
use codevec_llm::openai::OpenAiEmbedder;
use codevec_llm::{RetryPolicy, RetryingEmbedder};
use codevec_memory::{PineconeStore, QdrantStore, VectorStore};

/// Extract module docstrings, classes, functions and imports from Python
/// sources, embed each one and upsert it into a vector store.
///
/// The indexed elements are printed to stdout as a JSON array; progress and
/// errors go to stderr.
#[derive(Parser, Debug)]
#[command(name = "codevec", version)]
struct Cli {
    /// A `.py` file or a directory searched recursively for `.py` files.
    path: PathBuf,

    /// Path to the TOML configuration file. Falls back to `CODEVEC_CONFIG`,
    /// then `config/default.toml`.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };

    init_subscriber();

    if !is_valid_target(&cli.path) {
        eprintln!(
            "error: {} is neither a Python file nor a directory\n\nUsage: codevec [--config <CONFIG>] <PATH>",
            cli.path.display()
        );
        std::process::exit(1);
    }

    let config_path = resolve_config_path(cli.config);
    let mut config = Config::load(&config_path)?;
    config
        .resolve_secrets(&EnvVaultProvider)
        .await
        .context("failed to resolve secrets")?;
    config.validate().context("invalid configuration")?;

    let client = codevec_llm::http::default_client().context("failed to build HTTP client")?;
    let embedder = build_embedder(&config, client.clone())?;
    let store = build_store(&config, client)?;
    tracing::info!(
        model = %config.embedding.model,
        store = store.name(),
        index = %config.store.index_name,
        namespace = %config.store.namespace,
        "starting run"
    );

    let indexer = CodeIndexer::new(
        ElementIndexer::new(
            embedder,
            store,
            StoreTarget::new(&config.store.index_name, &config.store.namespace),
        ),
        IndexerConfig {
            respect_ignore_files: config.index.respect_ignore_files,
        },
    );
    let report = indexer.run(&cli.path).await?;

    let json = serde_json::to_string_pretty(&report.records)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}")?;
    stdout.flush()?;

    tracing::info!(
        files_scanned = report.files_scanned,
        files_failed = report.files_failed,
        elements_indexed = report.elements_indexed,
        elements_failed = report.elements_failed,
        duration_ms = report.duration_ms,
        "run finished"
    );
    Ok(())
}

fn init_subscriber() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn is_valid_target(path: &Path) -> bool {
    (path.is_file() && is_python_source(path)) || path.is_dir()
}

fn resolve_config_path(flag: Option<PathBuf>) -> PathBuf {
    if let Some(path) = flag {
        return path;
    }
    if let Ok(path) = std::env::var("CODEVEC_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("config/default.toml")
}

fn build_embedder(
    config: &Config,
    client: reqwest::Client,
) -> anyhow::Result<RetryingEmbedder<OpenAiEmbedder>> {
    let api_key = config
        .secrets
        .openai_api_key
        .as_ref()
        .context("OPENAI_API_KEY is not set")?;
    let provider = OpenAiEmbedder::new(
        client,
        api_key.expose().to_owned(),
        config.embedding.base_url.clone(),
        config.embedding.model.clone(),
    );
    let policy = RetryPolicy::new(
        config.embedding.max_attempts,
        Duration::from_secs(config.embedding.retry_delay_secs),
    );
    Ok(RetryingEmbedder::new(provider, policy))
}

fn build_store(
    config: &Config,
    client: reqwest::Client,
) -> anyhow::Result<Arc<dyn VectorStore>> {
    let api_key = config.secrets.store_api_key.as_ref().map(codevec_core::Secret::expose);
    let store: Arc<dyn VectorStore> = match config.store.backend {
        StoreBackend::Qdrant => Arc::new(
            QdrantStore::new(&config.store.qdrant_url, api_key)
                .with_context(|| format!("failed to connect to Qdrant at {}", config.store.qdrant_url))?,
        ),
        StoreBackend::Pinecone => {
            let api_key = api_key.context("PINECONE_API_KEY is not set")?;
            Arc::new(PineconeStore::new(
                client,
                api_key.to_owned(),
                config.store.pinecone_api_url.clone(),
                config.store.pinecone_host.clone(),
            ))
        }
    };
    Ok(store)
}
