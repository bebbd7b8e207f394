use super::Config;

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("CODEVEC_EMBEDDING_MODEL") {
            self.embedding.model = v;
        }
        if let Ok(v) = std::env::var("CODEVEC_EMBEDDING_BASE_URL") {
            self.embedding.base_url = v;
        }
        if let Ok(v) = std::env::var("CODEVEC_EMBEDDING_MAX_ATTEMPTS") {
            if let Ok(n) = v.parse::<u32>() {
                self.embedding.max_attempts = n;
            } else {
                tracing::warn!("ignoring invalid CODEVEC_EMBEDDING_MAX_ATTEMPTS value: {v}");
            }
        }
        if let Ok(v) = std::env::var("CODEVEC_EMBEDDING_RETRY_DELAY_SECS") {
            if let Ok(secs) = v.parse::<u64>() {
                self.embedding.retry_delay_secs = secs;
            } else {
                tracing::warn!("ignoring invalid CODEVEC_EMBEDDING_RETRY_DELAY_SECS value: {v}");
            }
        }
        if let Ok(v) = std::env::var("CODEVEC_STORE_BACKEND") {
            if let Ok(backend) = serde_json::from_value(serde_json::Value::String(v.clone())) {
                self.store.backend = backend;
            } else {
                tracing::warn!("ignoring invalid CODEVEC_STORE_BACKEND value: {v}");
            }
        }
        if let Ok(v) = std::env::var("CODEVEC_STORE_INDEX") {
            self.store.index_name = v;
        }
        if let Ok(v) = std::env::var("CODEVEC_STORE_NAMESPACE") {
            self.store.namespace = v;
        }
        if let Ok(v) = std::env::var("CODEVEC_QDRANT_URL") {
            self.store.qdrant_url = v;
        }
        if let Ok(v) = std::env::var("CODEVEC_PINECONE_HOST") {
            self.store.pinecone_host = (!v.trim().is_empty()).then_some(v);
        }
        if let Ok(v) = std::env::var("CODEVEC_INDEX_RESPECT_IGNORE_FILES") {
            if let Ok(enabled) = v.parse::<bool>() {
                self.index.respect_ignore_files = enabled;
            } else {
                tracing::warn!("ignoring invalid CODEVEC_INDEX_RESPECT_IGNORE_FILES value: {v}");
            }
        }
    }
}
