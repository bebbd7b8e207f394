//! Pinecone backend over the REST data plane.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::vector_store::{BoxFuture, VectorPoint, VectorStore, VectorStoreError};

pub const DEFAULT_API_URL: &str = "https://api.pinecone.io";
const API_VERSION: &str = "2025-01";

pub struct PineconeStore {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
    host: Option<String>,
    resolved_hosts: Mutex<HashMap<String, String>>,
}

impl std::fmt::Debug for PineconeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PineconeStore")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl PineconeStore {
    /// `host` pins the data-plane host for every index; without it the host
    /// is looked up once per index through the control plane at `api_url`.
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        mut api_url: String,
        host: Option<String>,
    ) -> Self {
        while api_url.ends_with('/') {
            api_url.pop();
        }
        Self {
            client,
            api_key,
            api_url,
            host,
            resolved_hosts: Mutex::new(HashMap::new()),
        }
    }

    async fn index_host(&self, index: &str) -> Result<String, VectorStoreError> {
        if let Some(host) = &self.host {
            return Ok(host.clone());
        }
        if let Some(host) = self
            .resolved_hosts
            .lock()
            .ok()
            .and_then(|hosts| hosts.get(index).cloned())
        {
            return Ok(host);
        }

        let response = self
            .client
            .get(format!("{}/indexes/{index}", self.api_url))
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .send()
            .await
            .map_err(|e| VectorStoreError::Connection(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| VectorStoreError::Connection(e.to_string()))?;
        if !status.is_success() {
            return Err(VectorStoreError::Connection(format!(
                "describe index {index} failed (status {status}): {body}"
            )));
        }

        let description: IndexDescription = serde_json::from_str(&body)
            .map_err(|e| VectorStoreError::Serialization(e.to_string()))?;
        tracing::debug!(index, host = %description.host, "resolved Pinecone index host");

        if let Ok(mut hosts) = self.resolved_hosts.lock() {
            hosts.insert(index.to_owned(), description.host.clone());
        }
        Ok(description.host)
    }
}

fn data_plane_url(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_owned()
    } else {
        format!("https://{host}")
    }
}

impl VectorStore for PineconeStore {
    fn upsert(
        &self,
        index: &str,
        namespace: &str,
        points: Vec<VectorPoint>,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let index = index.to_owned();
        let namespace = namespace.to_owned();
        Box::pin(async move {
            if points.is_empty() {
                return Ok(());
            }
            let host = self.index_host(&index).await?;

            let body = UpsertRequest {
                vectors: points
                    .iter()
                    .map(|p| UpsertVector {
                        id: &p.id,
                        values: &p.vector,
                        metadata: &p.metadata,
                    })
                    .collect(),
                namespace: &namespace,
            };

            let response = self
                .client
                .post(format!("{}/vectors/upsert", data_plane_url(&host)))
                .header("Api-Key", &self.api_key)
                .header("X-Pinecone-API-Version", API_VERSION)
                .json(&body)
                .send()
                .await
                .map_err(|e| VectorStoreError::Upsert(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(VectorStoreError::Upsert(format!(
                    "Pinecone upsert failed (status {status}): {text}"
                )));
            }
            Ok(())
        })
    }

    fn name(&self) -> &'static str {
        "pinecone"
    }
}

#[derive(Deserialize)]
struct IndexDescription {
    host: String,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<UpsertVector<'a>>,
    namespace: &'a str,
}

#[derive(Serialize)]
struct UpsertVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: &'a HashMap<String, serde_json::Value>,
}
