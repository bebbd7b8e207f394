//! Per-element indexing: validate, embed, upsert.

use std::sync::Arc;

use codevec_llm::EmbeddingProvider;
use codevec_memory::{VectorPoint, VectorStore};

use crate::element::{Element, ElementRecord};
use crate::error::{IndexError, Result};

/// Index name and namespace that every point of a run is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreTarget {
    pub index: String,
    pub namespace: String,
}

impl StoreTarget {
    #[must_use]
    pub fn new(index: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            namespace: namespace.into(),
        }
    }
}

/// Turns one [`Element`] into one upserted point.
pub struct ElementIndexer<P> {
    provider: P,
    store: Arc<dyn VectorStore>,
    target: StoreTarget,
}

impl<P: EmbeddingProvider> ElementIndexer<P> {
    #[must_use]
    pub fn new(provider: P, store: Arc<dyn VectorStore>, target: StoreTarget) -> Self {
        Self {
            provider,
            store,
            target,
        }
    }

    /// Embed `element` and upsert it under its deterministic id.
    ///
    /// The returned record is produced only after the upsert succeeded, so
    /// an element is either fully stored or not reported at all.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is empty, the embedding fails after
    /// retries, or the store rejects the write.
    pub async fn index(&self, element: &Element) -> Result<ElementRecord> {
        if element.content.trim().is_empty() {
            return Err(IndexError::InvalidContent {
                kind: element.kind,
                line: element.line_number,
            });
        }

        let point = VectorPoint {
            id: element.id(),
            vector: self.provider.embed(&element.content).await?,
            metadata: element.metadata(),
        };
        let id = point.id.clone();

        self.store
            .upsert(&self.target.index, &self.target.namespace, vec![point])
            .await?;

        tracing::debug!(%id, store = self.store.name(), "element upserted");
        Ok(element.to_record())
    }
}
