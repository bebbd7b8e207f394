//! Qdrant backend.
//!
//! Qdrant has no namespaces and only accepts UUID or integer point ids, so
//! the namespace becomes a keyword-indexed payload field and each string id
//! is mapped to a UUIDv5 of `"{namespace}/{id}"`. The original id is kept in
//! the `element_id` payload field.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, CreateFieldIndexCollectionBuilder, Distance, FieldType, PointStruct,
    UpsertPointsBuilder, VectorParamsBuilder,
};

use crate::vector_store::{BoxFuture, VectorPoint, VectorStore, VectorStoreError};

pub const ELEMENT_ID_FIELD: &str = "element_id";
pub const NAMESPACE_FIELD: &str = "namespace";

pub struct QdrantStore {
    client: Qdrant,
    ready_collections: Mutex<HashSet<String>>,
}

impl std::fmt::Debug for QdrantStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantStore").finish_non_exhaustive()
    }
}

impl QdrantStore {
    /// Create a client for the Qdrant instance at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the Qdrant client cannot be created.
    pub fn new(url: &str, api_key: Option<&str>) -> Result<Self, VectorStoreError> {
        let mut config = Qdrant::from_url(url);
        if let Some(key) = api_key {
            config = config.api_key(key.to_owned());
        }
        let client = config
            .build()
            .map_err(|e| VectorStoreError::Connection(e.to_string()))?;
        Ok(Self {
            client,
            ready_collections: Mutex::new(HashSet::new()),
        })
    }

    fn is_ready(&self, collection: &str) -> bool {
        self.ready_collections
            .lock()
            .is_ok_and(|ready| ready.contains(collection))
    }

    fn mark_ready(&self, collection: &str) {
        if let Ok(mut ready) = self.ready_collections.lock() {
            ready.insert(collection.to_owned());
        }
    }

    /// Create the collection with cosine distance and a `namespace` keyword
    /// index unless it already exists.
    async fn ensure_collection(
        &self,
        collection: &str,
        vector_size: u64,
    ) -> Result<(), VectorStoreError> {
        if self.is_ready(collection) {
            return Ok(());
        }

        let exists = self
            .client
            .collection_exists(collection)
            .await
            .map_err(|e| VectorStoreError::Collection(e.to_string()))?;

        if !exists {
            tracing::info!(collection, vector_size, "creating Qdrant collection");
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(collection)
                        .vectors_config(VectorParamsBuilder::new(vector_size, Distance::Cosine)),
                )
                .await
                .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
            self.client
                .create_field_index(CreateFieldIndexCollectionBuilder::new(
                    collection,
                    NAMESPACE_FIELD,
                    FieldType::Keyword,
                ))
                .await
                .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
        }

        self.mark_ready(collection);
        Ok(())
    }
}

/// Deterministic Qdrant point id for a namespaced element id.
#[must_use]
pub fn point_uuid(namespace: &str, id: &str) -> String {
    uuid::Uuid::new_v5(
        &uuid::Uuid::NAMESPACE_OID,
        format!("{namespace}/{id}").as_bytes(),
    )
    .to_string()
}

fn point_payload(
    namespace: &str,
    point: &VectorPoint,
) -> Result<HashMap<String, qdrant_client::qdrant::Value>, VectorStoreError> {
    let mut payload: serde_json::Map<String, serde_json::Value> = point
        .metadata
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    payload.insert(ELEMENT_ID_FIELD.into(), point.id.clone().into());
    payload.insert(NAMESPACE_FIELD.into(), namespace.into());

    serde_json::from_value(serde_json::Value::Object(payload))
        .map_err(|e| VectorStoreError::Serialization(e.to_string()))
}

impl VectorStore for QdrantStore {
    fn upsert(
        &self,
        index: &str,
        namespace: &str,
        points: Vec<VectorPoint>,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = index.to_owned();
        let namespace = namespace.to_owned();
        Box::pin(async move {
            let Some(first) = points.first() else {
                return Ok(());
            };
            let vector_size = u64::try_from(first.vector.len())
                .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
            self.ensure_collection(&collection, vector_size).await?;

            let qdrant_points = points
                .iter()
                .map(|p| {
                    let payload = point_payload(&namespace, p)?;
                    Ok(PointStruct::new(
                        point_uuid(&namespace, &p.id),
                        p.vector.clone(),
                        payload,
                    ))
                })
                .collect::<Result<Vec<_>, VectorStoreError>>()?;

            self.client
                .upsert_points(UpsertPointsBuilder::new(&collection, qdrant_points).wait(true))
                .await
                .map_err(|e| VectorStoreError::Upsert(e.to_string()))?;
            Ok(())
        })
    }

    fn name(&self) -> &'static str {
        "qdrant"
    }
}
