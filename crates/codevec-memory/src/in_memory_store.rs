use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::vector_store::{BoxFuture, VectorPoint, VectorStore, VectorStoreError};

type PartitionKey = (String, String);

/// Process-local store keyed by `(index, namespace)` then point id.
pub struct InMemoryVectorStore {
    partitions: RwLock<HashMap<PartitionKey, HashMap<String, VectorPoint>>>,
    writes: AtomicUsize,
}

impl InMemoryVectorStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            partitions: RwLock::new(HashMap::new()),
            writes: AtomicUsize::new(0),
        }
    }

    /// Look up a stored point.
    #[must_use]
    pub fn get(&self, index: &str, namespace: &str, id: &str) -> Option<VectorPoint> {
        let partitions = self.partitions.read().ok()?;
        partitions
            .get(&(index.to_owned(), namespace.to_owned()))
            .and_then(|points| points.get(id))
            .cloned()
    }

    /// Number of distinct points stored in a partition.
    #[must_use]
    pub fn len(&self, index: &str, namespace: &str) -> usize {
        self.partitions.read().map_or(0, |partitions| {
            partitions
                .get(&(index.to_owned(), namespace.to_owned()))
                .map_or(0, HashMap::len)
        })
    }

    #[must_use]
    pub fn is_empty(&self, index: &str, namespace: &str) -> bool {
        self.len(index, namespace) == 0
    }

    /// Sorted ids stored in a partition.
    #[must_use]
    pub fn ids(&self, index: &str, namespace: &str) -> Vec<String> {
        let mut ids: Vec<String> = self.partitions.read().map_or_else(
            |_| Vec::new(),
            |partitions| {
                partitions
                    .get(&(index.to_owned(), namespace.to_owned()))
                    .map(|points| points.keys().cloned().collect())
                    .unwrap_or_default()
            },
        );
        ids.sort();
        ids
    }

    /// Total number of points written, counting overwrites.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryVectorStore")
            .field("writes", &self.write_count())
            .finish_non_exhaustive()
    }
}

impl VectorStore for InMemoryVectorStore {
    fn upsert(
        &self,
        index: &str,
        namespace: &str,
        points: Vec<VectorPoint>,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let key = (index.to_owned(), namespace.to_owned());
        Box::pin(async move {
            let mut partitions = self
                .partitions
                .write()
                .map_err(|e| VectorStoreError::Upsert(e.to_string()))?;
            let partition = partitions.entry(key).or_default();
            let count = points.len();
            for point in points {
                partition.insert(point.id.clone(), point);
            }
            self.writes.fetch_add(count, Ordering::SeqCst);
            Ok(())
        })
    }

    fn name(&self) -> &'static str {
        "in-memory"
    }
}
