//! Vector storage backends for element embeddings.
//!
//! Every backend implements [`VectorStore`]: an idempotent upsert of
//! `{id, vector, metadata}` points into a named index, scoped to a namespace.

pub mod in_memory_store;
pub mod pinecone;
pub mod qdrant;
pub mod vector_store;

pub use in_memory_store::InMemoryVectorStore;
pub use pinecone::PineconeStore;
pub use qdrant::QdrantStore;
pub use vector_store::{VectorPoint, VectorStore, VectorStoreError};
