//! Embedding provider abstraction and backend implementations.

pub mod error;
pub mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod openai;
pub mod provider;
pub mod retry;

pub use error::LlmError;
pub use provider::EmbeddingProvider;
pub use retry::{RetryPolicy, RetryingEmbedder};
