use crate::error::LlmError;

/// A text-to-vector embedding backend.
///
/// Implementations perform exactly one request per call; retry and input
/// normalization live in [`crate::retry::RetryingEmbedder`].
pub trait EmbeddingProvider: Send + Sync {
    /// Return the embedding vector for `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached or its response is invalid.
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, LlmError>> + Send;

    fn name(&self) -> &'static str;
}
