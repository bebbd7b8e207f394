use std::time::Duration;

use crate::error::LlmError;
use crate::provider::EmbeddingProvider;

const DEFAULT_MAX_ATTEMPTS: u32 = 2;
const DEFAULT_RETRY_DELAY_SECS: u64 = 10;

/// Bounded retry with a fixed pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one. Zero behaves as one.
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    fn attempts(self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Collapse newlines to spaces before the text reaches the provider.
#[must_use]
pub fn normalize_for_embedding(text: &str) -> String {
    text.replace('\n', " ")
}

/// Wraps a provider with newline normalization and [`RetryPolicy`].
///
/// There is no fallback vector: once every attempt has failed the last
/// provider error is returned inside [`LlmError::RetriesExhausted`].
#[derive(Debug, Clone)]
pub struct RetryingEmbedder<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P: EmbeddingProvider> RetryingEmbedder<P> {
    #[must_use]
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl<P: EmbeddingProvider> EmbeddingProvider for RetryingEmbedder<P> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let text = normalize_for_embedding(text);
        let attempts = self.policy.attempts();
        let mut attempt = 1;

        loop {
            match self.inner.embed(&text).await {
                Ok(vector) => return Ok(vector),
                Err(e) if attempt >= attempts => {
                    return Err(LlmError::RetriesExhausted {
                        attempts,
                        source: Box::new(e),
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        provider = self.inner.name(),
                        attempt,
                        max_attempts = attempts,
                        "embedding request failed, retrying in {}s: {e}",
                        self.policy.delay.as_secs()
                    );
                    tokio::time::sleep(self.policy.delay).await;
                    attempt += 1;
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
