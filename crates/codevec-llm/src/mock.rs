//! Test-only mock embedding provider.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::LlmError;
use crate::provider::EmbeddingProvider;

/// Deterministic in-process embedder with scriptable failures.
///
/// Clones share their call log and failure script, so a test can hand one
/// clone to the pipeline and inspect another.
#[derive(Debug, Clone)]
pub struct MockEmbedder {
    pub dimensions: usize,
    fail_texts: Arc<Mutex<HashSet<String>>>,
    fail_remaining: Arc<AtomicUsize>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new(8)
    }
}

impl MockEmbedder {
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            fail_texts: Arc::new(Mutex::new(HashSet::new())),
            fail_remaining: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every request whose text equals `text` fails.
    #[must_use]
    pub fn failing_on(self, text: impl Into<String>) -> Self {
        self.fail_texts.lock().unwrap().insert(text.into());
        self
    }

    /// The next `n` requests fail regardless of their text.
    #[must_use]
    pub fn failing_first(self, n: usize) -> Self {
        self.fail_remaining.store(n, Ordering::SeqCst);
        self
    }

    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// The vector this mock returns for `text`.
    #[must_use]
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.dimensions.max(1)];
        let len = vector.len();
        for (i, b) in text.bytes().enumerate() {
            vector[i % len] += f32::from(b) / 255.0;
        }
        vector
    }
}

impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        self.calls.lock().unwrap().push(text.to_owned());

        let scripted = self
            .fail_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if scripted || self.fail_texts.lock().unwrap().contains(text) {
            return Err(LlmError::Other("mock embedding error".into()));
        }

        Ok(self.vector_for(text))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
