//! Error types for codevec-index.

use std::path::PathBuf;

use crate::element::{ElementKind, LineNumber};

/// Errors that can occur while extracting or indexing elements.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// IO error reading source files, including non-UTF-8 content.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file does not parse as Python.
    #[error("parse failed: {0}")]
    Parse(String),

    /// An element whose text to embed is empty.
    #[error("invalid content for {kind} at line {line}")]
    InvalidContent { kind: ElementKind, line: LineNumber },

    /// Embedding provider error after retries.
    #[error("embedding error: {0}")]
    Llm(#[from] codevec_llm::LlmError),

    /// Vector store write error.
    #[error("vector store error: {0}")]
    Store(#[from] codevec_memory::VectorStoreError),

    /// The run target is neither a Python file nor a directory.
    #[error("the path {} is neither a Python file nor a directory containing Python files", .0.display())]
    InvalidPath(PathBuf),
}

/// Result type alias using `IndexError`.
pub type Result<T> = std::result::Result<T, IndexError>;
