//! Structural indexing of Python sources.
//!
//! tree-sitter parses each file, the extractor walks the tree in source order
//! and emits module docstrings, classes, functions and imports as
//! [`element::Element`]s, and the indexer embeds each element and upserts it
//! into a vector store under a deterministic, location-derived id.

pub mod discovery;
pub(crate) mod docstring;
pub mod element;
pub mod error;
pub mod extractor;
pub mod indexer;
pub mod runner;

pub use element::{Element, ElementKind, ElementRecord, LineNumber};
pub use error::{IndexError, Result};
pub use indexer::{ElementIndexer, StoreTarget};
pub use runner::{CodeIndexer, IndexerConfig, RunReport};
