//! Run orchestration: discover → extract → index, one file at a time.

use std::path::{Path, PathBuf};

use codevec_llm::EmbeddingProvider;

use crate::discovery::{discover_python_files, is_python_source};
use crate::element::ElementRecord;
use crate::error::{IndexError, Result};
use crate::extractor::extract_file;
use crate::indexer::ElementIndexer;

/// Orchestrator configuration.
#[derive(Debug, Clone, Default)]
pub struct IndexerConfig {
    /// Honor `.gitignore` files and skip hidden paths during discovery.
    pub respect_ignore_files: bool,
}

/// Outcome of one run. Only `records` is the run's output; the counters are
/// for diagnostics.
#[derive(Debug, Default)]
pub struct RunReport {
    pub records: Vec<ElementRecord>,
    pub files_scanned: usize,
    pub files_failed: usize,
    pub elements_indexed: usize,
    pub elements_failed: usize,
    pub errors: Vec<String>,
    pub duration_ms: u64,
}

/// Drives a whole run over a file or directory tree.
pub struct CodeIndexer<P> {
    indexer: ElementIndexer<P>,
    config: IndexerConfig,
}

impl<P: EmbeddingProvider> CodeIndexer<P> {
    #[must_use]
    pub fn new(indexer: ElementIndexer<P>, config: IndexerConfig) -> Self {
        Self { indexer, config }
    }

    /// Files a run over `path` would process, in processing order.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidPath`] when `path` is neither a `.py` file
    /// nor a directory.
    pub fn resolve(&self, path: &Path) -> Result<Vec<PathBuf>> {
        if path.is_file() && is_python_source(path) {
            Ok(vec![path.to_path_buf()])
        } else if path.is_dir() {
            Ok(discover_python_files(
                path,
                self.config.respect_ignore_files,
            ))
        } else {
            Err(IndexError::InvalidPath(path.to_path_buf()))
        }
    }

    /// Index every element under `path`.
    ///
    /// File and element failures are logged, counted and skipped; records
    /// keep file order and, within a file, traversal order.
    ///
    /// # Errors
    ///
    /// Returns an error only if `path` cannot be resolved, before anything is
    /// processed.
    pub async fn run(&self, path: &Path) -> Result<RunReport> {
        let start = std::time::Instant::now();
        let files = self.resolve(path)?;
        let mut report = RunReport::default();

        let total = files.len();
        tracing::info!("found {total} Python files");

        for (i, file) in files.iter().enumerate() {
            report.files_scanned += 1;
            tracing::info!(
                file = %file.display(),
                progress = format_args!("{}/{total}", i + 1),
                "analyzing file"
            );

            let elements = match extract_file(file).await {
                Ok(elements) => elements,
                Err(e) => {
                    tracing::error!("failed to parse {}: {e:#}", file.display());
                    report.files_failed += 1;
                    report.errors.push(format!("{}: {e:#}", file.display()));
                    continue;
                }
            };

            let mut indexed = 0usize;
            for element in &elements {
                match self.indexer.index(element).await {
                    Ok(record) => {
                        report.records.push(record);
                        indexed += 1;
                    }
                    Err(e) => {
                        tracing::error!(
                            "failed to index {} {} at {}:{}: {e:#}",
                            element.kind,
                            element.name,
                            element.file_path,
                            element.line_number
                        );
                        report.elements_failed += 1;
                        report.errors.push(format!("{}: {e:#}", element.id()));
                    }
                }
            }
            report.elements_indexed += indexed;
            tracing::info!(
                file = %file.display(),
                extracted = elements.len(),
                indexed,
            );
        }

        report.duration_ms = start.elapsed().as_millis().try_into().unwrap_or(u64::MAX);
        Ok(report)
    }
}
