//! Python source discovery.

use std::path::{Path, PathBuf};

pub const SOURCE_EXTENSION: &str = "py";

/// Check whether `path` names a Python source file by its extension.
#[must_use]
pub fn is_python_source(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
}

/// Recursively collect Python files under `root`, sorted by path.
///
/// With `respect_ignore_files` off every `.py` file is returned, hidden and
/// git-ignored ones included, as are symlinks to files. Unreadable entries
/// are logged and skipped.
#[must_use]
pub fn discover_python_files(root: &Path, respect_ignore_files: bool) -> Vec<PathBuf> {
    ignore::WalkBuilder::new(root)
        .standard_filters(respect_ignore_files)
        .sort_by_file_path(Path::cmp)
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("skipping unreadable entry under {}: {e}", root.display());
                None
            }
        })
        .filter(|e| is_python_source(e.path()) && is_file_or_file_link(e))
        .map(ignore::DirEntry::into_path)
        .collect()
}

/// Regular files, and symlinks that resolve to one. Symlinked directories
/// are not descended into.
fn is_file_or_file_link(entry: &ignore::DirEntry) -> bool {
    entry
        .file_type()
        .is_some_and(|ft| ft.is_file() || (ft.is_symlink() && entry.path().is_file()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }

    fn relative(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn is_python_source_checks_extension() {
        assert!(is_python_source(Path::new("pkg/mod.py")));
        assert!(!is_python_source(Path::new("pkg/mod.pyc")));
        assert!(!is_python_source(Path::new("pkg/mod.rs")));
        assert!(!is_python_source(Path::new("py")));
    }

    #[test]
    fn finds_nested_python_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "z.py");
        touch(dir.path(), "a/b.py");
        touch(dir.path(), "a/notes.txt");
        touch(dir.path(), "m.py");

        let files = discover_python_files(dir.path(), false);
        assert_eq!(relative(dir.path(), &files), vec!["a/b.py", "m.py", "z.py"]);
    }

    #[test]
    fn hidden_and_ignored_files_included_by_default() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), ".hidden/x.py");
        touch(dir.path(), "build/gen.py");
        std::fs::write(dir.path().join(".gitignore"), "build/\n").unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();

        let all = discover_python_files(dir.path(), false);
        assert_eq!(relative(dir.path(), &all), vec![".hidden/x.py", "build/gen.py"]);

        let filtered = discover_python_files(dir.path(), true);
        assert!(filtered.is_empty(), "got {filtered:?}");
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_python_files_are_included() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "real/impl.py");
        std::os::unix::fs::symlink(dir.path().join("real/impl.py"), dir.path().join("alias.py"))
            .unwrap();
        std::os::unix::fs::symlink(dir.path().join("missing.py"), dir.path().join("dangling.py"))
            .unwrap();

        let files = discover_python_files(dir.path(), false);
        assert_eq!(relative(dir.path(), &files), vec!["alias.py", "real/impl.py"]);
    }

    #[test]
    fn discovery_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c.py", "a.py", "b/a.py", "b/c.py"] {
            touch(dir.path(), name);
        }
        assert_eq!(
            discover_python_files(dir.path(), false),
            discover_python_files(dir.path(), false)
        );
    }
}
