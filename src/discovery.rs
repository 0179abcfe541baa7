//! Test discovery
//!
//! Walks a directory tree top-down and groups test sources by the directory that holds them. Each group
//! becomes one build invocation, so a tree with three test directories costs three `make` calls.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::cli::test_interfaces::RunnerError;

/// Test sources found directly inside one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestBatch {
    pub dir: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Discover test sources under `root`, one batch per directory with at least one match.
///
/// One top-down walk in which each directory lists its files (by name) before descending into its
/// sub-directories, so the files of a directory arrive back to back. Symlinked directories are not entered;
/// symlinks to regular files count as test sources.
#[tracing::instrument(skip_all, fields(root = %root.display()))]
pub fn discover_test_batches(root: &Path, test_suffix: &str) -> Result<Vec<TestBatch>, RunnerError> {
    let mut batches: Vec<TestBatch> = Vec::new();

    let walker = WalkDir::new(root).sort_by(|a, b| {
        let (a_dir, b_dir) = (a.file_type().is_dir(), b.file_type().is_dir());
        a_dir.cmp(&b_dir).then_with(|| a.file_name().cmp(b.file_name()))
    });

    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_dir() || !is_test_source(&entry, test_suffix) {
            continue;
        }

        let dir = entry.path().parent().map(Path::to_path_buf).unwrap_or_default();
        match batches.last_mut() {
            Some(batch) if batch.dir == dir => batch.files.push(entry.into_path()),
            _ => {
                tracing::debug!(dir = %dir.display(), "found test directory");
                batches.push(TestBatch {
                    dir,
                    files: vec![entry.into_path()],
                });
            }
        }
    }

    Ok(batches)
}

/// Regular file (or symlink to one) whose name ends with `test_suffix`.
fn is_test_source(entry: &DirEntry, test_suffix: &str) -> bool {
    entry.file_name().as_encoded_bytes().ends_with(test_suffix.as_bytes()) && entry.path().is_file()
}
