//! Project model: the set of source files for one extraction run.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One input file. Immutable for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Relative path of the file inside the project.
    #[serde(rename = "source")]
    pub path: PathBuf,
    /// Full text of the file.
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// The ingested files of one run, in input order.
///
/// A path that appears more than once is kept only at its first position;
/// the later copies are reported through [`Project::duplicates`].
#[derive(Debug, Clone, Default)]
pub struct Project {
    files: Vec<SourceFile>,
    duplicates: Vec<PathBuf>,
}

impl Project {
    pub fn new(files: Vec<SourceFile>) -> Self {
        let mut seen: HashSet<PathBuf> = HashSet::with_capacity(files.len());
        let mut kept = Vec::with_capacity(files.len());
        let mut duplicates = Vec::new();

        for file in files {
            if seen.insert(file.path.clone()) {
                kept.push(file);
            } else {
                debug!(file = %file.path.display(), "duplicate file in project input, keeping first");
                duplicates.push(file.path);
            }
        }

        Self {
            files: kept,
            duplicates,
        }
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn file(&self, path: &Path) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Paths that were dropped because they repeated an earlier entry.
    pub fn duplicates(&self) -> &[PathBuf] {
        &self.duplicates
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl From<Vec<SourceFile>> for Project {
    fn from(files: Vec<SourceFile>) -> Self {
        Self::new(files)
    }
}
