//! Host-side file discovery.
//!
//! Walks a project directory respecting .gitignore, keeps files in a
//! supported source language and reads them into [`SourceFile`]s with
//! paths relative to the root. The extractor itself never touches the
//! filesystem; this is what the binaries hand it.

use ignore::WalkBuilder;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::Result;
use crate::parser::SupportedLanguage;
use crate::project::SourceFile;

/// Directories never worth scanning, even when not ignored.
const SKIPPED_DIRS: &[&str] = &["node_modules", "bower_components", "dist", "build"];

/// Collect the supported source files under `root`, sorted by path.
///
/// Unreadable files are skipped with a warning. Fails only when `root`
/// itself is not a readable directory.
pub fn discover_files(root: &Path) -> Result<Vec<SourceFile>> {
    fs::read_dir(root)?;

    let mut paths: Vec<_> = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .filter_entry(|entry| {
            let skipped = entry.file_type().is_some_and(|ft| ft.is_dir())
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| SKIPPED_DIRS.contains(&name));
            !skipped
        })
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .filter(|entry| SupportedLanguage::from_path(entry.path()).is_some())
        .map(|entry| entry.into_path())
        .collect();
    paths.sort();

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
        match fs::read_to_string(&path) {
            Ok(content) => files.push(SourceFile::new(relative, content)),
            Err(e) => warn!(file = %path.display(), error = %e, "skipping unreadable file"),
        }
    }

    debug!(root = %root.display(), files = files.len(), "discovered source files");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_discovers_supported_files_sorted() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/App.jsx", "function App() { return <div/>; }");
        write(dir.path(), "src/components/Card.tsx", "export const Card = () => <div/>;");
        write(dir.path(), "src/util.ts", "export const x = 1;");
        write(dir.path(), "src/styles.css", "body {}");
        write(dir.path(), "README.md", "# readme");

        let files = discover_files(dir.path()).unwrap();
        let paths: Vec<PathBuf> = files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("src/App.jsx"),
                PathBuf::from("src/components/Card.tsx"),
                PathBuf::from("src/util.ts"),
            ]
        );
        assert_eq!(files[0].content, "function App() { return <div/>; }");
    }

    #[test]
    fn test_skips_vendor_directories() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "node_modules/react/index.js", "module.exports = {};");
        write(dir.path(), "src/Main.jsx", "function Main() { return <div/>; }");

        let files = discover_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, PathBuf::from("src/Main.jsx"));
    }

    #[test]
    fn test_missing_root_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(discover_files(&dir.path().join("absent")).is_err());
    }
}
