//! Parsing layer: tree-sitter grammars, the syntax adapter, and the
//! per-file component recognizer.
//!
//! [`extract_file`] is pass 1 of an extraction run. It looks at one file in
//! isolation and reports what that file declares and references by name.
//! Nothing here knows about other files; ids and cross-file edges are
//! assigned later by the graph builder.

pub mod language;
pub mod queries;
pub mod syntax;

use std::path::Path;
use tracing::debug;
use tree_sitter::{Parser, Tree};

pub use language::SupportedLanguage;
pub use queries::{
    AttributeBinding, Classification, ComponentSkeleton, EffectDecl, FileSkeleton, ImportBinding,
    ImportedName, Instantiation, Placement, PropDecl, StateDecl,
};
pub use syntax::{SyntaxKind, SyntaxNode, Walk};

use crate::config::ExtractorConfig;
use crate::error::{ExtractError, Result};

/// A parsed file: the tree plus the text it borrows from.
pub struct ParsedSource<'s> {
    pub path: &'s Path,
    pub language: SupportedLanguage,
    source: &'s str,
    tree: Tree,
}

impl<'s> ParsedSource<'s> {
    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode::new(self.tree.root_node(), self.source)
    }

    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }
}

/// Parse one file with the grammar matching its extension.
pub fn parse_source<'s>(path: &'s Path, source: &'s str) -> Result<ParsedSource<'s>> {
    let language = SupportedLanguage::from_path(path)
        .ok_or_else(|| ExtractError::UnsupportedLanguage(path.to_path_buf()))?;

    let mut parser = Parser::new();
    parser
        .set_language(&language.tree_sitter_language())
        .map_err(|e| ExtractError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ExtractError::Parse {
            path: path.to_path_buf(),
            reason: "parser produced no tree".to_string(),
        })?;

    Ok(ParsedSource {
        path,
        language,
        source,
        tree,
    })
}

/// Recognize the components, hooks, markup usages and imports in one file.
///
/// Fails with [`ExtractError::UnsupportedLanguage`] for unknown extensions
/// and with [`ExtractError::Parse`] when the text cannot be parsed (or, with
/// `skip_files_with_errors`, when the tree contains error nodes).
pub fn extract_file(path: &Path, source: &str, config: &ExtractorConfig) -> Result<FileSkeleton> {
    let parsed = parse_source(path, source)?;

    if config.classification.skip_files_with_errors && parsed.has_errors() {
        return Err(ExtractError::Parse {
            path: path.to_path_buf(),
            reason: "syntax errors in file".to_string(),
        });
    }

    let skeleton = queries::recognize(&parsed, config);
    debug!(
        file = %path.display(),
        language = parsed.language.name(),
        components = skeleton.components.len(),
        imports = skeleton.imports.len(),
        "recognized file"
    );
    Ok(skeleton)
}
