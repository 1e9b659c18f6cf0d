//! # compgraph
//!
//! Static extraction of a component-dependency graph from UI component
//! sources (JSX, TSX, JavaScript, TypeScript).
//!
//! Given a set of source files, the extractor recognizes which functions are
//! components, recovers their props, state cells and effects, decides how
//! components nest (children) or merely reference one another (false
//! children), and connects state, props and effects across component
//! boundaries. The result serializes to the `componentList` JSON document
//! consumed by visualization layers.
//!
//! ## Key Features
//!
//! - **Two passes**: files are recognized independently (in parallel), then
//!   names are resolved against the whole project
//! - **Cycle-safe**: the component relation is a directed graph; every
//!   traversal carries a visited set
//! - **Best effort**: unparseable files and unresolved names never abort a
//!   run, they become diagnostics or are left out
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use compgraph::{Extractor, SourceFile};
//!
//! let extractor = Extractor::default();
//! let extraction = extractor.set_project(vec![
//!     SourceFile::new("Child.jsx", "export function Child({ x }) { return <p>{x}</p>; }"),
//!     SourceFile::new("Parent.jsx", "function Parent() { const [s, setS] = useState(0); return <Child x={s}/>; }"),
//! ])?;
//!
//! println!("{}", extraction.graph.to_json_string()?);
//! # Ok::<(), compgraph::ExtractError>(())
//! ```

pub mod cli;
pub mod config;
pub mod discover;
pub mod error;
pub mod extractor;
pub mod graph;
pub mod parser;
pub mod project;
pub mod rpc;

// Re-exports for convenience
pub use config::{AttributeMarkup, ExtractorConfig};
pub use discover::discover_files;
pub use error::{ExtractError, Result};
pub use extractor::Extractor;
pub use project::{Project, SourceFile};

// Graph re-exports
pub use graph::{
    build_graph, ComponentEntity, Diagnostic, DiagnosticKind, EffectEntity, EntityId, EntityKind,
    Extraction, ExtractionGraph, GraphDocument, GraphStats, PropEntity, Relation, StateEntity,
};
pub use parser::{extract_file, SupportedLanguage};
