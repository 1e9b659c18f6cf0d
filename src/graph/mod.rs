//! Component graph module: the structural backbone of the extractor.
//!
//! Provides the entity model, the graph arena with its traversal queries,
//! reference resolution, the two-pass builder and serialization.

pub mod builder;
pub mod engine;
pub mod resolver;
pub mod serialize;
pub mod types;

pub use builder::{build_graph, Extraction};
pub use engine::{ExtractionGraph, GraphStats};
pub use resolver::{normalize_path, resolve_effect, Binding, SymbolTable};
pub use serialize::{ComponentRecord, EffectRecord, GraphDocument, PropRecord, StateRecord};
pub use types::{
    ComponentEntity, Diagnostic, DiagnosticKind, EffectEntity, EntityId, EntityKind,
    InvalidEntityId, PropEntity, Relation, StateEntity,
};
