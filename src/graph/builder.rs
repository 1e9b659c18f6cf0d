//! Graph builder: runs both passes over a project and assembles the graph.
//!
//! Pass 1 recognizes every file independently (in parallel when enabled).
//! Its results are collected in input order, which is the only join point.
//! Ids are then assigned sequentially and pass 2 resolves cross-component
//! references over the merged, read-only view.

use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{info, warn};

use super::engine::{ExtractionGraph, GraphStats};
use super::resolver::{resolve_effect, resolve_project};
use super::types::*;
use crate::config::ExtractorConfig;
use crate::error::ExtractError;
use crate::parser::{extract_file, ComponentSkeleton, FileSkeleton};
use crate::project::{Project, SourceFile};

/// The result of one extraction run.
pub struct Extraction {
    pub graph: ExtractionGraph,
    /// Non-fatal findings, in the order they were produced.
    pub diagnostics: Vec<Diagnostic>,
}

impl Extraction {
    pub fn stats(&self) -> GraphStats {
        self.graph.stats()
    }
}

/// Per-kind id counters, advanced in file order then declaration order.
#[derive(Default)]
struct IdAllocator {
    next: HashMap<EntityKind, usize>,
}

impl IdAllocator {
    fn next(&mut self, kind: EntityKind) -> usize {
        let counter = self.next.entry(kind).or_insert(0);
        let index = *counter;
        *counter += 1;
        index
    }

    fn id(&mut self, kind: EntityKind) -> EntityId {
        EntityId::new(kind, self.next(kind))
    }
}

/// Build the extraction graph for a project.
///
/// Never fails: unreadable files become diagnostics and an empty project
/// yields an empty graph.
pub fn build_graph(project: &Project, config: &ExtractorConfig) -> Extraction {
    let mut diagnostics: Vec<Diagnostic> = project
        .duplicates()
        .iter()
        .map(|path| {
            Diagnostic::new(
                path,
                DiagnosticKind::DuplicateFile,
                "path given more than once; first occurrence kept",
            )
        })
        .collect();

    let recognize = |file: &SourceFile| extract_file(&file.path, &file.content, config);
    let results: Vec<_> = if config.parallel {
        project.files().par_iter().map(recognize).collect()
    } else {
        project.files().iter().map(recognize).collect()
    };

    let mut skeletons = Vec::with_capacity(results.len());
    for (file, result) in project.files().iter().zip(results) {
        match result {
            Ok(skeleton) => {
                for name in &skeleton.merged_duplicates {
                    diagnostics.push(Diagnostic::new(
                        &file.path,
                        DiagnosticKind::DuplicateDeclaration,
                        format!("component `{name}` declared more than once; first declaration kept"),
                    ));
                }
                skeletons.push(skeleton);
            }
            Err(err @ ExtractError::UnsupportedLanguage(_)) => {
                diagnostics.push(Diagnostic::new(
                    &file.path,
                    DiagnosticKind::UnsupportedFile,
                    err.to_string(),
                ));
            }
            Err(err) => {
                diagnostics.push(Diagnostic::new(
                    &file.path,
                    DiagnosticKind::ParseFailure,
                    err.to_string(),
                ));
            }
        }
    }

    let mut ids = IdAllocator::default();
    let mut graph = ExtractionGraph::new();
    for skeleton in &skeletons {
        for declared in &skeleton.components {
            graph.add_component(assemble(skeleton, declared, &mut ids));
        }
    }

    diagnostics.extend(resolve_project(&skeletons, &mut graph, config));

    for diagnostic in &diagnostics {
        if diagnostic.kind != DiagnosticKind::AmbiguousBinding {
            warn!(
                file = %diagnostic.path.display(),
                kind = %diagnostic.kind,
                "{}",
                diagnostic.message
            );
        }
    }
    info!(
        files = project.len(),
        parsed = skeletons.len(),
        components = graph.len(),
        diagnostics = diagnostics.len(),
        "extraction complete"
    );

    Extraction { graph, diagnostics }
}

/// Turn one recognized component into an entity with ids and resolved
/// effects. Relations are added later by pass 2.
fn assemble(
    file: &FileSkeleton,
    declared: &ComponentSkeleton,
    ids: &mut IdAllocator,
) -> ComponentEntity {
    let mut component = ComponentEntity {
        id: ids.id(EntityKind::Component),
        name: declared.name.clone(),
        file_path: file.path.clone(),
        line_start: declared.line_start,
        line_end: declared.line_end,
        classification: declared.classification,
        props: Vec::with_capacity(declared.props.len()),
        states: Vec::with_capacity(declared.states.len()),
        effects: Vec::with_capacity(declared.effects.len()),
    };

    for prop in &declared.props {
        component.props.push(PropEntity {
            id: ids.id(EntityKind::Prop),
            name: prop.name.clone(),
            binding: prop.binding.clone(),
            references: Vec::new(),
        });
    }

    for state in &declared.states {
        let index = ids.next(EntityKind::State);
        component
            .states
            .push(StateEntity::new(index, state.name.clone(), state.setter.clone()));
    }

    // effects resolve against the bindings declared above
    let effects: Vec<EffectEntity> = declared
        .effects
        .iter()
        .map(|effect| resolve_effect(&component, ids.id(EntityKind::Effect), effect))
        .collect();
    component.effects = effects;

    component
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(files: &[(&str, &str)]) -> Project {
        Project::new(
            files
                .iter()
                .map(|(path, content)| SourceFile::new(*path, *content))
                .collect(),
        )
    }

    #[test]
    fn test_id_allocator_per_kind() {
        let mut ids = IdAllocator::default();
        assert_eq!(ids.id(EntityKind::Component).to_string(), "component-0");
        assert_eq!(ids.id(EntityKind::Prop).to_string(), "prop-0");
        assert_eq!(ids.id(EntityKind::Component).to_string(), "component-1");
        assert_eq!(ids.next(EntityKind::State), 0);
        assert_eq!(ids.next(EntityKind::State), 1);
    }

    #[test]
    fn test_ids_follow_file_then_declaration_order() {
        let files = project(&[
            ("b.jsx", "function B({ x }) { return <div/>; }\nfunction C() { return <p/>; }"),
            ("a.jsx", "function A({ y, z }) { return <B x={y}/>; }"),
        ]);
        let extraction = build_graph(&files, &ExtractorConfig::default());
        let listed: Vec<(String, String)> = extraction
            .graph
            .component_list()
            .map(|c| (c.id.to_string(), c.name.clone()))
            .collect();
        assert_eq!(
            listed,
            vec![
                ("component-0".to_string(), "B".to_string()),
                ("component-1".to_string(), "C".to_string()),
                ("component-2".to_string(), "A".to_string()),
            ]
        );
        let a = &extraction.graph.find_by_name("A")[0];
        let prop_ids: Vec<String> = a.props.iter().map(|p| p.id.to_string()).collect();
        assert_eq!(prop_ids, vec!["prop-1", "prop-2"]);
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let files = project(&[
            ("one.jsx", "function One() { const [a, setA] = useState(0); return <Two v={a}/>; }"),
            ("two.jsx", "function Two({ v }) { return <Three/>; }"),
            ("three.jsx", "function Three() { return <span/>; }"),
        ]);
        let mut config = ExtractorConfig::default();
        let parallel = build_graph(&files, &config);
        config.parallel = false;
        let sequential = build_graph(&files, &config);

        let summary = |e: &Extraction| -> Vec<ComponentEntity> {
            e.graph.component_list().cloned().collect()
        };
        assert_eq!(summary(&parallel), summary(&sequential));
        assert_eq!(parallel.stats(), sequential.stats());
    }

    #[test]
    fn test_file_diagnostics() {
        let files = project(&[
            ("ok.jsx", "function Ok() { return <div/>; }"),
            ("styles.css", "body { color: red; }"),
            ("broken.jsx", "function Broken( { return <div>; }"),
            ("ok.jsx", "function Again() { return <div/>; }"),
            ("dup.jsx", "function D() { return <a/>; }\nfunction D() { return <b/>; }"),
        ]);
        let extraction = build_graph(&files, &ExtractorConfig::default());

        let kinds: Vec<(DiagnosticKind, String)> = extraction
            .diagnostics
            .iter()
            .map(|d| (d.kind, d.path.display().to_string()))
            .collect();
        assert!(kinds.contains(&(DiagnosticKind::DuplicateFile, "ok.jsx".into())));
        assert!(kinds.contains(&(DiagnosticKind::UnsupportedFile, "styles.css".into())));
        assert!(kinds.contains(&(DiagnosticKind::ParseFailure, "broken.jsx".into())));
        assert!(kinds.contains(&(DiagnosticKind::DuplicateDeclaration, "dup.jsx".into())));

        let names: Vec<&str> = extraction.graph.component_list().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ok", "D"]);
    }

    #[test]
    fn test_empty_project() {
        let extraction = build_graph(&Project::default(), &ExtractorConfig::default());
        assert!(extraction.graph.is_empty());
        assert!(extraction.diagnostics.is_empty());
    }
}
