//! Reference resolution.
//!
//! Two jobs:
//! - inside one component, turn effect dependency lists and effect-body
//!   calls into state, prop and setter ids;
//! - across the whole project (pass 2), bind every markup instantiation and
//!   value reference to a component, producing child and false-child edges
//!   and the references of the receiving component's props.
//!
//! Identifiers that resolve to nothing are dropped silently: imports,
//! globals and literals are legitimately out of scope.

use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

use super::engine::ExtractionGraph;
use super::types::*;
use crate::config::{AttributeMarkup, ExtractorConfig};
use crate::parser::{
    AttributeBinding, EffectDecl, FileSkeleton, ImportedName, Placement, SupportedLanguage,
};

/// Resolve one declared effect against its owning component's bindings.
pub fn resolve_effect(owner: &ComponentEntity, id: EntityId, decl: &EffectDecl) -> EffectEntity {
    let mut effect = EffectEntity {
        id,
        line: decl.line,
        dependency_ids: Vec::new(),
        handling_target_ids: Vec::new(),
    };

    for name in &decl.dependencies {
        let resolved = owner
            .resolve_binding(name)
            .filter(|id| matches!(id.kind(), EntityKind::State | EntityKind::Prop));
        if let Some(dep) = resolved {
            if !effect.dependency_ids.contains(&dep) {
                effect.dependency_ids.push(dep);
            }
        }
    }

    for name in &decl.invoked {
        let resolved = owner
            .resolve_binding(name)
            .filter(|id| matches!(id.kind(), EntityKind::Setter | EntityKind::Prop));
        if let Some(target) = resolved {
            if !effect.handling_target_ids.contains(&target) {
                effect.handling_target_ids.push(target);
            }
        }
    }

    effect
}

/// Ids resolved from one attribute value in the caller's scope.
fn resolve_attribute(caller: &ComponentEntity, attribute: &AttributeBinding) -> Vec<EntityId> {
    let mut ids = Vec::new();
    for name in &attribute.reads {
        if let Some(id) = caller.resolve_binding(name) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    for name in &attribute.invokes {
        let resolved = caller
            .resolve_binding(name)
            .filter(|id| matches!(id.kind(), EntityKind::Setter | EntityKind::Prop));
        if let Some(id) = resolved {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

// ─── Pass 2: project-wide name resolution ──────────────────────────

#[derive(Default)]
struct FileScope {
    components: HashMap<String, EntityId>,
    default_export: Option<EntityId>,
}

/// Name tables built from the pass 1 results of every file.
pub struct SymbolTable {
    /// Name -> components with that name, in discovery order.
    by_name: HashMap<String, Vec<EntityId>>,
    /// Normalized file path -> what the file declares.
    by_file: HashMap<PathBuf, FileScope>,
}

/// Outcome of binding a name at a use site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Declared in the same file or imported from a project file.
    Scoped(EntityId),
    /// Bound by name alone; `candidates` is how many components matched.
    Global { id: EntityId, candidates: usize },
}

impl Binding {
    pub fn id(&self) -> EntityId {
        match *self {
            Binding::Scoped(id) | Binding::Global { id, .. } => id,
        }
    }
}

impl SymbolTable {
    /// Build the tables. `skeletons` and the graph's components must come
    /// from the same run, in the same order.
    pub fn new(skeletons: &[FileSkeleton], graph: &ExtractionGraph) -> Self {
        let mut by_name: HashMap<String, Vec<EntityId>> = HashMap::new();
        let mut by_file: HashMap<PathBuf, FileScope> = HashMap::new();

        for component in graph.component_list() {
            by_name
                .entry(component.name.clone())
                .or_default()
                .push(component.id);
            by_file
                .entry(normalize_path(&component.file_path))
                .or_default()
                .components
                .insert(component.name.clone(), component.id);
        }

        for skeleton in skeletons {
            let scope = by_file.entry(normalize_path(&skeleton.path)).or_default();
            scope.default_export = skeleton
                .default_export
                .as_ref()
                .and_then(|name| scope.components.get(name).copied());
        }

        Self { by_name, by_file }
    }

    /// Bind `name` as used in `file`.
    ///
    /// Order: a component declared in the same file; then the import that
    /// binds the name, which must lead to a project file; then, for names
    /// neither declared nor imported, the most recently declared component
    /// with that name anywhere.
    pub fn resolve(&self, file: &FileSkeleton, name: &str) -> Option<Binding> {
        let path = normalize_path(&file.path);

        if let Some(&id) = self.by_file.get(&path).and_then(|s| s.components.get(name)) {
            return Some(Binding::Scoped(id));
        }

        if let Some(import) = file.import(name) {
            // a package or a file outside the project binds nothing here
            let scope = self
                .resolve_module(&path, &import.source)
                .and_then(|module| self.by_file.get(&module))?;
            let found = match &import.imported {
                ImportedName::Default => scope
                    .default_export
                    .or_else(|| scope.components.get(name).copied()),
                ImportedName::Named(imported) => scope.components.get(imported).copied(),
                ImportedName::Namespace => None,
            };
            return found.map(Binding::Scoped);
        }

        let candidates = self.by_name.get(name)?;
        candidates.last().map(|&id| Binding::Global {
            id,
            candidates: candidates.len(),
        })
    }

    /// Map a relative import specifier to a project file.
    fn resolve_module(&self, importer: &Path, specifier: &str) -> Option<PathBuf> {
        if !specifier.starts_with('.') {
            return None;
        }
        let base = normalize_path(&importer.parent().unwrap_or(Path::new("")).join(specifier));
        if self.by_file.contains_key(&base) {
            return Some(base);
        }

        let extensions = SupportedLanguage::module_extensions();
        let with_ext = extensions.iter().map(|ext| {
            let mut candidate = base.clone().into_os_string();
            candidate.push(".");
            candidate.push(ext);
            PathBuf::from(candidate)
        });
        let index = extensions
            .iter()
            .map(|ext| base.join(format!("index.{ext}")));

        with_ext.chain(index).find(|p| self.by_file.contains_key(p))
    }
}

/// Lexically normalize a path: drop `.` segments and fold `..`.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for part in path.components() {
        match part {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// An edge found in pass 2, applied after the scan.
struct Link {
    from: EntityId,
    to: EntityId,
    relation: Relation,
}

/// A value passed into a prop: (receiving component, prop, value id).
type PropReference = (EntityId, EntityId, EntityId);

#[derive(Default)]
struct Scan {
    links: Vec<Link>,
    prop_refs: Vec<PropReference>,
    diagnostics: Vec<Diagnostic>,
    reported: HashSet<(PathBuf, String)>,
}

impl Scan {
    /// One diagnostic per (file, name) for names bound by global lookup
    /// among several candidates.
    fn note_binding(&mut self, file: &FileSkeleton, name: &str, binding: Binding) {
        let Binding::Global { id, candidates } = binding else {
            return;
        };
        if candidates < 2 || !self.reported.insert((file.path.clone(), name.to_string())) {
            return;
        }
        warn!(file = %file.path.display(), name, candidates, "ambiguous component binding");
        self.diagnostics.push(Diagnostic::new(
            &file.path,
            DiagnosticKind::AmbiguousBinding,
            format!("`{name}` matches {candidates} components; bound to the most recent ({id})"),
        ));
    }
}

/// Run pass 2 over the assembled graph: add component relations and prop
/// references. Returns diagnostics for ambiguous bindings.
pub fn resolve_project(
    skeletons: &[FileSkeleton],
    graph: &mut ExtractionGraph,
    config: &ExtractorConfig,
) -> Vec<Diagnostic> {
    let table = SymbolTable::new(skeletons, graph);
    let mut scan = Scan::default();
    for skeleton in skeletons {
        scan_file(&table, skeleton, graph, config, &mut scan);
    }

    // Child edges first so a false-child mention never claims the pair.
    scan.links.sort_by_key(|link| link.relation != Relation::Child);
    for link in &scan.links {
        graph.add_relation(link.from, link.to, link.relation);
    }

    for (component, prop, value) in scan.prop_refs {
        if let Some(prop) = graph.component_mut(component).and_then(|c| c.prop_mut(prop)) {
            prop.add_reference(value);
        }
    }

    debug!(links = scan.links.len(), "resolved component references");
    scan.diagnostics
}

fn scan_file(
    table: &SymbolTable,
    skeleton: &FileSkeleton,
    graph: &ExtractionGraph,
    config: &ExtractorConfig,
    scan: &mut Scan,
) {
    let Some(scope) = table.by_file.get(&normalize_path(&skeleton.path)) else {
        return;
    };

    for declared in &skeleton.components {
        let Some(owner) = scope
            .components
            .get(&declared.name)
            .and_then(|&id| graph.component(id))
        else {
            continue;
        };

        let is_local = |name: &str| declared.local_names.iter().any(|n| n == name);

        for site in &declared.instantiations {
            if is_local(&site.tag) {
                continue;
            }
            let Some(binding) = table.resolve(skeleton, &site.tag) else {
                continue;
            };
            scan.note_binding(skeleton, &site.tag, binding);
            let target = binding.id();

            let relation = match (site.placement, config.classification.attribute_markup) {
                (Placement::Rendered, _) | (Placement::Attribute, AttributeMarkup::Child) => {
                    Relation::Child
                }
                (Placement::Attribute, AttributeMarkup::FalseChild) => Relation::FalseChild,
            };
            scan.links.push(Link {
                from: owner.id,
                to: target,
                relation,
            });

            // false-child occurrences are structural only
            if relation != Relation::Child {
                continue;
            }
            let Some(receiver) = graph.component(target) else {
                continue;
            };
            for attribute in &site.attributes {
                let Some(prop) = receiver.prop(&attribute.name) else {
                    continue;
                };
                for value in resolve_attribute(owner, attribute) {
                    scan.prop_refs.push((target, prop.id, value));
                }
            }
        }

        for name in &declared.value_references {
            if is_local(name) {
                continue;
            }
            let Some(binding) = table.resolve(skeleton, name) else {
                continue;
            };
            scan.note_binding(skeleton, name, binding);
            scan.links.push(Link {
                from: owner.id,
                to: binding.id(),
                relation: Relation::FalseChild,
            });
        }
    }
}
