//! Core types for the component graph.
//!
//! Defines entity ids, the entities owned by a component (props, states,
//! effects), the relation kinds between components, and diagnostics.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::parser::Classification;

/// The kind tag carried by every id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Component,
    Prop,
    State,
    Effect,
    /// The setter paired with a state. Never owned; only referenced.
    Setter,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Component => write!(f, "component"),
            EntityKind::Prop => write!(f, "prop"),
            EntityKind::State => write!(f, "state"),
            EntityKind::Effect => write!(f, "effect"),
            EntityKind::Setter => write!(f, "setter"),
        }
    }
}

/// A typed entity id, rendered as `<kind>-<n>`.
///
/// Setter ids share their state's number and render as
/// `setter-state-<n>`; consumers route edges on that prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    kind: EntityKind,
    index: usize,
}

impl EntityId {
    pub fn new(kind: EntityKind, index: usize) -> Self {
        Self { kind, index }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The setter paired with a state id.
    pub fn setter_of(state: EntityId) -> Option<EntityId> {
        (state.kind == EntityKind::State).then(|| EntityId::new(EntityKind::Setter, state.index))
    }

    /// The state a setter id belongs to.
    pub fn paired_state(&self) -> Option<EntityId> {
        (self.kind == EntityKind::Setter).then(|| EntityId::new(EntityKind::State, self.index))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EntityKind::Setter => write!(f, "setter-state-{}", self.index),
            kind => write!(f, "{}-{}", kind, self.index),
        }
    }
}

/// Error for strings that are not `<kind>-<n>` ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidEntityId(pub String);

impl fmt::Display for InvalidEntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid entity id: {}", self.0)
    }
}

impl std::error::Error for InvalidEntityId {}

impl FromStr for EntityId {
    type Err = InvalidEntityId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidEntityId(s.to_string());
        let (prefix, number) = s.rsplit_once('-').ok_or_else(invalid)?;
        let index: usize = number.parse().map_err(|_| invalid())?;
        let kind = match prefix {
            "component" => EntityKind::Component,
            "prop" => EntityKind::Prop,
            "state" => EntityKind::State,
            "effect" => EntityKind::Effect,
            "setter-state" => EntityKind::Setter,
            _ => return Err(invalid()),
        };
        Ok(EntityId::new(kind, index))
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A named input of a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropEntity {
    pub id: EntityId,
    pub name: String,
    /// Local name inside the owning component, if bound to an identifier.
    pub binding: Option<String>,
    /// State, prop or setter ids passed into this prop at call sites.
    pub references: Vec<EntityId>,
}

impl PropEntity {
    /// Record a reference, keeping first-seen order without duplicates.
    pub fn add_reference(&mut self, id: EntityId) {
        if !self.references.contains(&id) {
            self.references.push(id);
        }
    }
}

/// A local mutable cell of a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateEntity {
    pub id: EntityId,
    pub name: String,
    /// Id of the paired setter; stored rather than derived at use sites.
    pub setter_id: EntityId,
    /// Local name of the setter binding, if one was declared.
    pub setter_name: Option<String>,
}

impl StateEntity {
    pub fn new(index: usize, name: String, setter_name: Option<String>) -> Self {
        Self {
            id: EntityId::new(EntityKind::State, index),
            setter_id: EntityId::new(EntityKind::Setter, index),
            name,
            setter_name,
        }
    }
}

/// A side-effect routine of a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectEntity {
    pub id: EntityId,
    pub line: usize,
    /// State and prop ids from the declared dependency list.
    pub dependency_ids: Vec<EntityId>,
    /// Setter and prop-callback ids the effect body invokes.
    pub handling_target_ids: Vec<EntityId>,
}

/// A recognized component. Relations to other components live on the
/// graph's edges, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentEntity {
    pub id: EntityId,
    pub name: String,
    pub file_path: PathBuf,
    pub line_start: usize,
    pub line_end: usize,
    pub classification: Classification,
    pub props: Vec<PropEntity>,
    pub states: Vec<StateEntity>,
    pub effects: Vec<EffectEntity>,
}

impl ComponentEntity {
    /// Resolve a local binding name to the id it denotes in this
    /// component's scope: a state value, a state setter, or a prop.
    pub fn resolve_binding(&self, name: &str) -> Option<EntityId> {
        if let Some(state) = self.states.iter().find(|s| s.name == name) {
            return Some(state.id);
        }
        if let Some(state) = self
            .states
            .iter()
            .find(|s| s.setter_name.as_deref() == Some(name))
        {
            return Some(state.setter_id);
        }
        self.props
            .iter()
            .find(|p| p.binding.as_deref() == Some(name))
            .map(|p| p.id)
    }

    pub fn prop(&self, name: &str) -> Option<&PropEntity> {
        self.props.iter().find(|p| p.name == name)
    }

    pub(crate) fn prop_mut(&mut self, id: EntityId) -> Option<&mut PropEntity> {
        self.props.iter_mut().find(|p| p.id == id)
    }
}

/// The relation an edge between two components represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// The parent's template renders the child.
    Child,
    /// The parent references the component without nesting it.
    FalseChild,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Child => write!(f, "child"),
            Relation::FalseChild => write!(f, "false_child"),
        }
    }
}

/// Non-fatal findings of an extraction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The file could not be parsed and was skipped.
    ParseFailure,
    /// The file's extension is not a supported source language.
    UnsupportedFile,
    /// The same path was given more than once.
    DuplicateFile,
    /// A component name was declared twice in one file.
    DuplicateDeclaration,
    /// A name matched components in several files.
    AmbiguousBinding,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::ParseFailure => write!(f, "parse_failure"),
            DiagnosticKind::UnsupportedFile => write!(f, "unsupported_file"),
            DiagnosticKind::DuplicateFile => write!(f, "duplicate_file"),
            DiagnosticKind::DuplicateDeclaration => write!(f, "duplicate_declaration"),
            DiagnosticKind::AmbiguousBinding => write!(f, "ambiguous_binding"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub path: PathBuf,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(path: impl Into<PathBuf>, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.path.display(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_and_parse() {
        let cases = [
            (EntityId::new(EntityKind::Component, 0), "component-0"),
            (EntityId::new(EntityKind::Prop, 12), "prop-12"),
            (EntityId::new(EntityKind::State, 3), "state-3"),
            (EntityId::new(EntityKind::Effect, 7), "effect-7"),
            (EntityId::new(EntityKind::Setter, 3), "setter-state-3"),
        ];
        for (id, text) in cases {
            assert_eq!(id.to_string(), text);
            assert_eq!(text.parse::<EntityId>().unwrap(), id);
        }
    }

    #[test]
    fn test_invalid_ids() {
        for text in ["", "state", "state-x", "setter-3", "widget-1", "state--1"] {
            assert!(text.parse::<EntityId>().is_err(), "{text} should not parse");
        }
    }

    #[test]
    fn test_setter_pairing() {
        let state = EntityId::new(EntityKind::State, 4);
        let setter = EntityId::setter_of(state).unwrap();
        assert_eq!(setter.to_string(), "setter-state-4");
        assert_eq!(setter.paired_state(), Some(state));
        assert_eq!(EntityId::setter_of(EntityId::new(EntityKind::Prop, 4)), None);
    }

    #[test]
    fn test_id_serde_as_string() {
        let id = EntityId::new(EntityKind::Setter, 2);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"setter-state-2\"");
        let back: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_resolve_binding_order() {
        let component = ComponentEntity {
            id: EntityId::new(EntityKind::Component, 0),
            name: "Form".into(),
            file_path: PathBuf::from("Form.jsx"),
            line_start: 1,
            line_end: 5,
            classification: Classification::Markup,
            props: vec![PropEntity {
                id: EntityId::new(EntityKind::Prop, 0),
                name: "onSave".into(),
                binding: Some("save".into()),
                references: Vec::new(),
            }],
            states: vec![StateEntity::new(0, "draft".into(), Some("setDraft".into()))],
            effects: Vec::new(),
        };

        assert_eq!(component.resolve_binding("draft").unwrap().to_string(), "state-0");
        assert_eq!(
            component.resolve_binding("setDraft").unwrap().to_string(),
            "setter-state-0"
        );
        assert_eq!(component.resolve_binding("save").unwrap().to_string(), "prop-0");
        assert_eq!(component.resolve_binding("onSave"), None);
        assert_eq!(component.resolve_binding("missing"), None);
    }
}
