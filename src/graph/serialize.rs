//! JSON rendering and the human-readable trace.
//!
//! Component relations are written as id lists, never as nested objects,
//! so a document stays flat even when the graph has cycles.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

use super::engine::ExtractionGraph;
use super::types::{ComponentEntity, EntityId};
use crate::error::Result;

/// The serialized graph: `{ "componentList": [...] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDocument {
    pub component_list: Vec<ComponentRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRecord {
    pub id: EntityId,
    pub name: String,
    pub children: Vec<EntityId>,
    pub false_children: Vec<EntityId>,
    pub props: Vec<PropRecord>,
    pub states: Vec<StateRecord>,
    pub effects: Vec<EffectRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropRecord {
    pub id: EntityId,
    pub name: String,
    pub references: Vec<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecord {
    pub id: EntityId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectRecord {
    pub id: EntityId,
    pub dependency_ids: Vec<EntityId>,
    pub handling_target_ids: Vec<EntityId>,
}

impl GraphDocument {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn component(&self, id: EntityId) -> Option<&ComponentRecord> {
        self.component_list.iter().find(|c| c.id == id)
    }
}

impl ExtractionGraph {
    /// Snapshot the graph as a serializable document.
    pub fn to_document(&self) -> GraphDocument {
        GraphDocument {
            component_list: self
                .component_list()
                .map(|component| self.record(component))
                .collect(),
        }
    }

    fn record(&self, component: &ComponentEntity) -> ComponentRecord {
        let ids = |list: Vec<&ComponentEntity>| list.into_iter().map(|c| c.id).collect();
        ComponentRecord {
            id: component.id,
            name: component.name.clone(),
            children: ids(self.children(component.id)),
            false_children: ids(self.false_children(component.id)),
            props: component
                .props
                .iter()
                .map(|p| PropRecord {
                    id: p.id,
                    name: p.name.clone(),
                    references: p.references.clone(),
                })
                .collect(),
            states: component
                .states
                .iter()
                .map(|s| StateRecord {
                    id: s.id,
                    name: s.name.clone(),
                })
                .collect(),
            effects: component
                .effects
                .iter()
                .map(|e| EffectRecord {
                    id: e.id,
                    dependency_ids: e.dependency_ids.clone(),
                    handling_target_ids: e.handling_target_ids.clone(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.to_document())?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    /// Multi-line trace, one block per component in discovery order.
    pub fn print(&self) -> String {
        let mut out = String::new();
        for component in self.component_list() {
            // writing into a String cannot fail
            let _ = self.print_component(&mut out, component);
        }
        out
    }

    fn print_component(&self, out: &mut String, component: &ComponentEntity) -> fmt::Result {
        let names = |list: Vec<&ComponentEntity>| {
            list.iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let children = self.children(component.id);
        let false_children = self.false_children(component.id);

        writeln!(
            out,
            "{} ({}) {}:{}",
            component.name,
            component.id,
            component.file_path.display(),
            component.line_start
        )?;
        writeln!(
            out,
            "  props: {}  states: {}  effects: {}  children: {}  false children: {}",
            component.props.len(),
            component.states.len(),
            component.effects.len(),
            children.len(),
            false_children.len()
        )?;
        if !children.is_empty() {
            writeln!(out, "  children -> {}", names(children))?;
        }
        if !false_children.is_empty() {
            writeln!(out, "  false children -> {}", names(false_children))?;
        }
        Ok(())
    }
}

impl fmt::Display for ExtractionGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.print())
    }
}
