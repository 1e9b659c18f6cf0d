//! The extraction graph.
//!
//! Uses petgraph as an arena: every component is a node, every child or
//! false-child relation is an edge. Node indexes follow discovery order and
//! edge indexes follow insertion order, so both double as ordering keys.
//! The component relation may have several parents per node and may be
//! cyclic; every traversal carries a visited set.

use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::types::*;

/// All components of one run and the relations between them.
pub struct ExtractionGraph {
    graph: DiGraph<ComponentEntity, Relation>,
    /// Index: component id -> node index.
    index: HashMap<EntityId, NodeIndex>,
}

impl ExtractionGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
        }
    }

    // ─── Building ───────────────────────────────────────────────

    /// Add a component. Components must be added in discovery order.
    /// Adding an id twice returns the existing node.
    pub fn add_component(&mut self, component: ComponentEntity) -> NodeIndex {
        if let Some(&idx) = self.index.get(&component.id) {
            return idx;
        }
        let id = component.id;
        let idx = self.graph.add_node(component);
        self.index.insert(id, idx);
        idx
    }

    /// Relate two components. Returns false if either id is unknown.
    ///
    /// At most one edge exists per ordered pair. A child relation upgrades
    /// an existing false-child edge in place; a false-child relation never
    /// downgrades a child edge. This keeps children and false children
    /// disjoint.
    pub fn add_relation(&mut self, from: EntityId, to: EntityId, relation: Relation) -> bool {
        let (Some(&a), Some(&b)) = (self.index.get(&from), self.index.get(&to)) else {
            return false;
        };
        match self.graph.find_edge(a, b) {
            Some(edge) => {
                if relation == Relation::Child {
                    self.graph[edge] = Relation::Child;
                }
            }
            None => {
                self.graph.add_edge(a, b, relation);
            }
        }
        true
    }

    pub(crate) fn component_mut(&mut self, id: EntityId) -> Option<&mut ComponentEntity> {
        let idx = *self.index.get(&id)?;
        self.graph.node_weight_mut(idx)
    }

    // ─── Lookup ─────────────────────────────────────────────────

    pub fn component(&self, id: EntityId) -> Option<&ComponentEntity> {
        self.index.get(&id).map(|&idx| &self.graph[idx])
    }

    /// All components, in discovery order.
    pub fn component_list(&self) -> impl Iterator<Item = &ComponentEntity> + '_ {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    /// Components with the given name, in discovery order.
    pub fn find_by_name(&self, name: &str) -> Vec<&ComponentEntity> {
        self.component_list().filter(|c| c.name == name).collect()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Direct children, in the order they were discovered.
    pub fn children(&self, id: EntityId) -> Vec<&ComponentEntity> {
        self.related(id, Relation::Child)
    }

    /// False children, in the order they were discovered.
    pub fn false_children(&self, id: EntityId) -> Vec<&ComponentEntity> {
        self.related(id, Relation::FalseChild)
    }

    /// Components that list `id` as a direct child.
    pub fn parents(&self, id: EntityId) -> Vec<&ComponentEntity> {
        let Some(&idx) = self.index.get(&id) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .filter(|e| *e.weight() == Relation::Child)
            .collect();
        edges.sort_by_key(|e| e.id());
        edges.into_iter().map(|e| &self.graph[e.source()]).collect()
    }

    fn related(&self, id: EntityId, relation: Relation) -> Vec<&ComponentEntity> {
        match self.index.get(&id) {
            Some(&idx) => self
                .related_indices(idx, relation)
                .into_iter()
                .map(|i| &self.graph[i])
                .collect(),
            None => Vec::new(),
        }
    }

    fn related_indices(&self, idx: NodeIndex, relation: Relation) -> Vec<NodeIndex> {
        // petgraph walks outgoing edges newest first
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .filter(|e| *e.weight() == relation)
            .collect();
        edges.sort_by_key(|e| e.id());
        edges.into_iter().map(|e| e.target()).collect()
    }

    // ─── Traversal ──────────────────────────────────────────────

    /// Apply `visit` to `id` and to every component reachable from it through
    /// children (false children are not followed). Preorder, children in
    /// discovery order, each component exactly once even across cycles.
    pub fn visit_descendants(&self, id: EntityId, mut visit: impl FnMut(&ComponentEntity)) {
        let mut visited = HashSet::new();
        self.visit_descendants_with(id, &mut visited, &mut visit);
    }

    /// Like [`visit_descendants`](Self::visit_descendants), with a caller-owned
    /// visited set. Components already in `visited` are neither visited nor
    /// entered.
    pub fn visit_descendants_with(
        &self,
        id: EntityId,
        visited: &mut HashSet<EntityId>,
        visit: &mut dyn FnMut(&ComponentEntity),
    ) {
        let Some(&start) = self.index.get(&id) else {
            return;
        };

        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            let component = &self.graph[idx];
            if !visited.insert(component.id) {
                continue;
            }
            visit(component);

            for child in self.related_indices(idx, Relation::Child).into_iter().rev() {
                if !visited.contains(&self.graph[child].id) {
                    stack.push(child);
                }
            }
        }
    }

    /// Number of distinct components reachable through children, not
    /// counting `id` itself.
    pub fn count_descendants(&self, id: EntityId) -> usize {
        if !self.index.contains_key(&id) {
            return 0;
        }
        let mut count = 0;
        self.visit_descendants(id, |_| count += 1);
        count - 1
    }

    /// Direct children ordered by descendant count, largest subtree first.
    /// Equal counts keep discovery order.
    pub fn sorted_children(&self, id: EntityId) -> Vec<&ComponentEntity> {
        let mut children: Vec<(&ComponentEntity, usize)> = self
            .children(id)
            .into_iter()
            .map(|c| (c, self.count_descendants(c.id)))
            .collect();
        children.sort_by(|a, b| b.1.cmp(&a.1));
        children.into_iter().map(|(c, _)| c).collect()
    }

    /// Root components, in discovery order.
    ///
    /// Computed over the strongly connected components of the child
    /// relation: every group that no outside component renders contributes
    /// its earliest-discovered member. A plain component with no parents is
    /// its own group. Each component is then either a root or reachable
    /// from exactly the roots above it, never both.
    pub fn roots(&self) -> Vec<&ComponentEntity> {
        let child_graph = self.child_graph();
        let mut roots: Vec<NodeIndex> = Vec::new();

        for group in tarjan_scc(&child_graph) {
            let members: HashSet<NodeIndex> = group.iter().copied().collect();
            let entered = group.iter().any(|&n| {
                child_graph
                    .neighbors_directed(n, Direction::Incoming)
                    .any(|p| !members.contains(&p))
            });
            if entered {
                continue;
            }
            if let Some(&first) = group.iter().min() {
                roots.push(first);
            }
        }

        roots.sort();
        roots.into_iter().map(|idx| &self.graph[idx]).collect()
    }

    pub fn is_root(&self, id: EntityId) -> bool {
        self.roots().iter().any(|r| r.id == id)
    }

    /// The child relation alone, with the same node indexes.
    fn child_graph(&self) -> DiGraph<EntityId, ()> {
        self.graph.filter_map(
            |_, component| Some(component.id),
            |_, relation| (*relation == Relation::Child).then_some(()),
        )
    }

    // ─── Statistics ─────────────────────────────────────────────

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            component_count: self.graph.node_count(),
            root_count: self.roots().len(),
            cyclic: is_cyclic_directed(&self.child_graph()),
            ..Default::default()
        };
        for component in self.component_list() {
            stats.prop_count += component.props.len();
            stats.state_count += component.states.len();
            stats.effect_count += component.effects.len();
        }
        for edge in self.graph.edge_references() {
            match edge.weight() {
                Relation::Child => stats.child_edges += 1,
                Relation::FalseChild => stats.false_child_edges += 1,
            }
        }
        stats
    }
}

impl Default for ExtractionGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub component_count: usize,
    pub prop_count: usize,
    pub state_count: usize,
    pub effect_count: usize,
    pub child_edges: usize,
    pub false_child_edges: usize,
    pub root_count: usize,
    /// Whether the child relation contains a cycle.
    pub cyclic: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Classification;
    use std::path::PathBuf;

    fn component(index: usize, name: &str) -> ComponentEntity {
        ComponentEntity {
            id: EntityId::new(EntityKind::Component, index),
            name: name.to_string(),
            file_path: PathBuf::from("test.jsx"),
            line_start: 1,
            line_end: 1,
            classification: Classification::Markup,
            props: Vec::new(),
            states: Vec::new(),
            effects: Vec::new(),
        }
    }

    fn cid(index: usize) -> EntityId {
        EntityId::new(EntityKind::Component, index)
    }

    /// Build a graph of `names` with child edges given as index pairs.
    fn graph_of(names: &[&str], children: &[(usize, usize)]) -> ExtractionGraph {
        let mut graph = ExtractionGraph::new();
        for (i, name) in names.iter().enumerate() {
            graph.add_component(component(i, name));
        }
        for &(from, to) in children {
            graph.add_relation(cid(from), cid(to), Relation::Child);
        }
        graph
    }

    fn names(components: Vec<&ComponentEntity>) -> Vec<&str> {
        components.into_iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_empty_graph() {
        let graph = ExtractionGraph::new();
        assert!(graph.is_empty());
        assert!(graph.roots().is_empty());
        assert_eq!(graph.stats(), GraphStats::default());
        assert_eq!(graph.count_descendants(cid(0)), 0);
    }

    #[test]
    fn test_children_keep_discovery_order() {
        let graph = graph_of(&["App", "Header", "Body", "Footer"], &[(0, 1), (0, 2), (0, 3)]);
        assert_eq!(names(graph.children(cid(0))), vec!["Header", "Body", "Footer"]);
        assert_eq!(names(graph.parents(cid(2))), vec!["App"]);
    }

    #[test]
    fn test_child_upgrades_false_child() {
        let mut graph = graph_of(&["A", "B"], &[]);
        graph.add_relation(cid(0), cid(1), Relation::FalseChild);
        graph.add_relation(cid(0), cid(1), Relation::Child);
        graph.add_relation(cid(0), cid(1), Relation::FalseChild);

        assert_eq!(names(graph.children(cid(0))), vec!["B"]);
        assert!(graph.false_children(cid(0)).is_empty());
        assert_eq!(graph.stats().child_edges, 1);
    }

    #[test]
    fn test_unknown_relation_ends() {
        let mut graph = graph_of(&["A"], &[]);
        assert!(!graph.add_relation(cid(0), cid(9), Relation::Child));
        assert!(graph.children(cid(0)).is_empty());
    }

    #[test]
    fn test_visit_cycle_once_each() {
        let graph = graph_of(&["A", "B"], &[(0, 1), (1, 0)]);
        let mut seen = Vec::new();
        graph.visit_descendants(cid(0), |c| seen.push(c.name.clone()));
        assert_eq!(seen, vec!["A", "B"]);
        assert_eq!(graph.count_descendants(cid(0)), 1);
        assert!(graph.stats().cyclic);
    }

    #[test]
    fn test_visit_shared_child_once() {
        // App -> Left -> Shared, App -> Right -> Shared
        let graph = graph_of(
            &["App", "Left", "Right", "Shared"],
            &[(0, 1), (0, 2), (1, 3), (2, 3)],
        );
        let mut seen = Vec::new();
        graph.visit_descendants(cid(0), |c| seen.push(c.name.clone()));
        assert_eq!(seen, vec!["App", "Left", "Shared", "Right"]);
        assert_eq!(graph.count_descendants(cid(0)), 3);
    }

    #[test]
    fn test_visit_with_shared_visited_set() {
        let graph = graph_of(&["A", "B", "C"], &[(0, 2), (1, 2)]);
        let mut visited = HashSet::new();
        let mut seen = Vec::new();
        graph.visit_descendants_with(cid(0), &mut visited, &mut |c| seen.push(c.name.clone()));
        graph.visit_descendants_with(cid(1), &mut visited, &mut |c| seen.push(c.name.clone()));
        assert_eq!(seen, vec!["A", "C", "B"]);
    }

    #[test]
    fn test_false_children_not_traversed() {
        let mut graph = graph_of(&["A", "B"], &[]);
        graph.add_relation(cid(0), cid(1), Relation::FalseChild);
        assert_eq!(graph.count_descendants(cid(0)), 0);
        assert_eq!(names(graph.false_children(cid(0))), vec!["B"]);
        // B is only a false child, so it is still a root
        assert_eq!(names(graph.roots()), vec!["A", "B"]);
    }

    #[test]
    fn test_sorted_children_stable() {
        // App -> [Small, Big, Tiny]; Big -> [X, Y]; Small -> [Z]
        let graph = graph_of(
            &["App", "Small", "Big", "Tiny", "X", "Y", "Z"],
            &[(0, 1), (0, 2), (0, 3), (2, 4), (2, 5), (1, 6)],
        );
        assert_eq!(names(graph.sorted_children(cid(0))), vec!["Big", "Small", "Tiny"]);

        let flat = graph_of(&["P", "A", "B", "C"], &[(0, 1), (0, 2), (0, 3)]);
        assert_eq!(names(flat.sorted_children(cid(0))), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_roots_plain_forest() {
        let graph = graph_of(&["Leaf", "App", "Other"], &[(1, 0)]);
        assert_eq!(names(graph.roots()), vec!["App", "Other"]);
        assert!(graph.is_root(cid(1)));
        assert!(!graph.is_root(cid(0)));
    }

    #[test]
    fn test_roots_listed_child_before_parent() {
        // Child discovered before its parent must not become a root
        let graph = graph_of(&["Child", "Parent"], &[(1, 0)]);
        assert_eq!(names(graph.roots()), vec!["Parent"]);
    }

    #[test]
    fn test_roots_with_cycles() {
        // X <-> Y unreachable from anything else; Z <-> W renders X.
        let graph = graph_of(&["X", "Y", "Z", "W"], &[(0, 1), (1, 0), (2, 3), (3, 2), (2, 0)]);
        assert_eq!(names(graph.roots()), vec!["Z"]);
    }

    #[test]
    fn test_root_completeness() {
        let graph = graph_of(
            &["A", "B", "C", "D", "E", "F"],
            &[(0, 1), (1, 0), (1, 2), (3, 4), (4, 4), (5, 2)],
        );
        let roots = graph.roots();
        let root_ids: HashSet<EntityId> = roots.iter().map(|r| r.id).collect();

        let mut reached: HashMap<EntityId, usize> = HashMap::new();
        for root in &roots {
            graph.visit_descendants(root.id, |c| {
                if c.id != root.id {
                    *reached.entry(c.id).or_default() += 1;
                }
            });
        }
        for c in graph.component_list() {
            let is_root = root_ids.contains(&c.id);
            let is_reached = reached.contains_key(&c.id);
            assert!(is_root ^ is_reached, "{} must be root xor reached", c.name);
        }
    }

    #[test]
    fn test_stats_counts() {
        let mut graph = graph_of(&["A", "B", "C"], &[(0, 1)]);
        graph.add_relation(cid(0), cid(2), Relation::FalseChild);
        let stats = graph.stats();
        assert_eq!(stats.component_count, 3);
        assert_eq!(stats.child_edges, 1);
        assert_eq!(stats.false_child_edges, 1);
        assert_eq!(stats.root_count, 2);
        assert!(!stats.cyclic);

        let wire = serde_json::to_value(&stats).unwrap();
        assert_eq!(wire["componentCount"], 3);
        assert_eq!(wire["falseChildEdges"], 1);
    }
}
