//! Dependency graph management using `petgraph`.
//!
//! Edges point from a dependent to its dependency. Traversal is depth-first
//! pre-order with edges taken in declaration order, so every query that
//! depends on "first match" is reproducible across runs.

use std::collections::{HashMap, HashSet};

use linkwise_common::error::{LinkwiseError, Result};
use linkwise_common::types::{ComponentName, DependencyKind};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

use crate::component::Component;

/// A dependency graph of components.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Internal petgraph representation.
    graph: petgraph::Graph<Component, DependencyKind>,
    /// Name to node lookup; names are unique.
    index: HashMap<ComponentName, NodeIndex>,
}

impl DependencyGraph {
    /// Creates an empty dependency graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a component node to the graph.
    ///
    /// # Errors
    ///
    /// Returns an error if a component with the same name already exists.
    pub fn add_component(&mut self, component: Component) -> Result<NodeIndex> {
        if self.index.contains_key(component.name()) {
            return Err(LinkwiseError::Config {
                message: format!("duplicate component name: \"{}\"", component.name()),
            });
        }
        let name = component.name().clone();
        let idx = self.graph.add_node(component);
        let _ = self.index.insert(name, idx);
        Ok(idx)
    }

    /// Adds a dependency edge: `dependent` depends on `dependency`.
    pub fn add_dependency(
        &mut self,
        dependent: NodeIndex,
        dependency: NodeIndex,
        kind: DependencyKind,
    ) {
        let _ = self.graph.add_edge(dependent, dependency, kind);
    }

    /// Number of components in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns `true` if the graph has no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Looks up a node by component name.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<NodeIndex> {
        self.index.get(name).copied()
    }

    /// Looks up a node by component name, failing if it is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`LinkwiseError::NotFound`] if no component has that name.
    pub fn require(&self, name: &str) -> Result<NodeIndex> {
        self.index_of(name).ok_or_else(|| LinkwiseError::NotFound {
            kind: "component",
            id: name.to_string(),
        })
    }

    /// Returns the component stored at `idx`.
    #[must_use]
    pub fn component(&self, idx: NodeIndex) -> Option<&Component> {
        self.graph.node_weight(idx)
    }

    /// Returns the component with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Component> {
        self.index_of(name).and_then(|idx| self.component(idx))
    }

    /// Direct dependencies of `idx` in declaration order, with edge kinds.
    ///
    /// `petgraph` walks outgoing edges newest-first; sorting by edge index
    /// restores the order in which they were added.
    #[must_use]
    pub fn dependencies(&self, idx: NodeIndex) -> Vec<(NodeIndex, DependencyKind)> {
        let mut edges: Vec<_> = self.graph.edges(idx).collect();
        edges.sort_by_key(|e| e.id());
        edges
            .into_iter()
            .map(|e| (e.target(), *e.weight()))
            .collect()
    }

    /// Lazily visits `root` and everything reachable from it, each node once.
    ///
    /// The root is yielded first. If a dependency edge leads back onto the
    /// current path the iterator yields a [`LinkwiseError::Graph`] and stops.
    #[must_use]
    pub fn traverse(&self, root: NodeIndex) -> Traverse<'_> {
        Traverse {
            graph: self,
            start: Some(root),
            stack: Vec::new(),
            visited: HashSet::new(),
            on_path: HashSet::new(),
            done: false,
        }
    }

    /// Collects the full closure of `root` in traversal order.
    ///
    /// # Errors
    ///
    /// Returns an error if the closure contains a cycle or `root` is unknown.
    pub fn closure(&self, root: NodeIndex) -> Result<Vec<&Component>> {
        self.traverse(root).collect()
    }

    /// Finds the component called `name` among the dependencies of `root`
    /// (the root itself excluded).
    ///
    /// # Errors
    ///
    /// Returns an error if a cycle is found before the component.
    pub fn find_in_closure(&self, root: NodeIndex, name: &str) -> Result<Option<&Component>> {
        for visit in self.traverse(root).skip(1) {
            let component = visit?;
            if component.name() == name {
                return Ok(Some(component));
            }
        }
        Ok(None)
    }

    /// Returns a build ordering of the whole graph.
    ///
    /// Dependencies appear before the components that depend on them
    /// (the order is reversed from `petgraph::algo::toposort`).
    ///
    /// # Errors
    ///
    /// Returns an error if the graph contains cycles.
    pub fn build_order(&self) -> Result<Vec<ComponentName>> {
        match petgraph::algo::toposort(&self.graph, None) {
            Ok(indices) => Ok(indices
                .iter()
                .rev()
                .filter_map(|&idx| self.component(idx).map(|c| c.name().clone()))
                .collect()),
            Err(cycle) => {
                let name = self
                    .component(cycle.node_id())
                    .map_or_else(|| "?".to_string(), |c| c.name().to_string());
                Err(LinkwiseError::Graph {
                    message: format!("cyclic dependency detected involving \"{name}\""),
                })
            }
        }
    }
}

/// One node on the current depth-first path.
#[derive(Debug)]
struct Frame {
    node: NodeIndex,
    children: Vec<NodeIndex>,
    next: usize,
}

/// Depth-first pre-order iterator returned by [`DependencyGraph::traverse`].
#[derive(Debug)]
pub struct Traverse<'g> {
    graph: &'g DependencyGraph,
    start: Option<NodeIndex>,
    stack: Vec<Frame>,
    visited: HashSet<NodeIndex>,
    on_path: HashSet<NodeIndex>,
    done: bool,
}

impl<'g> Traverse<'g> {
    fn enter(&mut self, node: NodeIndex) -> Result<&'g Component> {
        let graph = self.graph;
        let component = graph.component(node).ok_or_else(|| LinkwiseError::NotFound {
            kind: "graph node",
            id: format!("{}", node.index()),
        })?;
        tracing::trace!(component = %component.name(), depth = self.stack.len(), "visiting");
        let _ = self.visited.insert(node);
        let _ = self.on_path.insert(node);
        self.stack.push(Frame {
            node,
            children: graph.dependencies(node).into_iter().map(|(n, _)| n).collect(),
            next: 0,
        });
        Ok(component)
    }

    fn cycle_error(&self, back_to: NodeIndex) -> LinkwiseError {
        let name = |idx: NodeIndex| {
            self.graph
                .component(idx)
                .map_or_else(|| "?".to_string(), |c| c.name().to_string())
        };
        let start = self
            .stack
            .iter()
            .position(|f| f.node == back_to)
            .unwrap_or_default();
        let mut path: Vec<String> = self.stack[start..].iter().map(|f| name(f.node)).collect();
        path.push(name(back_to));
        LinkwiseError::Graph {
            message: format!("cyclic dependency detected: {}", path.join(" -> ")),
        }
    }
}

impl<'g> Iterator for Traverse<'g> {
    type Item = Result<&'g Component>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(root) = self.start.take() {
            let entered = self.enter(root);
            if entered.is_err() {
                self.done = true;
            }
            return Some(entered);
        }
        loop {
            let frame = self.stack.last_mut()?;
            if let Some(&child) = frame.children.get(frame.next) {
                frame.next += 1;
                if self.on_path.contains(&child) {
                    self.done = true;
                    return Some(Err(self.cycle_error(child)));
                }
                if !self.visited.contains(&child) {
                    return Some(self.enter(child));
                }
            } else if let Some(finished) = self.stack.pop() {
                let _ = self.on_path.remove(&finished.node);
            }
        }
    }
}
