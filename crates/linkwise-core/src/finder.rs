//! Predicate search for implicit dependencies.
//!
//! The caller decides what counts as a match (usually "is this the compiler
//! runtime library"), so the resolver never hard-codes component names.

use linkwise_common::error::Result;
use linkwise_common::types::VariantValue;
use petgraph::graph::NodeIndex;

use crate::component::Component;
use crate::graph::DependencyGraph;
use crate::lookup::Lookup;

/// Returns the first component in the closure of `root` that satisfies
/// `predicate`, in traversal order (the root itself is a candidate).
///
/// # Errors
///
/// Returns a graph error if a cycle is reached before any match.
pub fn find<'g, P>(
    graph: &'g DependencyGraph,
    root: NodeIndex,
    predicate: P,
) -> Result<Lookup<&'g Component>>
where
    P: Fn(&Component) -> bool,
{
    for visit in graph.traverse(root) {
        let component = visit?;
        if predicate(component) {
            tracing::debug!(component = %component.name(), "implicit dependency found");
            return Ok(Lookup::Found(component));
        }
    }
    tracing::debug!("no implicit dependency matched");
    Ok(Lookup::Absent)
}

/// Matches components with the given name.
pub fn named(name: impl Into<String>) -> impl Fn(&Component) -> bool + Send + Sync + 'static {
    let name = name.into();
    move |component| component.name() == name.as_str()
}

/// Matches components whose variant `key` equals `value`.
pub fn has_variant(
    key: impl Into<String>,
    value: impl Into<String>,
) -> impl Fn(&Component) -> bool + Send + Sync + 'static {
    let key = key.into();
    let value = value.into();
    move |component| {
        component
            .variants()
            .get(&key)
            .is_some_and(|v: &VariantValue| v.matches(&value))
    }
}
