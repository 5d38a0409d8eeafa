//! Compiler compatibility checks across a link boundary.
//!
//! Two mechanisms, both fatal on failure:
//! - [`check`]: the current compiler family must equal the family recorded
//!   on the designated upstream component. Always evaluated.
//! - [`ConflictRule`]: optional static incompatibilities declared by the
//!   metadata layer, e.g. `%gcc` when `^root%clang`.

use linkwise_common::error::{LinkwiseError, Result};
use linkwise_common::types::CompilerFamily;
use petgraph::graph::NodeIndex;

use crate::component::Component;
use crate::graph::DependencyGraph;
use crate::selector::Selector;

/// Fails unless `current` equals the compiler family `upstream` was built with.
///
/// # Errors
///
/// Returns [`LinkwiseError::Conflict`] naming both families on mismatch.
pub fn check(current: &CompilerFamily, upstream: &Component) -> Result<()> {
    let upstream_family = &upstream.compiler().family;
    if current == upstream_family {
        tracing::debug!(
            family = %current,
            upstream = %upstream.name(),
            "compiler family matches upstream"
        );
        return Ok(());
    }
    tracing::warn!(
        current = %current,
        upstream = %upstream.name(),
        upstream_family = %upstream_family,
        "compiler family conflict"
    );
    Err(LinkwiseError::Conflict {
        current: current.to_string(),
        upstream: upstream.name().to_string(),
        upstream_family: upstream_family.to_string(),
    })
}

/// A declared incompatibility: building a component matching `spec` is
/// refused when its dependencies match `when`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictRule {
    spec_text: String,
    when_text: String,
    spec: Selector,
    when: Selector,
}

impl ConflictRule {
    /// Parses a rule from its two selector strings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either selector is malformed.
    pub fn parse(spec: &str, when: &str) -> Result<Self> {
        Ok(Self {
            spec_text: spec.trim().to_string(),
            when_text: when.trim().to_string(),
            spec: spec.parse()?,
            when: when.parse()?,
        })
    }

    /// Selector for the component side, as written.
    #[must_use]
    pub fn spec(&self) -> &str {
        &self.spec_text
    }

    /// Selector for the dependency condition, as written.
    #[must_use]
    pub fn when(&self) -> &str {
        &self.when_text
    }

    /// Returns `true` if this rule forbids building `root` with `family`.
    ///
    /// # Errors
    ///
    /// Returns a graph error if the closure of `root` is cyclic.
    pub fn fires(
        &self,
        graph: &DependencyGraph,
        root: NodeIndex,
        family: &CompilerFamily,
    ) -> Result<bool> {
        Ok(self.spec.matches(graph, root, family)? && self.when.matches(graph, root, family)?)
    }
}

/// Evaluates every declared rule for `root`, failing on the first that fires.
///
/// # Errors
///
/// Returns [`LinkwiseError::DeclaredConflict`] for the first matching rule,
/// or a graph error if the closure of `root` is cyclic.
pub fn check_declared(
    graph: &DependencyGraph,
    root: NodeIndex,
    family: &CompilerFamily,
    rules: &[ConflictRule],
) -> Result<()> {
    let component = graph.component(root).ok_or_else(|| LinkwiseError::NotFound {
        kind: "graph node",
        id: format!("{}", root.index()),
    })?;
    for rule in rules {
        if rule.fires(graph, root, family)? {
            tracing::warn!(
                component = %component.name(),
                spec = rule.spec(),
                when = rule.when(),
                "declared conflict matched"
            );
            return Err(LinkwiseError::DeclaredConflict {
                component: component.name().to_string(),
                spec: rule.spec_text.clone(),
                when: rule.when_text.clone(),
            });
        }
    }
    Ok(())
}
