//! Serde model of a component manifest.
//!
//! ```yaml
//! resolve:
//!   include_provider: sqlite
//! components:
//!   - name: araroot
//!     compiler: { family: gcc, cc: /usr/bin/gcc, cxx: /usr/bin/g++ }
//!     dependencies: [root, sqlite, { name: cmake, kind: build }]
//!     conflicts:
//!       - { spec: "%gcc", when: "^root%clang" }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use linkwise_common::config::ResolverConfig;
use linkwise_common::error::{LinkwiseError, Result};
use linkwise_common::types::{CompilerIdentity, DependencyKind, VariantValue};
use linkwise_core::component::Component;
use linkwise_core::graph::DependencyGraph;
use linkwise_core::resolver::ResolutionRequest;
use linkwise_core::toolchain::ConflictRule;
use serde::{Deserialize, Serialize};

/// Root of a manifest document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Resolver settings; omitted fields keep their defaults.
    #[serde(default)]
    pub resolve: ResolverConfig,
    /// Component declarations.
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
}

/// A declared component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentSpec {
    /// Unique component name.
    pub name: String,
    /// Compiler the component is (or was) built with.
    pub compiler: CompilerIdentity,
    /// Installation prefix.
    #[serde(default)]
    pub prefix: Option<PathBuf>,
    /// Chosen variant values.
    #[serde(default)]
    pub variants: BTreeMap<String, VariantValue>,
    /// Direct dependencies in declaration order.
    #[serde(default)]
    pub dependencies: Vec<DependencySpec>,
    /// Declared incompatibilities.
    #[serde(default)]
    pub conflicts: Vec<ConflictSpec>,
}

/// A dependency reference: a bare name, or a name with an edge kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencySpec {
    /// `root`
    Name(String),
    /// `{ name: cmake, kind: build }`
    Detailed {
        /// Referenced component.
        name: String,
        /// Edge kind.
        #[serde(default)]
        kind: DependencyKind,
    },
}

impl DependencySpec {
    /// Referenced component name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::Detailed { name, .. } => name,
        }
    }

    /// Edge kind; bare names are link dependencies.
    #[must_use]
    pub fn kind(&self) -> DependencyKind {
        match self {
            Self::Name(_) => DependencyKind::default(),
            Self::Detailed { kind, .. } => *kind,
        }
    }
}

/// A declared conflict in selector form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConflictSpec {
    /// Selector for the component side, e.g. `%gcc`.
    pub spec: String,
    /// Selector for the condition, e.g. `^root%clang`; empty means always.
    #[serde(default)]
    pub when: String,
}

impl ConflictSpec {
    /// Parses into a rule the resolver can evaluate.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for malformed selectors.
    pub fn to_rule(&self) -> Result<ConflictRule> {
        ConflictRule::parse(&self.spec, &self.when)
    }
}

impl ComponentSpec {
    fn to_component(&self) -> Component {
        let mut component = Component::new(self.name.as_str(), self.compiler.clone());
        for (key, value) in &self.variants {
            component = component.with_variant(key.clone(), value.clone());
        }
        if let Some(prefix) = &self.prefix {
            component = component.with_prefix(prefix.clone());
        }
        component
    }
}

impl Manifest {
    /// Returns the declaration of `name`.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&ComponentSpec> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Resolver configuration declared by this manifest.
    #[must_use]
    pub fn config(&self) -> ResolverConfig {
        self.resolve.clone()
    }

    /// Builds the dependency graph: all components first, then edges in
    /// declaration order.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate names or undefined dependencies.
    pub fn to_graph(&self) -> Result<DependencyGraph> {
        tracing::info!(components = self.components.len(), "building dependency graph");
        let mut graph = DependencyGraph::new();
        let mut node_map = HashMap::new();
        for spec in &self.components {
            let idx = graph.add_component(spec.to_component())?;
            let _ = node_map.insert(spec.name.as_str(), idx);
        }
        for spec in &self.components {
            let from = node_map[spec.name.as_str()];
            for dep in &spec.dependencies {
                let to = node_map
                    .get(dep.name())
                    .copied()
                    .ok_or_else(|| LinkwiseError::NotFound {
                        kind: "component",
                        id: format!(
                            "dependency \"{}\" of \"{}\" is not defined",
                            dep.name(),
                            spec.name
                        ),
                    })?;
                graph.add_dependency(from, to, dep.kind());
            }
        }
        Ok(graph)
    }

    /// Parses the declared conflicts of `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not declared or a selector is malformed.
    pub fn conflicts_for(&self, name: &str) -> Result<Vec<ConflictRule>> {
        let spec = self.component(name).ok_or_else(|| LinkwiseError::NotFound {
            kind: "component",
            id: name.to_string(),
        })?;
        spec.conflicts.iter().map(ConflictSpec::to_rule).collect()
    }

    /// Builds a resolution request for `name` carrying its declared conflicts.
    ///
    /// # Errors
    ///
    /// Same as [`Manifest::conflicts_for`].
    pub fn request_for(&self, name: &str) -> Result<ResolutionRequest> {
        Ok(ResolutionRequest::new(name).conflicts(self.conflicts_for(name)?))
    }
}
