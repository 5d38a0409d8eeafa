//! Graph nodes: one buildable unit with its chosen configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use linkwise_common::types::{CompilerIdentity, ComponentName, VariantValue};

/// A component as seen by the resolver.
///
/// Built once by the metadata layer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    name: ComponentName,
    compiler: CompilerIdentity,
    variants: BTreeMap<String, VariantValue>,
    prefix: Option<PathBuf>,
}

impl Component {
    /// Creates a component with no variants and no installation prefix.
    #[must_use]
    pub fn new(name: impl Into<ComponentName>, compiler: CompilerIdentity) -> Self {
        Self {
            name: name.into(),
            compiler,
            variants: BTreeMap::new(),
            prefix: None,
        }
    }

    /// Records a chosen variant value.
    #[must_use]
    pub fn with_variant(mut self, key: impl Into<String>, value: impl Into<VariantValue>) -> Self {
        let _ = self.variants.insert(key.into(), value.into());
        self
    }

    /// Sets the installation prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Component name, unique within its graph.
    #[must_use]
    pub const fn name(&self) -> &ComponentName {
        &self.name
    }

    /// Compiler this component was built with.
    #[must_use]
    pub const fn compiler(&self) -> &CompilerIdentity {
        &self.compiler
    }

    /// All chosen variants, ordered by key.
    #[must_use]
    pub const fn variants(&self) -> &BTreeMap<String, VariantValue> {
        &self.variants
    }

    /// Installation prefix, if the component has been installed.
    #[must_use]
    pub fn prefix(&self) -> Option<&Path> {
        self.prefix.as_deref()
    }
}
