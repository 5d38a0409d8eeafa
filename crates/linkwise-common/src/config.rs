//! Resolver configuration model.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Names and layout conventions the resolver applies to a graph.
///
/// Every field has a default, so a partial `resolve:` section in a manifest
/// only overrides what it mentions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Designated upstream component the current build must link against.
    pub upstream: String,
    /// Variant on the upstream holding the C++ standard.
    pub standard_variant: String,
    /// Name of the compiler runtime component searched in the upstream closure.
    pub runtime_component: String,
    /// Component whose headers are added to the raw compiler flags.
    pub include_provider: Option<String>,
    /// Header sub-directory of the include provider's prefix.
    pub include_subdir: String,
    /// Library sub-directory of the runtime component's prefix.
    pub runtime_lib_subdir: String,
    /// Runtime shared object placed explicitly on the link line.
    pub runtime_shared_object: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            upstream: constants::DEFAULT_UPSTREAM.into(),
            standard_variant: constants::DEFAULT_STANDARD_VARIANT.into(),
            runtime_component: constants::DEFAULT_RUNTIME_COMPONENT.into(),
            include_provider: None,
            include_subdir: constants::DEFAULT_INCLUDE_SUBDIR.into(),
            runtime_lib_subdir: constants::DEFAULT_RUNTIME_LIB_SUBDIR.into(),
            runtime_shared_object: constants::DEFAULT_RUNTIME_SHARED_OBJECT.into(),
        }
    }
}
