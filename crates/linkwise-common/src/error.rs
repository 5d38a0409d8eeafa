//! Unified error types for the linkwise workspace.
//!
//! Resolution is all-or-nothing: every variant here aborts the resolution
//! that raised it. A missing variant or a missing implicit dependency is not
//! an error and never shows up here (see `linkwise_core::lookup::Lookup`).

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum LinkwiseError {
    /// The dependency graph is malformed (a cycle was found during traversal).
    #[error("malformed dependency graph: {message}")]
    Graph {
        /// Description of the defect, including the offending path.
        message: String,
    },

    /// The compiler family of the current build differs from the family
    /// recorded on the designated upstream component.
    #[error(
        "compiler family conflict: current build uses {current}, \
         but upstream {upstream} was built with {upstream_family}"
    )]
    Conflict {
        /// Compiler family selected for the current build.
        current: String,
        /// Designated upstream component.
        upstream: String,
        /// Compiler family recorded on the upstream component.
        upstream_family: String,
    },

    /// A statically declared conflict rule matched.
    #[error("{component} conflicts with \"{spec}\" when \"{when}\"")]
    DeclaredConflict {
        /// Component being built.
        component: String,
        /// Selector describing the component side of the rule.
        spec: String,
        /// Selector describing the dependency condition of the rule.
        when: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// YAML deserialization failed.
    #[error("YAML error: {source}")]
    Yaml {
        /// Underlying YAML error.
        #[from]
        source: serde_yaml::Error,
    },
}

impl LinkwiseError {
    /// Returns `true` for errors caused by incompatible toolchains,
    /// whether detected by the family check or by a declared rule.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::DeclaredConflict { .. })
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, LinkwiseError>;
