//! Environment variable composition.
//!
//! Derived variables are described as values, not applied to a process:
//! [`compose`] returns a new environment and leaves the base untouched.

use std::collections::BTreeMap;
use std::fmt;

use linkwise_common::constants::{FLAG_SEPARATOR, PATH_SEPARATOR};
use serde::{Deserialize, Serialize};

/// A process environment snapshot, ordered by variable name.
pub type Environment = BTreeMap<String, String>;

/// How a derived variable combines with an existing value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    /// Replace any existing value.
    Set,
    /// Existing value, separator, new value.
    Append,
    /// New value, separator, existing value.
    Prepend,
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Set => "set",
            Self::Append => "append",
            Self::Prepend => "prepend",
        })
    }
}

/// One derived environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    /// Variable name.
    pub key: String,
    /// Value to merge in.
    pub value: String,
    /// Merge policy.
    pub policy: MergePolicy,
    /// Separator used by `append` and `prepend`.
    pub separator: String,
}

impl EnvVar {
    /// Creates a derived variable with an explicit policy and separator.
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        policy: MergePolicy,
        separator: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            policy,
            separator: separator.into(),
        }
    }

    /// Overwrites `key`.
    #[must_use]
    pub fn set(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, value, MergePolicy::Set, PATH_SEPARATOR)
    }

    /// Puts a path in front of a path list.
    #[must_use]
    pub fn prepend_path(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, value, MergePolicy::Prepend, PATH_SEPARATOR)
    }

    /// Adds a path at the end of a path list.
    #[must_use]
    pub fn append_path(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, value, MergePolicy::Append, PATH_SEPARATOR)
    }

    /// Adds flags at the end of a space-separated flag string.
    #[must_use]
    pub fn append_flags(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, value, MergePolicy::Append, FLAG_SEPARATOR)
    }

    /// Merges this variable into `existing`. Empty values count as unset.
    #[must_use]
    pub fn merge(&self, existing: Option<&str>) -> String {
        let existing = existing.filter(|v| !v.is_empty());
        match (self.policy, existing) {
            (MergePolicy::Set, _) | (_, None) => self.value.clone(),
            (MergePolicy::Append, Some(old)) => format!("{old}{}{}", self.separator, self.value),
            (MergePolicy::Prepend, Some(old)) => format!("{}{}{old}", self.value, self.separator),
        }
    }
}

/// Applies `derived` to a copy of `base`, in order.
///
/// Each variable sees the result of the ones before it, so two `prepend`s
/// onto the same key stack up.
#[must_use]
pub fn compose(base: &Environment, derived: &[EnvVar]) -> Environment {
    let mut env = base.clone();
    for var in derived {
        let merged = var.merge(env.get(&var.key).map(String::as_str));
        tracing::trace!(key = %var.key, policy = %var.policy, "composing variable");
        let _ = env.insert(var.key.clone(), merged);
    }
    env
}
