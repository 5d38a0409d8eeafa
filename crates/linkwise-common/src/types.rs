//! Domain primitive types used across the linkwise workspace.

use std::borrow::Borrow;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LinkwiseError, Result};

/// Unique name of a component within a dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentName(String);

impl ComponentName {
    /// Creates a component name from a string value.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for ComponentName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ComponentName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for ComponentName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ComponentName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Compiler family (`gcc`, `clang`, ...), compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CompilerFamily(String);

impl CompilerFamily {
    /// Creates a family, normalizing it to lowercase.
    #[must_use]
    pub fn new(family: impl AsRef<str>) -> Self {
        Self(family.as_ref().trim().to_ascii_lowercase())
    }

    /// Returns the normalized family name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompilerFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<String> for CompilerFamily {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<CompilerFamily> for String {
    fn from(value: CompilerFamily) -> Self {
        value.0
    }
}

/// The compiler that built (or will build) a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompilerIdentity {
    /// Compiler family.
    pub family: CompilerFamily,
    /// Absolute path to the C compiler executable.
    pub cc: PathBuf,
    /// Absolute path to the C++ compiler executable.
    pub cxx: PathBuf,
}

impl CompilerIdentity {
    /// Creates a compiler identity.
    #[must_use]
    pub fn new(family: impl AsRef<str>, cc: impl Into<PathBuf>, cxx: impl Into<PathBuf>) -> Self {
        Self {
            family: CompilerFamily::new(family),
            cc: cc.into(),
            cxx: cxx.into(),
        }
    }

    /// Checks that the family is non-empty and both executables are absolute.
    ///
    /// # Errors
    ///
    /// Returns [`LinkwiseError::Config`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.family.as_str().is_empty() {
            return Err(LinkwiseError::Config {
                message: "compiler family must not be empty".into(),
            });
        }
        for (label, path) in [("C", &self.cc), ("C++", &self.cxx)] {
            if !path.is_absolute() {
                return Err(LinkwiseError::Config {
                    message: format!(
                        "{label} compiler path must be absolute: {}",
                        path.display()
                    ),
                });
            }
        }
        Ok(())
    }
}

/// A chosen variant value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariantValue {
    /// Boolean variant (`+shared` / `~shared`).
    Bool(bool),
    /// Integer variant.
    Int(i64),
    /// Single-valued variant.
    Text(String),
    /// Multi-valued variant.
    List(Vec<String>),
}

impl VariantValue {
    /// Returns `true` if this value equals the textual form `raw`.
    #[must_use]
    pub fn matches(&self, raw: &str) -> bool {
        match self {
            Self::List(items) => items.iter().any(|i| i == raw),
            other => other.to_string() == raw,
        }
    }
}

impl fmt::Display for VariantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::List(items) => write!(f, "{}", items.join(",")),
        }
    }
}

impl From<&str> for VariantValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for VariantValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for VariantValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// How a dependency is needed by its dependent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// Needed only while building (e.g. `cmake`).
    Build,
    /// Linked into the dependent.
    #[default]
    Link,
    /// Needed only at run time.
    Run,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build => write!(f, "build"),
            Self::Link => write!(f, "link"),
            Self::Run => write!(f, "run"),
        }
    }
}

/// Joins a sub-directory onto an installation prefix.
#[must_use]
pub fn prefix_join(prefix: &Path, subdir: &str) -> PathBuf {
    if subdir.is_empty() {
        prefix.to_path_buf()
    } else {
        prefix.join(subdir)
    }
}
