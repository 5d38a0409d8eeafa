//! # linkwise-manifest
//!
//! Describes a dependency graph as a YAML or JSON document and turns it
//! into the read-only [`DependencyGraph`](linkwise_core::graph::DependencyGraph)
//! the resolver consumes.
//!
//! Handles:
//! - **Model**: Serde model of components, compilers, variants, dependencies
//!   and declared conflicts.
//! - **Loader**: Reading and parsing manifest files.
//! - **Validator**: Semantic checks before any graph is built.

pub mod loader;
pub mod model;
pub mod validator;

pub use loader::{load, parse_json, parse_yaml};
pub use model::Manifest;
