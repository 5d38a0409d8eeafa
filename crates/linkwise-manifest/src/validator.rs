//! Semantic validation of a parsed manifest.
//!
//! Checks for duplicate names, undefined dependency references, malformed
//! compilers and conflict selectors before any graph is built.

use std::collections::HashSet;

use linkwise_common::error::{LinkwiseError, Result};

use crate::model::Manifest;

/// Validates a parsed manifest for semantic correctness.
///
/// # Checks performed
///
/// 1. No duplicate component names.
/// 2. Every dependency references a defined component, and no component
///    depends on itself.
/// 3. Every compiler has a family and absolute executable paths.
/// 4. Every declared conflict parses as a pair of selectors.
///
/// # Errors
///
/// Returns an error if any semantic check fails.
pub fn validate(manifest: &Manifest) -> Result<()> {
    tracing::info!("validating manifest");
    check_duplicate_components(manifest)?;
    check_dependency_references(manifest)?;
    check_compilers(manifest)?;
    check_conflict_selectors(manifest)?;
    Ok(())
}

fn check_duplicate_components(manifest: &Manifest) -> Result<()> {
    let mut seen = HashSet::new();
    for comp in &manifest.components {
        if !seen.insert(comp.name.as_str()) {
            return Err(LinkwiseError::Config {
                message: format!("duplicate component name: \"{}\"", comp.name),
            });
        }
    }
    Ok(())
}

fn check_dependency_references(manifest: &Manifest) -> Result<()> {
    let names: HashSet<&str> = manifest
        .components
        .iter()
        .map(|c| c.name.as_str())
        .collect();

    for comp in &manifest.components {
        for dep in &comp.dependencies {
            if dep.name() == comp.name {
                return Err(LinkwiseError::Graph {
                    message: format!("component \"{}\" depends on itself", comp.name),
                });
            }
            if !names.contains(dep.name()) {
                return Err(LinkwiseError::NotFound {
                    kind: "component",
                    id: format!(
                        "dependency \"{}\" of \"{}\" is not defined",
                        dep.name(),
                        comp.name
                    ),
                });
            }
        }
    }
    Ok(())
}

fn check_compilers(manifest: &Manifest) -> Result<()> {
    for comp in &manifest.components {
        comp.compiler
            .validate()
            .map_err(|e| LinkwiseError::Config {
                message: format!("component \"{}\": {e}", comp.name),
            })?;
    }
    Ok(())
}

fn check_conflict_selectors(manifest: &Manifest) -> Result<()> {
    for comp in &manifest.components {
        for conflict in &comp.conflicts {
            let _ = conflict.to_rule().map_err(|e| LinkwiseError::Config {
                message: format!("component \"{}\": {e}", comp.name),
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use linkwise_common::types::CompilerIdentity;

    use super::*;
    use crate::model::{ComponentSpec, ConflictSpec, DependencySpec};

    fn make_component(name: &str, deps: &[&str]) -> ComponentSpec {
        ComponentSpec {
            name: name.into(),
            compiler: CompilerIdentity::new("gcc", "/usr/bin/gcc", "/usr/bin/g++"),
            prefix: None,
            variants: BTreeMap::new(),
            dependencies: deps
                .iter()
                .map(|d| DependencySpec::Name((*d).to_string()))
                .collect(),
            conflicts: Vec::new(),
        }
    }

    fn manifest(components: Vec<ComponentSpec>) -> Manifest {
        Manifest {
            components,
            ..Manifest::default()
        }
    }

    #[test]
    fn validate_empty_manifest_succeeds() {
        assert!(validate(&Manifest::default()).is_ok());
    }

    #[test]
    fn validate_valid_manifest_succeeds() {
        let m = manifest(vec![
            make_component("araroot", &["root", "sqlite"]),
            make_component("root", &[]),
            make_component("sqlite", &[]),
        ]);
        assert!(validate(&m).is_ok());
    }

    #[test]
    fn validate_duplicate_component_name_fails() {
        let m = manifest(vec![make_component("root", &[]), make_component("root", &[])]);
        let msg = validate(&m).expect_err("duplicate").to_string();
        assert!(msg.contains("duplicate component name"), "got: {msg}");
    }

    #[test]
    fn validate_undefined_dependency_fails() {
        let m = manifest(vec![make_component("araroot", &["ghost"])]);
        let msg = validate(&m).expect_err("undefined").to_string();
        assert!(msg.contains("ghost"), "got: {msg}");
    }

    #[test]
    fn validate_self_dependency_fails() {
        let m = manifest(vec![make_component("loop", &["loop"])]);
        let err = validate(&m).expect_err("self loop");
        assert!(matches!(err, LinkwiseError::Graph { .. }));
    }

    #[test]
    fn validate_relative_compiler_fails() {
        let mut comp = make_component("araroot", &[]);
        comp.compiler = CompilerIdentity::new("gcc", "gcc", "/usr/bin/g++");
        let msg = validate(&manifest(vec![comp])).expect_err("relative").to_string();
        assert!(msg.contains("araroot"), "got: {msg}");
        assert!(msg.contains("absolute"), "got: {msg}");
    }

    #[test]
    fn validate_malformed_conflict_fails() {
        let mut comp = make_component("araroot", &[]);
        comp.conflicts.push(ConflictSpec {
            spec: "%".into(),
            when: String::new(),
        });
        let err = validate(&manifest(vec![comp])).expect_err("bad selector");
        assert!(matches!(err, LinkwiseError::Config { .. }));
    }
}
