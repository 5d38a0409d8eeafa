//! End-to-end tests for manifest-driven resolution.
//!
//! These tests drive the full pipeline:
//! 1. Load a YAML manifest (from a string or a file)
//! 2. Validate it and build the dependency graph
//! 3. Resolve the build configuration of the downstream component
//! 4. Compose the derived environment over a base environment

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::io::Write;
use std::path::Path;

use linkwise_common::error::LinkwiseError;
use linkwise_core::environment::Environment;
use linkwise_core::resolver::Resolver;

const ARAROOT: &str = r#"
resolve:
  standard_variant: cxx_standard
  runtime_lib_subdir: lib
  include_provider: sqlite
components:
  - name: araroot
    compiler: { family: gcc, cc: /opt/gcc/bin/gcc, cxx: /opt/gcc/bin/g++ }
    dependencies:
      - root
      - sqlite
      - { name: cmake, kind: build }
    conflicts:
      - { spec: "%gcc", when: "^root%clang" }
      - { spec: "%clang", when: "^root%gcc" }
  - name: root
    compiler: { family: UPSTREAM_FAMILY, cc: /opt/gcc/bin/gcc, cxx: /opt/gcc/bin/g++ }
    prefix: /opt/root
    variants: { cxx_standard: "20" }
    dependencies: [zlib, gcc-runtime]
  - name: sqlite
    compiler: { family: gcc, cc: /opt/gcc/bin/gcc, cxx: /opt/gcc/bin/g++ }
    prefix: /opt/sqlite
  - name: cmake
    compiler: { family: gcc, cc: /opt/gcc/bin/gcc, cxx: /opt/gcc/bin/g++ }
    prefix: /opt/cmake
  - name: zlib
    compiler: { family: gcc, cc: /opt/gcc/bin/gcc, cxx: /opt/gcc/bin/g++ }
    prefix: /opt/zlib
  - name: gcc-runtime
    compiler: { family: gcc, cc: /opt/gcc/bin/gcc, cxx: /opt/gcc/bin/g++ }
    prefix: /opt/rt
"#;

fn araroot(upstream_family: &str) -> linkwise_manifest::Manifest {
    linkwise_manifest::parse_yaml(&ARAROOT.replace("UPSTREAM_FAMILY", upstream_family))
        .expect("valid manifest")
}

fn resolve(
    manifest: &linkwise_manifest::Manifest,
) -> linkwise_common::error::Result<linkwise_core::arguments::ResolvedConfiguration> {
    let graph = manifest.to_graph()?;
    let request = manifest.request_for("araroot")?;
    Resolver::from_config(manifest.config()).resolve(&graph, &request)
}

// ── Resolution ───────────────────────────────────────────────────────

#[test]
fn pipeline_resolves_standard_and_runtime_from_upstream() {
    let resolved = resolve(&araroot("gcc")).expect("resolves");

    let raw = resolved
        .arguments
        .get("CMAKE_CXX_FLAGS")
        .map(ToString::to_string)
        .expect("raw flags");
    assert!(raw.contains("-std=c++20"), "got: {raw}");
    assert!(raw.contains("-I/opt/sqlite/include"), "got: {raw}");

    assert_eq!(
        resolved
            .arguments
            .get("CMAKE_CXX_STANDARD")
            .map(ToString::to_string),
        Some("20".into())
    );

    let linker = resolved.linker.as_ref().expect("runtime found");
    assert!(linker.search_paths.iter().any(|p| p == Path::new("/opt/rt/lib")));
    assert!(linker.rpaths.iter().any(|p| p == Path::new("/opt/rt/lib")));
    let exe = resolved
        .arguments
        .get("CMAKE_EXE_LINKER_FLAGS")
        .map(ToString::to_string)
        .expect("linker flags");
    assert!(exe.contains("-L/opt/rt/lib"), "got: {exe}");
    assert!(exe.contains("-Wl,-rpath,/opt/rt/lib"), "got: {exe}");
    assert!(exe.contains("/opt/rt/lib/libstdc++.so.6"), "got: {exe}");
}

#[test]
fn pipeline_rejects_upstream_built_with_other_family() {
    let err = resolve(&araroot("clang")).expect_err("conflict");
    assert!(err.is_conflict(), "got: {err}");
}

#[test]
fn pipeline_rejects_boolean_language_standard() {
    let yaml = ARAROOT
        .replace("UPSTREAM_FAMILY", "gcc")
        .replace(r#"cxx_standard: "20""#, "cxx_standard: true");
    let manifest = linkwise_manifest::parse_yaml(&yaml).expect("valid manifest");
    let err = resolve(&manifest).expect_err("not a standard");
    assert!(matches!(err, LinkwiseError::Config { .. }), "got: {err}");
    assert!(err.to_string().contains("cxx_standard"), "got: {err}");
}

#[test]
fn pipeline_family_check_runs_without_declared_rules() {
    let manifest = araroot("clang");
    let graph = manifest.to_graph().expect("graph");
    let request = linkwise_core::resolver::ResolutionRequest::new("araroot");
    let err = Resolver::from_config(manifest.config())
        .resolve(&graph, &request)
        .expect_err("conflict");
    assert!(matches!(err, LinkwiseError::Conflict { .. }), "got: {err}");
}

#[test]
fn pipeline_resolution_is_idempotent() {
    let manifest = araroot("gcc");
    let first = resolve(&manifest).expect("first");
    let second = resolve(&manifest).expect("second");
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).expect("json"),
        serde_json::to_string(&second).expect("json")
    );
}

// ── Environment ──────────────────────────────────────────────────────

#[test]
fn pipeline_environment_prepends_runtime_library_path() {
    let resolved = resolve(&araroot("gcc")).expect("resolves");
    let base: Environment = [("LD_LIBRARY_PATH".to_string(), "/usr/lib".to_string())]
        .into_iter()
        .collect();
    let env = resolved.environment_over(&base);
    let expected = format!("/opt/rt/lib{}/usr/lib", linkwise_common::constants::PATH_SEPARATOR);
    assert_eq!(env["LD_LIBRARY_PATH"], expected);
    assert!(env["CXXFLAGS"].contains("-std=c++20"));
    assert_eq!(base["LD_LIBRARY_PATH"], "/usr/lib");
}

// ── Graph ────────────────────────────────────────────────────────────

#[test]
fn pipeline_build_order_puts_dependencies_first() {
    let graph = araroot("gcc").to_graph().expect("graph");
    let order = graph.build_order().expect("acyclic");
    let pos = |name: &str| {
        order
            .iter()
            .position(|n| n.as_str() == name)
            .expect("present")
    };
    assert!(pos("gcc-runtime") < pos("root"));
    assert!(pos("root") < pos("araroot"));
    assert!(pos("sqlite") < pos("araroot"));
}

#[test]
fn pipeline_detects_cyclic_manifest() {
    let yaml = r"
components:
  - name: a
    compiler: { family: gcc, cc: /g, cxx: /g++ }
    dependencies: [b]
  - name: b
    compiler: { family: gcc, cc: /g, cxx: /g++ }
    dependencies: [a]
";
    let manifest = linkwise_manifest::parse_yaml(yaml).expect("parses");
    let graph = manifest.to_graph().expect("graph");
    let a = graph.index_of("a").expect("a");
    let err = graph.closure(a).expect_err("cycle");
    assert!(err.to_string().contains("a -> b -> a"), "got: {err}");
}

// ── Loading ──────────────────────────────────────────────────────────

#[test]
fn pipeline_loads_manifest_from_file() {
    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .expect("tempfile");
    file.write_all(ARAROOT.replace("UPSTREAM_FAMILY", "gcc").as_bytes())
        .expect("write");

    let manifest = linkwise_manifest::load(file.path()).expect("loads");
    assert_eq!(manifest.components.len(), 6);
    assert_eq!(manifest.resolve.include_provider.as_deref(), Some("sqlite"));
    resolve(&manifest).expect("resolves");
}

#[test]
fn pipeline_loads_json_by_extension() {
    let manifest = araroot("gcc");
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("tempfile");
    file.write_all(serde_json::to_string(&manifest).expect("json").as_bytes())
        .expect("write");

    let loaded = linkwise_manifest::load(file.path()).expect("loads");
    assert_eq!(loaded, manifest);
}
