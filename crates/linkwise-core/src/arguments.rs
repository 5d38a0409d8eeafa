//! Build-tool argument assembly.
//!
//! Produces the CMake definitions, raw compiler/linker flags and derived
//! environment that pin a downstream build to its upstream's toolchain.
//! The language standard and the runtime library are each pushed through
//! several channels at once, because build scripts and binding generators
//! routinely ignore one channel or another.

use std::fmt;
use std::path::{Path, PathBuf};

use linkwise_common::config::ResolverConfig;
use linkwise_common::constants::LD_LIBRARY_PATH;
use linkwise_common::error::{LinkwiseError, Result};
use linkwise_common::types::{CompilerIdentity, VariantValue, prefix_join};
use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::environment::{self, EnvVar, Environment};
use crate::lookup::Lookup;
use crate::toolchain;

/// Value of a build argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    /// Boolean, rendered `ON`/`OFF`.
    Bool(bool),
    /// Free-form string.
    Text(String),
}

impl ArgValue {
    const fn cmake_type(&self) -> &'static str {
        match self {
            Self::Bool(_) => "BOOL",
            Self::Text(_) => "STRING",
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => write!(f, "ON"),
            Self::Bool(false) => write!(f, "OFF"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&Path> for ArgValue {
    fn from(value: &Path) -> Self {
        Self::Text(value.display().to_string())
    }
}

/// A single keyed build argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildArg {
    /// Definition name, e.g. `CMAKE_CXX_STANDARD`.
    pub key: String,
    /// Definition value.
    pub value: ArgValue,
}

impl BuildArg {
    /// Renders as a CMake cache definition, e.g. `-DCMAKE_CXX_STANDARD:STRING=20`.
    #[must_use]
    pub fn to_cmake_flag(&self) -> String {
        format!("-D{}:{}={}", self.key, self.value.cmake_type(), self.value)
    }
}

/// Ordered build arguments; defining an existing key replaces its value
/// in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildArgs(Vec<BuildArg>);

impl BuildArgs {
    /// Creates an empty argument list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines `key`, overriding any earlier definition of it.
    pub fn define(&mut self, key: impl Into<String>, value: impl Into<ArgValue>) {
        let key = key.into();
        let value = value.into();
        if let Some(existing) = self.0.iter_mut().find(|a| a.key == key) {
            existing.value = value;
        } else {
            self.0.push(BuildArg { key, value });
        }
    }

    /// Returns the value defined for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.0.iter().find(|a| a.key == key).map(|a| &a.value)
    }

    /// Iterates arguments in order.
    pub fn iter(&self) -> std::slice::Iter<'_, BuildArg> {
        self.0.iter()
    }

    /// Number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Renders every argument as a CMake definition.
    #[must_use]
    pub fn to_cmake_flags(&self) -> Vec<String> {
        self.0.iter().map(BuildArg::to_cmake_flag).collect()
    }
}

impl<'a> IntoIterator for &'a BuildArgs {
    type Item = &'a BuildArg;
    type IntoIter = std::slice::Iter<'a, BuildArg>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Linker inputs pinning the runtime library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkerFlags {
    /// Directories passed with `-L`.
    pub search_paths: Vec<PathBuf>,
    /// Directories embedded as rpath entries.
    pub rpaths: Vec<PathBuf>,
    /// Shared objects placed on the link line by full path.
    pub shared_objects: Vec<PathBuf>,
}

impl LinkerFlags {
    /// Renders as a single linker flag string.
    #[must_use]
    pub fn render(&self) -> String {
        let search = self.search_paths.iter().map(|p| format!("-L{}", p.display()));
        let rpath = self
            .rpaths
            .iter()
            .map(|p| format!("-Wl,-rpath,{}", p.display()));
        let objects = self.shared_objects.iter().map(|p| p.display().to_string());
        search.chain(rpath).chain(objects).collect::<Vec<_>>().join(" ")
    }
}

/// Everything the build-invocation layer needs for one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedConfiguration {
    /// Build-tool arguments in emission order.
    pub arguments: BuildArgs,
    /// Derived environment variables in application order.
    pub environment: Vec<EnvVar>,
    /// Runtime-library linker inputs, if an implicit runtime was found.
    pub linker: Option<LinkerFlags>,
}

impl ResolvedConfiguration {
    /// Composes the derived variables over `base`.
    #[must_use]
    pub fn environment_over(&self, base: &Environment) -> Environment {
        environment::compose(base, &self.environment)
    }
}

/// Where the runtime library lives inside its component's prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeLinkage {
    /// Library directory relative to the prefix, e.g. `lib64`.
    pub lib_subdir: String,
    /// Shared object file name, e.g. `libstdc++.so.6`.
    pub shared_object: String,
}

impl RuntimeLinkage {
    /// Extracts the linkage layout from a resolver configuration.
    #[must_use]
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self {
            lib_subdir: config.runtime_lib_subdir.clone(),
            shared_object: config.runtime_shared_object.clone(),
        }
    }
}

impl Default for RuntimeLinkage {
    fn default() -> Self {
        Self::from_config(&ResolverConfig::default())
    }
}

/// Inputs to [`BuildArgumentBuilder::build`].
#[derive(Debug, Clone)]
pub struct BuildInputs<'a> {
    /// Compiler selected for the current build.
    pub compiler: &'a CompilerIdentity,
    /// Designated upstream component the build links against.
    pub upstream: &'a Component,
    /// Name of the upstream variant the standard was read from.
    pub standard_variant: &'a str,
    /// Language standard read from the upstream.
    pub cxx_standard: Lookup<&'a VariantValue>,
    /// Extra header directory for the raw compiler flags.
    pub include_dir: Option<PathBuf>,
    /// Implicit runtime library found in the upstream's closure.
    pub runtime: Lookup<&'a Component>,
}

/// Assembles a [`ResolvedConfiguration`] from resolved inputs.
#[derive(Debug, Clone, Default)]
pub struct BuildArgumentBuilder {
    linkage: RuntimeLinkage,
}

impl BuildArgumentBuilder {
    /// Creates a builder with the given runtime layout.
    #[must_use]
    pub const fn new(linkage: RuntimeLinkage) -> Self {
        Self { linkage }
    }

    /// Builds the configuration.
    ///
    /// The compiler-family check runs first; on conflict nothing is built.
    ///
    /// # Errors
    ///
    /// Returns [`LinkwiseError::Conflict`] on a family mismatch, or a
    /// configuration error if the standard is not a version number or
    /// word, or the runtime component has no usable prefix.
    pub fn build(&self, inputs: &BuildInputs<'_>) -> Result<ResolvedConfiguration> {
        toolchain::check(&inputs.compiler.family, inputs.upstream)?;

        let mut resolved = ResolvedConfiguration::default();
        let args = &mut resolved.arguments;
        args.define("CMAKE_C_COMPILER", inputs.compiler.cc.as_path());
        args.define("CMAKE_CXX_COMPILER", inputs.compiler.cxx.as_path());

        let mut raw_flags: Vec<String> = Vec::new();
        if let Lookup::Found(value) = inputs.cxx_standard {
            let standard = language_standard(inputs, value)?;
            raw_flags.push(format!("-std=c++{standard}"));
            args.define("CMAKE_CXX_STANDARD", standard);
            args.define("CMAKE_CXX_STANDARD_REQUIRED", true);
            args.define("CMAKE_CXX_EXTENSIONS", false);
        }
        if let Some(include) = &inputs.include_dir {
            raw_flags.push(format!("-I{}", include.display()));
        }
        if !raw_flags.is_empty() {
            let raw = raw_flags.join(" ");
            args.define("CMAKE_CXX_FLAGS", raw.as_str());
            resolved.environment.push(EnvVar::set("CXXFLAGS", raw.as_str()));
            resolved.environment.push(EnvVar::set("CMAKE_CXX_FLAGS", raw));
        }

        if let Lookup::Found(runtime) = inputs.runtime {
            let linker = self.runtime_linker_flags(runtime)?;
            let rendered = linker.render();
            args.define("CMAKE_EXE_LINKER_FLAGS", rendered.as_str());
            args.define("CMAKE_SHARED_LINKER_FLAGS", rendered);
            for dir in &linker.search_paths {
                resolved
                    .environment
                    .push(EnvVar::prepend_path(LD_LIBRARY_PATH, dir.display().to_string()));
            }
            resolved.linker = Some(linker);
        }

        tracing::debug!(
            arguments = resolved.arguments.len(),
            environment = resolved.environment.len(),
            runtime = resolved.linker.is_some(),
            "build configuration assembled"
        );
        Ok(resolved)
    }

    fn runtime_linker_flags(&self, runtime: &Component) -> Result<LinkerFlags> {
        let prefix = runtime.prefix().ok_or_else(|| LinkwiseError::Config {
            message: format!(
                "runtime component \"{}\" has no installation prefix",
                runtime.name()
            ),
        })?;
        // Linker flag strings are space-separated and unquoted.
        if prefix.to_string_lossy().contains(char::is_whitespace) {
            return Err(LinkwiseError::Config {
                message: format!(
                    "runtime component \"{}\" prefix contains whitespace: {}",
                    runtime.name(),
                    prefix.display()
                ),
            });
        }
        let lib_dir = prefix_join(prefix, &self.linkage.lib_subdir);
        let shared_object = lib_dir.join(&self.linkage.shared_object);
        Ok(LinkerFlags {
            search_paths: vec![lib_dir.clone()],
            rpaths: vec![lib_dir],
            shared_objects: vec![shared_object],
        })
    }
}

/// Accepts a positive integer or a single non-empty word (`20`, `2b`).
fn language_standard(inputs: &BuildInputs<'_>, value: &VariantValue) -> Result<String> {
    match value {
        VariantValue::Int(n) if *n > 0 => Ok(n.to_string()),
        VariantValue::Text(s) if !s.is_empty() && !s.contains(char::is_whitespace) => {
            Ok(s.clone())
        }
        other => Err(LinkwiseError::Config {
            message: format!(
                "upstream \"{}\" variant \"{}\" is not a language standard: {other:?}",
                inputs.upstream.name(),
                inputs.standard_variant
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gcc() -> CompilerIdentity {
        CompilerIdentity::new("gcc", "/opt/gcc/bin/gcc", "/opt/gcc/bin/g++")
    }

    fn builder() -> BuildArgumentBuilder {
        BuildArgumentBuilder::new(RuntimeLinkage {
            lib_subdir: "lib".into(),
            shared_object: "libstdc++.so.6".into(),
        })
    }

    fn text(value: &ArgValue) -> String {
        value.to_string()
    }

    #[test]
    fn define_overrides_in_place() {
        let mut args = BuildArgs::new();
        args.define("A", "1");
        args.define("B", true);
        args.define("A", "2");
        assert_eq!(args.len(), 2);
        assert_eq!(args.get("A"), Some(&ArgValue::Text("2".into())));
        let keys: Vec<_> = args.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, vec!["A", "B"]);
    }

    #[test]
    fn cmake_rendering() {
        let mut args = BuildArgs::new();
        args.define("CMAKE_CXX_STANDARD", "20");
        args.define("CMAKE_CXX_EXTENSIONS", false);
        assert_eq!(
            args.to_cmake_flags(),
            vec![
                "-DCMAKE_CXX_STANDARD:STRING=20",
                "-DCMAKE_CXX_EXTENSIONS:BOOL=OFF"
            ]
        );
    }

    #[test]
    fn compilers_are_always_emitted() {
        let compiler = gcc();
        let upstream = Component::new("root", gcc());
        let resolved = builder()
            .build(&BuildInputs {
                compiler: &compiler,
                upstream: &upstream,
                standard_variant: "cxxstd",
            cxx_standard: Lookup::Absent,
                include_dir: None,
                runtime: Lookup::Absent,
            })
            .expect("compatible");

        assert_eq!(resolved.arguments.len(), 2);
        assert_eq!(
            resolved.arguments.get("CMAKE_CXX_COMPILER").map(text),
            Some("/opt/gcc/bin/g++".into())
        );
        assert!(resolved.arguments.get("CMAKE_CXX_STANDARD").is_none());
        assert!(resolved.environment.is_empty());
        assert!(resolved.linker.is_none());
    }

    #[test]
    fn standard_and_include_go_through_every_channel() {
        let compiler = gcc();
        let upstream = Component::new("root", gcc()).with_variant("cxxstd", "17");
        let std = VariantValue::Text("17".into());
        let resolved = builder()
            .build(&BuildInputs {
                compiler: &compiler,
                upstream: &upstream,
                standard_variant: "cxxstd",
            cxx_standard: Lookup::Found(&std),
                include_dir: Some(PathBuf::from("/opt/sqlite/include")),
                runtime: Lookup::Absent,
            })
            .expect("compatible");

        let raw = "-std=c++17 -I/opt/sqlite/include";
        assert_eq!(
            resolved.arguments.get("CMAKE_CXX_FLAGS").map(text),
            Some(raw.into())
        );
        assert_eq!(
            resolved.arguments.get("CMAKE_CXX_STANDARD").map(text),
            Some("17".into())
        );
        assert_eq!(
            resolved.arguments.get("CMAKE_CXX_STANDARD_REQUIRED"),
            Some(&ArgValue::Bool(true))
        );
        assert_eq!(
            resolved.environment,
            vec![EnvVar::set("CXXFLAGS", raw), EnvVar::set("CMAKE_CXX_FLAGS", raw)]
        );
    }

    #[test]
    fn integer_standard_is_accepted() {
        let compiler = gcc();
        let upstream = Component::new("root", gcc());
        let std = VariantValue::Int(20);
        let resolved = builder()
            .build(&BuildInputs {
                compiler: &compiler,
                upstream: &upstream,
                standard_variant: "cxxstd",
                cxx_standard: Lookup::Found(&std),
                include_dir: None,
                runtime: Lookup::Absent,
            })
            .expect("compatible");
        assert_eq!(
            resolved.arguments.get("CMAKE_CXX_FLAGS").map(text),
            Some("-std=c++20".into())
        );
    }

    #[test]
    fn malformed_standards_are_rejected() {
        let compiler = gcc();
        let upstream = Component::new("root", gcc());
        let shapes = [
            VariantValue::Bool(true),
            VariantValue::List(vec!["17".into(), "20".into()]),
            VariantValue::Text(String::new()),
            VariantValue::Text("20 -O0".into()),
            VariantValue::Int(0),
        ];
        for std in &shapes {
            let err = builder()
                .build(&BuildInputs {
                    compiler: &compiler,
                    upstream: &upstream,
                    standard_variant: "cxxstd",
                    cxx_standard: Lookup::Found(std),
                    include_dir: None,
                    runtime: Lookup::Absent,
                })
                .expect_err("not a standard");
            let msg = err.to_string();
            assert!(matches!(err, LinkwiseError::Config { .. }), "got: {msg}");
            assert!(msg.contains("root") && msg.contains("cxxstd"), "got: {msg}");
        }
    }

    #[test]
    fn include_without_standard_still_reaches_raw_flags() {
        let compiler = gcc();
        let upstream = Component::new("root", gcc());
        let resolved = builder()
            .build(&BuildInputs {
                compiler: &compiler,
                upstream: &upstream,
                standard_variant: "cxxstd",
            cxx_standard: Lookup::Absent,
                include_dir: Some(PathBuf::from("/inc")),
                runtime: Lookup::Absent,
            })
            .expect("compatible");
        assert_eq!(
            resolved.arguments.get("CMAKE_CXX_FLAGS").map(text),
            Some("-I/inc".into())
        );
        assert!(resolved.arguments.get("CMAKE_CXX_STANDARD").is_none());
    }

    #[test]
    fn runtime_library_is_pinned_three_ways() {
        let compiler = gcc();
        let upstream = Component::new("root", gcc());
        let runtime = Component::new("gcc-runtime", gcc()).with_prefix("/opt/rt");
        let resolved = builder()
            .build(&BuildInputs {
                compiler: &compiler,
                upstream: &upstream,
                standard_variant: "cxxstd",
            cxx_standard: Lookup::Absent,
                include_dir: None,
                runtime: Lookup::Found(&runtime),
            })
            .expect("compatible");

        let expected = "-L/opt/rt/lib -Wl,-rpath,/opt/rt/lib /opt/rt/lib/libstdc++.so.6";
        assert_eq!(
            resolved.arguments.get("CMAKE_EXE_LINKER_FLAGS").map(text),
            Some(expected.into())
        );
        assert_eq!(
            resolved.arguments.get("CMAKE_SHARED_LINKER_FLAGS").map(text),
            Some(expected.into())
        );
        let linker = resolved.linker.expect("linker flags");
        assert_eq!(linker.search_paths, vec![PathBuf::from("/opt/rt/lib")]);
        assert_eq!(linker.rpaths, vec![PathBuf::from("/opt/rt/lib")]);
        assert_eq!(
            linker.shared_objects,
            vec![PathBuf::from("/opt/rt/lib/libstdc++.so.6")]
        );
        assert_eq!(
            resolved.environment,
            vec![EnvVar::prepend_path(LD_LIBRARY_PATH, "/opt/rt/lib")]
        );
    }

    #[test]
    fn runtime_without_prefix_is_rejected() {
        let compiler = gcc();
        let upstream = Component::new("root", gcc());
        let runtime = Component::new("gcc-runtime", gcc());
        let result = builder().build(&BuildInputs {
            compiler: &compiler,
            upstream: &upstream,
            standard_variant: "cxxstd",
            cxx_standard: Lookup::Absent,
            include_dir: None,
            runtime: Lookup::Found(&runtime),
        });
        assert!(matches!(result, Err(LinkwiseError::Config { .. })));
    }

    #[test]
    fn runtime_prefix_with_whitespace_is_rejected() {
        let compiler = gcc();
        let upstream = Component::new("root", gcc());
        let runtime = Component::new("gcc-runtime", gcc()).with_prefix("/opt/my rt");
        let result = builder().build(&BuildInputs {
            compiler: &compiler,
            upstream: &upstream,
            standard_variant: "cxxstd",
            cxx_standard: Lookup::Absent,
            include_dir: None,
            runtime: Lookup::Found(&runtime),
        });
        let err = result.expect_err("whitespace prefix");
        assert!(err.to_string().contains("/opt/my rt"), "got: {err}");
    }

    #[test]
    fn conflict_aborts_before_any_output() {
        let compiler = gcc();
        let upstream = Component::new(
            "root",
            CompilerIdentity::new("clang", "/usr/bin/clang", "/usr/bin/clang++"),
        );
        let result = builder().build(&BuildInputs {
            compiler: &compiler,
            upstream: &upstream,
            standard_variant: "cxxstd",
            cxx_standard: Lookup::Absent,
            include_dir: None,
            runtime: Lookup::Absent,
        });
        assert!(matches!(result, Err(LinkwiseError::Conflict { .. })));
    }

    #[test]
    fn environment_over_composes_with_base() {
        let resolved = ResolvedConfiguration {
            environment: vec![EnvVar::prepend_path(LD_LIBRARY_PATH, "/opt/rt/lib64")],
            ..ResolvedConfiguration::default()
        };
        let mut base = Environment::new();
        let _ = base.insert(LD_LIBRARY_PATH.into(), "/usr/lib".into());
        let env = resolved.environment_over(&base);
        assert!(env[LD_LIBRARY_PATH].starts_with("/opt/rt/lib64"));
        assert!(env[LD_LIBRARY_PATH].ends_with("/usr/lib"));
    }
}
