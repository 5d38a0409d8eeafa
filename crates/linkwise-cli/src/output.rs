//! Formatted output helpers for CLI commands.
//!
//! Renders a resolved configuration as a readable summary, as CMake cache
//! definitions, or as shell `export` lines.

use std::ffi::OsString;
use std::fmt::Write;

use clap::ValueEnum;
use linkwise_core::arguments::ResolvedConfiguration;
use linkwise_core::environment::Environment;

/// Output format of `linkwise resolve`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
    /// One `-D` definition per line.
    Cmake,
    /// `export` lines for a POSIX shell.
    Shell,
}

/// Renders a human-readable summary.
#[must_use]
pub fn render_text(resolved: &ResolvedConfiguration) -> String {
    let mut out = String::from("Build arguments:\n");
    for arg in &resolved.arguments {
        let _ = writeln!(out, "  {:<28} {}", arg.key, arg.value);
    }
    if !resolved.environment.is_empty() {
        out.push_str("\nEnvironment:\n");
        for var in &resolved.environment {
            let _ = writeln!(out, "  {:<8} {:<20} {}", var.policy, var.key, var.value);
        }
    }
    if let Some(linker) = &resolved.linker {
        out.push_str("\nRuntime linkage:\n");
        let _ = writeln!(out, "  {}", linker.render());
    }
    out
}

/// Renders the arguments as CMake cache definitions, one per line.
#[must_use]
pub fn render_cmake(resolved: &ResolvedConfiguration) -> String {
    resolved.arguments.to_cmake_flags().join("\n")
}

/// Composes the derived variables over `base` and renders `export` lines for
/// the variables they touch.
#[must_use]
pub fn render_shell(resolved: &ResolvedConfiguration, base: &Environment) -> String {
    let composed = resolved.environment_over(base);
    let mut seen = Vec::new();
    let mut out = String::new();
    for var in &resolved.environment {
        if seen.contains(&var.key.as_str()) {
            continue;
        }
        seen.push(var.key.as_str());
        if let Some(value) = composed.get(&var.key) {
            let _ = writeln!(out, "export {}={}", var.key, shell_quote(value));
        }
    }
    out
}

/// Builds an environment from raw OS pairs, skipping entries that are not
/// valid UTF-8.
pub fn environment_from<I>(vars: I) -> Environment
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (key, _) => {
                tracing::warn!(
                    key = %key.unwrap_or_else(|k| k.to_string_lossy().into_owned()),
                    "skipping environment variable that is not valid UTF-8"
                );
                None
            }
        })
        .collect()
}

/// Quotes `value` for a POSIX shell.
#[must_use]
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use linkwise_core::arguments::BuildArgs;
    use linkwise_core::environment::EnvVar;

    use super::*;

    fn sample() -> ResolvedConfiguration {
        let mut arguments = BuildArgs::new();
        arguments.define("CMAKE_CXX_STANDARD", "20");
        arguments.define("CMAKE_CXX_EXTENSIONS", false);
        ResolvedConfiguration {
            arguments,
            environment: vec![
                EnvVar::prepend_path("LD_LIBRARY_PATH", "/opt/rt/lib"),
                EnvVar::set("CXXFLAGS", "-std=c++20"),
            ],
            linker: None,
        }
    }

    #[test]
    fn cmake_output_lists_definitions() {
        assert_eq!(
            render_cmake(&sample()),
            "-DCMAKE_CXX_STANDARD:STRING=20\n-DCMAKE_CXX_EXTENSIONS:BOOL=OFF"
        );
    }

    #[test]
    fn text_output_mentions_every_section() {
        let text = render_text(&sample());
        assert!(text.contains("CMAKE_CXX_STANDARD"));
        assert!(text.contains("prepend"));
        assert!(!text.contains("Runtime linkage"));
    }

    #[test]
    fn shell_output_composes_over_base() {
        let base: Environment = [("LD_LIBRARY_PATH".to_string(), "/usr/lib".to_string())]
            .into_iter()
            .collect();
        let shell = render_shell(&sample(), &base);
        let expected = format!(
            "export LD_LIBRARY_PATH='/opt/rt/lib{}/usr/lib'",
            linkwise_common::constants::PATH_SEPARATOR
        );
        assert!(shell.contains(&expected), "got: {shell}");
        assert!(shell.contains("export CXXFLAGS='-std=c++20'"));
    }

    #[cfg(unix)]
    #[test]
    fn environment_skips_non_utf8_entries() {
        use std::os::unix::ffi::OsStringExt;

        let env = environment_from([
            (OsString::from("HOME"), OsString::from("/home/u")),
            (OsString::from("BAD"), OsString::from_vec(vec![0xff])),
            (OsString::from_vec(vec![b'K', 0xfe]), OsString::from("v")),
        ]);
        assert_eq!(env.len(), 1);
        assert_eq!(env["HOME"], "/home/u");

        let shell = render_shell(&sample(), &env);
        assert!(shell.contains("export LD_LIBRARY_PATH='/opt/rt/lib'"), "got: {shell}");
    }

    #[test]
    fn shell_quote_escapes_single_quotes() {
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }
}
