//! System-wide constants and defaults.

/// Designated upstream component whose toolchain downstream builds follow.
pub const DEFAULT_UPSTREAM: &str = "root";

/// Variant carrying the upstream's C++ language standard.
pub const DEFAULT_STANDARD_VARIANT: &str = "cxxstd";

/// Compiler runtime library searched for in the upstream's closure.
pub const DEFAULT_RUNTIME_COMPONENT: &str = "gcc-runtime";

/// Library sub-directory of the runtime component's prefix.
pub const DEFAULT_RUNTIME_LIB_SUBDIR: &str = "lib64";

/// C++ runtime shared object linked explicitly.
pub const DEFAULT_RUNTIME_SHARED_OBJECT: &str = "libstdc++.so.6";

/// Header sub-directory of an include provider's prefix.
pub const DEFAULT_INCLUDE_SUBDIR: &str = "include";

/// Separator between entries of path-like environment variables.
#[cfg(windows)]
pub const PATH_SEPARATOR: &str = ";";

/// Separator between entries of path-like environment variables.
#[cfg(not(windows))]
pub const PATH_SEPARATOR: &str = ":";

/// Separator between entries of flag environment variables.
pub const FLAG_SEPARATOR: &str = " ";

/// Dynamic loader search path variable.
pub const LD_LIBRARY_PATH: &str = "LD_LIBRARY_PATH";

/// Manifest file extensions parsed as JSON; everything else is YAML.
pub const JSON_EXTENSIONS: &[&str] = &["json"];

/// Application name used in CLI output.
pub const APP_NAME: &str = "linkwise";
