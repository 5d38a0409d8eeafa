//! # linkwise-core
//!
//! Derives the compiler paths, language-standard flags, linker flags and
//! environment variables a downstream component needs in order to link
//! safely against an upstream component's already-chosen toolchain.
//!
//! Handles:
//! - **Graph**: Read-only dependency graph with pinned depth-first traversal.
//! - **Variant**: Typed variant lookup with an explicit absent result.
//! - **Finder**: Predicate search for implicit dependencies.
//! - **Toolchain**: Compiler-family checks and declared conflict rules.
//! - **Environment**: Pure `set`/`append`/`prepend` environment composition.
//! - **Arguments**: Build-tool argument assembly.
//! - **Resolver**: One-call orchestration of the above.
//!
//! Everything here is a pure computation over an in-memory snapshot:
//! no filesystem, process environment, or network access.

pub mod arguments;
pub mod component;
pub mod environment;
pub mod finder;
pub mod graph;
pub mod lookup;
pub mod resolver;
pub mod selector;
pub mod toolchain;
pub mod variant;
