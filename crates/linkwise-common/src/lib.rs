//! # linkwise-common
//!
//! Shared types, error definitions, resolver configuration, and constants
//! used across the entire linkwise workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate and provides the primitives the resolver, the manifest
//! loader, and the CLI build upon.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
