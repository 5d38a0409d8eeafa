//! CLI command definitions and dispatch.

pub mod check;
pub mod order;
pub mod resolve;
pub mod tree;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use linkwise_common::constants::APP_NAME;
use linkwise_common::types::CompilerIdentity;
use linkwise_manifest::Manifest;

/// linkwise: transitive build-configuration resolver.
#[derive(Parser, Debug)]
#[command(name = APP_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the build configuration of a component.
    Resolve(resolve::ResolveArgs),
    /// Run only the compiler conflict checks for a component.
    Check(check::CheckArgs),
    /// Show the dependency closure of a component in traversal order.
    Tree(tree::TreeArgs),
    /// Show the dependencies-first build order of a manifest.
    Order(order::OrderArgs),
}

/// Compiler of the current build, overriding the one in the manifest.
#[derive(Args, Debug, Default)]
pub struct CompilerArgs {
    /// Compiler family, e.g. `gcc`.
    #[arg(long, env = "LINKWISE_COMPILER_FAMILY")]
    pub family: Option<String>,

    /// Absolute path to the C compiler.
    #[arg(long, env = "LINKWISE_CC")]
    pub cc: Option<PathBuf>,

    /// Absolute path to the C++ compiler.
    #[arg(long, env = "LINKWISE_CXX")]
    pub cxx: Option<PathBuf>,
}

impl CompilerArgs {
    /// Returns the override, if one was given.
    ///
    /// # Errors
    ///
    /// Returns an error if only part of the identity was given.
    pub fn identity(&self) -> anyhow::Result<Option<CompilerIdentity>> {
        match (&self.family, &self.cc, &self.cxx) {
            (None, None, None) => Ok(None),
            (Some(family), Some(cc), Some(cxx)) => Ok(Some(CompilerIdentity::new(
                family,
                cc.clone(),
                cxx.clone(),
            ))),
            _ => anyhow::bail!("--family, --cc and --cxx must be given together"),
        }
    }
}

/// Loads and validates a manifest file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or validated.
pub fn load_manifest(path: &Path) -> anyhow::Result<Manifest> {
    linkwise_manifest::load(path)
        .with_context(|| format!("failed to load manifest {}", path.display()))
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Resolve(args) => resolve::execute(args),
        Command::Check(args) => check::execute(args),
        Command::Tree(args) => tree::execute(args),
        Command::Order(args) => order::execute(args),
    }
}
