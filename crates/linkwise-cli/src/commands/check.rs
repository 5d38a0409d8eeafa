//! `linkwise check`: Run the compiler conflict checks for a component.

use std::path::PathBuf;

use clap::Args;
use linkwise_common::types::ComponentName;
use linkwise_core::resolver::Resolver;

use super::CompilerArgs;

/// Arguments for the `check` command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the YAML or JSON manifest.
    pub manifest: PathBuf,

    /// Component under build.
    pub component: String,

    /// Upstream component the build must link against.
    #[arg(long)]
    pub upstream: Option<String>,

    /// Compiler of the current build.
    #[command(flatten)]
    pub compiler: CompilerArgs,
}

/// Executes the `check` command.
///
/// # Errors
///
/// Returns an error if the manifest is invalid or a conflict is found.
pub fn execute(args: CheckArgs) -> anyhow::Result<()> {
    let manifest = super::load_manifest(&args.manifest)?;
    let graph = manifest.to_graph()?;

    let mut request = manifest.request_for(&args.component)?;
    if let Some(upstream) = args.upstream {
        request = request.upstream(upstream);
    }
    if let Some(compiler) = args.compiler.identity()? {
        request = request.compiler(compiler);
    }

    let resolver = Resolver::from_config(manifest.config());
    resolver.check(&graph, &request)?;

    let upstream = request
        .upstream
        .as_ref()
        .map_or(resolver.config().upstream.as_str(), ComponentName::as_str);
    println!("{}: compatible with {upstream}", args.component);
    Ok(())
}
