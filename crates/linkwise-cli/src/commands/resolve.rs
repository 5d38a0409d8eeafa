//! `linkwise resolve`: Resolve the build configuration of a component.

use std::path::PathBuf;

use clap::Args;
use linkwise_core::resolver::Resolver;

use super::CompilerArgs;
use crate::output::{self, OutputFormat};

/// Arguments for the `resolve` command.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Path to the YAML or JSON manifest.
    pub manifest: PathBuf,

    /// Component under build.
    pub component: String,

    /// Upstream component the build must link against.
    #[arg(long)]
    pub upstream: Option<String>,

    /// Name of the runtime library component searched under the upstream.
    #[arg(long)]
    pub runtime: Option<String>,

    /// Component whose headers are added to the compiler flags.
    #[arg(long = "include-from")]
    pub include_from: Option<String>,

    /// Compiler of the current build.
    #[command(flatten)]
    pub compiler: CompilerArgs,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Executes the `resolve` command.
///
/// Loads the manifest, builds the dependency graph and prints the resolved
/// configuration. Nothing is printed when resolution fails.
///
/// # Errors
///
/// Returns an error if loading, graph construction, or resolution fails.
pub fn execute(args: ResolveArgs) -> anyhow::Result<()> {
    tracing::info!(
        manifest = %args.manifest.display(),
        component = %args.component,
        "resolving component"
    );
    let manifest = super::load_manifest(&args.manifest)?;
    let graph = manifest.to_graph()?;

    let mut config = manifest.config();
    if let Some(runtime) = args.runtime {
        config.runtime_component = runtime;
    }

    let mut request = manifest.request_for(&args.component)?;
    if let Some(upstream) = args.upstream {
        request = request.upstream(upstream);
    }
    if let Some(provider) = args.include_from {
        request = request.include_provider(provider);
    }
    if let Some(compiler) = args.compiler.identity()? {
        request = request.compiler(compiler);
    }

    let resolved = Resolver::from_config(config).resolve(&graph, &request)?;

    let rendered = match args.format {
        OutputFormat::Text => output::render_text(&resolved),
        OutputFormat::Json => serde_json::to_string_pretty(&resolved)?,
        OutputFormat::Cmake => output::render_cmake(&resolved),
        OutputFormat::Shell => {
            let base = output::environment_from(std::env::vars_os());
            output::render_shell(&resolved, &base)
        }
    };
    println!("{}", rendered.trim_end());

    Ok(())
}
