//! `linkwise tree`: Show the dependency closure of a component.

use std::path::PathBuf;

use clap::Args;

/// Arguments for the `tree` command.
#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Path to the YAML or JSON manifest.
    pub manifest: PathBuf,

    /// Component whose closure is shown.
    pub component: String,
}

/// Executes the `tree` command.
///
/// Prints every component reachable from `component`, root first, in the
/// order the resolver visits them.
///
/// # Errors
///
/// Returns an error if the manifest is invalid, the component is unknown,
/// or the closure contains a cycle.
pub fn execute(args: TreeArgs) -> anyhow::Result<()> {
    let manifest = super::load_manifest(&args.manifest)?;
    let graph = manifest.to_graph()?;
    let root = graph.require(&args.component)?;

    for component in graph.closure(root)? {
        let prefix = component
            .prefix()
            .map_or_else(|| "-".to_string(), |p| p.display().to_string());
        println!(
            "{:<24} {:<8} {}",
            component.name(),
            component.compiler().family,
            prefix
        );
    }
    Ok(())
}
