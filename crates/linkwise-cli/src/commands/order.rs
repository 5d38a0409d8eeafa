//! `linkwise order`: Show the dependencies-first build order.

use std::path::PathBuf;

use clap::Args;

/// Arguments for the `order` command.
#[derive(Args, Debug)]
pub struct OrderArgs {
    /// Path to the YAML or JSON manifest.
    pub manifest: PathBuf,
}

/// Executes the `order` command.
///
/// # Errors
///
/// Returns an error if the manifest is invalid or its graph is cyclic.
pub fn execute(args: OrderArgs) -> anyhow::Result<()> {
    let manifest = super::load_manifest(&args.manifest)?;
    let graph = manifest.to_graph()?;
    let order = graph.build_order()?;

    println!("Build order for: {}", args.manifest.display());
    for (step, name) in order.iter().enumerate() {
        println!("  {:>3}. {name}", step + 1);
    }
    println!();
    println!("  {} component(s).", order.len());
    Ok(())
}
