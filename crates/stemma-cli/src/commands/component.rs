//! `stemma component`: Show the full metadata of one component.

use clap::Args;
use stemma_query::engine::QueryEngine;

use crate::output;

/// Arguments for the `component` command.
#[derive(Args, Debug)]
pub struct ComponentArgs {
    /// Declared component name.
    pub name: String,
}

/// Executes the `component` command.
///
/// # Errors
///
/// Returns an error if the component is not indexed.
pub fn execute(args: ComponentArgs, engine: &QueryEngine) -> anyhow::Result<()> {
    output::emit(&engine.get_component(&args.name))
}
