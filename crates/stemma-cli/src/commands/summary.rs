//! `stemma summary`: Show the summary projection of one component.

use clap::Args;
use stemma_query::engine::QueryEngine;

use crate::output;

/// Arguments for the `summary` command.
#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Declared component name.
    pub name: String,
}

/// Executes the `summary` command.
///
/// # Errors
///
/// Returns an error if the component is not indexed.
pub fn execute(args: SummaryArgs, engine: &QueryEngine) -> anyhow::Result<()> {
    output::emit(&engine.get_component_summary(&args.name))
}
