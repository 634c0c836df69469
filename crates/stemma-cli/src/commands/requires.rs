//! `stemma requires`: Check a parent's required child types.

use clap::Args;
use stemma_query::engine::QueryEngine;

use crate::output;

/// Arguments for the `requires` command.
#[derive(Args, Debug)]
pub struct RequiresArgs {
    /// Parent component name.
    pub parent: String,

    /// Child component types present in the parent.
    pub children: Vec<String>,
}

/// Executes the `requires` command.
///
/// # Errors
///
/// Returns an error if the parent is not indexed.
pub fn execute(args: RequiresArgs, engine: &QueryEngine) -> anyhow::Result<()> {
    output::emit(&engine.check_requires(&args.parent, &args.children))
}
