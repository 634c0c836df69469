//! `stemma search`: Rank components by purpose keyword.

use clap::Args;
use stemma_query::engine::QueryEngine;

use crate::output;

/// Arguments for the `search` command.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Case-insensitive keyword.
    pub keyword: String,
}

/// Executes the `search` command.
///
/// # Errors
///
/// Returns an error if the keyword is blank.
pub fn execute(args: SearchArgs, engine: &QueryEngine) -> anyhow::Result<()> {
    output::emit(&engine.search_by_purpose(&args.keyword))
}
