//! `stemma find`: Find components matching every given filter.

use clap::Args;
use stemma_query::engine::QueryEngine;
use stemma_query::projection::ComponentFilter;

use crate::output;

/// Arguments for the `find` command.
#[derive(Args, Debug)]
pub struct FindArgs {
    /// Declared category, e.g. `layout`.
    #[arg(long)]
    pub category: Option<String>,

    /// Name of an active contract.
    #[arg(long)]
    pub concept: Option<String>,

    /// Supported platform.
    #[arg(long)]
    pub platform: Option<String>,

    /// Keyword in the purpose or description.
    #[arg(long)]
    pub purpose: Option<String>,
}

impl From<FindArgs> for ComponentFilter {
    fn from(args: FindArgs) -> Self {
        Self {
            category: args.category,
            concept: args.concept,
            platform: args.platform,
            purpose: args.purpose,
        }
    }
}

/// Executes the `find` command.
///
/// # Errors
///
/// Returns an error if the result cannot be printed.
pub fn execute(args: FindArgs, engine: &QueryEngine) -> anyhow::Result<()> {
    output::emit(&engine.find_components(&args.into()))
}
