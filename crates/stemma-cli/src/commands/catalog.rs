//! `stemma catalog`: List every indexed component.

use clap::Args;
use stemma_query::engine::QueryEngine;

use crate::output;

/// Arguments for the `catalog` command.
#[derive(Args, Debug)]
pub struct CatalogArgs {}

/// Executes the `catalog` command.
///
/// # Errors
///
/// Returns an error if the result cannot be printed.
pub fn execute(_args: CatalogArgs, engine: &QueryEngine) -> anyhow::Result<()> {
    output::emit(&engine.get_catalog())
}
