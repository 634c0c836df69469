//! `stemma health`: Report index health.

use clap::Args;
use stemma_query::engine::QueryEngine;

use crate::output;

/// Arguments for the `health` command.
#[derive(Args, Debug)]
pub struct HealthArgs {}

/// Executes the `health` command.
///
/// # Errors
///
/// Returns an error if the result cannot be printed.
pub fn execute(_args: HealthArgs, engine: &QueryEngine) -> anyhow::Result<()> {
    output::emit(&engine.get_health())
}
