//! JSON output for query results.

use serde::Serialize;
use stemma_query::envelope::QueryResult;

/// Renders a result envelope as pretty JSON.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
pub fn render<T: Serialize>(result: &QueryResult<T>) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Prints a result envelope to stdout.
///
/// The envelope is always printed; a query that produced no answer is then
/// reported as an error so the process exits non-zero.
///
/// # Errors
///
/// Returns an error if serialization fails or the envelope carries an error.
#[allow(clippy::print_stdout)]
pub fn emit<T: Serialize>(result: &QueryResult<T>) -> anyhow::Result<()> {
    println!("{}", render(result)?);
    match &result.error {
        Some(error) => Err(anyhow::anyhow!("{error}")),
        None => Ok(()),
    }
}
