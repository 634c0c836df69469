//! `stemma check`: Check whether one component may contain another.

use std::collections::BTreeMap;

use anyhow::Context;
use clap::Args;
use serde_json::Value;
use stemma_query::engine::QueryEngine;

use crate::output;

/// Arguments for the `check` command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Parent component name.
    pub parent: String,

    /// Child component name.
    pub child: String,

    /// Parent prop value as `key=value`; may be repeated.
    #[arg(long = "prop", value_name = "KEY=VALUE")]
    pub props: Vec<String>,
}

/// Executes the `check` command.
///
/// Without `--prop` only static constraints apply.
///
/// # Errors
///
/// Returns an error if a prop is malformed or the parent is not indexed.
pub fn execute(args: CheckArgs, engine: &QueryEngine) -> anyhow::Result<()> {
    let props = parse_props(&args.props)?;
    output::emit(&engine.check_composition(&args.parent, &args.child, props.as_ref()))
}

fn parse_props(raw: &[String]) -> anyhow::Result<Option<BTreeMap<String, Value>>> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.iter()
        .map(|pair| parse_prop(pair))
        .collect::<anyhow::Result<BTreeMap<_, _>>>()
        .map(Some)
}

/// Splits `key=value`; the value is read as a YAML scalar so `true` and `3`
/// keep their types.
fn parse_prop(pair: &str) -> anyhow::Result<(String, Value)> {
    let (key, raw) = pair
        .split_once('=')
        .with_context(|| format!("prop '{pair}' is not in KEY=VALUE form"))?;
    anyhow::ensure!(!key.is_empty(), "prop '{pair}' has an empty key");
    let value =
        serde_yaml::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}
