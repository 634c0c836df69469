//! CLI command definitions and dispatch.

pub mod catalog;
pub mod check;
pub mod component;
pub mod find;
pub mod health;
pub mod requires;
pub mod search;
pub mod summary;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use stemma_common::config::IndexConfig;
use stemma_index::index::ComponentIndex;
use stemma_query::engine::QueryEngine;
use stemma_query::metrics::QueryMetrics;

/// Stemma: component metadata index and query tool.
#[derive(Parser, Debug)]
#[command(name = "stemma", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// YAML file with index configuration.
    #[arg(long, global = true, env = "STEMMA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Component root directory; overrides the configured root.
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every component with its minimal projection.
    Catalog(catalog::CatalogArgs),
    /// Show the summary projection of one component.
    Summary(summary::SummaryArgs),
    /// Show everything known about one component.
    Component(component::ComponentArgs),
    /// Find components by category, contract, platform, or purpose.
    Find(find::FindArgs),
    /// Rank components whose purpose or description mentions a keyword.
    Search(search::SearchArgs),
    /// Check whether one component may contain another.
    Check(check::CheckArgs),
    /// Check that a parent's required child types are present.
    Requires(requires::RequiresArgs),
    /// Report index health.
    Health(health::HealthArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if configuration loading, indexing, or the query fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref(), cli.root)?;
    let engine = open_engine(&config)?;

    match cli.command {
        Command::Catalog(args) => catalog::execute(args, &engine),
        Command::Summary(args) => summary::execute(args, &engine),
        Command::Component(args) => component::execute(args, &engine),
        Command::Find(args) => find::execute(args, &engine),
        Command::Search(args) => search::execute(args, &engine),
        Command::Check(args) => check::execute(args, &engine),
        Command::Requires(args) => requires::execute(args, &engine),
        Command::Health(args) => health::execute(args, &engine),
    }
}

/// Reads the configuration file, if any, and applies the root override.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid YAML.
pub fn load_config(path: Option<&Path>, root: Option<PathBuf>) -> anyhow::Result<IndexConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_yaml::from_str(&text)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => IndexConfig::default(),
    };
    if let Some(root) = root {
        config.root = root;
    }
    Ok(config)
}

/// Builds and fills the index, then wraps it in a query engine.
///
/// # Errors
///
/// Returns an error if the component root exists but cannot be scanned.
pub fn open_engine(config: &IndexConfig) -> anyhow::Result<QueryEngine> {
    let index = Arc::new(ComponentIndex::from_config(config));
    let count = index
        .index_all(&config.root)
        .with_context(|| format!("failed to index {}", config.root.display()))?;
    tracing::info!(root = %config.root.display(), components = count, "index ready");

    Ok(QueryEngine::new(index).with_metrics(Arc::new(|m: &QueryMetrics| {
        tracing::info!(
            operation = m.operation,
            response_time_ms = m.response_time_ms,
            results = m.result_count,
            "query metrics"
        );
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_flag_overrides_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("stemma.yaml");
        std::fs::write(&file, "root: from-file\ndebounce_ms: 50\n").expect("write");

        let config = load_config(Some(&file), Some(PathBuf::from("from-flag"))).expect("load");
        assert_eq!(config.root, PathBuf::from("from-flag"));
        assert_eq!(config.debounce_ms, 50);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(load_config(Some(&dir.path().join("absent.yaml")), None).is_err());
    }

    #[test]
    fn defaults_apply_without_file() {
        let config = load_config(None, None).expect("load");
        assert_eq!(config, IndexConfig::default());
    }

    #[test]
    fn cli_parses_global_root_after_subcommand() {
        let cli = Cli::try_parse_from(["stemma", "summary", "Card", "--root", "/tmp/c"])
            .expect("parse");
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/c")));
        assert!(matches!(cli.command, Command::Summary(_)));
    }
}
