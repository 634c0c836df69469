//! Configuration model for indexing a component root.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants;

/// Root configuration for the component index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Directory whose immediate subdirectories are component units.
    pub root: PathBuf,
    /// Name of the contracts file inside each unit.
    pub contracts_file: String,
    /// Name of the optional annotations file inside each unit.
    pub annotations_file: String,
    /// Suffix appended to the unit directory name to find its declaration.
    pub schema_suffix: String,
    /// Debounce delay for change notifications, in milliseconds.
    pub debounce_ms: u64,
}

impl IndexConfig {
    /// Creates a configuration with default file names for the given root.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Returns the declaration file name for a unit directory.
    #[must_use]
    pub fn schema_file_for(&self, unit: &str) -> String {
        format!("{unit}{}", self.schema_suffix)
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(constants::DEFAULT_COMPONENT_ROOT),
            contracts_file: constants::DEFAULT_CONTRACTS_FILE.into(),
            annotations_file: constants::DEFAULT_ANNOTATIONS_FILE.into(),
            schema_suffix: constants::DEFAULT_SCHEMA_SUFFIX.into(),
            debounce_ms: constants::DEFAULT_DEBOUNCE_MS,
        }
    }
}
