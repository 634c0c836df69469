//! System-wide constants and default file names.

/// Default component root, relative to the working directory.
pub const DEFAULT_COMPONENT_ROOT: &str = "src/components/core";

/// File holding a unit's behavioral contracts.
pub const DEFAULT_CONTRACTS_FILE: &str = "contracts.yaml";

/// File holding a unit's optional semantic annotations.
pub const DEFAULT_ANNOTATIONS_FILE: &str = "component-meta.yaml";

/// Suffix appended to the unit directory name to locate its declaration.
pub const DEFAULT_SCHEMA_SUFFIX: &str = ".schema.yaml";

/// Declaration file name used when no `<unit><suffix>` file exists.
pub const FALLBACK_SCHEMA_FILE: &str = "schema.yaml";

/// Default delay before a change notification triggers a reindex.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Maximum supported inheritance depth.
pub const MAX_INHERITANCE_DEPTH: usize = 1;

