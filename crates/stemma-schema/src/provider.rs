//! Record provider: turns a unit directory into typed records.

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use stemma_common::config::IndexConfig;
use stemma_common::constants::FALLBACK_SCHEMA_FILE;

use crate::parsed::Parsed;
use crate::records::{ComponentDeclaration, ContractsRecord, SemanticAnnotations};
use crate::source::{UnitSource, unit_name};

/// Supplies the three typed records of a component unit.
///
/// Implementations never fail: missing or malformed input is reported
/// through [`Parsed::Failed`].
pub trait RecordProvider: Send + Sync {
    /// Directory access used by this provider.
    fn source(&self) -> &dyn UnitSource;

    /// Reads the structural declaration. Required.
    fn declaration(&self, unit: &Path) -> Parsed<ComponentDeclaration>;

    /// Reads the raw contracts. A unit without a contracts file has none.
    fn contracts(&self, unit: &Path) -> Parsed<ContractsRecord>;

    /// Reads the semantic annotations. Optional.
    fn annotations(&self, unit: &Path) -> Parsed<SemanticAnnotations>;
}

/// [`RecordProvider`] that parses YAML files with `serde_yaml`.
#[derive(Clone)]
pub struct YamlProvider {
    source: Arc<dyn UnitSource>,
    config: IndexConfig,
}

impl YamlProvider {
    /// Creates a provider reading files named according to `config`.
    #[must_use]
    pub fn new(source: Arc<dyn UnitSource>, config: IndexConfig) -> Self {
        Self { source, config }
    }

    fn read_yaml<T: DeserializeOwned>(&self, unit: &Path, file: &str) -> Parsed<T> {
        let name = unit_name(unit);
        let text = match self.source.read_text(unit, file) {
            Ok(t) => t,
            Err(e) => return Parsed::malformed(&name, format!("cannot read {file}: {e}")),
        };
        match serde_yaml::from_str::<T>(&text) {
            Ok(v) => Parsed::Value(v),
            Err(e) => {
                tracing::debug!(unit = %name, file, error = %e, "yaml parse failed");
                Parsed::malformed(&name, format!("invalid {file}: {e}"))
            }
        }
    }
}

impl std::fmt::Debug for YamlProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YamlProvider")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RecordProvider for YamlProvider {
    fn source(&self) -> &dyn UnitSource {
        self.source.as_ref()
    }

    fn declaration(&self, unit: &Path) -> Parsed<ComponentDeclaration> {
        let name = unit_name(unit);
        let primary = self.config.schema_file_for(&name);
        let file = if self.source.file_exists(unit, &primary) {
            primary
        } else if self.source.file_exists(unit, FALLBACK_SCHEMA_FILE) {
            FALLBACK_SCHEMA_FILE.to_string()
        } else {
            return Parsed::missing(&name, format!("no declaration file ({primary})"));
        };

        match self.read_yaml::<ComponentDeclaration>(unit, &file) {
            Parsed::Value(decl) if decl.name.trim().is_empty() => {
                Parsed::malformed(&name, format!("{file} declares an empty name"))
            }
            other => other,
        }
    }

    fn contracts(&self, unit: &Path) -> Parsed<ContractsRecord> {
        if !self.source.file_exists(unit, &self.config.contracts_file) {
            return Parsed::Value(ContractsRecord::default());
        }
        self.read_yaml(unit, &self.config.contracts_file)
    }

    fn annotations(&self, unit: &Path) -> Parsed<SemanticAnnotations> {
        if !self.source.file_exists(unit, &self.config.annotations_file) {
            return Parsed::Absent;
        }
        self.read_yaml(unit, &self.config.annotations_file)
    }
}

#[cfg(test)]
mod tests {
    use stemma_common::diagnostic::DiagnosticKind;

    use super::*;
    use crate::source::LocalFs;

    fn provider() -> YamlProvider {
        YamlProvider::new(Arc::new(LocalFs), IndexConfig::default())
    }

    fn write(unit: &Path, file: &str, body: &str) {
        std::fs::create_dir_all(unit).expect("mkdir");
        std::fs::write(unit.join(file), body).expect("write");
    }

    #[test]
    fn declaration_prefers_named_schema_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let unit = dir.path().join("Avatar");
        write(&unit, "Avatar.schema.yaml", "name: Avatar\ntype: primitive\n");
        write(&unit, "schema.yaml", "name: Other\n");

        let decl = provider().declaration(&unit);
        assert_eq!(decl.value().map(|d| d.name.as_str()), Some("Avatar"));
    }

    #[test]
    fn declaration_falls_back_to_plain_schema_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let unit = dir.path().join("Renamed-Dir");
        write(&unit, "schema.yaml", "name: Avatar\n");

        let decl = provider().declaration(&unit);
        assert_eq!(decl.value().map(|d| d.name.as_str()), Some("Avatar"));
    }

    #[test]
    fn missing_declaration_is_missing_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let unit = dir.path().join("Empty");
        std::fs::create_dir_all(&unit).expect("mkdir");

        let (value, diag) = provider().declaration(&unit).into_parts();
        assert!(value.is_none());
        assert_eq!(diag.expect("diag").kind, DiagnosticKind::MissingInput);
    }

    #[test]
    fn invalid_yaml_is_malformed_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let unit = dir.path().join("Broken");
        write(&unit, "Broken.schema.yaml", "name: [unclosed\n");

        let (_, diag) = provider().declaration(&unit).into_parts();
        let diag = diag.expect("diag");
        assert_eq!(diag.kind, DiagnosticKind::MalformedInput);
        assert!(diag.message.contains("Broken.schema.yaml"), "got: {}", diag.message);
    }

    #[test]
    fn empty_name_is_malformed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let unit = dir.path().join("Nameless");
        write(&unit, "Nameless.schema.yaml", "name: \"  \"\n");

        let (_, diag) = provider().declaration(&unit).into_parts();
        assert_eq!(diag.expect("diag").kind, DiagnosticKind::MalformedInput);
    }

    #[test]
    fn missing_contracts_file_yields_empty_record() {
        let dir = tempfile::tempdir().expect("tempdir");
        let unit = dir.path().join("Icon");
        std::fs::create_dir_all(&unit).expect("mkdir");

        let contracts = provider().contracts(&unit);
        assert_eq!(contracts, Parsed::Value(ContractsRecord::default()));
    }

    #[test]
    fn contracts_parse_inherits_and_excludes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let unit = dir.path().join("Notification");
        write(
            &unit,
            "contracts.yaml",
            r#"
inherits: Base
contracts:
  shows_count:
    category: content
    behavior: "child text"
excludes:
  interaction_focusable:
    reason: "Badges are not interactive"
    category: interaction
"#,
        );

        let record = provider().contracts(&unit);
        let record = record.value().expect("record");
        assert_eq!(record.inherits.as_deref(), Some("Base"));
        assert_eq!(record.contracts["shows_count"].behavior, "child text");
        assert!(record.excludes.contains_key("interaction_focusable"));
    }

    #[test]
    fn missing_annotations_are_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let unit = dir.path().join("Icon");
        std::fs::create_dir_all(&unit).expect("mkdir");
        assert_eq!(provider().annotations(&unit), Parsed::Absent);
    }

    #[test]
    fn annotations_parse_purpose() {
        let dir = tempfile::tempdir().expect("tempdir");
        let unit = dir.path().join("Icon");
        write(&unit, "component-meta.yaml", "purpose: Display a glyph\ntags: [visual]\n");

        let parsed = provider().annotations(&unit);
        let meta = parsed.value().expect("meta");
        assert_eq!(meta.purpose.as_deref(), Some("Display a glyph"));
        assert_eq!(meta.tags, vec!["visual"]);
    }
}
