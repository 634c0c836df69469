//! The component index orchestrator.
//!
//! Readers clone an `Arc` to the current [`IndexSnapshot`]; writers build a
//! complete replacement off-lock and swap it in with a single write, so no
//! partially merged entry is ever visible. One writer runs at a time.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use stemma_common::config::IndexConfig;
use stemma_common::diagnostic::{Diagnostic, DiagnosticKind};
use stemma_common::error::Result;
use stemma_resolve::composition::CategoryLookup;
use stemma_schema::parsed::Parsed;
use stemma_schema::provider::{RecordProvider, YamlProvider};
use stemma_schema::records::ComponentDeclaration;
use stemma_schema::source::{LocalFs, unit_name};

use crate::health::HealthReport;
use crate::metadata::{self, CachedContracts, ComponentMetadata, ParseCache};

/// An immutable view of the index.
#[derive(Debug, Clone, Default)]
pub struct IndexSnapshot {
    entries: BTreeMap<String, Arc<ComponentMetadata>>,
    cache: ParseCache,
    unit_diagnostics: BTreeMap<String, Vec<Diagnostic>>,
    scan_diagnostics: Vec<Diagnostic>,
    last_indexed_at: Option<DateTime<Utc>>,
}

impl IndexSnapshot {
    /// Returns the entry for a declared component name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<ComponentMetadata>> {
        self.entries.get(name)
    }

    /// Iterates entries in name order.
    pub fn entries(&self) -> impl Iterator<Item = &Arc<ComponentMetadata>> {
        self.entries.values()
    }

    /// Number of indexed components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no component is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every diagnostic recorded by the most recent scan and reindexes since.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.scan_diagnostics
            .iter()
            .chain(self.unit_diagnostics.values().flatten())
            .cloned()
            .collect()
    }

    /// When the index was last modified.
    #[must_use]
    pub const fn last_indexed_at(&self) -> Option<DateTime<Utc>> {
        self.last_indexed_at
    }

    /// Drops everything owned by `unit` or by the component it now declares,
    /// including state left under a previous directory name.
    fn remove_unit(&mut self, unit: &str, declared: Option<&str>) {
        let owns = |name: &str, owner: &str| owner == unit || Some(name) == declared;

        let mut owners = vec![unit.to_string()];
        self.entries.retain(|name, meta| {
            let keep = !owns(name.as_str(), &meta.unit);
            if !keep {
                owners.push(meta.unit.clone());
            }
            keep
        });
        self.cache
            .retain(|name, cached| !owns(name.as_str(), unit_name(&cached.unit).as_str()));
        for owner in &owners {
            let _ = self.unit_diagnostics.remove(owner);
        }
    }
}

impl CategoryLookup for IndexSnapshot {
    fn category_of(&self, name: &str) -> Option<String> {
        self.entries.get(name).map(|m| m.declaration.category.clone())
    }
}

/// A unit that passed the first scan pass.
struct ParsedUnit {
    path: PathBuf,
    declaration: ComponentDeclaration,
}

/// Owned, explicitly constructed index of component metadata.
pub struct ComponentIndex {
    provider: Arc<dyn RecordProvider>,
    current: RwLock<Arc<IndexSnapshot>>,
    writer: Mutex<()>,
}

impl std::fmt::Debug for ComponentIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentIndex")
            .field("entries", &self.current.read().len())
            .finish_non_exhaustive()
    }
}

impl ComponentIndex {
    /// Creates an empty index reading units through `provider`.
    #[must_use]
    pub fn new(provider: Arc<dyn RecordProvider>) -> Self {
        Self {
            provider,
            current: RwLock::new(Arc::new(IndexSnapshot::default())),
            writer: Mutex::new(()),
        }
    }

    /// Creates an empty index over the local filesystem using YAML records.
    #[must_use]
    pub fn from_config(config: &IndexConfig) -> Self {
        Self::new(Arc::new(YamlProvider::new(Arc::new(LocalFs), config.clone())))
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        Arc::clone(&self.current.read())
    }

    /// Returns the entry for a declared component name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<ComponentMetadata>> {
        self.current.read().get(name).cloned()
    }

    /// Number of indexed components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.current.read().len()
    }

    /// Whether no component is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.read().is_empty()
    }

    /// Reports index health.
    #[must_use]
    pub fn health(&self) -> HealthReport {
        HealthReport::from_snapshot(&self.snapshot())
    }

    /// Drops every entry, cached record, and diagnostic.
    pub fn clear(&self) {
        let _guard = self.writer.lock();
        *self.current.write() = Arc::new(IndexSnapshot::default());
    }

    /// Rebuilds the whole index from the units under `root`.
    ///
    /// Pass one parses every unit and caches its raw contracts by declared
    /// name; pass two assembles each unit against that cache, so a parent is
    /// found regardless of scan order. Units with missing or malformed
    /// declarations are skipped with a diagnostic. A missing root yields an
    /// empty index with one diagnostic.
    ///
    /// # Errors
    ///
    /// Returns an error only if the root exists but cannot be listed.
    pub fn index_all(&self, root: &Path) -> Result<usize> {
        let _guard = self.writer.lock();
        tracing::info!(root = %root.display(), "indexing component root");

        let mut next = IndexSnapshot {
            last_indexed_at: Some(Utc::now()),
            ..IndexSnapshot::default()
        };

        let source = self.provider.source();
        if !source.root_exists(root) {
            next.scan_diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::MissingInput,
                    format!("component root {} does not exist", root.display()),
                )
                .logged(),
            );
            *self.current.write() = Arc::new(next);
            return Ok(0);
        }

        let mut parsed_units = Vec::new();
        for unit in source.list_units(root)? {
            if let Some(parsed) = self.parse_unit(&unit, &mut next) {
                parsed_units.push(parsed);
            }
        }

        for parsed in parsed_units {
            self.assemble_into(parsed, &mut next);
        }

        let count = next.len();
        tracing::info!(
            components = count,
            diagnostics = next.diagnostics().len(),
            "component index rebuilt"
        );
        *self.current.write() = Arc::new(next);
        Ok(count)
    }

    /// Re-reads a single unit and replaces its entry.
    ///
    /// The previous entry is removed whether it matches by declared name or
    /// by directory basename, so renamed components do not linger. Units that
    /// inherit from this one keep their previously merged contracts until
    /// the next full scan.
    ///
    /// # Errors
    ///
    /// Reserved for unexpected faults; unit-level problems become diagnostics.
    pub fn reindex_one(&self, unit: &Path) -> Result<()> {
        let _guard = self.writer.lock();
        let basename = unit_name(unit);
        tracing::info!(unit = %basename, "reindexing unit");

        let mut next = IndexSnapshot::clone(&self.current.read());
        next.last_indexed_at = Some(Utc::now());

        let declared = match self.provider.declaration(unit) {
            Parsed::Value(decl) => Some(decl.name),
            Parsed::Absent | Parsed::Failed(_) => None,
        };
        next.remove_unit(&basename, declared.as_deref());

        if let Some(parsed) = self.parse_unit(unit, &mut next) {
            self.assemble_into(parsed, &mut next);
        }

        *self.current.write() = Arc::new(next);
        Ok(())
    }

    /// First pass for one unit: parse and cache its raw contracts.
    fn parse_unit(&self, unit: &Path, next: &mut IndexSnapshot) -> Option<ParsedUnit> {
        let basename = unit_name(unit);
        let declaration = match self.provider.declaration(unit) {
            Parsed::Value(decl) => decl,
            Parsed::Absent => return None,
            Parsed::Failed(diag) => {
                record_unit_problem(next, &basename, diag);
                return None;
            }
        };
        let contracts = match self.provider.contracts(unit) {
            Parsed::Value(contracts) => contracts,
            Parsed::Absent => Default::default(),
            Parsed::Failed(diag) => {
                record_unit_problem(next, &basename, diag);
                return None;
            }
        };

        let name = declaration.name.clone();
        let duplicate = next.cache.get(&name).map(|existing| {
            format!(
                "component {name} is also declared in {}; the later unit wins",
                existing.unit.display()
            )
        });
        if let Some(message) = duplicate {
            record_unit_problem(
                next,
                &basename,
                Diagnostic::new(DiagnosticKind::MalformedInput, message).for_component(&name),
            );
        }
        let _ = next
            .cache
            .insert(name, CachedContracts::new(unit, &declaration, contracts));

        Some(ParsedUnit {
            path: unit.to_path_buf(),
            declaration,
        })
    }

    /// Second pass for one unit: assemble metadata and install it.
    fn assemble_into(&self, parsed: ParsedUnit, next: &mut IndexSnapshot) {
        let name = parsed.declaration.name.clone();
        // A duplicate name that lost to a later unit is not assembled.
        let Some(cached) = next
            .cache
            .get(&name)
            .filter(|cached| cached.unit == parsed.path)
        else {
            return;
        };
        let contracts = cached.contracts.clone();
        let annotations = self.provider.annotations(&parsed.path);
        let meta = metadata::assemble(
            &parsed.path,
            parsed.declaration,
            &contracts,
            annotations,
            &next.cache,
        );

        if !meta.diagnostics.is_empty() {
            next.unit_diagnostics
                .entry(meta.unit.clone())
                .or_default()
                .extend(meta.diagnostics.iter().cloned());
        }
        let _ = next.entries.insert(name, Arc::new(meta));
    }
}

fn record_unit_problem(next: &mut IndexSnapshot, unit: &str, diagnostic: Diagnostic) {
    next.unit_diagnostics
        .entry(unit.to_string())
        .or_default()
        .push(diagnostic.logged());
}

#[cfg(test)]
mod tests {
    use stemma_common::types::{ContractSource, HealthStatus};

    use super::*;

    fn write(root: &Path, unit: &str, file: &str, body: &str) {
        let dir = root.join(unit);
        std::fs::create_dir_all(&dir).expect("mkdir");
        std::fs::write(dir.join(file), body).expect("write");
    }

    fn index() -> ComponentIndex {
        ComponentIndex::from_config(&IndexConfig::default())
    }

    fn seed_base_and_child(root: &Path) {
        write(root, "A-Child", "A-Child.schema.yaml", "name: Child\ntype: semantic\n");
        write(
            root,
            "A-Child",
            "contracts.yaml",
            "inherits: Base\ncontracts:\n  own_one:\n    category: content\n",
        );
        write(root, "Z-Base", "Z-Base.schema.yaml", "name: Base\ntype: primitive\n");
        write(
            root,
            "Z-Base",
            "contracts.yaml",
            "contracts:\n  base_one:\n    category: content\n",
        );
    }

    #[test]
    fn missing_root_yields_empty_index_with_diagnostic() {
        let dir = tempfile::tempdir().expect("tempdir");
        let idx = index();
        let count = idx.index_all(&dir.path().join("absent")).expect("index");
        assert_eq!(count, 0);
        let health = idx.health();
        assert_eq!(health.status, HealthStatus::Empty);
        assert_eq!(health.diagnostics.len(), 1);
    }

    #[test]
    fn parent_found_regardless_of_scan_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        seed_base_and_child(dir.path());
        let idx = index();
        assert_eq!(idx.index_all(dir.path()).expect("index"), 2);

        let child = idx.get("Child").expect("child");
        assert_eq!(
            child.contracts.active["base_one"].source,
            Some(ContractSource::Inherited)
        );
        assert_eq!(idx.health().status, HealthStatus::Healthy);
    }

    #[test]
    fn unit_without_declaration_is_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        seed_base_and_child(dir.path());
        write(dir.path(), "Orphan", "contracts.yaml", "contracts: {}\n");
        let idx = index();
        assert_eq!(idx.index_all(dir.path()).expect("index"), 2);

        let health = idx.health();
        assert_eq!(health.status, HealthStatus::Degraded);
        assert!(
            health
                .diagnostics
                .iter()
                .any(|d| d.kind == DiagnosticKind::MissingInput)
        );
    }

    #[test]
    fn malformed_contracts_skip_unit() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "Bad", "Bad.schema.yaml", "name: Bad\n");
        write(dir.path(), "Bad", "contracts.yaml", "contracts: [oops\n");
        let idx = index();
        assert_eq!(idx.index_all(dir.path()).expect("index"), 0);
        assert!(idx.get("Bad").is_none());
    }

    #[test]
    fn reindex_one_tolerates_rename() {
        let dir = tempfile::tempdir().expect("tempdir");
        seed_base_and_child(dir.path());
        let idx = index();
        let _ = idx.index_all(dir.path()).expect("index");

        write(dir.path(), "A-Child", "A-Child.schema.yaml", "name: Renamed\n");
        idx.reindex_one(&dir.path().join("A-Child")).expect("reindex");

        assert!(idx.get("Child").is_none());
        assert!(idx.get("Renamed").is_some());
        assert_eq!(idx.len(), 2);
    }

    #[test]
    fn reindex_after_directory_rename_keeps_index_healthy() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "Old", "schema.yaml", "name: Button\ntype: primitive\n");
        let idx = index();
        assert_eq!(idx.index_all(dir.path()).expect("index"), 1);
        assert_eq!(idx.health().status, HealthStatus::Healthy);

        std::fs::rename(dir.path().join("Old"), dir.path().join("New")).expect("rename");
        idx.reindex_one(&dir.path().join("New")).expect("reindex");

        assert_eq!(idx.len(), 1);
        assert_eq!(idx.get("Button").expect("button").unit, "New");
        let health = idx.health();
        assert_eq!(health.status, HealthStatus::Healthy, "got: {:?}", health.diagnostics);
        assert!(health.diagnostics.is_empty());
    }

    #[test]
    fn duplicate_name_assembles_only_the_later_unit() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "A-Dup", "A-Dup.schema.yaml", "name: Dup\ntype: primitive\n");
        write(dir.path(), "B-Dup", "B-Dup.schema.yaml", "name: Dup\ntype: semantic\n");
        let idx = index();
        assert_eq!(idx.index_all(dir.path()).expect("index"), 1);

        let winner = idx.get("Dup").expect("dup");
        assert_eq!(winner.unit, "B-Dup");
        let diagnostics = idx.health().diagnostics;
        assert_eq!(diagnostics.len(), 1, "got: {diagnostics:?}");
        assert_eq!(diagnostics[0].kind, DiagnosticKind::MalformedInput);
        assert!(diagnostics[0].message.contains("A-Dup"), "got: {}", diagnostics[0].message);
    }

    #[test]
    fn reindex_one_is_idempotent_apart_from_timestamp() {
        let dir = tempfile::tempdir().expect("tempdir");
        seed_base_and_child(dir.path());
        let idx = index();
        let _ = idx.index_all(dir.path()).expect("index");
        let unit = dir.path().join("A-Child");

        idx.reindex_one(&unit).expect("first");
        let first = idx.get("Child").expect("first entry");
        idx.reindex_one(&unit).expect("second");
        let second = idx.get("Child").expect("second entry");

        assert!(second.indexed_at >= first.indexed_at);
        let mut a = ComponentMetadata::clone(&first);
        a.indexed_at = second.indexed_at;
        assert_eq!(&a, second.as_ref());
    }

    #[test]
    fn reindex_removed_declaration_drops_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        seed_base_and_child(dir.path());
        let idx = index();
        let _ = idx.index_all(dir.path()).expect("index");

        std::fs::remove_file(dir.path().join("A-Child/A-Child.schema.yaml")).expect("rm");
        idx.reindex_one(&dir.path().join("A-Child")).expect("reindex");

        assert!(idx.get("Child").is_none());
        assert_eq!(idx.health().status, HealthStatus::Degraded);
    }

    #[test]
    fn reindex_does_not_cascade_to_inheritors() {
        let dir = tempfile::tempdir().expect("tempdir");
        seed_base_and_child(dir.path());
        let idx = index();
        let _ = idx.index_all(dir.path()).expect("index");

        write(
            dir.path(),
            "Z-Base",
            "contracts.yaml",
            "contracts:\n  base_two:\n    category: content\n",
        );
        idx.reindex_one(&dir.path().join("Z-Base")).expect("reindex");

        let child = idx.get("Child").expect("child");
        assert!(child.contracts.active.contains_key("base_one"));
        assert!(!child.contracts.active.contains_key("base_two"));
    }

    #[test]
    fn snapshot_held_by_reader_survives_rebuild() {
        let dir = tempfile::tempdir().expect("tempdir");
        seed_base_and_child(dir.path());
        let idx = index();
        let _ = idx.index_all(dir.path()).expect("index");

        let before = idx.snapshot();
        idx.clear();
        assert_eq!(before.len(), 2);
        assert!(idx.is_empty());
    }

    #[test]
    fn snapshot_provides_category_lookup() {
        let dir = tempfile::tempdir().expect("tempdir");
        seed_base_and_child(dir.path());
        let idx = index();
        let _ = idx.index_all(dir.path()).expect("index");
        let snap = idx.snapshot();
        assert_eq!(snap.category_of("Base").as_deref(), Some("primitive"));
        assert!(snap.category_of("Nope").is_none());
    }
}
