//! Per-component metadata and its assembly from parsed records.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stemma_common::diagnostic::Diagnostic;
use stemma_resolve::inheritance::{self, ResolvedContracts};
use stemma_resolve::tokens::{self, ContractTokenRelationships, TokenScanConfig};
use stemma_schema::parsed::Parsed;
use stemma_schema::records::{ComponentDeclaration, ContractsRecord, SemanticAnnotations};
use stemma_schema::source::unit_name;

/// Everything the index knows about one component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMetadata {
    /// Structural declaration fields.
    #[serde(flatten)]
    pub declaration: ComponentDeclaration,
    /// Contracts after inheritance merging.
    pub contracts: ResolvedContracts,
    /// Optional semantic annotations.
    pub annotations: Option<SemanticAnnotations>,
    /// Token references found in contract prose.
    pub token_relationships: ContractTokenRelationships,
    /// Directory basename the component was read from.
    pub unit: String,
    /// When this entry was assembled.
    pub indexed_at: DateTime<Utc>,
    /// Non-fatal problems found while assembling.
    pub diagnostics: Vec<Diagnostic>,
}

impl ComponentMetadata {
    /// Declared component name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.declaration.name
    }

    /// Annotation purpose, if annotated.
    #[must_use]
    pub fn purpose(&self) -> Option<&str> {
        self.annotations.as_ref().and_then(|a| a.purpose.as_deref())
    }
}

/// Raw contracts of a unit, cached between scan passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedContracts {
    /// Unit directory the record came from.
    pub unit: PathBuf,
    /// Contracts as declared, before merging.
    pub contracts: ContractsRecord,
    /// Property names of the unit's declaration.
    pub properties: BTreeSet<String>,
}

impl CachedContracts {
    /// Captures what other units need from this one.
    #[must_use]
    pub fn new(unit: &Path, declaration: &ComponentDeclaration, contracts: ContractsRecord) -> Self {
        Self {
            unit: unit.to_path_buf(),
            contracts,
            properties: declaration.properties.keys().cloned().collect(),
        }
    }
}

/// Parse cache keyed by declared component name.
pub type ParseCache = BTreeMap<String, CachedContracts>;

/// Builds the metadata for one unit.
///
/// The parent, if declared, is looked up in `cache`; its absence is a
/// diagnostic, never a failure.
#[must_use]
pub fn assemble(
    unit: &Path,
    declaration: ComponentDeclaration,
    contracts: &ContractsRecord,
    annotations: Parsed<SemanticAnnotations>,
    cache: &ParseCache,
) -> ComponentMetadata {
    let name = declaration.name.clone();
    let parent = contracts.inherits.as_deref().and_then(|p| cache.get(p));
    let has_grandparent = parent.is_some_and(|p| p.contracts.inherits.is_some());

    let resolution = inheritance::resolve(
        &name,
        contracts,
        parent.map(|p| &p.contracts),
        has_grandparent,
    );
    let omits = inheritance::validate_omits(
        &name,
        &declaration.omits,
        contracts.inherits.as_deref(),
        parent.map(|p| &p.properties),
    );
    let token_relationships = tokens::derive(
        &resolution.contracts.active,
        &declaration.tokens,
        TokenScanConfig::current(),
    );
    let (annotations, annotation_problem) = annotations.into_parts();

    let diagnostics: Vec<Diagnostic> = resolution
        .warnings
        .into_iter()
        .chain(omits.warnings)
        .chain(annotation_problem)
        .map(Diagnostic::logged)
        .collect();

    tracing::debug!(
        component = %name,
        active = resolution.contracts.active.len(),
        gaps = token_relationships.gaps.len(),
        diagnostics = diagnostics.len(),
        "component assembled"
    );

    ComponentMetadata {
        declaration,
        contracts: resolution.contracts,
        annotations,
        token_relationships,
        unit: unit_name(unit),
        indexed_at: Utc::now(),
        diagnostics,
    }
}
