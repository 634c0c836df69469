//! Progressively detailed views of a component.
//!
//! [`CatalogEntry`] is the smallest and leaves out contracts and tokens
//! entirely; [`ComponentSummary`] adds counts and annotations. The full view
//! is [`ComponentMetadata`] itself.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use stemma_index::metadata::ComponentMetadata;
use stemma_schema::records::SemanticAnnotations;

/// Minimal per-component listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Declared name.
    pub name: String,
    /// Declared category.
    #[serde(rename = "type")]
    pub category: String,
    /// Component family.
    pub family: String,
    /// Annotation purpose, if annotated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    /// Readiness level.
    pub readiness: String,
    /// Supported platforms.
    pub platforms: Vec<String>,
    /// Number of active contracts.
    pub contract_count: usize,
}

impl From<&ComponentMetadata> for CatalogEntry {
    fn from(meta: &ComponentMetadata) -> Self {
        let decl = &meta.declaration;
        Self {
            name: decl.name.clone(),
            category: decl.category.clone(),
            family: decl.family.clone(),
            purpose: meta.purpose().map(str::to_string),
            readiness: decl.readiness.clone(),
            platforms: decl.platforms.clone(),
            contract_count: meta.contracts.active.len(),
        }
    }
}

/// Contract and token tallies for a summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractCounts {
    /// Active contracts.
    pub active: usize,
    /// Active contracts the component declares itself.
    pub own: usize,
    /// Active contracts taken from the parent.
    pub inherited: usize,
    /// Excluded parent contracts.
    pub excluded: usize,
    /// Declared tokens.
    pub tokens: usize,
    /// Token references with no declared token.
    pub token_gaps: usize,
}

/// Mid-sized view: the catalog entry plus counts and annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSummary {
    /// Catalog fields.
    #[serde(flatten)]
    pub entry: CatalogEntry,
    /// Free-text description.
    pub description: String,
    /// Distinct categories of active contracts.
    pub contract_categories: BTreeSet<String>,
    /// Contract and token tallies.
    pub counts: ContractCounts,
    /// Semantic annotations, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<SemanticAnnotations>,
    /// Components this one names as children or requirements.
    pub composes: BTreeSet<String>,
    /// Declared parent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherits_from: Option<String>,
}

impl From<&ComponentMetadata> for ComponentSummary {
    fn from(meta: &ComponentMetadata) -> Self {
        let contracts = &meta.contracts;
        let composes = meta
            .declaration
            .composition
            .as_ref()
            .map(|c| {
                c.children
                    .allowed
                    .iter()
                    .chain(&c.requires)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Self {
            entry: CatalogEntry::from(meta),
            description: meta.declaration.description.clone(),
            contract_categories: contracts
                .active
                .values()
                .map(|c| c.category.clone())
                .filter(|c| !c.is_empty())
                .collect(),
            counts: ContractCounts {
                active: contracts.active.len(),
                own: contracts.own.len(),
                inherited: contracts.inherited.len(),
                excluded: contracts.excluded.len(),
                tokens: meta.declaration.tokens.len(),
                token_gaps: meta.token_relationships.gaps.len(),
            },
            annotations: meta.annotations.clone(),
            composes,
            inherits_from: contracts.inherits_from.clone(),
        }
    }
}

/// Which field a purpose search matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchField {
    /// The annotation purpose.
    Purpose,
    /// The declaration description only.
    Description,
}

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    /// Catalog fields.
    #[serde(flatten)]
    pub entry: CatalogEntry,
    /// Field that matched.
    pub matched_on: MatchField,
}

/// Optional, conjunctive filters for finding components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentFilter {
    /// Exact declared category.
    pub category: Option<String>,
    /// Exact active contract name.
    pub concept: Option<String>,
    /// Supported platform.
    pub platform: Option<String>,
    /// Case-insensitive keyword in purpose or description.
    pub purpose: Option<String>,
}

impl ComponentFilter {
    /// Whether `meta` passes every set filter.
    #[must_use]
    pub fn matches(&self, meta: &ComponentMetadata) -> bool {
        let decl = &meta.declaration;
        self.category.as_ref().is_none_or(|c| &decl.category == c)
            && self
                .concept
                .as_ref()
                .is_none_or(|c| meta.contracts.active.contains_key(c))
            && self
                .platform
                .as_ref()
                .is_none_or(|p| decl.platforms.contains(p))
            && self
                .purpose
                .as_ref()
                .is_none_or(|k| purpose_match(meta, k).is_some())
    }
}

/// Which field of `meta` contains `keyword`, ignoring case.
///
/// The annotation purpose is tried before the description.
#[must_use]
pub fn purpose_match(meta: &ComponentMetadata, keyword: &str) -> Option<MatchField> {
    let needle = keyword.to_lowercase();
    if meta
        .purpose()
        .is_some_and(|p| p.to_lowercase().contains(&needle))
    {
        Some(MatchField::Purpose)
    } else if meta.declaration.description.to_lowercase().contains(&needle) {
        Some(MatchField::Description)
    } else {
        None
    }
}
