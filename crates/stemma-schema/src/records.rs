//! Typed records produced once per scan of a component unit.
//!
//! Required fields are plain values; everything a file may leave out
//! carries a serde default so that an absent key never fails a parse.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use stemma_common::types::ContractSource;

/// Structural declaration of a component (`<Unit>.schema.yaml`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDeclaration {
    /// Unique component name; the identity key of the index.
    pub name: String,
    /// Component category (`type:` in the file).
    #[serde(rename = "type", default)]
    pub category: String,
    /// Component family.
    #[serde(default)]
    pub family: String,
    /// Declared version.
    #[serde(default)]
    pub version: String,
    /// Readiness level, e.g. `production-ready`.
    #[serde(default)]
    pub readiness: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Supported platforms.
    #[serde(default)]
    pub platforms: Vec<String>,
    /// Property definitions keyed by property name.
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyDefinition>,
    /// Declared design token identifiers.
    #[serde(default)]
    pub tokens: Vec<String>,
    /// Parent properties this component intentionally drops.
    #[serde(default)]
    pub omits: Vec<String>,
    /// Composition constraints, if any.
    #[serde(default)]
    pub composition: Option<CompositionDefinition>,
}

/// A single property definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyDefinition {
    /// Declared type name.
    #[serde(rename = "type")]
    pub prop_type: String,
    /// Free-text description.
    pub description: String,
    /// Default value, if any.
    pub default: Option<Value>,
    /// Whether callers must supply the property.
    pub required: bool,
    /// Allowed values; empty means unconstrained.
    pub values: Vec<Value>,
}

/// Which children a component may structurally contain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositionDefinition {
    /// Static child constraints.
    pub children: ChildConstraints,
    /// Self-nesting policy.
    pub nesting: Option<NestingPolicy>,
    /// Child types that must be present at least once.
    pub requires: Vec<String>,
    /// Conditional rules, evaluated in declared order.
    pub rules: Vec<CompositionRule>,
}

/// Static allow/deny lists for children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChildConstraints {
    /// Explicit allow-list; exhaustive once non-empty.
    pub allowed: Vec<String>,
    /// Explicit deny-list.
    pub prohibited: Vec<String>,
    /// Allowed child categories.
    pub allowed_categories: Vec<String>,
    /// Prohibited child categories.
    pub prohibited_categories: Vec<String>,
}

/// Whether a component may contain another instance of itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestingPolicy {
    /// `self:` in the file.
    #[serde(rename = "self", default = "allow_self_default")]
    pub allow_self: bool,
}

const fn allow_self_default() -> bool {
    true
}

/// An ordered predicate/consequence pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionRule {
    /// Condition on the parent's prop values.
    pub when: RulePredicate,
    /// Children delta applied when the predicate matches.
    pub then: RuleConsequence,
}

/// Matches when `prop` strictly equals `equals`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulePredicate {
    /// Parent prop name.
    pub prop: String,
    /// Expected value.
    pub equals: Value,
}

/// Allow/deny delta of a matched rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConsequence {
    /// Children allowed while the rule matches.
    pub allow: Vec<String>,
    /// Children prohibited while the rule matches.
    pub prohibit: Vec<String>,
}

/// Raw contents of `contracts.yaml`, before inheritance merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractsRecord {
    /// Declared parent component name.
    pub inherits: Option<String>,
    /// Contracts keyed by name.
    pub contracts: BTreeMap<String, ContractRecord>,
    /// Parent contracts this component intentionally drops.
    pub excludes: BTreeMap<String, ExclusionRecord>,
}

/// A named behavioral contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractRecord {
    /// Contract category, e.g. `accessibility`.
    pub category: String,
    /// Short description.
    pub description: String,
    /// Behavior prose; scanned for token references.
    pub behavior: String,
    /// Compliance reference (WCAG criterion).
    #[serde(alias = "compliance", skip_serializing_if = "Option::is_none")]
    pub wcag: Option<String>,
    /// Platforms the contract applies to.
    pub platforms: Vec<String>,
    /// Validation notes.
    pub validation: Vec<String>,
    /// Whether the contract is mandatory.
    pub required: bool,
    /// Provenance, assigned only during merging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ContractSource>,
}

impl ContractRecord {
    /// Returns a copy tagged with the given provenance.
    #[must_use]
    pub fn tagged(&self, source: ContractSource) -> Self {
        Self {
            source: Some(source),
            ..self.clone()
        }
    }
}

/// A parent contract the child intentionally drops.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExclusionRecord {
    /// Why the contract does not apply.
    pub reason: String,
    /// Category of the excluded contract.
    pub category: String,
    /// Reference backing the exclusion.
    pub reference: String,
}

/// Optional semantic annotations (`component-meta.yaml`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticAnnotations {
    /// One-line purpose statement.
    pub purpose: Option<String>,
    /// Usage guidance.
    pub usage: UsageGuidance,
    /// Contexts the component typically appears in.
    pub contexts: Vec<String>,
    /// Components to consider instead.
    pub alternatives: Vec<Alternative>,
    /// Free-form tags.
    pub tags: Vec<String>,
}

/// When to use and avoid a component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageGuidance {
    /// Situations the component fits.
    pub when_to_use: Vec<String>,
    /// Situations the component does not fit.
    pub when_not_to_use: Vec<String>,
}

/// An alternative component suggestion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Alternative {
    /// Alternative component name.
    pub component: String,
    /// Why it may be preferable.
    pub reason: String,
}
