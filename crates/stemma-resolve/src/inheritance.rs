//! Single-level contract inheritance.
//!
//! A child may declare one parent. The merged view contains the child's own
//! contracts, plus every parent contract the child neither excludes nor
//! redeclares. Deeper chains are tolerated but reported.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use stemma_common::constants::MAX_INHERITANCE_DEPTH;
use stemma_common::diagnostic::{Diagnostic, DiagnosticKind};
use stemma_common::types::ContractSource;
use stemma_schema::records::{ContractRecord, ContractsRecord, ExclusionRecord};

/// Final active/excluded contract view after merging.
///
/// `active` and `excluded` never share a key, and `own` and `inherited`
/// partition the keys of `active`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedContracts {
    /// Declared parent, kept even when it could not be resolved.
    pub inherits_from: Option<String>,
    /// Contracts in force, tagged with their provenance.
    pub active: BTreeMap<String, ContractRecord>,
    /// Contracts intentionally dropped.
    pub excluded: BTreeMap<String, ExclusionRecord>,
    /// Names declared by the component itself (`own` and `extended`).
    pub own: Vec<String>,
    /// Names taken unchanged from the parent.
    pub inherited: Vec<String>,
}

/// Result of [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Merged contracts.
    pub contracts: ResolvedContracts,
    /// Non-fatal problems found while merging.
    pub warnings: Vec<Diagnostic>,
}

/// Merges a child's contracts with its parent's.
///
/// `parent` is `None` both when no parent is declared and when the declared
/// parent could not be found; the child's `inherits` field tells them apart.
#[must_use]
pub fn resolve(
    child_name: &str,
    child: &ContractsRecord,
    parent: Option<&ContractsRecord>,
    parent_has_grandparent: bool,
) -> Resolution {
    let mut warnings = Vec::new();
    let mut resolved = ResolvedContracts {
        inherits_from: child.inherits.clone(),
        ..ResolvedContracts::default()
    };

    let parent = match (&child.inherits, parent) {
        (None, _) => None,
        (Some(parent_name), None) => {
            warnings.push(
                Diagnostic::new(
                    DiagnosticKind::UnresolvedReference,
                    format!("Unresolved inheritance: parent {parent_name} not found"),
                )
                .for_component(child_name),
            );
            None
        }
        (Some(parent_name), Some(parent)) => {
            if parent_has_grandparent {
                warnings.push(
                    Diagnostic::new(
                        DiagnosticKind::DepthViolation,
                        format!(
                            "Grandchild inheritance detected: {child_name} inherits from \
                             {parent_name}, which has its own parent; max depth is \
                             {MAX_INHERITANCE_DEPTH}"
                        ),
                    )
                    .for_component(child_name),
                );
            }
            Some(parent)
        }
    };

    if let Some(parent) = parent {
        for (name, contract) in &parent.contracts {
            if child.excludes.contains_key(name) || child.contracts.contains_key(name) {
                continue;
            }
            let _ = resolved
                .active
                .insert(name.clone(), contract.tagged(ContractSource::Inherited));
            resolved.inherited.push(name.clone());
        }
        resolved.excluded.extend(parent.excludes.clone());
    }

    for (name, contract) in &child.contracts {
        let source = if parent.is_some_and(|p| p.contracts.contains_key(name)) {
            ContractSource::Extended
        } else {
            ContractSource::Own
        };
        let _ = resolved.active.insert(name.clone(), contract.tagged(source));
        resolved.own.push(name.clone());
    }
    resolved.excluded.extend(child.excludes.clone());

    // A redeclared contract is active even if some exclusion names it.
    resolved
        .excluded
        .retain(|name, _| !resolved.active.contains_key(name));

    tracing::trace!(
        component = child_name,
        active = resolved.active.len(),
        excluded = resolved.excluded.len(),
        "contracts resolved"
    );

    Resolution {
        contracts: resolved,
        warnings,
    }
}

/// Result of [`validate_omits`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OmitValidation {
    /// Whether every omitted property was accepted.
    pub valid: bool,
    /// Omitted properties that were rejected.
    pub invalid: Vec<String>,
    /// One warning per problem.
    pub warnings: Vec<Diagnostic>,
}

/// Checks that every omitted property exists on the parent.
///
/// When the parent is declared but its properties are unknown, omits are
/// accepted optimistically with a warning.
#[must_use]
pub fn validate_omits(
    child_name: &str,
    omits: &[String],
    parent_name: Option<&str>,
    parent_properties: Option<&BTreeSet<String>>,
) -> OmitValidation {
    if omits.is_empty() {
        return OmitValidation {
            valid: true,
            ..OmitValidation::default()
        };
    }

    let Some(parent_name) = parent_name else {
        return OmitValidation {
            valid: false,
            invalid: omits.to_vec(),
            warnings: vec![
                Diagnostic::new(
                    DiagnosticKind::InvalidOmit,
                    format!("{child_name} declares omits but has no parent"),
                )
                .for_component(child_name),
            ],
        };
    };

    let Some(properties) = parent_properties else {
        return OmitValidation {
            valid: true,
            invalid: Vec::new(),
            warnings: vec![
                Diagnostic::new(
                    DiagnosticKind::InvalidOmit,
                    format!(
                        "{child_name} omits {} propert(ies) but cannot validate them: \
                         parent {parent_name} not indexed",
                        omits.len()
                    ),
                )
                .for_component(child_name),
            ],
        };
    };

    let invalid: Vec<String> = omits
        .iter()
        .filter(|name| !properties.contains(*name))
        .cloned()
        .collect();
    let warnings = invalid
        .iter()
        .map(|name| {
            Diagnostic::new(
                DiagnosticKind::InvalidOmit,
                format!("{child_name} omits \"{name}\", which {parent_name} does not declare"),
            )
            .for_component(child_name)
        })
        .collect();

    OmitValidation {
        valid: invalid.is_empty(),
        invalid,
        warnings,
    }
}
