//! Cross-references contract prose against declared design tokens.
//!
//! The categories scanned and the identifier grammar are coupled: a new
//! category usually brings new namespaces. Both live in one versioned
//! [`TokenScanConfig`] and the patterns are compiled from its fields, so
//! neither can change without the other.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use stemma_common::error::{Result, StemmaError};
use stemma_schema::records::ContractRecord;

/// Contract categories scanned by version 1.
const V1_CATEGORIES: &[&str] = &["accessibility", "animation"];

/// Leading namespace segments recognized by version 1.
const V1_NAMESPACES: &[&str] = &[
    "color",
    "space",
    "radius",
    "typography",
    "fontSize",
    "lineHeight",
    "motion",
    "duration",
    "easing",
    "blend",
    "opacity",
    "shadow",
    "border",
    "tapArea",
    "icon",
    "accessibility",
    "zIndex",
];

/// Prefix of camel-case token identifiers in version 1.
const V1_CAMEL_PREFIX: &str = "motion";

/// Legacy namespace roots and their current replacements.
const V1_STALE_ROOTS: &[(&str, &str)] = &[
    ("spacing", "space"),
    ("colors", "color"),
    ("animation", "motion"),
    ("borderRadius", "radius"),
];

static CURRENT: LazyLock<TokenScanConfig> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    TokenScanConfig::v1().expect("built-in token patterns compile")
});

/// Category allowlist and identifier grammar, versioned together.
#[derive(Debug, Clone)]
pub struct TokenScanConfig {
    version: u32,
    categories: BTreeSet<String>,
    stale_roots: BTreeMap<String, String>,
    identifier: Regex,
    stale: Option<Regex>,
}

/// Matches found in one piece of text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextScan {
    /// Legacy references with their replacement root, in text order.
    pub stale: Vec<(String, String)>,
    /// Validatable token identifiers, in text order.
    pub tokens: Vec<String>,
    /// Wildcard family references such as `color.feedback.*`.
    pub wildcards: Vec<String>,
}

impl TokenScanConfig {
    /// Builds the version 1 configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the generated patterns do not compile.
    pub fn v1() -> Result<Self> {
        Self::build(1, V1_CATEGORIES, V1_NAMESPACES, V1_CAMEL_PREFIX, V1_STALE_ROOTS)
    }

    /// Returns the configuration used by default.
    #[must_use]
    pub fn current() -> &'static Self {
        &CURRENT
    }

    /// Compiles a configuration from its parts.
    ///
    /// # Errors
    ///
    /// Returns an error if the generated patterns do not compile.
    pub fn build(
        version: u32,
        categories: &[&str],
        namespaces: &[&str],
        camel_prefix: &str,
        stale_roots: &[(&str, &str)],
    ) -> Result<Self> {
        let ns = alternation(namespaces);
        let camel = regex::escape(camel_prefix);
        let identifier = format!(
            r"\b(?:(?:{ns})(?:\.[A-Za-z0-9]+)+(?:\.\*)?|(?:{ns})\d{{2,4}}\b|{camel}[A-Z][A-Za-z0-9]*\b)"
        );
        let roots: Vec<&str> = stale_roots.iter().map(|(old, _)| *old).collect();
        let stale = if roots.is_empty() {
            None
        } else {
            // A root counts only at the start of a reference, never after a dot.
            Some(compile(&format!(
                r"(?:^|[^.\w])({})(\.[A-Za-z0-9]+(?:\.[A-Za-z0-9]+)*)",
                alternation(&roots)
            ))?)
        };

        Ok(Self {
            version,
            categories: categories.iter().map(|c| (*c).to_string()).collect(),
            stale_roots: stale_roots
                .iter()
                .map(|(old, new)| ((*old).to_string(), (*new).to_string()))
                .collect(),
            identifier: compile(&identifier)?,
            stale,
        })
    }

    /// Configuration version.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Returns whether contracts of `category` are scanned.
    #[must_use]
    pub fn in_scope(&self, category: &str) -> bool {
        self.categories.contains(category)
    }

    /// Finds stale references, token identifiers, and wildcards in `text`.
    #[must_use]
    pub fn scan_text(&self, text: &str) -> TextScan {
        let mut scan = TextScan::default();
        if let Some(stale) = &self.stale {
            for caps in stale.captures_iter(text) {
                let root = &caps[1];
                let replacement = self.stale_roots.get(root).cloned().unwrap_or_default();
                scan.stale.push((format!("{root}{}", &caps[2]), replacement));
            }
        }
        for m in self.identifier.find_iter(text) {
            let found = m.as_str().to_string();
            if found.ends_with(".*") {
                scan.wildcards.push(found);
            } else {
                scan.tokens.push(found);
            }
        }
        scan
    }
}

fn alternation(words: &[&str]) -> String {
    words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|")
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| StemmaError::Config {
        message: format!("invalid token pattern: {e}"),
    })
}

/// A token reference that matches a declared token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedToken {
    /// Contract whose prose references the token.
    pub contract: String,
    /// Token identifier.
    pub token: String,
    /// Contract category.
    pub category: String,
}

/// A token reference with no matching declared token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGap {
    /// Contract whose prose references the token.
    pub contract: String,
    /// Referenced identifier.
    pub reference: String,
    /// Contract category.
    pub category: String,
    /// Deprecation note for legacy naming.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Token references found in a component's contracts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractTokenRelationships {
    /// References that match a declared token.
    pub resolved: Vec<ResolvedToken>,
    /// References with no declared token, including legacy names.
    pub gaps: Vec<TokenGap>,
}

/// Classifies every token reference in the in-scope contracts.
///
/// Legacy names always become gaps. Other identifiers are resolved when
/// present in `declared_tokens` and gaps otherwise. Wildcards are ignored.
#[must_use]
pub fn derive(
    contracts: &BTreeMap<String, ContractRecord>,
    declared_tokens: &[String],
    config: &TokenScanConfig,
) -> ContractTokenRelationships {
    let declared: BTreeSet<&str> = declared_tokens.iter().map(String::as_str).collect();
    let mut relations = ContractTokenRelationships::default();

    for (name, contract) in contracts {
        if !config.in_scope(&contract.category) {
            continue;
        }
        let scan = config.scan_text(&contract.behavior);
        let mut seen = BTreeSet::new();

        for (reference, replacement) in scan.stale {
            if !seen.insert(reference.clone()) {
                continue;
            }
            let root = reference.split('.').next().unwrap_or_default().to_string();
            relations.gaps.push(TokenGap {
                contract: name.clone(),
                note: Some(format!(
                    "deprecated naming: '{root}.' has been renamed to '{replacement}.'"
                )),
                reference,
                category: contract.category.clone(),
            });
        }

        for token in scan.tokens {
            if !seen.insert(token.clone()) {
                continue;
            }
            if declared.contains(token.as_str()) {
                relations.resolved.push(ResolvedToken {
                    contract: name.clone(),
                    token,
                    category: contract.category.clone(),
                });
            } else {
                relations.gaps.push(TokenGap {
                    contract: name.clone(),
                    reference: token,
                    category: contract.category.clone(),
                    note: None,
                });
            }
        }
    }

    relations
}
