//! Domain primitive types used across the Stemma workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where an active contract came from after inheritance merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractSource {
    /// Declared only by the component itself.
    Own,
    /// Taken unchanged from the parent.
    Inherited,
    /// Declared by both; the child's definition wins.
    Extended,
}

impl fmt::Display for ContractSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Own => write!(f, "own"),
            Self::Inherited => write!(f, "inherited"),
            Self::Extended => write!(f, "extended"),
        }
    }
}

/// Which part of a composition definition produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Static allow/deny lists or category lists.
    Static,
    /// A conditional rule matched on parent prop values.
    Conditional,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::Conditional => write!(f, "conditional"),
        }
    }
}

/// Aggregate index health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Entries present and the last scan recorded no diagnostics.
    Healthy,
    /// Entries present but the last scan recorded diagnostics.
    Degraded,
    /// No entries.
    Empty,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Degraded => write!(f, "degraded"),
            Self::Empty => write!(f, "empty"),
        }
    }
}
