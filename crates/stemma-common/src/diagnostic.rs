//! Non-fatal diagnostics recorded while scanning and resolving components.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a recoverable problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A required file is absent; the unit is skipped.
    MissingInput,
    /// A file failed to parse; the unit is skipped.
    MalformedInput,
    /// A declared parent was not found; the unit is indexed without it.
    UnresolvedReference,
    /// A parent itself declares a parent; the merge still proceeds.
    DepthViolation,
    /// An omitted property does not exist on the parent.
    InvalidOmit,
    /// A queried entity is absent.
    NotFound,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput => write!(f, "missing-input"),
            Self::MalformedInput => write!(f, "malformed-input"),
            Self::UnresolvedReference => write!(f, "unresolved-reference"),
            Self::DepthViolation => write!(f, "depth-violation"),
            Self::InvalidOmit => write!(f, "invalid-omit"),
            Self::NotFound => write!(f, "not-found"),
        }
    }
}

/// A recoverable problem attached to a component unit or query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Problem classification.
    pub kind: DiagnosticKind,
    /// Component name or unit directory the problem belongs to, if known.
    pub component: Option<String>,
    /// Human-readable message.
    pub message: String,
}

impl Diagnostic {
    /// Creates a diagnostic of the given kind.
    #[must_use]
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            component: None,
            message: message.into(),
        }
    }

    /// Attaches the component or unit the diagnostic refers to.
    #[must_use]
    pub fn for_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Emits the diagnostic as a `tracing` warning and returns it.
    #[must_use]
    pub fn logged(self) -> Self {
        tracing::warn!(
            kind = %self.kind,
            component = self.component.as_deref().unwrap_or("-"),
            "{}",
            self.message
        );
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.component {
            Some(c) => write!(f, "[{}] {c}: {}", self.kind, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}
