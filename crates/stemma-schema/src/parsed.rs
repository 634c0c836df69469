//! Outcome of reading one record file.

use stemma_common::diagnostic::{Diagnostic, DiagnosticKind};

/// A parsed record, an absent optional record, or a diagnostic.
///
/// Providers never return `Err` for missing or malformed input; the
/// problem travels here instead so one bad unit never blocks a scan.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    /// The file was present and parsed.
    Value(T),
    /// An optional file is not present.
    Absent,
    /// The file is required but missing, or failed to parse.
    Failed(Diagnostic),
}

impl<T> Parsed<T> {
    /// Builds a `MissingInput` failure for a unit.
    #[must_use]
    pub fn missing(unit: &str, message: impl Into<String>) -> Self {
        Self::Failed(Diagnostic::new(DiagnosticKind::MissingInput, message).for_component(unit))
    }

    /// Builds a `MalformedInput` failure for a unit.
    #[must_use]
    pub fn malformed(unit: &str, message: impl Into<String>) -> Self {
        Self::Failed(Diagnostic::new(DiagnosticKind::MalformedInput, message).for_component(unit))
    }

    /// Returns the parsed value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Absent | Self::Failed(_) => None,
        }
    }

    /// Splits into the optional value and the optional diagnostic.
    #[must_use]
    pub fn into_parts(self) -> (Option<T>, Option<Diagnostic>) {
        match self {
            Self::Value(v) => (Some(v), None),
            Self::Absent => (None, None),
            Self::Failed(d) => (None, Some(d)),
        }
    }
}
