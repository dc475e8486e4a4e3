//! Type definitions for parsed rows and diagnostics

use std::fmt;

/// The kind of an ambiguous construct detected while parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiagnosticKind {
    /// Escape marker not followed by any recognized special sequence
    InvalidEscape,
    /// Escape marker inside a quoted field not followed by a quote sequence
    InvalidQuotedEscape,
    /// Characters after a candidate closing quote that resolve to neither a
    /// delimiter nor a row terminator
    InvalidClosingQuote,
    /// Quote sequence opening a field only after leading whitespace
    InvalidOpeningQuote,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DiagnosticKind::InvalidEscape => "invalid escape sequence",
            DiagnosticKind::InvalidQuotedEscape => "invalid escape sequence in quoted field",
            DiagnosticKind::InvalidClosingQuote => "invalid closing quote",
            DiagnosticKind::InvalidOpeningQuote => "invalid opening quote",
        };
        write!(f, "{}", label)
    }
}

/// A single parse diagnostic: what was detected and where
///
/// In permissive mode diagnostics accumulate as warnings and parsing
/// continues; in strict mode the first diagnostic is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostic {
    /// The detected construct
    pub kind: DiagnosticKind,
    /// Characters consumed from the stream when the construct was detected
    pub position: u64,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at character {}", self.kind, self.position)
    }
}

/// A completed row of raw field text
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Row {
    /// Emission index (0-based, counting rows in output order)
    pub index: u64,
    /// Field text, escape and quote markers already removed
    pub fields: Vec<String>,
}

impl Row {
    /// Create a new row
    pub fn new(index: u64, fields: Vec<String>) -> Self {
        Row { index, fields }
    }

    /// Get field at column index
    pub fn get(&self, col: usize) -> Option<&str> {
        self.fields.get(col).map(|f| f.as_str())
    }

    /// Get number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the row carries no field text at all
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() || self.fields.iter().all(|f| f.is_empty())
    }

    /// Iterate over the fields as string slices
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.as_str())
    }

    /// Consume the row, returning its fields
    pub fn into_fields(self) -> Vec<String> {
        self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_accessors() {
        let row = Row::new(3, vec!["a".to_string(), "".to_string()]);
        assert_eq!(row.index, 3);
        assert_eq!(row.get(0), Some("a"));
        assert_eq!(row.get(2), None);
        assert_eq!(row.len(), 2);
        assert!(!row.is_empty());
    }

    #[test]
    fn test_row_emptiness() {
        let row = Row::new(0, vec!["".to_string(), "".to_string()]);
        assert!(row.is_empty());
    }

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = Diagnostic {
            kind: DiagnosticKind::InvalidClosingQuote,
            position: 12,
        };
        assert_eq!(
            diagnostic.to_string(),
            "invalid closing quote at character 12"
        );
    }
}
