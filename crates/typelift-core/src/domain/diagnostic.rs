//! Structured diagnostics extracted from type-checker reports.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A single diagnostic extracted from a type-checker report.
///
/// Diagnostics are immutable value objects: the parser builds them in report
/// order and callers re-sort copies when they need a different order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    /// Source file path exactly as it appeared in the report. May contain
    /// spaces, dashes or backslashes.
    pub file: Option<String>,

    /// Line number (1-indexed).
    pub line: Option<u32>,

    /// Numeric code taken from the trailing help reference.
    pub code: Option<u32>,

    /// Human-readable message with the help reference removed.
    pub message: String,

    /// Follow-up lines attached to this diagnostic, trailing-trimmed with
    /// indentation preserved: source excerpts, secondary "defined here"
    /// references, autocorrect hints.
    pub context: Vec<String>,
}

impl Diagnostic {
    /// Create a located diagnostic. Codes only ever come attached to a
    /// location, so `file`, `line` and `code` are set together.
    pub fn new(file: impl Into<String>, line: u32, message: impl Into<String>, code: u32) -> Self {
        Self {
            file: Some(file.into()),
            line: Some(line),
            code: Some(code),
            message: message.into(),
            context: Vec::new(),
        }
    }

    /// Attach context lines.
    pub fn with_context(mut self, context: Vec<String>) -> Self {
        self.context = context;
        self
    }

    /// Code-major comparison: ascending code, ties broken by the natural
    /// order. Used for explicit sort-by-code rendering.
    pub fn by_code(a: &Diagnostic, b: &Diagnostic) -> Ordering {
        a.code.cmp(&b.code).then_with(|| a.cmp(b))
    }
}

// Natural order: file path ascending, then line number ascending. Code and
// message break remaining ties so sorting is deterministic; context is
// compared last to keep the ordering consistent with equality.
impl Ord for Diagnostic {
    fn cmp(&self, other: &Self) -> Ordering {
        self.file
            .cmp(&other.file)
            .then_with(|| self.line.cmp(&other.line))
            .then_with(|| self.code.cmp(&other.code))
            .then_with(|| self.message.cmp(&other.message))
            .then_with(|| self.context.cmp(&other.context))
    }
}

impl PartialOrd for Diagnostic {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_new_sets_location_and_code() {
        let diag = Diagnostic::new("a.rb", 80, "unexpected token \"end\"", 2001);
        assert_eq!(diag.file.as_deref(), Some("a.rb"));
        assert_eq!(diag.line, Some(80));
        assert_eq!(diag.code, Some(2001));
        assert!(diag.context.is_empty());
    }

    #[test]
    fn test_natural_order_sorts_by_file_then_line() {
        let mut diags = vec![
            Diagnostic::new("z.rb", 80, "unexpected token \"end\"", 2001),
            Diagnostic::new("b.rb", 100, "redefined without matching argument count", 4010),
            Diagnostic::new("b.rb", 28, "not enough arguments", 7004),
            Diagnostic::new("a.rb", 105, "method does not exist", 7003),
        ];
        diags.sort();

        let codes: Vec<_> = diags.iter().filter_map(|d| d.code).collect();
        assert_eq!(codes, vec![7003, 7004, 4010, 2001]);
    }

    #[test]
    fn test_by_code_breaks_ties_with_natural_order() {
        let mut diags = vec![
            Diagnostic::new("z.rb", 12, "one", 7003),
            Diagnostic::new("a.rb", 30, "two", 7003),
            Diagnostic::new("m.rb", 1, "three", 2001),
        ];
        diags.sort_by(Diagnostic::by_code);

        let files: Vec<_> = diags.iter().filter_map(|d| d.file.as_deref()).collect();
        assert_eq!(files, vec!["m.rb", "a.rb", "z.rb"]);
    }

    #[test]
    fn test_diagnostic_serde_roundtrip() {
        let diag = Diagnostic::new("lib/test/file.rb", 80, "unexpected token \"end\"", 2001)
            .with_context(vec!["    80 |end".to_string(), "        ^^^".to_string()]);

        let json = serde_json::to_string(&diag).expect("serialize");
        let deserialized: Diagnostic = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(diag, deserialized);
    }
}
