// src/taxonomy/style_rules.rs
//! Enumerated finding types for the style-checker origin.
//!
//! The style checker emits variable but template-shaped messages, so each
//! descriptor carries a literal regex for the full message. Order matters:
//! classification takes the first full match.

use crate::error::Result;
use crate::severity::Severity;
use crate::taxonomy::FindingTypeDescriptor;

pub(crate) fn build() -> Result<Vec<FindingTypeDescriptor>> {
    let defs: &[(&str, &str, Severity, &str)] = &[
        (
            "line-length",
            "Line too long",
            Severity::CodeStyle,
            r"Line is longer than \d+ characters(?: \(found \d+\))?\.",
        ),
        (
            "file-length",
            "File too long",
            Severity::Warning,
            r"File length is \d+ lines \(max allowed is \d+\)\.",
        ),
        (
            "method-length",
            "Method too long",
            Severity::Design,
            r"Method length is \d+ lines \(max allowed is \d+\)\.",
        ),
        (
            "parameter-count",
            "Too many parameters",
            Severity::Design,
            r"More than \d+ parameters \(found \d+\)\.",
        ),
        (
            "unused-import",
            "Unused import",
            Severity::CodeStyle,
            r"Unused import - .+\.",
        ),
        (
            "redundant-import",
            "Redundant import",
            Severity::CodeStyle,
            r"(?:Redundant|Duplicate) import (?:from the same package )?- .+\.",
        ),
        (
            "missing-doc",
            "Missing documentation comment",
            Severity::CodeStyle,
            r"Missing a (?:documentation|doc) comment\.",
        ),
        (
            "whitespace-after",
            "Token followed by whitespace",
            Severity::CodeStyle,
            r"'.+' is followed by whitespace\.",
        ),
        (
            "whitespace-around",
            "Missing whitespace around token",
            Severity::CodeStyle,
            r"'.+' is not (?:preceded|followed) (?:with|by) whitespace\.",
        ),
        (
            "magic-number",
            "Magic number",
            Severity::Design,
            r"'-?\d+(?:\.\d+)?[Ll]?' is a magic number\.",
        ),
        (
            "empty-block",
            "Empty block",
            Severity::Warning,
            r"(?:Empty .+ block\.|Must have at least one statement\.)",
        ),
        (
            "naming-convention",
            "Name violates convention",
            Severity::CodeStyle,
            r"Name '.+' must match pattern '.+'\.",
        ),
        (
            "redundant-modifier",
            "Redundant modifier",
            Severity::CodeStyle,
            r"Redundant '.+' modifier\.",
        ),
        (
            "final-parameter",
            "Parameter should be final",
            Severity::Design,
            r"Parameter .+ should be final\.",
        ),
        (
            "nested-depth",
            "Nesting too deep",
            Severity::Warning,
            r"Nested .+ depth is \d+ \(max allowed is \d+\)\.",
        ),
        (
            "todo-comment",
            "Open task comment",
            Severity::Info,
            r"Comment matches to-do format '.+'\.",
        ),
    ];

    defs.iter()
        .map(|(symbol, short, severity, pattern)| {
            FindingTypeDescriptor::enumerated(symbol, short, *severity, pattern)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns_compile_and_match_templates() {
        let descriptors = build().unwrap();
        let line_length = descriptors
            .iter()
            .find(|d| d.symbol.as_ref() == "line-length")
            .unwrap();
        assert!(line_length.matches("Line is longer than 120 characters (found 133)."));
        assert!(!line_length.matches("Line is longer than 120 characters (found 133). Trailing"));
    }

    #[test]
    fn magic_number_requires_full_match() {
        let descriptors = build().unwrap();
        let magic = descriptors
            .iter()
            .find(|d| d.symbol.as_ref() == "magic-number")
            .unwrap();
        assert!(magic.matches("'42' is a magic number."));
        assert!(magic.matches("'3.14' is a magic number."));
        assert!(!magic.matches("something '42' is a magic number."));
    }
}
