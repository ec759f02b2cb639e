// src/classify.rs
//! Generic finding detection over free-text tool logs.
//!
//! The scan loop: find the next root-pattern match in the remaining text,
//! try each finding-type sub-pattern at the captured message position
//! (looking-at semantics, descending priority), and either emit a finding
//! and advance past the match, or skip to the next line. A non-match never
//! stalls the scan. The cursor is an explicit position value threaded
//! through the loop; nothing mutates shared scan state.

use std::sync::Arc;

use crate::finding::Finding;
use crate::origin::Origin;
use crate::taxonomy::{FindingTypeDescriptor, GenericFormat};

/// How many lines past a match the caret scan inspects before giving up.
const CARET_SCAN_LINES: usize = 4;

/// One classified occurrence: the finding plus the filename the root
/// pattern captured for it, if any.
#[derive(Debug)]
pub struct ScanHit {
    pub filename: Option<String>,
    pub finding: Finding,
}

/// Result of scanning one log.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub hits: Vec<ScanHit>,
    /// Root matches no sub-pattern classified, kept for diagnostics.
    pub skipped: Vec<String>,
}

pub struct Classifier<'a> {
    format: &'a GenericFormat,
}

impl<'a> Classifier<'a> {
    #[must_use]
    pub fn new(format: &'a GenericFormat) -> Self {
        Self { format }
    }

    /// Scans `content` to the end, classifying every root-pattern match.
    #[must_use]
    pub fn scan(&self, content: &str) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();
        let mut pos = 0;
        while pos <= content.len() {
            let Some(caps) = self.format.root.regex.captures_at(content, pos) else {
                break;
            };
            let whole = caps.get(0).expect("group 0 always present");

            let filename = self
                .format
                .root
                .filename_group
                .and_then(|g| caps.get(g))
                .map(|m| m.as_str().to_string());
            let root_line = self
                .format
                .root
                .line_group
                .and_then(|g| caps.get(g))
                .and_then(|m| m.as_str().parse::<i32>().ok());
            // Without an explicit text group the message starts right
            // after the root match.
            let text_start = self
                .format
                .root
                .text_group
                .and_then(|g| caps.get(g))
                .map_or(whole.end(), |m| m.start());

            let next_pos = match self.classify_at(content, text_start, filename, root_line) {
                Some((hit, matched_end)) => {
                    outcome.hits.push(hit);
                    matched_end.max(whole.end())
                }
                None => {
                    let line_end = next_line(content, text_start);
                    outcome
                        .skipped
                        .push(content[text_start..line_end].trim().to_string());
                    line_end
                }
            };
            if next_pos <= pos {
                break;
            }
            pos = next_pos;
        }
        outcome
    }

    /// Tries each sub-pattern at `at` in descending-priority order. Returns
    /// the classified hit and the cursor position past the match.
    fn classify_at(
        &self,
        content: &str,
        at: usize,
        filename: Option<String>,
        root_line: Option<i32>,
    ) -> Option<(ScanHit, usize)> {
        for descriptor in &self.format.types {
            let Some(pattern) = descriptor.pattern.as_ref() else {
                continue;
            };
            let Some(caps) = pattern.captures_at(content, at) else {
                continue;
            };
            let whole = caps.get(0).expect("group 0 always present");
            // Looking-at semantics: the sub-pattern must match exactly at
            // the cursor, not merely somewhere after it.
            if whole.start() != at {
                continue;
            }
            let finding = build_finding(descriptor, &caps, content, whole.end(), root_line);
            return Some((ScanHit { filename, finding }, whole.end()));
        }
        None
    }
}

fn build_finding(
    descriptor: &Arc<FindingTypeDescriptor>,
    caps: &regex::Captures<'_>,
    content: &str,
    match_end: usize,
    root_line: Option<i32>,
) -> Finding {
    let offsets = descriptor.offsets;
    let message = group_str(caps, offsets.text)
        .unwrap_or_else(|| descriptor.short_text.clone());
    let line = group_i32(caps, offsets.line_start)
        .or(root_line)
        .unwrap_or(0);

    let mut finding = Finding::simple(
        Origin::Generic,
        Arc::clone(&descriptor.symbol),
        descriptor.severity,
        message,
        line,
    );
    if let Some(end_line) = group_i32(caps, offsets.line_end) {
        finding.end_line = end_line;
    }
    if let Some(column) = group_i32(caps, offsets.column_start) {
        finding.column = column;
    }
    if let Some(end_column) = group_i32(caps, offsets.column_end) {
        finding.end_column = end_column;
    }
    if let Some(source) = group_str(caps, offsets.source_text) {
        finding.source_text = Some(source);
    }
    if descriptor.caret_column {
        if let Some(column) = caret_column(content, match_end) {
            finding.column = column;
        }
    }
    finding
}

fn group_str(caps: &regex::Captures<'_>, group: Option<usize>) -> Option<String> {
    group
        .and_then(|g| caps.get(g))
        .map(|m| m.as_str().to_string())
}

fn group_i32(caps: &regex::Captures<'_>, group: Option<usize>) -> Option<i32> {
    group
        .and_then(|g| caps.get(g))
        .and_then(|m| m.as_str().trim().parse().ok())
}

/// Byte offset just past the newline terminating the line containing `at`,
/// or the end of `content`.
fn next_line(content: &str, at: usize) -> usize {
    content[at.min(content.len())..]
        .find('\n')
        .map_or(content.len(), |n| at + n + 1)
}

/// Derives a column from a `^` caret marker: the tool echoes the offending
/// source line after the message, then a line whose only content is a caret
/// under the offending column.
fn caret_column(content: &str, from: usize) -> Option<i32> {
    let rest = &content[next_line(content, from).min(content.len())..];
    for line in rest.lines().take(CARET_SCAN_LINES) {
        let trimmed = line.trim_end();
        if trimmed.trim_start() == "^" {
            let offset = trimmed.find('^').expect("caret present after trim check");
            return i32::try_from(offset + 1).ok();
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::format;
    use std::path::Path;

    const FORMAT: &str = r#"
<finding-format>
  <root pattern="(?m)^([^\s:]+):(\d+): " filename-group="1" line-group="2"/>
  <type symbol="log-error" pattern="error: (.+)" priority="10" severity="error" text-group="1"/>
  <type symbol="log-warning" pattern="warning: (.+)" priority="5" severity="warning" text-group="1"/>
</finding-format>
"#;

    #[test]
    fn scan_classifies_by_priority_and_skips_noise() {
        let fmt = format::parse(FORMAT, Path::new("test-format.xml")).unwrap();
        let log = "a.c:3: error: bad deref\nnoise line\na.c:9: warning: shadowed var\na.c:12: unknown chatter\n";
        let outcome = Classifier::new(&fmt).scan(log);

        assert_eq!(outcome.hits.len(), 2);
        assert_eq!(outcome.hits[0].finding.symbol.as_ref(), "log-error");
        assert_eq!(outcome.hits[0].finding.line, 3);
        assert_eq!(outcome.hits[0].finding.message, "bad deref");
        assert_eq!(outcome.hits[1].finding.symbol.as_ref(), "log-warning");
        assert_eq!(outcome.hits[1].finding.line, 9);
        assert_eq!(outcome.skipped.len(), 1);
    }

    #[test]
    fn caret_marker_supplies_column() {
        let caret_format = r#"
<finding-format>
  <root pattern="(?m)^([^\s:]+):(\d+): " filename-group="1" line-group="2"/>
  <type symbol="log-error" pattern="error: (.+)" priority="10" severity="error" text-group="1" caret-column="true"/>
</finding-format>
"#;
        let fmt = format::parse(caret_format, Path::new("test-format.xml")).unwrap();
        let log = "a.c:3: error: bad deref\n  int x = *p;\n      ^\n";
        let outcome = Classifier::new(&fmt).scan(log);

        assert_eq!(outcome.hits.len(), 1);
        assert_eq!(outcome.hits[0].finding.column, 7);
    }
}
