// src/finding.rs
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::origin::Origin;
use crate::severity::Severity;

/// One detected issue at a location, normalized across tools.
///
/// Severity and symbol are always set before a finding leaves the
/// normalization layer; the `new`/`old` flags are mutually exclusive and
/// only assigned by the report diff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub origin: Origin,
    /// Symbolic finding type, interned through the taxonomy.
    pub symbol: Arc<str>,
    pub severity: Severity,
    pub message: String,
    pub line: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub end_line: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub column: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub end_column: i32,
    /// Hit count for coverage findings; absent elsewhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counter: Option<u32>,
    /// Epoch milliseconds of the run that first saw this finding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<i64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub new: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub old: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_text: Option<String>,
    /// Not tied to any single file (e.g. a whole-log diagnostic).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub global: bool,
}

fn is_zero(v: &i32) -> bool {
    *v == 0
}

impl Finding {
    /// Creates a finding with just a position and message.
    #[must_use]
    pub fn simple(
        origin: Origin,
        symbol: Arc<str>,
        severity: Severity,
        message: String,
        line: i32,
    ) -> Self {
        Self {
            origin,
            symbol,
            severity,
            message,
            line,
            end_line: 0,
            column: 0,
            end_column: 0,
            counter: None,
            since: None,
            new: false,
            old: false,
            source_text: None,
            global: false,
        }
    }

    #[must_use]
    pub fn with_column(mut self, column: i32) -> Self {
        self.column = column;
        self
    }

    #[must_use]
    pub fn with_span(mut self, end_line: i32, end_column: i32) -> Self {
        self.end_line = end_line;
        self.end_column = end_column;
        self
    }

    #[must_use]
    pub fn with_counter(mut self, counter: u32) -> Self {
        self.counter = Some(counter);
        self
    }

    #[must_use]
    pub fn with_source_text(mut self, text: String) -> Self {
        self.source_text = Some(text);
        self
    }

    #[must_use]
    pub fn global(mut self) -> Self {
        self.global = true;
        self
    }

    /// Flags the finding as newly introduced in the run at `now`.
    pub fn mark_new(&mut self, now: i64) {
        self.new = true;
        self.old = false;
        self.since = Some(now);
    }

    /// Flags the finding as resolved: it existed in the previous report but
    /// not in the current one.
    pub fn mark_old(&mut self) {
        self.old = true;
        self.new = false;
        self.severity = Severity::Ok;
    }

    /// Whether this finding participates in new/fixed age tracking.
    /// Zero-penalty and coverage findings do not.
    #[must_use]
    pub fn tracks_age(&self) -> bool {
        self.severity.penalty() > 0
            && self.severity != Severity::Coverage
            && self.origin != Origin::Coverage
    }
}
