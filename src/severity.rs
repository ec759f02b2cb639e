// src/severity.rs
use serde::{Deserialize, Serialize};

/// Points of budget one line of code is worth in the quality calculation.
/// Penalty weights below are expressed in these scaled points, so a weight
/// of 2000 means one such finding burns the budget of 20 lines.
pub const PENALTY_SCALE: u64 = 100;

/// Impact classification of a finding, ordered from harmless to severe.
///
/// The declaration order is the total order: `Ok < Filtered < Info <
/// Coverage < CodeStyle < Design < Warning < Error < Cpd`. New/old state is
/// tracked as flags on the finding itself, not as severities.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// No impact. Also used for findings resolved since the previous run.
    Ok,
    /// Suppressed by a transform; kept for accounting, zero penalty.
    Filtered,
    Info,
    /// Line-coverage data (hit counts). Counted against quality via the
    /// uncovered-line count, never via the covered-line findings themselves.
    Coverage,
    CodeStyle,
    Design,
    Warning,
    Error,
    /// Duplicated code.
    Cpd,
}

impl Severity {
    pub const COUNT: usize = 9;

    pub const ALL: [Severity; Self::COUNT] = [
        Severity::Ok,
        Severity::Filtered,
        Severity::Info,
        Severity::Coverage,
        Severity::CodeStyle,
        Severity::Design,
        Severity::Warning,
        Severity::Error,
        Severity::Cpd,
    ];

    /// Severities that participate in the percentage-bar walk, highest
    /// impact first. Coverage comes last: its contribution is derived from
    /// the uncovered-line fraction, then folded into the same budget.
    pub const SCORED: [Severity; 6] = [
        Severity::Cpd,
        Severity::Error,
        Severity::Warning,
        Severity::Design,
        Severity::CodeStyle,
        Severity::Coverage,
    ];

    /// Index into per-severity count arrays.
    #[must_use]
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Default penalty weight in scaled points (see [`PENALTY_SCALE`]).
    #[must_use]
    pub fn penalty(self) -> u64 {
        match self {
            Severity::Ok | Severity::Filtered | Severity::Info => 0,
            Severity::Coverage => 200,
            Severity::CodeStyle => 100,
            Severity::Design => 500,
            Severity::Warning => 1000,
            Severity::Error => 2000,
            Severity::Cpd => 1500,
        }
    }

    /// Label shown in the report output.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Severity::Ok => "ok",
            Severity::Filtered => "filtered",
            Severity::Info => "info",
            Severity::Coverage => "coverage",
            Severity::CodeStyle => "style",
            Severity::Design => "design",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Cpd => "duplication",
        }
    }

    /// Exact label → severity, for configuration keys.
    #[must_use]
    pub fn from_label(raw: &str) -> Option<Severity> {
        Severity::ALL.iter().find(|s| s.label() == raw).copied()
    }

    /// Maps a tool-reported severity token onto our scale. Tools disagree on
    /// vocabulary; anything unrecognized is treated as a warning rather than
    /// dropped.
    #[must_use]
    pub fn from_tool_str(raw: &str) -> Severity {
        match raw.to_ascii_lowercase().as_str() {
            "error" | "high" => Severity::Error,
            "warning" | "warn" | "normal" | "medium" => Severity::Warning,
            "info" | "information" | "low" => Severity::Info,
            "ignore" | "filtered" => Severity::Filtered,
            _ => Severity::Warning,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-severity penalty weights, indexed by [`Severity::ordinal`].
/// Defaults come from [`Severity::penalty`]; individual weights can be
/// overridden from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyTable {
    weights: [u64; Severity::COUNT],
}

impl Default for PenaltyTable {
    fn default() -> Self {
        let mut weights = [0; Severity::COUNT];
        for sev in Severity::ALL {
            weights[sev.ordinal()] = sev.penalty();
        }
        Self { weights }
    }
}

impl PenaltyTable {
    #[must_use]
    pub fn weight(&self, sev: Severity) -> u64 {
        self.weights[sev.ordinal()]
    }

    pub fn set_weight(&mut self, sev: Severity, weight: u64) {
        self.weights[sev.ordinal()] = weight;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_follows_declaration() {
        assert!(Severity::Ok < Severity::Info);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Cpd);
    }

    #[test]
    fn zero_penalty_severities() {
        assert_eq!(Severity::Ok.penalty(), 0);
        assert_eq!(Severity::Filtered.penalty(), 0);
        assert_eq!(Severity::Info.penalty(), 0);
    }

    #[test]
    fn tool_severity_parsing() {
        assert_eq!(Severity::from_tool_str("ERROR"), Severity::Error);
        assert_eq!(Severity::from_tool_str("warn"), Severity::Warning);
        assert_eq!(Severity::from_tool_str("bogus"), Severity::Warning);
    }
}
