// src/origin.rs
use serde::{Deserialize, Serialize};

/// The analysis tool a finding came from.
///
/// Each reader owns exactly one origin; `System` is reserved for synthetic
/// findings the pipeline emits about itself (e.g. an unparseable input
/// document).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Style checker (per-file error list with rule identifiers).
    Style,
    /// Duplicate-code detector (one event spanning several locations).
    Duplication,
    /// Bug finder (defect instances with mixed class/method/line elements).
    BugFinder,
    /// Line-coverage tool (per-line hit counts).
    Coverage,
    /// Free-text tool log classified via declarative patterns.
    Generic,
    /// Internal findings about the pipeline itself.
    System,
}

impl Origin {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Origin::Style => "style",
            Origin::Duplication => "duplication",
            Origin::BugFinder => "bugs",
            Origin::Coverage => "coverage",
            Origin::Generic => "generic",
            Origin::System => "system",
        }
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
