// src/config.rs
//! `tidemark.toml`: source roots, report inputs, diff knobs, excludes and
//! penalty overrides.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TidemarkError};
use crate::merge::Transform;
use crate::origin::Origin;
use crate::severity::{PenaltyTable, Severity};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Roots scanned to register source-file identities.
    #[serde(default)]
    pub source_roots: Vec<PathBuf>,

    /// Tool reports to ingest.
    #[serde(default)]
    pub inputs: Vec<InputSpec>,

    /// Declarative finding-format definitions for log-based inputs.
    #[serde(default)]
    pub formats: Vec<PathBuf>,

    /// Where the merged report artifact is written.
    #[serde(default = "default_artifact")]
    pub artifact: PathBuf,

    #[serde(default)]
    pub diff: DiffSettings,

    /// Transforms applied to the merged document, in order.
    #[serde(default)]
    pub excludes: Vec<ExcludeSpec>,

    /// Penalty-weight overrides keyed by severity label.
    #[serde(default)]
    pub penalties: HashMap<String, u64>,

    #[serde(default)]
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_roots: Vec::new(),
            inputs: Vec::new(),
            formats: Vec::new(),
            artifact: default_artifact(),
            diff: DiffSettings::default(),
            excludes: Vec::new(),
            penalties: HashMap::new(),
            verbose: false,
        }
    }
}

fn default_artifact() -> PathBuf {
    PathBuf::from("tidemark-report.json")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSpec {
    pub origin: Origin,
    /// A report file, or a directory scanned for report files.
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffSettings {
    /// Message-prefix window used when pairing duplication findings.
    #[serde(default = "default_prefix_window")]
    pub prefix_window: usize,

    /// Previous artifact to diff against on `run`.
    #[serde(default)]
    pub against: Option<PathBuf>,
}

impl Default for DiffSettings {
    fn default() -> Self {
        Self {
            prefix_window: default_prefix_window(),
            against: None,
        }
    }
}

fn default_prefix_window() -> usize {
    60
}

/// One exclude rule; each set field becomes one transform, so a rule with
/// several fields contributes several transforms in field order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeSpec {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub origin: Option<Origin>,
}

impl ExcludeSpec {
    #[must_use]
    pub fn to_transforms(&self) -> Vec<Transform> {
        let mut transforms = Vec::new();
        if let Some(pattern) = &self.path {
            transforms.push(Transform::ExcludePath {
                pattern: pattern.clone(),
            });
        }
        if let Some(symbol) = &self.symbol {
            transforms.push(Transform::ExcludeSymbol {
                symbol: symbol.clone(),
            });
        }
        if let Some(origin) = self.origin {
            transforms.push(Transform::ExcludeOrigin { origin });
        }
        transforms
    }
}

impl Config {
    /// Loads the configuration file.
    ///
    /// # Errors
    /// Returns a `Config` error when the file is missing or not valid TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            TidemarkError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        toml::from_str(&content)
            .map_err(|e| TidemarkError::Config(format!("invalid {}: {e}", path.display())))
    }

    /// Default penalty weights with configured overrides applied.
    ///
    /// # Errors
    /// Returns a `Config` error for an unknown severity label.
    pub fn penalty_table(&self) -> Result<PenaltyTable> {
        let mut table = PenaltyTable::default();
        for (label, weight) in &self.penalties {
            let severity = Severity::from_label(label).ok_or_else(|| {
                TidemarkError::Config(format!("unknown severity '{label}' in [penalties]"))
            })?;
            table.set_weight(severity, *weight);
        }
        Ok(table)
    }

    /// All exclude transforms, in registration order.
    #[must_use]
    pub fn transforms(&self) -> Vec<Transform> {
        self.excludes
            .iter()
            .flat_map(ExcludeSpec::to_transforms)
            .collect()
    }
}
