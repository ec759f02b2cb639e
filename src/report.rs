// src/report.rs
//! The merged report document: one snapshot of per-file finding lists,
//! identified by its generation timestamp. Serialized as JSON so the next
//! run can diff against it.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TidemarkError};
use crate::finding::Finding;
use crate::resource::{canonical_name, ResourceInfo};

/// One file's slice of a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub source_dir: String,
    /// Derived class name, kept for the secondary diff lookup.
    #[serde(default)]
    pub class_name: String,
    /// Lines of code at generation time.
    #[serde(default)]
    pub loc: u64,
    pub findings: Vec<Finding>,
}

impl FileEntry {
    #[must_use]
    pub fn from_resource(resource: &ResourceInfo, findings: Vec<Finding>) -> Self {
        Self {
            name: resource.name.clone(),
            package: resource.package.clone(),
            source_dir: resource.source_dir.clone(),
            class_name: resource.class_name.clone(),
            loc: resource.line_count() as u64,
            findings,
        }
    }
}

/// A full report snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Epoch milliseconds of the run that produced this snapshot.
    pub generated: i64,
    pub files: Vec<FileEntry>,
}

impl Report {
    #[must_use]
    pub fn new(generated: i64) -> Self {
        Self {
            generated,
            files: Vec::new(),
        }
    }

    /// Builds a report from a per-resource finding map. Files are sorted by
    /// name and findings by position so output is reproducible.
    #[must_use]
    pub fn from_map(map: HashMap<Arc<ResourceInfo>, Vec<Finding>>, generated: i64) -> Self {
        let mut files: Vec<FileEntry> = map
            .into_iter()
            .map(|(resource, mut findings)| {
                sort_findings(&mut findings);
                FileEntry::from_resource(&resource, findings)
            })
            .collect();
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Self { generated, files }
    }

    /// Locates a file by canonical name.
    #[must_use]
    pub fn find_file(&self, name: &str) -> Option<&FileEntry> {
        let canonical = canonical_name(name);
        self.files.iter().find(|f| f.name == canonical)
    }

    /// Secondary lookup by (class name, package).
    #[must_use]
    pub fn find_class(&self, package: &str, class_name: &str) -> Option<&FileEntry> {
        self.files
            .iter()
            .find(|f| f.package == package && f.class_name == class_name)
    }

    #[must_use]
    pub fn finding_count(&self) -> usize {
        self.files.iter().map(|f| f.findings.len()).sum()
    }

    /// Reads a persisted report artifact.
    ///
    /// # Errors
    /// Returns an error on unreadable or malformed files.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| TidemarkError::Io {
            source,
            path: path.to_path_buf(),
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Writes the report artifact.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| TidemarkError::Io {
            source,
            path: path.to_path_buf(),
        })
    }
}

pub(crate) fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by(|a, b| {
        a.line
            .cmp(&b.line)
            .then_with(|| a.column.cmp(&b.column))
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
}
