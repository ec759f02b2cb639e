// src/readers/generic.rs
//! Log-based origins: free-text tool output classified through the
//! declarative pattern formats. Exact repeats within one log (same line,
//! column, origin and message) are deduplicated by removing the earlier
//! occurrence before adding the new one, so re-parsing the same log is
//! idempotent.

use std::path::Path;
use std::sync::Arc;

use crate::classify::Classifier;
use crate::error::Result;
use crate::finding::Finding;
use crate::origin::Origin;
use crate::readers::{read_report_file, FindingMap, ReadContext, ReportReader};
use crate::taxonomy::GenericFormat;

/// Resource name under which findings with no filename are collected.
const GLOBAL_RESOURCE: &str = "(global)";

pub struct GenericReader {
    formats: Vec<Arc<GenericFormat>>,
}

impl GenericReader {
    #[must_use]
    pub fn new(formats: Vec<Arc<GenericFormat>>) -> Self {
        Self { formats }
    }
}

impl GenericReader {
    /// Scans one log and folds its findings into `target`, replacing exact
    /// repeats already present. Parsing the same log into the same target
    /// twice leaves the map unchanged.
    ///
    /// # Errors
    /// Returns an error only on I/O failures.
    pub fn read_into(&self, path: &Path, ctx: &ReadContext, target: &mut FindingMap) -> Result<()> {
        let content = read_report_file(path)?;
        for format in &self.formats {
            let outcome = Classifier::new(format).scan(&content);
            for fragment in &outcome.skipped {
                ctx.diag(&format!("no finding type matched log fragment: {fragment}"));
            }
            for hit in outcome.hits {
                match hit.filename {
                    Some(name) => {
                        let Some(resource) = ctx.resolve_path(&name) else {
                            ctx.diag(&format!("dropping log finding for unknown file {name}"));
                            continue;
                        };
                        push_deduped(target.entry(resource).or_default(), hit.finding);
                    }
                    None => {
                        let resource = ctx.registry.register(GLOBAL_RESOURCE, "", "")?;
                        push_deduped(target.entry(resource).or_default(), hit.finding.global());
                    }
                }
            }
        }
        Ok(())
    }
}

impl ReportReader for GenericReader {
    fn origin(&self) -> Origin {
        Origin::Generic
    }

    fn read(&self, path: &Path, ctx: &ReadContext) -> Result<FindingMap> {
        let mut map = FindingMap::new();
        self.read_into(path, ctx, &mut map)?;
        Ok(map)
    }
}

fn push_deduped(findings: &mut Vec<Finding>, finding: Finding) {
    findings.retain(|existing| {
        !(existing.line == finding.line
            && existing.column == finding.column
            && existing.origin == finding.origin
            && existing.message == finding.message)
    });
    findings.push(finding);
}
