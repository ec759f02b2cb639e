// src/readers/mod.rs
//! One reader per tool-report format. Each parses a tool's native output
//! and produces a mapping from canonical resource to normalized findings.
//!
//! Shared failure policy: a resource the registry cannot map drops its
//! findings with a diagnostic (tools routinely report on out-of-scope
//! files); an unparseable document becomes a synthetic system finding
//! attached to the input path, never an abort.

pub mod bugs;
pub mod coverage;
pub mod dupes;
pub mod generic;
pub mod style;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use colored::Colorize;

use crate::error::{Result, TidemarkError};
use crate::finding::Finding;
use crate::origin::Origin;
use crate::resource::{ResourceInfo, ResourceRegistry};
use crate::severity::Severity;
use crate::taxonomy::Taxonomy;

pub use bugs::BugReader;
pub use coverage::CoverageReader;
pub use dupes::DuplicationReader;
pub use generic::GenericReader;
pub use style::StyleReader;

/// Per-resource finding lists, the common output of every reader.
pub type FindingMap = HashMap<Arc<ResourceInfo>, Vec<Finding>>;

/// Extensions probed when resolving a dotted class reference against the
/// configured source roots.
const PROBE_EXTS: &[&str] = &["java", "kt", "scala", "groovy"];

/// Everything a reader needs besides the report file itself. Created once
/// at pipeline start; shared across readers, including parallel ones.
pub struct ReadContext<'a> {
    pub registry: &'a ResourceRegistry,
    pub taxonomy: &'a Taxonomy,
    pub source_roots: &'a [PathBuf],
    pub verbose: bool,
}

impl ReadContext<'_> {
    pub(crate) fn diag(&self, message: &str) {
        if self.verbose {
            eprintln!("{} {message}", "note:".dimmed());
        }
    }

    /// Resolves a raw path reference, trying it as-is and then relative to
    /// each source root.
    #[must_use]
    pub fn resolve_path(&self, raw: &str) -> Option<Arc<ResourceInfo>> {
        if let Some(found) = self.registry.lookup_path(raw) {
            return Some(found);
        }
        for root in self.source_roots {
            let candidate = root.join(raw);
            if let Some(found) = self.registry.lookup_path(&candidate.to_string_lossy()) {
                return Some(found);
            }
        }
        None
    }

    /// Resolves a dotted class reference (`pkg.sub.Class`), first via the
    /// class index, then by probing each source root for a registered file.
    #[must_use]
    pub fn resolve_class(&self, dotted: &str) -> Option<Arc<ResourceInfo>> {
        let trimmed = dotted.split('$').next().unwrap_or(dotted);
        let (package, class) = match trimmed.rfind('.') {
            Some(idx) => (&trimmed[..idx], &trimmed[idx + 1..]),
            None => ("", trimmed),
        };
        if let Some(found) = self.registry.lookup_class(package, class) {
            return Some(found);
        }
        let rel = package.replace('.', "/");
        for root in self.source_roots {
            for ext in PROBE_EXTS {
                let candidate = root.join(&rel).join(format!("{class}.{ext}"));
                if let Some(found) = self.registry.lookup_path(&candidate.to_string_lossy()) {
                    return Some(found);
                }
            }
        }
        None
    }
}

/// Common contract of the reader family.
pub trait ReportReader: Send + Sync {
    fn origin(&self) -> Origin;

    /// Parses one report file into a per-resource finding map.
    ///
    /// # Errors
    /// Returns an error only on I/O failures; malformed documents and
    /// unresolvable resources are handled per the shared failure policy.
    fn read(&self, path: &Path, ctx: &ReadContext) -> Result<FindingMap>;
}

pub(crate) fn read_report_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| TidemarkError::Io {
        source,
        path: path.to_path_buf(),
    })
}

/// Builds the one-finding map for a document that failed to parse: a
/// synthetic system-level error attached to the offending input path, so a
/// broken tool report surfaces in the output instead of killing the run.
pub(crate) fn malformed_input(path: &Path, detail: &str, ctx: &ReadContext) -> FindingMap {
    ctx.diag(&format!("unparseable report {}: {detail}", path.display()));
    let resource = Arc::new(ResourceInfo::new(&path.to_string_lossy(), "", ""));
    let finding = Finding::simple(
        Origin::System,
        ctx.taxonomy.intern("unparseable-report"),
        Severity::Error,
        format!("Report could not be parsed: {detail}"),
        0,
    )
    .global();
    let mut map = FindingMap::new();
    map.insert(resource, vec![finding]);
    map
}

/// The reader responsible for `origin`-flavored reports. Generic logs need
/// their declarative formats and are constructed by the caller instead.
#[must_use]
pub fn reader_for(origin: Origin) -> Option<Box<dyn ReportReader>> {
    match origin {
        Origin::Style => Some(Box::new(StyleReader)),
        Origin::Duplication => Some(Box::new(DuplicationReader)),
        Origin::BugFinder => Some(Box::new(BugReader)),
        Origin::Coverage => Some(Box::new(CoverageReader)),
        Origin::Generic | Origin::System => None,
    }
}
