// src/readers/dupes.rs
//! Duplicate-code reports: one duplication event spans two or more file
//! locations. Each location gets its own finding whose message names the
//! duplicated extent and cross-references every *other* location, so a
//! single event fans out into N findings.

use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::finding::Finding;
use crate::origin::Origin;
use crate::readers::style::attr_i32;
use crate::readers::{malformed_input, read_report_file, FindingMap, ReadContext, ReportReader};
use crate::resource::ResourceInfo;
use crate::severity::Severity;

pub struct DuplicationReader;

struct Location {
    raw_path: String,
    line: i32,
    resource: Option<Arc<ResourceInfo>>,
}

impl Location {
    /// Cross-reference label: resolved class name where possible, raw path
    /// otherwise.
    fn label(&self) -> String {
        match &self.resource {
            Some(resource) if resource.package.is_empty() => resource.class_name.clone(),
            Some(resource) => format!("{}.{}", resource.package, resource.class_name),
            None => self.raw_path.clone(),
        }
    }
}

impl ReportReader for DuplicationReader {
    fn origin(&self) -> Origin {
        Origin::Duplication
    }

    fn read(&self, path: &Path, ctx: &ReadContext) -> Result<FindingMap> {
        let content = read_report_file(path)?;
        let doc = match roxmltree::Document::parse(&content) {
            Ok(doc) => doc,
            Err(e) => return Ok(malformed_input(path, &e.to_string(), ctx)),
        };

        let symbol = ctx.taxonomy.intern("duplicated-code");
        let mut map = FindingMap::new();
        for dup in doc.descendants().filter(|n| n.has_tag_name("duplication")) {
            let lines = attr_i32(dup, "lines");
            let tokens = attr_i32(dup, "tokens");
            let locations: Vec<Location> = dup
                .children()
                .filter(|n| n.has_tag_name("file"))
                .filter_map(|n| {
                    let raw_path = n.attribute("path")?.to_string();
                    let resource = ctx.resolve_path(&raw_path);
                    Some(Location {
                        line: attr_i32(n, "line"),
                        resource,
                        raw_path,
                    })
                })
                .collect();
            if locations.len() < 2 {
                ctx.diag("skipping duplication event with fewer than two locations");
                continue;
            }

            for (idx, location) in locations.iter().enumerate() {
                let Some(resource) = &location.resource else {
                    ctx.diag(&format!(
                        "dropping duplication finding for unknown file {}",
                        location.raw_path
                    ));
                    continue;
                };
                let peers: Vec<String> = locations
                    .iter()
                    .enumerate()
                    .filter(|(other, _)| *other != idx)
                    .map(|(_, peer)| peer.label())
                    .collect();
                let message = format!(
                    "Duplication of {tokens} tokens ({lines} lines), also found in: {}",
                    peers.join(", ")
                );
                let mut finding = Finding::simple(
                    Origin::Duplication,
                    Arc::clone(&symbol),
                    Severity::Cpd,
                    message,
                    location.line,
                );
                if lines > 0 {
                    finding.end_line = location.line + lines - 1;
                }
                map.entry(Arc::clone(resource)).or_default().push(finding);
            }
        }
        Ok(map)
    }
}
