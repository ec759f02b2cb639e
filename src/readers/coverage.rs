// src/readers/coverage.rs
//! Coverage reports: per-class, per-line hit counts. Every covered line
//! becomes one finding carrying its hit count; uncovered lines are not
//! emitted here; they are inferred later by absence when quality is
//! summarized.

use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::finding::Finding;
use crate::origin::Origin;
use crate::readers::{malformed_input, read_report_file, FindingMap, ReadContext, ReportReader};
use crate::severity::Severity;

pub struct CoverageReader;

impl ReportReader for CoverageReader {
    fn origin(&self) -> Origin {
        Origin::Coverage
    }

    fn read(&self, path: &Path, ctx: &ReadContext) -> Result<FindingMap> {
        let content = read_report_file(path)?;
        let doc = match roxmltree::Document::parse(&content) {
            Ok(doc) => doc,
            Err(e) => return Ok(malformed_input(path, &e.to_string(), ctx)),
        };

        let symbol = ctx.taxonomy.intern("line-coverage");
        let mut map = FindingMap::new();
        for class in doc.descendants().filter(|n| n.has_tag_name("class")) {
            let resource = class
                .attribute("filename")
                .and_then(|f| ctx.resolve_path(f))
                .or_else(|| class.attribute("name").and_then(|n| ctx.resolve_class(n)));
            let Some(resource) = resource else {
                let label = class
                    .attribute("filename")
                    .or_else(|| class.attribute("name"))
                    .unwrap_or("<unnamed>");
                ctx.diag(&format!("dropping coverage data for unknown class {label}"));
                continue;
            };

            let findings = map.entry(resource).or_insert_with(Vec::new);
            for line in class.descendants().filter(|n| n.has_tag_name("line")) {
                let number: i32 = line
                    .attribute("number")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0);
                let hits: u32 = line
                    .attribute("hits")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0);
                if hits == 0 {
                    continue;
                }
                findings.push(
                    Finding::simple(
                        Origin::Coverage,
                        Arc::clone(&symbol),
                        Severity::Coverage,
                        format!("{hits} hits"),
                        number,
                    )
                    .with_counter(hits),
                );
            }
        }
        map.retain(|_, findings| !findings.is_empty());
        Ok(map)
    }
}
