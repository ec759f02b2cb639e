// src/readers/style.rs
//! Style-checker reports: per-file error lists with template-shaped
//! messages and a rule-class identifier per diagnostic.

use std::path::Path;

use crate::error::Result;
use crate::finding::Finding;
use crate::origin::Origin;
use crate::readers::{malformed_input, read_report_file, FindingMap, ReadContext, ReportReader};
use crate::severity::Severity;

pub struct StyleReader;

impl ReportReader for StyleReader {
    fn origin(&self) -> Origin {
        Origin::Style
    }

    fn read(&self, path: &Path, ctx: &ReadContext) -> Result<FindingMap> {
        let content = read_report_file(path)?;
        let doc = match roxmltree::Document::parse(&content) {
            Ok(doc) => doc,
            Err(e) => return Ok(malformed_input(path, &e.to_string(), ctx)),
        };

        let mut map = FindingMap::new();
        for file_node in doc.descendants().filter(|n| n.has_tag_name("file")) {
            let Some(name) = file_node.attribute("name") else {
                continue;
            };
            let Some(resource) = ctx.resolve_path(name) else {
                ctx.diag(&format!("dropping style findings for unknown file {name}"));
                continue;
            };
            let findings = map.entry(resource).or_insert_with(Vec::new);
            for error in file_node.children().filter(|n| n.has_tag_name("error")) {
                let message = error.attribute("message").unwrap_or("").to_string();
                let line = attr_i32(error, "line");
                let column = attr_i32(error, "column");

                // Enumerated classification first; fall back to the tail
                // segment of the tool's own rule-class identifier.
                let (symbol, severity) = match ctx.taxonomy.classify_style(&message) {
                    Some(descriptor) => (descriptor.symbol.clone(), descriptor.severity),
                    None => {
                        let rule = error.attribute("source").unwrap_or("unclassified");
                        let tail = rule.rsplit('.').next().unwrap_or(rule);
                        let tool_severity = error
                            .attribute("severity")
                            .map_or(Severity::Warning, Severity::from_tool_str);
                        (ctx.taxonomy.intern(tail), tool_severity)
                    }
                };

                findings.push(
                    Finding::simple(Origin::Style, symbol, severity, message, line)
                        .with_column(column),
                );
            }
        }
        map.retain(|_, findings| !findings.is_empty());
        Ok(map)
    }
}

pub(crate) fn attr_i32(node: roxmltree::Node<'_, '_>, name: &str) -> i32 {
    node.attribute(name)
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}
