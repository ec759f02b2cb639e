// src/readers/bugs.rs
//! Bug-finder reports: each defect instance is a heterogeneous ordered
//! list of sub-elements. The elements are modeled as a tagged enum and
//! folded in document order with an explicit line-override policy: the
//! first class element anchors the resource, and a line value set once is
//! only replaced while it is still non-positive.

use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::finding::Finding;
use crate::origin::Origin;
use crate::readers::style::attr_i32;
use crate::readers::{malformed_input, read_report_file, FindingMap, ReadContext, ReportReader};
use crate::severity::Severity;

pub struct BugReader;

/// One sub-element of a bug instance, in document order.
#[derive(Debug)]
enum BugElement {
    Class { name: String },
    Method { line: i32 },
    Field,
    SourceLine { start: i32, end: i32 },
    Count(u32),
    Message(String),
}

impl ReportReader for BugReader {
    fn origin(&self) -> Origin {
        Origin::BugFinder
    }

    fn read(&self, path: &Path, ctx: &ReadContext) -> Result<FindingMap> {
        let content = read_report_file(path)?;
        let doc = match roxmltree::Document::parse(&content) {
            Ok(doc) => doc,
            Err(e) => return Ok(malformed_input(path, &e.to_string(), ctx)),
        };

        let mut map = FindingMap::new();
        for bug in doc.descendants().filter(|n| n.has_tag_name("bug-instance")) {
            let Some(kind) = bug.attribute("type") else {
                continue;
            };
            let severity = priority_severity(bug.attribute("priority"));
            let elements: Vec<BugElement> = bug.children().filter_map(parse_element).collect();

            let Some(anchor) = elements.iter().find_map(|e| match e {
                BugElement::Class { name } => Some(name.clone()),
                _ => None,
            }) else {
                ctx.diag(&format!("bug instance '{kind}' has no class element"));
                continue;
            };

            let mut line = 0;
            let mut end_line = 0;
            let mut counter = None;
            let mut message = None;
            for element in &elements {
                match element {
                    BugElement::SourceLine { start, end } => {
                        if line <= 0 {
                            line = *start;
                            end_line = *end;
                        }
                    }
                    BugElement::Method { line: method_line } => {
                        if line <= 0 {
                            line = *method_line;
                        }
                    }
                    BugElement::Count(count) => counter = Some(*count),
                    BugElement::Message(text) => message = Some(text.clone()),
                    BugElement::Class { .. } | BugElement::Field => {}
                }
            }

            let Some(resource) = ctx.resolve_class(&anchor) else {
                ctx.diag(&format!("dropping bug finding for unknown class {anchor}"));
                continue;
            };

            let descriptor = ctx.taxonomy.from_symbol(kind);
            let mut finding = Finding::simple(
                Origin::BugFinder,
                Arc::clone(&descriptor.symbol),
                severity,
                message.unwrap_or_else(|| descriptor.short_text.clone()),
                line,
            );
            finding.end_line = end_line;
            finding.counter = counter;
            map.entry(resource).or_default().push(finding);
        }
        Ok(map)
    }
}

fn parse_element(node: roxmltree::Node<'_, '_>) -> Option<BugElement> {
    if !node.is_element() {
        return None;
    }
    match node.tag_name().name() {
        "class" => Some(BugElement::Class {
            name: node.attribute("name")?.to_string(),
        }),
        "method" => {
            // A method carries its own source line as a nested element.
            let line = node
                .children()
                .find(|c| c.has_tag_name("source-line"))
                .map_or(0, |c| attr_i32(c, "start"));
            Some(BugElement::Method { line })
        }
        "field" => Some(BugElement::Field),
        "source-line" => Some(BugElement::SourceLine {
            start: attr_i32(node, "start"),
            end: attr_i32(node, "end"),
        }),
        "count" => node.text().and_then(|t| t.trim().parse().ok()).map(BugElement::Count),
        "message" => node.text().map(|t| BugElement::Message(t.trim().to_string())),
        _ => None,
    }
}

fn priority_severity(priority: Option<&str>) -> Severity {
    match priority.and_then(|p| p.parse::<u32>().ok()) {
        Some(1) => Severity::Error,
        Some(2) => Severity::Warning,
        _ => Severity::Design,
    }
}
