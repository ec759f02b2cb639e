// src/taxonomy/format.rs
//! Declarative finding-type formats for log-based origins.
//!
//! A format definition is an XML document: one root pattern that locates
//! each finding occurrence inside a larger log (with capture groups for
//! filename, message text and line), plus an ordered list of sub-pattern
//! `<type>` elements carrying explicit capture-group indices and a
//! priority. Sub-patterns are kept sorted by descending priority, ties
//! broken by symbol, so classification is deterministic.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use regex::Regex;

use crate::error::{Result, TidemarkError};
use crate::origin::Origin;
use crate::severity::Severity;
use crate::taxonomy::{CaptureOffsets, FindingTypeDescriptor};

/// Locates finding occurrences within a log.
#[derive(Debug)]
pub struct RootPattern {
    pub regex: Regex,
    pub filename_group: Option<usize>,
    pub text_group: Option<usize>,
    pub line_group: Option<usize>,
}

/// A parsed format definition: root pattern plus prioritized sub-patterns.
#[derive(Debug)]
pub struct GenericFormat {
    pub root: RootPattern,
    pub types: Vec<Arc<FindingTypeDescriptor>>,
}

/// Loads a format definition from disk.
///
/// # Errors
/// Returns an error on unreadable files, malformed XML, or patterns that
/// fail to compile. Unlike tool reports, a broken format definition is a
/// configuration error and is fatal.
pub fn load(path: &Path) -> Result<GenericFormat> {
    let content = fs::read_to_string(path).map_err(|source| TidemarkError::Io {
        source,
        path: path.to_path_buf(),
    })?;
    parse(&content, path)
}

/// Parses a format definition document.
///
/// # Errors
/// See [`load`].
pub fn parse(content: &str, path: &Path) -> Result<GenericFormat> {
    let doc = roxmltree::Document::parse(content).map_err(|e| TidemarkError::Xml {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let xml_err = |message: String| TidemarkError::Xml {
        path: path.to_path_buf(),
        message,
    };

    let root_node = doc
        .descendants()
        .find(|n| n.has_tag_name("root"))
        .ok_or_else(|| xml_err("missing <root> element".to_string()))?;
    let root_pattern = root_node
        .attribute("pattern")
        .ok_or_else(|| xml_err("<root> has no pattern attribute".to_string()))?;
    let root = RootPattern {
        regex: Regex::new(root_pattern)?,
        filename_group: group_attr(root_node, "filename-group"),
        text_group: group_attr(root_node, "text-group"),
        line_group: group_attr(root_node, "line-group"),
    };

    let mut types = Vec::new();
    for node in doc.descendants().filter(|n| n.has_tag_name("type")) {
        let symbol = node
            .attribute("symbol")
            .ok_or_else(|| xml_err("<type> has no symbol attribute".to_string()))?;
        let pattern = node
            .attribute("pattern")
            .ok_or_else(|| xml_err(format!("type '{symbol}' has no pattern attribute")))?;
        let severity = node
            .attribute("severity")
            .map_or(Severity::Warning, Severity::from_tool_str);
        let priority = node
            .attribute("priority")
            .and_then(|p| p.parse().ok())
            .unwrap_or(0);
        types.push(Arc::new(FindingTypeDescriptor {
            symbol: Arc::from(symbol),
            short_text: node.attribute("short-text").unwrap_or(symbol).to_string(),
            description: node.attribute("description").unwrap_or("").to_string(),
            severity,
            origin: Origin::Generic,
            pattern: Some(Regex::new(pattern)?),
            offsets: CaptureOffsets {
                text: group_attr(node, "text-group"),
                line_start: group_attr(node, "line-start-group"),
                line_end: group_attr(node, "line-end-group"),
                column_start: group_attr(node, "column-start-group"),
                column_end: group_attr(node, "column-end-group"),
                source_text: group_attr(node, "source-group"),
            },
            priority,
            caret_column: node.attribute("caret-column") == Some("true"),
        }));
    }
    if types.is_empty() {
        return Err(xml_err("format defines no <type> elements".to_string()));
    }

    // Descending priority, ties by symbol. Deterministic classification
    // order only; carries no further meaning.
    types.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });

    Ok(GenericFormat { root, types })
}

fn group_attr(node: roxmltree::Node<'_, '_>, name: &str) -> Option<usize> {
    node.attribute(name).and_then(|v| v.parse().ok())
}
