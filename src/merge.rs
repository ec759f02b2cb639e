// src/merge.rs
//! Merging report documents and diffing report generations.
//!
//! Merging concatenates per-file finding lists with no dedup, since every
//! tool is authoritative for its own findings. The diff is deliberately
//! fuzzy:
//! tool output shifts line numbers between runs, so it pairs findings in
//! two passes (exact, then positional-tolerant) before flagging whatever
//! is left as new or fixed.

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::finding::Finding;
use crate::origin::Origin;
use crate::readers::FindingMap;
use crate::report::{sort_findings, FileEntry, Report};

/// Unions per-resource finding maps from several readers into one.
#[must_use]
pub fn merge_maps<I>(maps: I) -> FindingMap
where
    I: IntoIterator<Item = FindingMap>,
{
    let mut merged = FindingMap::new();
    for map in maps {
        for (resource, findings) in map {
            merged.entry(resource).or_default().extend(findings);
        }
    }
    merged
}

/// Unions several full report documents, concatenating finding lists of
/// files that appear in more than one.
#[must_use]
pub fn merge_reports(reports: Vec<Report>, generated: i64) -> Report {
    let mut merged = Report::new(generated);
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    for report in reports {
        for entry in report.files {
            let key = (entry.name.clone(), entry.package.clone());
            match index.get(&key) {
                Some(&at) => {
                    let existing = &mut merged.files[at];
                    existing.findings.extend(entry.findings);
                    existing.loc = existing.loc.max(entry.loc);
                }
                None => {
                    index.insert(key, merged.files.len());
                    merged.files.push(entry);
                }
            }
        }
    }
    merged.files.sort_by(|a, b| a.name.cmp(&b.name));
    for entry in &mut merged.files {
        sort_findings(&mut entry.findings);
    }
    merged
}

/// One declarative structural transform. Transforms run against the merged
/// document in registration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// Drop files whose canonical name matches a `*` wildcard pattern.
    ExcludePath { pattern: String },
    /// Drop findings with the given type symbol.
    ExcludeSymbol { symbol: String },
    /// Drop findings from the given origin.
    ExcludeOrigin { origin: Origin },
}

/// Applies transforms in order.
///
/// # Errors
/// Returns an error if a wildcard pattern fails to compile.
pub fn apply_transforms(report: &mut Report, transforms: &[Transform]) -> Result<()> {
    for transform in transforms {
        match transform {
            Transform::ExcludePath { pattern } => {
                let regex = wildcard_regex(pattern)?;
                report.files.retain(|entry| !regex.is_match(&entry.name));
            }
            Transform::ExcludeSymbol { symbol } => {
                for entry in &mut report.files {
                    entry.findings.retain(|f| f.symbol.as_ref() != symbol);
                }
            }
            Transform::ExcludeOrigin { origin } => {
                for entry in &mut report.files {
                    entry.findings.retain(|f| f.origin != *origin);
                }
            }
        }
    }
    Ok(())
}

fn wildcard_regex(pattern: &str) -> Result<Regex> {
    let mut escaped = String::from("^");
    for part in pattern.split('*') {
        if !escaped.ends_with('^') {
            escaped.push_str(".*");
        }
        escaped.push_str(&regex::escape(part));
    }
    escaped.push('$');
    Ok(Regex::new(&escaped)?)
}

/// Knobs for the report diff. The duplication message-prefix window is a
/// heuristic tuning value, not a structural requirement.
#[derive(Debug, Clone, Copy)]
pub struct DiffOptions {
    /// Characters of message prefix compared when pairing duplication
    /// findings; tolerates reordered peer-location text further right.
    pub prefix_window: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self { prefix_window: 60 }
    }
}

/// Diffs `current` against the `previous` snapshot, flagging newly
/// introduced findings NEW and resolved ones OLD.
///
/// Matched pairs inherit the previous finding's `since` timestamp; age is
/// preserved, not reset. Resolved findings are re-inserted into the
/// current file with OK severity so they render as fixed.
pub fn flag_new_findings(current: &mut Report, previous: &Report, now: i64, opts: &DiffOptions) {
    for entry in &mut current.files {
        // Start from a clean slate so re-diffing an already-flagged
        // artifact doesn't carry stale flags.
        for finding in &mut entry.findings {
            finding.new = false;
            finding.old = false;
        }
        let old_entry = previous
            .find_file(&entry.name)
            .or_else(|| previous.find_class(&entry.package, &entry.class_name));
        match old_entry {
            None => {
                for finding in &mut entry.findings {
                    if finding.tracks_age() {
                        finding.mark_new(now);
                    }
                }
            }
            Some(old) => diff_file(entry, old, now, opts),
        }
    }
}

fn diff_file(entry: &mut FileEntry, old: &FileEntry, now: i64, opts: &DiffOptions) {
    // Zero-penalty and coverage findings don't participate in age tracking.
    let candidates: Vec<usize> = entry
        .findings
        .iter()
        .enumerate()
        .filter(|(_, f)| f.tracks_age())
        .map(|(i, _)| i)
        .collect();
    let mut old_pool: Vec<Finding> = old
        .findings
        .iter()
        .filter(|f| f.tracks_age())
        .cloned()
        .collect();

    let unmatched = pair_pass(entry, candidates, &mut old_pool, opts, exact_match);
    let unmatched = pair_pass(entry, unmatched, &mut old_pool, opts, partial_match);

    for at in unmatched {
        entry.findings[at].mark_new(now);
    }
    for mut fixed in old_pool {
        fixed.mark_old();
        entry.findings.push(fixed);
    }
}

/// Runs one pairing pass; matched pairs leave both lists, and the matched
/// current finding inherits the old `since`.
fn pair_pass(
    entry: &mut FileEntry,
    candidates: Vec<usize>,
    old_pool: &mut Vec<Finding>,
    opts: &DiffOptions,
    matches: fn(&Finding, &Finding, &DiffOptions) -> bool,
) -> Vec<usize> {
    let mut unmatched = Vec::new();
    for at in candidates {
        let found = {
            let current = &entry.findings[at];
            old_pool.iter().position(|old| matches(current, old, opts))
        };
        match found {
            Some(pos) => {
                let old = old_pool.remove(pos);
                entry.findings[at].since = old.since;
            }
            None => unmatched.push(at),
        }
    }
    unmatched
}

fn exact_match(current: &Finding, old: &Finding, opts: &DiffOptions) -> bool {
    if current.origin != old.origin || current.symbol != old.symbol {
        return false;
    }
    if current.origin == Origin::Duplication {
        current.line == old.line && prefix_eq(&current.message, &old.message, opts.prefix_window)
    } else {
        current.line == old.line
            && current.column == old.column
            && current.message == old.message
            && counter_monotonic(current, old)
    }
}

/// Looser pass for findings that moved within the file.
fn partial_match(current: &Finding, old: &Finding, opts: &DiffOptions) -> bool {
    if current.origin != old.origin || current.symbol != old.symbol {
        return false;
    }
    if current.origin == Origin::Duplication {
        current.line == old.line || prefix_eq(&current.message, &old.message, opts.prefix_window)
    } else {
        current.message == old.message && counter_monotonic(current, old)
    }
}

/// Hit counts only ever grow between runs for the same logical finding.
fn counter_monotonic(current: &Finding, old: &Finding) -> bool {
    current.counter.unwrap_or(0) >= old.counter.unwrap_or(0)
}

fn prefix_eq(a: &str, b: &str, window: usize) -> bool {
    a.chars().take(window).eq(b.chars().take(window))
}
