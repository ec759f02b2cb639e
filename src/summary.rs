// src/summary.rs
//! Aggregation of findings into per-file/package/project summaries and the
//! quality score.
//!
//! Quality starts from a budget of `loc * PENALTY_SCALE` points, burns
//! `count * weight` per severity, floors at zero and is expressed as a
//! percentage of the budget. A file with no lines scores 0: defined, not
//! undefined, and distinguishable from a perfect score only by convention.

use std::cell::Cell;
use std::collections::BTreeMap;

use crate::finding::Finding;
use crate::origin::Origin;
use crate::report::{FileEntry, Report};
use crate::severity::{PenaltyTable, Severity, PENALTY_SCALE};

/// Quality percentage for `loc` lines carrying the given per-severity
/// violation counts. Always in `0..=100`; zero lines yield zero.
#[must_use]
pub fn calculate_quality(
    loc: u64,
    counts: &[u64; Severity::COUNT],
    penalties: &PenaltyTable,
) -> u8 {
    if loc == 0 {
        return 0;
    }
    let budget = loc.saturating_mul(PENALTY_SCALE);
    let spent: u64 = Severity::ALL
        .iter()
        .map(|sev| counts[sev.ordinal()].saturating_mul(penalties.weight(*sev)))
        .fold(0, u64::saturating_add);
    let remaining = budget.saturating_sub(spent);
    u8::try_from(remaining * 100 / budget).unwrap_or(100)
}

/// Percentage-bar decomposition: one slot per scored severity (aligned
/// with [`Severity::SCORED`]) plus the OK remainder. Slots always sum to
/// exactly 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PercentBar {
    pub scored: [u8; Severity::SCORED.len()],
    pub ok: u8,
}

/// Aggregate over zero or more files: one file, a package, or the whole
/// project. Mutated by repeated `add_*` calls during one rendering pass.
#[derive(Debug, Clone)]
pub struct FileSummary {
    penalties: PenaltyTable,
    files: usize,
    loc: u64,
    covered_loc: u64,
    has_coverage: bool,
    counts: [u64; Severity::COUNT],
    percent_cache: Cell<Option<PercentBar>>,
}

impl FileSummary {
    #[must_use]
    pub fn new(penalties: PenaltyTable) -> Self {
        Self {
            penalties,
            files: 0,
            loc: 0,
            covered_loc: 0,
            has_coverage: false,
            counts: [0; Severity::COUNT],
            percent_cache: Cell::new(None),
        }
    }

    /// Folds one report file into the summary. Coverage-origin findings
    /// mark lines as covered; everything else counts as a violation of its
    /// severity. Uncovered lines become the coverage violation count.
    pub fn add_entry(&mut self, entry: &FileEntry) {
        self.percent_cache.set(None);
        self.files += 1;
        self.loc += entry.loc;

        let mut covered = 0u64;
        let mut saw_coverage = false;
        for finding in &entry.findings {
            if finding.origin == Origin::Coverage {
                covered += 1;
                saw_coverage = true;
            } else {
                self.counts[finding.severity.ordinal()] += 1;
            }
        }
        if saw_coverage {
            self.has_coverage = true;
            self.covered_loc += covered;
            self.counts[Severity::Coverage.ordinal()] += entry.loc.saturating_sub(covered);
        }
    }

    /// Rolls another summary into this one (package → project).
    pub fn add(&mut self, other: &FileSummary) {
        self.percent_cache.set(None);
        self.files += other.files;
        self.loc += other.loc;
        self.covered_loc += other.covered_loc;
        self.has_coverage |= other.has_coverage;
        for ordinal in 0..Severity::COUNT {
            self.counts[ordinal] += other.counts[ordinal];
        }
    }

    #[must_use]
    pub fn files(&self) -> usize {
        self.files
    }

    #[must_use]
    pub fn loc(&self) -> u64 {
        self.loc
    }

    #[must_use]
    pub fn covered_loc(&self) -> u64 {
        self.covered_loc
    }

    #[must_use]
    pub fn has_coverage(&self) -> bool {
        self.has_coverage
    }

    #[must_use]
    pub fn count(&self, severity: Severity) -> u64 {
        self.counts[severity.ordinal()]
    }

    #[must_use]
    pub fn quality(&self) -> u8 {
        calculate_quality(self.loc, &self.counts, &self.penalties)
    }

    /// Covered fraction of the coverable lines, if coverage data is
    /// present.
    #[must_use]
    pub fn coverage_percent(&self) -> Option<u8> {
        if !self.has_coverage {
            return None;
        }
        let coverable = self.covered_loc + self.count(Severity::Coverage);
        if coverable == 0 {
            return Some(0);
        }
        u8::try_from(self.covered_loc * 100 / coverable).ok()
    }

    /// Walks the scored severities from highest impact down, computing each
    /// one's percentage contribution. A nonzero count never rounds down to
    /// an invisible 0%; each contribution clamps to the remaining budget;
    /// whatever is left is OK. Memoized until the next `add_*`.
    #[must_use]
    pub fn percentages(&self) -> PercentBar {
        if let Some(cached) = self.percent_cache.get() {
            return cached;
        }
        let bar = self.calc_percentages();
        self.percent_cache.set(Some(bar));
        bar
    }

    fn calc_percentages(&self) -> PercentBar {
        let mut bar = PercentBar::default();
        let mut remaining: u64 = 100;
        if self.loc > 0 {
            let budget = self.loc.saturating_mul(PENALTY_SCALE);
            for (slot, severity) in Severity::SCORED.iter().enumerate() {
                if remaining == 0 {
                    break;
                }
                let count = self.counts[severity.ordinal()];
                if count == 0 {
                    continue;
                }
                let mut percent = if *severity == Severity::Coverage {
                    // Uncovered fraction of the coverable lines, independent
                    // of the penalty budget.
                    let coverable = self.covered_loc + count;
                    rounded_percent(count, coverable)
                } else {
                    rounded_percent(count.saturating_mul(self.penalties.weight(*severity)), budget)
                };
                if percent == 0 {
                    percent = 1;
                }
                percent = percent.min(remaining);
                bar.scored[slot] = percent as u8;
                remaining -= percent;
            }
        }
        bar.ok = remaining as u8;
        bar
    }
}

fn rounded_percent(part: u64, whole: u64) -> u64 {
    if whole == 0 {
        return 0;
    }
    (part.saturating_mul(100) + whole / 2) / whole
}

/// Per-package summaries plus the project rollup for one report.
pub struct ReportSummary {
    pub project: FileSummary,
    pub packages: BTreeMap<String, FileSummary>,
}

/// Builds per-package and project summaries for a merged report.
#[must_use]
pub fn summarize(report: &Report, penalties: PenaltyTable) -> ReportSummary {
    let mut packages: BTreeMap<String, FileSummary> = BTreeMap::new();
    for entry in &report.files {
        packages
            .entry(entry.package.clone())
            .or_insert_with(|| FileSummary::new(penalties))
            .add_entry(entry);
    }
    let mut project = FileSummary::new(penalties);
    for summary in packages.values() {
        project.add(summary);
    }
    ReportSummary { project, packages }
}

/// Counts of newly introduced and newly resolved findings in a diffed
/// report.
#[must_use]
pub fn new_and_fixed(report: &Report) -> (usize, usize) {
    let mut new = 0;
    let mut fixed = 0;
    for finding in report.files.iter().flat_map(|f| &f.findings) {
        if finding.new {
            new += 1;
        } else if finding.old {
            fixed += 1;
        }
    }
    (new, fixed)
}

/// Findings matching a predicate, paired with their file names.
#[must_use]
pub fn collect_findings<'a>(
    report: &'a Report,
    keep: fn(&Finding) -> bool,
) -> Vec<(&'a str, &'a Finding)> {
    let mut all = Vec::new();
    for entry in &report.files {
        for finding in &entry.findings {
            if keep(finding) {
                all.push((entry.name.as_str(), finding));
            }
        }
    }
    all
}
