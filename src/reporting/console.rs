// src/reporting/console.rs
//! Console rendering of a merged report: per-package quality, violation
//! counts, coverage, and the new/fixed delta when the report was diffed.

use colored::Colorize;

use crate::report::Report;
use crate::severity::{PenaltyTable, Severity};
use crate::summary::{collect_findings, new_and_fixed, summarize, FileSummary};

/// Listed new/fixed findings are capped; the rest is summarized.
const DELTA_LIST_CAP: usize = 20;

pub fn print_report(report: &Report, penalties: PenaltyTable) {
    let summary = summarize(report, penalties);

    println!(
        "{} {} files, {} findings",
        "tidemark report:".bold(),
        summary.project.files(),
        report.finding_count(),
    );
    println!();

    for (package, package_summary) in &summary.packages {
        let label = if package.is_empty() {
            "(default package)"
        } else {
            package.as_str()
        };
        println!(
            "  {} {}",
            quality_colored(package_summary.quality()),
            label
        );
        print_counts(package_summary);
    }

    println!();
    println!(
        "{} {}",
        "project quality:".bold(),
        quality_colored(summary.project.quality())
    );
    if let Some(coverage) = summary.project.coverage_percent() {
        println!("{} {coverage}%", "line coverage:".bold());
    }

    print_delta(report);
}

fn print_counts(summary: &FileSummary) {
    let mut parts = Vec::new();
    for severity in Severity::SCORED {
        let count = summary.count(severity);
        if count > 0 {
            parts.push(format!("{count} {}", severity.label()));
        }
    }
    if !parts.is_empty() {
        println!("      {}", parts.join(", ").dimmed());
    }
}

fn print_delta(report: &Report) {
    let (new, fixed) = new_and_fixed(report);
    if new == 0 && fixed == 0 {
        return;
    }
    println!();
    println!(
        "{} {} new, {} fixed",
        "since last run:".bold(),
        new.to_string().red(),
        fixed.to_string().green()
    );

    let new_findings = collect_findings(report, |f| f.new);
    for (path, finding) in new_findings.iter().take(DELTA_LIST_CAP) {
        println!(
            "  {} {}:{} {} ({})",
            "+".red().bold(),
            path,
            finding.line,
            finding.message,
            finding.symbol
        );
    }
    if new_findings.len() > DELTA_LIST_CAP {
        println!(
            "  {}",
            format!("... and {} more", new_findings.len() - DELTA_LIST_CAP).dimmed()
        );
    }

    let fixed_findings = collect_findings(report, |f| f.old);
    for (path, finding) in fixed_findings.iter().take(DELTA_LIST_CAP) {
        println!(
            "  {} {}:{} {}",
            "-".green().bold(),
            path,
            finding.line,
            finding.message.dimmed()
        );
    }
    if fixed_findings.len() > DELTA_LIST_CAP {
        println!(
            "  {}",
            format!("... and {} more", fixed_findings.len() - DELTA_LIST_CAP).dimmed()
        );
    }
}

fn quality_colored(quality: u8) -> colored::ColoredString {
    let text = format!("{quality:>3}%");
    if quality >= 90 {
        text.green().bold()
    } else if quality >= 70 {
        text.yellow()
    } else {
        text.red().bold()
    }
}
