// src/cli/handlers.rs
//! Command handlers. The pipeline here is orchestration only: registry and
//! taxonomy are created per run and passed down explicitly; report files
//! parse in parallel, everything after the merge is single-threaded.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::config::Config;
use crate::merge::{self, DiffOptions};
use crate::origin::Origin;
use crate::readers::{reader_for, FindingMap, GenericReader, ReadContext, ReportReader};
use crate::report::Report;
use crate::reporting::console;
use crate::resource::{self, ResourceRegistry};
use crate::taxonomy::{format, GenericFormat, Taxonomy};

/// Extensions accepted when an input path is a directory.
const REPORT_EXTS: &[&str] = &["xml", "log", "txt"];

pub fn handle_run(
    config_path: &Path,
    against: Option<PathBuf>,
    out: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let config = Config::load(config_path)?;
    let verbose = verbose || config.verbose;
    let penalties = config.penalty_table()?;

    let registry = ResourceRegistry::new();
    let registered = resource::populate_from_roots(&registry, &config.source_roots)?;
    if verbose {
        eprintln!("registered {registered} source files");
    }

    let taxonomy = Taxonomy::new();
    taxonomy.initialize(Origin::Style)?;
    let formats = load_formats(&config, &taxonomy)?;

    let jobs = build_jobs(&config, &formats)?;
    let ctx = ReadContext {
        registry: &registry,
        taxonomy: &taxonomy,
        source_roots: &config.source_roots,
        verbose,
    };
    let maps: Vec<FindingMap> = jobs
        .par_iter()
        .map(|(reader, path)| reader.read(path, &ctx))
        .collect::<crate::error::Result<Vec<_>>>()?;

    let now = Utc::now().timestamp_millis();
    let mut report = Report::from_map(merge::merge_maps(maps), now);
    merge::apply_transforms(&mut report, &config.transforms())?;

    let against = against.or_else(|| config.diff.against.clone());
    if let Some(previous_path) = against {
        if previous_path.exists() {
            let previous = Report::load(&previous_path)?;
            let opts = DiffOptions {
                prefix_window: config.diff.prefix_window,
            };
            merge::flag_new_findings(&mut report, &previous, now, &opts);
        } else if verbose {
            eprintln!(
                "no previous artifact at {}; skipping diff",
                previous_path.display()
            );
        }
    }

    let artifact = out.unwrap_or_else(|| config.artifact.clone());
    report.save(&artifact)?;
    console::print_report(&report, penalties);
    Ok(())
}

pub fn handle_diff(
    old_path: &Path,
    new_path: &Path,
    out: Option<PathBuf>,
    prefix_window: usize,
) -> Result<()> {
    let previous = Report::load(old_path)?;
    let mut current = Report::load(new_path)?;
    let now = Utc::now().timestamp_millis();
    merge::flag_new_findings(&mut current, &previous, now, &DiffOptions { prefix_window });
    if let Some(out) = out {
        current.save(&out)?;
    }
    console::print_report(&current, crate::severity::PenaltyTable::default());
    Ok(())
}

pub fn handle_show(artifact: &Path) -> Result<()> {
    let report = Report::load(artifact)?;
    console::print_report(&report, crate::severity::PenaltyTable::default());
    Ok(())
}

fn load_formats(config: &Config, taxonomy: &Taxonomy) -> Result<Vec<Arc<GenericFormat>>> {
    let mut formats = Vec::new();
    for path in &config.formats {
        let loaded = Arc::new(
            format::load(path)
                .with_context(|| format!("loading finding format {}", path.display()))?,
        );
        taxonomy.register_format(&loaded);
        formats.push(loaded);
    }
    Ok(formats)
}

/// Resolves each configured input to (reader, report file) jobs. Directory
/// inputs are scanned for report files.
fn build_jobs(
    config: &Config,
    formats: &[Arc<GenericFormat>],
) -> Result<Vec<(Box<dyn ReportReader>, PathBuf)>> {
    let mut jobs: Vec<(Box<dyn ReportReader>, PathBuf)> = Vec::new();
    for input in &config.inputs {
        for path in expand_input(&input.path)? {
            let reader: Box<dyn ReportReader> = match input.origin {
                Origin::Generic => {
                    anyhow::ensure!(
                        !formats.is_empty(),
                        "generic input {} configured without any [formats]",
                        path.display()
                    );
                    Box::new(GenericReader::new(formats.to_vec()))
                }
                origin => reader_for(origin).ok_or_else(|| {
                    anyhow::anyhow!("origin '{origin}' has no report reader")
                })?,
            };
            jobs.push((reader, path));
        }
    }
    Ok(jobs)
}

fn expand_input(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut found = Vec::new();
    for entry in WalkDir::new(path) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let ext = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        if REPORT_EXTS.contains(&ext) {
            found.push(entry.path().to_path_buf());
        }
    }
    found.sort();
    Ok(found)
}
