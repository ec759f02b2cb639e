use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tidemark",
    version,
    about = "Static-analysis report merger and quality tracker"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest configured tool reports, merge them, diff against the
    /// previous artifact and write a new one
    Run {
        #[arg(long, default_value = "tidemark.toml")]
        config: PathBuf,
        /// Previous report artifact to diff against (overrides config)
        #[arg(long)]
        against: Option<PathBuf>,
        /// Output artifact path (overrides config)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Print dropped-resource and skipped-fragment diagnostics
        #[arg(long, short)]
        verbose: bool,
    },
    /// Diff two report artifacts and flag new/fixed findings
    Diff {
        old: PathBuf,
        new: PathBuf,
        /// Write the flagged report here instead of only printing it
        #[arg(long)]
        out: Option<PathBuf>,
        /// Duplication message-prefix window
        #[arg(long, default_value = "60")]
        prefix_window: usize,
    },
    /// Print the summary of an existing report artifact
    Show {
        artifact: PathBuf,
    },
}
