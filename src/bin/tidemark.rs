// src/bin/tidemark.rs
use std::process;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use tidemark_core::cli::{handle_diff, handle_run, handle_show, Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e:#}", "error:".red().bold());
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    dispatch(cli)
}

fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run {
            config,
            against,
            out,
            verbose,
        } => handle_run(&config, against, out, verbose),
        Commands::Diff {
            old,
            new,
            out,
            prefix_window,
        } => handle_diff(&old, &new, out, prefix_window),
        Commands::Show { artifact } => handle_show(&artifact),
    }
}
