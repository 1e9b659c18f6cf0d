//! compgraph CLI - component graph extraction for UI codebases.
//!
//! Usage:
//!   compgraph json               # Serialized graph (componentList)
//!   compgraph json --compact     # Same, single line
//!   compgraph print              # Human-readable trace
//!   compgraph roots              # Root components
//!   compgraph tree <name>        # Descendants of a component
//!   compgraph stats              # Graph statistics
//!   compgraph diagnostics        # Skipped files, ambiguous names

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use tracing::info;

use compgraph::cli::{extract_root, print_usage, render, Cli};

fn main() {
    // Logs go to stderr so JSON output on stdout stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command.clone() else {
        print_usage();
        return Ok(());
    };

    let root = cli.root.canonicalize().unwrap_or_else(|_| cli.root.clone());
    let config = cli.load_config();
    info!(root = %root.display(), "extracting component graph");

    let extraction = extract_root(&root, &config)
        .with_context(|| format!("failed to extract {}", root.display()))?;
    let output = render(&command, &extraction)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    if !output.ends_with('\n') {
        writeln!(stdout)?;
    }
    Ok(())
}
