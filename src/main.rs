//! Linkscout main entry point
//!
//! Command-line interface for the reference checking core. Without configured
//! transports the binary classifies, scopes and schedules; the protocol work
//! itself belongs to transport collaborators linked in by embedders.

use anyhow::Context;
use clap::Parser;
use linkscout::config::load_config;
use linkscout::reference::build_listing;
use linkscout::{run_checks, Config, StandardSession};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Linkscout: recursive reference checking core
#[derive(Parser, Debug)]
#[command(name = "linkscout")]
#[command(version = "1.0.0")]
#[command(about = "Classify, scope and schedule reference checks", long_about = None)]
struct Cli {
    /// References to check, in order
    #[arg(value_name = "REFERENCE", required = true)]
    references: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show classification and scope for each reference without checking
    #[arg(long, conflicts_with = "listing")]
    dry_run: bool,

    /// Emit a synthetic listing document for the given references and exit
    #[arg(long, conflicts_with = "dry_run")]
    listing: bool,

    /// Disable periodic status reporting
    #[arg(long)]
    no_status: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("failed to load {}", path.display()))?
        }
        None => Config::default(),
    };

    if cli.no_status {
        config.checker.status = false;
    }

    if cli.listing {
        println!("{}", build_listing(&cli.references));
        return Ok(());
    }

    let mut session = StandardSession::new(config)?;
    for reference in &cli.references {
        session.enqueue_seed(reference);
    }

    if cli.dry_run {
        handle_dry_run(&session);
        return Ok(());
    }

    let outcome = run_checks(&mut session).context("check run failed")?;
    tracing::info!("Run finished: {:?}", outcome);

    if session.totals().problems() > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkscout=info,warn"),
            1 => EnvFilter::new("linkscout=debug,info"),
            2 => EnvFilter::new("linkscout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: classification and scope, no checking
fn handle_dry_run(session: &StandardSession) {
    println!("=== Linkscout Dry Run ===\n");

    let (intern_rules, extern_rules) = session.scope().rule_counts();
    println!(
        "Scope rules: {} intern, {} extern\n",
        intern_rules, extern_rules
    );

    for reference in session.pending() {
        println!(
            "  {:8} {:7} depth {}  {}",
            reference.kind().label(),
            session.scope().classify(reference.target()).to_string(),
            reference.depth(),
            reference.target()
        );
    }

    println!("\n✓ {} references queued", session.pending().count());
}
