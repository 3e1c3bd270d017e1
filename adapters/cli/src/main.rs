#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Tilebound movement scenarios.

mod scenario;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use scenario::Scenario;

/// Plays a scripted movement scenario and prints where everything ended up.
#[derive(Debug, Parser)]
#[command(name = "tilebound", version)]
struct Cli {
    /// Scenario file describing the area, the actor and its script.
    #[arg(long)]
    scenario: PathBuf,
    /// Tracing filter directives; overrides `RUST_LOG`.
    #[arg(long)]
    log_filter: Option<String>,
}

/// Entry point for the Tilebound command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_filter.as_deref())?;

    let scenario = Scenario::load(&cli.scenario)?;
    let report = scenario.run()?;
    println!("{report}");
    Ok(())
}

fn init_tracing(directives: Option<&str>) -> Result<()> {
    let filter = match directives {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter `{directives}`"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}
