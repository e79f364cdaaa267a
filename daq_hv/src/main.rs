//! # daqcore HV Control Console
//!
//! Interactive console applying control verbs across the configured
//! crate → slot → channel hierarchy.
//!
//! # Usage
//!
//! ```bash
//! # Run against the default configuration
//! daq_hv
//!
//! # Explicit configuration, verbose logging
//! daq_hv --config config/hv.toml -v
//!
//! # JSON logs for ingestion
//! daq_hv --config config/hv.toml --json
//! ```

#![deny(warnings)]

use clap::Parser;
use daq::config::ConfigLoader;
use daq_hv::{HvConfig, HvControlMaster};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

/// daqcore HV control - uniform command dispatch over HV crates
#[derive(Parser, Debug)]
#[command(name = "daq_hv")]
#[command(version)]
#[command(about = "High-voltage crate/slot/channel control console")]
#[command(long_about = None)]
struct Args {
    /// Path to the HV configuration file (hv.toml).
    #[arg(short, long, default_value = "/etc/daq/hv.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() {
    if let Err(e) = run() {
        error!("HV console failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    setup_tracing(&args);

    info!("daq_hv v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = HvConfig::load(&args.config)?;
    config.validate()?;
    info!(
        crates = config.crates.len(),
        store = %config.store_dir.display(),
        "configuration loaded"
    );

    let mut master = HvControlMaster::from_config(&config)?;

    let running = Arc::new(AtomicBool::new(true));
    let running_handler = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        running_handler.store(false, Ordering::SeqCst);
    })?;

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    for line in stdin.lock().lines() {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        let line = line?;

        match master.execute_line(&line) {
            Ok(outcome) => {
                for text in &outcome.output {
                    writeln!(stdout, "{text}")?;
                }
                if outcome.quit {
                    break;
                }
                if outcome.matched > 0 {
                    writeln!(stdout, "ok ({} channels)", outcome.matched)?;
                }
            }
            Err(e) => writeln!(stdout, "error: {e}")?,
        }
        stdout.flush()?;
    }

    info!("daq_hv shutdown complete");
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
