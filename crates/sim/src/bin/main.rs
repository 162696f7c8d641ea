//! CSMA/CD simulator CLI.
//!
//! Runs a contention scenario to completion and prints the resolved
//! timeline. Single-threaded, reproducible when the same seed is used.
//!
//! # Example
//!
//! ```bash
//! # Reproduce the reference three-peer run
//! csma-sim --seed 1337
//!
//! # Five contending peers, JSON report
//! csma-sim --peers 5 --json
//! ```

use clap::Parser;
use csma_sim::{RunReport, Scenario};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// CSMA/CD shared-medium simulator.
#[derive(Parser, Debug)]
#[command(name = "csma-sim")]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of contending peers
    #[arg(short = 'p', long, default_value = "3")]
    peers: usize,

    /// Random seed for reproducible runs. When omitted, a random seed is used.
    #[arg(long)]
    seed: Option<u64>,

    /// Emit the run report as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,csma_sim=info,csma_engine=info")),
        )
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    info!(peers = args.peers, seed, "starting simulation");

    let mut channel = match Scenario::with_peers(args.peers, seed).build() {
        Ok(channel) => channel,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    channel.run_to_completion();
    let report = RunReport::from_channel(&channel);

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("error: {err}");
                std::process::exit(1);
            }
        }
    } else {
        print!("{report}");
    }
}
