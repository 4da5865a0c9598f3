//! Entry point for `arq-sim`.
//!
//! Parses CLI arguments and runs one session either as a discrete-event
//! simulation or paced in real time.  All protocol work is delegated to the
//! library; `main.rs` owns only process setup (logging, signal handling,
//! argument parsing) and the final summary.

use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};

use arq::channel::FaultConfig;
use arq::{realtime, ArqConfig, Policy, Report, Simulator, SimulatorConfig};

/// Go-Back-N / Selective Repeat over a simulated unreliable channel.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Run as fast as possible on a simulated clock.
    Simulate(RunArgs),
    /// Pace the run in real time (one time unit = 1 ms).
    Realtime(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Retransmission policy: `gbn` or `sr`.
    #[arg(short, long, default_value = "gbn")]
    policy: Policy,
    /// Number of messages the upper layer submits.
    #[arg(short = 'n', long, default_value_t = 20)]
    messages: usize,
    /// Probability that a packet is lost.
    #[arg(long, default_value_t = 0.0)]
    loss: f64,
    /// Probability that a packet is corrupted.
    #[arg(long, default_value_t = 0.0)]
    corrupt: f64,
    /// Mean time between messages, in time units.
    #[arg(long, default_value_t = 20)]
    interval: u64,
    /// Seed for the channel and message timing.
    #[arg(long, default_value_t = 1234)]
    seed: u64,
}

impl RunArgs {
    fn build(&self) -> Result<Simulator> {
        let config = SimulatorConfig {
            messages: self.messages,
            mean_interval: Duration::from_millis(self.interval),
            faults: FaultConfig {
                loss_rate: self.loss,
                corrupt_rate: self.corrupt,
            },
            seed: self.seed,
            ..SimulatorConfig::default()
        };
        Ok(Simulator::new(ArqConfig::new(self.policy), config)?)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialise env_logger; set RUST_LOG to control verbosity.
    env_logger::init();

    let cli = Cli::parse();

    let report = match cli.mode {
        Mode::Simulate(args) => args.build()?.run(),
        Mode::Realtime(args) => {
            let mut sim = args.build()?;
            tokio::select! {
                _ = realtime::run(&mut sim) => {}
                _ = tokio::signal::ctrl_c() => log::warn!("interrupted"),
            }
            sim.finish()
        }
    };

    print_summary(&report);
    if !report.is_exactly_once_in_order() {
        bail!(
            "delivery mismatch: {} accepted, {} delivered",
            report.accepted.len(),
            report.delivered.len()
        );
    }
    Ok(())
}

fn print_summary(report: &Report) {
    println!("{} finished at t={:?}", report.policy, report.finished_at);
    println!(
        "{} accepted, {} delivered{}",
        report.accepted.len(),
        report.delivered.len(),
        if report.completed { "" } else { " (incomplete)" }
    );
    print!("{}", report.stats);
}
