//! `uamp-sim`: run a trace-driven app-preloading simulation from the
//! command line.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use uamp_sim_config::CliArgs;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = CliArgs::parse();

    if let Err(err) = uamp_sim_runner::run(args) {
        tracing::error!(error = %err, "simulation run failed");
        std::process::exit(1);
    }
}
