//! ## vana-cli
//! **Demo and benchmark driver for the habit index**
//!
//! A thin consumer of the core's five operations: `demo` seeds a few
//! habits and appends entries from worker threads, `bench` times the
//! insert/append/lookup loops. All state lives in the index instance
//! built here from the loaded configuration.

use clap::Parser;
use vana_config::VanaConfig;
use vana_telemetry::logging::EventLogger;

mod commands;
mod error;

use commands::{run_command, Cli};
use error::CliError;

fn main() -> Result<(), CliError> {
    let config = VanaConfig::load()?;
    EventLogger::init_with_default(&config.telemetry.log_level);

    let cli = Cli::parse();
    run_command(cli, config)
}
