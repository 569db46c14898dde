//! # leaven command line
//!
//! ```bash
//! leaven check --recipe tidy.json
//! leaven bake --recipe tidy.json --input shows.csv --prepare train.csv --output baked.csv
//! ```
//!
//! Settings are read from `leaven.json` (or `--config` / `LEAVEN_CONFIG`) when present.
//! `RUST_LOG` overrides the configured log level.

#![warn(clippy::all, rust_2018_idioms)]
#![expect(clippy::print_stdout)] // Allow println! in main binary

mod cli;

use anyhow::Result;
use clap::Parser as _;
use leaven::config::Settings;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    let settings = Settings::load(&cli.config)?;
    leaven::logging::init(&settings.logging)?;

    cli::run_command(cli.command, &settings)
}
