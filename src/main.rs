#[macro_use]
extern crate huffpack;
extern crate anyhow;
extern crate clap;
extern crate serde;
extern crate serde_json;
extern crate thiserror;

if_tracing! {
    use tracing_subscriber::{EnvFilter, fmt};
}

use std::process;

use crate::cli::Cli;
use clap::Parser;

mod cli;

fn main() {
    if_tracing! {
        let subscriber = fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_target(false)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }

    let cli = Cli::parse();
    if let Err(err) = cli::execute_command(cli) {
        if_tracing! {
            tracing::error!(event = "command_failed", error = %err, "command failed");
        }
        eprintln!("error: {}", err);
        process::exit(1);
    }
}
