use anyhow::{Context, Result};
use clic::{Cli, ParseError};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<ExitCode> {
    init_tracing();

    let mut cli = Cli::new("mycli", "A simple CLI tool built with clic", "1.0.0");
    cli.flag("-t", "Test flag to verify it works", || {
        println!("This is working!");
    })
    .flag_with_value("-n", "Set your name", |name| {
        println!("Hello, {name}!");
    })
    .flag_with_value("-p", "Set port number", |port| {
        println!("Port set to: {port}");
    });

    match cli.parse() {
        Ok(outcome) => {
            tracing::debug!(?outcome, "parse finished");
            Ok(ExitCode::SUCCESS)
        }
        Err(ParseError::Io(err)) => Err(err).context("failed to write to stdout"),
        // The diagnostic is already on stdout.
        Err(err) => {
            tracing::debug!(error = %err, "parse stopped");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
