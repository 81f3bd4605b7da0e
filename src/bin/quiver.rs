// src/bin/quiver.rs

use clap::Parser;
use colored::*;
use quiver::cli::{Cli, dispatcher};

/// The main entry point of the `quiver` application.
/// It sets up logging, parses arguments, dispatches, and performs centralized error handling.
#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = dispatcher::dispatch(Cli::parse()).await {
        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}
