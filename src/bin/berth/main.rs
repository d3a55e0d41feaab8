//! Berth CLI - install and self-test prebuilt include-what-you-use bundles

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use berth::installer::InstallError;
use berth::resolver::ResolveError;
use berth::toolchain::ToolchainError;
use berth::util::diagnostic::{emit, Diagnostic};
use berth::verify::VerifyError;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli) {
        match diagnostic_for(&e) {
            Some(diag) => emit(&diag, color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

/// The structured diagnostic of the first known error in the chain.
fn diagnostic_for(error: &anyhow::Error) -> Option<Diagnostic> {
    error.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<ToolchainError>() {
            Some(e.to_diagnostic())
        } else if let Some(e) = cause.downcast_ref::<InstallError>() {
            Some(e.to_diagnostic())
        } else if let Some(e) = cause.downcast_ref::<VerifyError>() {
            Some(e.to_diagnostic())
        } else {
            cause.downcast_ref::<ResolveError>().map(ResolveError::to_diagnostic)
        }
    })
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("berth=debug")
    } else {
        EnvFilter::new("berth=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Install(args) => commands::install::execute(args, cli.verbose),
        Commands::Plan(args) => commands::plan::execute(args),
        Commands::Verify(args) => commands::verify::execute(args, cli.verbose),
        Commands::Toolchain(args) => commands::toolchain::execute(args),
        Commands::Releases(args) => commands::releases::execute(args),
        Commands::Doctor(args) => commands::doctor::execute(args, cli.verbose),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
