// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! syncdctl - control and query the sync orchestration daemon

mod client;
mod client_lifecycle;
mod color;
mod commands;
mod daemon_process;
mod env;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::daemon::{self, DaemonArgs};
use commands::sync::{self, SyncArgs};
use output::OutputFormat;

use crate::client::DaemonClient;

#[derive(Parser)]
#[command(
    name = "syncdctl",
    version,
    about = "Control and query the sync orchestration daemon",
    styles = color::styles()
)]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Daemon lifecycle: start, stop, restart, status, logs
    Daemon(DaemonArgs),
    /// Show daemon status (shorthand for `daemon status`)
    Status,
    /// Check whether the daemon is reachable
    Ping,
    /// Profile and session operations (start, abort, connectivity, backup, ...)
    Sync(SyncArgs),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Daemon(args) => daemon::daemon(args, cli.output).await,
        Commands::Status => daemon::status(cli.output).await,
        Commands::Ping => {
            let client = DaemonClient::for_query()?;
            client.ping().await?;
            println!("pong");
            Ok(())
        }
        Commands::Sync(args) => {
            let client = DaemonClient::for_action()?;
            sync::handle(args.command, &client).await
        }
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
