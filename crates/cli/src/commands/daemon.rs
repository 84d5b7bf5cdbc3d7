// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `syncdctl daemon` — daemon lifecycle commands.

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};

use crate::client::{ClientError, DaemonClient};
use crate::client_lifecycle::daemon_stop;
use crate::daemon_process::{daemon_dir, find_syncd_binary};
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: Option<DaemonCommand>,
}

#[derive(Debug, Subcommand)]
pub enum DaemonCommand {
    /// Start the daemon (background by default)
    Start {
        /// Run in the foreground instead of detaching
        #[arg(long)]
        foreground: bool,
    },
    /// Stop the daemon
    Stop,
    /// Check daemon status
    Status,
    /// Stop and restart the daemon
    Restart,
    /// Show the tail of the daemon's log file
    Logs {
        /// Number of recent lines to show
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
}

pub async fn daemon(args: DaemonArgs, format: OutputFormat) -> Result<()> {
    match args.command {
        Some(DaemonCommand::Start { foreground }) => start(foreground).await,
        Some(DaemonCommand::Stop) => stop().await,
        Some(DaemonCommand::Restart) => restart().await,
        Some(DaemonCommand::Status) | None => status(format).await,
        Some(DaemonCommand::Logs { limit }) => logs(limit),
    }
}

async fn start(foreground: bool) -> Result<()> {
    if foreground {
        let syncd_path = find_syncd_binary()?;
        let status = std::process::Command::new(&syncd_path).status()?;
        if !status.success() {
            return Err(anyhow!("daemon exited with status: {}", status));
        }
        return Ok(());
    }

    if DaemonClient::connect().is_ok() {
        println!("daemon already running");
        return Ok(());
    }

    let _client = DaemonClient::for_action()?;
    println!("daemon started");
    Ok(())
}

async fn stop() -> Result<()> {
    if daemon_stop().await? {
        println!("daemon stopped");
    } else {
        println!("daemon not running");
    }
    Ok(())
}

async fn restart() -> Result<()> {
    daemon_stop().await?;
    let _client = DaemonClient::for_action()?;
    println!("daemon restarted");
    Ok(())
}

pub async fn status(format: OutputFormat) -> Result<()> {
    let client = match DaemonClient::connect() {
        Ok(c) => c,
        Err(ClientError::DaemonNotRunning) => return print_not_running(format),
        Err(e) => return Err(e.into()),
    };

    let status = client.status().await?;
    match format {
        OutputFormat::Text => {
            println!("version:            {}", status.version);
            println!("uptime:              {}s", status.uptime_secs);
            println!("profiles:            {}", status.profile_count);
            println!("active sessions:     {}", status.active_sessions);
            println!("queued sessions:     {}", status.queued_sessions);
            println!("backup active:       {}", status.backup_active);
            println!("waiting for online:  {}", status.waiting_for_online);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status)?),
    }
    Ok(())
}

fn print_not_running(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("daemon not running"),
        OutputFormat::Json => println!(r#"{{ "status": "not_running" }}"#),
    }
    Ok(())
}

fn logs(limit: usize) -> Result<()> {
    let log_path = daemon_dir()?.join("syncd.log");
    let content = std::fs::read_to_string(&log_path).unwrap_or_default();
    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(limit);
    for line in &lines[start..] {
        println!("{}", line);
    }
    Ok(())
}

#[cfg(test)]
#[path = "daemon_tests.rs"]
mod tests;
