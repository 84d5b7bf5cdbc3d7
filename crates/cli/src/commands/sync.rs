// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `syncdctl` profile and session operations — the thin commands that turn
//! into a single `Request` sent to the daemon.

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};

use syncd_core::{BackupReplyKind, InternetType, MinorCode, ProfileChangeKind, SyncStatus};

use crate::client::DaemonClient;

#[derive(Debug, Args)]
pub struct SyncArgs {
    #[command(subcommand)]
    pub command: SyncCommand,
}

#[derive(Debug, Subcommand)]
pub enum SyncCommand {
    /// Start a sync session for a profile, as if the user asked for it
    Start { profile: String },
    /// Start a sync session for a profile as a scheduled (background) run
    StartScheduled { profile: String },
    /// Abort an in-progress sync session for a profile
    Abort { profile: String },
    /// Report that a plugin session finished
    SessionFinished {
        session_id: String,
        #[arg(value_enum)]
        status: StatusArg,
        #[arg(long)]
        message: Option<String>,
        /// Minor code: one of the known names, or any other string for a
        /// plugin-specific code
        #[arg(long)]
        minor_code: Option<String>,
    },
    /// Notify the daemon that a profile was added, modified, or removed
    ProfileChanged {
        profile: String,
        #[arg(value_enum)]
        kind: ProfileChangeKindArg,
    },
    /// Notify the daemon of a connectivity change
    ConnectivityChanged {
        #[arg(long)]
        online: bool,
        #[arg(long, value_enum, default_value_t = InternetTypeArg::Unknown)]
        internet_type: InternetTypeArg,
    },
    /// Tell the daemon a backup is starting
    BackupStart {
        #[arg(value_enum)]
        kind: BackupKindArg,
    },
    /// Tell the daemon a backup has finished
    BackupFinish {
        #[arg(value_enum)]
        kind: BackupKindArg,
    },
    /// Ask the daemon to re-evaluate a profile's external-sync status
    RefreshExternalSync {
        profile: String,
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StatusArg {
    Queued,
    Started,
    Progress,
    Stopping,
    Done,
    Aborted,
    Cancelled,
    Error,
    NotPossible,
}

impl From<StatusArg> for SyncStatus {
    fn from(v: StatusArg) -> Self {
        match v {
            StatusArg::Queued => SyncStatus::Queued,
            StatusArg::Started => SyncStatus::Started,
            StatusArg::Progress => SyncStatus::Progress,
            StatusArg::Stopping => SyncStatus::Stopping,
            StatusArg::Done => SyncStatus::Done,
            StatusArg::Aborted => SyncStatus::Aborted,
            StatusArg::Cancelled => SyncStatus::Cancelled,
            StatusArg::Error => SyncStatus::Error,
            StatusArg::NotPossible => SyncStatus::NotPossible,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ProfileChangeKindArg {
    Added,
    Modified,
    Removed,
}

impl From<ProfileChangeKindArg> for ProfileChangeKind {
    fn from(v: ProfileChangeKindArg) -> Self {
        match v {
            ProfileChangeKindArg::Added => ProfileChangeKind::Added,
            ProfileChangeKindArg::Modified => ProfileChangeKind::Modified,
            ProfileChangeKindArg::Removed => ProfileChangeKind::Removed,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum InternetTypeArg {
    Wifi,
    Ethernet,
    Cellular,
    Unknown,
}

impl From<InternetTypeArg> for InternetType {
    fn from(v: InternetTypeArg) -> Self {
        match v {
            InternetTypeArg::Wifi => InternetType::Wifi,
            InternetTypeArg::Ethernet => InternetType::Ethernet,
            InternetTypeArg::Cellular => InternetType::Cellular,
            InternetTypeArg::Unknown => InternetType::Unknown,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum BackupKindArg {
    BackupStart,
    BackupDone,
    RestoreStart,
    RestoreDone,
}

impl From<BackupKindArg> for BackupReplyKind {
    fn from(v: BackupKindArg) -> Self {
        match v {
            BackupKindArg::BackupStart => BackupReplyKind::BackupStart,
            BackupKindArg::BackupDone => BackupReplyKind::BackupDone,
            BackupKindArg::RestoreStart => BackupReplyKind::RestoreStart,
            BackupKindArg::RestoreDone => BackupReplyKind::RestoreDone,
        }
    }
}

/// Parse a minor code: recognized names map to their variant, anything else
/// becomes a plugin-reported code passed through unmodified.
fn parse_minor_code(s: &str) -> MinorCode {
    match s {
        "internal-error" => MinorCode::InternalError,
        "aborted" => MinorCode::Aborted,
        "backup-in-progress" => MinorCode::BackupInProgress,
        "offline-mode" => MinorCode::OfflineMode,
        "low-battery-power" => MinorCode::LowBatteryPower,
        "power-saving-mode" => MinorCode::PowerSavingMode,
        other => MinorCode::Plugin(other.to_string()),
    }
}

pub async fn handle(command: SyncCommand, client: &DaemonClient) -> Result<()> {
    match command {
        SyncCommand::Start { profile } => {
            client.start(&profile).await?;
            println!("started {}", profile);
        }
        SyncCommand::StartScheduled { profile } => {
            client.start_scheduled(&profile).await?;
            println!("started (scheduled) {}", profile);
        }
        SyncCommand::Abort { profile } => {
            client.abort(&profile).await?;
            println!("aborted {}", profile);
        }
        SyncCommand::SessionFinished { session_id, status, message, minor_code } => {
            let minor_code = minor_code.as_deref().map(parse_minor_code);
            client.session_finished(&session_id, status.into(), message, minor_code).await?;
        }
        SyncCommand::ProfileChanged { profile, kind } => {
            client.profile_changed(&profile, kind.into()).await?;
        }
        SyncCommand::ConnectivityChanged { online, internet_type } => {
            client.connectivity_changed(online, internet_type.into()).await?;
        }
        SyncCommand::BackupStart { kind } => {
            client.backup_start(kind.into()).await?;
        }
        SyncCommand::BackupFinish { kind } => {
            client.backup_finish(kind.into()).await?;
        }
        SyncCommand::RefreshExternalSync { profile, force } => {
            client.refresh_external_sync(&profile, force).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
