// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! BackupCoordinator (§4.6): the four one-shot backup/restore signals. A
//! caller registers for a signal and gets back a delayed reply handle; the
//! synchronizer resolves it once drain (backupStart/restoreStart) or resume
//! (backupDone/restoreDone) has completed, via `Effect::ResolveBackupReply`.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use syncd_core::BackupReplyKind;

#[derive(Default)]
pub struct BackupCoordinator {
    pending: Mutex<HashMap<BackupReplyKind, Vec<oneshot::Sender<()>>>>,
}

impl BackupCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register interest in `kind`'s completion, returning the receiver half
    /// of a delayed reply. The orchestrator holds the reply handle (per the
    /// D-Bus-delayed-reply design note) until `resolve` is called.
    pub fn register(&self, kind: BackupReplyKind) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().entry(kind).or_default().push(tx);
        rx
    }

    /// Resolve every reply currently registered for `kind`.
    pub fn resolve(&self, kind: BackupReplyKind) {
        if let Some(senders) = self.pending.lock().remove(&kind) {
            for tx in senders {
                let _ = tx.send(());
            }
        }
    }

    /// Whether anything is still waiting on `kind`.
    pub fn has_pending(&self, kind: BackupReplyKind) -> bool {
        self.pending.lock().get(&kind).is_some_and(|v| !v.is_empty())
    }
}

#[cfg(test)]
#[path = "backup_tests.rs"]
mod tests;
