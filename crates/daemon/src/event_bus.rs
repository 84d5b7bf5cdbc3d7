// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event bus for daemon communication.
//!
//! The EventBus writes events to WAL before they are considered durable.
//! Events are buffered in memory and periodically flushed to disk (~10ms
//! durability window). Unlike a delivery queue, nothing reads events back
//! out to drive further processing here: by the time an event reaches this
//! bus, `Synchronizer` has already applied it to `MaterializedState` and
//! this bus exists purely so a crash can replay it on restart.

use std::sync::Arc;

use parking_lot::Mutex;
use syncd_core::Event;
use syncd_storage::{Wal, WalEntry, WalError};
use tokio::sync::mpsc;

/// Event bus backed by WAL.
#[derive(Clone)]
pub struct EventBus {
    wal: Arc<Mutex<Wal>>,
    wake_tx: mpsc::Sender<()>,
}

/// Reader for the event bus, used only to drain entries so WAL truncation
/// bookkeeping (`processed_seq`) advances.
pub struct EventReader {
    wal: Arc<Mutex<Wal>>,
    wake_rx: mpsc::Receiver<()>,
}

impl EventBus {
    /// Create a new event bus backed by the given WAL.
    pub fn new(wal: Wal) -> (Self, EventReader) {
        let wal = Arc::new(Mutex::new(wal));
        let (wake_tx, wake_rx) = mpsc::channel(1);

        (Self { wal: Arc::clone(&wal), wake_tx }, EventReader { wal, wake_rx })
    }

    /// Append event to WAL (buffered, not yet durable).
    pub fn send(&self, event: Event) -> Result<u64, WalError> {
        let seq = {
            let mut wal = self.wal.lock();
            wal.append(&event)?
        };
        let _ = self.wake_tx.try_send(());
        Ok(seq)
    }

    /// Flush WAL to disk with a single fsync — the durability point for
    /// all buffered events.
    pub fn flush(&self) -> Result<(), WalError> {
        self.wal.lock().flush()
    }

    /// Check if WAL needs flushing (interval elapsed or buffer full).
    pub fn needs_flush(&self) -> bool {
        self.wal.lock().needs_flush()
    }

    /// Return the last processed WAL sequence number.
    pub fn processed_seq(&self) -> u64 {
        self.wal.lock().processed_seq()
    }
}

impl EventReader {
    /// Wait for and return the next unprocessed entry.
    ///
    /// Returns `None` when the bus is closed (all senders dropped).
    pub async fn recv(&mut self) -> Result<Option<WalEntry>, WalError> {
        loop {
            {
                let mut wal = self.wal.lock();
                if let Some(entry) = wal.next_unprocessed()? {
                    return Ok(Some(entry));
                }
            }

            if self.wake_rx.recv().await.is_none() {
                return Ok(None);
            }
        }
    }

    /// Mark an entry as processed.
    pub fn mark_processed(&self, seq: u64) {
        self.wal.lock().mark_processed(seq);
    }

    /// Get a clone of the WAL Arc for sharing (checkpoint task truncation).
    pub fn wal(&self) -> Arc<Mutex<Wal>> {
        Arc::clone(&self.wal)
    }
}
