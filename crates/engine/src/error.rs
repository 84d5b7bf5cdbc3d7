// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine runtime

use thiserror::Error;

use crate::executor::ExecuteError;

/// Errors that can occur in the runtime
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("execute error: {0}")]
    Execute(#[from] ExecuteError),
    #[error("alarm store error: {0}")]
    AlarmStore(#[from] syncd_storage::AlarmStoreError),
    #[error("unknown profile: {0}")]
    UnknownProfile(String),
    #[error("unknown session: {0}")]
    UnknownSession(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
