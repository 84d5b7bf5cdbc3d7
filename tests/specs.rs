//! Behavioral specifications for `syncd`/`syncdctl`.
//!
//! Black-box: each test invokes the real daemon and CLI binaries and
//! verifies stdout, stderr, and exit codes.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/cli.rs"]
mod cli;

#[path = "specs/daemon_lifecycle.rs"]
mod daemon_lifecycle;

#[path = "specs/sync_ops.rs"]
mod sync_ops;
