//! Error taxonomy for the display core.
//!
//! Transient I/O failures are recovered locally (last-good snapshot plus a
//! reachability flag) and never propagate as a crash; everything else in this
//! crate reports through return values rather than errors.

use std::time::Duration;

use thiserror::Error;

/// Why a backend poll attempt produced no snapshot.
#[derive(Debug, Error)]
pub enum PollError {
    /// Transport-level failure: connection refused, DNS, reset.
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    /// The poll attempt exceeded its per-request timeout.
    #[error("poll timed out after {0:?}")]
    Timeout(Duration),

    /// The response body was not valid JSON at all.
    #[error("malformed snapshot payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The payload parsed but was not the expected printer array.
    #[error("unexpected snapshot shape: {0}")]
    UnexpectedShape(&'static str),
}
