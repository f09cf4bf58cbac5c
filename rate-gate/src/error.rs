// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Errors raised by the rate gate.

use thiserror::Error;

/// Gate error types.
///
/// Saturation is never an error: a saturated gate suspends its callers.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    /// The window configuration cannot be enforced. Fatal for the instance.
    #[error("invalid gate configuration: {0}")]
    InvalidConfig(&'static str),

    /// The caller's cancellation signal fired before a slot was reserved.
    #[error("acquire cancelled before a slot became available")]
    Cancelled,
}
