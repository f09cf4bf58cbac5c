// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for document submission.

use rate_gate::GateError;
use thiserror::Error;

/// Document submission errors.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("rate gate: {0}")]
    Gate(#[from] GateError),

    #[error("invalid registry URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("registry rejected document with HTTP {status}")]
    Rejected { status: u16, body: String },
}

impl SubmitError {
    /// True when the submission gave up waiting for a rate slot.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Gate(GateError::Cancelled))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, SubmitError>;
