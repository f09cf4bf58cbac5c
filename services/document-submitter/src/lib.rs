// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Document Submitter
//!
//! Posts documents to the marking registry without exceeding the registry's
//! request quota:
//!
//! - At most `request_limit` submissions per one `time_unit` (5 per minute default)
//! - Submissions past the quota wait for the next window, in arrival order
//! - Waiting submissions can be bounded by `max_wait_ms` or cancelled
//! - `Signature` header carries the caller-supplied document signature

pub mod client;
pub mod config;
pub mod document;
pub mod error;

pub use client::{CreatedDocument, RegistryClient};
pub use config::{Config, TimeUnit};
pub use document::{Description, Document, Product};
pub use error::SubmitError;
