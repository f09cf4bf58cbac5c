// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Document Submitter
//!
//! Submits one document to the registry `--count` times, concurrently, while
//! keeping to the configured request quota. Submissions over quota wait for
//! the next window; Ctrl-C abandons every submission still waiting.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables (a `.env` file is
//! honoured):
//!
//! - `REGISTRY_URL`: document creation endpoint
//! - `REQUEST_LIMIT`: submissions per window (default: 5)
//! - `TIME_UNIT`: window length, one unit of it (default: minutes)
//! - `MAX_WAIT_MS`: maximum wait for a slot (default: unbounded)
//! - `REQUEST_TIMEOUT_SECS`: HTTP timeout (default: 30)

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use document_submitter::{Config, Document, RegistryClient, SubmitError};

#[derive(Parser)]
#[command(
    name = "document-submitter",
    about = "Submit documents to the registry within its request quota"
)]
struct Args {
    /// JSON file holding the document (an empty document when omitted)
    #[arg(long)]
    document: Option<PathBuf>,

    /// Document signature sent in the Signature header
    #[arg(long)]
    signature: String,

    /// How many times to submit the document
    #[arg(long, default_value_t = 1)]
    count: usize,
}

#[derive(Debug, Default)]
struct Summary {
    created: usize,
    rejected: usize,
    cancelled: usize,
    failed: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Before the subscriber, so RUST_LOG may come from `.env`.
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let args = Args::parse();
    let config = Config::from_env();

    let document = load_document(args.document.as_ref())?;
    let client = Arc::new(RegistryClient::new(&config).context("invalid configuration")?);

    info!(
        registry = %client.endpoint(),
        request_limit = config.rate_limit.request_limit,
        time_unit = %config.rate_limit.time_unit,
        max_wait_ms = ?config.rate_limit.max_wait_ms,
        count = args.count,
        "Starting document submitter"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, abandoning waiting submissions");
            let _ = shutdown_tx.send(true);
        }
    });

    let document = Arc::new(document);
    let signature: Arc<str> = args.signature.into();
    let handles: Vec<_> = (0..args.count)
        .map(|attempt| {
            let client = client.clone();
            let document = document.clone();
            let signature = signature.clone();
            let mut shutdown = shutdown_rx.clone();
            tokio::spawn(async move {
                let interrupted = async move {
                    let _ = shutdown.wait_for(|stop| *stop).await;
                };
                let result = client
                    .create_document_until(&document, &signature, interrupted)
                    .await;
                (attempt, result)
            })
        })
        .collect();

    let mut summary = Summary::default();
    for handle in handles {
        let (attempt, result) = handle.await.context("submission task panicked")?;
        match result {
            Ok(_) => summary.created += 1,
            Err(SubmitError::Rejected { .. }) => summary.rejected += 1,
            Err(e) if e.is_cancelled() => summary.cancelled += 1,
            Err(e) => {
                error!(attempt, error = %e, "Submission failed");
                summary.failed += 1;
            }
        }
    }

    info!(
        created = summary.created,
        rejected = summary.rejected,
        cancelled = summary.cancelled,
        failed = summary.failed,
        "Done"
    );

    Ok(())
}

fn load_document(path: Option<&PathBuf>) -> anyhow::Result<Document> {
    let Some(path) = path else {
        return Ok(Document::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading document {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing document {}", path.display()))
}
