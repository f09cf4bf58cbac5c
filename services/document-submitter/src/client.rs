// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Registry client.
//!
//! Every submission passes through the rate gate exactly once before the
//! HTTP request is made. The gate is unaware of the HTTP outcome.

use crate::config::Config;
use crate::document::Document;
use crate::error::{Result, SubmitError};
use rate_gate::RateGate;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

/// Header carrying the document signature.
pub const SIGNATURE_HEADER: &str = "Signature";

/// Registry response for a created document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedDocument {
    pub status: u16,
    pub body: String,
}

/// Rate-limited registry API client.
pub struct RegistryClient {
    endpoint: Url,
    http: reqwest::Client,
    gate: RateGate,
    max_wait: Option<Duration>,
}

impl RegistryClient {
    /// Create a client with its own gate built from `config.rate_limit`.
    pub fn new(config: &Config) -> Result<Self> {
        let gate = RateGate::new(
            config.rate_limit.request_limit,
            config.rate_limit.window_duration(),
        )?;
        Self::with_gate(config, gate)
    }

    /// Create a client that draws from an existing gate.
    ///
    /// Clients sharing a gate share one quota.
    pub fn with_gate(config: &Config, gate: RateGate) -> Result<Self> {
        let endpoint = Url::parse(&config.registry.url)?;
        let http = reqwest::Client::builder()
            .timeout(config.registry.request_timeout())
            .build()?;

        Ok(Self {
            endpoint,
            http,
            gate,
            max_wait: config.rate_limit.max_wait(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn gate(&self) -> &RateGate {
        &self.gate
    }

    /// Submit a document, waiting for a rate slot for at most the configured `max_wait`.
    pub async fn create_document(
        &self,
        document: &Document,
        signature: &str,
    ) -> Result<CreatedDocument> {
        self.create_document_until(document, signature, std::future::pending())
            .await
    }

    /// Submit a document, giving up the wait for a rate slot when `cancel`
    /// completes or the configured `max_wait` elapses, whichever comes first.
    pub async fn create_document_until<F>(
        &self,
        document: &Document,
        signature: &str,
        cancel: F,
    ) -> Result<CreatedDocument>
    where
        F: Future<Output = ()>,
    {
        let max_wait = self.max_wait;
        let bounded = async move {
            match max_wait {
                Some(max_wait) => tokio::select! {
                    () = cancel => {}
                    () = tokio::time::sleep(max_wait) => {}
                },
                None => cancel.await,
            }
        };
        self.create_document_with(document, signature, bounded).await
    }

    /// Submit a document, abandoning the wait for a rate slot once `cancel` completes.
    ///
    /// Cancellation only applies while waiting on the gate; once admitted the
    /// request runs to completion.
    pub async fn create_document_with<F>(
        &self,
        document: &Document,
        signature: &str,
        cancel: F,
    ) -> Result<CreatedDocument>
    where
        F: Future<Output = ()>,
    {
        self.gate.acquire_with(cancel).await?;
        self.post(document, signature).await
    }

    async fn post(&self, document: &Document, signature: &str) -> Result<CreatedDocument> {
        let body = serde_json::to_string(document)?;
        debug!(
            endpoint = %self.endpoint,
            doc_id = ?document.doc_id,
            bytes = body.len(),
            "Posting document"
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(SIGNATURE_HEADER, signature)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::OK {
            info!(status = status.as_u16(), doc_id = ?document.doc_id, "Document created");
            Ok(CreatedDocument {
                status: status.as_u16(),
                body,
            })
        } else {
            error!(status = status.as_u16(), doc_id = ?document.doc_id, "Registry rejected document");
            Err(SubmitError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}
