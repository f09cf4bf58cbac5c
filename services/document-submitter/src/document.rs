// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Document payload accepted by the registry's create endpoint.
//!
//! Field names follow the registry's JSON exactly, including its mix of
//! snake_case and camelCase keys.

use serde::{Deserialize, Serialize};

/// A document to register.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub description: Option<Description>,
    #[serde(default)]
    pub doc_id: Option<String>,
    #[serde(default)]
    pub doc_status: Option<String>,
    #[serde(default)]
    pub doc_type: Option<String>,
    #[serde(rename = "importRequest", default)]
    pub import_request: bool,
    #[serde(default)]
    pub owner_inn: Option<String>,
    #[serde(default)]
    pub participant_inn: Option<String>,
    #[serde(default)]
    pub producer_inn: Option<String>,
    #[serde(default)]
    pub production_date: Option<String>,
    #[serde(default)]
    pub production_type: Option<String>,
    #[serde(default)]
    pub products: Option<Vec<Product>>,
    #[serde(default)]
    pub reg_date: Option<String>,
    #[serde(default)]
    pub reg_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Description {
    #[serde(rename = "participantInn", default)]
    pub participant_inn: Option<String>,
}

/// One marked product line within a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub certificate_document: Option<String>,
    #[serde(default)]
    pub certificate_document_date: Option<String>,
    #[serde(default)]
    pub certificate_document_number: Option<String>,
    #[serde(default)]
    pub owner_inn: Option<String>,
    #[serde(default)]
    pub producer_inn: Option<String>,
    #[serde(default)]
    pub production_date: Option<String>,
    #[serde(default)]
    pub tnved_code: Option<String>,
    #[serde(default)]
    pub uit_code: Option<String>,
    #[serde(default)]
    pub uitu_code: Option<String>,
}
