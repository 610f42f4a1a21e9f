// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Upload responses: transaction spreadsheets and prize images.

use serde::{Deserialize, Serialize};

/// Tallies returned after the server processes a transaction spreadsheet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResult {
    #[serde(default)]
    pub updated_count: u64,
    #[serde(default)]
    pub not_found_count: u64,
    #[serde(default)]
    pub total_processed: u64,
    #[serde(default)]
    pub error_records: Vec<ErrorRecord>,
}

/// A spreadsheet row the server could not apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Spreadsheet row number (header is row 1)
    pub row: u64,
    pub kuaishou_id: String,
    pub reason: String,
}

/// Stored image location returned by `POST /admin/upload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUpload {
    pub url: String,
    #[serde(default)]
    pub filename: Option<String>,
}
