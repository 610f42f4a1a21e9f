// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Display state for a processed transaction spreadsheet.

use crate::models::{ErrorRecord, UploadResult};

/// Error rows shown before the list is expanded.
pub const ERROR_PREVIEW_LEN: usize = 5;

#[derive(Debug, Clone)]
pub struct UploadReport {
    result: UploadResult,
    expanded: bool,
}

impl UploadReport {
    pub fn new(result: UploadResult) -> Self {
        Self {
            result,
            expanded: false,
        }
    }

    pub fn result(&self) -> &UploadResult {
        &self.result
    }

    /// `round(updated / total * 100)`, or 0 for an empty sheet.
    pub fn success_rate(&self) -> u32 {
        if self.result.total_processed == 0 {
            return 0;
        }
        let rate = self.result.updated_count as f64 / self.result.total_processed as f64 * 100.0;
        rate.round() as u32
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn expand(&mut self) {
        self.expanded = true;
    }

    pub fn collapse(&mut self) {
        self.expanded = false;
    }

    pub fn visible_errors(&self) -> &[ErrorRecord] {
        let records = &self.result.error_records;
        if self.expanded {
            records
        } else {
            &records[..records.len().min(ERROR_PREVIEW_LEN)]
        }
    }

    /// Error rows hidden by the preview.
    pub fn hidden_count(&self) -> usize {
        self.result.error_records.len() - self.visible_errors().len()
    }
}
