// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Transaction spreadsheet import and template download.

use crate::error::AppError;
use crate::models::UploadResult;
use crate::services::api::ApiClient;
use crate::views::forms::check_spreadsheet_name;
use crate::views::query::{QueryCache, QueryKey};
use std::path::{Path, PathBuf};

/// File name the server suggests for the template.
pub const TEMPLATE_FILE_NAME: &str = "积分流水模板.xlsx";

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const XLS_MIME: &str = "application/vnd.ms-excel";

#[derive(Clone)]
pub struct TransactionService {
    api: ApiClient,
    cache: QueryCache,
}

impl TransactionService {
    pub fn new(api: ApiClient, cache: QueryCache) -> Self {
        Self { api, cache }
    }

    /// Upload a spreadsheet of per-user transaction totals.
    ///
    /// Points are recomputed server-side, so the user list is stale after
    /// any successful import.
    pub async fn upload(&self, path: &Path) -> Result<UploadResult, AppError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        check_spreadsheet_name(name)?;

        let mime = if name.to_ascii_lowercase().ends_with(".xls") {
            XLS_MIME
        } else {
            XLSX_MIME
        };
        let result: UploadResult = self
            .api
            .upload_file("/admin/upload-transaction", path, mime)
            .await?
            .into_data()?;

        self.cache.invalidate(QueryKey::Users);
        tracing::info!(
            updated = result.updated_count,
            not_found = result.not_found_count,
            total = result.total_processed,
            "Transaction spreadsheet processed"
        );
        Ok(result)
    }

    /// Download the import template.
    ///
    /// `dest` may be a directory (the default file name is used) or a file
    /// path. Returns where the template was written.
    pub async fn download_template(&self, dest: &Path) -> Result<PathBuf, AppError> {
        let bytes = self.api.get_bytes("/admin/download-template").await?;

        let target = if dest.is_dir() {
            dest.join(TEMPLATE_FILE_NAME)
        } else {
            dest.to_path_buf()
        };
        tokio::fs::write(&target, &bytes)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to write {}: {}", target.display(), e)))?;

        tracing::info!(path = %target.display(), bytes = bytes.len(), "Template downloaded");
        Ok(target)
    }
}
