// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Prize catalog: public listing, admin management, and image upload.

use crate::error::AppError;
use crate::models::{ImageUpload, Prize};
use crate::services::api::ApiClient;
use crate::views::forms::{check_image, PrizeForm, PrizeUpdate};
use crate::views::query::{QueryCache, QueryKey};
use serde_json::Value;
use std::path::Path;
use validator::Validate;

#[derive(Clone)]
pub struct PrizeService {
    api: ApiClient,
    cache: QueryCache,
    asset_origin: String,
}

impl PrizeService {
    pub fn new(api: ApiClient, cache: QueryCache, asset_origin: &str) -> Self {
        Self {
            api,
            cache,
            asset_origin: asset_origin.trim_end_matches('/').to_string(),
        }
    }

    /// Consumer catalog (`GET /prizes`), with image URLs resolved.
    pub async fn list_catalog(&self) -> Result<Vec<Prize>, AppError> {
        let mut prizes: Vec<Prize> = self.api.get::<Value>("/prizes").await?.into_list()?;
        for prize in &mut prizes {
            prize.image = resolve_image_url(&self.asset_origin, prize.image.as_deref());
        }
        tracing::debug!(count = prizes.len(), "Fetched catalog");
        Ok(prizes)
    }

    /// Admin prize table (`GET /admin/prizes`).
    pub async fn list_admin(&self) -> Result<Vec<Prize>, AppError> {
        let prizes: Vec<Prize> = self.api.get::<Value>("/admin/prizes").await?.into_list()?;
        tracing::debug!(count = prizes.len(), "Fetched admin prizes");
        Ok(prizes)
    }

    pub async fn create(&self, form: &PrizeForm) -> Result<Prize, AppError> {
        form.validate()?;
        let prize: Prize = self.api.post("/admin/prizes", form).await?.into_data()?;
        self.cache
            .invalidate_all(&[QueryKey::Prizes, QueryKey::Catalog]);
        tracing::info!(prize_id = prize.id, name = %prize.name, "Prize created");
        Ok(prize)
    }

    pub async fn update(&self, id: i64, update: &PrizeUpdate) -> Result<Prize, AppError> {
        update.validate()?;
        if update.is_empty() {
            return Err(AppError::Validation("没有需要更新的字段".to_string()));
        }
        let prize: Prize = self
            .api
            .put(&format!("/admin/prizes/{}", id), update)
            .await?
            .into_data()?;
        self.cache
            .invalidate_all(&[QueryKey::Prizes, QueryKey::Catalog]);
        tracing::info!(prize_id = id, "Prize updated");
        Ok(prize)
    }

    /// Upload a prize image. Extension and size are checked locally first.
    pub async fn upload_image(&self, path: &Path) -> Result<ImageUpload, AppError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let size = tokio::fs::metadata(path)
            .await
            .map_err(|e| AppError::Validation(format!("无法读取文件 {}: {}", path.display(), e)))?
            .len();
        check_image(name, size)?;

        self.api
            .upload_file("/admin/upload", path, image_mime(name))
            .await?
            .into_data()
    }

    /// Absolute URL for a stored image path, for display.
    pub fn image_url(&self, image: Option<&str>) -> Option<String> {
        resolve_image_url(&self.asset_origin, image)
    }
}

fn image_mime(name: &str) -> &'static str {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".png") {
        "image/png"
    } else if lower.ends_with(".gif") {
        "image/gif"
    } else if lower.ends_with(".webp") {
        "image/webp"
    } else {
        "image/jpeg"
    }
}

/// `/static...` paths are served by the API host; absolute URLs pass
/// through; anything else falls back to the placeholder (`None`).
pub fn resolve_image_url(asset_origin: &str, image: Option<&str>) -> Option<String> {
    let image = image.map(str::trim).filter(|s| !s.is_empty())?;
    if image.starts_with("http://") || image.starts_with("https://") {
        Some(image.to_string())
    } else if image.starts_with("/static") {
        Some(format!("{}{}", asset_origin.trim_end_matches('/'), image))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_image_url() {
        let origin = "http://localhost:5000";
        assert_eq!(
            resolve_image_url(origin, Some("/static/uploads/a.png")).as_deref(),
            Some("http://localhost:5000/static/uploads/a.png")
        );
        assert_eq!(
            resolve_image_url(origin, Some("https://cdn.example.com/a.png")).as_deref(),
            Some("https://cdn.example.com/a.png")
        );
        assert_eq!(resolve_image_url(origin, Some("uploads/a.png")), None);
        assert_eq!(resolve_image_url(origin, Some("")), None);
        assert_eq!(resolve_image_url(origin, None), None);
    }

    #[test]
    fn test_image_mime() {
        assert_eq!(image_mime("a.PNG"), "image/png");
        assert_eq!(image_mime("a.jpeg"), "image/jpeg");
        assert_eq!(image_mime("a.webp"), "image/webp");
    }
}
