// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP client for the rewards API.
//!
//! Handles:
//! - Bearer token injection from the session store
//! - Envelope unwrapping (`{code, message, data}`)
//! - Session invalidation on 401 (no retry)
//! - Error classification for caller-side notifications

use crate::config::Config;
use crate::error::AppError;
use crate::models::envelope::{Envelope, EnvelopeHead};
use crate::session::{SessionStore, SignOutReason};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// Longest slice of a non-JSON error body kept in error messages.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Rewards API client. Clones share the connection pool and session.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    /// Create a client with the configured base URL and timeout.
    pub fn new(config: &Config, session: SessionStore) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_http(http, &config.api_base_url, session))
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_http(http: reqwest::Client, base_url: &str, session: SessionStore) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Resolve an API path against the base URL.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Envelope<T>, AppError> {
        self.send(self.request(Method::GET, path), true).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<Envelope<T>, AppError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(self.request(Method::POST, path).json(body), true)
            .await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<Envelope<T>, AppError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(self.request(Method::PUT, path).json(body), true)
            .await
    }

    /// POST without the bearer token, for login and registration.
    ///
    /// A 401 here is a credential failure and never touches the session.
    pub async fn post_anonymous<T, B>(&self, path: &str, body: &B) -> Result<Envelope<T>, AppError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(self.request(Method::POST, path).json(body), false)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<Envelope<T>, AppError> {
        self.send(self.request(Method::DELETE, path), true).await
    }

    /// POST a multipart form (file uploads).
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<Envelope<T>, AppError> {
        self.send(self.request(Method::POST, path).multipart(form), true)
            .await
    }

    /// Upload a local file as multipart field `file`.
    pub async fn upload_file<T: DeserializeOwned>(
        &self,
        path: &str,
        file: &Path,
        mime: &str,
    ) -> Result<Envelope<T>, AppError> {
        let bytes = tokio::fs::read(file)
            .await
            .map_err(|e| AppError::Validation(format!("无法读取文件 {}: {}", file.display(), e)))?;
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        tracing::info!(file = %file_name, bytes = bytes.len(), path, "Uploading file");

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid MIME type {}: {}", mime, e)))?;
        self.post_multipart(path, Form::new().part("file", part))
            .await
    }

    /// GET a binary body (spreadsheet template download).
    pub async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, AppError> {
        let (status, body, had_token) = self
            .execute(self.request(Method::GET, path), true)
            .await?;
        if status.is_success() {
            return Ok(body);
        }
        let head = serde_json::from_slice::<EnvelopeHead>(&body).ok();
        Err(self.classify_failure(status, head, &body, had_token))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    /// Attach the token (if `authenticated`), send, and read the whole body.
    async fn execute(
        &self,
        builder: RequestBuilder,
        authenticated: bool,
    ) -> Result<(StatusCode, Vec<u8>, bool), AppError> {
        let token = if authenticated {
            self.session.token()
        } else {
            None
        };
        let had_token = token.is_some();
        let builder = match token {
            Some(t) => builder.bearer_auth(t),
            None => builder,
        };

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(error = %e, "Request failed before a response arrived");
            AppError::Network(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::Network(format!("Failed to read response body: {}", e)))?;

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "Response received");
        Ok((status, body.to_vec(), had_token))
    }

    /// Send a request and unwrap its envelope.
    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        authenticated: bool,
    ) -> Result<Envelope<T>, AppError> {
        let (status, body, had_token) = self.execute(builder, authenticated).await?;
        let head = serde_json::from_slice::<EnvelopeHead>(&body).ok();

        let envelope_unauthorized = head.as_ref().and_then(|h| h.code) == Some(401);
        if !status.is_success() || envelope_unauthorized {
            return Err(self.classify_failure(status, head, &body, had_token));
        }

        let envelope: Envelope<T> = serde_json::from_slice(&body)
            .map_err(|e| AppError::Decode(format!("JSON parse error: {}", e)))?;

        if !envelope.is_success() {
            return Err(AppError::Api {
                code: envelope.code,
                message: envelope.message,
            });
        }

        Ok(envelope)
    }

    /// Map a failed response onto the error taxonomy.
    fn classify_failure(
        &self,
        status: StatusCode,
        head: Option<EnvelopeHead>,
        body: &[u8],
        had_token: bool,
    ) -> AppError {
        let message = head
            .as_ref()
            .and_then(|h| h.message.clone())
            .unwrap_or_else(|| {
                String::from_utf8_lossy(body)
                    .chars()
                    .take(MAX_ERROR_BODY_CHARS)
                    .collect()
            });
        let code = head.as_ref().and_then(|h| h.code);

        if status == StatusCode::UNAUTHORIZED || code == Some(401) {
            // Without a token this is a credential failure, not an expiry.
            if !had_token {
                return AppError::Unauthorized(message);
            }
            if self.session.invalidate(SignOutReason::Expired) {
                tracing::warn!("Token rejected, redirecting to login");
            }
            return AppError::SessionExpired;
        }

        if status == StatusCode::FORBIDDEN {
            return AppError::Forbidden(message);
        }

        if status.is_success() {
            // Only reachable through an envelope-level 401, handled above.
            return AppError::Api {
                code: code.unwrap_or_default(),
                message,
            };
        }

        tracing::warn!(status = status.as_u16(), message = %message, "API request failed");
        AppError::Http {
            status: status.as_u16(),
            message,
        }
    }
}
