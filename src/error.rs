// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent user-facing notifications.

/// Application error type shared by the services and page state.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A request that carried a bearer token was rejected with 401.
    /// The session has already been cleared when this is returned.
    #[error("Session expired, please log in again")]
    SessionExpired,

    /// 401 on a request without a token (wrong phone or password).
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Error code embedded in a 2xx envelope.
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Password encryption failed: {0}")]
    Crypto(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Check whether this error ended the session.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, AppError::SessionExpired)
    }

    /// Check whether this error was produced before any request was sent.
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }

    /// The single transient message a caller shows for this error.
    ///
    /// Server-provided messages are preferred over generic text.
    pub fn notification(&self) -> String {
        match self {
            AppError::SessionExpired => "Session expired, please log in again".to_string(),
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::Validation(msg) => msg.clone(),
            AppError::Http { message, .. } | AppError::Api { message, .. }
                if !message.is_empty() =>
            {
                message.clone()
            }
            AppError::Http { status, .. } => format!("Request failed with status {}", status),
            AppError::Api { code, .. } => format!("Request failed with code {}", code),
            AppError::Network(_) => "Network error, please try again later".to_string(),
            AppError::Storage(_) | AppError::Crypto(_) | AppError::Decode(_) => self.to_string(),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal error");
                "Internal error".to_string()
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();
        messages.sort();
        AppError::Validation(messages.join("; "))
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, AppError>;
