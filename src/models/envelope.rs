// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! The `{code, message, data}` wrapper carried by every API response.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Uniform response envelope.
///
/// Admin error responses omit `data`, which surfaces as `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Codes the backend uses for success (201 for creation).
    pub fn is_success(&self) -> bool {
        self.code == 200 || self.code == 201
    }

    /// Take the payload, failing if the server sent none.
    pub fn into_data(self) -> crate::error::Result<T> {
        let message = self.message;
        self.data.ok_or_else(|| {
            crate::error::AppError::Decode(format!("response carried no data ({})", message))
        })
    }
}

impl Envelope<serde_json::Value> {
    /// Decode a collection payload.
    ///
    /// The backend substitutes `{}` for an empty payload, so an empty list
    /// arrives as an empty object.
    pub fn into_list<T: DeserializeOwned>(self) -> crate::error::Result<Vec<T>> {
        match self.data {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Object(map)) if map.is_empty() => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value)
                .map_err(|e| crate::error::AppError::Decode(format!("list payload: {}", e))),
        }
    }
}

/// Partial envelope used to read `code`/`message` from error bodies
/// without caring about the payload shape.
#[derive(Debug, Deserialize)]
pub(crate) struct EnvelopeHead {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}
