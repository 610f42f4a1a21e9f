// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin user management.

use crate::error::AppError;
use crate::models::User;
use crate::services::api::ApiClient;
use crate::views::forms::UserUpdate;
use crate::views::query::{QueryCache, QueryKey};
use serde_json::Value;
use validator::Validate;

#[derive(Clone)]
pub struct UserService {
    api: ApiClient,
    cache: QueryCache,
}

impl UserService {
    pub fn new(api: ApiClient, cache: QueryCache) -> Self {
        Self { api, cache }
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        let users: Vec<User> = self.api.get::<Value>("/admin/users").await?.into_list()?;
        tracing::debug!(count = users.len(), "Fetched users");
        Ok(users)
    }

    /// Edit a user. The response omits addresses.
    pub async fn update(&self, id: i64, update: &UserUpdate) -> Result<User, AppError> {
        update.validate()?;
        let user: User = self
            .api
            .put(&format!("/admin/users/{}", id), update)
            .await?
            .into_data()?;
        self.cache.invalidate(QueryKey::Users);
        tracing::info!(user_id = id, "User updated");
        Ok(user)
    }
}
