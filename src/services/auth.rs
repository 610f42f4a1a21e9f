// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login, registration, and the signed-in user's own profile.

use crate::error::AppError;
use crate::models::{Address, SessionSnapshot, UserInfo, UserSummary};
use crate::services::api::ApiClient;
use crate::services::crypto::PasswordCipher;
use crate::views::forms::{check_address, LoginForm, RegisterForm};
use serde::Serialize;
use validator::Validate;

#[derive(Serialize)]
struct LoginRequest<'a> {
    phone: &'a str,
    password: String,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    nickname: &'a str,
    #[serde(rename = "kuaishouId")]
    kuaishou_id: &'a str,
    phone: &'a str,
    password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    inviter: Option<&'a str>,
}

#[derive(Serialize)]
struct AddressRequest {
    address: String,
}

/// Account operations for the current process's session.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    cipher: PasswordCipher,
}

impl AuthService {
    pub fn new(api: ApiClient, cipher: PasswordCipher) -> Self {
        Self { api, cipher }
    }

    /// Log in and persist the session.
    ///
    /// The admin app refuses accounts without the admin flag; nothing is
    /// persisted in that case.
    pub async fn login(&self, form: &LoginForm) -> Result<SessionSnapshot, AppError> {
        form.check(self.api.session().variant())?;

        let body = LoginRequest {
            phone: form.phone.trim(),
            password: self.cipher.seal(&form.password)?,
        };
        tracing::debug!(transport = ?self.cipher.transport(), "Sending login request");
        let snapshot: SessionSnapshot = self
            .api
            .post_anonymous("/auth/login", &body)
            .await?
            .into_data()?;

        self.api.session().establish(snapshot.clone()).inspect_err(|e| {
            tracing::warn!(user_id = snapshot.id, error = %e, "Login rejected by client policy");
        })?;

        tracing::info!(user_id = snapshot.id, is_admin = snapshot.is_admin, "Logged in");
        Ok(snapshot)
    }

    /// Create an account. The caller logs in separately afterwards.
    pub async fn register(&self, form: &RegisterForm) -> Result<UserSummary, AppError> {
        form.validate()?;

        let body = RegisterRequest {
            nickname: form.nickname.trim(),
            kuaishou_id: form.kuaishou_id.trim(),
            phone: form.phone.trim(),
            password: self.cipher.seal(&form.password)?,
            inviter: form
                .inviter
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty()),
        };
        let user: UserSummary = self
            .api
            .post_anonymous("/auth/register", &body)
            .await?
            .into_data()?;

        tracing::info!(user_id = user.id, "Registered new account");
        Ok(user)
    }

    /// Refresh points and addresses from the server into the session.
    pub async fn refresh_profile(&self) -> Result<UserInfo, AppError> {
        let info: UserInfo = self.api.get("/user/me").await?.into_data()?;
        self.api.session().apply_profile(info.clone())?;
        Ok(info)
    }

    /// Replace the shipping address.
    pub async fn update_address(&self, address: &Address) -> Result<UserSummary, AppError> {
        check_address(address)?;

        let body = AddressRequest {
            address: address.to_wire(),
        };
        let user: UserSummary = self.api.put("/user/address", &body).await?.into_data()?;
        self.api.session().apply_summary(user.clone())?;

        tracing::info!(user_id = user.id, "Shipping address updated");
        Ok(user)
    }

    pub fn logout(&self) -> Result<(), AppError> {
        self.api.session().logout()
    }
}

/// Registration link that credits the inviting user.
pub fn invite_link(invite_base_url: &str, user_id: Option<i64>) -> String {
    let inviter = user_id.map_or_else(|| "default".to_string(), |id| id.to_string());
    format!(
        "{}/#/register?inviter={}",
        invite_base_url.trim_end_matches('/'),
        urlencoding::encode(&inviter)
    )
}
