// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Point Rewards client: a headless SDK for the point-rewards REST API.
//!
//! This crate drives the two client applications against the same server:
//! the administrative dashboard and the consumer rewards catalog. It owns
//! the persisted session, the authenticated HTTP client, and the page state
//! (filters, sorting, forms, upload report, redemption dialog). Rendering
//! is left to the caller; the `point-rewards` binary is a terminal front end.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod storage;
pub mod time_utils;
pub mod views;

use config::Config;
use error::AppError;
use services::{
    ApiClient, AuthService, PasswordCipher, PrizeService, RedemptionService, TransactionService,
    UserService,
};
use session::SessionStore;
use std::sync::Arc;
use storage::{FileStore, KeyValueStore};
use views::QueryCache;

/// Everything one running client needs, built once at startup.
#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub session: SessionStore,
    pub api: ApiClient,
    pub cache: QueryCache,
    pub auth: AuthService,
    pub prizes: PrizeService,
    pub users: UserService,
    pub redemptions: RedemptionService,
    pub transactions: TransactionService,
}

impl AppContext {
    /// Build the context with the session persisted at `config.session_path`.
    pub fn init(config: Config) -> Result<Self, AppError> {
        let storage = Arc::new(FileStore::new(&config.session_path));
        Self::with_storage(config, storage)
    }

    /// Build the context over a caller-supplied store.
    pub fn with_storage(config: Config, storage: Arc<dyn KeyValueStore>) -> Result<Self, AppError> {
        let session = SessionStore::bootstrap(storage, config.variant)?;
        let api = ApiClient::new(&config, session.clone())?;
        let cache = QueryCache::new();
        let cipher = PasswordCipher::new(config.password_transport, &config.password_secret);

        tracing::debug!(
            variant = ?config.variant,
            base_url = %config.api_base_url,
            signed_in = session.is_authenticated(),
            "Client context initialized"
        );

        Ok(Self {
            auth: AuthService::new(api.clone(), cipher),
            prizes: PrizeService::new(api.clone(), cache.clone(), config.asset_origin()),
            users: UserService::new(api.clone(), cache.clone()),
            redemptions: RedemptionService::new(api.clone(), cache.clone()),
            transactions: TransactionService::new(api.clone(), cache.clone()),
            config,
            session,
            api,
            cache,
        })
    }

    /// Release the context. The session stays persisted for the next run.
    pub fn teardown(self) {
        tracing::debug!(
            signed_in = self.session.is_authenticated(),
            "Client context torn down"
        );
    }
}
