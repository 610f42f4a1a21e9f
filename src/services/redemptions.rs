// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Redeeming prizes and reading redemption records.

use crate::error::AppError;
use crate::models::{Address, Redemption};
use crate::services::api::ApiClient;
use crate::views::query::{QueryCache, QueryKey};
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
struct RedeemRequest {
    prize_id: i64,
    shipping_address: Option<String>,
}

#[derive(Clone)]
pub struct RedemptionService {
    api: ApiClient,
    cache: QueryCache,
}

impl RedemptionService {
    pub fn new(api: ApiClient, cache: QueryCache) -> Self {
        Self { api, cache }
    }

    /// Redeem a prize. Stock, balance, and the deduction are all decided by
    /// the server.
    pub async fn redeem(
        &self,
        prize_id: i64,
        shipping_address: Option<&Address>,
    ) -> Result<(), AppError> {
        let body = RedeemRequest {
            prize_id,
            shipping_address: shipping_address.map(Address::to_wire),
        };
        self.api
            .post::<Value, _>("/redemptions/redeem", &body)
            .await?;

        self.cache.invalidate_all(&[
            QueryKey::Catalog,
            QueryKey::History,
            QueryKey::Prizes,
            QueryKey::Redemptions,
        ]);
        tracing::info!(prize_id, "Prize redeemed");
        Ok(())
    }

    /// The signed-in user's history, newest first.
    pub async fn history(&self) -> Result<Vec<Redemption>, AppError> {
        self.api
            .get::<Value>("/redemptions/history")
            .await?
            .into_list()
    }

    /// All redemptions (admin), newest first.
    pub async fn list_admin(&self) -> Result<Vec<Redemption>, AppError> {
        let redemptions: Vec<Redemption> = self
            .api
            .get::<Value>("/admin/redemptions")
            .await?
            .into_list()?;
        tracing::debug!(count = redemptions.len(), "Fetched redemptions");
        Ok(redemptions)
    }
}
