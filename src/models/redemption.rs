// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Redemption records.

use crate::models::user::optional_address;
use crate::models::{Address, Points};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A points-for-prize exchange recorded by the server.
///
/// The consumer history endpoint omits `user_id` and `prize_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Redemption {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub prize_id: Option<i64>,
    pub prize_name: String,
    pub points_spent: Points,
    #[serde(default)]
    pub status: RedemptionStatus,
    #[serde(default, deserialize_with = "optional_address")]
    pub shipping_address: Option<Address>,
    #[serde(deserialize_with = "crate::time_utils::deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Redemption status. The two apps use slightly different vocabularies;
/// both parse here, and anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum RedemptionStatus {
    /// Server default for new redemptions
    #[default]
    Completed,
    Pending,
    Shipped,
    Processing,
    Other(String),
}

impl RedemptionStatus {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "completed" => RedemptionStatus::Completed,
            "pending" => RedemptionStatus::Pending,
            "shipped" => RedemptionStatus::Shipped,
            "processing" => RedemptionStatus::Processing,
            other => RedemptionStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RedemptionStatus::Completed => "completed",
            RedemptionStatus::Pending => "pending",
            RedemptionStatus::Shipped => "shipped",
            RedemptionStatus::Processing => "processing",
            RedemptionStatus::Other(s) => s,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            RedemptionStatus::Completed => "已完成",
            RedemptionStatus::Pending => "待处理",
            RedemptionStatus::Shipped => "已发货",
            RedemptionStatus::Processing => "处理中",
            RedemptionStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for RedemptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RedemptionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RedemptionStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .map(|s| RedemptionStatus::parse(&s))
            .unwrap_or_default())
    }
}
