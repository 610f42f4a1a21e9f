// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Prize catalog model.

use crate::models::Points;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Stock at or below this (and above zero) is shown as running low.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// A redeemable prize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prize {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Absolute URL or server-relative path (`/static/uploads/...`)
    #[serde(default)]
    pub image: Option<String>,
    /// Cost in points
    pub points: Points,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Prize {
    pub fn stock_status(&self) -> StockStatus {
        StockStatus::from_stock(self.stock)
    }
}

/// Prize category. The set is open-ended; unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Cash,
    Voucher,
    Gift,
    Other(String),
}

impl Default for Category {
    fn default() -> Self {
        Category::Other(String::new())
    }
}

impl Category {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "cash" => Category::Cash,
            "voucher" => Category::Voucher,
            "gift" => Category::Gift,
            other => Category::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Category::Cash => "cash",
            Category::Voucher => "voucher",
            Category::Gift => "gift",
            Category::Other(s) => s,
        }
    }

    /// Display label used by both apps.
    pub fn label(&self) -> &str {
        match self {
            Category::Cash => "现金红包",
            Category::Voucher => "购物券",
            Category::Gift => "精美礼品",
            Category::Other(s) if s.is_empty() => "未分类",
            Category::Other(s) => s,
        }
    }

    /// The categories offered in filters and forms.
    pub fn known() -> [Category; 3] {
        [Category::Cash, Category::Voucher, Category::Gift]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|s| Category::parse(&s)).unwrap_or_default())
    }
}

/// Stock level derived from the remaining quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StockStatus {
    SoldOut,
    Low,
    Sufficient,
}

impl StockStatus {
    pub fn from_stock(stock: u32) -> Self {
        match stock {
            0 => StockStatus::SoldOut,
            s if s <= LOW_STOCK_THRESHOLD => StockStatus::Low,
            _ => StockStatus::Sufficient,
        }
    }

    /// Sort rank: sold-out 0, low 1, sufficient 2.
    pub fn rank(self) -> u8 {
        match self {
            StockStatus::SoldOut => 0,
            StockStatus::Low => 1,
            StockStatus::Sufficient => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StockStatus::SoldOut => "已售罄",
            StockStatus::Low => "库存不足",
            StockStatus::Sufficient => "充足",
        }
    }
}
