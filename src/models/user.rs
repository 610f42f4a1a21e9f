// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! User, address, and session snapshot models.

use crate::models::Points;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A user as returned by the admin user list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub nickname: String,
    /// External platform identifier
    #[serde(rename = "kuaishouId")]
    pub kuaishou_id: String,
    pub phone: String,
    #[serde(default)]
    pub points: Points,
    #[serde(default)]
    pub is_admin: bool,
    /// Shipping addresses; the first one is used for redemptions
    #[serde(default, deserialize_with = "addresses_or_empty")]
    pub addresses: Vec<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// A shipping address, normalized once at the API boundary.
///
/// The backend stores addresses as free text, but some clients wrote a
/// JSON-encoded `{name, phone, address}` object into that text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    Raw(String),
    Structured {
        name: String,
        phone: String,
        address: String,
    },
}

#[derive(Serialize, Deserialize)]
struct StructuredAddress {
    #[serde(default)]
    name: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    address: String,
}

impl Address {
    /// Parse the wire text, recognizing the JSON-encoded form.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.starts_with('{') {
            if let Ok(s) = serde_json::from_str::<StructuredAddress>(trimmed) {
                return Address::Structured {
                    name: s.name,
                    phone: s.phone,
                    address: s.address,
                };
            }
        }
        Address::Raw(text.to_string())
    }

    /// The text form sent back to the server.
    pub fn to_wire(&self) -> String {
        match self {
            Address::Raw(text) => text.clone(),
            Address::Structured {
                name,
                phone,
                address,
            } => serde_json::to_string(&StructuredAddress {
                name: name.clone(),
                phone: phone.clone(),
                address: address.clone(),
            })
            .unwrap_or_else(|_| address.clone()),
        }
    }

    /// A raw address that is empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            Address::Raw(text) => text.trim().is_empty(),
            Address::Structured { address, .. } => address.trim().is_empty(),
        }
    }

    /// Single-line display text.
    pub fn display_line(&self) -> String {
        match self {
            Address::Raw(text) => text.clone(),
            Address::Structured {
                name,
                phone,
                address,
            } => [name.as_str(), phone.as_str(), address.as_str()]
                .iter()
                .filter(|s| !s.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wire())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Object(StructuredAddress),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Address::parse(&text),
            Raw::Object(s) => Address::Structured {
                name: s.name,
                phone: s.phone,
                address: s.address,
            },
        })
    }
}

/// `addresses` may be absent, `null`, or a list.
fn addresses_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Address>, D::Error> {
    Ok(Option::<Vec<Address>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize an optional address, treating empty text as absent.
pub(crate) fn optional_address<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Address>, D::Error> {
    Ok(Option::<Address>::deserialize(deserializer)?.filter(|a| !a.is_blank()))
}

/// The authenticated user plus bearer token, as returned by login and
/// persisted client-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: i64,
    pub nickname: String,
    #[serde(rename = "kuaishouId")]
    pub kuaishou_id: String,
    pub phone: String,
    #[serde(default)]
    pub points: Points,
    #[serde(default, deserialize_with = "addresses_or_empty")]
    pub addresses: Vec<Address>,
    /// Missing on snapshots written by the consumer app
    #[serde(default)]
    pub is_admin: bool,
    pub access_token: String,
}

impl SessionSnapshot {
    /// First address, if present and non-blank.
    pub fn primary_address(&self) -> Option<&Address> {
        self.addresses.first().filter(|a| !a.is_blank())
    }
}

/// Frequently changing profile fields from `GET /user/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub points: Points,
    #[serde(default, deserialize_with = "addresses_or_empty")]
    pub addresses: Vec<Address>,
}

/// Profile returned by `PUT /user/address` and by registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub nickname: String,
    #[serde(rename = "kuaishouId")]
    pub kuaishou_id: String,
    pub phone: String,
    #[serde(default)]
    pub points: Points,
    #[serde(default, deserialize_with = "addresses_or_empty")]
    pub addresses: Vec<Address>,
}
