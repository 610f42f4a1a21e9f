// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - API access layer.

pub mod api;
pub mod auth;
pub mod crypto;
pub mod prizes;
pub mod redemptions;
pub mod transactions;
pub mod users;

pub use api::ApiClient;
pub use auth::{invite_link, AuthService};
pub use crypto::{PasswordCipher, PasswordTransport};
pub use prizes::{resolve_image_url, PrizeService};
pub use redemptions::RedemptionService;
pub use transactions::TransactionService;
pub use users::UserService;
