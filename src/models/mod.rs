// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Wire models for the rewards API.

pub mod envelope;
pub mod points;
pub mod prize;
pub mod redemption;
pub mod upload;
pub mod user;

pub use envelope::Envelope;
pub use points::Points;
pub use prize::{Category, Prize, StockStatus, LOW_STOCK_THRESHOLD};
pub use redemption::{Redemption, RedemptionStatus};
pub use upload::{ErrorRecord, ImageUpload, UploadResult};
pub use user::{Address, SessionSnapshot, User, UserInfo, UserSummary};
