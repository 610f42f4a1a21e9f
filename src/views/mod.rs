// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Page state shared by the admin and consumer front ends.
//!
//! Nothing here renders; these types hold what a page shows and decide
//! what a user action does.

pub mod dashboard;
pub mod forms;
pub mod listing;
pub mod query;
pub mod redemption;
pub mod upload;

pub use dashboard::DashboardStats;
pub use listing::{CategoryFilter, PrizeFilter, PrizeSortField, RedemptionFilter, SortOrder, SortState, StatusFilter, UserFilter};
pub use query::{Query, QueryCache, QueryKey};
pub use redemption::{can_redeem, ModalPhase, RedeemBlock, RedeemGate, RedemptionFailureBehavior, RedemptionModal};
pub use upload::UploadReport;
