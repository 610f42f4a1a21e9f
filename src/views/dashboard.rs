// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin dashboard and per-page summary counters.

use crate::error::AppError;
use crate::models::{Points, Prize, Redemption, RedemptionStatus, User, LOW_STOCK_THRESHOLD};
use crate::services::{PrizeService, RedemptionService, UserService};

/// Redemptions listed under "recent activity".
pub const RECENT_REDEMPTIONS: usize = 5;

/// Users page header counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserStats {
    pub total: usize,
    pub admins: usize,
    pub total_points: Points,
}

impl UserStats {
    pub fn compute(users: &[User]) -> Self {
        Self {
            total: users.len(),
            admins: users.iter().filter(|u| u.is_admin).count(),
            total_points: Points(users.iter().map(|u| finite(u.points)).sum()),
        }
    }
}

/// Prizes page header counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrizeStats {
    pub total: usize,
    pub total_stock: u64,
    /// Sold out or at/below the low-stock threshold
    pub low_stock: usize,
    /// Sum of cost × stock
    pub total_value: Points,
}

impl PrizeStats {
    pub fn compute(prizes: &[Prize]) -> Self {
        Self {
            total: prizes.len(),
            total_stock: prizes.iter().map(|p| u64::from(p.stock)).sum(),
            low_stock: prizes
                .iter()
                .filter(|p| p.stock <= LOW_STOCK_THRESHOLD)
                .count(),
            total_value: Points(
                prizes
                    .iter()
                    .map(|p| finite(p.points) * f64::from(p.stock))
                    .sum(),
            ),
        }
    }
}

/// Redemptions page header counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RedemptionStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub points_spent: Points,
}

impl RedemptionStats {
    pub fn compute(redemptions: &[Redemption]) -> Self {
        let count = |status: RedemptionStatus| redemptions.iter().filter(|r| r.status == status).count();
        Self {
            total: redemptions.len(),
            completed: count(RedemptionStatus::Completed),
            pending: count(RedemptionStatus::Pending),
            points_spent: Points(redemptions.iter().map(|r| finite(r.points_spent)).sum()),
        }
    }
}

/// Everything the dashboard shows.
#[derive(Debug, Clone)]
pub struct DashboardStats {
    pub users: UserStats,
    pub prizes: PrizeStats,
    pub redemptions: RedemptionStats,
    pub recent: Vec<Redemption>,
}

impl DashboardStats {
    pub fn compute(users: &[User], prizes: &[Prize], redemptions: &[Redemption]) -> Self {
        let mut recent: Vec<Redemption> = redemptions.to_vec();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent.truncate(RECENT_REDEMPTIONS);

        Self {
            users: UserStats::compute(users),
            prizes: PrizeStats::compute(prizes),
            redemptions: RedemptionStats::compute(redemptions),
            recent,
        }
    }

    /// Fetch the three collections concurrently and summarize them.
    pub async fn load(
        users: &UserService,
        prizes: &PrizeService,
        redemptions: &RedemptionService,
    ) -> Result<Self, AppError> {
        let (u, p, r) = tokio::try_join!(users.list(), prizes.list_admin(), redemptions.list_admin())?;
        Ok(Self::compute(&u, &p, &r))
    }
}

/// Unparsable amounts count as zero in totals.
fn finite(points: Points) -> f64 {
    if points.value().is_finite() {
        points.value()
    } else {
        0.0
    }
}
