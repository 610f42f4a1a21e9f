// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side filtering and sorting for the list pages.
//!
//! Filters never mutate the fetched collection: they return references in
//! fetch order, then an optional stable sort reorders those references.

use crate::models::{Category, Prize, Redemption, RedemptionStatus, User};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Three-state sort toggle: ascending, descending, unsorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState<F> {
    active: Option<(F, SortOrder)>,
}

impl<F> Default for SortState<F> {
    fn default() -> Self {
        Self { active: None }
    }
}

impl<F: Copy + PartialEq> SortState<F> {
    /// Clicking the active field advances asc → desc → unsorted; clicking a
    /// different field starts it ascending.
    pub fn toggle(&mut self, field: F) {
        self.active = match self.active {
            Some((f, SortOrder::Asc)) if f == field => Some((f, SortOrder::Desc)),
            Some((f, SortOrder::Desc)) if f == field => None,
            _ => Some((field, SortOrder::Asc)),
        };
    }

    pub fn active(&self) -> Option<(F, SortOrder)> {
        self.active
    }

    /// Sort indicator for a column header.
    pub fn order_for(&self, field: F) -> Option<SortOrder> {
        match self.active {
            Some((f, order)) if f == field => Some(order),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.active = None;
    }
}

/// Sortable prize columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrizeSortField {
    Points,
    Stock,
    /// By stock-status rank: sold out, low, sufficient
    Status,
}

impl PrizeSortField {
    fn compare(self, a: &Prize, b: &Prize) -> Ordering {
        match self {
            PrizeSortField::Points => a.points.value().total_cmp(&b.points.value()),
            PrizeSortField::Stock => a.stock.cmp(&b.stock),
            PrizeSortField::Status => a.stock_status().rank().cmp(&b.stock_status().rank()),
        }
    }
}

/// Stable sort; ties keep fetch order in both directions.
pub fn sort_prizes(prizes: &mut [&Prize], state: &SortState<PrizeSortField>) {
    if let Some((field, order)) = state.active() {
        prizes.sort_by(|a, b| {
            let ord = field.compare(a, b);
            match order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
    }
}

/// `all` or one category.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "" | "all" => CategoryFilter::All,
            other => CategoryFilter::Only(Category::parse(other)),
        }
    }

    pub fn matches(&self, prize: &Prize) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => &prize.category == c,
        }
    }

    /// Consumer catalog: category filter only, fetch order.
    pub fn apply<'a>(&self, prizes: &'a [Prize]) -> Vec<&'a Prize> {
        prizes.iter().filter(|p| self.matches(p)).collect()
    }
}

/// `all` or one redemption status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(RedemptionStatus),
}

impl StatusFilter {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "" | "all" => StatusFilter::All,
            other => StatusFilter::Only(RedemptionStatus::parse(other)),
        }
    }

    pub fn matches(&self, redemption: &Redemption) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(s) => &redemption.status == s,
        }
    }
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Admin prize table state.
#[derive(Debug, Clone, Default)]
pub struct PrizeFilter {
    pub search: String,
    pub category: CategoryFilter,
    pub sort: SortState<PrizeSortField>,
}

impl PrizeFilter {
    /// Name or description contains the search text, ignoring case.
    pub fn matches(&self, prize: &Prize) -> bool {
        let q = self.search.trim().to_lowercase();
        let text_match = q.is_empty()
            || contains_ci(&prize.name, &q)
            || prize
                .description
                .as_deref()
                .is_some_and(|d| contains_ci(d, &q));
        text_match && self.category.matches(prize)
    }

    pub fn apply<'a>(&self, prizes: &'a [Prize]) -> Vec<&'a Prize> {
        let mut out: Vec<&Prize> = prizes.iter().filter(|p| self.matches(p)).collect();
        sort_prizes(&mut out, &self.sort);
        out
    }
}

/// Admin user table search.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub search: String,
}

impl UserFilter {
    /// Nickname and kuaishouId ignore case; phone is a plain substring.
    pub fn matches(&self, user: &User) -> bool {
        let raw = self.search.trim();
        if raw.is_empty() {
            return true;
        }
        let q = raw.to_lowercase();
        contains_ci(&user.nickname, &q) || user.phone.contains(raw) || contains_ci(&user.kuaishou_id, &q)
    }

    pub fn apply<'a>(&self, users: &'a [User]) -> Vec<&'a User> {
        users.iter().filter(|u| self.matches(u)).collect()
    }
}

/// Admin redemption table search and status filter.
#[derive(Debug, Clone, Default)]
pub struct RedemptionFilter {
    pub search: String,
    pub status: StatusFilter,
}

impl RedemptionFilter {
    /// Prize name (ignoring case), user id, or redemption id.
    pub fn matches(&self, redemption: &Redemption) -> bool {
        let raw = self.search.trim();
        let text_match = raw.is_empty()
            || contains_ci(&redemption.prize_name, &raw.to_lowercase())
            || redemption
                .user_id
                .is_some_and(|id| id.to_string().contains(raw))
            || redemption.id.to_string().contains(raw);
        text_match && self.status.matches(redemption)
    }

    pub fn apply<'a>(&self, redemptions: &'a [Redemption]) -> Vec<&'a Redemption> {
        redemptions.iter().filter(|r| self.matches(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Points;

    fn prize(id: i64, name: &str, points: f64, stock: u32, category: Category) -> Prize {
        Prize {
            id,
            name: name.to_string(),
            description: None,
            image: None,
            points: Points(points),
            category,
            stock,
            created_at: None,
        }
    }

    fn ids(prizes: &[&Prize]) -> Vec<i64> {
        prizes.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_toggle_cycle() {
        let mut state = SortState::default();
        state.toggle(PrizeSortField::Stock);
        assert_eq!(state.active(), Some((PrizeSortField::Stock, SortOrder::Asc)));
        state.toggle(PrizeSortField::Stock);
        assert_eq!(state.active(), Some((PrizeSortField::Stock, SortOrder::Desc)));
        state.toggle(PrizeSortField::Stock);
        assert_eq!(state.active(), None);

        state.toggle(PrizeSortField::Stock);
        state.toggle(PrizeSortField::Points);
        assert_eq!(state.active(), Some((PrizeSortField::Points, SortOrder::Asc)));
        assert_eq!(state.order_for(PrizeSortField::Stock), None);
    }

    #[test]
    fn test_status_sort_is_stable() {
        let prizes = vec![
            prize(1, "a", 10.0, 3, Category::Gift),
            prize(2, "b", 10.0, 0, Category::Gift),
            prize(3, "c", 10.0, 4, Category::Gift),
            prize(4, "d", 10.0, 50, Category::Gift),
        ];
        let mut filter = PrizeFilter::default();
        filter.sort.toggle(PrizeSortField::Status);
        assert_eq!(ids(&filter.apply(&prizes)), vec![2, 1, 3, 4]);

        filter.sort.toggle(PrizeSortField::Status);
        assert_eq!(ids(&filter.apply(&prizes)), vec![4, 1, 3, 2]);
    }

    #[test]
    fn test_points_sort_handles_fractions() {
        let prizes = vec![
            prize(1, "a", 10.5, 1, Category::Cash),
            prize(2, "b", 2.25, 1, Category::Cash),
            prize(3, "c", 10.0, 1, Category::Cash),
        ];
        let mut filter = PrizeFilter::default();
        filter.sort.toggle(PrizeSortField::Points);
        assert_eq!(ids(&filter.apply(&prizes)), vec![2, 3, 1]);
    }

    #[test]
    fn test_search_matches_description_and_category() {
        let mut with_desc = prize(1, "Mug", 5.0, 1, Category::Gift);
        with_desc.description = Some("Ceramic COFFEE cup".to_string());
        let prizes = vec![with_desc, prize(2, "Coffee voucher", 5.0, 1, Category::Voucher)];

        let mut filter = PrizeFilter {
            search: "coffee".to_string(),
            ..PrizeFilter::default()
        };
        assert_eq!(ids(&filter.apply(&prizes)), vec![1, 2]);

        filter.category = CategoryFilter::parse("voucher");
        assert_eq!(ids(&filter.apply(&prizes)), vec![2]);
    }

    #[test]
    fn test_catalog_category_filter() {
        let prizes = vec![
            prize(1, "a", 1.0, 1, Category::Cash),
            prize(2, "b", 1.0, 1, Category::Gift),
            prize(3, "c", 1.0, 1, Category::Cash),
        ];
        assert_eq!(ids(&CategoryFilter::parse("cash").apply(&prizes)), vec![1, 3]);
        assert_eq!(ids(&CategoryFilter::parse("all").apply(&prizes)), vec![1, 2, 3]);
    }

    #[test]
    fn test_status_filter_parse() {
        assert_eq!(StatusFilter::parse("all"), StatusFilter::All);
        assert_eq!(
            StatusFilter::parse("shipped"),
            StatusFilter::Only(RedemptionStatus::Shipped)
        );
    }
}
