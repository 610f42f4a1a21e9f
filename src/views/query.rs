// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Keyed collection queries with invalidation.
//!
//! `QueryCache` holds one generation counter per collection. Mutations bump
//! the counter; a `Query` remembers the generation it last loaded and
//! refetches when the counter has moved. Each fetch carries a ticket, and a
//! result whose ticket is no longer the newest is dropped, so a slow
//! response can never overwrite a newer one.

use crate::error::AppError;
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;

/// Server collections the pages read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// `GET /admin/users`
    Users,
    /// `GET /admin/prizes`
    Prizes,
    /// `GET /admin/redemptions`
    Redemptions,
    /// `GET /prizes` (consumer catalog)
    Catalog,
    /// `GET /redemptions/history`
    History,
}

/// Shared invalidation clock. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    generations: Arc<DashMap<QueryKey, u64>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation of a collection (0 until first invalidated).
    pub fn generation(&self, key: QueryKey) -> u64 {
        self.generations.get(&key).map(|g| *g).unwrap_or(0)
    }

    /// Mark a collection stale so the next read refetches it.
    pub fn invalidate(&self, key: QueryKey) {
        let mut entry = self.generations.entry(key).or_insert(0);
        *entry += 1;
        tracing::debug!(?key, generation = *entry, "Query invalidated");
    }

    /// Mark several collections stale.
    pub fn invalidate_all(&self, keys: &[QueryKey]) {
        for key in keys {
            self.invalidate(*key);
        }
    }
}

/// Identifies one fetch of a [`Query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    generation: u64,
}

/// One page's view of a collection.
#[derive(Debug)]
pub struct Query<T> {
    key: QueryKey,
    cache: QueryCache,
    data: Option<T>,
    loaded_generation: u64,
    latest_seq: u64,
}

impl<T> Query<T> {
    pub fn new(cache: &QueryCache, key: QueryKey) -> Self {
        Self {
            key,
            cache: cache.clone(),
            data: None,
            loaded_generation: 0,
            latest_seq: 0,
        }
    }

    pub fn key(&self) -> QueryKey {
        self.key
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// True before the first load and after the collection is invalidated.
    pub fn is_stale(&self) -> bool {
        self.data.is_none() || self.loaded_generation != self.cache.generation(self.key)
    }

    /// Start a fetch. Any ticket issued earlier becomes obsolete.
    pub fn begin(&mut self) -> FetchTicket {
        self.latest_seq += 1;
        FetchTicket {
            seq: self.latest_seq,
            generation: self.cache.generation(self.key),
        }
    }

    /// Store a fetch result if its ticket is still the newest.
    ///
    /// Returns false when the result was discarded.
    pub fn complete(&mut self, ticket: FetchTicket, value: T) -> bool {
        if ticket.seq != self.latest_seq {
            tracing::debug!(key = ?self.key, "Discarding superseded fetch result");
            return false;
        }
        self.data = Some(value);
        self.loaded_generation = ticket.generation;
        true
    }

    /// Drop interest in any fetch still in flight.
    pub fn abandon(&mut self) {
        self.latest_seq += 1;
    }

    /// Return the cached value, fetching first if stale.
    pub async fn load<F, Fut>(&mut self, fetch: F) -> Result<&T, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        if self.is_stale() {
            let ticket = self.begin();
            let value = fetch().await?;
            self.complete(ticket, value);
        }
        self.data
            .as_ref()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("query {:?} has no data", self.key)))
    }
}
