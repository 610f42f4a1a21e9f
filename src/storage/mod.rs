// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persisted key-value storage for session state.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::AppError;

/// Storage keys, shared with the original web clients' local storage.
pub mod keys {
    /// Admin bearer token
    pub const ADMIN_TOKEN: &str = "admin_token";
    /// Admin user snapshot (JSON)
    pub const ADMIN_USER: &str = "admin_user";
    /// Consumer snapshot including `access_token` (JSON)
    pub const CURRENT_USER: &str = "point-rewards-current-user";
}

/// A single mutable string map that survives restarts.
///
/// Writes are synchronous: once `set` or `remove` returns, the change is
/// durable.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
    fn remove(&self, key: &str) -> Result<(), AppError>;

    /// Remove several keys; stops at the first failure.
    fn remove_all(&self, keys: &[&str]) -> Result<(), AppError> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}
