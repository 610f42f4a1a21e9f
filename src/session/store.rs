// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session store.
//!
//! Holds the bearer token and the user snapshot for one app variant:
//! - Bootstrap once from persisted storage
//! - Persist on login and profile refresh
//! - Clear on logout or when the server rejects the token
//! - Publish [`AuthState`] so callers can route declaratively

use crate::config::AppVariant;
use crate::error::AppError;
use crate::models::{SessionSnapshot, UserInfo, UserSummary};
use crate::storage::{keys, KeyValueStore};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;

/// Why the store holds no session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutReason {
    /// Nothing was persisted
    NeverSignedIn,
    /// Persisted snapshot was malformed or (admin) not admin-flagged
    InvalidSnapshot,
    /// Explicit logout
    LoggedOut,
    /// The server answered 401 to an authenticated request
    Expired,
}

/// Observable authentication state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    SignedIn,
    SignedOut { reason: SignOutReason },
}

/// Where the UI belongs for a given auth state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Home,
}

impl AuthState {
    pub fn route(&self) -> Route {
        match self {
            AuthState::SignedIn => Route::Home,
            AuthState::SignedOut { .. } => Route::Login,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, AuthState::SignedIn)
    }
}

/// Shared session store. Clones refer to the same session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    variant: AppVariant,
    storage: Arc<dyn KeyValueStore>,
    current: RwLock<Option<SessionSnapshot>>,
    state_tx: watch::Sender<AuthState>,
}

impl SessionStore {
    /// Read the persisted session once.
    ///
    /// A malformed snapshot, or a snapshot without the admin flag in the
    /// admin variant, is treated as invalid: storage is cleared and the
    /// store starts signed out.
    pub fn bootstrap(storage: Arc<dyn KeyValueStore>, variant: AppVariant) -> Result<Self, AppError> {
        let (current, state) = match load_snapshot(storage.as_ref(), variant)? {
            Loaded::Valid(snapshot) => {
                tracing::info!(user_id = snapshot.id, "Restored persisted session");
                (Some(snapshot), AuthState::SignedIn)
            }
            Loaded::Missing => (
                None,
                AuthState::SignedOut {
                    reason: SignOutReason::NeverSignedIn,
                },
            ),
            Loaded::Invalid(why) => {
                tracing::warn!(reason = why, "Discarding persisted session");
                storage.remove_all(layout_keys(variant))?;
                (
                    None,
                    AuthState::SignedOut {
                        reason: SignOutReason::InvalidSnapshot,
                    },
                )
            }
        };

        let (state_tx, _) = watch::channel(state);

        Ok(Self {
            inner: Arc::new(Inner {
                variant,
                storage,
                current: RwLock::new(current),
                state_tx,
            }),
        })
    }

    pub fn variant(&self) -> AppVariant {
        self.inner.variant
    }

    /// Bearer token for outgoing requests, if signed in.
    pub fn token(&self) -> Option<String> {
        self.read().as_ref().map(|s| s.access_token.clone())
    }

    /// Copy of the current user snapshot.
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        match self.read().as_ref() {
            Some(s) => self.inner.variant != AppVariant::Admin || s.is_admin,
            None => false,
        }
    }

    pub fn state(&self) -> AuthState {
        *self.inner.state_tx.borrow()
    }

    /// Subscribe to auth state changes (sign-in, logout, expiry).
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state_tx.subscribe()
    }

    /// Adopt a freshly issued session and persist it.
    pub fn establish(&self, snapshot: SessionSnapshot) -> Result<(), AppError> {
        if self.inner.variant == AppVariant::Admin && !snapshot.is_admin {
            tracing::warn!(user_id = snapshot.id, "Rejected non-admin login");
            return Err(AppError::Forbidden(
                "You do not have administrator privileges".to_string(),
            ));
        }
        if snapshot.access_token.is_empty() {
            return Err(AppError::Decode("login response has no access token".to_string()));
        }

        self.persist(&snapshot)?;
        tracing::info!(user_id = snapshot.id, "Session established");
        *self.write() = Some(snapshot);
        self.inner.state_tx.send_replace(AuthState::SignedIn);
        Ok(())
    }

    /// Explicit logout. Clears persisted state.
    pub fn logout(&self) -> Result<(), AppError> {
        let previous = self.write().take();
        self.inner
            .storage
            .remove_all(layout_keys(self.inner.variant))?;
        if let Some(s) = previous {
            tracing::info!(user_id = s.id, "Logged out");
        }
        self.inner.state_tx.send_replace(AuthState::SignedOut {
            reason: SignOutReason::LoggedOut,
        });
        Ok(())
    }

    /// Drop the session because the server no longer accepts it.
    ///
    /// Returns `true` only if a session was present, so a burst of failing
    /// requests produces a single redirect.
    pub fn invalidate(&self, reason: SignOutReason) -> bool {
        let previous = self.write().take();
        if let Err(e) = self
            .inner
            .storage
            .remove_all(layout_keys(self.inner.variant))
        {
            tracing::error!(error = %e, "Failed to clear persisted session");
        }

        match previous {
            Some(s) => {
                tracing::warn!(user_id = s.id, ?reason, "Session invalidated");
                self.inner
                    .state_tx
                    .send_replace(AuthState::SignedOut { reason });
                true
            }
            None => false,
        }
    }

    /// Merge the fields returned by `GET /user/me`.
    pub fn apply_profile(&self, info: UserInfo) -> Result<(), AppError> {
        self.update(|s| {
            s.points = info.points;
            s.addresses = info.addresses;
        })
    }

    /// Merge a user returned by an address update.
    pub fn apply_summary(&self, summary: UserSummary) -> Result<(), AppError> {
        self.update(|s| {
            s.nickname = summary.nickname;
            s.kuaishou_id = summary.kuaishou_id;
            s.phone = summary.phone;
            s.points = summary.points;
            s.addresses = summary.addresses;
        })
    }

    fn update<F: FnOnce(&mut SessionSnapshot)>(&self, f: F) -> Result<(), AppError> {
        let updated = {
            let mut guard = self.write();
            let snapshot = guard.as_mut().ok_or(AppError::SessionExpired)?;
            f(snapshot);
            snapshot.clone()
        };
        self.persist(&updated)
    }

    fn persist(&self, snapshot: &SessionSnapshot) -> Result<(), AppError> {
        let json = serde_json::to_string(snapshot)
            .map_err(|e| AppError::Storage(format!("failed to encode snapshot: {}", e)))?;
        let storage = &self.inner.storage;
        match self.inner.variant {
            AppVariant::Admin => {
                storage.set(keys::ADMIN_TOKEN, &snapshot.access_token)?;
                storage.set(keys::ADMIN_USER, &json)
            }
            AppVariant::Consumer => storage.set(keys::CURRENT_USER, &json),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<SessionSnapshot>> {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<SessionSnapshot>> {
        self.inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

enum Loaded {
    Valid(SessionSnapshot),
    Missing,
    Invalid(&'static str),
}

fn layout_keys(variant: AppVariant) -> &'static [&'static str] {
    match variant {
        AppVariant::Admin => &[keys::ADMIN_TOKEN, keys::ADMIN_USER],
        AppVariant::Consumer => &[keys::CURRENT_USER],
    }
}

fn load_snapshot(storage: &dyn KeyValueStore, variant: AppVariant) -> Result<Loaded, AppError> {
    match variant {
        AppVariant::Admin => {
            let (Some(token), Some(user)) =
                (storage.get(keys::ADMIN_TOKEN)?, storage.get(keys::ADMIN_USER)?)
            else {
                return Ok(Loaded::Missing);
            };

            let mut value: serde_json::Value = match serde_json::from_str(&user) {
                Ok(v) => v,
                Err(_) => return Ok(Loaded::Invalid("admin snapshot is not valid JSON")),
            };
            // The token key is authoritative over any copy inside the snapshot.
            match value.as_object_mut() {
                Some(obj) => {
                    obj.insert("access_token".to_string(), token.into());
                }
                None => return Ok(Loaded::Invalid("admin snapshot is not an object")),
            }

            let snapshot: SessionSnapshot = match serde_json::from_value(value) {
                Ok(s) => s,
                Err(_) => return Ok(Loaded::Invalid("admin snapshot is missing fields")),
            };
            if !snapshot.is_admin {
                return Ok(Loaded::Invalid("snapshot lacks the admin flag"));
            }
            Ok(Loaded::Valid(snapshot))
        }
        AppVariant::Consumer => {
            let Some(user) = storage.get(keys::CURRENT_USER)? else {
                return Ok(Loaded::Missing);
            };
            match serde_json::from_str::<SessionSnapshot>(&user) {
                Ok(s) if !s.access_token.is_empty() => Ok(Loaded::Valid(s)),
                Ok(_) => Ok(Loaded::Invalid("snapshot has no access token")),
                Err(_) => Ok(Loaded::Invalid("snapshot is malformed")),
            }
        }
    }
}
