// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session/auth state bootstrapped from persisted storage.

pub mod store;

pub use store::{AuthState, Route, SessionStore, SignOutReason};
