// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

mod common;

use common::MockBackend;
use point_rewards_client::config::{AppVariant, Config};
use point_rewards_client::error::AppError;
use point_rewards_client::session::{AuthState, Route, SignOutReason};
use point_rewards_client::storage::MemoryStore;
use point_rewards_client::AppContext;
use serde_json::Value;
use std::sync::atomic::Ordering;
use std::sync::Arc;

#[tokio::test]
async fn test_expired_token_clears_session_without_retry() {
    let backend = MockBackend::start().await;
    backend.state.expire_tokens.store(true, Ordering::SeqCst);
    let (ctx, storage) = backend.signed_in(AppVariant::Consumer);
    let mut rx = ctx.session.subscribe();

    let err = ctx.auth.refresh_profile().await.expect_err("expired");

    assert!(err.is_session_expired());
    assert_eq!(backend.state.hits("GET /user/me"), 1);
    assert!(storage.is_empty());
    assert!(ctx.session.token().is_none());

    assert!(rx.has_changed().unwrap());
    let state = *rx.borrow_and_update();
    assert_eq!(
        state,
        AuthState::SignedOut {
            reason: SignOutReason::Expired
        }
    );
    assert_eq!(state.route(), Route::Login);
}

#[tokio::test]
async fn test_concurrent_401s_redirect_once() {
    let backend = MockBackend::start().await;
    backend.state.expire_tokens.store(true, Ordering::SeqCst);
    let (ctx, _) = backend.signed_in(AppVariant::Admin);
    let mut rx = ctx.session.subscribe();

    let (a, b, c) = tokio::join!(
        ctx.users.list(),
        ctx.prizes.list_admin(),
        ctx.redemptions.list_admin()
    );
    for result in [a.map(|_| ()), b.map(|_| ()), c.map(|_| ())] {
        let err = result.expect_err("all rejected");
        // Requests issued after the first 401 go out without a token.
        assert!(matches!(
            err,
            AppError::SessionExpired | AppError::Unauthorized(_)
        ));
    }

    assert!(rx.has_changed().unwrap());
    rx.borrow_and_update();
    assert!(!rx.has_changed().unwrap());
    assert_eq!(ctx.session.state().route(), Route::Login);
}

#[tokio::test]
async fn test_envelope_level_401_expires_session() {
    let backend = MockBackend::start().await;
    let (ctx, storage) = backend.signed_in(AppVariant::Consumer);

    let err = ctx
        .api
        .get::<Value>("/envelope-401")
        .await
        .expect_err("envelope 401");

    assert!(err.is_session_expired());
    assert!(storage.is_empty());
}

#[tokio::test]
async fn test_forbidden_keeps_session() {
    let backend = MockBackend::start().await;
    let (ctx, _) = backend.signed_in(AppVariant::Consumer);

    let err = ctx
        .api
        .get::<Value>("/forbidden")
        .await
        .expect_err("403");

    assert!(matches!(err, AppError::Forbidden(ref m) if m == "需要管理员权限"));
    assert!(ctx.session.is_authenticated());
}

#[tokio::test]
async fn test_non_json_server_error_is_http() {
    let backend = MockBackend::start().await;
    let (ctx, _) = backend.signed_in(AppVariant::Consumer);

    let err = ctx.api.get::<Value>("/broken").await.expect_err("500");

    match err {
        AppError::Http { status, message } => {
            assert_eq!(status, 500);
            assert!(message.contains("upstream error"));
        }
        other => panic!("expected Http, got {other:?}"),
    }
    assert!(ctx.session.is_authenticated());
}

#[tokio::test]
async fn test_success_status_with_error_code_is_api_error() {
    let backend = MockBackend::start().await;
    let (ctx, _) = backend.signed_in(AppVariant::Consumer);

    let err = ctx
        .api
        .get::<Value>("/soft-error")
        .await
        .expect_err("code 400");

    assert!(matches!(err, AppError::Api { code: 400, .. }));
    assert_eq!(err.notification(), "参数错误");
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // Port 9 (discard) on localhost is not expected to accept HTTP.
    let config = Config {
        api_base_url: "http://127.0.0.1:9/api".to_string(),
        request_timeout_secs: 2,
        ..Config::default()
    };
    let ctx = AppContext::with_storage(config, Arc::new(MemoryStore::new())).expect("context");

    let err = ctx.prizes.list_catalog().await.expect_err("no server");

    assert!(matches!(err, AppError::Network(_)));
    assert_eq!(err.notification(), "Network error, please try again later");
}

#[tokio::test]
async fn test_empty_object_data_is_empty_list() {
    let backend = MockBackend::start().await;
    let (ctx, _) = backend.signed_in(AppVariant::Consumer);

    let history = ctx.redemptions.history().await.expect("history");

    assert!(history.is_empty());
    assert_eq!(backend.state.hits("GET /redemptions/history"), 1);
}

#[tokio::test]
async fn test_requests_carry_bearer_token() {
    let backend = MockBackend::start().await;
    let (ctx, _) = backend.signed_in(AppVariant::Consumer);

    ctx.auth.refresh_profile().await.expect("refresh");

    let auth = backend.state.last_auth.lock().unwrap().clone();
    assert_eq!(
        auth.as_deref(),
        Some(format!("Bearer {}", common::VALID_TOKEN).as_str())
    );
}
