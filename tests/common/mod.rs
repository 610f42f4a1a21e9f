// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process mock of the rewards backend for integration tests.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use dashmap::DashMap;
use point_rewards_client::config::{AppVariant, Config, DEFAULT_PASSWORD_SECRET};
use point_rewards_client::services::PasswordTransport;
use point_rewards_client::storage::{KeyValueStore, MemoryStore};
use point_rewards_client::AppContext;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Token the mock issues and accepts.
#[allow(dead_code)]
pub const VALID_TOKEN: &str = "test-access-token";

/// Phone number the mock accepts at login.
#[allow(dead_code)]
pub const TEST_PHONE: &str = "13800000000";

/// Login name of the seeded administrator.
#[allow(dead_code)]
pub const ADMIN_PHONE: &str = "admin";

/// Backend state shared with the test body.
#[derive(Default)]
pub struct MockState {
    hits: DashMap<String, usize>,
    /// Reject every bearer token with 401
    pub expire_tokens: AtomicBool,
    /// Admin flag on the user returned by login
    pub login_is_admin: AtomicBool,
    /// Fail the redeem call with 400
    pub redeem_fails: AtomicBool,
    pub users: Mutex<Vec<Value>>,
    pub prizes: Mutex<Vec<Value>>,
    pub redemptions: Mutex<Vec<Value>>,
    pub upload_result: Mutex<Value>,
    pub profile_points: Mutex<f64>,
    pub last_body: Mutex<Option<Value>>,
    pub last_auth: Mutex<Option<String>>,
}

impl MockState {
    fn hit(&self, route: &str) {
        *self.hits.entry(route.to_string()).or_insert(0) += 1;
    }

    /// Number of requests a route has served, e.g. `"GET /user/me"`.
    #[allow(dead_code)]
    pub fn hits(&self, route: &str) -> usize {
        self.hits.get(route).map(|n| *n).unwrap_or(0)
    }

    #[allow(dead_code)]
    pub fn total_hits(&self) -> usize {
        self.hits.iter().map(|e| *e.value()).sum()
    }

    #[allow(dead_code)]
    pub fn last_body(&self) -> Option<Value> {
        self.last_body.lock().unwrap().clone()
    }
}

pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        *state.profile_points.lock().unwrap() = 500.0;

        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/register", post(register))
            .route("/api/user/me", get(me))
            .route("/api/user/address", put(update_address))
            .route("/api/prizes", get(list_prizes))
            .route("/api/admin/prizes", get(list_admin_prizes).post(create_prize))
            .route("/api/admin/prizes/{id}", put(update_prize))
            .route("/api/admin/users", get(list_users))
            .route("/api/admin/users/{id}", put(update_user))
            .route("/api/admin/redemptions", get(list_redemptions))
            .route("/api/redemptions/history", get(history))
            .route("/api/redemptions/redeem", post(redeem))
            .route("/api/admin/upload-transaction", post(upload_transaction))
            .route("/api/admin/upload", post(upload_image))
            .route("/api/admin/download-template", get(download_template))
            .route("/api/broken", get(broken))
            .route("/api/envelope-401", get(envelope_401))
            .route("/api/forbidden", get(forbidden))
            .route("/api/soft-error", get(soft_error))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend");
        });

        Self {
            base_url: format!("http://{}/api", addr),
            state,
        }
    }

    pub fn config(&self, variant: AppVariant) -> Config {
        Config {
            api_base_url: self.base_url.clone(),
            variant,
            password_transport: PasswordTransport::Obscured,
            password_secret: DEFAULT_PASSWORD_SECRET.to_string(),
            ..Config::default()
        }
    }

    /// Context over in-memory storage.
    #[allow(dead_code)]
    pub fn context(&self, variant: AppVariant) -> (AppContext, Arc<MemoryStore>) {
        let storage = Arc::new(MemoryStore::new());
        let ctx = AppContext::with_storage(self.config(variant), storage.clone())
            .expect("context");
        (ctx, storage)
    }

    /// Context that already holds a valid session.
    #[allow(dead_code)]
    pub fn signed_in(&self, variant: AppVariant) -> (AppContext, Arc<MemoryStore>) {
        let storage = Arc::new(seeded_store(variant, variant == AppVariant::Admin));
        let ctx = AppContext::with_storage(self.config(variant), storage.clone())
            .expect("context");
        assert!(ctx.session.is_authenticated());
        (ctx, storage)
    }
}

/// Snapshot JSON as the login endpoint returns it.
#[allow(dead_code)]
pub fn snapshot_json(is_admin: bool) -> Value {
    json!({
        "id": 7,
        "nickname": "测试用户",
        "kuaishouId": "ks_test",
        "phone": TEST_PHONE,
        "points": "500.00",
        "addresses": ["浙江省杭州市西湖区"],
        "is_admin": is_admin,
        "access_token": VALID_TOKEN,
    })
}

/// Storage laid out the way a signed-in client leaves it.
#[allow(dead_code)]
pub fn seeded_store(variant: AppVariant, is_admin: bool) -> MemoryStore {
    let store = MemoryStore::new();
    let snapshot = snapshot_json(is_admin).to_string();
    match variant {
        AppVariant::Admin => {
            store.set("admin_token", VALID_TOKEN).unwrap();
            store.set("admin_user", &snapshot).unwrap();
        }
        AppVariant::Consumer => {
            store.set("point-rewards-current-user", &snapshot).unwrap();
        }
    }
    store
}

#[allow(dead_code)]
pub fn prize_json(id: i64, name: &str, points: f64, stock: u32, category: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("{} description", name),
        "points": points,
        "category": category,
        "stock": stock,
        "image": format!("/static/uploads/{}.png", id),
    })
}

fn envelope(status: StatusCode, message: &str, data: Value) -> Response {
    let body = json!({ "code": status.as_u16(), "message": message, "data": data });
    (status, Json(body)).into_response()
}

fn error(status: StatusCode, message: &str) -> Response {
    let body = json!({ "code": status.as_u16(), "message": message });
    (status, Json(body)).into_response()
}

/// JWT-extension style rejection: 401 with `{"msg": ...}` and no envelope.
fn check_token(state: &MockState, headers: &HeaderMap) -> Result<(), Response> {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *state.last_auth.lock().unwrap() = auth.clone();

    let expected = format!("Bearer {}", VALID_TOKEN);
    let valid = auth.as_deref() == Some(expected.as_str());
    if !valid || state.expire_tokens.load(Ordering::SeqCst) {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "msg": "Token has expired" })),
        )
            .into_response());
    }
    Ok(())
}

async fn login(
    State(s): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    s.hit("POST /auth/login");
    *s.last_body.lock().unwrap() = Some(body.clone());
    *s.last_auth.lock().unwrap() = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let password = body["password"].as_str().unwrap_or_default();
    if password.is_empty() {
        return error(StatusCode::UNAUTHORIZED, "手机号或密码错误");
    }
    // The backend seeds its administrator with a non-numeric phone.
    let snapshot = if body["phone"] == ADMIN_PHONE {
        let mut admin = snapshot_json(true);
        admin["phone"] = json!(ADMIN_PHONE);
        admin
    } else if body["phone"] == TEST_PHONE {
        snapshot_json(s.login_is_admin.load(Ordering::SeqCst))
    } else {
        return error(StatusCode::UNAUTHORIZED, "手机号或密码错误");
    };
    envelope(StatusCode::OK, "登录成功", snapshot)
}

async fn register(State(s): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    s.hit("POST /auth/register");
    *s.last_body.lock().unwrap() = Some(body.clone());
    envelope(
        StatusCode::CREATED,
        "用户注册成功",
        json!({
            "id": 11,
            "nickname": body["nickname"],
            "kuaishouId": body["kuaishouId"],
            "phone": body["phone"],
            "points": 0,
        }),
    )
}

async fn me(State(s): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    s.hit("GET /user/me");
    if let Err(r) = check_token(&s, &headers) {
        return r;
    }
    let points = *s.profile_points.lock().unwrap();
    envelope(
        StatusCode::OK,
        "获取用户信息成功",
        json!({ "points": format!("{:.2}", points), "addresses": ["浙江省杭州市西湖区"] }),
    )
}

async fn update_address(
    State(s): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    s.hit("PUT /user/address");
    if let Err(r) = check_token(&s, &headers) {
        return r;
    }
    *s.last_body.lock().unwrap() = Some(body.clone());
    let mut user = snapshot_json(false);
    user["addresses"] = json!([body["address"]]);
    envelope(StatusCode::OK, "地址更新成功", user)
}

async fn list_prizes(State(s): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    s.hit("GET /prizes");
    if headers.contains_key(header::AUTHORIZATION) {
        if let Err(r) = check_token(&s, &headers) {
            return r;
        }
    }
    let prizes = s.prizes.lock().unwrap().clone();
    envelope(StatusCode::OK, "获取奖品列表成功", Value::Array(prizes))
}

async fn list_admin_prizes(State(s): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    s.hit("GET /admin/prizes");
    if let Err(r) = check_token(&s, &headers) {
        return r;
    }
    let prizes = s.prizes.lock().unwrap().clone();
    envelope(StatusCode::OK, "获取奖品列表成功", Value::Array(prizes))
}

async fn create_prize(
    State(s): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    s.hit("POST /admin/prizes");
    if let Err(r) = check_token(&s, &headers) {
        return r;
    }
    *s.last_body.lock().unwrap() = Some(body.clone());
    let mut prize = body;
    prize["id"] = json!(100);
    s.prizes.lock().unwrap().push(prize.clone());
    envelope(StatusCode::CREATED, "奖品创建成功", prize)
}

async fn update_prize(
    State(s): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    s.hit("PUT /admin/prizes");
    if let Err(r) = check_token(&s, &headers) {
        return r;
    }
    *s.last_body.lock().unwrap() = Some(body.clone());
    let mut prizes = s.prizes.lock().unwrap();
    let Some(prize) = prizes.iter_mut().find(|p| p["id"] == id) else {
        return error(StatusCode::NOT_FOUND, "奖品不存在");
    };
    if let (Some(target), Some(changes)) = (prize.as_object_mut(), body.as_object()) {
        for (k, v) in changes {
            target.insert(k.clone(), v.clone());
        }
    }
    envelope(StatusCode::OK, "奖品信息更新成功", prize.clone())
}

async fn list_users(State(s): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    s.hit("GET /admin/users");
    if let Err(r) = check_token(&s, &headers) {
        return r;
    }
    let users = s.users.lock().unwrap().clone();
    envelope(StatusCode::OK, "获取用户列表成功", Value::Array(users))
}

async fn update_user(
    State(s): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    s.hit("PUT /admin/users");
    if let Err(r) = check_token(&s, &headers) {
        return r;
    }
    *s.last_body.lock().unwrap() = Some(body.clone());
    envelope(
        StatusCode::OK,
        "用户信息更新成功",
        json!({
            "id": id,
            "nickname": body.get("nickname").cloned().unwrap_or(json!("用户")),
            "kuaishouId": "ks",
            "phone": TEST_PHONE,
            "points": body.get("points").cloned().unwrap_or(json!(0)),
            "is_admin": false,
        }),
    )
}

async fn list_redemptions(State(s): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    s.hit("GET /admin/redemptions");
    if let Err(r) = check_token(&s, &headers) {
        return r;
    }
    let records = s.redemptions.lock().unwrap().clone();
    envelope(StatusCode::OK, "获取兑换记录成功", Value::Array(records))
}

/// Mirrors the backend's `data or {}`: an empty list arrives as `{}`.
async fn history(State(s): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    s.hit("GET /redemptions/history");
    if let Err(r) = check_token(&s, &headers) {
        return r;
    }
    let records = s.redemptions.lock().unwrap().clone();
    let data = if records.is_empty() {
        json!({})
    } else {
        Value::Array(records)
    };
    envelope(StatusCode::OK, "获取兑换历史成功", data)
}

async fn redeem(
    State(s): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    s.hit("POST /redemptions/redeem");
    if let Err(r) = check_token(&s, &headers) {
        return r;
    }
    *s.last_body.lock().unwrap() = Some(body);
    if s.redeem_fails.load(Ordering::SeqCst) {
        return error(StatusCode::BAD_REQUEST, "奖品库存不足");
    }
    *s.profile_points.lock().unwrap() -= 100.0;
    envelope(StatusCode::OK, "兑换成功", json!({}))
}

async fn upload_transaction(State(s): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    s.hit("POST /admin/upload-transaction");
    if let Err(r) = check_token(&s, &headers) {
        return r;
    }
    let result = s.upload_result.lock().unwrap().clone();
    envelope(StatusCode::OK, "流水数据处理完成", result)
}

async fn upload_image(State(s): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    s.hit("POST /admin/upload");
    if let Err(r) = check_token(&s, &headers) {
        return r;
    }
    envelope(
        StatusCode::OK,
        "文件上传成功",
        json!({ "url": "/static/uploads/abc123.png", "filename": "abc123.png" }),
    )
}

async fn download_template(State(s): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    s.hit("GET /admin/download-template");
    if let Err(r) = check_token(&s, &headers) {
        return r;
    }
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/octet-stream")],
        b"PK\x03\x04template".to_vec(),
    )
        .into_response()
}

async fn broken(State(s): State<Arc<MockState>>) -> Response {
    s.hit("GET /broken");
    (StatusCode::INTERNAL_SERVER_ERROR, "<html>upstream error</html>").into_response()
}

async fn envelope_401(State(s): State<Arc<MockState>>) -> Response {
    s.hit("GET /envelope-401");
    (
        StatusCode::OK,
        Json(json!({ "code": 401, "message": "登录已过期" })),
    )
        .into_response()
}

async fn forbidden(State(s): State<Arc<MockState>>) -> Response {
    s.hit("GET /forbidden");
    error(StatusCode::FORBIDDEN, "需要管理员权限")
}

async fn soft_error(State(s): State<Arc<MockState>>) -> Response {
    s.hit("GET /soft-error");
    (
        StatusCode::OK,
        Json(json!({ "code": 400, "message": "参数错误" })),
    )
        .into_response()
}
