//! In-memory mock of the invest broker backend.
//!
//! Implements the REST contract the client consumes — auth, profile,
//! deposits, withdrawals, KYC, plans, signals, settings, and the admin
//! console routes — against a single `Arc<RwLock<AppState>>`. Error bodies
//! are always `{"error": string}` JSON objects, matching the real backend.
//!
//! Business logic is the minimum needed to exercise the contract: deposits
//! credit the balance immediately (the real backend credits on approval) so
//! withdrawal flows can be driven end to end.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::{
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Seeded admin account.
pub const ADMIN_EMAIL: &str = "admin@invest.local";
pub const ADMIN_PASSWORD: &str = "admin123";

#[derive(Clone, Debug)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password: String,
    pub balance: f64,
}

impl UserRecord {
    fn public_json(&self) -> Value {
        json!({
            "id": self.id,
            "username": self.username,
            "email": self.email,
            "balance": self.balance,
        })
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub proof_filename: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KycEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub data: Value,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRecord {
    pub id: String,
    pub name: String,
    pub min_amount: f64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalRecord {
    pub id: String,
    pub name: String,
}

#[derive(Debug)]
pub struct AppState {
    users: HashMap<Uuid, UserRecord>,
    tokens: HashMap<String, Uuid>,
    admin_tokens: HashSet<String>,
    admin_password: String,
    deposits: Vec<DepositRecord>,
    withdrawals: Vec<WithdrawalRecord>,
    kyc: Vec<KycEntry>,
    plans: Vec<PlanRecord>,
    signals: Vec<SignalRecord>,
    plan_purchases: Vec<(Uuid, String)>,
    signal_subscriptions: Vec<(Uuid, String)>,
    settings: HashMap<Uuid, Value>,
}

impl AppState {
    fn seeded() -> Self {
        Self {
            users: HashMap::new(),
            tokens: HashMap::new(),
            admin_tokens: HashSet::new(),
            admin_password: ADMIN_PASSWORD.to_string(),
            deposits: Vec::new(),
            withdrawals: Vec::new(),
            kyc: Vec::new(),
            plans: vec![
                PlanRecord {
                    id: "starter".to_string(),
                    name: "Starter".to_string(),
                    min_amount: 100.0,
                },
                PlanRecord {
                    id: "growth".to_string(),
                    name: "Growth".to_string(),
                    min_amount: 1000.0,
                },
            ],
            signals: vec![
                SignalRecord {
                    id: "fx-daily".to_string(),
                    name: "FX Daily".to_string(),
                },
                SignalRecord {
                    id: "crypto-swing".to_string(),
                    name: "Crypto Swing".to_string(),
                },
            ],
            plan_purchases: Vec::new(),
            signal_subscriptions: Vec::new(),
            settings: HashMap::new(),
        }
    }
}

pub type Db = Arc<RwLock<AppState>>;

type ApiFailure = (StatusCode, Json<Value>);
type ApiResult = Result<Json<Value>, ApiFailure>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(AppState::seeded()));
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/admin/login", post(admin_login))
        .route("/api/auth/admin/change-password", put(admin_change_password))
        .route("/api/user/profile", get(get_profile))
        .route("/api/user/deposit", post(submit_deposit))
        .route("/api/user/deposits", get(list_deposits))
        .route("/api/user/withdrawal", post(submit_withdrawal))
        .route("/api/user/withdrawals", get(list_withdrawals))
        .route("/api/user/kyc", post(submit_kyc).get(get_kyc))
        .route("/api/user/plan", post(buy_plan))
        .route("/api/user/plans", get(list_plans))
        .route("/api/user/signal/subscribe", post(subscribe_signal))
        .route("/api/user/signals", get(list_signals))
        .route("/api/user/settings", get(get_settings).put(update_settings))
        .route("/api/admin/kyc", get(admin_list_kyc))
        .route("/api/admin/deposits", get(admin_list_deposits))
        .route("/api/admin/withdrawals", get(admin_list_withdrawals))
        .route("/api/admin/users", get(admin_list_users))
        .route("/api/admin/plans", get(admin_list_plans))
        .route("/api/admin/signals", get(admin_list_signals))
        .route("/api/admin/kyc/{id}/approve", post(approve_kyc))
        .route("/api/admin/kyc/{id}/reject", post(reject_kyc))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn failure(status: StatusCode, message: &str) -> ApiFailure {
    (status, Json(json!({ "error": message })))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

async fn authenticate_user(db: &Db, headers: &HeaderMap) -> Result<Uuid, ApiFailure> {
    let token =
        bearer_token(headers).ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Unauthorized"))?;
    let state = db.read().await;
    state
        .tokens
        .get(token)
        .copied()
        .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Unauthorized"))
}

async fn authenticate_admin(db: &Db, headers: &HeaderMap) -> Result<(), ApiFailure> {
    let token =
        bearer_token(headers).ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Unauthorized"))?;
    let state = db.read().await;
    if state.admin_tokens.contains(token) {
        Ok(())
    } else if state.tokens.contains_key(token) {
        Err(failure(StatusCode::FORBIDDEN, "Admin access required"))
    } else {
        Err(failure(StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
}

// --- auth ---------------------------------------------------------------

#[derive(Deserialize)]
struct RegisterInput {
    username: String,
    email: String,
    password: String,
}

async fn register(State(db): State<Db>, Json(input): Json<RegisterInput>) -> ApiResult {
    let mut state = db.write().await;
    if state.users.values().any(|u| u.email == input.email) {
        return Err(failure(StatusCode::CONFLICT, "Email already registered"));
    }
    let user = UserRecord {
        id: Uuid::new_v4(),
        username: input.username,
        email: input.email,
        password: input.password,
        balance: 0.0,
    };
    let token = Uuid::new_v4().to_string();
    state.tokens.insert(token.clone(), user.id);
    let body = json!({ "token": token, "user": user.public_json() });
    state.users.insert(user.id, user);
    Ok(Json(body))
}

#[derive(Deserialize)]
struct LoginInput {
    email: String,
    password: String,
}

async fn login(State(db): State<Db>, Json(input): Json<LoginInput>) -> ApiResult {
    let mut state = db.write().await;
    let user = state
        .users
        .values()
        .find(|u| u.email == input.email && u.password == input.password)
        .cloned()
        .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Invalid credentials"))?;
    let token = Uuid::new_v4().to_string();
    state.tokens.insert(token.clone(), user.id);
    Ok(Json(json!({ "token": token, "user": user.public_json() })))
}

async fn admin_login(State(db): State<Db>, Json(input): Json<LoginInput>) -> ApiResult {
    let mut state = db.write().await;
    if input.email != ADMIN_EMAIL || input.password != state.admin_password {
        return Err(failure(StatusCode::UNAUTHORIZED, "Invalid credentials"));
    }
    let token = Uuid::new_v4().to_string();
    state.admin_tokens.insert(token.clone());
    let user = json!({ "id": Uuid::nil(), "username": "admin", "email": ADMIN_EMAIL });
    Ok(Json(json!({ "token": token, "user": user })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordInput {
    email: String,
    old_password: String,
    new_password: String,
}

async fn admin_change_password(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<ChangePasswordInput>,
) -> ApiResult {
    authenticate_admin(&db, &headers).await?;
    let mut state = db.write().await;
    if input.email != ADMIN_EMAIL || input.old_password != state.admin_password {
        return Err(failure(StatusCode::BAD_REQUEST, "Old password is incorrect"));
    }
    state.admin_password = input.new_password;
    Ok(Json(json!({ "message": "Password updated" })))
}

// --- profile and funds --------------------------------------------------

async fn get_profile(State(db): State<Db>, headers: HeaderMap) -> ApiResult {
    let user_id = authenticate_user(&db, &headers).await?;
    let state = db.read().await;
    let user = state
        .users
        .get(&user_id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "User not found"))?;
    Ok(Json(user.public_json()))
}

async fn submit_deposit(
    State(db): State<Db>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ApiResult {
    let user_id = authenticate_user(&db, &headers).await?;

    let mut amount: Option<f64> = None;
    let mut proof_filename: Option<String> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| failure(StatusCode::BAD_REQUEST, "Malformed multipart body"))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "amount" => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| failure(StatusCode::BAD_REQUEST, "Malformed multipart body"))?;
                amount = text.parse().ok();
            }
            "proof" => {
                proof_filename = field.file_name().map(str::to_string);
                // Bytes are read and discarded; the mock has no object store.
                field
                    .bytes()
                    .await
                    .map_err(|_| failure(StatusCode::BAD_REQUEST, "Malformed multipart body"))?;
            }
            _ => {
                field.bytes().await.ok();
            }
        }
    }

    let amount = amount
        .filter(|a| *a > 0.0)
        .ok_or_else(|| failure(StatusCode::BAD_REQUEST, "Invalid amount"))?;
    let proof_filename = proof_filename
        .ok_or_else(|| failure(StatusCode::BAD_REQUEST, "Proof of payment is required"))?;

    let mut state = db.write().await;
    let record = DepositRecord {
        id: Uuid::new_v4(),
        user_id,
        amount,
        status: "pending".to_string(),
        created_at: Utc::now(),
        proof_filename,
    };
    if let Some(user) = state.users.get_mut(&user_id) {
        user.balance += amount;
    }
    state.deposits.push(record.clone());
    Ok(Json(serde_json::to_value(&record).unwrap()))
}

async fn list_deposits(State(db): State<Db>, headers: HeaderMap) -> ApiResult {
    let user_id = authenticate_user(&db, &headers).await?;
    let state = db.read().await;
    let mine: Vec<&DepositRecord> = state
        .deposits
        .iter()
        .filter(|d| d.user_id == user_id)
        .collect();
    Ok(Json(serde_json::to_value(&mine).unwrap()))
}

#[derive(Deserialize)]
struct WithdrawalInput {
    amount: f64,
}

async fn submit_withdrawal(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<WithdrawalInput>,
) -> ApiResult {
    let user_id = authenticate_user(&db, &headers).await?;
    let mut state = db.write().await;
    if input.amount <= 0.0 {
        return Err(failure(StatusCode::BAD_REQUEST, "Invalid amount"));
    }
    let balance = state.users.get(&user_id).map(|u| u.balance).unwrap_or(0.0);
    if input.amount > balance {
        return Err(failure(StatusCode::BAD_REQUEST, "Insufficient balance"));
    }
    if let Some(user) = state.users.get_mut(&user_id) {
        user.balance -= input.amount;
    }
    let record = WithdrawalRecord {
        id: Uuid::new_v4(),
        user_id,
        amount: input.amount,
        status: "pending".to_string(),
        created_at: Utc::now(),
    };
    state.withdrawals.push(record.clone());
    Ok(Json(serde_json::to_value(&record).unwrap()))
}

async fn list_withdrawals(State(db): State<Db>, headers: HeaderMap) -> ApiResult {
    let user_id = authenticate_user(&db, &headers).await?;
    let state = db.read().await;
    let mine: Vec<&WithdrawalRecord> = state
        .withdrawals
        .iter()
        .filter(|w| w.user_id == user_id)
        .collect();
    Ok(Json(serde_json::to_value(&mine).unwrap()))
}

// --- KYC ----------------------------------------------------------------

/// Accepts either a JSON `{"kycData": ...}` payload or a multipart form with
/// text fields and document files; both land in the same record shape.
async fn submit_kyc(State(db): State<Db>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let user_id = match authenticate_user(&db, &parts.headers).await {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let request = Request::from_parts(parts, body);

    let data = if content_type.starts_with("multipart/form-data") {
        match read_kyc_multipart(request).await {
            Ok(data) => data,
            Err(e) => return e.into_response(),
        }
    } else {
        let bytes = match axum::body::to_bytes(request.into_body(), 1024 * 1024).await {
            Ok(b) => b,
            Err(_) => {
                return failure(StatusCode::BAD_REQUEST, "Malformed request body")
                    .into_response()
            }
        };
        let value: Value = match serde_json::from_slice(&bytes) {
            Ok(v) => v,
            Err(_) => {
                return failure(StatusCode::BAD_REQUEST, "Malformed request body")
                    .into_response()
            }
        };
        match value.get("kycData").cloned() {
            Some(data) => data,
            None => {
                return failure(StatusCode::BAD_REQUEST, "kycData is required").into_response()
            }
        }
    };

    let mut state = db.write().await;
    // Resubmission replaces the previous record and resets the status.
    state.kyc.retain(|k| k.user_id != user_id);
    let entry = KycEntry {
        id: Uuid::new_v4(),
        user_id,
        status: "pending".to_string(),
        data,
    };
    state.kyc.push(entry.clone());
    Json(serde_json::to_value(&entry).unwrap()).into_response()
}

async fn read_kyc_multipart(request: Request) -> Result<Value, ApiFailure> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|_| failure(StatusCode::BAD_REQUEST, "Malformed multipart body"))?;
    let mut data = serde_json::Map::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| failure(StatusCode::BAD_REQUEST, "Malformed multipart body"))?
    {
        let name = field.name().unwrap_or("").to_string();
        if let Some(filename) = field.file_name().map(str::to_string) {
            field
                .bytes()
                .await
                .map_err(|_| failure(StatusCode::BAD_REQUEST, "Malformed multipart body"))?;
            data.insert(name, Value::String(filename));
        } else {
            let text = field
                .text()
                .await
                .map_err(|_| failure(StatusCode::BAD_REQUEST, "Malformed multipart body"))?;
            data.insert(name, Value::String(text));
        }
    }
    Ok(Value::Object(data))
}

async fn get_kyc(State(db): State<Db>, headers: HeaderMap) -> ApiResult {
    let user_id = authenticate_user(&db, &headers).await?;
    let state = db.read().await;
    let entry = state
        .kyc
        .iter()
        .find(|k| k.user_id == user_id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "KYC not submitted"))?;
    Ok(Json(serde_json::to_value(entry).unwrap()))
}

// --- plans and signals --------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuyPlanInput {
    plan_id: String,
    amount: f64,
}

async fn buy_plan(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<BuyPlanInput>,
) -> ApiResult {
    let user_id = authenticate_user(&db, &headers).await?;
    let mut state = db.write().await;
    let plan = state
        .plans
        .iter()
        .find(|p| p.id == input.plan_id)
        .cloned()
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Plan not found"))?;
    if input.amount < plan.min_amount {
        return Err(failure(StatusCode::BAD_REQUEST, "Amount below plan minimum"));
    }
    state.plan_purchases.push((user_id, plan.id));
    Ok(Json(json!({ "message": "Plan purchased" })))
}

async fn list_plans(State(db): State<Db>, headers: HeaderMap) -> ApiResult {
    authenticate_user(&db, &headers).await?;
    let state = db.read().await;
    Ok(Json(serde_json::to_value(&state.plans).unwrap()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscribeSignalInput {
    signal_id: String,
}

async fn subscribe_signal(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<SubscribeSignalInput>,
) -> ApiResult {
    let user_id = authenticate_user(&db, &headers).await?;
    let mut state = db.write().await;
    let signal = state
        .signals
        .iter()
        .find(|s| s.id == input.signal_id)
        .cloned()
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Signal not found"))?;
    state.signal_subscriptions.push((user_id, signal.id));
    Ok(Json(json!({ "message": "Subscribed" })))
}

async fn list_signals(State(db): State<Db>, headers: HeaderMap) -> ApiResult {
    authenticate_user(&db, &headers).await?;
    let state = db.read().await;
    Ok(Json(serde_json::to_value(&state.signals).unwrap()))
}

// --- settings -----------------------------------------------------------

async fn get_settings(State(db): State<Db>, headers: HeaderMap) -> ApiResult {
    let user_id = authenticate_user(&db, &headers).await?;
    let state = db.read().await;
    let settings = state.settings.get(&user_id).cloned().unwrap_or(json!({}));
    Ok(Json(settings))
}

async fn update_settings(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResult {
    let user_id = authenticate_user(&db, &headers).await?;
    let settings = body
        .get("settings")
        .cloned()
        .ok_or_else(|| failure(StatusCode::BAD_REQUEST, "Settings payload is required"))?;
    let mut state = db.write().await;
    state.settings.insert(user_id, settings);
    Ok(Json(json!({ "message": "Settings updated" })))
}

// --- admin --------------------------------------------------------------

async fn admin_list_kyc(State(db): State<Db>, headers: HeaderMap) -> ApiResult {
    authenticate_admin(&db, &headers).await?;
    let state = db.read().await;
    Ok(Json(serde_json::to_value(&state.kyc).unwrap()))
}

async fn admin_list_deposits(State(db): State<Db>, headers: HeaderMap) -> ApiResult {
    authenticate_admin(&db, &headers).await?;
    let state = db.read().await;
    Ok(Json(serde_json::to_value(&state.deposits).unwrap()))
}

async fn admin_list_withdrawals(State(db): State<Db>, headers: HeaderMap) -> ApiResult {
    authenticate_admin(&db, &headers).await?;
    let state = db.read().await;
    Ok(Json(serde_json::to_value(&state.withdrawals).unwrap()))
}

async fn admin_list_users(State(db): State<Db>, headers: HeaderMap) -> ApiResult {
    authenticate_admin(&db, &headers).await?;
    let state = db.read().await;
    let users: Vec<Value> = state.users.values().map(UserRecord::public_json).collect();
    Ok(Json(Value::Array(users)))
}

async fn admin_list_plans(State(db): State<Db>, headers: HeaderMap) -> ApiResult {
    authenticate_admin(&db, &headers).await?;
    let state = db.read().await;
    Ok(Json(serde_json::to_value(&state.plans).unwrap()))
}

async fn admin_list_signals(State(db): State<Db>, headers: HeaderMap) -> ApiResult {
    authenticate_admin(&db, &headers).await?;
    let state = db.read().await;
    Ok(Json(serde_json::to_value(&state.signals).unwrap()))
}

async fn approve_kyc(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult {
    set_kyc_status(&db, &headers, id, "approved").await?;
    Ok(Json(json!({ "message": "KYC approved" })))
}

async fn reject_kyc(State(db): State<Db>, Path(id): Path<Uuid>, headers: HeaderMap) -> ApiResult {
    set_kyc_status(&db, &headers, id, "rejected").await?;
    Ok(Json(json!({ "message": "KYC rejected" })))
}

async fn set_kyc_status(
    db: &Db,
    headers: &HeaderMap,
    id: Uuid,
    status: &str,
) -> Result<(), ApiFailure> {
    authenticate_admin(db, headers).await?;
    let mut state = db.write().await;
    let entry = state
        .kyc
        .iter_mut()
        .find(|k| k.id == id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "KYC record not found"))?;
    entry.status = status.to_string();
    Ok(())
}
