//! Typed client for the invest backend's REST API.
//!
//! # Design
//! `InvestClient` holds only a base URL and a reqwest handle and carries no
//! state between calls. Every operation follows the same path: a private
//! builder produces an `ApiRequest` as plain data, the transport executes it,
//! and `parse_response` normalizes the outcome — 2xx bodies pass through as
//! decoded JSON, everything else becomes `ApiError::Api` with the message
//! priority described in `error.rs`. Request building and normalization are
//! pure, so the contract is unit-testable without a server.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::config;
use crate::error::ApiError;
use crate::http::{ApiRequest, ApiResponse, FormPart, HttpMethod, RequestBody};
use crate::session::Session;
use crate::types::{
    Ack, AuthResponse, BuyPlanRequest, ChangePasswordRequest, Deposit, KycRecord, LoginRequest,
    Plan, RegisterRequest, Signal, SubscribeSignalRequest, UserProfile, Withdrawal,
    WithdrawalRequest,
};

/// Stateless async client for the invest backend.
///
/// Construct once and share; each call builds its own request in isolation.
/// Authenticated operations take an explicit [`Session`] and attach
/// `Authorization: Bearer <token>`; unauthenticated ones never send the
/// header. Dropping a call's future aborts the in-flight request.
#[derive(Debug, Clone)]
pub struct InvestClient {
    base_url: String,
    http: reqwest::Client,
}

impl InvestClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Client against the process-wide base URL (`INVEST_API_URL` override,
    /// else the built-in default), resolved once at startup.
    pub fn from_env() -> Self {
        Self::new(config::base_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // --- auth -----------------------------------------------------------

    pub async fn register(&self, input: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let req = self.post_json("/api/auth/register", input, None)?;
        self.send_as(req).await
    }

    pub async fn login(&self, input: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let req = self.post_json("/api/auth/login", input, None)?;
        self.send_as(req).await
    }

    pub async fn admin_login(&self, input: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let req = self.post_json("/api/auth/admin/login", input, None)?;
        self.send_as(req).await
    }

    pub async fn admin_change_password(
        &self,
        session: &Session,
        input: &ChangePasswordRequest,
    ) -> Result<Ack, ApiError> {
        let req = self.put_json("/api/auth/admin/change-password", input, Some(session))?;
        self.send_as(req).await
    }

    // --- user profile and funds -----------------------------------------

    pub async fn get_profile(&self, session: &Session) -> Result<UserProfile, ApiError> {
        self.send_as(self.get("/api/user/profile", Some(session)))
            .await
    }

    /// Submit a deposit request with its payment proof. The amount travels as
    /// a text field and the proof as a file field of one multipart form.
    pub async fn deposit(
        &self,
        session: &Session,
        amount: f64,
        proof_filename: &str,
        proof: Vec<u8>,
    ) -> Result<Deposit, ApiError> {
        let parts = vec![
            FormPart::Text {
                name: "amount".to_string(),
                value: amount.to_string(),
            },
            FormPart::File {
                name: "proof".to_string(),
                filename: proof_filename.to_string(),
                bytes: proof,
            },
        ];
        let req = self.post_multipart("/api/user/deposit", parts, session);
        self.send_as(req).await
    }

    pub async fn get_deposits(&self, session: &Session) -> Result<Vec<Deposit>, ApiError> {
        self.send_as(self.get("/api/user/deposits", Some(session)))
            .await
    }

    pub async fn withdraw(&self, session: &Session, amount: f64) -> Result<Withdrawal, ApiError> {
        let req = self.post_json(
            "/api/user/withdrawal",
            &WithdrawalRequest { amount },
            Some(session),
        )?;
        self.send_as(req).await
    }

    pub async fn get_withdrawals(&self, session: &Session) -> Result<Vec<Withdrawal>, ApiError> {
        self.send_as(self.get("/api/user/withdrawals", Some(session)))
            .await
    }

    // --- KYC ------------------------------------------------------------

    /// Submit KYC as a JSON payload (`{"kycData": ...}`).
    pub async fn submit_kyc(
        &self,
        session: &Session,
        kyc_data: &Value,
    ) -> Result<KycRecord, ApiError> {
        let req = self.post_json(
            "/api/user/kyc",
            &json!({ "kycData": kyc_data }),
            Some(session),
        )?;
        self.send_as(req).await
    }

    /// Submit KYC as a multipart form when identity documents are attached.
    pub async fn submit_kyc_documents(
        &self,
        session: &Session,
        parts: Vec<FormPart>,
    ) -> Result<KycRecord, ApiError> {
        let req = self.post_multipart("/api/user/kyc", parts, session);
        self.send_as(req).await
    }

    pub async fn get_kyc(&self, session: &Session) -> Result<KycRecord, ApiError> {
        self.send_as(self.get("/api/user/kyc", Some(session))).await
    }

    // --- plans and signals ----------------------------------------------

    pub async fn get_plans(&self, session: &Session) -> Result<Vec<Plan>, ApiError> {
        self.send_as(self.get("/api/user/plans", Some(session)))
            .await
    }

    pub async fn buy_plan(
        &self,
        session: &Session,
        input: &BuyPlanRequest,
    ) -> Result<Ack, ApiError> {
        let req = self.post_json("/api/user/plan", input, Some(session))?;
        self.send_as(req).await
    }

    pub async fn get_signals(&self, session: &Session) -> Result<Vec<Signal>, ApiError> {
        self.send_as(self.get("/api/user/signals", Some(session)))
            .await
    }

    pub async fn subscribe_signal(
        &self,
        session: &Session,
        input: &SubscribeSignalRequest,
    ) -> Result<Ack, ApiError> {
        let req = self.post_json("/api/user/signal/subscribe", input, Some(session))?;
        self.send_as(req).await
    }

    // --- settings -------------------------------------------------------

    /// Settings are backend-defined; the decoded body passes through as-is.
    pub async fn get_settings(&self, session: &Session) -> Result<Value, ApiError> {
        self.send(self.get("/api/user/settings", Some(session)))
            .await
    }

    pub async fn update_settings(
        &self,
        session: &Session,
        settings: &Value,
    ) -> Result<Ack, ApiError> {
        let req = self.put_json(
            "/api/user/settings",
            &json!({ "settings": settings }),
            Some(session),
        )?;
        self.send_as(req).await
    }

    // --- admin ----------------------------------------------------------

    pub async fn admin_list_kyc(&self, session: &Session) -> Result<Vec<KycRecord>, ApiError> {
        self.send_as(self.get("/api/admin/kyc", Some(session))).await
    }

    pub async fn admin_list_deposits(&self, session: &Session) -> Result<Vec<Deposit>, ApiError> {
        self.send_as(self.get("/api/admin/deposits", Some(session)))
            .await
    }

    pub async fn admin_list_withdrawals(
        &self,
        session: &Session,
    ) -> Result<Vec<Withdrawal>, ApiError> {
        self.send_as(self.get("/api/admin/withdrawals", Some(session)))
            .await
    }

    pub async fn admin_list_users(&self, session: &Session) -> Result<Vec<UserProfile>, ApiError> {
        self.send_as(self.get("/api/admin/users", Some(session)))
            .await
    }

    pub async fn admin_list_plans(&self, session: &Session) -> Result<Vec<Plan>, ApiError> {
        self.send_as(self.get("/api/admin/plans", Some(session)))
            .await
    }

    pub async fn admin_list_signals(&self, session: &Session) -> Result<Vec<Signal>, ApiError> {
        self.send_as(self.get("/api/admin/signals", Some(session)))
            .await
    }

    /// Approve a KYC submission by its record id.
    pub async fn approve_kyc(&self, session: &Session, id: &str) -> Result<Ack, ApiError> {
        let req = self.post_empty(&format!("/api/admin/kyc/{id}/approve"), session);
        self.send_as(req).await
    }

    /// Reject a KYC submission by its record id.
    pub async fn reject_kyc(&self, session: &Session, id: &str) -> Result<Ack, ApiError> {
        let req = self.post_empty(&format!("/api/admin/kyc/{id}/reject"), session);
        self.send_as(req).await
    }

    // --- request builders -----------------------------------------------

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn auth_headers(session: Option<&Session>) -> Vec<(String, String)> {
        match session {
            Some(s) => vec![("authorization".to_string(), s.bearer())],
            None => Vec::new(),
        }
    }

    fn get(&self, path: &str, session: Option<&Session>) -> ApiRequest {
        ApiRequest {
            method: HttpMethod::Get,
            url: self.url(path),
            headers: Self::auth_headers(session),
            body: RequestBody::Empty,
        }
    }

    fn post_empty(&self, path: &str, session: &Session) -> ApiRequest {
        ApiRequest {
            method: HttpMethod::Post,
            url: self.url(path),
            headers: Self::auth_headers(Some(session)),
            body: RequestBody::Empty,
        }
    }

    fn json_request<T: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        payload: &T,
        session: Option<&Session>,
    ) -> Result<ApiRequest, ApiError> {
        let body =
            serde_json::to_string(payload).map_err(|e| ApiError::Serialize(e.to_string()))?;
        let mut headers = Self::auth_headers(session);
        headers.push(("content-type".to_string(), "application/json".to_string()));
        Ok(ApiRequest {
            method,
            url: self.url(path),
            headers,
            body: RequestBody::Json(body),
        })
    }

    fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
        session: Option<&Session>,
    ) -> Result<ApiRequest, ApiError> {
        self.json_request(HttpMethod::Post, path, payload, session)
    }

    fn put_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
        session: Option<&Session>,
    ) -> Result<ApiRequest, ApiError> {
        self.json_request(HttpMethod::Put, path, payload, session)
    }

    // No content-type header here: the transport lets reqwest pick the
    // multipart boundary.
    fn post_multipart(&self, path: &str, parts: Vec<FormPart>, session: &Session) -> ApiRequest {
        ApiRequest {
            method: HttpMethod::Post,
            url: self.url(path),
            headers: Self::auth_headers(Some(session)),
            body: RequestBody::Multipart(parts),
        }
    }

    // --- execution ------------------------------------------------------

    /// Execute a request and normalize the outcome to decoded JSON.
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let response = crate::transport::execute(&self.http, request).await?;
        parse_response(response)
    }

    async fn send_as<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let value = self.send(request).await?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Decode the body as JSON, substituting `{"error": <status text or
/// "Unknown error">}` when it is not valid JSON.
fn decode_body(status_text: &str, body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| {
        let fallback = if status_text.is_empty() {
            "Unknown error"
        } else {
            status_text
        };
        json!({ "error": fallback })
    })
}

/// Normalize a response: 2xx passes the decoded body through, anything else
/// becomes `ApiError::Api` with the message priority `error` field, then
/// `message` field, then status text, then `HTTP <status>`.
fn parse_response(response: ApiResponse) -> Result<Value, ApiError> {
    let decoded = decode_body(&response.status_text, &response.body);
    if (200..300).contains(&response.status) {
        return Ok(decoded);
    }
    let message = decoded
        .get("error")
        .and_then(Value::as_str)
        .or_else(|| decoded.get("message").and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| {
            if response.status_text.is_empty() {
                format!("HTTP {}", response.status)
            } else {
                response.status_text.clone()
            }
        });
    Err(ApiError::Api {
        message,
        status: response.status,
        body: decoded,
    })
}
