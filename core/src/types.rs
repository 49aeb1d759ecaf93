//! Request payloads and response DTOs for the invest backend.
//!
//! # Design
//! The backend is loosely typed; response DTOs model the fields the UI relies
//! on and keep everything else in an `extra` bucket (`#[serde(flatten)]`) so
//! new backend fields survive a round trip through the client without a
//! schema change here. Field names follow the backend's camelCase wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payload for `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Payload for `POST /api/auth/login` and `POST /api/auth/admin/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Payload for `PUT /api/auth/admin/change-password`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub email: String,
    pub old_password: String,
    pub new_password: String,
}

/// Successful register/login response: a bearer token plus the user snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// User record as returned by the profile and admin-user endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub balance: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A deposit record; `status` is `pending`, `approved`, or `rejected`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deposit {
    pub id: String,
    pub amount: f64,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload for `POST /api/user/withdrawal`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub amount: f64,
}

/// A withdrawal record; same lifecycle states as [`Deposit`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Withdrawal {
    pub id: String,
    pub amount: f64,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A KYC submission. `data` is backend-defined and rendered generically by
/// the UI, so it stays an untyped JSON value here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycRecord {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub data: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An investment plan offered for purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub min_amount: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload for `POST /api/user/plan`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyPlanRequest {
    pub plan_id: String,
    pub amount: f64,
}

/// A trading-signal plan offered for subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload for `POST /api/user/signal/subscribe`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeSignalRequest {
    pub signal_id: String,
}

/// Generic acknowledgment for mutations that return no record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn auth_response_keeps_unmodeled_fields() {
        let body = json!({
            "token": "t1",
            "user": {"id": "u1", "username": "joe", "email": "joe@x.com"},
            "expiresIn": 3600
        });
        let auth: AuthResponse = serde_json::from_value(body).unwrap();
        assert_eq!(auth.token, "t1");
        assert_eq!(auth.user.username, "joe");
        assert_eq!(auth.extra["expiresIn"], 3600);
    }

    #[test]
    fn profile_balance_defaults_to_zero() {
        let body = json!({"id": "u1", "username": "joe", "email": "joe@x.com"});
        let user: UserProfile = serde_json::from_value(body).unwrap();
        assert_eq!(user.balance, 0.0);
    }

    #[test]
    fn deposit_uses_camel_case_wire_names() {
        let body = json!({
            "id": "d1",
            "amount": 250.0,
            "status": "pending",
            "createdAt": "2026-01-05T10:00:00Z"
        });
        let dep: Deposit = serde_json::from_value(body).unwrap();
        assert!(dep.created_at.is_some());
        assert!(dep.extra.is_empty());
    }

    #[test]
    fn kyc_data_stays_untyped() {
        let body = json!({
            "id": "k1",
            "status": "pending",
            "data": {"country": "DE", "documentType": "passport"}
        });
        let kyc: KycRecord = serde_json::from_value(body).unwrap();
        assert_eq!(kyc.data["country"], "DE");
    }

    #[test]
    fn buy_plan_serializes_camel_case() {
        let req = BuyPlanRequest {
            plan_id: "p1".to_string(),
            amount: 100.0,
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v, json!({"planId": "p1", "amount": 100.0}));
    }
}
