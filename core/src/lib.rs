//! Async API client for the invest broker backend.
//!
//! # Overview
//! A thin typed wrapper over the backend's REST surface: auth, KYC, deposits,
//! withdrawals, plans, signals, settings, and the admin console actions. The
//! client is stateless — it holds only a base URL and an HTTP handle — and
//! every call is a single request/response round trip with no retry and no
//! caching.
//!
//! # Design
//! - Request construction and response normalization are pure functions over
//!   plain-data `ApiRequest` / `ApiResponse` values; only the transport
//!   module performs I/O.
//! - Every non-2xx response and every transport failure surfaces as one
//!   normalized [`ApiError`], so callers handle all outcomes uniformly.
//! - Credentials are an explicit [`Session`] passed per call; the client
//!   never reads or writes ambient token storage.
//! - Multiple calls may be in flight concurrently; dropping a call's future
//!   aborts its request.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
mod transport;
pub mod types;

pub use client::InvestClient;
pub use error::ApiError;
pub use http::{ApiRequest, ApiResponse, FormPart, HttpMethod, RequestBody};
pub use session::Session;
pub use types::{
    Ack, AuthResponse, BuyPlanRequest, ChangePasswordRequest, Deposit, KycRecord, LoginRequest,
    Plan, RegisterRequest, Signal, SubscribeSignalRequest, UserProfile, Withdrawal,
    WithdrawalRequest,
};
