//! Error types for the invest API client.
//!
//! # Design
//! Every non-2xx response and every transport failure funnels into `ApiError`
//! so callers handle all outcomes through one shape. `Api` carries the numeric
//! status and the decoded (or fallback) body for callers needing finer-grained
//! handling; `Transport` is the same kind of failure minus a status code.

use serde_json::Value;
use thiserror::Error;

/// Errors returned by `InvestClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    ///
    /// `message` is, in priority order: the body's `error` field, else its
    /// `message` field, else the HTTP status text, else `HTTP <status>`.
    /// `body` is the decoded JSON body, or `{"error": <status text or
    /// "Unknown error">}` when the body was not valid JSON.
    #[error("{message}")]
    Api {
        message: String,
        status: u16,
        body: Value,
    },

    /// The request never completed — DNS, connect, or read failure.
    #[error("request failed: {0}")]
    Transport(String),

    /// A 2xx body did not match the operation's expected shape.
    #[error("unexpected response shape: {0}")]
    Decode(String),

    /// The request payload could not be encoded as JSON.
    #[error("serialization failed: {0}")]
    Serialize(String),
}

impl ApiError {
    /// HTTP status of an application-level error, `None` for transport and
    /// local failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Decoded (or fallback) error body of an application-level error.
    pub fn body(&self) -> Option<&Value> {
        match self {
            ApiError::Api { body, .. } => Some(body),
            _ => None,
        }
    }
}
