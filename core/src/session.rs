//! Session context passed explicitly to authenticated operations.
//!
//! The client never reads tokens from ambient storage and never caches them;
//! the caller owns the session and decides when it is created or discarded.

/// A bearer token for an authenticated user or admin session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Value for the `Authorization` header.
    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}
