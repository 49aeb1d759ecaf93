//! Base-URL resolution for the invest backend.
//!
//! The `INVEST_API_URL` environment variable overrides the default origin.
//! The value is resolved once per process and reused for every call — it is
//! not re-evaluated per request.

use std::sync::OnceLock;

/// Environment variable that overrides the default backend origin.
pub const API_URL_ENV: &str = "INVEST_API_URL";

/// Origin used when no override is supplied.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

static BASE_URL: OnceLock<String> = OnceLock::new();

/// Backend origin for this process: the `INVEST_API_URL` override if set,
/// else [`DEFAULT_API_URL`]. Trailing slashes are stripped.
pub fn base_url() -> &'static str {
    BASE_URL.get_or_init(|| {
        std::env::var(API_URL_ENV)
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_origin_has_no_trailing_slash() {
        assert!(!DEFAULT_API_URL.ends_with('/'));
    }

    #[test]
    fn base_url_is_stable_across_calls() {
        assert_eq!(base_url(), base_url());
    }
}
