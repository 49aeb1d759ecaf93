//! Async execution of one `ApiRequest` over reqwest.
//!
//! No retry, no backoff, no client-side timeout: each call is a single
//! request/response round trip. Cancellation is by dropping the future, which
//! aborts the in-flight request.

use reqwest::multipart;
use tracing::debug;

use crate::error::ApiError;
use crate::http::{ApiRequest, ApiResponse, FormPart, HttpMethod, RequestBody};

/// Execute a request and capture status, status text, and body text.
///
/// Transport failures (the request never completes) map to
/// `ApiError::Transport`; any received response, whatever its status, is
/// returned as data for the normalizer to interpret.
pub(crate) async fn execute(
    http: &reqwest::Client,
    request: ApiRequest,
) -> Result<ApiResponse, ApiError> {
    let method = match request.method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
    };
    debug!(method = %method, url = %request.url, "sending request");

    let mut builder = http.request(method, &request.url);
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder = match request.body {
        RequestBody::Empty => builder,
        RequestBody::Json(body) => builder.body(body),
        // reqwest sets the multipart content type and boundary itself.
        RequestBody::Multipart(parts) => builder.multipart(build_form(parts)),
    };

    let response = builder
        .send()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;
    debug!(status = status.as_u16(), "received response");

    Ok(ApiResponse {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
        body,
    })
}

fn build_form(parts: Vec<FormPart>) -> multipart::Form {
    let mut form = multipart::Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name, value),
            FormPart::File {
                name,
                filename,
                bytes,
            } => form.part(name, multipart::Part::bytes(bytes).file_name(filename)),
        };
    }
    form
}
