//! Plain-data description of HTTP requests and responses.
//!
//! # Design
//! The client builds `ApiRequest` values and normalizes `ApiResponse` values
//! as pure functions; only the `transport` module touches the network. This
//! keeps request construction and error normalization deterministic and
//! testable without a server.
//!
//! A multipart request never carries an explicit `Content-Type` header here —
//! the transport lets the HTTP library pick the boundary. JSON requests always
//! carry `Content-Type: application/json`.

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

/// One field of a multipart form body.
#[derive(Debug, Clone)]
pub enum FormPart {
    /// A plain text field.
    Text { name: String, value: String },
    /// A file field with its original filename and raw bytes.
    File {
        name: String,
        filename: String,
        bytes: Vec<u8>,
    },
}

/// Body of an outbound request.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    /// Pre-serialized JSON; the builder adds the `application/json` header.
    Json(String),
    /// Multipart form data; the transport sets the multipart content type.
    Multipart(Vec<FormPart>),
}

/// An HTTP request described as plain data, built by `InvestClient` and
/// executed by the `transport` module.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

/// An HTTP response described as plain data, produced by the transport and
/// consumed by the response normalizer.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    /// Canonical reason phrase for the status, empty when unknown.
    pub status_text: String,
    pub body: String,
}
