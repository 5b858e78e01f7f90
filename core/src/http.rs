//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. `PasteClient` builds `HttpRequest`
//! values and parses `HttpResponse` values without touching the network; a
//! `Transport` implementation performs the actual round-trip. `dispatch` is
//! the one place transport failures are turned into `ApiError`s. It never
//! inspects status codes or bodies, which is the normalizer's job.

use std::time::Duration;

use crate::error::{ApiError, Result};

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by `PasteClient::build_*` methods. `url` is absolute; `path` is
/// derived from it for error reporting.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Path component of `url` (including the query), used to label errors.
    pub fn path(&self) -> String {
        match url::Url::parse(&self.url) {
            Ok(parsed) => match parsed.query() {
                Some(query) => format!("{}?{}", parsed.path(), redact_query(query)),
                None => parsed.path().to_string(),
            },
            Err(_) => self.url.clone(),
        }
    }

    /// Value of the first header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
///
/// Constructed by a `Transport` (or by hand in tests). An empty `body` means
/// the server sent none. `path` is the request path, stamped by `dispatch`.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub path: Option<String>,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Failure reported by a transport when no response was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Cancelled by the caller or timed out.
    Aborted(String),
    /// DNS, connect, TLS or any other I/O failure.
    Failed(String),
}

/// Capability to execute one `HttpRequest`.
///
/// Implementations must return the response for every status code, including
/// 4xx and 5xx, and must honour `HttpRequest::timeout`, reporting an expiry as
/// `TransportError::Aborted`.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportError>;
}

/// Execute `request` on `transport`, labelling the response (or the failure)
/// with the request path.
pub fn dispatch(transport: &dyn Transport, request: HttpRequest) -> Result<HttpResponse> {
    let path = request.path();
    tracing::debug!(method = request.method.as_str(), %path, "sending request");

    match transport.execute(&request) {
        Ok(mut response) => {
            tracing::debug!(status = response.status, %path, "received response");
            response.path = Some(path);
            Ok(response)
        }
        Err(TransportError::Aborted(message)) => {
            tracing::warn!(%path, %message, "request aborted");
            Err(ApiError::Aborted {
                message,
                path: Some(path),
            })
        }
        Err(TransportError::Failed(message)) => {
            tracing::warn!(%path, %message, "transport failure");
            Err(ApiError::Transport {
                message,
                path: Some(path),
            })
        }
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Passwords travel in the query string; keep them out of error messages.
fn redact_query(query: &str) -> String {
    let mut redacted = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        if key == "password" {
            redacted.append_pair(&key, "***");
        } else {
            redacted.append_pair(&key, &value);
        }
    }
    redacted.finish()
}
