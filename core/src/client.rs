//! Stateless HTTP request builder and response parser for the paste API.
//!
//! # Design
//! `PasteClient` holds only its configuration and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The caller executes the round-trip, typically through
//! `http::dispatch`, keeping the core deterministic.
//!
//! Every `parse_*` goes through `normalize`, so all operations share one
//! success/error contract. Operations the service only allows for token
//! holders fail with `MissingToken` before a request is built.

use std::time::Duration;

use serde::Serialize;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::identity::{self, HostPattern, IdInput};
use crate::normalize::{normalize, normalize_value};
use crate::types::{CreatePaste, EditPaste, ListOptions, Paste, PastePage, User};

/// Synchronous, stateless client for the paste API.
#[derive(Debug, Clone)]
pub struct PasteClient {
    base_url: Url,
    token: Option<String>,
    hosts: HostPattern,
    timeout: Duration,
    user_agent: String,
}

impl PasteClient {
    /// Client for `base_url` with default settings and no token.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(ClientConfig::new(base_url))
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            base_url: config.parsed_base_url()?,
            hosts: config.effective_host_pattern()?,
            timeout: config.timeout()?,
            token: config.token,
            user_agent: config.user_agent,
        })
    }

    pub fn host_pattern(&self) -> &HostPattern {
        &self.hosts
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn build_create_paste(&self, input: &CreatePaste) -> Result<HttpRequest> {
        let payload = CreatePaste {
            encrypted: input.effective_encryption(),
            ..input.clone()
        };
        let url = self.endpoint(&["api", "pastes"])?;
        tracing::debug!(encrypted = payload.encrypted, "building create request");
        self.json_request(HttpMethod::Post, url, &payload)
    }

    /// `password` overrides a password embedded in a URL `id`.
    pub fn build_get_paste(
        &self,
        id: impl Into<IdInput>,
        password: Option<&str>,
    ) -> Result<HttpRequest> {
        let identity = identity::resolve(&id.into(), &self.hosts, password)?;
        let mut url = self.endpoint(&["api", "pastes", &identity.document_id])?;
        if let Some(password) = &identity.password {
            url.query_pairs_mut().append_pair("password", password);
        }
        tracing::debug!(id = %identity.document_id, "building get request");
        Ok(self.request(HttpMethod::Get, url, None))
    }

    pub fn build_edit_paste(&self, id: impl Into<IdInput>, input: &EditPaste) -> Result<HttpRequest> {
        self.require_token("edit")?;
        let id = identity::resolve_id(&id.into(), &self.hosts)?;
        let url = self.endpoint(&["api", "pastes", &id])?;
        tracing::debug!(%id, "building edit request");
        self.json_request(HttpMethod::Patch, url, input)
    }

    pub fn build_delete_paste(&self, id: impl Into<IdInput>) -> Result<HttpRequest> {
        self.require_token("delete")?;
        let id = identity::resolve_id(&id.into(), &self.hosts)?;
        let url = self.endpoint(&["api", "pastes", &id])?;
        tracing::debug!(%id, "building delete request");
        Ok(self.request(HttpMethod::Delete, url, None))
    }

    /// Check the configured token; the server answers with its owner.
    pub fn build_verify_token(&self) -> Result<HttpRequest> {
        self.require_token("verify")?;
        let url = self.endpoint(&["api", "verify"])?;
        Ok(self.request(HttpMethod::Get, url, None))
    }

    /// One page of the token owner's pastes.
    pub fn build_list_pastes(&self, options: ListOptions) -> Result<HttpRequest> {
        self.require_token("list")?;
        let mut url = self.endpoint(&["api", "pastes"])?;
        url.query_pairs_mut()
            .append_pair("page", &options.page.to_string())
            .append_pair("per_page", &options.per_page.to_string());
        Ok(self.request(HttpMethod::Get, url, None))
    }

    pub fn build_get_user(&self, username: &str) -> Result<HttpRequest> {
        if username.is_empty() {
            return Err(ApiError::MissingIdentifier);
        }
        let url = self.endpoint(&["api", "users", username])?;
        Ok(self.request(HttpMethod::Get, url, None))
    }

    pub fn parse_create_paste(&self, response: HttpResponse) -> Result<Paste> {
        normalize(&response)
    }

    pub fn parse_get_paste(&self, response: HttpResponse) -> Result<Paste> {
        normalize(&response)
    }

    pub fn parse_edit_paste(&self, response: HttpResponse) -> Result<Paste> {
        normalize(&response)
    }

    pub fn parse_delete_paste(&self, response: HttpResponse) -> Result<()> {
        normalize_value(response.status, &response.body, response.path.as_deref())?;
        Ok(())
    }

    pub fn parse_verify_token(&self, response: HttpResponse) -> Result<User> {
        normalize(&response)
    }

    pub fn parse_list_pastes(&self, response: HttpResponse) -> Result<PastePage> {
        normalize(&response)
    }

    pub fn parse_get_user(&self, response: HttpResponse) -> Result<User> {
        normalize(&response)
    }

    fn require_token(&self, operation: &'static str) -> Result<()> {
        if self.token.is_none() {
            return Err(ApiError::MissingToken { operation });
        }
        Ok(())
    }

    /// Append percent-encoded `segments` to the base URL's path.
    ///
    /// `.` and `..` are dropped by URL path normalization and would address
    /// a different resource, so they are not accepted as ids.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        if segments.iter().any(|segment| matches!(*segment, "." | "..")) {
            return Err(ApiError::MissingIdentifier);
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidConfig(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn json_request<T: Serialize>(&self, method: HttpMethod, url: Url, body: &T) -> Result<HttpRequest> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut request = self.request(method, url, Some(body));
        request
            .headers
            .push(("content-type".to_string(), "application/json".to_string()));
        Ok(request)
    }

    fn request(&self, method: HttpMethod, url: Url, body: Option<String>) -> HttpRequest {
        let mut headers = vec![
            ("accept".to_string(), "application/json".to_string()),
            ("user-agent".to_string(), self.user_agent.clone()),
        ];
        if let Some(token) = &self.token {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        HttpRequest {
            method,
            url: url.into(),
            headers,
            body,
            timeout: Some(self.timeout),
        }
    }
}
