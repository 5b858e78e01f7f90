//! Blocking `Transport` backed by ureq.
//!
//! Status codes are never treated as errors here: 4xx and 5xx responses come
//! back as data for the normalizer. Only failures without a response become
//! `TransportError`, with timeouts reported as `Aborted`.

use std::time::Duration;

use ureq::{Agent, RequestBuilder};

use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};

#[derive(Debug, Clone, Default)]
pub struct UreqTransport {
    default_timeout: Option<Duration>,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timeout used for requests that do not carry their own.
    pub fn with_default_timeout(timeout: Duration) -> Self {
        Self {
            default_timeout: Some(timeout),
        }
    }

    fn agent(&self, timeout: Option<Duration>) -> Agent {
        Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout.or(self.default_timeout))
            .build()
            .new_agent()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = self.agent(request.timeout);
        let url = request.url.as_str();
        let headers = &request.headers;

        let result = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => with_headers(agent.get(url), headers).call(),
            (HttpMethod::Delete, _) => with_headers(agent.delete(url), headers).call(),
            (HttpMethod::Post, body) => send(with_headers(agent.post(url), headers), body),
            (HttpMethod::Put, body) => send(with_headers(agent.put(url), headers), body),
            (HttpMethod::Patch, body) => send(with_headers(agent.patch(url), headers), body),
        };

        let mut response = result.map_err(classify)?;
        let status = response.status().as_u16();
        let response_headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(classify)?;

        Ok(HttpResponse {
            status,
            headers: response_headers,
            body,
            path: None,
        })
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send(
    builder: RequestBuilder<ureq::typestate::WithBody>,
    body: Option<&str>,
) -> Result<http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

fn classify(error: ureq::Error) -> TransportError {
    match error {
        ureq::Error::Timeout(_) => TransportError::Aborted(error.to_string()),
        other => TransportError::Failed(other.to_string()),
    }
}
