//! Response normalization and error classification.
//!
//! # Design
//! Every remote call's outcome is decided here. The body is first read into a
//! `ResponseShape`, one of the envelope layouts the service has used across
//! revisions, and then the status code and the extracted success flag decide
//! between the payload and one classified `ApiError`.
//!
//! Accepted shapes:
//! - `Enveloped` (current API): `{"success": bool, "message": str, "data": any}`
//! - `Legacy` (v1 API): `{"success": bool, "error": str, "result": any}`
//! - `Flat`: an object with a success flag but no payload key; the object
//!   itself is the payload.
//! - `Opaque`: no body, invalid JSON, or a non-object value.
//!
//! The status code is authoritative: a `"success": true` body on an error
//! status is still a failure. This module does no I/O and no logging.

use http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{ApiError, Result};
use crate::http::HttpResponse;

/// Wording used by an older backend when an encrypted document is requested
/// without a password. Matched byte-for-byte.
pub const LEGACY_ENCRYPTED_MESSAGE: &str =
    "you must supply a password because this resource is encrypted";

/// Message surfaced in place of `LEGACY_ENCRYPTED_MESSAGE`.
pub const ENCRYPTED_MESSAGE: &str = "This document is encrypted; supply its password to read it";

const NOT_AUTHORIZED_MESSAGE: &str = "Not authorized";
const NOT_FOUND_MESSAGE: &str = "Not found";

/// Body keys that may carry a human-readable message, in lookup order.
const MESSAGE_KEYS: [&str; 3] = ["message", "error", "msg"];

/// Body layout after parsing, one variant per accepted server revision.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape {
    Enveloped {
        success: Option<bool>,
        message: Option<String>,
        data: Value,
    },
    Legacy {
        success: Option<bool>,
        message: Option<String>,
        result: Value,
    },
    Flat {
        success: Option<bool>,
        message: Option<String>,
        body: Value,
    },
    Opaque,
}

impl ResponseShape {
    /// Parse `raw` into a shape. Never fails: unparsable bodies are `Opaque`.
    pub fn parse(raw: &str) -> Self {
        let mut object = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(object)) => object,
            _ => return ResponseShape::Opaque,
        };
        let success = object.get("success").and_then(Value::as_bool);
        let message = extract_message(&object);

        if let Some(data) = object.remove("data") {
            ResponseShape::Enveloped {
                success,
                message,
                data,
            }
        } else if let Some(result) = object.remove("result") {
            ResponseShape::Legacy {
                success,
                message,
                result,
            }
        } else {
            ResponseShape::Flat {
                success,
                message,
                body: Value::Object(object),
            }
        }
    }

    pub fn success(&self) -> Option<bool> {
        match self {
            ResponseShape::Enveloped { success, .. }
            | ResponseShape::Legacy { success, .. }
            | ResponseShape::Flat { success, .. } => *success,
            ResponseShape::Opaque => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ResponseShape::Enveloped { message, .. }
            | ResponseShape::Legacy { message, .. }
            | ResponseShape::Flat { message, .. } => message.as_deref(),
            ResponseShape::Opaque => None,
        }
    }

    fn into_payload(self) -> Value {
        match self {
            ResponseShape::Enveloped { data, .. } => data,
            ResponseShape::Legacy { result, .. } => result,
            ResponseShape::Flat { body, .. } => body,
            ResponseShape::Opaque => Value::Null,
        }
    }
}

/// Statuses the service uses for non-error responses.
pub fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Decide the outcome of one call from its status code and raw body.
///
/// Returns the unwrapped payload only when the status is a success status
/// and the body's success flag is literally `true`; every other combination
/// becomes an `ApiError`.
pub fn normalize_value(status: u16, raw_body: &str, path: Option<&str>) -> Result<Value> {
    let shape = ResponseShape::parse(raw_body);
    if is_success_status(status) && shape.success() == Some(true) {
        return Ok(shape.into_payload());
    }
    Err(classify(status, shape.message(), path))
}

/// Normalize `response` and deserialize the payload into `T`.
pub fn normalize<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
    let payload = normalize_value(response.status, &response.body, response.path.as_deref())?;
    serde_json::from_value(payload).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map a failed call to one error variant.
///
/// 401 and 404 have fixed messages. Any other status uses the body message,
/// then the status's canonical reason, then `"Status code {status}"`. The
/// legacy encrypted-document wording is replaced whatever the status.
pub fn classify(status: u16, body_message: Option<&str>, path: Option<&str>) -> ApiError {
    let remapped = body_message
        .filter(|message| *message == LEGACY_ENCRYPTED_MESSAGE)
        .map(|_| ENCRYPTED_MESSAGE.to_string());
    let path = path.map(str::to_string);
    let status_field = Some(status);

    match status {
        401 => ApiError::NotAuthorized {
            message: remapped.unwrap_or_else(|| NOT_AUTHORIZED_MESSAGE.to_string()),
            status: status_field,
            path,
        },
        404 => ApiError::NotFound {
            message: remapped.unwrap_or_else(|| NOT_FOUND_MESSAGE.to_string()),
            status: status_field,
            path,
        },
        _ => {
            let message = remapped
                .or_else(|| body_message.map(str::to_string))
                .or_else(|| status_reason(status).map(str::to_string))
                .unwrap_or_else(|| format!("Status code {status}"));
            ApiError::Remote {
                message,
                status: status_field,
                path,
            }
        }
    }
}

fn status_reason(status: u16) -> Option<&'static str> {
    StatusCode::from_u16(status).ok()?.canonical_reason()
}

fn extract_message(object: &Map<String, Value>) -> Option<String> {
    MESSAGE_KEYS
        .iter()
        .filter_map(|key| object.get(*key).and_then(Value::as_str))
        .find(|message| !message.is_empty())
        .map(str::to_string)
}
