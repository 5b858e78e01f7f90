//! Resolution of user-supplied document ids.
//!
//! # Design
//! Callers may hand over a bare id (`"aB3xYz"`), a share URL
//! (`"https://paste.example.com/aB3xYz?password=s3cret"`) or an already
//! parsed `Url`. Whether a string is a URL is decided by one explicit parse
//! step: it must parse with `Url::parse` and carry a host. Anything else is a
//! bare id and is returned untouched.
//!
//! Which hosts belong to the service is a `HostPattern` value passed in by
//! the caller, so one build can talk to several deployments.
//!
//! The id and the password are resolved independently: an explicit password
//! always wins and the URL is only consulted when none was given.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Deserializer};
use url::Url;

use crate::error::{ApiError, Result};

/// A document id as supplied by a user: a raw string or a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdInput {
    Raw(String),
    Url(Url),
}

impl From<&str> for IdInput {
    fn from(value: &str) -> Self {
        IdInput::Raw(value.to_string())
    }
}

impl From<String> for IdInput {
    fn from(value: String) -> Self {
        IdInput::Raw(value)
    }
}

impl From<&String> for IdInput {
    fn from(value: &String) -> Self {
        IdInput::Raw(value.clone())
    }
}

impl From<Url> for IdInput {
    fn from(value: Url) -> Self {
        IdInput::Url(value)
    }
}

impl From<&IdInput> for IdInput {
    fn from(value: &IdInput) -> Self {
        value.clone()
    }
}

/// Ids read from JSON documents (configs, fixtures) must be strings.
impl TryFrom<&serde_json::Value> for IdInput {
    type Error = ApiError;

    fn try_from(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::String(s) => Ok(IdInput::Raw(s.clone())),
            serde_json::Value::Null => Err(ApiError::MissingIdentifier),
            _ => Err(ApiError::InvalidIdentifierType),
        }
    }
}

/// Matcher deciding which hostnames belong to the paste service.
#[derive(Debug, Clone)]
pub struct HostPattern(Regex);

impl HostPattern {
    /// Compile `pattern` as a regular expression over the bare hostname.
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self(Regex::new(pattern)?))
    }

    /// Match exactly `host` and its `www.` alias.
    pub fn for_host(host: &str) -> Result<Self> {
        let host = host.trim_start_matches("www.");
        Self::new(&format!("^(?:www\\.)?{}$", regex::escape(host)))
    }

    pub fn matches(&self, host: &str) -> bool {
        self.0.is_match(&host.to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for HostPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HostPattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let pattern = String::deserialize(deserializer)?;
        HostPattern::new(&pattern).map_err(serde::de::Error::custom)
    }
}

/// Canonical id plus the password that applies to this call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedIdentity {
    pub document_id: String,
    pub password: Option<String>,
}

/// Resolve the document id from `input`.
///
/// Bare ids are returned unchanged. For URLs whose host matches `hosts`, the
/// last non-empty path segment is the id, so `/abc/` yields `abc`. URLs for
/// other hosts, or without any path segment, fail with `MissingIdentifier`.
/// The id is not percent-decoded.
pub fn resolve_id(input: &IdInput, hosts: &HostPattern) -> Result<String> {
    match input {
        IdInput::Raw(raw) => {
            if raw.is_empty() {
                return Err(ApiError::MissingIdentifier);
            }
            match parse_absolute(raw) {
                Some(url) => id_from_url(&url, hosts),
                None => Ok(raw.clone()),
            }
        }
        IdInput::Url(url) => id_from_url(url, hosts),
    }
}

/// Resolve the password embedded in `input` as a `password` query parameter.
///
/// Bare ids never carry a password. An empty parameter counts as absent.
pub fn resolve_password(input: &IdInput) -> Result<Option<String>> {
    match input {
        IdInput::Raw(raw) => {
            if raw.is_empty() {
                return Err(ApiError::MissingIdentifier);
            }
            Ok(parse_absolute(raw).and_then(|url| password_from_url(&url)))
        }
        IdInput::Url(url) => Ok(password_from_url(url)),
    }
}

/// Resolve id and password for one call.
///
/// `explicit_password` overrides anything embedded in the URL; the URL is
/// only searched for a password when no explicit one is supplied.
pub fn resolve(
    input: &IdInput,
    hosts: &HostPattern,
    explicit_password: Option<&str>,
) -> Result<ParsedIdentity> {
    let document_id = resolve_id(input, hosts)?;
    let password = match explicit_password {
        Some(password) => Some(password.to_string()),
        None => resolve_password(input)?,
    };
    Ok(ParsedIdentity {
        document_id,
        password,
    })
}

/// A string counts as a URL only if it parses and names a host.
fn parse_absolute(raw: &str) -> Option<Url> {
    Url::parse(raw).ok().filter(|url| url.host_str().is_some())
}

fn id_from_url(url: &Url, hosts: &HostPattern) -> Result<String> {
    let host = url.host_str().ok_or(ApiError::MissingIdentifier)?;
    if !hosts.matches(host) {
        return Err(ApiError::MissingIdentifier);
    }
    url.path()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
        .ok_or(ApiError::MissingIdentifier)
}

fn password_from_url(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "password")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
