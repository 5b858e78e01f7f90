//! Client core for a remote paste service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). A `Transport` executes the
//! round-trip; `UreqTransport` is provided behind the default `ureq` feature.
//!
//! # Design
//! - `identity` turns a bare id or a share URL into a document id and an
//!   optional password.
//! - `normalize` is the single place every response is classified into a
//!   payload or an `ApiError`.
//! - `PasteClient` is stateless; each operation is a `build_*` / `parse_*`
//!   pair so the I/O boundary stays explicit.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod identity;
pub mod normalize;
#[cfg(feature = "ureq")]
pub mod transport;
pub mod types;

pub use client::PasteClient;
pub use config::ClientConfig;
pub use error::{ApiError, ErrorKind, Result};
pub use self::http::{dispatch, HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};
pub use identity::{resolve, resolve_id, resolve_password, HostPattern, IdInput, ParsedIdentity};
pub use normalize::{normalize, normalize_value, ResponseShape};
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{CreatePaste, EditPaste, ListOptions, Paste, PastePage, User, Visibility};
