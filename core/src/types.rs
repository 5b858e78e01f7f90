//! Domain DTOs for the paste service.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently;
//! integration tests catch any drift. Response types default missing fields
//! so older server revisions that omit them still deserialize.

use serde::{Deserialize, Serialize};

/// Who may see a paste.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Unlisted,
    Private,
}

/// A stored paste as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Paste {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub encrypted: bool,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub views: u64,
}

/// Request payload for creating a paste.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePaste {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub encrypted: bool,
    #[serde(default)]
    pub visibility: Visibility,
}

impl CreatePaste {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    /// A paste created with a password is always encrypted, whatever
    /// `encrypted` says.
    pub fn effective_encryption(&self) -> bool {
        self.encrypted || self.password.is_some()
    }
}

/// Request payload for editing a paste. Only present fields are changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditPaste {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

/// One page of the authenticated user's pastes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PastePage {
    pub pastes: Vec<Paste>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total: u64,
}

/// Public profile of a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub paste_count: u64,
}

/// Paging parameters for `list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub page: u32,
    pub per_page: u32,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}
