//! In-memory paste service speaking the client's envelope format.
//!
//! Current routes answer `{"success", "message", "data"}`; the `/api/v1`
//! route answers the legacy `{"success", "error", "result"}` shape. Two users
//! are seeded: `alice` (token `test-token`) and `bob` (token `bob-token`).

use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const ALICE_TOKEN: &str = "test-token";
pub const BOB_TOKEN: &str = "bob-token";

/// Wording an older backend used for encrypted pastes requested without a
/// password. Kept verbatim so clients can be tested against it.
pub const LEGACY_ENCRYPTED_MESSAGE: &str =
    "you must supply a password because this resource is encrypted";

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Unlisted,
    Private,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Paste {
    pub id: String,
    pub title: String,
    pub content: String,
    pub language: Option<String>,
    pub encrypted: bool,
    pub visibility: Visibility,
    pub author: Option<String>,
    pub views: u64,
}

#[derive(Clone, Debug)]
struct StoredPaste {
    paste: Paste,
    password: Option<String>,
}

#[derive(Deserialize)]
pub struct CreatePaste {
    pub title: String,
    pub content: String,
    pub language: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub encrypted: bool,
    #[serde(default)]
    pub visibility: Visibility,
}

#[derive(Deserialize)]
pub struct EditPaste {
    pub title: Option<String>,
    pub content: Option<String>,
    pub language: Option<String>,
    pub visibility: Option<Visibility>,
}

#[derive(Deserialize)]
pub struct PasswordQuery {
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub display_name: Option<String>,
    pub paste_count: u64,
}

#[derive(Default)]
pub struct Db {
    pastes: RwLock<HashMap<String, StoredPaste>>,
    tokens: HashMap<String, String>,
    users: HashMap<String, Option<String>>,
}

pub type AppState = Arc<Db>;

pub fn app() -> Router {
    let mut db = Db::default();
    db.tokens.insert(ALICE_TOKEN.to_string(), "alice".to_string());
    db.tokens.insert(BOB_TOKEN.to_string(), "bob".to_string());
    db.users.insert("alice".to_string(), Some("Alice".to_string()));
    db.users.insert("bob".to_string(), None);

    Router::new()
        .route("/api/pastes", get(list_pastes).post(create_paste))
        .route(
            "/api/pastes/{id}",
            get(get_paste).patch(edit_paste).delete(delete_paste),
        )
        .route("/api/v1/pastes/{id}", get(get_paste_legacy))
        .route("/api/verify", get(verify_token))
        .route("/api/users/{username}", get(get_user))
        .route("/api/slow", get(slow))
        .with_state(Arc::new(db))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn success(status: StatusCode, data: impl Serialize) -> Response {
    (status, Json(json!({"success": true, "data": data}))).into_response()
}

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"success": false, "message": message}))).into_response()
}

fn caller(db: &Db, headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    db.tokens.get(token).cloned()
}

/// Check a paste's password; `Err` carries the message to report.
fn unlock(stored: &StoredPaste, supplied: Option<&str>) -> Result<(), &'static str> {
    match (&stored.password, supplied) {
        (None, _) => Ok(()),
        (Some(_), None) => Err(LEGACY_ENCRYPTED_MESSAGE),
        (Some(expected), Some(given)) if expected == given => Ok(()),
        (Some(_), Some(_)) => Err("incorrect password"),
    }
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

async fn create_paste(
    State(db): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CreatePaste>,
) -> Response {
    if input.content.is_empty() {
        return failure(StatusCode::UNPROCESSABLE_ENTITY, "content must not be empty");
    }
    let paste = Paste {
        id: new_id(),
        title: input.title,
        content: input.content,
        language: input.language,
        encrypted: input.encrypted || input.password.is_some(),
        visibility: input.visibility,
        author: caller(&db, &headers),
        views: 0,
    };
    tracing::debug!(id = %paste.id, encrypted = paste.encrypted, "paste created");
    let stored = StoredPaste {
        paste: paste.clone(),
        password: input.password,
    };
    db.pastes.write().await.insert(paste.id.clone(), stored);
    success(StatusCode::CREATED, paste)
}

async fn get_paste(
    State(db): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PasswordQuery>,
) -> Response {
    let mut pastes = db.pastes.write().await;
    let Some(stored) = pastes.get_mut(&id) else {
        return failure(StatusCode::NOT_FOUND, "paste not found");
    };
    if let Err(message) = unlock(stored, query.password.as_deref()) {
        return failure(StatusCode::FORBIDDEN, message);
    }
    stored.paste.views += 1;
    success(StatusCode::OK, &stored.paste)
}

async fn get_paste_legacy(
    State(db): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PasswordQuery>,
) -> Response {
    let pastes = db.pastes.read().await;
    let outcome = match pastes.get(&id) {
        None => Err((StatusCode::NOT_FOUND, "paste not found")),
        Some(stored) => unlock(stored, query.password.as_deref())
            .map(|()| stored.paste.clone())
            .map_err(|message| (StatusCode::FORBIDDEN, message)),
    };
    match outcome {
        Ok(paste) => (
            StatusCode::OK,
            Json(json!({"success": true, "result": paste})),
        )
            .into_response(),
        Err((status, message)) => (
            status,
            Json(json!({"success": false, "error": message})),
        )
            .into_response(),
    }
}

async fn edit_paste(
    State(db): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<EditPaste>,
) -> Response {
    let Some(user) = caller(&db, &headers) else {
        return failure(StatusCode::UNAUTHORIZED, "invalid token");
    };
    let mut pastes = db.pastes.write().await;
    let Some(stored) = pastes.get_mut(&id) else {
        return failure(StatusCode::NOT_FOUND, "paste not found");
    };
    if stored.paste.author.as_deref() != Some(user.as_str()) {
        return failure(StatusCode::FORBIDDEN, "you do not own this paste");
    }
    let paste = &mut stored.paste;
    if let Some(title) = input.title {
        paste.title = title;
    }
    if let Some(content) = input.content {
        paste.content = content;
    }
    if let Some(language) = input.language {
        paste.language = Some(language);
    }
    if let Some(visibility) = input.visibility {
        paste.visibility = visibility;
    }
    success(StatusCode::OK, &*paste)
}

async fn delete_paste(
    State(db): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let Some(user) = caller(&db, &headers) else {
        return failure(StatusCode::UNAUTHORIZED, "invalid token");
    };
    let mut pastes = db.pastes.write().await;
    match pastes.get(&id) {
        None => return failure(StatusCode::NOT_FOUND, "paste not found"),
        Some(stored) if stored.paste.author.as_deref() != Some(user.as_str()) => {
            return failure(StatusCode::FORBIDDEN, "you do not own this paste");
        }
        Some(_) => {}
    }
    pastes.remove(&id);
    (
        StatusCode::OK,
        Json(json!({"success": true, "message": "paste deleted"})),
    )
        .into_response()
}

async fn list_pastes(
    State(db): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response {
    let Some(user) = caller(&db, &headers) else {
        return failure(StatusCode::UNAUTHORIZED, "invalid token");
    };
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let pastes = db.pastes.read().await;
    let mut owned: Vec<Paste> = pastes
        .values()
        .filter(|stored| stored.paste.author.as_deref() == Some(user.as_str()))
        .map(|stored| stored.paste.clone())
        .collect();
    owned.sort_by(|a, b| a.id.cmp(&b.id));
    let total = owned.len();
    let start = (u64::from(page) - 1).saturating_mul(u64::from(per_page));
    let start = usize::try_from(start).unwrap_or(usize::MAX);
    let items: Vec<Paste> = owned.into_iter().skip(start).take(per_page as usize).collect();

    success(
        StatusCode::OK,
        json!({"pastes": items, "page": page, "per_page": per_page, "total": total}),
    )
}

async fn verify_token(State(db): State<AppState>, headers: HeaderMap) -> Response {
    match caller(&db, &headers) {
        Some(username) => success(StatusCode::OK, user_profile(&db, &username).await),
        None => failure(StatusCode::UNAUTHORIZED, "invalid token"),
    }
}

async fn get_user(State(db): State<AppState>, Path(username): Path<String>) -> Response {
    if !db.users.contains_key(&username) {
        return failure(StatusCode::NOT_FOUND, "user not found");
    }
    success(StatusCode::OK, user_profile(&db, &username).await)
}

async fn user_profile(db: &Db, username: &str) -> User {
    let paste_count = db
        .pastes
        .read()
        .await
        .values()
        .filter(|stored| stored.paste.author.as_deref() == Some(username))
        .count() as u64;
    User {
        username: username.to_string(),
        display_name: db.users.get(username).cloned().flatten(),
        paste_count,
    }
}

/// Answers after two seconds; lets clients exercise their timeouts.
async fn slow() -> Response {
    tokio::time::sleep(Duration::from_secs(2)).await;
    success(StatusCode::OK, Value::Null)
}
