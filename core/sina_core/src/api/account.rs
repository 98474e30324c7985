use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{header, request::Parts},
    response::Response,
};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use super::{ok, ok_message, parse_body, AppState, JsonBody};
use crate::clock::{format_ts, now_utc};
use crate::db::users;
use crate::error::AppError;
use crate::validation::{
    apply_settings, validate_registration, LoginRequest, RegisterRequest, SettingsUpdate,
};

/// The authenticated caller, resolved from `Authorization: Bearer <token>`.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: i64,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::Unauthorized)?
            .to_string();

        let conn = state.conn.lock().await;
        match users::user_for_token(&conn, &token)? {
            Some(id) => Ok(CurrentUser { id, token }),
            None => Err(AppError::Unauthorized),
        }
    }
}

fn password_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// `salt$hex(sha256(salt || password))`
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    let digest = password_digest(&salt, password);
    format!("{salt}${digest}")
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, digest)) => password_digest(salt, password) == digest,
        None => false,
    }
}

#[derive(Serialize)]
struct Session {
    user_id: i64,
    username: String,
    token: String,
}

fn issue_token(conn: &rusqlite::Connection, user_id: i64) -> Result<String, AppError> {
    let token = Uuid::new_v4().simple().to_string();
    users::insert_token(conn, &token, user_id, &format_ts(now_utc()))?;
    Ok(token)
}

pub async fn post_register(
    State(state): State<AppState>,
    payload: JsonBody,
) -> Result<Response, AppError> {
    let req: RegisterRequest = parse_body(payload)?;
    let username = validate_registration(&req)?;
    let password_hash = hash_password(&req.password);

    let conn = state.conn.lock().await;
    let user_id = users::insert_user(&conn, &username, &password_hash, &format_ts(now_utc()))?;
    let token = issue_token(&conn, user_id)?;
    info!(user_id, "registered user {username}");

    Ok(ok(Session {
        user_id,
        username,
        token,
    }))
}

pub async fn post_login(
    State(state): State<AppState>,
    payload: JsonBody,
) -> Result<Response, AppError> {
    let req: LoginRequest = parse_body(payload)?;
    let username = req.username.trim().to_string();

    let conn = state.conn.lock().await;
    let (user_id, stored) =
        users::find_credentials(&conn, &username)?.ok_or(AppError::InvalidCredentials)?;
    if !verify_password(&req.password, &stored) {
        return Err(AppError::InvalidCredentials);
    }
    let token = issue_token(&conn, user_id)?;
    info!(user_id, "login");

    Ok(ok(Session {
        user_id,
        username,
        token,
    }))
}

pub async fn post_logout(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Response, AppError> {
    let conn = state.conn.lock().await;
    users::delete_token(&conn, &user.token)?;
    Ok(ok_message("Logged out. Remember, discipline is a daily choice."))
}

pub async fn get_settings(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Response, AppError> {
    let conn = state.conn.lock().await;
    Ok(ok(users::load_settings(&conn, user.id)?))
}

pub async fn post_settings(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: JsonBody,
) -> Result<Response, AppError> {
    let update: SettingsUpdate = parse_body(payload)?;
    let conn = state.conn.lock().await;
    let settings = apply_settings(users::load_settings(&conn, user.id)?, update)?;
    users::upsert_settings(&conn, user.id, &settings)?;
    Ok(ok(settings))
}
