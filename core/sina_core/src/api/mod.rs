mod account;
mod dashboard;
mod habits;
mod journal;
mod sessions;
mod tasks;

pub use account::CurrentUser;

use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rand::rngs::StdRng;
use rusqlite::Connection;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use time::UtcOffset;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use crate::clock::{normalize_tz_offset_minutes, tz_offset_from_minutes};
use crate::error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub conn: Arc<Mutex<Connection>>,
    /// Quote picker; seeded once at startup.
    pub rng: Arc<Mutex<StdRng>>,
    pub default_tz_offset_minutes: i32,
}

impl AppState {
    pub fn new(conn: Connection, rng: StdRng, default_tz_offset_minutes: i32) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            rng: Arc::new(Mutex::new(rng)),
            default_tz_offset_minutes,
        }
    }

    pub fn tz_offset(&self, q: &DayQuery) -> UtcOffset {
        tz_offset_from_minutes(normalize_tz_offset_minutes(
            q.tz_offset_minutes,
            self.default_tz_offset_minutes,
        ))
    }
}

#[derive(Default, Deserialize)]
pub struct DayQuery {
    #[serde(default)]
    pub tz_offset_minutes: Option<i32>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

impl ListQuery {
    pub fn clamped(&self) -> usize {
        self.limit.clamp(1, 500)
    }
}

#[derive(Serialize)]
pub struct OkResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

pub fn ok<T: Serialize>(data: T) -> Response {
    Json(OkResponse {
        success: true,
        message: None,
        data: Some(data),
    })
    .into_response()
}

pub fn ok_message(message: &'static str) -> Response {
    Json(OkResponse::<Value> {
        success: true,
        message: Some(message),
        data: None,
    })
    .into_response()
}

pub fn ok_with<T: Serialize>(message: &'static str, data: T) -> Response {
    Json(OkResponse {
        success: true,
        message: Some(message),
        data: Some(data),
    })
    .into_response()
}

/// Request body as handlers receive it; the rejection is kept so it can be
/// answered with the error envelope.
pub type JsonBody = Result<Json<Value>, JsonRejection>;

/// Decodes a JSON body into its request record. Unreadable bodies, missing
/// required fields and wrong types are reported as `invalid_json`.
pub fn parse_body<T: DeserializeOwned>(payload: JsonBody) -> Result<T, AppError> {
    let Json(value) = payload?;
    serde_json::from_value(value).map_err(|e| AppError::InvalidJson(e.to_string()))
}

/// Maps "no row updated" to a not-found error for the named entity.
pub fn require_updated(changed: usize, entity: &'static str) -> Result<(), AppError> {
    if changed == 0 {
        Err(AppError::NotFound { entity })
    } else {
        Ok(())
    }
}

async fn options_ok() -> impl IntoResponse {
    StatusCode::OK
}

#[derive(Serialize)]
struct HealthInfo {
    service: &'static str,
    version: &'static str,
}

async fn health() -> impl IntoResponse {
    ok(HealthInfo {
        service: "sina_core",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ]);

    Router::new()
        .route("/health", get(health))
        .route(
            "/api/auth/register",
            post(account::post_register).options(options_ok),
        )
        .route("/api/auth/login", post(account::post_login).options(options_ok))
        .route("/api/auth/logout", post(account::post_logout).options(options_ok))
        .route(
            "/api/settings",
            get(account::get_settings)
                .post(account::post_settings)
                .options(options_ok),
        )
        .route("/api/dashboard", get(dashboard::get_dashboard))
        .route("/api/dashboard/stats", get(dashboard::get_dashboard_stats))
        .route("/api/sina", get(dashboard::get_sina))
        .route("/api/deadline/check", get(dashboard::get_deadline_check))
        .route("/api/analytics", get(dashboard::get_analytics))
        .route("/api/tasks", get(tasks::get_tasks))
        .route("/api/tasks/create", post(tasks::post_create).options(options_ok))
        .route("/api/tasks/complete", post(tasks::post_complete).options(options_ok))
        .route(
            "/api/tasks/uncomplete",
            post(tasks::post_uncomplete).options(options_ok),
        )
        .route(
            "/api/tasks/in-progress",
            post(tasks::post_in_progress).options(options_ok),
        )
        .route("/api/tasks/priority", post(tasks::post_priority).options(options_ok))
        .route(
            "/api/tasks/:id",
            get(tasks::get_task).put(tasks::put_task).options(options_ok),
        )
        .route("/api/sessions", get(sessions::get_sessions))
        .route("/api/sessions/log", post(sessions::post_log).options(options_ok))
        .route("/api/sessions/start", post(sessions::post_start).options(options_ok))
        .route("/api/journal", get(journal::get_entries))
        .route("/api/journal/today", get(journal::get_today))
        .route("/api/journal/save", post(journal::post_save).options(options_ok))
        .route(
            "/api/habits",
            get(habits::get_habits)
                .post(habits::post_habit)
                .options(options_ok),
        )
        .route(
            "/api/habits/:id/track",
            post(habits::post_track).options(options_ok),
        )
        .with_state(state)
        .layer(cors)
}
