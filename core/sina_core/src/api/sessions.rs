use axum::{
    extract::{Query, State},
    response::Response,
};
use rusqlite::Connection;

use super::{ok, ok_with, parse_body, AppState, CurrentUser, JsonBody, ListQuery};
use crate::clock::{format_ts, now_utc};
use crate::db::{sessions as store, tasks};
use crate::error::AppError;
use crate::validation::{validate_duration, validate_notes, SessionLog, SessionStart};

fn check_task_owner(conn: &Connection, user_id: i64, task_id: Option<i64>) -> Result<(), AppError> {
    match task_id {
        Some(id) if !tasks::task_exists(conn, user_id, id)? => {
            Err(AppError::NotFound { entity: "task" })
        }
        _ => Ok(()),
    }
}

pub async fn post_log(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: JsonBody,
) -> Result<Response, AppError> {
    let req: SessionLog = parse_body(payload)?;
    let duration = validate_duration(req.duration)?;
    let notes = validate_notes(req.notes);

    let conn = state.conn.lock().await;
    check_task_owner(&conn, user.id, req.task_id)?;
    let id = store::insert_session(
        &conn,
        user.id,
        req.task_id,
        duration,
        notes.as_deref(),
        &format_ts(now_utc()),
    )?;
    Ok(ok_with("Session logged", serde_json::json!({ "id": id })))
}

/// Opens a session that has no duration yet.
pub async fn post_start(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: JsonBody,
) -> Result<Response, AppError> {
    let req: SessionStart = parse_body(payload)?;
    let notes = validate_notes(req.notes);

    let conn = state.conn.lock().await;
    check_task_owner(&conn, user.id, req.task_id)?;
    let id = store::insert_session(
        &conn,
        user.id,
        req.task_id,
        0,
        notes.as_deref(),
        &format_ts(now_utc()),
    )?;
    Ok(ok_with("Session started", serde_json::json!({ "id": id })))
}

pub async fn get_sessions(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(q): Query<ListQuery>,
) -> Result<Response, AppError> {
    let conn = state.conn.lock().await;
    Ok(ok(store::list_sessions(&conn, user.id, q.clamped())?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::testing::{register, send, test_app};

    #[tokio::test]
    async fn log_and_list_sessions() {
        let app = test_app();
        let token = register(&app, "sina").await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/sessions/log",
            Some(&token),
            Some(json!({"duration": 25, "completed": true})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");

        let (_, body) = send(
            &app,
            "POST",
            "/api/tasks/create",
            Some(&token),
            Some(json!({"title": "Focus target"})),
        )
        .await;
        let task_id = body["data"]["id"].as_i64().unwrap();
        let (status, _) = send(
            &app,
            "POST",
            "/api/sessions/start",
            Some(&token),
            Some(json!({"task_id": task_id, "notes": "pomodoro"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, "GET", "/api/sessions?limit=10", Some(&token), None).await;
        let list = body["data"].as_array().unwrap();
        assert_eq!(list.len(), 2);
        let started = list.iter().find(|s| s["duration"] == 0).unwrap();
        assert_eq!(started["task_id"], task_id);
        assert_eq!(started["notes"], "pomodoro");
    }

    #[tokio::test]
    async fn rejects_negative_duration_and_foreign_task() {
        let app = test_app();
        let alice = register(&app, "alice").await;
        let bob = register(&app, "bob").await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/sessions/log",
            Some(&alice),
            Some(json!({"duration": -5})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_input");

        let (_, body) = send(
            &app,
            "POST",
            "/api/tasks/create",
            Some(&bob),
            Some(json!({"title": "Bob's"})),
        )
        .await;
        let bobs_task = body["data"]["id"].as_i64().unwrap();
        let (status, _) = send(
            &app,
            "POST",
            "/api/sessions/log",
            Some(&alice),
            Some(json!({"duration": 25, "task_id": bobs_task})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
