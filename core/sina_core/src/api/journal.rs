use axum::{
    extract::{Query, State},
    response::Response,
};
use tracing::info;

use super::{ok, ok_with, parse_body, AppState, CurrentUser, DayQuery, JsonBody, ListQuery};
use crate::clock::{format_date, format_ts, now_utc, today};
use crate::db::journal as store;
use crate::error::AppError;
use crate::validation::{validate_journal, JournalSave};

pub async fn post_save(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(q): Query<DayQuery>,
    payload: JsonBody,
) -> Result<Response, AppError> {
    let req: JournalSave = parse_body(payload)?;
    let (content, mood) = validate_journal(req)?;
    let now = now_utc();
    let entry_date = format_date(today(now, state.tz_offset(&q)));

    let conn = state.conn.lock().await;
    let entry = store::upsert_for_date(&conn, user.id, &entry_date, &content, mood, &format_ts(now))?;
    info!(user_id = user.id, "journal entry saved for {entry_date}");
    Ok(ok_with("Journal entry saved", entry))
}

pub async fn get_today(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(q): Query<DayQuery>,
) -> Result<Response, AppError> {
    let entry_date = format_date(today(now_utc(), state.tz_offset(&q)));
    let conn = state.conn.lock().await;
    Ok(ok(store::get_for_date(&conn, user.id, &entry_date)?))
}

pub async fn get_entries(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(q): Query<ListQuery>,
) -> Result<Response, AppError> {
    let conn = state.conn.lock().await;
    Ok(ok(store::list_entries(&conn, user.id, q.clamped())?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::testing::{register, send, test_app};

    #[tokio::test]
    async fn saving_twice_keeps_one_entry_with_latest_values() {
        let app = test_app();
        let token = register(&app, "sina").await;

        let (status, _) = send(
            &app,
            "POST",
            "/api/journal/save",
            Some(&token),
            Some(json!({"content": "morning notes"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send(
            &app,
            "POST",
            "/api/journal/save",
            Some(&token),
            Some(json!({"content": "evening notes", "mood": 2})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["mood"], 2);

        let (_, body) = send(&app, "GET", "/api/journal", Some(&token), None).await;
        let entries = body["data"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["content"], "evening notes");
        assert_eq!(entries[0]["mood"], 2);

        let (_, body) = send(&app, "GET", "/api/journal/today", Some(&token), None).await;
        assert_eq!(body["data"]["content"], "evening notes");
    }

    #[tokio::test]
    async fn missing_content_and_bad_mood_rejected() {
        let app = test_app();
        let token = register(&app, "sina").await;
        let (status, body) = send(&app, "POST", "/api/journal/save", Some(&token), Some(json!({"mood": 3}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_json");

        let (status, body) = send(
            &app,
            "POST",
            "/api/journal/save",
            Some(&token),
            Some(json!({"content": "x", "mood": 9})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_input");
    }
}
