use axum::{
    extract::{Path, Query, State},
    response::Response,
};

use super::{ok, ok_message, ok_with, parse_body, AppState, CurrentUser, DayQuery, JsonBody};
use crate::clock::{format_date, format_ts, now_utc, today};
use crate::db::habits as store;
use crate::error::AppError;
use crate::validation::{validate_habit, HabitInput};

pub async fn get_habits(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(q): Query<DayQuery>,
) -> Result<Response, AppError> {
    let day = format_date(today(now_utc(), state.tz_offset(&q)));
    let conn = state.conn.lock().await;
    Ok(ok(store::list_habits(&conn, user.id, &day)?))
}

pub async fn post_habit(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: JsonBody,
) -> Result<Response, AppError> {
    let req: HabitInput = parse_body(payload)?;
    let draft = validate_habit(req)?;
    let conn = state.conn.lock().await;
    let id = store::insert_habit(
        &conn,
        user.id,
        &draft.name,
        draft.description.as_deref(),
        &draft.frequency,
        draft.target_count,
        &format_ts(now_utc()),
    )?;
    Ok(ok_with("Habit created", serde_json::json!({ "id": id })))
}

pub async fn post_track(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Query(q): Query<DayQuery>,
) -> Result<Response, AppError> {
    let day = format_date(today(now_utc(), state.tz_offset(&q)));
    let conn = state.conn.lock().await;
    if !store::track_habit(&conn, user.id, id, &day, None)? {
        return Err(AppError::NotFound { entity: "habit" });
    }
    Ok(ok_message("Habit tracked"))
}
