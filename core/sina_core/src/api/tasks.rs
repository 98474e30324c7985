use axum::{
    extract::{Path, Query, State},
    response::Response,
};

use super::{
    ok, ok_message, ok_with, parse_body, require_updated, AppState, CurrentUser, DayQuery, JsonBody,
};
use crate::clock::{format_ts, now_utc};
use crate::db::tasks as store;
use crate::error::AppError;
use crate::validation::{validate_priority, validate_task, PriorityUpdate, TaskInput, TaskRef};

pub async fn get_tasks(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Response, AppError> {
    let conn = state.conn.lock().await;
    Ok(ok(store::list_tasks(&conn, user.id)?))
}

pub async fn get_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let conn = state.conn.lock().await;
    let task = store::get_task(&conn, user.id, id)?.ok_or(AppError::NotFound { entity: "task" })?;
    Ok(ok(task))
}

pub async fn post_create(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(q): Query<DayQuery>,
    payload: JsonBody,
) -> Result<Response, AppError> {
    let input: TaskInput = parse_body(payload)?;
    let draft = validate_task(input, state.tz_offset(&q))?;

    let conn = state.conn.lock().await;
    let id = store::insert_task(&conn, user.id, &draft, &format_ts(now_utc()))?;
    let task = store::get_task(&conn, user.id, id)?.ok_or(AppError::NotFound { entity: "task" })?;
    Ok(ok_with("Task created successfully", task))
}

pub async fn put_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Query(q): Query<DayQuery>,
    payload: JsonBody,
) -> Result<Response, AppError> {
    let input: TaskInput = parse_body(payload)?;
    let draft = validate_task(input, state.tz_offset(&q))?;

    let conn = state.conn.lock().await;
    require_updated(store::update_task(&conn, user.id, id, &draft)?, "task")?;
    let task = store::get_task(&conn, user.id, id)?.ok_or(AppError::NotFound { entity: "task" })?;
    Ok(ok_with("Task updated", task))
}

pub async fn post_complete(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: JsonBody,
) -> Result<Response, AppError> {
    let req: TaskRef = parse_body(payload)?;
    let conn = state.conn.lock().await;
    let completed_at = format_ts(now_utc());
    require_updated(
        store::set_completed(&conn, user.id, req.task_id, Some(&completed_at))?,
        "task",
    )?;
    Ok(ok_message("Task completed"))
}

pub async fn post_uncomplete(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: JsonBody,
) -> Result<Response, AppError> {
    let req: TaskRef = parse_body(payload)?;
    let conn = state.conn.lock().await;
    require_updated(store::set_completed(&conn, user.id, req.task_id, None)?, "task")?;
    Ok(ok_message("Task uncompleted"))
}

pub async fn post_in_progress(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: JsonBody,
) -> Result<Response, AppError> {
    let req: TaskRef = parse_body(payload)?;
    let conn = state.conn.lock().await;
    require_updated(store::set_in_progress(&conn, user.id, req.task_id)?, "task")?;
    Ok(ok_message("Task marked as in progress"))
}

pub async fn post_priority(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: JsonBody,
) -> Result<Response, AppError> {
    let req: PriorityUpdate = parse_body(payload)?;
    let priority = validate_priority(Some(&req.priority))?;
    let conn = state.conn.lock().await;
    require_updated(store::set_priority(&conn, user.id, req.task_id, priority)?, "task")?;
    Ok(ok_message("Task priority updated"))
}
