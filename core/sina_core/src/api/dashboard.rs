use axum::{
    extract::{Query, State},
    response::Response,
};
use rand::rngs::StdRng;
use rusqlite::Connection;
use serde::Serialize;
use time::{Date, OffsetDateTime, UtcOffset};

use super::{ok, AppState, CurrentUser, DayQuery};
use crate::analytics::{self, SessionFacts, TaskFacts};
use crate::clock::{fmt_duration, format_date, format_ts, local_date, now_utc, today};
use crate::db::{journal, sessions, tasks};
use crate::error::AppError;
use crate::models::Task;
use crate::streak::current_streak;
use crate::tone::{classify_deadlines, select_message, SinaMessage, WeeklyPerformance};

const PENDING_LIMIT: usize = 5;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct TodayStats {
    pub today_tasks: i64,
    pub completed_today: i64,
    pub today_sessions: i64,
    pub today_minutes: i64,
    pub streak: u32,
}

pub fn today_stats(
    tasks: &[TaskFacts],
    sessions: &[SessionFacts],
    day: Date,
    tz: UtcOffset,
) -> TodayStats {
    let on_day = |t: OffsetDateTime| local_date(t, tz) == day;
    let todays_sessions: Vec<&SessionFacts> =
        sessions.iter().filter(|s| on_day(s.session_date)).collect();
    TodayStats {
        today_tasks: tasks.iter().filter(|t| on_day(t.created_at)).count() as i64,
        completed_today: tasks
            .iter()
            .filter(|t| t.completed_at.is_some_and(on_day))
            .count() as i64,
        today_sessions: todays_sessions.len() as i64,
        today_minutes: todays_sessions.iter().map(|s| s.duration).sum(),
        streak: current_streak(
            tasks
                .iter()
                .filter_map(|t| t.completed_at)
                .map(|c| local_date(c, tz)),
            day,
        ),
    }
}

struct Snapshot {
    tasks: Vec<TaskFacts>,
    sessions: Vec<SessionFacts>,
}

fn load_snapshot(conn: &Connection, user_id: i64) -> Result<Snapshot, AppError> {
    Ok(Snapshot {
        tasks: tasks::task_facts(conn, user_id)?,
        sessions: sessions::session_facts(conn, user_id)?,
    })
}

fn sina_message(
    conn: &Connection,
    user_id: i64,
    snapshot: &Snapshot,
    now: OffsetDateTime,
    tz: UtcOffset,
    rng: &mut StdRng,
) -> Result<(SinaMessage, WeeklyPerformance), AppError> {
    let open = tasks::open_deadlines(conn, user_id)?;
    let week = analytics::weekly_performance(&snapshot.tasks, &snapshot.sessions, today(now, tz), tz);
    Ok((select_message(&open, &week, now, rng), week))
}

#[derive(Serialize)]
struct Dashboard {
    date: String,
    stats: TodayStats,
    pending_tasks: Vec<Task>,
    week: WeeklyPerformance,
    sina: SinaMessage,
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(q): Query<DayQuery>,
) -> Result<Response, AppError> {
    let tz = state.tz_offset(&q);
    let now = now_utc();
    let day = today(now, tz);

    // rng before conn, everywhere both are held.
    let mut rng = state.rng.lock().await;
    let conn = state.conn.lock().await;
    let snapshot = load_snapshot(&conn, user.id)?;
    let stats = today_stats(&snapshot.tasks, &snapshot.sessions, day, tz);
    let pending_tasks = tasks::list_pending(&conn, user.id, PENDING_LIMIT)?;
    let (sina, week) = sina_message(&conn, user.id, &snapshot, now, tz, &mut rng)?;

    Ok(ok(Dashboard {
        date: format_date(day),
        stats,
        pending_tasks,
        week,
        sina,
    }))
}

pub async fn get_dashboard_stats(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(q): Query<DayQuery>,
) -> Result<Response, AppError> {
    let tz = state.tz_offset(&q);
    let conn = state.conn.lock().await;
    let snapshot = load_snapshot(&conn, user.id)?;
    Ok(ok(today_stats(
        &snapshot.tasks,
        &snapshot.sessions,
        today(now_utc(), tz),
        tz,
    )))
}

pub async fn get_sina(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(q): Query<DayQuery>,
) -> Result<Response, AppError> {
    let tz = state.tz_offset(&q);
    let mut rng = state.rng.lock().await;
    let conn = state.conn.lock().await;
    let snapshot = load_snapshot(&conn, user.id)?;
    let (sina, _) = sina_message(&conn, user.id, &snapshot, now_utc(), tz, &mut rng)?;
    Ok(ok(sina))
}

#[derive(Serialize)]
struct DeadlineItem {
    id: i64,
    title: String,
    deadline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    overdue_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_left: Option<String>,
}

#[derive(Serialize)]
struct DeadlineCheck {
    overdue: Vec<DeadlineItem>,
    urgent: Vec<DeadlineItem>,
}

pub async fn get_deadline_check(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Response, AppError> {
    let now = now_utc();
    let conn = state.conn.lock().await;
    let open = tasks::open_deadlines(&conn, user.id)?;
    let report = classify_deadlines(&open, now);

    let overdue = report
        .overdue
        .iter()
        .map(|t| DeadlineItem {
            id: t.id,
            title: t.title.clone(),
            deadline: format_ts(t.deadline),
            overdue_text: Some(format!("{} ago", fmt_duration((now - t.deadline).whole_seconds()))),
            time_left: None,
        })
        .collect();
    let urgent = report
        .urgent
        .iter()
        .map(|t| DeadlineItem {
            id: t.id,
            title: t.title.clone(),
            deadline: format_ts(t.deadline),
            overdue_text: None,
            time_left: Some(fmt_duration((t.deadline - now).whole_seconds())),
        })
        .collect();

    Ok(ok(DeadlineCheck { overdue, urgent }))
}

pub async fn get_analytics(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(q): Query<DayQuery>,
) -> Result<Response, AppError> {
    let tz = state.tz_offset(&q);
    let conn = state.conn.lock().await;
    let task_facts = tasks::task_facts(&conn, user.id)?;
    let moods = journal::moods(&conn, user.id)?;
    Ok(ok(analytics::build(
        &task_facts,
        &moods,
        today(now_utc(), tz),
        tz,
    )))
}
