use rusqlite::Connection;

use crate::analytics::SessionFacts;
use crate::clock::parse_ts;
use crate::error::AppError;
use crate::models::FocusSession;

pub fn insert_session(
    conn: &Connection,
    user_id: i64,
    task_id: Option<i64>,
    duration: i64,
    notes: Option<&str>,
    session_date: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO focus_sessions (user_id, task_id, duration, notes, session_date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (user_id, task_id, duration, notes, session_date),
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_sessions(
    conn: &Connection,
    user_id: i64,
    limit: usize,
) -> rusqlite::Result<Vec<FocusSession>> {
    let mut stmt = conn.prepare(
        "SELECT id, task_id, duration, notes, session_date FROM focus_sessions
         WHERE user_id = ?1 ORDER BY session_date DESC, id DESC LIMIT ?2",
    )?;
    let rows = stmt.query_map((user_id, limit as i64), |row| {
        Ok(FocusSession {
            id: row.get(0)?,
            task_id: row.get(1)?,
            duration: row.get(2)?,
            notes: row.get(3)?,
            session_date: row.get(4)?,
        })
    })?;
    rows.collect()
}

pub fn session_facts(conn: &Connection, user_id: i64) -> Result<Vec<SessionFacts>, AppError> {
    let mut stmt = conn
        .prepare("SELECT session_date, duration FROM focus_sessions WHERE user_id = ?1")?;
    let rows = stmt.query_map([user_id], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;

    let mut out = Vec::new();
    for r in rows {
        let (session_date, duration) = r?;
        out.push(SessionFacts {
            session_date: parse_ts(&session_date)?,
            duration,
        });
    }
    Ok(out)
}
