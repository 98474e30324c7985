use rusqlite::{Connection, OptionalExtension, Row};

use crate::analytics::TaskFacts;
use crate::clock::parse_ts;
use crate::error::AppError;
use crate::models::{Priority, Task, TaskDraft};
use crate::tone::OpenDeadline;

const TASK_COLUMNS: &str = "id, title, description, priority, category, deadline, completed, in_progress, created_at, completed_at";

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let completed: i64 = row.get(6)?;
    let in_progress: i64 = row.get(7)?;
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        priority: row.get(3)?,
        category: row.get(4)?,
        deadline: row.get(5)?,
        completed: completed != 0,
        in_progress: in_progress != 0,
        created_at: row.get(8)?,
        completed_at: row.get(9)?,
    })
}

pub fn insert_task(
    conn: &Connection,
    user_id: i64,
    draft: &TaskDraft,
    created_at: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO tasks (user_id, title, description, priority, category, deadline, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            user_id,
            &draft.title,
            &draft.description,
            draft.priority.as_str(),
            &draft.category,
            &draft.deadline,
            created_at,
        ),
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_task(conn: &Connection, user_id: i64, id: i64) -> rusqlite::Result<Option<Task>> {
    conn.query_row(
        &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND user_id = ?2"),
        (id, user_id),
        task_from_row,
    )
    .optional()
}

pub fn list_tasks(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<Task>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ?1 ORDER BY created_at DESC, id DESC"
    ))?;
    let rows = stmt.query_map([user_id], task_from_row)?;
    rows.collect()
}

/// Incomplete tasks, high priority first, then by deadline with undated
/// tasks last.
pub fn list_pending(conn: &Connection, user_id: i64, limit: usize) -> rusqlite::Result<Vec<Task>> {
    let mut stmt = conn.prepare(&format!(
        r#"
SELECT {TASK_COLUMNS} FROM tasks
WHERE user_id = ?1 AND completed = 0
ORDER BY
  CASE priority WHEN 'high' THEN 1 WHEN 'medium' THEN 2 WHEN 'low' THEN 3 ELSE 4 END,
  deadline IS NULL,
  deadline ASC,
  id ASC
LIMIT ?2
"#
    ))?;
    let rows = stmt.query_map((user_id, limit as i64), task_from_row)?;
    rows.collect()
}

pub fn update_task(
    conn: &Connection,
    user_id: i64,
    id: i64,
    draft: &TaskDraft,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE tasks SET title = ?1, description = ?2, priority = ?3, category = ?4, deadline = ?5
         WHERE id = ?6 AND user_id = ?7",
        (
            &draft.title,
            &draft.description,
            draft.priority.as_str(),
            &draft.category,
            &draft.deadline,
            id,
            user_id,
        ),
    )
}

/// `completed_at` is `Some` when completing and `None` when reverting, so
/// the flag and the timestamp always move together. Completing a task that
/// is already complete keeps its original timestamp. Completing also ends
/// the in-progress state.
pub fn set_completed(
    conn: &Connection,
    user_id: i64,
    id: i64,
    completed_at: Option<&str>,
) -> rusqlite::Result<usize> {
    let completed = completed_at.is_some();
    conn.execute(
        "UPDATE tasks SET
           completed = ?1,
           completed_at = CASE WHEN ?1 AND completed = 1 THEN completed_at ELSE ?2 END,
           in_progress = CASE WHEN ?1 THEN 0 ELSE in_progress END
         WHERE id = ?3 AND user_id = ?4",
        (completed, completed_at, id, user_id),
    )
}

pub fn set_in_progress(conn: &Connection, user_id: i64, id: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE tasks SET in_progress = 1 WHERE id = ?1 AND user_id = ?2 AND completed = 0",
        (id, user_id),
    )
}

pub fn set_priority(
    conn: &Connection,
    user_id: i64,
    id: i64,
    priority: Priority,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE tasks SET priority = ?1 WHERE id = ?2 AND user_id = ?3",
        (priority.as_str(), id, user_id),
    )
}

pub fn task_exists(conn: &Connection, user_id: i64, id: i64) -> rusqlite::Result<bool> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM tasks WHERE id = ?1 AND user_id = ?2",
        (id, user_id),
        |row| row.get(0),
    )?;
    Ok(n > 0)
}

/// Parsed timestamps and category of every task the user owns.
pub fn task_facts(conn: &Connection, user_id: i64) -> Result<Vec<TaskFacts>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT created_at, completed_at, category FROM tasks WHERE user_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map([user_id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    let mut out = Vec::new();
    for r in rows {
        let (created_at, completed_at, category) = r?;
        out.push(TaskFacts {
            created_at: parse_ts(&created_at)?,
            completed_at: completed_at.as_deref().map(parse_ts).transpose()?,
            category,
        });
    }
    Ok(out)
}

/// Incomplete tasks that carry a deadline.
pub fn open_deadlines(conn: &Connection, user_id: i64) -> Result<Vec<OpenDeadline>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT id, title, deadline FROM tasks
         WHERE user_id = ?1 AND completed = 0 AND deadline IS NOT NULL
         ORDER BY deadline ASC",
    )?;
    let rows = stmt.query_map([user_id], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    let mut out = Vec::new();
    for r in rows {
        let (id, title, deadline) = r?;
        out.push(OpenDeadline {
            id,
            title,
            deadline: parse_ts(&deadline)?,
        });
    }
    Ok(out)
}
