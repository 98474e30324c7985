use rusqlite::Connection;

use crate::models::Habit;

pub fn insert_habit(
    conn: &Connection,
    user_id: i64,
    name: &str,
    description: Option<&str>,
    frequency: &str,
    target_count: i64,
    created_at: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO habits (user_id, name, description, frequency, target_count, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (user_id, name, description, frequency, target_count, created_at),
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_habits(conn: &Connection, user_id: i64, today: &str) -> rusqlite::Result<Vec<Habit>> {
    let mut stmt = conn.prepare(
        r#"
SELECT h.id, h.name, h.description, h.frequency, h.target_count, h.created_at,
       EXISTS (
         SELECT 1 FROM habit_tracking t
         WHERE t.habit_id = h.id AND t.completion_date = ?2 AND t.completed = 1
       )
FROM habits h
WHERE h.user_id = ?1
ORDER BY h.id ASC
"#,
    )?;
    let rows = stmt.query_map((user_id, today), |row| {
        let done: i64 = row.get(6)?;
        Ok(Habit {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            frequency: row.get(3)?,
            target_count: row.get(4)?,
            created_at: row.get(5)?,
            done_today: done != 0,
        })
    })?;
    rows.collect()
}

/// Records the habit as done on `date`. Returns false when the habit does
/// not belong to the user. Tracking the same day twice keeps one record.
pub fn track_habit(
    conn: &Connection,
    user_id: i64,
    habit_id: i64,
    date: &str,
    notes: Option<&str>,
) -> rusqlite::Result<bool> {
    let owned: i64 = conn.query_row(
        "SELECT COUNT(*) FROM habits WHERE id = ?1 AND user_id = ?2",
        (habit_id, user_id),
        |row| row.get(0),
    )?;
    if owned == 0 {
        return Ok(false);
    }
    conn.execute(
        r#"
INSERT INTO habit_tracking (habit_id, completion_date, completed, notes)
VALUES (?1, ?2, 1, ?3)
ON CONFLICT(habit_id, completion_date) DO UPDATE SET
  completed=1,
  notes=COALESCE(excluded.notes, habit_tracking.notes)
"#,
        (habit_id, date, notes),
    )?;
    Ok(true)
}
