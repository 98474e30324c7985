use rusqlite::{Connection, OptionalExtension, Row};

use crate::models::JournalEntry;

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<JournalEntry> {
    Ok(JournalEntry {
        id: row.get(0)?,
        content: row.get(1)?,
        mood: row.get(2)?,
        entry_date: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// One entry per user and day: a second save on the same day replaces the
/// content and mood of the first.
pub fn upsert_for_date(
    conn: &Connection,
    user_id: i64,
    entry_date: &str,
    content: &str,
    mood: i64,
    written_at: &str,
) -> rusqlite::Result<JournalEntry> {
    conn.execute(
        r#"
INSERT INTO journal_entries (user_id, content, mood, entry_date, created_at)
VALUES (?1, ?2, ?3, ?4, ?5)
ON CONFLICT(user_id, entry_date) DO UPDATE SET
  content=excluded.content,
  mood=excluded.mood,
  created_at=excluded.created_at
"#,
        (user_id, content, mood, entry_date, written_at),
    )?;

    conn.query_row(
        "SELECT id, content, mood, entry_date, created_at FROM journal_entries
         WHERE user_id = ?1 AND entry_date = ?2",
        (user_id, entry_date),
        entry_from_row,
    )
}

pub fn get_for_date(
    conn: &Connection,
    user_id: i64,
    entry_date: &str,
) -> rusqlite::Result<Option<JournalEntry>> {
    conn.query_row(
        "SELECT id, content, mood, entry_date, created_at FROM journal_entries
         WHERE user_id = ?1 AND entry_date = ?2",
        (user_id, entry_date),
        entry_from_row,
    )
    .optional()
}

pub fn list_entries(
    conn: &Connection,
    user_id: i64,
    limit: usize,
) -> rusqlite::Result<Vec<JournalEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, content, mood, entry_date, created_at FROM journal_entries
         WHERE user_id = ?1 ORDER BY entry_date DESC LIMIT ?2",
    )?;
    let rows = stmt.query_map((user_id, limit as i64), entry_from_row)?;
    rows.collect()
}

pub fn moods(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT mood FROM journal_entries WHERE user_id = ?1")?;
    let rows = stmt.query_map([user_id], |row| row.get(0))?;
    rows.collect()
}
