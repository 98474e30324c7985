//! SQLite persistence. Every query that touches user data filters on the
//! owning user id.

pub mod habits;
pub mod journal;
pub mod sessions;
pub mod tasks;
pub mod users;

use std::collections::HashSet;
use std::path::Path;

use rusqlite::Connection;

pub fn open(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    init_db(&conn)?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  username TEXT UNIQUE NOT NULL,
  password_hash TEXT NOT NULL,
  created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS auth_tokens (
  token TEXT PRIMARY KEY,
  user_id INTEGER NOT NULL REFERENCES users(id),
  created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  user_id INTEGER NOT NULL REFERENCES users(id),
  title TEXT NOT NULL,
  description TEXT,
  priority TEXT NOT NULL DEFAULT 'medium',
  category TEXT NOT NULL DEFAULT 'personal',
  deadline TEXT,
  completed INTEGER NOT NULL DEFAULT 0,
  in_progress INTEGER NOT NULL DEFAULT 0,
  created_at TEXT NOT NULL,
  completed_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_tasks_user ON tasks(user_id);

CREATE TABLE IF NOT EXISTS focus_sessions (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  user_id INTEGER NOT NULL REFERENCES users(id),
  task_id INTEGER REFERENCES tasks(id),
  duration INTEGER NOT NULL,
  notes TEXT,
  session_date TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_focus_sessions_user ON focus_sessions(user_id, session_date);

CREATE TABLE IF NOT EXISTS journal_entries (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  user_id INTEGER NOT NULL REFERENCES users(id),
  content TEXT NOT NULL,
  mood INTEGER NOT NULL DEFAULT 5,
  entry_date TEXT NOT NULL,
  created_at TEXT NOT NULL,
  UNIQUE(user_id, entry_date)
);

CREATE TABLE IF NOT EXISTS habits (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  user_id INTEGER NOT NULL REFERENCES users(id),
  name TEXT NOT NULL,
  description TEXT,
  frequency TEXT NOT NULL DEFAULT 'daily',
  target_count INTEGER NOT NULL DEFAULT 1,
  created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS habit_tracking (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  habit_id INTEGER NOT NULL REFERENCES habits(id),
  completion_date TEXT NOT NULL,
  completed INTEGER NOT NULL DEFAULT 1,
  notes TEXT,
  UNIQUE(habit_id, completion_date)
);

CREATE TABLE IF NOT EXISTS user_settings (
  user_id INTEGER PRIMARY KEY REFERENCES users(id),
  persona_tone TEXT NOT NULL DEFAULT 'balanced',
  timer_work_duration INTEGER NOT NULL DEFAULT 25,
  timer_break_duration INTEGER NOT NULL DEFAULT 5,
  dark_mode INTEGER NOT NULL DEFAULT 0,
  notifications INTEGER NOT NULL DEFAULT 1
);
"#,
    )?;
    ensure_tasks_columns(conn)?;
    Ok(())
}

/// Databases created before tasks could be marked in progress lack the column.
fn ensure_tasks_columns(conn: &Connection) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare("PRAGMA table_info(tasks)")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
    let mut cols: HashSet<String> = HashSet::new();
    for r in rows {
        cols.insert(r?);
    }

    if !cols.contains("in_progress") {
        conn.execute(
            "ALTER TABLE tasks ADD COLUMN in_progress INTEGER NOT NULL DEFAULT 0",
            [],
        )?;
    }

    Ok(())
}
