use rusqlite::{Connection, OptionalExtension};

use crate::error::{is_unique_violation, AppError};
use crate::models::UserSettings;

/// Creates the user together with its default settings row.
pub fn insert_user(
    conn: &Connection,
    username: &str,
    password_hash: &str,
    created_at: &str,
) -> Result<i64, AppError> {
    let tx = conn.unchecked_transaction()?;
    match tx.execute(
        "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
        (username, password_hash, created_at),
    ) {
        Ok(_) => {}
        Err(err) if is_unique_violation(&err) => return Err(AppError::UsernameTaken),
        Err(err) => return Err(err.into()),
    }
    let user_id = tx.last_insert_rowid();
    tx.execute("INSERT INTO user_settings (user_id) VALUES (?1)", [user_id])?;
    tx.commit()?;
    Ok(user_id)
}

/// Returns `(id, password_hash)`.
pub fn find_credentials(
    conn: &Connection,
    username: &str,
) -> rusqlite::Result<Option<(i64, String)>> {
    conn.query_row(
        "SELECT id, password_hash FROM users WHERE username = ?1",
        [username],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
}

pub fn insert_token(
    conn: &Connection,
    token: &str,
    user_id: i64,
    created_at: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO auth_tokens (token, user_id, created_at) VALUES (?1, ?2, ?3)",
        (token, user_id, created_at),
    )?;
    Ok(())
}

pub fn user_for_token(conn: &Connection, token: &str) -> rusqlite::Result<Option<i64>> {
    conn.query_row(
        "SELECT user_id FROM auth_tokens WHERE token = ?1",
        [token],
        |row| row.get(0),
    )
    .optional()
}

pub fn delete_token(conn: &Connection, token: &str) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM auth_tokens WHERE token = ?1", [token])
}

pub fn load_settings(conn: &Connection, user_id: i64) -> rusqlite::Result<UserSettings> {
    let found = conn
        .query_row(
            "SELECT persona_tone, timer_work_duration, timer_break_duration, dark_mode, notifications
             FROM user_settings WHERE user_id = ?1",
            [user_id],
            |row| {
                let dark_mode: i64 = row.get(3)?;
                let notifications: i64 = row.get(4)?;
                Ok(UserSettings {
                    persona_tone: row.get(0)?,
                    timer_work_duration: row.get(1)?,
                    timer_break_duration: row.get(2)?,
                    dark_mode: dark_mode != 0,
                    notifications: notifications != 0,
                })
            },
        )
        .optional()?;
    Ok(found.unwrap_or_default())
}

pub fn upsert_settings(
    conn: &Connection,
    user_id: i64,
    settings: &UserSettings,
) -> rusqlite::Result<()> {
    conn.execute(
        r#"
INSERT INTO user_settings (user_id, persona_tone, timer_work_duration, timer_break_duration, dark_mode, notifications)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
ON CONFLICT(user_id) DO UPDATE SET
  persona_tone=excluded.persona_tone,
  timer_work_duration=excluded.timer_work_duration,
  timer_break_duration=excluded.timer_break_duration,
  dark_mode=excluded.dark_mode,
  notifications=excluded.notifications
        "#,
        (
            user_id,
            &settings.persona_tone,
            settings.timer_work_duration,
            settings.timer_break_duration,
            settings.dark_mode as i64,
            settings.notifications as i64,
        ),
    )?;
    Ok(())
}
