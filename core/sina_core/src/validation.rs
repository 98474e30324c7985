//! Request bodies and the checks that turn them into writable values.

use serde::Deserialize;
use time::UtcOffset;

use crate::clock::{format_ts, parse_deadline_input};
use crate::error::AppError;
use crate::models::{Priority, TaskDraft, UserSettings, DEFAULT_CATEGORY, DEFAULT_MOOD};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_CATEGORY_LEN: usize = 50;
pub const MAX_SESSION_MINUTES: i64 = 24 * 60;
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_USERNAME_LEN: usize = 64;
pub const PERSONA_TONES: [&str; 3] = ["balanced", "strict", "gentle"];

#[derive(Debug, Deserialize)]
pub struct TaskInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TaskRef {
    pub task_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct PriorityUpdate {
    pub task_id: i64,
    pub priority: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionLog {
    pub duration: i64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub task_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SessionStart {
    #[serde(default)]
    pub task_id: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JournalSave {
    pub content: String,
    #[serde(default)]
    pub mood: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct HabitInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub target_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub confirm_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default)]
    pub persona_tone: Option<String>,
    #[serde(default)]
    pub timer_work_duration: Option<i64>,
    #[serde(default)]
    pub timer_break_duration: Option<i64>,
    #[serde(default)]
    pub dark_mode: Option<bool>,
    #[serde(default)]
    pub notifications: Option<bool>,
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub fn validate_title(title: &str) -> Result<String, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::invalid("title", "cannot be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::invalid(
            "title",
            format!("cannot exceed {MAX_TITLE_LEN} characters"),
        ));
    }
    Ok(title.to_string())
}

pub fn validate_priority(raw: Option<&str>) -> Result<Priority, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(Priority::Medium),
        Some(s) => Priority::parse(s)
            .ok_or_else(|| AppError::invalid("priority", "must be high, medium or low")),
    }
}

pub fn validate_category(raw: Option<String>) -> Result<String, AppError> {
    let category = non_empty(raw).unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
    if category.chars().count() > MAX_CATEGORY_LEN {
        return Err(AppError::invalid(
            "category",
            format!("cannot exceed {MAX_CATEGORY_LEN} characters"),
        ));
    }
    Ok(category)
}

pub fn validate_task(input: TaskInput, tz: UtcOffset) -> Result<TaskDraft, AppError> {
    let title = validate_title(&input.title)?;
    let priority = validate_priority(input.priority.as_deref())?;
    let category = validate_category(input.category)?;
    let deadline = parse_deadline_input(input.deadline.as_deref(), tz)?.map(format_ts);
    Ok(TaskDraft {
        title,
        description: non_empty(input.description),
        priority,
        category,
        deadline,
    })
}

/// Minutes of a logged session; 0 is allowed for a session that has not
/// ended yet.
pub fn validate_duration(minutes: i64) -> Result<i64, AppError> {
    if minutes < 0 {
        return Err(AppError::invalid("duration", "cannot be negative"));
    }
    if minutes > MAX_SESSION_MINUTES {
        return Err(AppError::invalid(
            "duration",
            format!("cannot exceed {MAX_SESSION_MINUTES} minutes"),
        ));
    }
    Ok(minutes)
}

pub fn validate_notes(notes: Option<String>) -> Option<String> {
    non_empty(notes)
}

pub fn validate_journal(input: JournalSave) -> Result<(String, i64), AppError> {
    let content = input.content.trim();
    if content.is_empty() {
        return Err(AppError::invalid("content", "cannot be empty"));
    }
    let mood = input.mood.unwrap_or(DEFAULT_MOOD);
    if !(1..=5).contains(&mood) {
        return Err(AppError::invalid("mood", "must be 1-5"));
    }
    Ok((content.to_string(), mood))
}

pub struct HabitDraft {
    pub name: String,
    pub description: Option<String>,
    pub frequency: String,
    pub target_count: i64,
}

pub fn validate_habit(input: HabitInput) -> Result<HabitDraft, AppError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::invalid("name", "cannot be empty"));
    }
    let frequency = non_empty(input.frequency)
        .map(|f| f.to_lowercase())
        .unwrap_or_else(|| "daily".to_string());
    if frequency != "daily" && frequency != "weekly" {
        return Err(AppError::invalid("frequency", "must be daily or weekly"));
    }
    let target_count = input.target_count.unwrap_or(1);
    if !(1..=100).contains(&target_count) {
        return Err(AppError::invalid("target_count", "must be 1-100"));
    }
    Ok(HabitDraft {
        name: name.to_string(),
        description: non_empty(input.description),
        frequency,
        target_count,
    })
}

pub fn validate_registration(input: &RegisterRequest) -> Result<String, AppError> {
    let username = input.username.trim();
    if username.is_empty() {
        return Err(AppError::invalid("username", "cannot be empty"));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(AppError::invalid(
            "username",
            format!("cannot exceed {MAX_USERNAME_LEN} characters"),
        ));
    }
    if let Some(confirm) = &input.confirm_password {
        if *confirm != input.password {
            return Err(AppError::invalid("confirm_password", "passwords do not match"));
        }
    }
    if input.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::invalid(
            "password",
            format!("must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(username.to_string())
}

/// Applies a partial update on top of `current`.
pub fn apply_settings(
    current: UserSettings,
    update: SettingsUpdate,
) -> Result<UserSettings, AppError> {
    let mut settings = current;
    if let Some(tone) = update.persona_tone {
        let tone = tone.trim().to_lowercase();
        if !PERSONA_TONES.contains(&tone.as_str()) {
            return Err(AppError::invalid(
                "persona_tone",
                "must be balanced, strict or gentle",
            ));
        }
        settings.persona_tone = tone;
    }
    if let Some(v) = update.timer_work_duration {
        if !(1..=180).contains(&v) {
            return Err(AppError::invalid("timer_work_duration", "must be 1-180 minutes"));
        }
        settings.timer_work_duration = v;
    }
    if let Some(v) = update.timer_break_duration {
        if !(1..=60).contains(&v) {
            return Err(AppError::invalid("timer_break_duration", "must be 1-60 minutes"));
        }
        settings.timer_break_duration = v;
    }
    if let Some(v) = update.dark_mode {
        settings.dark_mode = v;
    }
    if let Some(v) = update.notifications {
        settings.notifications = v;
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str) -> TaskInput {
        TaskInput {
            title: title.to_string(),
            description: None,
            priority: None,
            category: None,
            deadline: None,
        }
    }

    #[test]
    fn task_defaults_apply() {
        let d = validate_task(input("  Plan week "), UtcOffset::UTC).unwrap();
        assert_eq!(d.title, "Plan week");
        assert_eq!(d.priority, Priority::Medium);
        assert_eq!(d.category, "personal");
        assert_eq!(d.deadline, None);
        assert_eq!(d.description, None);
    }

    #[test]
    fn task_deadline_is_canonicalized() {
        let mut i = input("Ship");
        i.deadline = Some("2026-10-18T17:30".into());
        i.priority = Some("HIGH".into());
        let d = validate_task(i, crate::clock::tz_offset_from_minutes(120)).unwrap();
        assert_eq!(d.deadline.as_deref(), Some("2026-10-18T15:30:00Z"));
        assert_eq!(d.priority, Priority::High);
    }

    #[test]
    fn task_rejects_blank_title_and_bad_priority() {
        let err = validate_task(input("   "), UtcOffset::UTC).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput { field: "title", .. }));

        let mut i = input("x");
        i.priority = Some("critical".into());
        let err = validate_task(i, UtcOffset::UTC).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput { field: "priority", .. }));
    }

    #[test]
    fn category_is_kept_as_typed() {
        assert_eq!(validate_category(Some("  Deep Work ".into())).unwrap(), "Deep Work");
        assert_eq!(validate_category(Some("   ".into())).unwrap(), DEFAULT_CATEGORY);
        assert_eq!(validate_category(None).unwrap(), DEFAULT_CATEGORY);
        assert!(validate_category(Some("x".repeat(MAX_CATEGORY_LEN + 1))).is_err());
    }

    #[test]
    fn duration_bounds() {
        assert_eq!(validate_duration(0).unwrap(), 0);
        assert_eq!(validate_duration(25).unwrap(), 25);
        assert!(validate_duration(-1).is_err());
        assert!(validate_duration(MAX_SESSION_MINUTES + 1).is_err());
    }

    #[test]
    fn journal_mood_defaults_and_bounds() {
        let ok = validate_journal(JournalSave {
            content: "good day".into(),
            mood: None,
        })
        .unwrap();
        assert_eq!(ok, ("good day".to_string(), 5));

        let err = validate_journal(JournalSave {
            content: "x".into(),
            mood: Some(6),
        })
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput { field: "mood", .. }));

        assert!(validate_journal(JournalSave {
            content: " ".into(),
            mood: Some(3),
        })
        .is_err());
    }

    #[test]
    fn registration_rules() {
        let req = |u: &str, p: &str, c: Option<&str>| RegisterRequest {
            username: u.into(),
            password: p.into(),
            confirm_password: c.map(str::to_string),
        };
        assert_eq!(validate_registration(&req(" sina ", "secret1", None)).unwrap(), "sina");
        assert!(validate_registration(&req("sina", "short", None)).is_err());
        assert!(validate_registration(&req("sina", "secret1", Some("secret2"))).is_err());
        assert!(validate_registration(&req("", "secret1", None)).is_err());
    }

    #[test]
    fn settings_partial_update() {
        let update = SettingsUpdate {
            persona_tone: Some("Strict".into()),
            timer_work_duration: Some(50),
            timer_break_duration: None,
            dark_mode: Some(true),
            notifications: None,
        };
        let s = apply_settings(UserSettings::default(), update).unwrap();
        assert_eq!(s.persona_tone, "strict");
        assert_eq!(s.timer_work_duration, 50);
        assert_eq!(s.timer_break_duration, 5);
        assert!(s.dark_mode);
        assert!(s.notifications);

        let bad = SettingsUpdate {
            persona_tone: None,
            timer_work_duration: Some(0),
            timer_break_duration: None,
            dark_mode: None,
            notifications: None,
        };
        assert!(apply_settings(UserSettings::default(), bad).is_err());
    }

    #[test]
    fn habit_defaults() {
        let h = validate_habit(HabitInput {
            name: "Meditate".into(),
            description: Some("".into()),
            frequency: None,
            target_count: None,
        })
        .unwrap();
        assert_eq!(h.frequency, "daily");
        assert_eq!(h.target_count, 1);
        assert_eq!(h.description, None);
    }
}
