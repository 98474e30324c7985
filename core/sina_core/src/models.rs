use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }
}

pub const DEFAULT_CATEGORY: &str = "personal";
pub const DEFAULT_MOOD: i64 = 5;

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub category: String,
    pub deadline: Option<String>,
    pub completed: bool,
    pub in_progress: bool,
    pub created_at: String,
    pub completed_at: Option<String>,
}

/// Validated task fields, ready to be written.
#[derive(Clone, Debug)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub category: String,
    pub deadline: Option<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct FocusSession {
    pub id: i64,
    pub task_id: Option<i64>,
    pub duration: i64,
    pub notes: Option<String>,
    pub session_date: String,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct JournalEntry {
    pub id: i64,
    pub content: String,
    pub mood: i64,
    pub entry_date: String,
    pub created_at: String,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Habit {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub frequency: String,
    pub target_count: i64,
    pub created_at: String,
    pub done_today: bool,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct UserSettings {
    pub persona_tone: String,
    pub timer_work_duration: i64,
    pub timer_break_duration: i64,
    pub dark_mode: bool,
    pub notifications: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            persona_tone: "balanced".to_string(),
            timer_work_duration: 25,
            timer_break_duration: 5,
            dark_mode: false,
            notifications: true,
        }
    }
}
