//! Sina's message for the dashboard.
//!
//! Rules are checked in order and the first match wins: overdue deadlines,
//! then deadlines inside the next 24 hours, then the trailing week's
//! completion and focus-session counts.

use rand::{seq::SliceRandom, Rng};
use serde::Serialize;
use time::{Duration, OffsetDateTime};

use crate::clock::fmt_duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Encouraging,
    Motivational,
    Strict,
}

pub const MOTIVATIONAL_QUOTES: [&str; 4] = [
    "Discipline is the bridge between goals and accomplishment.",
    "You don't have to be great to get started, but you have to get started to be great.",
    "The pain of discipline weighs ounces, but the pain of regret weighs tons.",
    "Success is the sum of small efforts repeated day in and day out.",
];

pub const STRICT_QUOTES: [&str; 4] = [
    "Excuses will always be there for you. Opportunities won't.",
    "You can't have a million dollar dream with a minimum wage work ethic.",
    "Stop waiting for motivation. Start building discipline.",
    "Your future self is counting on what you do today.",
];

pub const ENCOURAGING_QUOTES: [&str; 4] = [
    "Every small step forward is progress worth celebrating.",
    "You're stronger than you think and more capable than you know.",
    "Consistency beats perfection every single time.",
    "I believe in you, even when you don't believe in yourself.",
];

pub const OVERDUE_QUOTES: [&str; 4] = [
    "A deadline missed is a promise broken to yourself.",
    "Late is not a strategy. Finish what you started.",
    "Every hour you delay makes the next step heavier.",
    "Stop explaining. Start finishing.",
];

pub const URGENT_QUOTES: [&str; 4] = [
    "The clock does not negotiate. Neither should you.",
    "Pressure is a privilege. Use it.",
    "Focus now, relax later.",
    "Urgency is a gift if you act on it.",
];

pub fn general_quotes(tone: Tone) -> &'static [&'static str] {
    match tone {
        Tone::Encouraging => &ENCOURAGING_QUOTES,
        Tone::Motivational => &MOTIVATIONAL_QUOTES,
        Tone::Strict => &STRICT_QUOTES,
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct SinaMessage {
    pub message: String,
    pub quote: String,
    pub tone: Tone,
}

/// An incomplete task that has a deadline.
#[derive(Clone, Debug)]
pub struct OpenDeadline {
    pub id: i64,
    pub title: String,
    pub deadline: OffsetDateTime,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WeeklyPerformance {
    pub completed_tasks: i64,
    pub session_count: i64,
    pub total_minutes: i64,
}

/// Open deadlines split into overdue and due within 24 hours, each sorted
/// earliest deadline first.
pub struct DeadlineReport<'a> {
    pub overdue: Vec<&'a OpenDeadline>,
    pub urgent: Vec<&'a OpenDeadline>,
}

pub fn classify_deadlines(open: &[OpenDeadline], now: OffsetDateTime) -> DeadlineReport<'_> {
    let horizon = now + Duration::hours(24);
    let mut overdue: Vec<&OpenDeadline> = open.iter().filter(|t| t.deadline < now).collect();
    let mut urgent: Vec<&OpenDeadline> = open
        .iter()
        .filter(|t| t.deadline >= now && t.deadline <= horizon)
        .collect();
    overdue.sort_by_key(|t| t.deadline);
    urgent.sort_by_key(|t| t.deadline);
    DeadlineReport { overdue, urgent }
}

pub fn select_message<R: Rng + ?Sized>(
    open: &[OpenDeadline],
    week: &WeeklyPerformance,
    now: OffsetDateTime,
    rng: &mut R,
) -> SinaMessage {
    let report = classify_deadlines(open, now);

    if let Some(first) = report.overdue.first() {
        let message = match report.overdue.get(1) {
            None => format!(
                "\"{}\" is overdue. Deadlines are promises you make to yourself. Finish it now.",
                first.title
            ),
            Some(second) => format!(
                "This is unacceptable. You have {} overdue tasks, including \"{}\" and \"{}\". Stop everything and clear them today.",
                report.overdue.len(),
                first.title,
                second.title
            ),
        };
        return SinaMessage {
            message,
            quote: pick(&OVERDUE_QUOTES, rng),
            tone: Tone::Strict,
        };
    }

    if let Some(next) = report.urgent.first() {
        let left = next.deadline - now;
        let left_text = fmt_duration(left.whole_seconds());
        let message = if left < Duration::hours(2) {
            format!(
                "URGENT: \"{}\" is due in {left_text}. Drop everything and finish it.",
                next.title
            )
        } else if left < Duration::hours(6) {
            format!(
                "Time is running out: \"{}\" is due in {left_text}. Protect your focus.",
                next.title
            )
        } else {
            format!(
                "\"{}\" is due within 24 hours. Plan your focus sessions now.",
                next.title
            )
        };
        return SinaMessage {
            message,
            quote: pick(&URGENT_QUOTES, rng),
            tone: Tone::Strict,
        };
    }

    let (tone, message) = performance_message(week);
    SinaMessage {
        message,
        quote: pick(general_quotes(tone), rng),
        tone,
    }
}

fn performance_message(week: &WeeklyPerformance) -> (Tone, String) {
    let WeeklyPerformance {
        completed_tasks: done,
        session_count: sessions,
        total_minutes: minutes,
    } = *week;

    if done >= 10 && sessions >= 15 {
        (
            Tone::Encouraging,
            format!("Outstanding work! {done} tasks completed and {minutes} minutes of focused work this week. You're building real momentum."),
        )
    } else if done >= 5 && sessions >= 8 {
        (
            Tone::Motivational,
            format!("Good progress with {done} tasks done. Let's push for even more focus sessions - you had {sessions} this week."),
        )
    } else if done < 3 || sessions < 5 {
        (
            Tone::Strict,
            format!("We need to talk. Only {done} tasks completed and {sessions} focus sessions this week. Your future self deserves better."),
        )
    } else {
        (
            Tone::Motivational,
            format!("You're on track with {done} tasks completed. Let's maintain this momentum and add more focused work sessions."),
        )
    }
}

fn pick<R: Rng + ?Sized>(pool: &[&'static str], rng: &mut R) -> String {
    pool.choose(rng).copied().unwrap_or_default().to_string()
}
