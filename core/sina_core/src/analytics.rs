use std::collections::HashMap;

use serde::Serialize;
use time::{Date, OffsetDateTime, UtcOffset};

use crate::clock::{days_before, format_date, local_date};
use crate::tone::WeeklyPerformance;

/// Trailing window for the weekly performance check, in days before today.
/// Today itself is included, so the window spans eight calendar days.
pub const PERFORMANCE_WINDOW_DAYS: i64 = 7;

/// Timestamps of one task, already parsed.
#[derive(Clone, Debug)]
pub struct TaskFacts {
    pub created_at: OffsetDateTime,
    pub completed_at: Option<OffsetDateTime>,
    pub category: String,
}

#[derive(Clone, Copy, Debug)]
pub struct SessionFacts {
    pub session_date: OffsetDateTime,
    pub duration: i64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DayCompletion {
    pub date: String,
    pub weekday: String,
    pub completed: i64,
    pub total: i64,
    pub percentage: f64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct MoodBucket {
    pub mood: i64,
    pub count: i64,
    pub percentage: f64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CategoryBucket {
    pub category: String,
    pub count: i64,
    pub percentage: f64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Analytics {
    pub weekly: Vec<DayCompletion>,
    pub moods: Vec<MoodBucket>,
    pub categories: Vec<CategoryBucket>,
    pub completion_rate: f64,
    pub total_tasks: i64,
    pub completed_tasks: i64,
}

/// `part / total * 100` rounded to one decimal; 0 when `total` is 0.
pub fn percentage(part: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let raw = part as f64 / total as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}

/// Per-day completion for the last seven days, oldest first. A task counts
/// toward a day's total when it was created on or before that day and was
/// still open at the start of it.
pub fn weekly_completion(tasks: &[TaskFacts], today: Date, tz: UtcOffset) -> Vec<DayCompletion> {
    let days: Vec<(Date, Option<Date>)> = tasks
        .iter()
        .map(|t| {
            (
                local_date(t.created_at, tz),
                t.completed_at.map(|c| local_date(c, tz)),
            )
        })
        .collect();

    (0..7)
        .rev()
        .map(|back| {
            let day = days_before(today, back);
            let completed = days
                .iter()
                .filter(|(_, done)| *done == Some(day))
                .count() as i64;
            let total = days
                .iter()
                .filter(|(created, done)| *created <= day && done.map_or(true, |d| d >= day))
                .count() as i64;
            DayCompletion {
                date: format_date(day),
                weekday: day.weekday().to_string(),
                completed,
                total,
                percentage: percentage(completed, total),
            }
        })
        .collect()
}

/// Counts per mood 1..=5; out-of-range values are not counted.
pub fn mood_histogram(moods: &[i64]) -> Vec<MoodBucket> {
    let mut counts = [0i64; 5];
    for m in moods {
        if let Some(slot) = usize::try_from(*m - 1).ok().and_then(|i| counts.get_mut(i)) {
            *slot += 1;
        }
    }
    let total: i64 = counts.iter().sum();
    (1..=5)
        .zip(counts)
        .map(|(mood, count)| MoodBucket {
            mood,
            count,
            percentage: percentage(count, total),
        })
        .collect()
}

pub fn category_histogram<'a, I>(categories: I) -> Vec<CategoryBucket>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, i64> = HashMap::new();
    let mut total = 0;
    for c in categories {
        *counts.entry(c).or_default() += 1;
        total += 1;
    }
    let mut out: Vec<CategoryBucket> = counts
        .into_iter()
        .map(|(category, count)| CategoryBucket {
            category: category.to_string(),
            count,
            percentage: percentage(count, total),
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    out
}

pub fn completion_rate(completed: i64, total: i64) -> f64 {
    percentage(completed, total)
}

pub fn weekly_performance(
    tasks: &[TaskFacts],
    sessions: &[SessionFacts],
    today: Date,
    tz: UtcOffset,
) -> WeeklyPerformance {
    let since = days_before(today, PERFORMANCE_WINDOW_DAYS);
    let completed_tasks = tasks
        .iter()
        .filter_map(|t| t.completed_at)
        .filter(|c| local_date(*c, tz) >= since)
        .count() as i64;
    let recent: Vec<&SessionFacts> = sessions
        .iter()
        .filter(|s| local_date(s.session_date, tz) >= since)
        .collect();
    WeeklyPerformance {
        completed_tasks,
        session_count: recent.len() as i64,
        total_minutes: recent.iter().map(|s| s.duration).sum(),
    }
}

pub fn build(tasks: &[TaskFacts], moods: &[i64], today: Date, tz: UtcOffset) -> Analytics {
    let total_tasks = tasks.len() as i64;
    let completed_tasks = tasks.iter().filter(|t| t.completed_at.is_some()).count() as i64;
    Analytics {
        weekly: weekly_completion(tasks, today, tz),
        moods: mood_histogram(moods),
        categories: category_histogram(tasks.iter().map(|t| t.category.as_str())),
        completion_rate: completion_rate(completed_tasks, total_tasks),
        total_tasks,
        completed_tasks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    const TODAY: Date = date!(2026 - 10 - 18);

    fn at(d: Date) -> OffsetDateTime {
        d.midnight().assume_utc() + time::Duration::hours(12)
    }

    fn task(created: Date, done: Option<Date>, category: &str) -> TaskFacts {
        TaskFacts {
            created_at: at(created),
            completed_at: done.map(at),
            category: category.to_string(),
        }
    }

    #[test]
    fn percentage_rounds_and_guards_zero() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(2, 3), 66.7);
        assert_eq!(completion_rate(5, 5), 100.0);
    }

    #[test]
    fn weekly_series_is_seven_days_oldest_first() {
        let series = weekly_completion(&[], TODAY, UtcOffset::UTC);
        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, "2026-10-12");
        assert_eq!(series[6].date, "2026-10-18");
        assert_eq!(series[6].weekday, "Sunday");
        assert!(series.iter().all(|d| d.total == 0 && d.percentage == 0.0));
    }

    #[test]
    fn weekly_series_counts_active_tasks() {
        let d = |n| days_before(TODAY, n);
        let tasks = [
            task(d(3), Some(d(1)), "work"),
            task(d(2), None, "work"),
            task(d(0), Some(d(0)), "personal"),
        ];
        let series = weekly_completion(&tasks, TODAY, UtcOffset::UTC);
        let day = |n: usize| &series[6 - n];

        // three days ago only the first task existed
        assert_eq!((day(3).completed, day(3).total), (0, 1));
        // yesterday: first task finished, second still open
        assert_eq!((day(1).completed, day(1).total), (1, 2));
        assert_eq!(day(1).percentage, 50.0);
        // today: first is done before today, second open, third done today
        assert_eq!((day(0).completed, day(0).total), (1, 2));
        assert_eq!(day(4).total, 0);
    }

    #[test]
    fn mood_histogram_has_five_buckets_summing_to_100() {
        let h = mood_histogram(&[5, 5, 3, 1, 4, 4, 4]);
        assert_eq!(h.len(), 5);
        assert_eq!(h.iter().map(|b| b.count).sum::<i64>(), 7);
        let sum: f64 = h.iter().map(|b| b.percentage).sum();
        assert!((sum - 100.0).abs() <= 0.5, "{sum}");

        let empty = mood_histogram(&[]);
        assert!(empty.iter().all(|b| b.count == 0 && b.percentage == 0.0));
    }

    #[test]
    fn mood_out_of_range_ignored() {
        let h = mood_histogram(&[0, 6, 2]);
        assert_eq!(h[1].count, 1);
        assert_eq!(h[1].percentage, 100.0);
    }

    #[test]
    fn category_histogram_sorted_and_sums() {
        let h = category_histogram(["work", "study", "work", "health", "work", "study"]);
        let names: Vec<&str> = h.iter().map(|b| b.category.as_str()).collect();
        assert_eq!(names, ["work", "study", "health"]);
        assert_eq!(h[0].percentage, 50.0);
        let sum: f64 = h.iter().map(|b| b.percentage).sum();
        assert!((sum - 100.0).abs() <= 0.5);
    }

    #[test]
    fn weekly_performance_window_includes_seven_days_back() {
        let d = |n| days_before(TODAY, n);
        let tasks = [
            task(d(10), Some(d(7)), "work"),
            task(d(10), Some(d(8)), "work"),
            task(d(1), None, "work"),
        ];
        let sessions = [
            SessionFacts { session_date: at(d(0)), duration: 25 },
            SessionFacts { session_date: at(d(7)), duration: 50 },
            SessionFacts { session_date: at(d(9)), duration: 90 },
        ];
        let perf = weekly_performance(&tasks, &sessions, TODAY, UtcOffset::UTC);
        assert_eq!(perf.completed_tasks, 1);
        assert_eq!(perf.session_count, 2);
        assert_eq!(perf.total_minutes, 75);
    }

    #[test]
    fn day_boundaries_follow_offset() {
        // 23:30 UTC on the 17th is already the 18th at UTC+2
        let tasks = [TaskFacts {
            created_at: datetime!(2026-10-17 10:00 UTC),
            completed_at: Some(datetime!(2026-10-17 23:30 UTC)),
            category: "work".into(),
        }];
        let plus_two = crate::clock::tz_offset_from_minutes(120);
        let series = weekly_completion(&tasks, TODAY, plus_two);
        assert_eq!(series[6].completed, 1);
        let series = weekly_completion(&tasks, TODAY, UtcOffset::UTC);
        assert_eq!(series[5].completed, 1);
    }

    #[test]
    fn build_combines_everything() {
        let tasks = [task(TODAY, Some(TODAY), "work"), task(TODAY, None, "personal")];
        let a = build(&tasks, &[3], TODAY, UtcOffset::UTC);
        assert_eq!(a.total_tasks, 2);
        assert_eq!(a.completed_tasks, 1);
        assert_eq!(a.completion_rate, 50.0);
        assert_eq!(a.categories.len(), 2);
        assert_eq!(a.moods[2].percentage, 100.0);
    }
}
