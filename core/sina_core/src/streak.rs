use std::collections::BTreeSet;

use time::Date;

/// Consecutive calendar days ending `today` with at least one completion.
///
/// Input order and duplicates do not matter: dates are collapsed into a set
/// and walked newest first. Dates after `today` are ignored. A user with no
/// completion today has a streak of 0, even if yesterday was active.
pub fn current_streak<I>(completion_dates: I, today: Date) -> u32
where
    I: IntoIterator<Item = Date>,
{
    let days: BTreeSet<Date> = completion_dates.into_iter().collect();

    let mut streak = 0;
    let mut expected = Some(today);
    for day in days.iter().rev() {
        if *day > today {
            continue;
        }
        match expected {
            Some(e) if *day == e => {
                streak += 1;
                expected = e.previous_day();
            }
            _ => break,
        }
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    const TODAY: Date = date!(2026 - 10 - 18);

    fn ago(n: i64) -> Date {
        TODAY - time::Duration::days(n)
    }

    #[test]
    fn no_completions_is_zero() {
        assert_eq!(current_streak(Vec::new(), TODAY), 0);
    }

    #[test]
    fn only_today_is_one() {
        assert_eq!(current_streak([TODAY], TODAY), 1);
    }

    #[test]
    fn three_consecutive_days() {
        assert_eq!(current_streak([TODAY, ago(1), ago(2)], TODAY), 3);
    }

    #[test]
    fn gap_stops_the_streak() {
        assert_eq!(current_streak([TODAY, ago(3)], TODAY), 1);
    }

    #[test]
    fn same_day_duplicates_count_once() {
        let dates = [TODAY, TODAY, TODAY, ago(1), ago(1), ago(2)];
        assert_eq!(current_streak(dates, TODAY), 3);
    }

    #[test]
    fn unordered_input_is_accepted() {
        assert_eq!(current_streak([ago(2), TODAY, ago(1)], TODAY), 3);
    }

    #[test]
    fn nothing_today_is_zero() {
        assert_eq!(current_streak([ago(1), ago(2), ago(3)], TODAY), 0);
    }

    #[test]
    fn future_dates_are_skipped() {
        assert_eq!(current_streak([TODAY + time::Duration::days(1), TODAY, ago(1)], TODAY), 2);
    }
}
