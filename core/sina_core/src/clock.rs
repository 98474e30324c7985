use time::{
    format_description::well_known::Rfc3339,
    macros::{date, format_description},
    Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset,
};

use crate::error::AppError;

pub const TZ_OFFSET_MINUTES_MIN: i32 = -14 * 60;
pub const TZ_OFFSET_MINUTES_MAX: i32 = 14 * 60;

pub fn normalize_tz_offset_minutes(v: Option<i32>, fallback: i32) -> i32 {
    v.unwrap_or(fallback)
        .clamp(TZ_OFFSET_MINUTES_MIN, TZ_OFFSET_MINUTES_MAX)
}

pub fn tz_offset_from_minutes(minutes: i32) -> UtcOffset {
    UtcOffset::from_whole_seconds(minutes.saturating_mul(60)).unwrap_or(UtcOffset::UTC)
}

/// Current instant, truncated to whole seconds.
pub fn now_utc() -> OffsetDateTime {
    truncate_seconds(OffsetDateTime::now_utc())
}

fn truncate_seconds(t: OffsetDateTime) -> OffsetDateTime {
    Time::from_hms(t.hour(), t.minute(), t.second())
        .map(|tm| t.replace_time(tm))
        .unwrap_or(t)
}

/// Canonical stored form: RFC 3339, UTC, whole seconds.
pub fn format_ts(t: OffsetDateTime) -> String {
    truncate_seconds(t.to_offset(UtcOffset::UTC))
        .format(&Rfc3339)
        .unwrap_or_default()
}

pub fn parse_ts(s: &str) -> Result<OffsetDateTime, AppError> {
    OffsetDateTime::parse(s, &Rfc3339).map_err(|_| AppError::InvalidTimestamp {
        value: s.to_string(),
    })
}

pub fn format_date(d: Date) -> String {
    d.to_string()
}

/// Calendar day of `t` as seen from `tz_offset`.
pub fn local_date(t: OffsetDateTime, tz_offset: UtcOffset) -> Date {
    t.to_offset(tz_offset).date()
}

pub fn today(now: OffsetDateTime, tz_offset: UtcOffset) -> Date {
    local_date(now, tz_offset)
}

/// Deadlines must stay formattable as RFC 3339 after moving to UTC; one
/// day of slack on each side covers any offset.
const DEADLINE_MIN_DATE: Date = date!(1 - 01 - 02);
const DEADLINE_MAX_DATE: Date = date!(9999 - 12 - 30);

fn deadline_to_utc(t: OffsetDateTime, raw: &str) -> Result<OffsetDateTime, AppError> {
    if !(DEADLINE_MIN_DATE..=DEADLINE_MAX_DATE).contains(&t.date()) {
        return Err(AppError::invalid(
            "deadline",
            format!("'{raw}' is outside the supported range"),
        ));
    }
    Ok(truncate_seconds(t.to_offset(UtcOffset::UTC)))
}

pub fn days_before(d: Date, days: i64) -> Date {
    d.checked_sub(time::Duration::days(days)).unwrap_or(Date::MIN)
}

/// Parses a deadline as sent by clients. RFC 3339 is taken as-is; the
/// `datetime-local` form (`YYYY-MM-DDTHH:MM[:SS]`) is read in `tz_offset`.
/// Empty input means no deadline.
pub fn parse_deadline_input(
    raw: Option<&str>,
    tz_offset: UtcOffset,
) -> Result<Option<OffsetDateTime>, AppError> {
    let s = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(s) => s,
    };
    if let Ok(t) = OffsetDateTime::parse(s, &Rfc3339) {
        return deadline_to_utc(t, s).map(Some);
    }
    let local = PrimitiveDateTime::parse(
        s,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day]T[hour]:[minute]"))
    })
    .map_err(|_| {
        AppError::invalid(
            "deadline",
            format!("'{s}' is not RFC 3339 or YYYY-MM-DDTHH:MM"),
        )
    })?;
    deadline_to_utc(local.assume_offset(tz_offset), s).map(Some)
}

pub fn fmt_duration(seconds: i64) -> String {
    if seconds <= 0 {
        return "0m".to_string();
    }
    let m = (seconds + 30) / 60;
    if m < 60 {
        return format!("{m}m");
    }
    let h = m / 60;
    let rm = m % 60;
    if h >= 24 {
        let d = h / 24;
        let rh = h % 24;
        return if rh == 0 {
            format!("{d}d")
        } else {
            format!("{d}d {rh}h")
        };
    }
    if rm == 0 {
        format!("{h}h")
    } else {
        format!("{h}h {rm}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn format_ts_is_utc_whole_seconds() {
        let t = datetime!(2026-10-18 09:30:15.123456 +02:00);
        assert_eq!(format_ts(t), "2026-10-18T07:30:15Z");
        assert_eq!(parse_ts("2026-10-18T07:30:15Z").unwrap(), t.replace_nanosecond(0).unwrap());
    }

    #[test]
    fn parse_ts_rejects_legacy_sqlite_format() {
        let err = parse_ts("2026-10-18 07:30:15").unwrap_err();
        assert!(matches!(err, AppError::InvalidTimestamp { .. }));
    }

    #[test]
    fn format_date_is_iso() {
        assert_eq!(format_date(date!(2026 - 02 - 05)), "2026-02-05");
    }

    #[test]
    fn local_date_respects_offset() {
        let t = datetime!(2026-02-14 17:00 UTC);
        assert_eq!(local_date(t, tz_offset_from_minutes(8 * 60)), date!(2026 - 02 - 15));
        assert_eq!(local_date(t, tz_offset_from_minutes(-5 * 60)), date!(2026 - 02 - 14));
    }

    #[test]
    fn normalize_clamps_and_falls_back() {
        assert_eq!(normalize_tz_offset_minutes(None, 120), 120);
        assert_eq!(normalize_tz_offset_minutes(Some(-60), 120), -60);
        assert_eq!(normalize_tz_offset_minutes(Some(10_000), 0), TZ_OFFSET_MINUTES_MAX);
    }

    #[test]
    fn deadline_input_forms() {
        let tz = tz_offset_from_minutes(60);
        assert_eq!(parse_deadline_input(None, tz).unwrap(), None);
        assert_eq!(parse_deadline_input(Some("  "), tz).unwrap(), None);
        assert_eq!(
            parse_deadline_input(Some("2026-10-18T12:00:00+02:00"), tz).unwrap(),
            Some(datetime!(2026-10-18 10:00 UTC))
        );
        assert_eq!(
            parse_deadline_input(Some("2026-10-18T12:00"), tz).unwrap(),
            Some(datetime!(2026-10-18 11:00 UTC))
        );
        let err = parse_deadline_input(Some("tomorrow"), tz).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput { field: "deadline", .. }));
    }

    #[test]
    fn deadline_outside_range_is_invalid_not_a_panic() {
        let err = parse_deadline_input(Some("9999-12-31T23:00:00-14:00"), UtcOffset::UTC).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput { field: "deadline", .. }));

        let err = parse_deadline_input(Some("9999-12-31T23:00"), tz_offset_from_minutes(-840)).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput { field: "deadline", .. }));

        let err = parse_deadline_input(Some("0001-01-01T00:30:00+14:00"), UtcOffset::UTC).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput { field: "deadline", .. }));

        let edge = parse_deadline_input(Some("9999-12-30T23:00"), tz_offset_from_minutes(-840))
            .unwrap()
            .unwrap();
        assert_eq!(format_ts(edge), "9999-12-31T13:00:00Z");
    }

    #[test]
    fn fmt_duration_buckets() {
        assert_eq!(fmt_duration(0), "0m");
        assert_eq!(fmt_duration(45 * 60), "45m");
        assert_eq!(fmt_duration(3 * 3600 + 20 * 60), "3h 20m");
        assert_eq!(fmt_duration(2 * 3600), "2h");
        assert_eq!(fmt_duration(50 * 3600), "2d 2h");
    }
}
