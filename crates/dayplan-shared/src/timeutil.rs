//! Small helpers for the `HH:MM` wall-times tasks carry.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};

/// Time of day a task gets when the client supplies none.
pub const DEFAULT_TASK_TIME: &str = "09:00";

/// Strict `HH:MM` parse. `None` for anything else (seconds, am/pm, garbage).
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

/// Wall time of a task, falling back to midnight when the stored string is
/// not a valid `HH:MM` (matching how range queries treated missing times).
pub fn time_or_midnight(value: &str) -> NaiveTime {
    parse_hhmm(value).unwrap_or(NaiveTime::MIN)
}

/// Monday..Sunday bounds of the week containing `date`.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    (monday, monday + Duration::days(6))
}
