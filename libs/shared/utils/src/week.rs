// libs/shared/utils/src/week.rs
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Monday 00:00:00 of the week containing `date`, with Sunday counted as the
/// last day of the week. This value partitions the appointment uniqueness key,
/// so the availability read path and the booking write path must both derive
/// it through this function.
pub fn week_start(date: NaiveDate) -> NaiveDateTime {
    let offset = date.weekday().num_days_from_monday() as i64;
    (date - Duration::days(offset)).and_time(NaiveTime::MIN)
}
