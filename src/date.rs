//! Time values for `Date` objects.
//!
//! A date is an epoch-millisecond `f64`; NaN marks an invalid date. Calendar
//! fields are resolved by `chrono`, local ones with the offset in force at
//! that instant.

use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};

const MAX_TIME: f64 = 8.64e15;

pub fn time_clip(time: f64) -> f64 {
    if !time.is_finite() || time.abs() > MAX_TIME {
        return f64::NAN;
    }
    let t = time.trunc();
    if t == 0.0 { 0.0_f64 } else { t }
}

/// Wall-clock fields to a naive date-time. `month` is zero-based; months,
/// days and time fields may overflow into the next larger unit.
fn naive_fields(
    year: f64,
    month: f64,
    day: f64,
    hour: f64,
    min: f64,
    sec: f64,
    ms: f64,
) -> Option<NaiveDateTime> {
    if [year, month, day, hour, min, sec, ms].iter().any(|f| !f.is_finite()) {
        return None;
    }
    let month = month.trunc();
    let year = year.trunc() + (month / 12.0).floor();
    if year.abs() > f64::from(i32::MAX) {
        return None;
    }
    let first = NaiveDate::from_ymd_opt(year as i32, month.rem_euclid(12.0) as u32 + 1, 1)?;
    let days = TimeDelta::try_days(day.trunc() as i64 - 1)?;
    let millis = hour.trunc() * 3_600_000.0 + min.trunc() * 60_000.0 + sec.trunc() * 1000.0 + ms.trunc();
    if !millis.is_finite() {
        return None;
    }
    let time = TimeDelta::try_milliseconds(millis as i64)?;
    first
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(days)?
        .checked_add_signed(time)
}

fn local_millis(naive: NaiveDateTime) -> Option<i64> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.timestamp_millis()),
        LocalResult::Ambiguous(earlier, _) => Some(earlier.timestamp_millis()),
        // Skipped by a forward transition: read it with the offset in force just before
        LocalResult::None => {
            let before = naive.checked_sub_signed(TimeDelta::hours(3))?;
            let offset = Local.offset_from_local_datetime(&before).earliest()?;
            Some(naive.and_utc().timestamp_millis() - i64::from(offset.local_minus_utc()) * 1000)
        }
    }
}

/// Time value for local calendar fields, `month` zero-based.
pub fn local_time_value(year: f64, month: f64, day: f64, hour: f64, min: f64, sec: f64, ms: f64) -> f64 {
    naive_fields(year, month, day, hour, min, sec, ms)
        .and_then(local_millis)
        .map_or(f64::NAN, |t| time_clip(t as f64))
}

/// Time value for UTC calendar fields, `month` zero-based.
pub fn utc_time_value(year: f64, month: f64, day: f64, hour: f64, min: f64, sec: f64, ms: f64) -> f64 {
    naive_fields(year, month, day, hour, min, sec, ms)
        .map_or(f64::NAN, |naive| time_clip(naive.and_utc().timestamp_millis() as f64))
}

/// ISO-8601 rendering in UTC, or `None` for an invalid date.
pub fn to_iso_string(t: f64) -> Option<String> {
    if t.is_nan() {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(t as i64)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
}
