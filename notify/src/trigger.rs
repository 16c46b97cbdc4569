// Trigger delay computation
//
// Turns a human-entered date/time pair into the number of seconds the host
// notification service should wait before delivering.

use crate::errors::TriggerError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Minimum lead time before a trigger is accepted. Anything closer is
/// treated as already past: host services may reject or mishandle zero or
/// negative delays.
pub const MIN_LEAD_SECONDS: i64 = 1;

/// Parse a calendar date in `YYYY-MM-DD` form
pub fn parse_date(value: &str) -> Result<NaiveDate, TriggerError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| TriggerError::InvalidDate {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a 24-hour clock time in `HH:MM` form
pub fn parse_time(value: &str) -> Result<NaiveTime, TriggerError> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|e| TriggerError::InvalidTime {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Construct the local target instant for a reminder, with seconds and
/// sub-seconds truncated to zero.
pub fn target_moment(date: &str, time: &str) -> Result<NaiveDateTime, TriggerError> {
    let date = parse_date(date)?;
    let time = parse_time(time)?;
    Ok(date.and_time(time))
}

/// Whole seconds from `now` until `target`. Negative when the target has
/// already passed.
pub fn seconds_until(target: NaiveDateTime, now: NaiveDateTime) -> i64 {
    (target - now).num_seconds()
}

/// Compute the trigger delay for a reminder relative to `now`.
///
/// Fails with `PastOrImminent` when the target moment is in the past or
/// within the same second as `now`.
pub fn trigger_delay(date: &str, time: &str, now: NaiveDateTime) -> Result<u64, TriggerError> {
    let target = target_moment(date, time)?;
    let seconds = seconds_until(target, now);
    if seconds < MIN_LEAD_SECONDS {
        return Err(TriggerError::PastOrImminent {
            seconds_until: seconds,
        });
    }
    Ok(seconds as u64)
}
