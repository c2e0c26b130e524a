//! Month-sized date windows for batched order retrieval.
//!
//! A single order query over a long range can exceed what the remote service
//! is willing to return in one response, so open-ended ranges are walked one
//! month at a time. The next window starts one day after the previous one
//! ends: the remote side treats both bounds as inclusive calendar days, and
//! starting on the previous end day would return orders placed on that day
//! twice.

use chrono::{Days, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;

/// Calendar date format for range bounds.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Timestamp format for update-time bounds.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const WINDOW: Months = Months::new(1);
const GAP: Days = Days::new(1);

/// One bounded sub-range of a batched fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Status codes sent with the window, in caller order.
    pub statuses: Vec<u32>,
}

/// Splits `[start, now)` into consecutive month windows.
///
/// Windows are produced while the cursor (midnight of its day) is before
/// `now`; the last window may reach past `now`. Returns no windows when
/// `start` is not before `now`.
#[must_use]
pub fn plan_windows(start: NaiveDate, now: NaiveDateTime, statuses: &[u32]) -> Vec<DateWindow> {
    let mut windows = Vec::new();
    let mut cursor = start;

    while cursor.and_time(NaiveTime::MIN) < now {
        let Some(end) = cursor.checked_add_months(WINDOW) else {
            break;
        };
        windows.push(DateWindow {
            start: cursor,
            end,
            statuses: statuses.to_vec(),
        });
        match end.checked_add_days(GAP) {
            Some(next) => cursor = next,
            None => break,
        }
    }

    windows
}

/// Splits the closed range `[start, last_day]` into month windows.
///
/// Same stepping as [`plan_windows`], but the final window ends on
/// `last_day` instead of a full month later.
#[must_use]
pub fn plan_windows_through(
    start: NaiveDate,
    last_day: NaiveDate,
    statuses: &[u32],
) -> Vec<DateWindow> {
    let after = last_day.succ_opt().unwrap_or(last_day).and_time(NaiveTime::MIN);
    let mut windows = plan_windows(start, after, statuses);
    for window in &mut windows {
        window.end = window.end.min(last_day);
    }
    windows
}

/// Joins status codes with `,` in the order given. Repeats are kept.
#[must_use]
pub fn status_filter(statuses: &[u32]) -> String {
    statuses
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Status filter argument; an empty list means "any status" and is sent as `null`.
pub(crate) fn status_arg(statuses: &[u32]) -> Value {
    if statuses.is_empty() {
        Value::Null
    } else {
        Value::String(status_filter(statuses))
    }
}

/// A calendar-date bound; `None` is an unbounded side and is sent as `null`.
pub(crate) fn date_arg(date: Option<NaiveDate>) -> Value {
    date.map_or(Value::Null, |d| Value::String(d.format(DATE_FORMAT).to_string()))
}

pub(crate) fn datetime_arg(at: Option<NaiveDateTime>) -> Value {
    at.map_or(Value::Null, |t| {
        Value::String(t.format(DATETIME_FORMAT).to_string())
    })
}
