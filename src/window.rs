use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde_json::Value;
use tracing::warn;

/// Numeric timestamps above this are taken as epoch milliseconds, below as
/// epoch seconds.
const MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

/// Inclusive analysis interval covering one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub year: i32,
}

impl TimeWindow {
    pub fn for_year(year: i32) -> Self {
        let start = Utc
            .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
            .single()
            .expect("valid year start");
        let end = Utc
            .with_ymd_and_hms(year, 12, 31, 23, 59, 59)
            .single()
            .expect("valid year end");
        TimeWindow { start, end, year }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }

    pub fn start_timestamp(&self) -> i64 {
        self.start.timestamp()
    }

    pub fn end_timestamp(&self) -> i64 {
        self.end.timestamp()
    }

    /// Every calendar day of the window's year, ascending. 365 or 366 entries.
    pub fn days(&self) -> Vec<NaiveDate> {
        let mut days = Vec::with_capacity(366);
        let mut day = self.start.date_naive();
        let last = self.end.date_naive();
        while day <= last {
            days.push(day);
            day = day.succ_opt().expect("date within range");
        }
        days
    }

    pub fn days_in_year(&self) -> usize {
        if NaiveDate::from_ymd_opt(self.year, 12, 31)
            .map(|d| d.ordinal() == 366)
            .unwrap_or(false)
        {
            366
        } else {
            365
        }
    }
}

/// The sentinel instant unparseable timestamps map to. Always outside any
/// year window, so tagged records drop out of every aggregate.
pub fn epoch_zero() -> DateTime<Utc> {
    Utc.timestamp_opt(0, 0).single().expect("epoch zero")
}

fn from_epoch_number(n: i64) -> DateTime<Utc> {
    let parsed = if n > MILLIS_THRESHOLD {
        Utc.timestamp_millis_opt(n).single()
    } else {
        Utc.timestamp_opt(n, 0).single()
    };
    parsed.unwrap_or_else(epoch_zero)
}

/// Normalize a provider timestamp that may arrive as epoch seconds, epoch
/// milliseconds, a calendar-date string, or a numeric string. Anything else
/// maps to the epoch-zero sentinel.
pub fn parse_timestamp(raw: &Value) -> DateTime<Utc> {
    match raw {
        Value::Number(n) => match n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)) {
            Some(epoch) => from_epoch_number(epoch),
            None => epoch_zero(),
        },
        Value::String(s) => {
            if let Ok(instant) = s.parse::<DateTime<Utc>>() {
                return instant;
            }
            if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                    return Utc.from_utc_datetime(&midnight);
                }
            }
            if let Ok(epoch) = s.parse::<i64>() {
                return from_epoch_number(epoch);
            }
            warn!("Unparseable timestamp string: {}", s);
            epoch_zero()
        }
        other => {
            warn!("Unparseable timestamp value: {}", other);
            epoch_zero()
        }
    }
}
