//! Time utilities: clocks, duration parsing and formatting.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use std::cell::Cell;
use std::rc::Rc;

/// Source of "now" for anything that derives elapsed time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Clones share the same instant.
#[derive(Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }

    pub fn advance(&self, seconds: i64) {
        self.now.set(self.now.get() + chrono::Duration::seconds(seconds));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Largest duration accepted anywhere: time entries store signed seconds.
pub const MAX_DURATION_SECS: u64 = i64::MAX as u64;

/// Seconds as `HH:MM:SS`; hours are not wrapped at 24.
pub fn format_seconds(secs: u64) -> String {
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

fn parse_unit_duration(s: &str) -> Option<u64> {
    let mut total = 0u64;
    let mut digits = String::new();
    let mut seen_unit = false;

    for c in s.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let n: u64 = digits.parse().ok()?;
        digits.clear();
        let secs = match c.to_ascii_lowercase() {
            'h' => n.checked_mul(3600)?,
            'm' => n.checked_mul(60)?,
            's' => n,
            _ => return None,
        };
        total = total.checked_add(secs)?;
        seen_unit = true;
    }

    (seen_unit && digits.is_empty()).then_some(total)
}

/// Parse a duration in seconds. Accepts `HH:MM:SS`, `HH:MM`, unit forms
/// such as `1h30m`, `90m`, `45s`, or a plain number of seconds. Values
/// above [`MAX_DURATION_SECS`] are rejected.
pub fn parse_duration(input: &str) -> AppResult<u64> {
    let s = input.trim();
    let invalid = || AppError::InvalidDuration(input.to_string());

    if s.contains(':') {
        let parts = s
            .split(':')
            .map(|p| p.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| invalid())?;
        let (h, m, sec) = match parts.as_slice() {
            [h, m] if *m < 60 => (*h, *m, 0),
            [h, m, sec] if *m < 60 && *sec < 60 => (*h, *m, *sec),
            _ => return Err(invalid()),
        };
        return h
            .checked_mul(3600)
            .and_then(|hs| hs.checked_add(m * 60 + sec))
            .filter(|t| *t <= MAX_DURATION_SECS)
            .ok_or_else(invalid);
    }

    s.parse::<u64>()
        .ok()
        .or_else(|| parse_unit_duration(s))
        .filter(|t| *t <= MAX_DURATION_SECS)
        .ok_or_else(invalid)
}
