use crate::client::Condition;
use crate::errors::{AppError, AppResult};
use chrono::{Datelike, NaiveDate};

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Inclusive date interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (ny, nm) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(ny, nm, 1)?.pred_opt()
}

/// Bounds of a single period: `YYYY-MM-DD`, `YYYY-MM` or `YYYY`.
fn period_bounds(p: &str) -> Option<DateRange> {
    if let Some(d) = parse_date(p) {
        return Some(DateRange { start: d, end: d });
    }

    if let Ok(first) = NaiveDate::parse_from_str(&format!("{p}-01"), "%Y-%m-%d") {
        return Some(DateRange {
            start: first,
            end: last_day_of_month(first.year(), first.month())?,
        });
    }

    if p.len() == 4 {
        let year = p.parse::<i32>().ok()?;
        return Some(DateRange {
            start: NaiveDate::from_ymd_opt(year, 1, 1)?,
            end: NaiveDate::from_ymd_opt(year, 12, 31)?,
        });
    }

    None
}

impl DateRange {
    /// Parse a period or an `A:B` range of periods.
    pub fn parse(input: &str) -> AppResult<Self> {
        let invalid = || AppError::InvalidRange(input.to_string());
        let s = input.trim();

        let range = match s.split_once(':') {
            Some((a, b)) => {
                let start = period_bounds(a.trim()).ok_or_else(invalid)?;
                let end = period_bounds(b.trim()).ok_or_else(invalid)?;
                DateRange {
                    start: start.start,
                    end: end.end,
                }
            }
            None => period_bounds(s).ok_or_else(invalid)?,
        };

        if range.end < range.start {
            return Err(invalid());
        }
        Ok(range)
    }

    pub fn contains(&self, d: NaiveDate) -> bool {
        self.start <= d && d <= self.end
    }

    /// Condition matching `field` (stored as `YYYY-MM-DD`) inside the range.
    pub fn condition(&self, field: &str) -> Condition {
        Condition::gte(field, self.start.to_string()).and(Condition::lte(field, self.end.to_string()))
    }
}

/// Optional range argument → condition on `field`, `All` when absent.
pub fn range_condition(range: &Option<String>, field: &str) -> AppResult<Condition> {
    match range {
        Some(r) => Ok(DateRange::parse(r)?.condition(field)),
        None => Ok(Condition::All),
    }
}
