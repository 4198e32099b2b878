//! Board date text -> calendar date, and the retention window check.
//!
//! The board prints dates in several shapes depending on age: a clock time
//! for today's posts, `M.D` for this year, `YY.MM.DD` or `YYYY.MM.DD` for
//! older ones, and occasionally a relative "n minutes ago" phrase. Rules are
//! tried in order and the first pattern that matches decides the result.

use std::sync::LazyLock;

use chrono::{Datelike, Days, NaiveDate};
use regex::{Captures, Regex};
use tracing::warn;

type Extract = fn(&Captures<'_>, NaiveDate) -> Option<NaiveDate>;

static RULES: LazyLock<Vec<(Regex, Extract)>> = LazyLock::new(|| {
    vec![
        (Regex::new(r"^\d{1,2}:\d{2}$").unwrap(), same_day as Extract),
        (Regex::new(r"^(\d{4})\.(\d{2})\.(\d{2})$").unwrap(), full_date),
        (Regex::new(r"^(\d{2})\.(\d{2})\.(\d{2})$").unwrap(), short_date),
        (Regex::new(r"^(\d{1,2})\.(\d{1,2})$").unwrap(), month_day),
        (
            Regex::new(r"(분 전|시간 전|(?i:\d+\s*(?:mins?|minutes?|hours?)\s*ago\b))").unwrap(),
            same_day,
        ),
    ]
});

fn num(caps: &Captures<'_>, i: usize) -> Option<u32> {
    caps.get(i)?.as_str().parse().ok()
}

fn same_day(_: &Captures<'_>, today: NaiveDate) -> Option<NaiveDate> {
    Some(today)
}

fn full_date(caps: &Captures<'_>, _: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(num(caps, 1)? as i32, num(caps, 2)?, num(caps, 3)?)
}

fn short_date(caps: &Captures<'_>, _: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2000 + num(caps, 1)? as i32, num(caps, 2)?, num(caps, 3)?)
}

fn month_day(caps: &Captures<'_>, today: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(today.year(), num(caps, 1)?, num(caps, 2)?)
}

/// Parses a listing date cell relative to `today`.
///
/// Returns `None` for text no rule recognises and for matches that do not
/// name a real calendar day (`13.40`); both are logged.
pub fn parse_board_date(raw: &str, today: NaiveDate) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    for (pattern, extract) in RULES.iter() {
        if let Some(caps) = pattern.captures(trimmed) {
            let parsed = extract(&caps, today);
            if parsed.is_none() {
                warn!(raw = trimmed, "date text matched a board format but is not a calendar day");
            }
            return parsed;
        }
    }
    warn!(raw = trimmed, "unrecognised date format");
    None
}

/// First calendar day still inside an N-day window ending today.
pub fn run_cutoff(today: NaiveDate, days_back: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(days_back)))
        .unwrap_or(NaiveDate::MIN)
}

/// Unparseable dates are never inside the window.
pub fn is_within_window(date: Option<NaiveDate>, cutoff: NaiveDate) -> bool {
    date.is_some_and(|d| d >= cutoff)
}

/// Reference day and cutoff, fixed once per run so pagination never sees the
/// window move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunWindow {
    pub today: NaiveDate,
    pub cutoff: NaiveDate,
    pub days_back: u32,
}

impl RunWindow {
    pub fn new(today: NaiveDate, days_back: u32) -> Self {
        Self { today, cutoff: run_cutoff(today, days_back), days_back }
    }

    pub fn starting_today(days_back: u32) -> Self {
        Self::new(chrono::Local::now().date_naive(), days_back)
    }

    pub fn parse(&self, raw: &str) -> Option<NaiveDate> {
        parse_board_date(raw, self.today)
    }

    pub fn admits(&self, date: Option<NaiveDate>) -> bool {
        is_within_window(date, self.cutoff)
    }
}
