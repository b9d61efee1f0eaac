//! Japanese era conversion and date normalization
//!
//! Every function here is total: input that cannot be read as a date
//! yields [`DateRecord::unknown`] or the `不明` sentinel.

use std::sync::LazyLock;

use bio_core::{DateRecord, Known, UNKNOWN};
use chrono::{Datelike, NaiveDate};
use regex::{Captures, Regex};

/// Era name and the Gregorian year of its first year
pub const ERAS: [(&str, i32); 5] = [
    ("令和", 2019),
    ("平成", 1989),
    ("昭和", 1926),
    ("大正", 1912),
    ("明治", 1868),
];

static ERA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(令和|平成|昭和|大正|明治)\s*(元|\d{1,2})\s*年(?:\s*(\d{1,2})\s*月)?(?:\s*(\d{1,2})\s*日)?")
        .expect("era pattern")
});

static JP_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})\s*年\s*(\d{1,2})\s*月\s*(\d{1,2})\s*日").expect("date pattern")
});

static NUMERIC_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})").expect("numeric date pattern")
});

static YEAR_MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})\s*年(?:\s*(\d{1,2})\s*月)?").expect("year-month pattern")
});

/// First Gregorian year of an era, if the era is known
pub fn era_start_year(era: &str) -> Option<i32> {
    ERAS.iter()
        .find(|(name, _)| *name == era)
        .map(|(_, start)| *start)
}

/// Gregorian year of year `era_year` of `era` (`元年` is year 1)
pub fn convert_era_year(era: &str, era_year: i32) -> Option<i32> {
    era_start_year(era).map(|start| start + era_year - 1)
}

fn era_year_number(token: &str) -> Option<i32> {
    if token == "元" {
        Some(1)
    } else {
        token.parse().ok()
    }
}

fn capture_u32(caps: &Captures<'_>, index: usize) -> Option<u32> {
    caps.get(index).and_then(|m| m.as_str().parse().ok())
}

fn capture_i32(caps: &Captures<'_>, index: usize) -> Option<i32> {
    caps.get(index).and_then(|m| m.as_str().parse().ok())
}

/// Rewrite every era-prefixed date in `text` with its Gregorian year.
///
/// Month and day are kept only when written; `昭和20年` becomes `1945年`.
pub fn convert_era_to_gregorian(text: &str) -> String {
    ERA_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let year = era_year_number(&caps[2]).and_then(|n| convert_era_year(&caps[1], n));
            let Some(year) = year else {
                return caps[0].to_string();
            };
            let mut out = format!("{}年", year);
            if let Some(month) = caps.get(3) {
                out.push_str(&format!("{}月", month.as_str()));
            }
            if let Some(day) = caps.get(4) {
                out.push_str(&format!("{}日", day.as_str()));
            }
            out
        })
        .into_owned()
}

fn validated(year: i32, month: u32, day: u32) -> DateRecord {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => DateRecord::from_ymd(date.year(), date.month(), date.day()),
        None => {
            tracing::debug!("Invalid calendar date: {}-{}-{}", year, month, day);
            DateRecord::unknown()
        }
    }
}

/// Parse the first date found in `text` into a [`DateRecord`].
///
/// Recognized, in order: `YYYY年M月D日`, `YYYY-MM-DD` / `YYYY/MM/DD`, an era
/// date (missing month or day default to 1), then a bare `YYYY年` or
/// `YYYY年M月` which fills only the known parts.
pub fn parse_date(text: &str) -> DateRecord {
    let text = text.trim();
    if text.is_empty() || text == UNKNOWN {
        return DateRecord::unknown();
    }

    for re in [&*JP_DATE_RE, &*NUMERIC_DATE_RE] {
        if let Some(caps) = re.captures(text) {
            if let (Some(y), Some(m), Some(d)) = (
                capture_i32(&caps, 1),
                capture_u32(&caps, 2),
                capture_u32(&caps, 3),
            ) {
                return validated(y, m, d);
            }
        }
    }

    if let Some(caps) = ERA_RE.captures(text) {
        let year = era_year_number(&caps[2]).and_then(|n| convert_era_year(&caps[1], n));
        if let Some(year) = year {
            let month = capture_u32(&caps, 3).unwrap_or(1);
            let day = capture_u32(&caps, 4).unwrap_or(1);
            return validated(year, month, day);
        }
    }

    if let Some(caps) = YEAR_MONTH_RE.captures(text) {
        let month = capture_u32(&caps, 2).filter(|m| (1..=12).contains(m));
        return DateRecord {
            year: capture_i32(&caps, 1).into(),
            month: month.into(),
            day: Known::Unknown,
            full: UNKNOWN.to_string(),
        };
    }

    tracing::debug!("Unparseable date: {}", text);
    DateRecord::unknown()
}

/// Normalize a date string to `YYYY-MM-DD`, or `不明`
pub fn normalize_date(text: &str) -> String {
    parse_date(text).full
}

/// An era-prefixed date found in running text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EraMatch {
    /// Byte offset of the era name in the searched text
    pub start: usize,
    pub year: i32,
    /// Gregorian `YYYY年M月D日`, present only when month and day were written
    pub date: Option<String>,
}

/// First era date in `text` whose era is known
pub fn find_era_date(text: &str) -> Option<EraMatch> {
    ERA_RE.captures_iter(text).find_map(|caps| {
        let year = era_year_number(&caps[2]).and_then(|n| convert_era_year(&caps[1], n))?;
        let date = match (capture_u32(&caps, 3), capture_u32(&caps, 4)) {
            (Some(month), Some(day)) => Some(format!("{}年{}月{}日", year, month, day)),
            _ => None,
        };
        let start = caps.get(0)?.start();
        Some(EraMatch { start, year, date })
    })
}

/// Completed years between birth and death; `Unknown` if either date is incomplete
pub fn age_at_death(birth: &DateRecord, death: &DateRecord) -> Known<i32> {
    let (Some((by, bm, bd)), Some((dy, dm, dd))) = (birth.ymd(), death.ymd()) else {
        return Known::Unknown;
    };
    let mut age = dy - by;
    if (dm, dd) < (bm, bd) {
        age -= 1;
    }
    if age < 0 {
        tracing::warn!("Death date precedes birth date: {} / {}", birth.full, death.full);
        return Known::Unknown;
    }
    Known::Value(age)
}
