//! Parse-or-discard coercions over [`ScalarValue`].
//!
//! None of these fail: a value that cannot be read as the requested kind
//! simply yields `None` and is left out of whatever is being computed.

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{Row, ScalarValue};

static NULL: ScalarValue = ScalarValue::Null;

/// Year-first layouts: `2024-01-02`, `2024/01`, `2024-01-02T10:00:00Z`.
static YEAR_FIRST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}[-/.]\d{1,2}\b").expect("year-first pattern is valid"));

/// Day- or month-first layouts; the year must have four digits.
static YEAR_LAST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}[-/.]\d{1,2}[-/.]\d{4}\b").expect("year-last pattern is valid"));

static MONTH_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\b")
        .expect("month name pattern is valid")
});

static FOUR_DIGIT_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{4}\b").expect("year pattern is valid"));

/// `2024-01` and `2024/01`, read as the first of the month.
static YEAR_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})[-/](\d{1,2})$").expect("year-month pattern is valid"));

const DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 10] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Hashable identity of a value, used for distinct counts and mode frequency.
///
/// Values of different variants never compare equal, so `1` and `"1"` are
/// two distinct values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKey<'a> {
    Null,
    Bool(bool),
    Number(u64),
    String(&'a str),
    Timestamp(i64),
}

impl ScalarValue {
    /// Null, or the empty string. A missing key reads as null too, see [`value_in`].
    pub fn is_null(&self) -> bool {
        match self {
            ScalarValue::Null => true,
            ScalarValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Finite floating point reading of the value, if it has one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ScalarValue::Number(n) if n.is_finite() => Some(*n),
            ScalarValue::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Calendar reading of the value. Numbers and booleans are never dates.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            ScalarValue::Timestamp(t) => Some(*t),
            ScalarValue::String(s) => parse_timestamp(s),
            _ => None,
        }
    }

    /// Textual form, with whole numbers printed without a fractional part.
    pub fn display_string(&self) -> Cow<'_, str> {
        match self {
            ScalarValue::Null => Cow::Borrowed(""),
            ScalarValue::Bool(true) => Cow::Borrowed("true"),
            ScalarValue::Bool(false) => Cow::Borrowed("false"),
            ScalarValue::Number(n) if *n == 0.0 => Cow::Borrowed("0"),
            ScalarValue::Number(n) => Cow::Owned(n.to_string()),
            ScalarValue::String(s) => Cow::Borrowed(s.as_str()),
            ScalarValue::Timestamp(t) => Cow::Owned(t.to_rfc3339()),
        }
    }

    pub fn key(&self) -> ScalarKey<'_> {
        match self {
            ScalarValue::Null => ScalarKey::Null,
            ScalarValue::Bool(b) => ScalarKey::Bool(*b),
            ScalarValue::Number(n) => ScalarKey::Number(number_bits(*n)),
            ScalarValue::String(s) => ScalarKey::String(s),
            ScalarValue::Timestamp(t) => ScalarKey::Timestamp(t.timestamp_micros()),
        }
    }
}

fn number_bits(n: f64) -> u64 {
    if n == 0.0 {
        0.0f64.to_bits()
    } else if n.is_nan() {
        f64::NAN.to_bits()
    } else {
        n.to_bits()
    }
}

/// Cheap pre-check so free text and short codes like `1-2-3` never reach
/// the chrono parsers.
fn looks_like_date(text: &str) -> bool {
    YEAR_FIRST.is_match(text)
        || YEAR_LAST.is_match(text)
        || (MONTH_NAME.is_match(text) && FOUR_DIGIT_YEAR.is_match(text))
}

fn parse_year_month(text: &str) -> Option<NaiveDate> {
    let captures = YEAR_MONTH.captures(text)?;
    let year = captures[1].parse().ok()?;
    let month = captures[2].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Parses the date and date-time layouts accepted in uploaded sheets.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if !looks_like_date(text) {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(text) {
        return Some(parsed.with_timezone(&Utc));
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            parse_year_month(text)
                .or_else(|| {
                    DATE_FORMATS
                        .iter()
                        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                })
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// The cell for `column` in `row`; absent keys read as null.
pub fn value_in<'a>(row: &'a Row, column: &str) -> &'a ScalarValue {
    row.get(column).unwrap_or(&NULL)
}
