//! Pure constraint predicates.
//!
//! Each predicate answers one question about one value and knows nothing about
//! paths or failures; the traverser turns a `false` into a failure record.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::{Regex, RegexBuilder};

const DATE_FORMATS: [&str; 10] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %b %Y",
    "%d %b %y",
    "%b %d %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%B %d %Y",
    "%B %d, %Y",
];

const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

pub fn min_length(expected: usize, actual: &str) -> bool {
    char_len(actual) >= expected
}

pub fn max_length(expected: usize, actual: &str) -> bool {
    char_len(actual) <= expected
}

pub fn length(expected: usize, actual: &str) -> bool {
    char_len(actual) == expected
}

pub fn fixed(expected: &str, actual: &str) -> bool {
    actual == expected
}

/// `actual` is one of the comma-separated entries of `csv`.
pub fn one_of(csv: &str, actual: &str) -> bool {
    csv.split(',').any(|entry| entry == actual)
}

pub fn pattern(expected: &Pattern, actual: &str) -> bool {
    expected.is_match(actual)
}

pub fn min(expected: f64, actual: f64) -> bool {
    actual >= expected
}

pub fn max(expected: f64, actual: f64) -> bool {
    actual <= expected
}

pub fn min_occurs(expected: u64, count: u64) -> bool {
    count >= expected
}

pub fn max_occurs(expected: u64, count: u64) -> bool {
    count <= expected
}

/// Parse trimmed text as a finite number. Empty text is not a number.
///
/// Unsigned `0x`, `0o` and `0b` integer literals are accepted as well.
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed = match radix_literal(trimmed) {
        Some((radix, digits)) => fold_digits(radix, digits),
        None => trimmed.parse::<f64>().ok(),
    };
    parsed.filter(|n| n.is_finite())
}

fn radix_literal(text: &str) -> Option<(u32, &str)> {
    let prefix = text.get(..2)?;
    let radix = match prefix {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    Some((radix, &text[2..]))
}

fn fold_digits(radix: u32, digits: &str) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    })
}

/// Whether `value` reads as a calendar date (optionally with a time).
pub fn is_date(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }
    DateTime::parse_from_rfc3339(value).is_ok()
        || DateTime::parse_from_rfc2822(value).is_ok()
        || DATE_FORMATS
            .iter()
            .any(|format| NaiveDate::parse_from_str(value, format).is_ok())
        || DATE_TIME_FORMATS
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(value, format).is_ok())
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// A regular expression compiled once from a schema `pattern` declaration.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    flags: String,
    regex: Regex,
}

/// Why a pattern declaration could not be compiled.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("unsupported pattern flag '{0}'")]
    UnknownFlag(char),
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

impl Pattern {
    /// Compile `source` with single-letter `flags`.
    ///
    /// `i` case-insensitive, `m` multi-line, `s` dot matches newline,
    /// `x` ignore whitespace; `u` and `g` are accepted and change nothing.
    pub fn compile(source: &str, flags: &str) -> Result<Self, PatternError> {
        let mut builder = RegexBuilder::new(source);
        for flag in flags.chars() {
            match flag {
                'i' => builder.case_insensitive(true),
                'm' => builder.multi_line(true),
                's' => builder.dot_matches_new_line(true),
                'x' => builder.ignore_whitespace(true),
                'u' | 'g' => &mut builder,
                other => return Err(PatternError::UnknownFlag(other)),
            };
        }
        Ok(Self {
            source: source.to_string(),
            flags: flags.to_string(),
            regex: builder.build()?,
        })
    }

    /// The expression as written in the schema.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    /// Unanchored search, so `[a-z]+` matches anywhere in the value.
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}
