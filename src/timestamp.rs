//! Lenient timestamp handling for values that cross the backend boundary.
//!
//! Alarm and reading timestamps arrive as whatever the database rendered:
//! ISO-8601 with a `Z` suffix, a SQL `DATETIME` string, or a slash-separated
//! local format. Everything is reduced to a naive wall-clock time.

use chrono::{DateTime, NaiveDateTime};

/// Accepted layouts, tried in order against the normalized string.
const FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Rewrites an ISO-ish timestamp into the space-separated local form.
pub fn normalize(raw: &str) -> String {
    let spaced = raw.trim().replace('T', " ");
    let unzoned = spaced.strip_suffix('Z').unwrap_or(&spaced);
    strip_fractional_seconds(unzoned)
}

// Drops every `.` that is immediately followed by one or more digits, along with those digits.
fn strip_fractional_seconds(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '.' && chars.peek().is_some_and(|next| next.is_ascii_digit()) {
            while chars.peek().is_some_and(|next| next.is_ascii_digit()) {
                chars.next();
            }
            continue;
        }
        out.push(c);
    }
    out
}

fn parse_with(cleaned: &str, format: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(cleaned, format).ok()
}

/// Parses `raw` against every accepted layout, returning the first match.
///
/// Empty or whitespace-only input yields `None` without trying any layout.
pub fn parse(raw: &str) -> Option<NaiveDateTime> {
    if raw.trim().is_empty() {
        return None;
    }
    let cleaned = normalize(raw);
    FORMATS
        .iter()
        .fold(None, |found, format| found.or_else(|| parse_with(&cleaned, format)))
}

pub fn format(ts: NaiveDateTime) -> String {
    ts.format(DISPLAY_FORMAT).to_string()
}

/// Serde adapter for optional wire timestamps.
///
/// Strings go through [`parse`]; numbers are epoch milliseconds. Anything
/// that cannot be interpreted becomes `None` instead of failing the record.
pub mod lenient {
    use chrono::NaiveDateTime;
    use serde::de::IgnoredAny;
    use serde::{Deserialize, Deserializer, Serializer};

    // Variant order matters: integers must hit `Millis` before `FractionalMillis`.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Text(String),
        Millis(i64),
        FractionalMillis(f64),
        Other(IgnoredAny),
    }

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&super::format(*ts)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = Option::<Wire>::deserialize(deserializer)?;
        Ok(match wire {
            Some(Wire::Text(text)) => super::parse(&text),
            Some(Wire::Millis(millis)) => super::from_epoch_millis(millis),
            Some(Wire::FractionalMillis(millis)) if millis.is_finite() => {
                super::from_epoch_millis(millis.trunc() as i64)
            }
            Some(Wire::FractionalMillis(_)) | Some(Wire::Other(_)) | None => None,
        })
    }
}

fn from_epoch_millis(millis: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}
