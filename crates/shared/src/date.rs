use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::{Date, Duration, OffsetDateTime, macros::date, macros::format_description};
use time_tz::{ToTimezone, timezones};

/// Earliest day whose key still sorts chronologically against every later
/// key. Schedules never hold days before it.
pub const FIRST_KEY_DATE: Date = date!(0000 - 01 - 01);

const DATE_KEY_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("Invalid date key: {0}")]
    InvalidDateKey(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// Canonical `YYYY-MM-DD` key used to bucket occurrences by calendar day.
///
/// The only ways to build one are [`DateKey::from`] a [`Date`] and
/// [`DateKey::parse`], which rejects anything that does not round-trip to the
/// same canonical string. Every producer and consumer of watering buckets goes
/// through this type, so a lookup can never miss because of padding or a
/// timezone suffix.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(String);

impl DateKey {
    pub fn parse(value: &str) -> Result<Self, DateError> {
        parse_canonical(value)
            .map(Self::from)
            .ok_or_else(|| DateError::InvalidDateKey(value.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn parse_canonical(value: &str) -> Option<Date> {
    let date = Date::parse(value, DATE_KEY_FORMAT).ok()?;
    (DateKey::from(date).as_str() == value).then_some(date)
}

impl From<Date> for DateKey {
    fn from(date: Date) -> Self {
        let year = date.year();
        let sign = if year < 0 { "-" } else { "" };

        Self(format!(
            "{sign}{:04}-{:02}-{:02}",
            year.unsigned_abs(),
            u8::from(date.month()),
            date.day()
        ))
    }
}

impl Borrow<str> for DateKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateKey::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Checks that `name` is a timezone the database knows.
pub fn check_timezone(name: &str) -> Result<(), DateError> {
    timezones::get_by_name(name)
        .map(|_| ())
        .ok_or_else(|| DateError::UnknownTimezone(name.to_owned()))
}

/// Truncates an instant to the calendar day it falls on in `tz`.
///
/// Unknown timezone names fall back to UTC.
pub fn to_local_date(instant: OffsetDateTime, tz: &str) -> Date {
    match timezones::get_by_name(tz) {
        Some(tz) => instant.to_timezone(tz).date(),
        None => {
            tracing::warn!(tz, "unknown timezone, using UTC calendar day");
            instant.to_offset(time::UtcOffset::UTC).date()
        }
    }
}

/// The caller's local calendar day.
pub fn today(tz: &str) -> Date {
    to_local_date(OffsetDateTime::now_utc(), tz)
}

/// Whole calendar days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: Date, to: Date) -> i64 {
    (to - from).whole_days()
}

pub fn add_days(date: Date, days: i64) -> Option<Date> {
    date.checked_add(Duration::days(days))
}

/// Accepts a canonical date key or an RFC 3339 timestamp.
///
/// A timestamp keeps the calendar day written in it (its own offset), the
/// same day the app showed when it stored the value.
pub fn parse_date(value: &str) -> Option<Date> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(date) = parse_canonical(value) {
        return Some(date);
    }

    OffsetDateTime::parse(value, &Rfc3339)
        .ok()
        .map(|instant| instant.date())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDate {
    Text(String),
    Other(serde::de::IgnoredAny),
}

impl RawDate {
    fn into_date(self) -> Option<Date> {
        match self {
            RawDate::Text(raw) => {
                let date = parse_date(&raw);
                if date.is_none() && !raw.trim().is_empty() {
                    tracing::warn!(value = %raw, "ignoring malformed date");
                }
                date
            }
            RawDate::Other(_) => {
                tracing::warn!("ignoring non-string date value");
                None
            }
        }
    }
}

/// Serde adapter for `Option<Date>` fields of plant records.
///
/// Writes canonical keys. Reading never fails: missing, null, empty or
/// malformed values become `None`.
pub mod optional_date {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.serialize_str(DateKey::from(*date).as_str()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Date>, D::Error> {
        let raw = Option::<RawDate>::deserialize(deserializer)?;
        Ok(raw.and_then(RawDate::into_date))
    }
}

/// Serde adapter writing a `Date` as its canonical key.
pub mod as_key {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(DateKey::from(*value).as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_canonical(&raw)
            .ok_or_else(|| serde::de::Error::custom(DateError::InvalidDateKey(raw)))
    }
}

/// Serde adapter for `Vec<Date>`; malformed entries are dropped.
pub mod date_list {
    use super::*;
    use serde::ser::SerializeSeq;

    pub fn serialize<S: Serializer>(value: &[Date], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(value.len()))?;
        for date in value {
            seq.serialize_element(DateKey::from(*date).as_str())?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Date>, D::Error> {
        let raw = Option::<Vec<RawDate>>::deserialize(deserializer)?;
        Ok(raw
            .unwrap_or_default()
            .into_iter()
            .filter_map(RawDate::into_date)
            .collect())
    }
}
