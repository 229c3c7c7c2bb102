//! Wall-clock time-of-day and calendar-date encoding.
//!
//! Pickup times are plain wall-clock values on a fixed reference calendar.
//! No timezone conversion happens anywhere in this crate.

use crate::error::CoreError;
use chrono::{Datelike, NaiveDate, NaiveTime};

pub const TIME_FORMAT: &str = "%H:%M";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// First and last school day, numbered from Monday.
pub const FIRST_WEEKDAY: u32 = 1;
pub const LAST_WEEKDAY: u32 = 5;

// `9` stands for any ASCII digit, every other byte must match literally.
// chrono alone accepts "7:5" and two digit years.
const TIME_SHAPE: &[u8] = b"99:99";
const DATE_SHAPE: &[u8] = b"9999-99-99";

fn has_shape(s: &str, shape: &[u8]) -> bool {
    s.len() == shape.len()
        && s.bytes().zip(shape).all(|(c, &p)| match p {
            b'9' => c.is_ascii_digit(),
            _ => c == p,
        })
}

const WEEKDAY_NAMES: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

/// Parses an `HH:MM` string. Exactly two digits each, no surrounding space.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime, CoreError> {
    let invalid = || CoreError::validation(format!("invalid time '{}', expected HH:MM", s));
    if !has_shape(s, TIME_SHAPE) {
        return Err(invalid());
    }
    NaiveTime::parse_from_str(s, TIME_FORMAT).map_err(|_| invalid())
}

pub fn format_time_of_day(t: NaiveTime) -> String {
    t.format(TIME_FORMAT).to_string()
}

/// Parses a `YYYY-MM-DD` string with a four digit year.
pub fn parse_date(s: &str) -> Result<NaiveDate, CoreError> {
    let invalid = || CoreError::validation(format!("invalid date '{}', expected YYYY-MM-DD", s));
    if !has_shape(s, DATE_SHAPE) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| invalid())
}

pub fn format_date(d: NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

/// ISO weekday of a date, Monday = 1 through Sunday = 7.
#[inline]
pub fn weekday_of(date: NaiveDate) -> u32 {
    date.weekday().number_from_monday()
}

#[inline]
pub fn is_school_day(weekday: u32) -> bool {
    (FIRST_WEEKDAY..=LAST_WEEKDAY).contains(&weekday)
}

/// Maps 1..=5 to "Monday".."Friday".
pub fn weekday_name(weekday: u32) -> Result<&'static str, CoreError> {
    if !is_school_day(weekday) {
        return Err(CoreError::validation(format!(
            "weekday {} is outside Monday-Friday",
            weekday
        )));
    }
    Ok(WEEKDAY_NAMES[(weekday - FIRST_WEEKDAY) as usize])
}

/// Name of any calendar day, weekends included.
pub fn day_name(date: NaiveDate) -> String {
    date.format("%A").to_string()
}

/// Serde adapter rendering a `NaiveTime` as `HH:MM`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_time_of_day(*t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_time_of_day(&raw).map_err(serde::de::Error::custom)
    }
}

/// Same as [`hhmm`] for optional values; `None` maps to `null`.
pub mod hhmm_option {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match t {
            Some(t) => s.serialize_some(&super::format_time_of_day(*t)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|raw| super::parse_time_of_day(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("15:30", 15, 30)]
    #[case("07:05", 7, 5)]
    #[case("00:00", 0, 0)]
    #[case("23:59", 23, 59)]
    fn test_parse_time_of_day(#[case] input: &str, #[case] h: u32, #[case] m: u32) {
        let t = parse_time_of_day(input).unwrap();
        assert_eq!(t, NaiveTime::from_hms_opt(h, m, 0).unwrap());
    }

    #[rstest]
    #[case("24:00")]
    #[case("12:60")]
    #[case("noon")]
    #[case("")]
    #[case("12:00:00")]
    #[case("12-00")]
    #[case("7:5")]
    #[case("1:1")]
    #[case("7:05")]
    #[case("007:05")]
    #[case(" 12:00 ")]
    #[case("1２:00")]
    fn test_parse_time_of_day_rejects(#[case] input: &str) {
        let err = parse_time_of_day(input).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_format_time_is_zero_padded() {
        let t = NaiveTime::from_hms_opt(8, 5, 59).unwrap();
        assert_eq!(format_time_of_day(t), "08:05");
        assert_eq!(format_time_of_day(parse_time_of_day("15:30").unwrap()), "15:30");
    }

    #[test]
    fn test_parse_and_format_date() {
        let d = parse_date("2024-09-02").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 9, 2).unwrap());
        assert_eq!(format_date(d), "2024-09-02");
        assert!(parse_date("2024-02-30").is_err());
        assert!(parse_date("02.09.2024").is_err());
    }

    #[rstest]
    #[case("2024-9-2")]
    #[case("24-09-02")]
    #[case("2024-09-2")]
    #[case("02024-09-02")]
    #[case(" 2024-09-02")]
    #[case("2024/09/02")]
    #[case("2024-13-01")]
    #[case("")]
    fn test_parse_date_rejects(#[case] input: &str) {
        let err = parse_date(input).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_weekday_of() {
        // 2024-09-02 is a Monday
        let monday = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
        assert_eq!(weekday_of(monday), 1);
        assert_eq!(weekday_of(monday + chrono::Duration::days(4)), 5);
        assert_eq!(weekday_of(monday + chrono::Duration::days(6)), 7);
    }

    #[test]
    fn test_weekday_name() {
        assert_eq!(weekday_name(1).unwrap(), "Monday");
        assert_eq!(weekday_name(5).unwrap(), "Friday");
        assert!(weekday_name(0).is_err());
        assert!(weekday_name(6).is_err());
    }
}
