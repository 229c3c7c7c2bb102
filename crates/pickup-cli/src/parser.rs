use pickup_core::models::ScheduleEntryRequest;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ArgParseError {
    #[error("Invalid day entry '{0}', expected WEEKDAY=HH:MM[=NOTE]")]
    InvalidDayEntry(String),
    #[error("Unknown weekday '{0}'")]
    UnknownWeekday(String),
    #[error("Invalid id '{0}'")]
    InvalidId(String),
}

/// Weekday as a number or an English abbreviation. Weekend names map to 6 and
/// 7 so the core rejects them with its usual message.
pub fn parse_weekday(raw: &str) -> Result<u32, ArgParseError> {
    let token = raw.trim().to_ascii_lowercase();
    if let Ok(n) = token.parse::<u32>() {
        return Ok(n);
    }
    let weekday = match token.as_str() {
        "mon" | "monday" => 1,
        "tue" | "tuesday" => 2,
        "wed" | "wednesday" => 3,
        "thu" | "thursday" => 4,
        "fri" | "friday" => 5,
        "sat" | "saturday" => 6,
        "sun" | "sunday" => 7,
        _ => return Err(ArgParseError::UnknownWeekday(raw.to_string())),
    };
    Ok(weekday)
}

/// Parses `WEEKDAY=HH:MM[=NOTE]`. The time is passed on unparsed.
pub fn parse_day_entry(raw: &str) -> Result<ScheduleEntryRequest, ArgParseError> {
    let mut parts = raw.splitn(3, '=');
    let weekday = parts
        .next()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ArgParseError::InvalidDayEntry(raw.to_string()))?;
    let time = parts
        .next()
        .ok_or_else(|| ArgParseError::InvalidDayEntry(raw.to_string()))?;
    let notes = parts.next().map(str::trim).filter(|s| !s.is_empty());

    Ok(ScheduleEntryRequest {
        weekday: parse_weekday(weekday)?,
        pickup_time: Some(time.trim().to_string()).filter(|s| !s.is_empty()),
        notes: notes.map(str::to_string),
    })
}

pub fn parse_id(raw: &str) -> Result<Uuid, ArgParseError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ArgParseError::InvalidId(raw.to_string()))
}
