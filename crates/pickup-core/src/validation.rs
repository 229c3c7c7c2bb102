//! Request validation. Every function here is pure and returns the first
//! violated rule as `CoreError::Validation`.

use crate::error::CoreError;
use crate::models::{
    ExceptionRequest, ExceptionUpdateRequest, NewScheduleEntry, NoteRequest, NoteUpdateRequest,
    ScheduleEntryRequest, StudentId, UpdateExceptionData, UpdateNoteData,
};
use crate::timefmt::{self, is_school_day};
use chrono::{NaiveDate, NaiveTime};
use std::collections::HashSet;

pub const MAX_BULK_STUDENTS: usize = 500;
pub const MAX_NOTE_LENGTH: usize = 500;
pub const MAX_SCHEDULE_NOTE_LENGTH: usize = 500;
pub const MAX_REASON_LENGTH: usize = 255;

fn check_length(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    // lengths are counted in characters, not bytes
    if value.chars().count() > max {
        return Err(CoreError::validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

/// Empty strings count as absent.
fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

pub fn validate_schedule_entries(entries: &[ScheduleEntryRequest]) -> Result<Vec<NewScheduleEntry>, CoreError> {
    if entries.is_empty() {
        return Err(CoreError::validation("at least one schedule entry is required"));
    }

    let mut seen = HashSet::new();
    let mut validated = Vec::with_capacity(entries.len());
    for entry in entries {
        if !is_school_day(entry.weekday) {
            return Err(CoreError::validation(format!(
                "weekday must be between 1 and 5, got {}",
                entry.weekday
            )));
        }
        if !seen.insert(entry.weekday) {
            return Err(CoreError::validation(format!(
                "duplicate weekday: {}",
                entry.weekday
            )));
        }

        let raw_time = entry
            .pickup_time
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                CoreError::validation(format!("pickup_time is required for weekday {}", entry.weekday))
            })?;
        let pickup_time = timefmt::parse_time_of_day(raw_time)?;

        let notes = normalize_optional(entry.notes.clone());
        if let Some(notes) = &notes {
            check_length("notes", notes, MAX_SCHEDULE_NOTE_LENGTH)?;
        }

        validated.push(NewScheduleEntry {
            weekday: entry.weekday,
            pickup_time,
            notes,
        });
    }

    validated.sort_by_key(|e| e.weekday);
    Ok(validated)
}

/// Validated fields of a new exception.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedException {
    pub exception_date: NaiveDate,
    pub pickup_time: Option<NaiveTime>,
    pub reason: Option<String>,
}

fn parse_optional_time(raw: Option<&str>) -> Result<Option<NaiveTime>, CoreError> {
    raw.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(timefmt::parse_time_of_day)
        .transpose()
}

fn validate_reason(reason: Option<String>) -> Result<Option<String>, CoreError> {
    let reason = normalize_optional(reason);
    if let Some(reason) = &reason {
        check_length("reason", reason, MAX_REASON_LENGTH)?;
    }
    Ok(reason)
}

pub fn validate_exception(request: &ExceptionRequest) -> Result<ValidatedException, CoreError> {
    Ok(ValidatedException {
        exception_date: timefmt::parse_date(&request.exception_date)?,
        pickup_time: parse_optional_time(request.pickup_time.as_deref())?,
        reason: validate_reason(request.reason.clone())?,
    })
}

pub fn validate_exception_update(request: &ExceptionUpdateRequest) -> Result<UpdateExceptionData, CoreError> {
    Ok(UpdateExceptionData {
        exception_date: request
            .exception_date
            .as_deref()
            .map(timefmt::parse_date)
            .transpose()?,
        pickup_time: request
            .pickup_time
            .as_ref()
            .map(|t| parse_optional_time(t.as_deref()))
            .transpose()?,
        reason: request
            .reason
            .clone()
            .map(validate_reason)
            .transpose()?,
    })
}

fn validate_content(content: &str) -> Result<String, CoreError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(CoreError::validation("content is required"));
    }
    check_length("content", content, MAX_NOTE_LENGTH)?;
    Ok(content.to_string())
}

/// Returns the parsed date and the trimmed content.
pub fn validate_note(request: &NoteRequest) -> Result<(NaiveDate, String), CoreError> {
    let note_date = timefmt::parse_date(&request.note_date)?;
    let content = validate_content(&request.content)?;
    Ok((note_date, content))
}

pub fn validate_note_update(request: &NoteUpdateRequest) -> Result<UpdateNoteData, CoreError> {
    Ok(UpdateNoteData {
        note_date: request
            .note_date
            .as_deref()
            .map(timefmt::parse_date)
            .transpose()?,
        content: request.content.as_deref().map(validate_content).transpose()?,
    })
}

pub fn validate_bulk_request(student_ids: &[StudentId]) -> Result<(), CoreError> {
    if student_ids.is_empty() {
        return Err(CoreError::validation("student_ids must not be empty"));
    }
    if student_ids.len() > MAX_BULK_STUDENTS {
        return Err(CoreError::validation(format!(
            "at most {} student ids per request, got {}",
            MAX_BULK_STUDENTS,
            student_ids.len()
        )));
    }
    Ok(())
}
