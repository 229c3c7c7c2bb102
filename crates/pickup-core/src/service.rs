//! Caller-facing pickup operations.
//!
//! Every function takes the resolved [`Caller`] and enforces access before
//! touching data: single-student operations go through
//! [`require_full_access`], bulk resolution through
//! [`filter_authorized_student_ids`]. Validation happens here, persistence is
//! delegated to the repository.

use crate::access::{filter_authorized_student_ids, require_full_access, Caller};
use crate::error::CoreError;
use crate::models::{
    DayNote, EffectivePickupTime, ExceptionRequest, ExceptionUpdateRequest, NewExceptionData,
    NewNoteData, NoteRequest, NoteUpdateRequest, PickupException, ScheduleEntryRequest,
    StudentId, StudentPickupData,
};
use crate::repository::Repository;
use crate::resolution::resolve_effective_pickup_times;
use crate::timefmt;
use crate::validation;
use chrono::{Local, NaiveDate};
use tracing::{error, info, warn};
use uuid::Uuid;

fn resolve_date(date: Option<&str>) -> Result<NaiveDate, CoreError> {
    match date {
        Some(raw) => timefmt::parse_date(raw),
        None => Ok(Local::now().date_naive()),
    }
}

/// Schedule, exceptions and notes of one student. `from` limits exceptions
/// and notes to that date and later.
pub async fn get_student_pickup_data<R>(
    repo: &R,
    caller: &Caller,
    student_id: StudentId,
    from: Option<NaiveDate>,
) -> Result<StudentPickupData, CoreError>
where
    R: Repository + ?Sized,
{
    require_full_access(repo, caller, student_id).await?;
    load_student_pickup_data(repo, student_id, from).await
}

async fn load_student_pickup_data<R>(
    repo: &R,
    student_id: StudentId,
    from: Option<NaiveDate>,
) -> Result<StudentPickupData, CoreError>
where
    R: Repository + ?Sized,
{
    let (schedules, exceptions, notes) = tokio::try_join!(
        repo.find_schedules_for_student(student_id),
        repo.find_exceptions_for_student(student_id, from),
        repo.find_notes_for_student(student_id, from),
    )?;

    Ok(StudentPickupData {
        student_id,
        schedules,
        exceptions,
        notes,
    })
}

/// Replaces the student's whole week and returns the fresh bundle.
pub async fn upsert_weekly_schedule<R>(
    repo: &R,
    caller: &Caller,
    student_id: StudentId,
    entries: &[ScheduleEntryRequest],
) -> Result<StudentPickupData, CoreError>
where
    R: Repository + ?Sized,
{
    require_full_access(repo, caller, student_id).await?;
    let entries = validation::validate_schedule_entries(entries)?;
    let written = entries.len();

    repo.replace_weekly_schedule(student_id, entries, caller.staff_id)
        .await?;
    info!(student_id, staff_id = caller.staff_id, weekdays = written, "weekly schedule saved");

    load_student_pickup_data(repo, student_id, None).await
}

pub async fn clear_weekly_schedule<R>(
    repo: &R,
    caller: &Caller,
    student_id: StudentId,
) -> Result<u64, CoreError>
where
    R: Repository + ?Sized,
{
    require_full_access(repo, caller, student_id).await?;
    let removed = repo.clear_weekly_schedule(student_id).await?;
    info!(student_id, staff_id = caller.staff_id, removed, "weekly schedule cleared");
    Ok(removed)
}

pub async fn create_exception<R>(
    repo: &R,
    caller: &Caller,
    student_id: StudentId,
    request: &ExceptionRequest,
) -> Result<PickupException, CoreError>
where
    R: Repository + ?Sized,
{
    require_full_access(repo, caller, student_id).await?;
    let validated = validation::validate_exception(request)?;

    let exception = repo
        .add_exception(NewExceptionData {
            student_id,
            exception_date: validated.exception_date,
            pickup_time: validated.pickup_time,
            reason: validated.reason,
            created_by: caller.staff_id,
        })
        .await?;
    info!(student_id, exception_id = %exception.id, date = %exception.exception_date, "exception created");
    Ok(exception)
}

/// Loads the exception and checks it belongs to `student_id`.
async fn owned_exception<R>(
    repo: &R,
    student_id: StudentId,
    exception_id: Uuid,
) -> Result<PickupException, CoreError>
where
    R: Repository + ?Sized,
{
    let exception = repo
        .find_exception_by_id(exception_id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Exception with id {} not found", exception_id)))?;

    if exception.student_id != student_id {
        warn!(%exception_id, student_id, owner = exception.student_id, "exception belongs to another student");
        return Err(CoreError::Forbidden(format!(
            "exception {} does not belong to student {}",
            exception_id, student_id
        )));
    }
    Ok(exception)
}

/// Partial update; creator and creation time are always preserved.
pub async fn update_exception<R>(
    repo: &R,
    caller: &Caller,
    student_id: StudentId,
    exception_id: Uuid,
    request: &ExceptionUpdateRequest,
) -> Result<PickupException, CoreError>
where
    R: Repository + ?Sized,
{
    require_full_access(repo, caller, student_id).await?;
    let changes = validation::validate_exception_update(request)?;
    owned_exception(repo, student_id, exception_id).await?;

    let updated = repo.update_exception(exception_id, changes).await?;
    info!(student_id, %exception_id, "exception updated");
    Ok(updated)
}

pub async fn delete_exception<R>(
    repo: &R,
    caller: &Caller,
    student_id: StudentId,
    exception_id: Uuid,
) -> Result<(), CoreError>
where
    R: Repository + ?Sized,
{
    require_full_access(repo, caller, student_id).await?;
    owned_exception(repo, student_id, exception_id).await?;

    repo.delete_exception(exception_id).await?;
    info!(student_id, %exception_id, "exception deleted");
    Ok(())
}

pub async fn create_note<R>(
    repo: &R,
    caller: &Caller,
    student_id: StudentId,
    request: &NoteRequest,
) -> Result<DayNote, CoreError>
where
    R: Repository + ?Sized,
{
    require_full_access(repo, caller, student_id).await?;
    let (note_date, content) = validation::validate_note(request)?;

    let note = repo
        .add_note(NewNoteData {
            student_id,
            note_date,
            content,
            created_by: caller.staff_id,
        })
        .await?;
    info!(student_id, note_id = %note.id, date = %note.note_date, "day note created");
    Ok(note)
}

async fn owned_note<R>(repo: &R, student_id: StudentId, note_id: Uuid) -> Result<DayNote, CoreError>
where
    R: Repository + ?Sized,
{
    let note = repo
        .find_note_by_id(note_id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Note with id {} not found", note_id)))?;

    if note.student_id != student_id {
        warn!(%note_id, student_id, owner = note.student_id, "note belongs to another student");
        return Err(CoreError::Forbidden(format!(
            "note {} does not belong to student {}",
            note_id, student_id
        )));
    }
    Ok(note)
}

pub async fn update_note<R>(
    repo: &R,
    caller: &Caller,
    student_id: StudentId,
    note_id: Uuid,
    request: &NoteUpdateRequest,
) -> Result<DayNote, CoreError>
where
    R: Repository + ?Sized,
{
    require_full_access(repo, caller, student_id).await?;
    let changes = validation::validate_note_update(request)?;
    owned_note(repo, student_id, note_id).await?;

    let updated = repo.update_note(note_id, changes).await?;
    info!(student_id, %note_id, "day note updated");
    Ok(updated)
}

pub async fn delete_note<R>(
    repo: &R,
    caller: &Caller,
    student_id: StudentId,
    note_id: Uuid,
) -> Result<(), CoreError>
where
    R: Repository + ?Sized,
{
    require_full_access(repo, caller, student_id).await?;
    owned_note(repo, student_id, note_id).await?;

    repo.delete_note(note_id).await?;
    info!(student_id, %note_id, "day note deleted");
    Ok(())
}

/// Creates an exception plus a day note on the same date. Both payloads are
/// validated before anything is written. If storing the note fails the
/// exception is removed again and the note error is returned.
pub async fn create_exception_with_note<R>(
    repo: &R,
    caller: &Caller,
    student_id: StudentId,
    request: &ExceptionRequest,
    note_content: &str,
) -> Result<(PickupException, DayNote), CoreError>
where
    R: Repository + ?Sized,
{
    require_full_access(repo, caller, student_id).await?;
    let validated = validation::validate_exception(request)?;
    let (note_date, content) = validation::validate_note(&NoteRequest {
        note_date: timefmt::format_date(validated.exception_date),
        content: note_content.to_string(),
    })?;

    let exception = repo
        .add_exception(NewExceptionData {
            student_id,
            exception_date: validated.exception_date,
            pickup_time: validated.pickup_time,
            reason: validated.reason,
            created_by: caller.staff_id,
        })
        .await?;

    let stored_note = repo
        .add_note(NewNoteData {
            student_id,
            note_date,
            content,
            created_by: caller.staff_id,
        })
        .await;

    match stored_note {
        Ok(note) => {
            info!(student_id, exception_id = %exception.id, note_id = %note.id, "exception with day note created");
            Ok((exception, note))
        }
        Err(note_err) => {
            warn!(student_id, exception_id = %exception.id, "day note failed, removing exception");
            if let Err(cleanup_err) = repo.delete_exception(exception.id).await {
                error!(
                    exception_id = %exception.id,
                    error = %cleanup_err,
                    "compensating delete of exception failed"
                );
            }
            Err(note_err)
        }
    }
}

/// Bulk resolution for up to [`validation::MAX_BULK_STUDENTS`] students.
/// Only authorized students are returned, in request order. `date` defaults
/// to today.
pub async fn bulk_effective_pickup_times<R>(
    repo: &R,
    caller: &Caller,
    student_ids: &[StudentId],
    date: Option<&str>,
) -> Result<Vec<EffectivePickupTime>, CoreError>
where
    R: Repository + ?Sized,
{
    validation::validate_bulk_request(student_ids)?;
    let date = resolve_date(date)?;

    let authorized = filter_authorized_student_ids(repo, caller, student_ids).await?;
    if authorized.is_empty() {
        return Ok(Vec::new());
    }

    let mut resolved = resolve_effective_pickup_times(repo, &authorized, date).await?;
    Ok(authorized
        .iter()
        .filter_map(|id| resolved.remove(id))
        .collect())
}

/// Effective pickup for one student, through the same engine as the bulk path.
pub async fn effective_pickup_time<R>(
    repo: &R,
    caller: &Caller,
    student_id: StudentId,
    date: Option<&str>,
) -> Result<EffectivePickupTime, CoreError>
where
    R: Repository + ?Sized,
{
    require_full_access(repo, caller, student_id).await?;
    let date = resolve_date(date)?;

    resolve_effective_pickup_times(repo, &[student_id], date)
        .await?
        .remove(&student_id)
        .ok_or_else(|| CoreError::Internal(format!("student {} missing from resolution", student_id)))
}
