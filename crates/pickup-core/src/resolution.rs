//! Effective pickup time resolution.
//!
//! Precedence per student and date is strict:
//!
//! 1. an exception on that date, even one without a time ("no pickup")
//! 2. the weekly schedule entry for that weekday
//! 3. nothing configured
//!
//! Day notes are attached regardless of which rule fired. The store is hit
//! with a fixed number of batched queries no matter how many students are
//! requested; [`merge_effective_times`] then does the rest in memory.

use crate::error::CoreError;
use crate::models::{DayNote, DayNoteSummary, EffectivePickupTime, PickupException, StudentId, WeeklySchedule};
use crate::repository::{ExceptionRepository, NoteRepository, ScheduleRepository};
use crate::timefmt;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Resolves every requested student for `date`. Students without any data
/// still get an entry, with no pickup time.
pub async fn resolve_effective_pickup_times<R>(
    repo: &R,
    student_ids: &[StudentId],
    date: NaiveDate,
) -> Result<BTreeMap<StudentId, EffectivePickupTime>, CoreError>
where
    R: ScheduleRepository + ExceptionRepository + NoteRepository + Sync + ?Sized,
{
    let ids = dedup_ids(student_ids);
    if ids.is_empty() {
        return Ok(BTreeMap::new());
    }

    // Weekends match no schedule row but may still carry exceptions and notes
    let weekday = timefmt::weekday_of(date);

    let (exceptions, schedules, notes) = tokio::try_join!(
        repo.find_exceptions_by_date(&ids, date),
        repo.find_schedules_by_weekday(&ids, weekday),
        repo.find_notes_by_date(&ids, date),
    )?;

    debug!(
        students = ids.len(),
        exceptions = exceptions.len(),
        schedules = schedules.len(),
        notes = notes.len(),
        %date,
        "resolving effective pickup times"
    );

    Ok(merge_effective_times(&ids, date, exceptions, schedules, notes))
}

/// Pure precedence merge over already fetched rows.
///
/// Rows belonging to students not in `student_ids`, or to another date or
/// weekday, are ignored. When the store hands back two exceptions for the
/// same student and date, the first one wins.
pub fn merge_effective_times(
    student_ids: &[StudentId],
    date: NaiveDate,
    exceptions: Vec<PickupException>,
    schedules: Vec<WeeklySchedule>,
    notes: Vec<DayNote>,
) -> BTreeMap<StudentId, EffectivePickupTime> {
    let weekday = timefmt::weekday_of(date) as i32;

    let mut exception_by_student: HashMap<StudentId, PickupException> = HashMap::new();
    for exception in exceptions.into_iter().filter(|e| e.exception_date == date) {
        exception_by_student.entry(exception.student_id).or_insert(exception);
    }

    let mut schedule_by_student: HashMap<StudentId, WeeklySchedule> = HashMap::new();
    for schedule in schedules.into_iter().filter(|s| s.weekday == weekday) {
        schedule_by_student.entry(schedule.student_id).or_insert(schedule);
    }

    let mut notes_by_student: HashMap<StudentId, Vec<DayNoteSummary>> = HashMap::new();
    for note in notes.iter().filter(|n| n.note_date == date) {
        notes_by_student
            .entry(note.student_id)
            .or_default()
            .push(DayNoteSummary::from(note));
    }

    student_ids
        .iter()
        .map(|&student_id| {
            let mut result = EffectivePickupTime::unscheduled(student_id, date);

            if let Some(exception) = exception_by_student.remove(&student_id) {
                result.is_exception = true;
                result.pickup_time = exception.pickup_time;
                result.reason = exception.reason;
            } else if let Some(schedule) = schedule_by_student.remove(&student_id) {
                result.pickup_time = Some(schedule.pickup_time);
                result.notes = schedule.notes;
            }

            if let Some(day_notes) = notes_by_student.remove(&student_id) {
                result.day_notes = day_notes;
            }

            (student_id, result)
        })
        .collect()
}

fn dedup_ids(student_ids: &[StudentId]) -> Vec<StudentId> {
    let mut seen = HashSet::with_capacity(student_ids.len());
    student_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PickupSource;
    use chrono::{NaiveTime, Utc};
    use proptest::prelude::*;
    use uuid::Uuid;

    // 2024-09-02 is a Monday
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn schedule(student_id: StudentId, weekday: i32, time: NaiveTime, notes: Option<&str>) -> WeeklySchedule {
        WeeklySchedule {
            student_id,
            weekday,
            pickup_time: time,
            notes: notes.map(str::to_string),
            created_by: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn exception(student_id: StudentId, date: NaiveDate, time: Option<NaiveTime>, reason: Option<&str>) -> PickupException {
        PickupException {
            id: Uuid::now_v7(),
            student_id,
            exception_date: date,
            pickup_time: time,
            reason: reason.map(str::to_string),
            created_by: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn note(student_id: StudentId, date: NaiveDate, content: &str) -> DayNote {
        DayNote {
            id: Uuid::now_v7(),
            student_id,
            note_date: date,
            content: content.to_string(),
            created_by: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_schedule_applies_without_exception() {
        let result = merge_effective_times(
            &[1],
            monday(),
            vec![],
            vec![schedule(1, 1, hm(15, 30), Some("With sister"))],
            vec![],
        );

        let entry = &result[&1];
        assert_eq!(entry.pickup_time, Some(hm(15, 30)));
        assert_eq!(entry.notes.as_deref(), Some("With sister"));
        assert!(!entry.is_exception);
        assert_eq!(entry.weekday_name, "Monday");
        assert_eq!(entry.source(), PickupSource::Schedule);
    }

    #[test]
    fn test_exception_wins_over_schedule() {
        let result = merge_effective_times(
            &[1],
            monday(),
            vec![exception(1, monday(), Some(hm(12, 0)), Some("Doctor"))],
            vec![schedule(1, 1, hm(15, 30), Some("With sister"))],
            vec![],
        );

        let entry = &result[&1];
        assert_eq!(entry.pickup_time, Some(hm(12, 0)));
        assert!(entry.is_exception);
        assert_eq!(entry.reason.as_deref(), Some("Doctor"));
        assert_eq!(entry.notes, None);
    }

    #[test]
    fn test_exception_without_time_means_no_pickup() {
        let result = merge_effective_times(
            &[1],
            monday(),
            vec![exception(1, monday(), None, Some("Sick"))],
            vec![schedule(1, 1, hm(15, 30), None)],
            vec![],
        );

        let entry = &result[&1];
        assert_eq!(entry.pickup_time, None);
        assert!(entry.is_exception);
        assert_eq!(entry.source(), PickupSource::Exception);
    }

    #[test]
    fn test_unknown_students_are_present_without_time() {
        let result = merge_effective_times(&[1, 2], monday(), vec![], vec![], vec![]);

        assert_eq!(result.len(), 2);
        for entry in result.values() {
            assert_eq!(entry.pickup_time, None);
            assert!(!entry.is_exception);
            assert_eq!(entry.source(), PickupSource::Unscheduled);
        }
    }

    #[test]
    fn test_day_notes_attach_to_every_branch() {
        let result = merge_effective_times(
            &[1, 2, 3],
            monday(),
            vec![exception(1, monday(), None, None)],
            vec![schedule(2, 1, hm(14, 0), None)],
            vec![
                note(1, monday(), "Grandma picks up"),
                note(2, monday(), "Bring gym bag"),
                note(2, monday(), "Call mother"),
                note(3, monday(), "Library day"),
            ],
        );

        assert_eq!(result[&1].day_notes.len(), 1);
        let contents: Vec<&str> = result[&2].day_notes.iter().map(|n| n.content.as_str()).collect();
        assert_eq!(contents, vec!["Bring gym bag", "Call mother"]);
        assert_eq!(result[&3].day_notes[0].content, "Library day");
        assert_eq!(result[&3].pickup_time, None);
    }

    #[test]
    fn test_rows_for_other_days_and_students_are_ignored() {
        let tuesday = monday().succ_opt().unwrap();
        let result = merge_effective_times(
            &[1],
            monday(),
            vec![exception(1, tuesday, Some(hm(9, 0)), None), exception(9, monday(), None, None)],
            vec![schedule(1, 2, hm(16, 0), None)],
            vec![note(1, tuesday, "tomorrow")],
        );

        assert_eq!(result.len(), 1);
        let entry = &result[&1];
        assert_eq!(entry.source(), PickupSource::Unscheduled);
        assert!(entry.day_notes.is_empty());
    }

    #[test]
    fn test_weekend_exception_still_applies() {
        let saturday = NaiveDate::from_ymd_opt(2024, 9, 7).unwrap();
        let result = merge_effective_times(
            &[1],
            saturday,
            vec![exception(1, saturday, Some(hm(10, 0)), Some("Sports day"))],
            vec![],
            vec![],
        );

        let entry = &result[&1];
        assert!(entry.is_exception);
        assert_eq!(entry.pickup_time, Some(hm(10, 0)));
        assert_eq!(entry.weekday_name, "Saturday");
    }

    #[test]
    fn test_dedup_ids_keeps_first_occurrence() {
        assert_eq!(dedup_ids(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
    }

    proptest! {
        #[test]
        fn prop_precedence_is_total(
            with_exception in proptest::collection::vec(any::<bool>(), 1..30),
            with_schedule in proptest::collection::vec(any::<bool>(), 1..30),
            exception_has_time in any::<bool>(),
        ) {
            let n = with_exception.len().min(with_schedule.len());
            let ids: Vec<StudentId> = (1..=n as StudentId).collect();
            let exception_time = exception_has_time.then(|| hm(11, 0));

            let exceptions = ids.iter()
                .filter(|id| with_exception[(**id - 1) as usize])
                .map(|&id| exception(id, monday(), exception_time, Some("r")))
                .collect();
            let schedules = ids.iter()
                .filter(|id| with_schedule[(**id - 1) as usize])
                .map(|&id| schedule(id, 1, hm(15, 0), Some("s")))
                .collect();

            let result = merge_effective_times(&ids, monday(), exceptions, schedules, vec![]);
            prop_assert_eq!(result.len(), n);

            for &id in &ids {
                let entry = &result[&id];
                let idx = (id - 1) as usize;
                if with_exception[idx] {
                    prop_assert!(entry.is_exception);
                    prop_assert_eq!(entry.pickup_time, exception_time);
                } else if with_schedule[idx] {
                    prop_assert!(!entry.is_exception);
                    prop_assert_eq!(entry.pickup_time, Some(hm(15, 0)));
                } else {
                    prop_assert!(!entry.is_exception);
                    prop_assert_eq!(entry.pickup_time, None);
                }
            }
        }
    }
}
