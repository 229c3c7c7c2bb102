use crate::timefmt;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub type StudentId = i64;
pub type StaffId = i64;
pub type GroupId = i64;

// ============================================================================
// Roster
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    /// The group the student currently belongs to
    pub group_id: Option<GroupId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Staff {
    pub id: StaffId,
    pub login: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Pickup data
// ============================================================================

/// Recurring pickup time for one school day. At most one per (student, weekday).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct WeeklySchedule {
    pub student_id: StudentId,
    /// 1 = Monday .. 5 = Friday
    pub weekday: i32,
    #[serde(with = "timefmt::hhmm")]
    pub pickup_time: NaiveTime,
    pub notes: Option<String>,
    pub created_by: StaffId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Date specific override of the weekly schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PickupException {
    pub id: Uuid,
    pub student_id: StudentId,
    pub exception_date: NaiveDate,
    /// `None` means the student is explicitly not picked up that day
    #[serde(with = "timefmt::hhmm_option")]
    pub pickup_time: Option<NaiveTime>,
    pub reason: Option<String>,
    pub created_by: StaffId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PickupException {
    pub fn is_no_pickup(&self) -> bool {
        self.pickup_time.is_none()
    }
}

/// Free text annotation for a date. Never affects the pickup time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DayNote {
    pub id: Uuid,
    pub student_id: StudentId,
    pub note_date: NaiveDate,
    pub content: String,
    pub created_by: StaffId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayNoteSummary {
    pub id: Uuid,
    pub content: String,
}

impl From<&DayNote> for DayNoteSummary {
    fn from(note: &DayNote) -> Self {
        Self {
            id: note.id,
            content: note.content.clone(),
        }
    }
}

/// Resolved pickup outcome for one student on one date. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectivePickupTime {
    pub student_id: StudentId,
    pub date: NaiveDate,
    pub weekday_name: String,
    #[serde(with = "timefmt::hhmm_option")]
    pub pickup_time: Option<NaiveTime>,
    pub is_exception: bool,
    /// Only set when `is_exception`
    pub reason: Option<String>,
    /// The weekly schedule's note, only set when the schedule was used
    pub notes: Option<String>,
    pub day_notes: Vec<DayNoteSummary>,
}

impl EffectivePickupTime {
    /// A result with no pickup configured for the day.
    pub fn unscheduled(student_id: StudentId, date: NaiveDate) -> Self {
        let weekday = timefmt::weekday_of(date);
        let weekday_name = timefmt::weekday_name(weekday)
            .map(str::to_string)
            .unwrap_or_else(|_| timefmt::day_name(date));
        Self {
            student_id,
            date,
            weekday_name,
            pickup_time: None,
            is_exception: false,
            reason: None,
            notes: None,
            day_notes: Vec::new(),
        }
    }

    pub fn source(&self) -> PickupSource {
        if self.is_exception {
            PickupSource::Exception
        } else if self.pickup_time.is_some() {
            PickupSource::Schedule
        } else {
            PickupSource::Unscheduled
        }
    }
}

/// Which rule produced an [`EffectivePickupTime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickupSource {
    Exception,
    Schedule,
    Unscheduled,
}

impl std::fmt::Display for PickupSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PickupSource::Exception => write!(f, "exception"),
            PickupSource::Schedule => write!(f, "schedule"),
            PickupSource::Unscheduled => write!(f, "none"),
        }
    }
}

/// Everything stored for one student, as returned by single-student reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentPickupData {
    pub student_id: StudentId,
    pub schedules: Vec<WeeklySchedule>,
    pub exceptions: Vec<PickupException>,
    pub notes: Vec<DayNote>,
}

// ============================================================================
// Requests (unvalidated, as received from a caller)
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleEntryRequest {
    pub weekday: u32,
    pub pickup_time: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExceptionRequest {
    pub exception_date: String,
    /// Absent means no pickup on that date
    #[serde(default)]
    pub pickup_time: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Partial exception update. An outer `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ExceptionUpdateRequest {
    pub exception_date: Option<String>,
    pub pickup_time: Option<Option<String>>,
    pub reason: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteRequest {
    pub note_date: String,
    pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct NoteUpdateRequest {
    pub note_date: Option<String>,
    pub content: Option<String>,
}

// ============================================================================
// Data Transfer Objects (validated, handed to the store)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct NewScheduleEntry {
    pub weekday: u32,
    pub pickup_time: NaiveTime,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewExceptionData {
    pub student_id: StudentId,
    pub exception_date: NaiveDate,
    pub pickup_time: Option<NaiveTime>,
    pub reason: Option<String>,
    pub created_by: StaffId,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateExceptionData {
    pub exception_date: Option<NaiveDate>,
    pub pickup_time: Option<Option<NaiveTime>>,
    pub reason: Option<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct NewNoteData {
    pub student_id: StudentId,
    pub note_date: NaiveDate,
    pub content: String,
    pub created_by: StaffId,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateNoteData {
    pub note_date: Option<NaiveDate>,
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_time_serializes_hhmm_and_null() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
        let mut entry = EffectivePickupTime::unscheduled(3, date);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["pickup_time"], serde_json::Value::Null);
        assert_eq!(json["date"], "2024-09-02");
        assert_eq!(json["weekday_name"], "Monday");

        entry.pickup_time = NaiveTime::from_hms_opt(15, 30, 0);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["pickup_time"], "15:30");

        let back: EffectivePickupTime = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_source_follows_precedence_flags() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 7).unwrap();
        let mut entry = EffectivePickupTime::unscheduled(1, date);
        assert_eq!(entry.weekday_name, "Saturday");
        assert_eq!(entry.source(), PickupSource::Unscheduled);

        entry.is_exception = true;
        assert_eq!(entry.source(), PickupSource::Exception);
    }
}
