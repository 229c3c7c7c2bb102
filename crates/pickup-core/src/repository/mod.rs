use crate::access::IdentityProvider;
use crate::db::DbPool;
use crate::error::CoreError;
use crate::models::{
    DayNote, Group, GroupId, NewExceptionData, NewNoteData, NewScheduleEntry, PickupException,
    StaffId, Staff, Student, StudentId, UpdateExceptionData, UpdateNoteData, WeeklySchedule,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

pub mod exceptions;
pub mod notes;
pub mod roster;
pub mod schedules;

// Traits are defined here and implemented for SQLite in the domain modules

/// Weekly schedule storage
#[async_trait]
pub trait ScheduleRepository {
    /// All entries for any of `student_ids` on `weekday`, in one query.
    async fn find_schedules_by_weekday(&self, student_ids: &[StudentId], weekday: u32) -> Result<Vec<WeeklySchedule>, CoreError>;
    async fn find_schedules_for_student(&self, student_id: StudentId) -> Result<Vec<WeeklySchedule>, CoreError>;
    /// Atomically replaces the student's week with `entries`. Weekdays absent
    /// from `entries` are removed; existing weekdays keep creator and creation time.
    async fn replace_weekly_schedule(&self, student_id: StudentId, entries: Vec<NewScheduleEntry>, created_by: StaffId) -> Result<Vec<WeeklySchedule>, CoreError>;
    async fn clear_weekly_schedule(&self, student_id: StudentId) -> Result<u64, CoreError>;
}

/// Dated exception storage
#[async_trait]
pub trait ExceptionRepository {
    async fn find_exceptions_by_date(&self, student_ids: &[StudentId], date: NaiveDate) -> Result<Vec<PickupException>, CoreError>;
    async fn find_exception_by_id(&self, id: Uuid) -> Result<Option<PickupException>, CoreError>;
    async fn find_exceptions_for_student(&self, student_id: StudentId, from: Option<NaiveDate>) -> Result<Vec<PickupException>, CoreError>;
    async fn add_exception(&self, data: NewExceptionData) -> Result<PickupException, CoreError>;
    async fn update_exception(&self, id: Uuid, data: UpdateExceptionData) -> Result<PickupException, CoreError>;
    async fn delete_exception(&self, id: Uuid) -> Result<(), CoreError>;
}

/// Day note storage
#[async_trait]
pub trait NoteRepository {
    async fn find_notes_by_date(&self, student_ids: &[StudentId], date: NaiveDate) -> Result<Vec<DayNote>, CoreError>;
    async fn find_note_by_id(&self, id: Uuid) -> Result<Option<DayNote>, CoreError>;
    async fn find_notes_for_student(&self, student_id: StudentId, from: Option<NaiveDate>) -> Result<Vec<DayNote>, CoreError>;
    async fn add_note(&self, data: NewNoteData) -> Result<DayNote, CoreError>;
    async fn update_note(&self, id: Uuid, data: UpdateNoteData) -> Result<DayNote, CoreError>;
    async fn delete_note(&self, id: Uuid) -> Result<(), CoreError>;
}

/// Groups, students, staff and supervision
#[async_trait]
pub trait RosterRepository {
    async fn add_group(&self, name: &str) -> Result<Group, CoreError>;
    async fn find_groups(&self) -> Result<Vec<Group>, CoreError>;
    async fn add_student(&self, name: &str, group_id: Option<GroupId>) -> Result<Student, CoreError>;
    async fn move_student(&self, student_id: StudentId, group_id: Option<GroupId>) -> Result<Student, CoreError>;
    async fn find_student_by_id(&self, id: StudentId) -> Result<Option<Student>, CoreError>;
    async fn find_students_by_group_ids(&self, group_ids: &[GroupId]) -> Result<Vec<StudentId>, CoreError>;
    async fn add_staff(&self, login: &str, display_name: &str) -> Result<Staff, CoreError>;
    async fn find_staff_by_login(&self, login: &str) -> Result<Option<Staff>, CoreError>;
    async fn grant_permission(&self, staff_id: StaffId, scope: &str) -> Result<(), CoreError>;
    async fn assign_supervisor(&self, group_id: GroupId, staff_id: StaffId) -> Result<(), CoreError>;
}

/// Main repository trait that composes all domain traits
pub trait Repository:
    ScheduleRepository
    + ExceptionRepository
    + NoteRepository
    + RosterRepository
    + IdentityProvider
    + Send
    + Sync
{
}

/// SQLite implementation of the repository pattern
pub struct SqliteRepository {
    pool: DbPool,
}

impl SqliteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the database pool for internal use across modules
    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl Repository for SqliteRepository {}

/// Appends `column IN (?, ?, ...)` binding every id.
pub(crate) fn push_in_list(query_builder: &mut QueryBuilder<'_, Sqlite>, column: &str, ids: &[i64]) {
    query_builder.push(column);
    query_builder.push(" IN (");
    let mut separated = query_builder.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}

/// Maps a UNIQUE constraint failure to a validation error with `msg`.
pub(crate) fn unique_violation_as(err: sqlx::Error, msg: impl FnOnce() -> String) -> CoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => CoreError::Validation(msg()),
        _ => CoreError::Database(err),
    }
}
