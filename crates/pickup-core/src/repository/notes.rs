use crate::error::CoreError;
use crate::models::{DayNote, NewNoteData, StudentId, UpdateNoteData};
use crate::repository::{push_in_list, SqliteRepository};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

#[async_trait]
impl super::NoteRepository for SqliteRepository {
    async fn find_notes_by_date(&self, student_ids: &[StudentId], date: NaiveDate) -> Result<Vec<DayNote>, CoreError> {
        if student_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query_builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM pickup_notes WHERE note_date = ");
        query_builder.push_bind(date);
        query_builder.push(" AND ");
        push_in_list(&mut query_builder, "student_id", student_ids);
        query_builder.push(" ORDER BY created_at, id");

        let notes = query_builder.build_query_as().fetch_all(self.pool()).await?;
        Ok(notes)
    }

    async fn find_note_by_id(&self, id: Uuid) -> Result<Option<DayNote>, CoreError> {
        let note = sqlx::query_as("SELECT * FROM pickup_notes WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(note)
    }

    async fn find_notes_for_student(&self, student_id: StudentId, from: Option<NaiveDate>) -> Result<Vec<DayNote>, CoreError> {
        let mut query_builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM pickup_notes WHERE student_id = ");
        query_builder.push_bind(student_id);
        if let Some(from) = from {
            query_builder.push(" AND note_date >= ");
            query_builder.push_bind(from);
        }
        query_builder.push(" ORDER BY note_date, created_at, id");

        let notes = query_builder.build_query_as().fetch_all(self.pool()).await?;
        Ok(notes)
    }

    async fn add_note(&self, data: NewNoteData) -> Result<DayNote, CoreError> {
        let now = Utc::now();
        let note = DayNote {
            id: Uuid::now_v7(),
            student_id: data.student_id,
            note_date: data.note_date,
            content: data.content,
            created_by: data.created_by,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"INSERT INTO pickup_notes (id, student_id, note_date, content, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
        )
        .bind(note.id)
        .bind(note.student_id)
        .bind(note.note_date)
        .bind(&note.content)
        .bind(note.created_by)
        .bind(note.created_at)
        .bind(note.updated_at)
        .execute(self.pool())
        .await?;

        Ok(note)
    }

    async fn update_note(&self, id: Uuid, data: UpdateNoteData) -> Result<DayNote, CoreError> {
        let mut tx = self.pool().begin().await?;

        let current: DayNote = sqlx::query_as("SELECT * FROM pickup_notes WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Note with id {} not found", id)))?;

        let updated: DayNote = sqlx::query_as(
            r#"UPDATE pickup_notes
            SET note_date = $1, content = $2, updated_at = $3
            WHERE id = $4
            RETURNING *"#,
        )
        .bind(data.note_date.unwrap_or(current.note_date))
        .bind(data.content.unwrap_or(current.content))
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_note(&self, id: Uuid) -> Result<(), CoreError> {
        let result = sqlx::query("DELETE FROM pickup_notes WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Note with id {} not found", id)));
        }
        Ok(())
    }
}
