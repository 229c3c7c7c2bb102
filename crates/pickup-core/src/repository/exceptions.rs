use crate::error::CoreError;
use crate::models::{NewExceptionData, PickupException, StudentId, UpdateExceptionData};
use crate::repository::{push_in_list, unique_violation_as, SqliteRepository};
use crate::timefmt::format_date;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

#[async_trait]
impl super::ExceptionRepository for SqliteRepository {
    async fn find_exceptions_by_date(&self, student_ids: &[StudentId], date: NaiveDate) -> Result<Vec<PickupException>, CoreError> {
        if student_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query_builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM pickup_exceptions WHERE exception_date = ");
        query_builder.push_bind(date);
        query_builder.push(" AND ");
        push_in_list(&mut query_builder, "student_id", student_ids);

        let exceptions = query_builder.build_query_as().fetch_all(self.pool()).await?;
        Ok(exceptions)
    }

    async fn find_exception_by_id(&self, id: Uuid) -> Result<Option<PickupException>, CoreError> {
        let exception = sqlx::query_as("SELECT * FROM pickup_exceptions WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(exception)
    }

    async fn find_exceptions_for_student(&self, student_id: StudentId, from: Option<NaiveDate>) -> Result<Vec<PickupException>, CoreError> {
        let mut query_builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM pickup_exceptions WHERE student_id = ");
        query_builder.push_bind(student_id);
        if let Some(from) = from {
            query_builder.push(" AND exception_date >= ");
            query_builder.push_bind(from);
        }
        query_builder.push(" ORDER BY exception_date");

        let exceptions = query_builder.build_query_as().fetch_all(self.pool()).await?;
        Ok(exceptions)
    }

    async fn add_exception(&self, data: NewExceptionData) -> Result<PickupException, CoreError> {
        let now = Utc::now();
        let exception = PickupException {
            id: Uuid::now_v7(),
            student_id: data.student_id,
            exception_date: data.exception_date,
            pickup_time: data.pickup_time,
            reason: data.reason,
            created_by: data.created_by,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"INSERT INTO pickup_exceptions (id, student_id, exception_date, pickup_time, reason, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
        )
        .bind(exception.id)
        .bind(exception.student_id)
        .bind(exception.exception_date)
        .bind(exception.pickup_time)
        .bind(&exception.reason)
        .bind(exception.created_by)
        .bind(exception.created_at)
        .bind(exception.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| {
            unique_violation_as(e, || duplicate_message(exception.student_id, exception.exception_date))
        })?;

        Ok(exception)
    }

    async fn update_exception(&self, id: Uuid, data: UpdateExceptionData) -> Result<PickupException, CoreError> {
        let mut tx = self.pool().begin().await?;

        let current: PickupException = sqlx::query_as("SELECT * FROM pickup_exceptions WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Exception with id {} not found", id)))?;

        let exception_date = data.exception_date.unwrap_or(current.exception_date);
        let pickup_time = data.pickup_time.unwrap_or(current.pickup_time);
        let reason = data.reason.unwrap_or(current.reason);

        // created_by and created_at are never touched
        let updated: PickupException = sqlx::query_as(
            r#"UPDATE pickup_exceptions
            SET exception_date = $1, pickup_time = $2, reason = $3, updated_at = $4
            WHERE id = $5
            RETURNING *"#,
        )
        .bind(exception_date)
        .bind(pickup_time)
        .bind(&reason)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| unique_violation_as(e, || duplicate_message(current.student_id, exception_date)))?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_exception(&self, id: Uuid) -> Result<(), CoreError> {
        let result = sqlx::query("DELETE FROM pickup_exceptions WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Exception with id {} not found", id)));
        }
        Ok(())
    }
}

fn duplicate_message(student_id: StudentId, date: NaiveDate) -> String {
    format!(
        "student {} already has an exception on {}",
        student_id,
        format_date(date)
    )
}
