use crate::error::CoreError;
use crate::models::{NewScheduleEntry, StaffId, StudentId, WeeklySchedule};
use crate::repository::{push_in_list, SqliteRepository};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};
use tracing::debug;

#[async_trait]
impl super::ScheduleRepository for SqliteRepository {
    async fn find_schedules_by_weekday(&self, student_ids: &[StudentId], weekday: u32) -> Result<Vec<WeeklySchedule>, CoreError> {
        if student_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query_builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM pickup_schedules WHERE weekday = ");
        query_builder.push_bind(weekday as i32);
        query_builder.push(" AND ");
        push_in_list(&mut query_builder, "student_id", student_ids);

        let schedules = query_builder.build_query_as().fetch_all(self.pool()).await?;
        Ok(schedules)
    }

    async fn find_schedules_for_student(&self, student_id: StudentId) -> Result<Vec<WeeklySchedule>, CoreError> {
        let schedules = sqlx::query_as(
            "SELECT * FROM pickup_schedules WHERE student_id = $1 ORDER BY weekday",
        )
        .bind(student_id)
        .fetch_all(self.pool())
        .await?;
        Ok(schedules)
    }

    async fn replace_weekly_schedule(&self, student_id: StudentId, entries: Vec<NewScheduleEntry>, created_by: StaffId) -> Result<Vec<WeeklySchedule>, CoreError> {
        let mut tx = self.pool().begin().await?;
        let now = Utc::now();

        // Drop weekdays the new week no longer mentions
        let mut delete_builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("DELETE FROM pickup_schedules WHERE student_id = ");
        delete_builder.push_bind(student_id);
        if !entries.is_empty() {
            let weekdays: Vec<i64> = entries.iter().map(|e| e.weekday as i64).collect();
            delete_builder.push(" AND NOT ");
            push_in_list(&mut delete_builder, "weekday", &weekdays);
        }
        let removed = delete_builder.build().execute(&mut *tx).await?.rows_affected();

        for entry in &entries {
            sqlx::query(
                r#"INSERT INTO pickup_schedules (student_id, weekday, pickup_time, notes, created_by, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (student_id, weekday) DO UPDATE SET
                    pickup_time = excluded.pickup_time,
                    notes = excluded.notes,
                    updated_at = excluded.updated_at"#,
            )
            .bind(student_id)
            .bind(entry.weekday as i32)
            .bind(entry.pickup_time)
            .bind(&entry.notes)
            .bind(created_by)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        let schedules: Vec<WeeklySchedule> = sqlx::query_as(
            "SELECT * FROM pickup_schedules WHERE student_id = $1 ORDER BY weekday",
        )
        .bind(student_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(student_id, written = entries.len(), removed, "weekly schedule replaced");
        Ok(schedules)
    }

    async fn clear_weekly_schedule(&self, student_id: StudentId) -> Result<u64, CoreError> {
        let result = sqlx::query("DELETE FROM pickup_schedules WHERE student_id = $1")
            .bind(student_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }
}
