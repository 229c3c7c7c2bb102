use crate::access::{Caller, IdentityProvider};
use crate::error::CoreError;
use crate::models::{Group, GroupId, Staff, StaffId, Student, StudentId};
use crate::repository::{push_in_list, unique_violation_as, SqliteRepository};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};

#[async_trait]
impl super::RosterRepository for SqliteRepository {
    // Writes with RETURNING run in an explicit transaction so the row is
    // committed before the result is handed back.
    async fn add_group(&self, name: &str) -> Result<Group, CoreError> {
        let mut tx = self.pool().begin().await?;
        let group = sqlx::query_as(
            "INSERT INTO groups (name, created_at) VALUES ($1, $2) RETURNING *",
        )
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| unique_violation_as(e, || format!("group '{}' already exists", name)))?;
        tx.commit().await?;
        Ok(group)
    }

    async fn find_groups(&self) -> Result<Vec<Group>, CoreError> {
        let groups = sqlx::query_as("SELECT * FROM groups ORDER BY name")
            .fetch_all(self.pool())
            .await?;
        Ok(groups)
    }

    async fn add_student(&self, name: &str, group_id: Option<GroupId>) -> Result<Student, CoreError> {
        if let Some(group_id) = group_id {
            self.ensure_group_exists(group_id).await?;
        }
        let mut tx = self.pool().begin().await?;
        let student = sqlx::query_as(
            "INSERT INTO students (name, group_id, created_at) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(name)
        .bind(group_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(student)
    }

    async fn move_student(&self, student_id: StudentId, group_id: Option<GroupId>) -> Result<Student, CoreError> {
        if let Some(group_id) = group_id {
            self.ensure_group_exists(group_id).await?;
        }
        let mut tx = self.pool().begin().await?;
        let student = sqlx::query_as("UPDATE students SET group_id = $1 WHERE id = $2 RETURNING *")
            .bind(group_id)
            .bind(student_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Student with id {} not found", student_id)))?;
        tx.commit().await?;
        Ok(student)
    }

    async fn find_student_by_id(&self, id: StudentId) -> Result<Option<Student>, CoreError> {
        let student = sqlx::query_as("SELECT * FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(student)
    }

    async fn find_students_by_group_ids(&self, group_ids: &[GroupId]) -> Result<Vec<StudentId>, CoreError> {
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query_builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT id FROM students WHERE ");
        push_in_list(&mut query_builder, "group_id", group_ids);
        query_builder.push(" ORDER BY id");

        let ids: Vec<StudentId> = query_builder
            .build_query_scalar()
            .fetch_all(self.pool())
            .await?;
        Ok(ids)
    }

    async fn add_staff(&self, login: &str, display_name: &str) -> Result<Staff, CoreError> {
        let mut tx = self.pool().begin().await?;
        let staff = sqlx::query_as(
            "INSERT INTO staff (login, display_name, created_at) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(login)
        .bind(display_name)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| unique_violation_as(e, || format!("staff login '{}' already exists", login)))?;
        tx.commit().await?;
        Ok(staff)
    }

    async fn find_staff_by_login(&self, login: &str) -> Result<Option<Staff>, CoreError> {
        let staff = sqlx::query_as("SELECT * FROM staff WHERE login = $1")
            .bind(login)
            .fetch_optional(self.pool())
            .await?;
        Ok(staff)
    }

    async fn grant_permission(&self, staff_id: StaffId, scope: &str) -> Result<(), CoreError> {
        self.ensure_staff_exists(staff_id).await?;
        sqlx::query("INSERT OR IGNORE INTO staff_permissions (staff_id, scope) VALUES ($1, $2)")
            .bind(staff_id)
            .bind(scope)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    async fn assign_supervisor(&self, group_id: GroupId, staff_id: StaffId) -> Result<(), CoreError> {
        self.ensure_group_exists(group_id).await?;
        self.ensure_staff_exists(staff_id).await?;
        sqlx::query("INSERT OR IGNORE INTO group_supervisors (group_id, staff_id) VALUES ($1, $2)")
            .bind(group_id)
            .bind(staff_id)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for SqliteRepository {
    async fn resolve_caller(&self, principal: &str) -> Result<Caller, CoreError> {
        let staff: Staff = sqlx::query_as("SELECT * FROM staff WHERE login = $1")
            .bind(principal)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| {
                CoreError::Internal(format!("no staff member for principal '{}'", principal))
            })?;

        let permissions: Vec<String> = sqlx::query_scalar(
            "SELECT scope FROM staff_permissions WHERE staff_id = $1 ORDER BY scope",
        )
        .bind(staff.id)
        .fetch_all(self.pool())
        .await?;

        let supervised_group_ids: Vec<GroupId> = sqlx::query_scalar(
            "SELECT group_id FROM group_supervisors WHERE staff_id = $1 ORDER BY group_id",
        )
        .bind(staff.id)
        .fetch_all(self.pool())
        .await?;

        Ok(Caller {
            staff_id: staff.id,
            permissions,
            supervised_group_ids,
        })
    }
}

impl SqliteRepository {
    async fn ensure_group_exists(&self, group_id: GroupId) -> Result<(), CoreError> {
        let exists = sqlx::query("SELECT 1 FROM groups WHERE id = $1")
            .bind(group_id)
            .fetch_optional(self.pool())
            .await?
            .is_some();
        if !exists {
            return Err(CoreError::NotFound(format!("Group with id {} not found", group_id)));
        }
        Ok(())
    }

    async fn ensure_staff_exists(&self, staff_id: StaffId) -> Result<(), CoreError> {
        let exists = sqlx::query("SELECT 1 FROM staff WHERE id = $1")
            .bind(staff_id)
            .fetch_optional(self.pool())
            .await?
            .is_some();
        if !exists {
            return Err(CoreError::NotFound(format!("Staff with id {} not found", staff_id)));
        }
        Ok(())
    }
}
