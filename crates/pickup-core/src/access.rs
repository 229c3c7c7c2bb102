//! Who may see and change which student's pickup data.
//!
//! Two checks exist:
//!
//! - [`filter_authorized_student_ids`] narrows a bulk request to the students
//!   the caller may see. It is a pure filter and never fails on missing ids.
//! - [`require_full_access`] guards every mutation and every single-student
//!   read. It fails with `NotFound` for unknown students and `Forbidden`
//!   otherwise, in that order.
//!
//! Administrators see everything. Everybody else sees exactly the students
//! currently in the groups they supervise. Other permission scopes, read-only
//! ones included, grant nothing extra.

use crate::error::CoreError;
use crate::models::{GroupId, StaffId, Student, StudentId};
use crate::repository::RosterRepository;
use async_trait::async_trait;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Permission scope that unlocks every student.
pub const ADMIN_SCOPE: &str = "pickup:admin";

/// The authenticated staff member behind a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    pub staff_id: StaffId,
    pub permissions: Vec<String>,
    pub supervised_group_ids: Vec<GroupId>,
}

impl Caller {
    pub fn has_permission(&self, scope: &str) -> bool {
        self.permissions.iter().any(|p| p == scope)
    }

    pub fn is_admin(&self) -> bool {
        self.has_permission(ADMIN_SCOPE)
    }

    pub fn supervises(&self, group_id: GroupId) -> bool {
        self.supervised_group_ids.contains(&group_id)
    }
}

/// Resolves a caller from the authenticated principal (a staff login).
#[async_trait]
pub trait IdentityProvider {
    async fn resolve_caller(&self, principal: &str) -> Result<Caller, CoreError>;
}

/// Returns the subset of `requested` the caller may act on, in request order.
pub async fn filter_authorized_student_ids<R>(
    repo: &R,
    caller: &Caller,
    requested: &[StudentId],
) -> Result<Vec<StudentId>, CoreError>
where
    R: RosterRepository + Sync + ?Sized,
{
    if caller.is_admin() {
        return Ok(requested.to_vec());
    }

    if caller.supervised_group_ids.is_empty() {
        debug!(staff_id = caller.staff_id, "caller supervises no groups");
        return Ok(Vec::new());
    }

    let members: HashSet<StudentId> = repo
        .find_students_by_group_ids(&caller.supervised_group_ids)
        .await?
        .into_iter()
        .collect();

    Ok(retain_members(requested, &members))
}

/// Order preserving intersection.
pub(crate) fn retain_members(requested: &[StudentId], members: &HashSet<StudentId>) -> Vec<StudentId> {
    requested
        .iter()
        .copied()
        .filter(|id| members.contains(id))
        .collect()
}

/// Admin, or supervisor of the group the student currently belongs to.
pub fn has_full_access(caller: &Caller, student: &Student) -> bool {
    caller.is_admin() || student.group_id.is_some_and(|g| caller.supervises(g))
}

/// Loads the student and checks full access. Existence is checked first.
pub async fn require_full_access<R>(
    repo: &R,
    caller: &Caller,
    student_id: StudentId,
) -> Result<Student, CoreError>
where
    R: RosterRepository + Sync + ?Sized,
{
    let student = repo
        .find_student_by_id(student_id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Student with id {} not found", student_id)))?;

    if !has_full_access(caller, &student) {
        warn!(staff_id = caller.staff_id, student_id, "full access denied");
        return Err(CoreError::Forbidden(format!(
            "no full access to student {}",
            student_id
        )));
    }
    Ok(student)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn caller(permissions: &[&str], groups: &[GroupId]) -> Caller {
        Caller {
            staff_id: 7,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            supervised_group_ids: groups.to_vec(),
        }
    }

    fn student(group_id: Option<GroupId>) -> Student {
        Student {
            id: 1,
            name: "Ada".to_string(),
            group_id,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_full_access_rules() {
        assert!(has_full_access(&caller(&[ADMIN_SCOPE], &[]), &student(Some(3))));
        assert!(has_full_access(&caller(&[ADMIN_SCOPE], &[]), &student(None)));
        assert!(has_full_access(&caller(&[], &[3]), &student(Some(3))));
        assert!(!has_full_access(&caller(&[], &[4]), &student(Some(3))));
        assert!(!has_full_access(&caller(&[], &[3]), &student(None)));
        // read scope alone is not enough
        assert!(!has_full_access(&caller(&["pickup:read"], &[]), &student(Some(3))));
    }

    #[test]
    fn test_retain_members_keeps_request_order() {
        let members: HashSet<StudentId> = [5, 1, 9].into_iter().collect();
        assert_eq!(retain_members(&[9, 2, 1, 5, 3], &members), vec![9, 1, 5]);
        assert!(retain_members(&[], &members).is_empty());
    }

    proptest! {
        #[test]
        fn prop_retain_members_is_idempotent_and_ordered(
            requested in proptest::collection::vec(0i64..50, 0..40),
            members in proptest::collection::hash_set(0i64..50, 0..25),
        ) {
            let once = retain_members(&requested, &members);
            let twice = retain_members(&once, &members);
            prop_assert_eq!(&once, &twice);
            prop_assert!(once.iter().all(|id| members.contains(id)));

            // `once` is a subsequence of `requested`
            let mut it = requested.iter();
            prop_assert!(once.iter().all(|id| it.any(|r| r == id)));
        }
    }
}
