use anyhow::Result;
use pickup_core::repository::{Repository, RosterRepository};
use tracing::info;

use super::Invocation;
use crate::cli::RosterCommand;
use crate::util::find_staff;
use crate::views::{self, table};

/// Local operator tooling. Runs without a principal.
pub async fn roster_command(
    repo: &impl Repository,
    invocation: &Invocation,
    command: RosterCommand,
) -> Result<()> {
    match command {
        RosterCommand::GroupAdd { name } => {
            let group = repo.add_group(&name).await?;
            println!("Created group '{}' with id {}", group.name, group.id);
        }
        RosterCommand::Groups => {
            let groups = repo.find_groups().await?;
            views::emit(invocation.output, groups.as_slice(), table::display_groups)?;
        }
        RosterCommand::StudentAdd { name, group } => {
            let student = repo.add_student(&name, group).await?;
            println!("Created student '{}' with id {}", student.name, student.id);
        }
        RosterCommand::StudentMove { student, group } => {
            let student = repo.move_student(student, group).await?;
            match student.group_id {
                Some(group_id) => println!("Moved student {} to group {}", student.id, group_id),
                None => println!("Removed student {} from its group", student.id),
            }
        }
        RosterCommand::StaffAdd {
            login,
            display_name,
        } => {
            let staff = repo.add_staff(&login, &display_name).await?;
            println!("Created staff member '{}' with id {}", staff.login, staff.id);
        }
        RosterCommand::Grant { login, scope } => {
            let staff = find_staff(repo, &login).await?;
            repo.grant_permission(staff.id, &scope).await?;
            info!(staff_id = staff.id, %scope, "permission granted");
            println!("Granted '{}' to {}", scope, staff.login);
        }
        RosterCommand::Supervise { group, login } => {
            let staff = find_staff(repo, &login).await?;
            repo.assign_supervisor(group, staff.id).await?;
            info!(staff_id = staff.id, group_id = group, "supervisor assigned");
            println!("{} now supervises group {}", staff.login, group);
        }
    }

    Ok(())
}
