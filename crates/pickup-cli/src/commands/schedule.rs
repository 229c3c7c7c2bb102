use anyhow::Result;
use dialoguer::Confirm;
use pickup_core::models::ScheduleEntryRequest;
use pickup_core::repository::Repository;
use pickup_core::{service, timefmt};

use super::Invocation;
use crate::cli::ScheduleCommand;
use crate::parser::parse_day_entry;
use crate::util::resolve_caller;
use crate::views::{self, table};

pub async fn schedule_command(
    repo: &impl Repository,
    invocation: &Invocation,
    command: ScheduleCommand,
) -> Result<()> {
    let caller = resolve_caller(repo, invocation.principal()).await?;

    match command {
        ScheduleCommand::Show { student, from } => {
            let from = from.as_deref().map(timefmt::parse_date).transpose()?;
            let data = service::get_student_pickup_data(repo, &caller, student, from).await?;
            views::emit(invocation.output, &data, table::display_pickup_data)?;
        }
        ScheduleCommand::Set { student, days } => {
            let entries = days
                .iter()
                .map(|d| parse_day_entry(d))
                .collect::<Result<Vec<ScheduleEntryRequest>, _>>()?;
            let data = service::upsert_weekly_schedule(repo, &caller, student, &entries).await?;
            views::emit(invocation.output, &data.schedules, |s| {
                println!("Saved weekly schedule for student {}", student);
                table::display_schedules(s);
            })?;
        }
        ScheduleCommand::Clear { student, force } => {
            if !force {
                let confirmation = Confirm::new()
                    .with_prompt(format!(
                        "Remove the whole weekly schedule of student {}?",
                        student
                    ))
                    .default(false)
                    .interact()
                    .unwrap_or(false);

                if !confirmation {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            let removed = service::clear_weekly_schedule(repo, &caller, student).await?;
            println!("Removed {} weekday(s) from student {}", removed, student);
        }
    }

    Ok(())
}
