use anyhow::Result;
use dialoguer::Confirm;
use pickup_core::access::Caller;
use pickup_core::models::{ExceptionRequest, ExceptionUpdateRequest, PickupException};
use pickup_core::repository::Repository;
use pickup_core::service;

use super::Invocation;
use crate::cli::{ExceptionAddCommand, ExceptionCommand, ExceptionEditCommand};
use crate::config::OutputFormat;
use crate::parser::parse_id;
use crate::util::resolve_caller;
use crate::views::{self, table};

pub async fn exception_command(
    repo: &impl Repository,
    invocation: &Invocation,
    command: ExceptionCommand,
) -> Result<()> {
    let caller = resolve_caller(repo, invocation.principal()).await?;

    match command {
        ExceptionCommand::Add(command) => add_exception(repo, &caller, invocation, command).await,
        ExceptionCommand::Edit(command) => {
            let id = parse_id(&command.id)?;
            let request = update_request(&command);
            let exception =
                service::update_exception(repo, &caller, command.student, id, &request).await?;
            show(invocation, &exception, "Updated exception")
        }
        ExceptionCommand::Rm { student, id, force } => {
            let id = parse_id(&id)?;
            if !force {
                let confirmation = Confirm::new()
                    .with_prompt(format!("Delete exception {}?", id))
                    .default(false)
                    .interact()
                    .unwrap_or(false);
                if !confirmation {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            service::delete_exception(repo, &caller, student, id).await?;
            println!("Deleted exception {}", id);
            Ok(())
        }
    }
}

async fn add_exception(
    repo: &impl Repository,
    caller: &Caller,
    invocation: &Invocation,
    command: ExceptionAddCommand,
) -> Result<()> {
    let request = ExceptionRequest {
        exception_date: command.date,
        pickup_time: command.time,
        reason: command.reason,
    };

    match command.note {
        Some(note) => {
            let (exception, note) =
                service::create_exception_with_note(repo, caller, command.student, &request, &note)
                    .await?;
            show(invocation, &exception, "Added exception")?;
            if invocation.output == OutputFormat::Table {
                println!("Added day note {}", note.id);
            }
            Ok(())
        }
        None => {
            let exception = service::create_exception(repo, caller, command.student, &request).await?;
            show(invocation, &exception, "Added exception")
        }
    }
}

fn update_request(command: &ExceptionEditCommand) -> ExceptionUpdateRequest {
    let pickup_time = if command.no_pickup {
        Some(None)
    } else {
        command.time.clone().map(Some)
    };
    let reason = if command.reason_clear {
        Some(None)
    } else {
        command.reason.clone().map(Some)
    };

    ExceptionUpdateRequest {
        exception_date: command.date.clone(),
        pickup_time,
        reason,
    }
}

fn show(invocation: &Invocation, exception: &PickupException, headline: &str) -> Result<()> {
    views::emit(invocation.output, exception, |e| {
        println!("{} {}", headline, e.id);
        table::display_exceptions(std::slice::from_ref(e));
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(args: impl FnOnce(&mut ExceptionEditCommand)) -> ExceptionEditCommand {
        let mut command = ExceptionEditCommand {
            student: 1,
            id: String::new(),
            date: None,
            time: None,
            no_pickup: false,
            reason: None,
            reason_clear: false,
        };
        args(&mut command);
        command
    }

    #[test]
    fn test_update_request_keeps_omitted_fields() {
        let request = update_request(&edit(|_| {}));
        assert_eq!(request.exception_date, None);
        assert_eq!(request.pickup_time, None);
        assert_eq!(request.reason, None);
    }

    #[test]
    fn test_update_request_no_pickup_and_clear_reason() {
        let request = update_request(&edit(|c| {
            c.no_pickup = true;
            c.reason_clear = true;
        }));
        assert_eq!(request.pickup_time, Some(None));
        assert_eq!(request.reason, Some(None));
    }

    #[test]
    fn test_update_request_sets_values() {
        let request = update_request(&edit(|c| {
            c.time = Some("12:00".to_string());
            c.reason = Some("Dentist".to_string());
        }));
        assert_eq!(request.pickup_time, Some(Some("12:00".to_string())));
        assert_eq!(request.reason, Some(Some("Dentist".to_string())));
    }
}
