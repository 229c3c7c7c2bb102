use anyhow::Result;
use dialoguer::Confirm;
use pickup_core::models::{DayNote, NoteRequest, NoteUpdateRequest};
use pickup_core::repository::Repository;
use pickup_core::service;

use super::Invocation;
use crate::cli::NoteCommand;
use crate::parser::parse_id;
use crate::util::resolve_caller;
use crate::views::{self, table};

pub async fn note_command(
    repo: &impl Repository,
    invocation: &Invocation,
    command: NoteCommand,
) -> Result<()> {
    let caller = resolve_caller(repo, invocation.principal()).await?;

    match command {
        NoteCommand::Add {
            student,
            date,
            content,
        } => {
            let request = NoteRequest {
                note_date: date,
                content,
            };
            let note = service::create_note(repo, &caller, student, &request).await?;
            show(invocation, &note, "Added day note")?;
        }
        NoteCommand::Edit {
            student,
            id,
            date,
            content,
        } => {
            let id = parse_id(&id)?;
            let request = NoteUpdateRequest {
                note_date: date,
                content,
            };
            let note = service::update_note(repo, &caller, student, id, &request).await?;
            show(invocation, &note, "Updated day note")?;
        }
        NoteCommand::Rm { student, id, force } => {
            let id = parse_id(&id)?;
            if !force {
                let confirmation = Confirm::new()
                    .with_prompt(format!("Delete day note {}?", id))
                    .default(false)
                    .interact()
                    .unwrap_or(false);
                if !confirmation {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            service::delete_note(repo, &caller, student, id).await?;
            println!("Deleted day note {}", id);
        }
    }

    Ok(())
}

fn show(invocation: &Invocation, note: &DayNote, headline: &str) -> Result<()> {
    views::emit(invocation.output, note, |n| {
        println!("{} {}", headline, n.id);
        table::display_notes(std::slice::from_ref(n));
    })
}
