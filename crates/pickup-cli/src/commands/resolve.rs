use anyhow::Result;
use pickup_core::repository::Repository;
use pickup_core::service;

use super::Invocation;
use crate::cli::{EffectiveCommand, ResolveCommand};
use crate::util::resolve_caller;
use crate::views::{self, table};

pub async fn resolve_students(
    repo: &impl Repository,
    invocation: &Invocation,
    command: ResolveCommand,
) -> Result<()> {
    let caller = resolve_caller(repo, invocation.principal()).await?;
    let entries = service::bulk_effective_pickup_times(
        repo,
        &caller,
        &command.students,
        command.date.as_deref(),
    )
    .await?;

    views::emit(invocation.output, entries.as_slice(), table::display_effective_times)
}

pub async fn effective_for_student(
    repo: &impl Repository,
    invocation: &Invocation,
    command: EffectiveCommand,
) -> Result<()> {
    let caller = resolve_caller(repo, invocation.principal()).await?;
    let entry =
        service::effective_pickup_time(repo, &caller, command.student, command.date.as_deref())
            .await?;

    views::emit(invocation.output, &entry, |e| {
        table::display_effective_times(std::slice::from_ref(e))
    })
}
