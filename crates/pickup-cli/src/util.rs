use anyhow::{anyhow, Result};
use pickup_core::access::{Caller, IdentityProvider};
use pickup_core::error::CoreError;
use pickup_core::models::Staff;
use pickup_core::repository::{Repository, RosterRepository};

/// Resolves the acting staff member. The principal comes from `--as` or the
/// config and is required for every pickup command.
pub async fn resolve_caller(repo: &impl Repository, principal: Option<&str>) -> Result<Caller> {
    let login = principal
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| anyhow!("No principal given. Pass --as <login> or set PICKUP_PRINCIPAL."))?;
    Ok(repo.resolve_caller(login).await?)
}

pub async fn find_staff(repo: &impl Repository, login: &str) -> Result<Staff> {
    repo.find_staff_by_login(login)
        .await?
        .ok_or_else(|| anyhow!(CoreError::NotFound(format!("Staff member '{}' not found", login))))
}
