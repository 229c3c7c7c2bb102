use anyhow::Result;
use serde::Serialize;

use crate::config::OutputFormat;

pub mod table;

/// Prints `value` as pretty JSON or through the given table renderer.
pub fn emit<T>(format: OutputFormat, value: &T, render_table: impl FnOnce(&T)) -> Result<()>
where
    T: Serialize + ?Sized,
{
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_table(value),
    }
    Ok(())
}
