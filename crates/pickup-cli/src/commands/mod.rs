use crate::config::OutputFormat;

pub mod exception;
pub mod note;
pub mod resolve;
pub mod roster;
pub mod schedule;

/// Settings shared by every pickup command.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub principal: Option<String>,
    pub output: OutputFormat,
}

impl Invocation {
    pub fn principal(&self) -> Option<&str> {
        self.principal.as_deref()
    }
}
