use clap::Parser;
use owo_colors::{OwoColorize, Style};
use pickup_core::db;
use pickup_core::error::{CoreError, ErrorKind};
use pickup_core::repository::SqliteRepository;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use crate::commands::Invocation;
use crate::parser::ArgParseError;

mod cli;
mod commands;
mod config;
mod parser;
mod util;
mod views;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    let config = match config::Config::new() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} Invalid configuration: {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };
    init_tracing(&config.log_level);
    debug!(database = %config.database_path, "configuration loaded");

    let db_pool = match db::establish_connection(&config.database_path).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };
    let repository = SqliteRepository::new(db_pool);

    let invocation = Invocation {
        principal: cli.principal.or(config.principal),
        output: cli.output.unwrap_or(config.output),
    };

    let result = match cli.command {
        cli::Commands::Schedule(command) => {
            commands::schedule::schedule_command(&repository, &invocation, command).await
        }
        cli::Commands::Exception(command) => {
            commands::exception::exception_command(&repository, &invocation, command).await
        }
        cli::Commands::Note(command) => {
            commands::note::note_command(&repository, &invocation, command).await
        }
        cli::Commands::Resolve(command) => {
            commands::resolve::resolve_students(&repository, &invocation, command).await
        }
        cli::Commands::Effective(command) => {
            commands::resolve::effective_for_student(&repository, &invocation, command).await
        }
        cli::Commands::Roster(command) => {
            commands::roster::roster_command(&repository, &invocation, command).await
        }
    };

    if let Err(e) = result {
        std::process::exit(handle_error(e));
    }
}

/// `RUST_LOG` wins over the configured level. Logs go to stderr so JSON
/// output on stdout stays clean.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Prints the error and returns the process exit code.
fn handle_error(err: anyhow::Error) -> i32 {
    let error_style = Style::new().red().bold();

    if let Some(core_error) = err.downcast_ref::<CoreError>() {
        let kind = core_error.kind();
        match kind {
            ErrorKind::Forbidden => {
                eprintln!("{} {}", "Error:".style(error_style), core_error.public_message().yellow());
            }
            ErrorKind::Internal => {
                error!(error = %core_error, "command failed");
                eprintln!("{} {}", "Error:".style(error_style), core_error.public_message());
            }
            ErrorKind::Validation | ErrorKind::NotFound => {
                eprintln!("{} {}", "Error:".style(error_style), core_error.public_message());
            }
        }
        return exit_code(kind);
    }

    if let Some(parse_error) = err.downcast_ref::<ArgParseError>() {
        eprintln!("{} Invalid input: {}", "Error:".style(error_style), parse_error);
        return 2;
    }

    eprintln!("{} {}", "Error:".style(error_style), err);
    1
}

fn exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Validation => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::Forbidden => 4,
        ErrorKind::Internal => 1,
    }
}
