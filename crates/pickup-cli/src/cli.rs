use crate::config::OutputFormat;
use clap::{Args, Parser, Subcommand};

/// Manage student pickup schedules, exceptions and day notes
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Staff login to act as (overrides `principal` from the config)
    #[arg(long = "as", global = true)]
    pub principal: Option<String>,

    /// Output format (overrides `output` from the config)
    #[arg(long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Weekly pickup schedules
    #[command(subcommand)]
    Schedule(ScheduleCommand),
    /// Date specific exceptions
    #[command(subcommand)]
    Exception(ExceptionCommand),
    /// Free text day notes
    #[command(subcommand)]
    Note(NoteCommand),
    /// Resolve effective pickup times for many students on one date
    Resolve(ResolveCommand),
    /// Effective pickup time of one student
    Effective(EffectiveCommand),
    /// Groups, students, staff and supervision
    #[command(subcommand)]
    Roster(RosterCommand),
}

#[derive(Subcommand, Debug, Clone)]
pub enum ScheduleCommand {
    /// Show schedule, exceptions and notes of a student
    Show {
        student: i64,
        /// Only exceptions and notes on or after this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
    },
    /// Replace the weekly schedule of a student
    Set {
        student: i64,
        /// WEEKDAY=HH:MM[=NOTE], weekday as 1-5 or mon-fri. Repeat per day.
        #[arg(long = "day", required = true)]
        days: Vec<String>,
    },
    /// Remove the weekly schedule of a student
    Clear {
        student: i64,
        /// Do not ask for confirmation
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ExceptionCommand {
    /// Add an exception. Without --time the student is not picked up that day.
    Add(ExceptionAddCommand),
    /// Change an exception; omitted options keep their value
    Edit(ExceptionEditCommand),
    /// Delete an exception
    Rm {
        student: i64,
        id: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ExceptionAddCommand {
    pub student: i64,
    /// Date of the exception (YYYY-MM-DD)
    #[arg(long)]
    pub date: String,
    /// Pickup time (HH:MM)
    #[arg(long)]
    pub time: Option<String>,
    #[arg(long)]
    pub reason: Option<String>,
    /// Also add a day note on the same date
    #[arg(long)]
    pub note: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ExceptionEditCommand {
    pub student: i64,
    pub id: String,
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub time: Option<String>,
    /// Turn the exception into "no pickup"
    #[arg(long, conflicts_with = "time")]
    pub no_pickup: bool,
    #[arg(long)]
    pub reason: Option<String>,
    #[arg(long, conflicts_with = "reason")]
    pub reason_clear: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum NoteCommand {
    /// Add a day note
    Add {
        student: i64,
        /// Date of the note (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        content: String,
    },
    /// Change a day note; omitted options keep their value
    Edit {
        student: i64,
        id: String,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete a day note
    Rm {
        student: i64,
        id: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ResolveCommand {
    /// Comma separated student ids
    #[arg(long, value_delimiter = ',', required = true)]
    pub students: Vec<i64>,
    /// Target date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct EffectiveCommand {
    pub student: i64,
    /// Target date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum RosterCommand {
    /// Create a group
    GroupAdd { name: String },
    /// List groups
    Groups,
    /// Create a student
    StudentAdd {
        name: String,
        #[arg(long)]
        group: Option<i64>,
    },
    /// Move a student to another group (no --group removes the group)
    StudentMove {
        student: i64,
        #[arg(long)]
        group: Option<i64>,
    },
    /// Create a staff member
    StaffAdd { login: String, display_name: String },
    /// Grant a permission scope, e.g. pickup:admin
    Grant { login: String, scope: String },
    /// Make a staff member supervisor of a group
    Supervise { group: i64, login: String },
}
