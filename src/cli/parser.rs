use crate::core::report::ReportDimension;
use crate::export::ExportFormat;
use clap::{Parser, Subcommand};

/// Command-line interface definition for rworklog
/// Work tracking CLI: organizations, projects, tasks, timers and time entries
#[derive(Parser)]
#[command(
    name = "rworklog",
    version = env!("CARGO_PKG_VERSION"),
    about = "Track work: projects, tasks, running timers and time entries stored in SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Override the timer registry file
    #[arg(global = true, long = "timers")]
    pub timers: Option<String>,

    /// Session user recorded on submitted time entries
    #[arg(global = true, long = "user")]
    pub user: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Manage organizations
    Org {
        #[command(subcommand)]
        action: OrgAction,
    },

    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage projects
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Manage tasks
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Comment on tasks
    Comment {
        #[command(subcommand)]
        action: CommentAction,
    },

    /// Start, pause and submit local timers
    Timer {
        #[command(subcommand)]
        action: TimerAction,
    },

    /// Manage recorded time entries
    Entry {
        #[command(subcommand)]
        action: EntryAction,
    },

    /// Tracked time totals
    Report {
        #[arg(long = "by", value_enum, default_value = "project")]
        by: ReportDimension,

        #[arg(
            long,
            value_name = "RANGE",
            help = "Restrict to a year/month/day or a custom range"
        )]
        range: Option<String>,
    },

    /// Export time entries
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(
            long,
            value_name = "RANGE",
            help = "Filter export by year/month/day or a custom range"
        )]
        range: Option<String>,

        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum OrgAction {
    /// Create an organization
    Add {
        name: String,

        #[arg(long)]
        id: Option<String>,
    },
    /// List organizations
    List,
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Create a user
    Add {
        name: String,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        id: Option<String>,
    },
    /// List users
    List,
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a project
    Add {
        name: String,

        #[arg(long = "org", help = "Owning organization id")]
        organization: Option<String>,

        #[arg(long)]
        id: Option<String>,
    },
    /// List projects with their organization
    List {
        #[arg(long = "org", help = "Only projects of this organization")]
        organization: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a task
    Add {
        name: String,

        #[arg(long)]
        project: Option<String>,

        #[arg(long, help = "Assigned user id")]
        assignee: Option<String>,

        #[arg(long)]
        id: Option<String>,
    },
    /// List tasks with project, assignee and tracked time
    List {
        #[arg(long)]
        project: Option<String>,
    },
    /// Mark a task as done
    Done { id: String },
    /// Delete a task
    Del { id: String },
}

#[derive(Subcommand)]
pub enum CommentAction {
    /// Add a comment to a task
    Add { task: String, body: String },
    /// List the comments of a task
    List { task: String },
}

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a timer, or resume the one already tracking the task
    Start {
        #[arg(long)]
        task: Option<String>,

        #[arg(long)]
        project: Option<String>,

        #[arg(long, default_value = "")]
        summary: String,

        #[arg(long, help = "Explicit timer key (random when omitted)")]
        key: Option<String>,
    },
    /// Pause a running timer or resume a paused one
    Toggle { key: String },
    /// Change the fields of a timer
    Update {
        key: String,

        #[arg(long)]
        summary: Option<String>,

        #[arg(long)]
        task: Option<String>,

        #[arg(long)]
        project: Option<String>,

        #[arg(
            long,
            value_name = "DURATION",
            help = "Set the elapsed time (HH:MM:SS, HH:MM, 1h30m, 90m, 45s or seconds)"
        )]
        elapsed: Option<String>,

        #[arg(long, help = "Stop without banking the running interval")]
        stop: bool,
    },
    /// Discard a timer
    Rm { key: String },
    /// Turn a timer into a time entry
    Submit { key: String },
    /// List timers
    List,
}

#[derive(Subcommand)]
pub enum EntryAction {
    /// Record a time entry
    Add {
        #[arg(long)]
        project: String,

        #[arg(long, value_name = "DURATION")]
        duration: String,

        #[arg(long)]
        task: Option<String>,

        #[arg(long, default_value = "")]
        summary: String,

        #[arg(long, value_name = "YYYY-MM-DD", help = "Defaults to today")]
        date: Option<String>,

        #[arg(long)]
        id: Option<String>,
    },
    /// List time entries
    List {
        #[arg(long, value_name = "RANGE")]
        range: Option<String>,

        #[arg(long)]
        project: Option<String>,
    },
    /// Delete a time entry
    Del { id: String },
}
