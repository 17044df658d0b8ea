//! CLI argument parsing for todocal.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "todocal",
    about = "A todo list with list and month-calendar views",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/todocal/logs/todocal.log"
)]
pub struct Cli {
    /// Directory holding the .todocal store (default: config data_dir, then current directory)
    #[arg(short = 'd', long, global = true)]
    pub dir: Option<PathBuf>,

    /// Config file (default: ~/.config/todocal/todocal.yml)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Label language (en, ko); overrides the config file
    #[arg(short = 'L', long, global = true)]
    pub locale: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Add a task
    Add {
        /// What needs doing
        text: String,

        /// Due date as YYYY-MM-DD (default: today)
        #[arg(short = 'D', long)]
        date: Option<String>,
    },

    /// List all tasks by due date
    List,

    /// Show tasks due on one day
    Day {
        /// Date as YYYY-MM-DD
        date: String,
    },

    /// Toggle a task between done and pending
    Done {
        /// Task ID
        id: u64,
    },

    /// Replace a task's text
    Edit {
        /// Task ID
        id: u64,

        /// New text
        text: String,
    },

    /// Delete a task
    Rm {
        /// Task ID
        id: u64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show a month calendar
    Calendar {
        /// Month as YYYY-MM (default: current month)
        #[arg(short, long)]
        month: Option<String>,

        /// Months to move from the chosen month (e.g. -1 for previous)
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        offset: i32,
    },

    /// Write a plain-text report of all tasks
    Export {
        /// Directory to write the report into (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show completion counts
    Stats,
}
