//! Command-line argument parsing for SmileCare
//!
//! Provides clap-based CLI with subcommands and verbosity control. The
//! [`Action`] subcommands are shared with the REPL, which parses each input
//! line with the same definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::analyzer::CheckKind;
use crate::symptoms::CheckupKind;

/// SmileCare - dental wellness assistant for the terminal
#[derive(Parser, Debug)]
#[command(name = "smilecare")]
#[command(version)]
#[command(about = "Reminders, diet advice, symptom checks and teeth image heuristics", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// State directory (overrides the configured one)
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (only errors are logged)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand; the REPL starts when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start interactive REPL mode
    Start,

    /// Display current configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        init: bool,
    },

    /// Delete stored reminders, logs and histories
    Reset,

    #[command(flatten)]
    Action(Action),
}

/// Operations available from both the command line and the REPL
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Action {
    /// Run image heuristics on a teeth photo
    Analyze {
        /// Image file (JPEG or PNG)
        image: PathBuf,

        /// Single check to run
        #[arg(long, value_enum, default_value = "full")]
        check: CheckKind,
    },

    /// Quick brightness analysis stored in a patient's history
    Quick {
        /// Image file (JPEG or PNG)
        image: PathBuf,
        /// Patient name
        #[arg(long)]
        name: String,
        /// Patient age, stored on first use or updated
        #[arg(long)]
        age: Option<u32>,
    },

    /// Show the teeth analyzer history
    History,

    /// Patient records with quick brightness analysis
    #[command(subcommand)]
    Patient(PatientCommand),

    /// Appointment and medicine reminders
    #[command(subcommand)]
    Remind(RemindCommand),

    /// Tooth-friendly diet advice
    #[command(subcommand)]
    Diet(DietCommand),

    /// Oral symptom checklist
    #[command(subcommand)]
    Symptoms(SymptomsCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum PatientCommand {
    /// Name, age and history size
    Info { name: String },
    /// Latest analysis
    Last { name: String },
    /// Whitening and cavity alerts from past analyses
    Alerts { name: String },
    /// Every stored report
    Suggestions { name: String },
    /// Search reports for a keyword
    Search { name: String, keyword: String },
    /// Clear the patient's analysis history
    Clear { name: String },
    /// List known patients
    List,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum RemindCommand {
    /// Schedule a dental appointment ("YYYY-MM-DD HH:MM")
    Appointment { when: String },
    /// Add a daily medicine reminder
    Medicine { name: String, time: String },
    /// List all reminders
    List,
    /// Appointments still ahead
    Upcoming,
    /// Appointments already past
    Missed,
    /// Suggest the next checkup after the last one ("YYYY-MM-DD")
    NextCheckup { last: String },
    /// Suggest a new dose time after a late dose
    Adjust { name: String, last_taken: String },
    /// Judge adherence from doses missed in the past week
    Adherence { missed: String },
    /// Move a missed appointment ("YYYY-MM-DD") forward
    Reschedule { date: String },
    /// Professional cleaning recommendation
    Cleaning,
    /// Remove a reminder by id
    Remove { id: String },
    /// Clear all reminders
    Clear,
    /// Print reminders as they fall due until interrupted
    Watch {
        /// Polling interval in seconds
        #[arg(long)]
        interval: Option<u64>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum DietCommand {
    /// Foods for a concern (strong_teeth, cavity_protection, gum_health, avoid, ...)
    Suggest { concern: String },
    /// Plan from age and issues (cavities, gum_issues)
    Plan { age: u32, issues: Vec<String> },
    /// Risk band for daily sugar intake in grams
    Sugar { grams: f64 },
    /// Flag foods that should be reduced
    Check {
        #[arg(required = true)]
        foods: Vec<String>,
    },
    /// Log a meal for a user
    Log {
        user: String,
        meal: String,
        /// Meal date ("YYYY-MM-DD"), today by default
        #[arg(long)]
        date: Option<String>,
    },
    /// Logged meals of a user
    History { user: String },
    /// Healthy-meal score over the last week
    Report { user: String },
    /// Tooth-friendly snacks
    Snacks,
    /// Outlook from the meal log
    Trend { user: String },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum SymptomsCommand {
    /// Run one checklist item
    Check {
        #[arg(value_enum)]
        kind: CheckupKind,
        /// Reported symptoms or feedback
        symptoms: Vec<String>,
        /// Photo for plaque, decay and tongue checks
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Stored checkups
    History,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Parse the configured default verbosity
    pub fn from_config(value: &str) -> Self {
        match value {
            "quiet" => Verbosity::Quiet,
            "verbose" => Verbosity::Verbose,
            "very_verbose" => Verbosity::VeryVerbose,
            _ => Verbosity::Normal,
        }
    }

    /// Log filter used when RUST_LOG is unset
    pub fn log_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "info",
            Verbosity::VeryVerbose => "debug",
        }
    }

    /// Check if should show progress bars
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }
}
