//! Command handler for the REPL
//!
//! Session commands (`/help`, `/status`, `/save`, ...) are handled here.
//! Anything else is split into words and parsed with the same clap
//! definitions as the command line, so `/diet log ana "Soda can"` and
//! `smilecare diet log ana "Soda can"` mean the same thing.

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use colored::*;
use std::time::Instant;
use tracing::warn;

use crate::cli::Action;
use crate::execution;
use crate::repl::display::DisplayManager;
use crate::repl::session::SessionManager;

/// A REPL input line parsed into an action
#[derive(Parser, Debug)]
#[command(name = "smilecare", no_binary_name = true, disable_version_flag = true)]
struct ReplLine {
    #[command(subcommand)]
    action: Action,
}

/// REPL command types
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    History { limit: Option<usize> },
    Status,
    Save,
    Reset,
    Exit,
    Verbose { enable: bool },
    Clear,
    /// A module operation
    Run(Action),
    /// clap help text for an operation
    Usage { text: String },
    /// Operation with bad arguments
    Invalid { message: String },
    Unknown { input: String },
}

/// Parses and executes REPL commands
pub struct CommandHandler {
    verbose: bool,
}

impl CommandHandler {
    pub fn new() -> Self {
        CommandHandler { verbose: false }
    }

    /// Parse input into a command; the leading `/` is optional
    pub fn parse(&self, input: &str) -> Command {
        let trimmed = input.trim();
        let body = trimmed.strip_prefix('/').unwrap_or(trimmed);

        let words = match split_words(body) {
            Ok(words) => words,
            Err(message) => return Command::Invalid { message },
        };
        let Some(first) = words.first() else {
            return Command::Unknown { input: input.to_string() };
        };

        match first.to_lowercase().as_str() {
            "help" | "h" | "?" if words.len() == 1 => Command::Help,
            "exit" | "quit" | "q" => Command::Exit,
            "history" if words.len() == 1 || words[1].parse::<usize>().is_ok() => {
                Command::History { limit: words.get(1).and_then(|s| s.parse().ok()) }
            }
            "status" => Command::Status,
            "save" => Command::Save,
            "reset" => Command::Reset,
            "verbose" => {
                let enable = words
                    .get(1)
                    .map(|s| matches!(s.to_lowercase().as_str(), "on" | "1" | "true"))
                    .unwrap_or(true);
                Command::Verbose { enable }
            }
            "clear" | "cls" => Command::Clear,
            "analyses" => Command::Run(Action::History),
            _ => match ReplLine::try_parse_from(&words) {
                Ok(line) => Command::Run(line.action),
                Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand) => {
                    Command::Usage { text: e.to_string() }
                }
                Err(e) if e.kind() == ErrorKind::InvalidSubcommand && words.len() == 1 => {
                    Command::Unknown { input: input.to_string() }
                }
                Err(e) => Command::Invalid { message: e.to_string() },
            },
        }
    }

    /// Execute a command; returns false when the REPL should exit
    pub fn execute(
        &mut self,
        command: Command,
        session: &mut SessionManager,
        display: &mut DisplayManager,
    ) -> Result<bool> {
        match command {
            Command::Help => {
                self.show_help();
                Ok(true)
            }
            Command::Exit => {
                println!("{}", "Goodbye! Keep smiling.".green());
                Ok(false)
            }
            Command::History { limit } => {
                self.show_history(session, limit.unwrap_or(10));
                Ok(true)
            }
            Command::Status => {
                self.show_status(session, display);
                Ok(true)
            }
            Command::Save => {
                if session.save()? {
                    println!("{}", format!("Saved to {}", session.store().path().display()).green());
                } else {
                    display.show_info("Nothing to save.");
                }
                Ok(true)
            }
            Command::Reset => {
                session.reset();
                println!("{}", "All reminders, logs and histories cleared.".yellow());
                Ok(true)
            }
            Command::Verbose { enable } => {
                self.verbose = enable;
                let status = if enable { "enabled" } else { "disabled" };
                display.show_info(&format!("Verbose mode {}", status));
                Ok(true)
            }
            Command::Clear => {
                display.clear_screen()?;
                Ok(true)
            }
            Command::Run(action) => {
                self.run(&action, session, display);
                Ok(true)
            }
            Command::Usage { text } => {
                println!("{}", text.trim_end());
                Ok(true)
            }
            Command::Invalid { message } => {
                display.show_error(message.trim_end().trim_start_matches("error: "));
                Ok(true)
            }
            Command::Unknown { input } => {
                println!("{}", format!("Unknown command: {}", input).red());
                println!("Type {} for available commands", "/help".cyan());
                Ok(true)
            }
        }
    }

    /// Run a module operation and print its result; errors are shown, not returned
    fn run(&self, action: &Action, session: &mut SessionManager, display: &mut DisplayManager) {
        let label = describe(action);
        let start = Instant::now();
        let now = session.now();

        if let Action::Analyze { image, check } = action {
            if *check == crate::analyzer::CheckKind::Full {
                display.start_analysis(&image.display().to_string());
            }
        }

        let result = {
            let state = session.state_mut();
            execution::execute(action, state, now, &mut |kind| display.advance(kind))
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(outcome) => {
                display.show_outcome(&outcome);
                if self.verbose {
                    println!("{}", format!("({}ms)", duration_ms).dimmed());
                }
                session.record(&label, true, outcome.changed, duration_ms);
                if outcome.changed && session.config().repl.autosave {
                    if let Err(e) = session.save() {
                        warn!("autosave failed: {:#}", e);
                        display.show_warning(&format!("Could not save state: {}", e));
                    }
                }
            }
            Err(e) => {
                display.show_error(&e.to_string());
                session.record(&label, false, false, duration_ms);
            }
        }
    }

    fn show_help(&self) {
        println!("\n{}", "Session Commands:".bold().cyan());
        println!("{}", "=".repeat(60).cyan());
        let commands = [
            ("/help, /h", "Show this help message"),
            ("/history [n]", "Show last n commands (default: 10)"),
            ("/status", "Show stored records and session statistics"),
            ("/save", "Write state to disk now"),
            ("/reset", "Clear all reminders, logs and histories"),
            ("/verbose [on|off]", "Toggle timing output"),
            ("/clear, /cls", "Clear screen"),
            ("/exit, /quit, /q", "Save and exit"),
        ];
        for (cmd, desc) in commands {
            println!("  {:<22} {}", cmd.green(), desc);
        }

        println!("\n{}", "Assistant Commands:".bold().cyan());
        println!("{}", "=".repeat(60).cyan());
        let actions = [
            ("/remind <sub>", "appointment, medicine, list, upcoming, missed, next-checkup,"),
            ("", "adjust, adherence, reschedule, cleaning, remove, clear"),
            ("/diet <sub>", "suggest, plan, sugar, check, log, history, report, snacks, trend"),
            ("/symptoms check <kind>", "bad-breath, sensitivity, mouth-ulcers, gum-bleeding, jaw-pain,"),
            ("", "oral-infections, plaque-levels, tooth-decay, tongue-health"),
            ("/symptoms history", "Stored checkups"),
            ("/analyze <image>", "Full teeth report, or --check <kind>"),
            ("/analyses", "Teeth analyzer history"),
            ("/quick <image>", "Quick analysis for --name <name> [--age <n>]"),
            ("/patient <sub>", "info, last, alerts, suggestions, search, clear, list"),
        ];
        for (cmd, desc) in actions {
            println!("  {:<22} {}", cmd.green(), desc);
        }

        println!("\n{}", "Usage:".bold());
        println!("  - Quote arguments with spaces: {}", "/diet log ana \"Soda can\"".cyan());
        println!("  - Add {} to any command for its arguments", "--help".cyan());
        println!("  - Press {} or {} to exit", "Ctrl-D".cyan(), "/exit".cyan());
        println!();
    }

    fn show_history(&self, session: &SessionManager, limit: usize) {
        let history = session.get_history(limit);

        if history.is_empty() {
            println!("{}", "No commands in history yet.".yellow());
            return;
        }

        println!("\n{}", format!("Command History (last {}):", history.len()).bold().cyan());
        println!("{}", "=".repeat(60).cyan());

        for (i, record) in history.iter().enumerate() {
            let index = history.len() - i;
            let status_icon = if record.success { "✓".green() } else { "✗".red() };
            print!("  {}. {} {}", index.to_string().cyan(), status_icon, record.command);
            if self.verbose {
                print!(" {}", format!("({}ms)", record.duration_ms).dimmed());
            }
            println!();
        }
        println!();
    }

    fn show_status(&self, session: &SessionManager, display: &DisplayManager) {
        let state = session.state();
        let duration = session.session_duration();
        let duration_str = if duration >= 3600 {
            format!("{}h {}m", duration / 3600, (duration % 3600) / 60)
        } else if duration >= 60 {
            format!("{}m {}s", duration / 60, duration % 60)
        } else {
            format!("{}s", duration)
        };

        display.show_section("Session Status:");
        display.show_field("Reminders", &state.reminders.len().to_string());
        display.show_field("Diet users", &state.diet.users().count().to_string());
        display.show_field("Checkups", &state.symptoms.history().len().to_string());
        display.show_field("Analyses", &state.analyzer.history().len().to_string());
        display.show_field("Patients", &state.patients.len().to_string());
        display.show_field("Commands run", &session.command_count().to_string());
        display.show_field("Session duration", &duration_str);
        display.show_field("Unsaved changes", if session.is_dirty() { "yes" } else { "no" });
        display.show_field("State file", &session.store().path().display().to_string());
        println!();
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn set_verbose(&mut self, enable: bool) {
        self.verbose = enable;
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Short label of an action for `/history`
fn describe(action: &Action) -> String {
    use crate::cli::{DietCommand, PatientCommand, RemindCommand, SymptomsCommand};

    match action {
        Action::Analyze { image, check } => format!("analyze {} ({})", image.display(), check.label()),
        Action::Quick { image, name, .. } => format!("quick {} for {}", image.display(), name),
        Action::History => "analyses".to_string(),
        Action::Patient(cmd) => match cmd {
            PatientCommand::Info { name } => format!("patient info {}", name),
            PatientCommand::Last { name } => format!("patient last {}", name),
            PatientCommand::Alerts { name } => format!("patient alerts {}", name),
            PatientCommand::Suggestions { name } => format!("patient suggestions {}", name),
            PatientCommand::Search { name, keyword } => format!("patient search {} {}", name, keyword),
            PatientCommand::Clear { name } => format!("patient clear {}", name),
            PatientCommand::List => "patient list".to_string(),
        },
        Action::Remind(cmd) => match cmd {
            RemindCommand::Appointment { when } => format!("remind appointment {}", when),
            RemindCommand::Medicine { name, time } => format!("remind medicine {} {}", name, time),
            RemindCommand::Remove { id } => format!("remind remove {}", id),
            other => format!("remind {}", variant_name(other)),
        },
        Action::Diet(cmd) => match cmd {
            DietCommand::Log { user, meal, .. } => format!("diet log {} {}", user, meal),
            other => format!("diet {}", variant_name(other)),
        },
        Action::Symptoms(cmd) => match cmd {
            SymptomsCommand::Check { kind, .. } => format!("symptoms check {}", kind.title()),
            SymptomsCommand::History => "symptoms history".to_string(),
        },
    }
}

/// Lowercase variant name from the Debug form, e.g. `NextCheckup { .. }` -> `nextcheckup`
fn variant_name(value: &impl std::fmt::Debug) -> String {
    let debug = format!("{:?}", value);
    debug
        .split(|c: char| !c.is_alphanumeric())
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Split a line into words, honoring single and double quotes
pub fn split_words(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err("Unterminated quote".to_string());
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
