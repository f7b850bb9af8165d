//! Display manager for terminal output
//!
//! Formats command results, the full-report progress bar and status panels.
//! Used by the REPL and by one-shot CLI commands.

use colored::*;
use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::time::Duration;

use crate::analyzer::CheckKind;
use crate::execution::Outcome;

/// Terminal UI helper
pub struct DisplayManager {
    current_bar: Option<ProgressBar>,
    show_progress: bool,
    update_interval: Duration,
}

impl DisplayManager {
    pub fn new() -> Self {
        DisplayManager {
            current_bar: None,
            show_progress: true,
            update_interval: Duration::from_millis(100),
        }
    }

    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    pub fn show_banner(&self, version: &str) {
        let width = 64;
        println!("\n{}", "=".repeat(width).cyan());
        println!("{}", format!("  SmileCare {} - Dental Wellness Assistant", version).bold().cyan());
        println!("{}", "  Reminders | Diet | Symptoms | Teeth Analysis".dimmed());
        println!("{}\n", "=".repeat(width).cyan());
        println!("Type a command (or {} for commands, {} to quit)\n",
            "/help".green(), "/exit".green());
    }

    /// Progress bar across the checks of a full report
    pub fn start_analysis(&mut self, image: &str) -> Option<ProgressBar> {
        self.finish_current();
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new(CheckKind::REPORT.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} Analyzing [{bar:30.cyan/blue}] {pos}/{len} | {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        pb.set_style(style);
        pb.set_message(image.to_string());
        pb.enable_steady_tick(self.update_interval);

        self.current_bar = Some(pb.clone());
        Some(pb)
    }

    /// Advance the analysis bar to `kind`
    pub fn advance(&self, kind: CheckKind) {
        if let Some(pb) = &self.current_bar {
            pb.set_message(kind.label());
            pb.inc(1);
        }
    }

    pub fn finish_current(&mut self) {
        if let Some(pb) = self.current_bar.take() {
            pb.finish_and_clear();
        }
    }

    pub fn has_progress(&self) -> bool {
        self.current_bar.is_some()
    }

    /// Print the lines of a command result
    pub fn show_outcome(&mut self, outcome: &Outcome) {
        self.finish_current();
        let mut lines = outcome.lines.iter();
        if let Some(first) = lines.next() {
            if first.ends_with(':') {
                println!("{}", first.bold().cyan());
            } else {
                println!("{}", first);
            }
        }
        for line in lines {
            println!("{}", line);
        }
    }

    pub fn show_error(&mut self, error: &str) {
        self.finish_current();
        eprintln!("{} {}", "Error:".red().bold(), error.red());
    }

    pub fn show_warning(&self, warning: &str) {
        eprintln!("{} {}", "Warning:".yellow().bold(), warning.yellow());
    }

    pub fn show_info(&self, info: &str) {
        println!("{} {}", "Info:".cyan(), info);
    }

    /// Due reminder line for `remind watch`
    pub fn show_due(&self, at: &str, text: &str) {
        println!("{} {} {}", "⏰".yellow(), at.dimmed(), text.bold());
    }

    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(
            io::stdout(),
            Clear(ClearType::All),
            cursor::MoveTo(0, 0)
        )
    }

    pub fn show_section(&self, title: &str) {
        println!("\n{}", title.bold().cyan());
        println!("{}", "-".repeat(60).cyan());
    }

    /// Aligned `label: value` line
    pub fn show_field(&self, label: &str, value: &str) {
        println!("  {:<18} {}", format!("{}:", label), value.green());
    }
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new()
    }
}
