//! REPL (Read-Eval-Print Loop) module for the interactive assistant
//!
//! Provides line editing with history, session commands and access to
//! every assistant operation through slash commands.

pub mod commands;
pub mod display;
pub mod input;
pub mod session;

use anyhow::Result;
use colored::*;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::config::Config;
use crate::repl::commands::CommandHandler;
pub use crate::repl::display::DisplayManager;
use crate::repl::input::{InputHandler, ReadOutcome};
pub use crate::repl::session::{CommandRecord, SessionManager};
use crate::state::StateStore;

/// REPL session coordinator
pub struct ReplSession {
    input_handler: InputHandler,
    command_handler: CommandHandler,
    session_manager: SessionManager,
    display_manager: DisplayManager,
}

impl ReplSession {
    /// Session without on-disk line history
    pub fn new(config: Config, store: StateStore) -> Result<Self> {
        Self::build(InputHandler::new()?, config, store)
    }

    /// Session with persistent line history
    pub fn with_history(config: Config, store: StateStore, history_path: PathBuf) -> Result<Self> {
        Self::build(InputHandler::with_history(history_path)?, config, store)
    }

    fn build(input_handler: InputHandler, config: Config, store: StateStore) -> Result<Self> {
        let display_manager = DisplayManager::new().with_progress(config.display.show_progress_bars);
        Ok(ReplSession {
            input_handler,
            command_handler: CommandHandler::new(),
            session_manager: SessionManager::open(config, store),
            display_manager,
        })
    }

    pub fn show_welcome(&self, version: &str) {
        self.display_manager.show_banner(version);
    }

    /// Handle one input line; returns false when the session should end
    pub fn handle_input(&mut self, input: &str) -> Result<bool> {
        if input.trim().is_empty() {
            return Ok(true);
        }
        let command = self.command_handler.parse(input);
        debug!(?command, "repl command");
        self.command_handler
            .execute(command, &mut self.session_manager, &mut self.display_manager)
    }

    /// Read-eval-print until `/exit` or Ctrl-D, then save
    pub fn run(&mut self) -> Result<()> {
        loop {
            match self.input_handler.read_line()? {
                ReadOutcome::Line(line) => match self.handle_input(&line) {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => self.display_manager.show_error(&format!("{:#}", e)),
                },
                ReadOutcome::Interrupted => {
                    println!("\nUse {} to quit gracefully", "/exit".cyan());
                }
                ReadOutcome::Eof => break,
            }
        }
        self.save()
    }

    /// Save line history and any unsaved state
    pub fn save(&mut self) -> Result<()> {
        if let Err(e) = self.input_handler.save_history() {
            warn!("could not save line history: {:#}", e);
        }
        self.session_manager.save()?;
        Ok(())
    }

    pub fn session(&self) -> &SessionManager {
        &self.session_manager
    }

    pub fn is_verbose(&self) -> bool {
        self.command_handler.is_verbose()
    }

    pub fn set_verbose(&mut self, enable: bool) {
        self.command_handler.set_verbose(enable);
    }

    pub fn command_count(&self) -> usize {
        self.session_manager.command_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn repl(dir: &TempDir) -> ReplSession {
        ReplSession::new(Config::default(), StateStore::in_dir(dir.path())).unwrap()
    }

    #[test]
    fn test_handle_empty_input() {
        let dir = TempDir::new().unwrap();
        let mut session = repl(&dir);
        assert!(session.handle_input("").unwrap());
        assert!(session.handle_input("   ").unwrap());
        assert_eq!(session.command_count(), 0);
    }

    #[test]
    fn test_handle_exit_command() {
        let dir = TempDir::new().unwrap();
        let mut session = repl(&dir);
        assert!(!session.handle_input("/exit").unwrap());
    }

    #[test]
    fn test_actions_reach_state() {
        let dir = TempDir::new().unwrap();
        let mut session = repl(&dir);
        assert!(session.handle_input("/remind appointment \"2099-01-05 09:00\"").unwrap());
        assert!(session.handle_input("/symptoms check gum-bleeding \"blood on brushing\"").unwrap());
        assert_eq!(session.session().state().reminders.len(), 1);
        assert_eq!(session.session().state().symptoms.history().len(), 1);
        assert_eq!(session.command_count(), 2);
    }

    #[test]
    fn test_state_survives_sessions() {
        let dir = TempDir::new().unwrap();
        {
            let mut session = repl(&dir);
            session.handle_input("/diet log ana \"Sticky Candy\"").unwrap();
            session.save().unwrap();
        }
        let session = repl(&dir);
        assert_eq!(session.session().state().diet.history("ana").unwrap().len(), 1);
    }

    #[test]
    fn test_verbose_mode() {
        let dir = TempDir::new().unwrap();
        let mut session = repl(&dir);
        assert!(!session.is_verbose());
        session.handle_input("/verbose on").unwrap();
        assert!(session.is_verbose());
        session.set_verbose(false);
        assert!(!session.is_verbose());
    }
}
