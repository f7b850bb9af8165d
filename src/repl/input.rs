//! Input handler for REPL using rustyline
//!
//! Provides line editing with persistent history.

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use tracing::debug;

pub const PROMPT: &str = ">smilecare: ";

/// What the user did at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// Ctrl-C
    Interrupted,
    /// Ctrl-D
    Eof,
}

/// Readline interface with optional on-disk history
pub struct InputHandler {
    editor: DefaultEditor,
    history_path: Option<PathBuf>,
    prompt: String,
}

impl InputHandler {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new()?;

        Ok(InputHandler {
            editor,
            history_path: None,
            prompt: PROMPT.to_string(),
        })
    }

    /// Input handler that loads and later saves `history_file`
    pub fn with_history(history_file: PathBuf) -> Result<Self> {
        let mut editor = DefaultEditor::new()?;

        if history_file.exists() {
            if let Err(e) = editor.load_history(&history_file) {
                debug!(path = %history_file.display(), "history not loaded: {}", e);
            }
        }

        Ok(InputHandler {
            editor,
            history_path: Some(history_file),
            prompt: PROMPT.to_string(),
        })
    }

    /// Read one trimmed line; non-empty lines go into history
    pub fn read_line(&mut self) -> Result<ReadOutcome> {
        match self.editor.readline(&self.prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    let _ = self.editor.add_history_entry(trimmed);
                }
                Ok(ReadOutcome::Line(trimmed.to_string()))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(err) => Err(anyhow::anyhow!("Readline error: {}", err)),
        }
    }

    /// Save history to disk, creating its directory
    pub fn save_history(&mut self) -> Result<()> {
        if let Some(ref path) = self.history_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create history directory")?;
            }
            self.editor.save_history(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustyline::history::History;
    use tempfile::TempDir;

    #[test]
    fn test_default_prompt() {
        let handler = InputHandler::new().unwrap();
        assert_eq!(handler.prompt, ">smilecare: ");
        assert!(handler.history_path.is_none());
    }

    #[test]
    fn test_history_persistence_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let history_path = temp_dir.path().join("nested").join("history");

        {
            let mut handler = InputHandler::with_history(history_path.clone()).unwrap();
            let _ = handler.editor.add_history_entry("/diet snacks");
            let _ = handler.editor.add_history_entry("/remind list");
            handler.save_history().unwrap();
        }

        assert!(history_path.exists());
        let handler = InputHandler::with_history(history_path).unwrap();
        assert_eq!(handler.editor.history().len(), 2);
    }
}
