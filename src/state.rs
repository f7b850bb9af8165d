//! Assistant state and its JSON snapshot on disk
//!
//! Each module keeps its own in-memory records; the snapshot lets one-shot
//! subcommands, the REPL and `remind watch` see the same data.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::analyzer::TeethAnalyzer;
use crate::config::Config;
use crate::diet::DietAdvisor;
use crate::patient::PatientRegistry;
use crate::reminders::ReminderBook;
use crate::symptoms::OralHealthCheck;

const STATE_FILE: &str = "state.json";

/// Every module of the assistant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantState {
    pub reminders: ReminderBook,
    pub diet: DietAdvisor,
    pub symptoms: OralHealthCheck,
    pub analyzer: TeethAnalyzer,
    pub patients: PatientRegistry,
}

impl AssistantState {
    pub fn new(config: &Config) -> Self {
        Self {
            reminders: ReminderBook::new(config.reminders.clone()),
            diet: DietAdvisor::new(config.diet.clone()),
            symptoms: OralHealthCheck::new(),
            analyzer: TeethAnalyzer::new(config.analyzer.clone()),
            patients: PatientRegistry::new(config.quick.clone()),
        }
    }

    /// Push thresholds into modules restored from a snapshot
    pub fn apply_config(&mut self, config: &Config) {
        self.reminders.set_config(config.reminders.clone());
        self.diet.set_config(config.diet.clone());
        self.analyzer.set_config(config.analyzer.clone());
        self.patients.set_config(config.quick.clone());
    }
}

/// JSON snapshot location
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Store inside `dir`, created on first save
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(STATE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot, or a fresh state when none exists yet
    pub fn load(&self, config: &Config) -> Result<AssistantState> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no state snapshot, starting fresh");
            return Ok(AssistantState::new(config));
        }

        let json = fs::read_to_string(&self.path)
            .context("Failed to read state file")?;

        let mut state: AssistantState = serde_json::from_str(&json)
            .context("Failed to deserialize state")?;

        state.apply_config(config);
        Ok(state)
    }

    /// Load, falling back to a fresh state if the snapshot is unreadable
    pub fn load_or_fresh(&self, config: &Config) -> AssistantState {
        match self.load(config) {
            Ok(state) => state,
            Err(e) => {
                warn!(path = %self.path.display(), "ignoring unreadable state: {:#}", e);
                AssistantState::new(config)
            }
        }
    }

    /// Write the snapshot through a temporary file and rename
    pub fn save(&self, state: &AssistantState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create state directory")?;
        }

        let json = serde_json::to_string_pretty(state)
            .context("Failed to serialize state")?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .context("Failed to write state file")?;
        fs::rename(&tmp, &self.path)
            .context("Failed to replace state file")?;

        debug!(path = %self.path.display(), "state saved");
        Ok(())
    }

    pub fn delete(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .context("Failed to delete state file")?;
        }
        Ok(())
    }
}
