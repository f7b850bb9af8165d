//! Session manager for the REPL
//!
//! Owns the assistant state for the lifetime of the session, tracks the
//! commands run so far and writes the state snapshot back to disk.

use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use std::collections::VecDeque;
use std::time::Instant;
use tracing::info;

use crate::config::Config;
use crate::state::{AssistantState, StateStore};

/// Maximum number of commands kept for `/history`
const MAX_HISTORY_SIZE: usize = 500;

/// One command run in this session
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRecord {
    pub command: String,
    pub success: bool,
    pub duration_ms: u64,
    pub at: NaiveDateTime,
}

/// Session state behind the REPL
pub struct SessionManager {
    config: Config,
    state: AssistantState,
    store: StateStore,
    history: VecDeque<CommandRecord>,
    started: Instant,
    command_count: usize,
    dirty: bool,
}

impl SessionManager {
    /// Session over the snapshot in `store`, starting fresh if it is unreadable
    pub fn open(config: Config, store: StateStore) -> Self {
        let state = store.load_or_fresh(&config);
        Self::with_state(config, store, state)
    }

    pub fn with_state(config: Config, store: StateStore, state: AssistantState) -> Self {
        SessionManager {
            config,
            state,
            store,
            history: VecDeque::with_capacity(64),
            started: Instant::now(),
            command_count: 0,
            dirty: false,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &AssistantState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AssistantState {
        &mut self.state
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Wall clock used by date-relative operations
    pub fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    /// Record a finished command; `changed` marks the state unsaved
    pub fn record(&mut self, command: &str, success: bool, changed: bool, duration_ms: u64) {
        if self.history.len() >= MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
        self.history.push_back(CommandRecord {
            command: command.to_string(),
            success,
            duration_ms,
            at: self.now(),
        });
        self.command_count += 1;
        self.dirty |= changed;
    }

    /// Most recent commands, newest first
    pub fn get_history(&self, limit: usize) -> Vec<&CommandRecord> {
        self.history.iter().rev().take(limit).collect()
    }

    pub fn command_count(&self) -> usize {
        self.command_count
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Seconds since the session started
    pub fn session_duration(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    /// Write the snapshot if anything changed
    pub fn save(&mut self) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        self.store.save(&self.state)?;
        self.dirty = false;
        Ok(true)
    }

    /// Forget every stored record; the snapshot is rewritten on the next save
    pub fn reset(&mut self) {
        self.state = AssistantState::new(&self.config);
        self.history.clear();
        self.dirty = true;
        info!("assistant state reset");
    }
}
