//! SmileCare v0.3.0 - Dental Wellness Assistant
//!
//! A terminal assistant for everyday dental care.
//!
//! # Architecture
//!
//! - **reminders**: appointment and medicine reminders with date arithmetic
//! - **diet**: food table, meal log and diet scoring
//! - **symptoms**: keyword symptom checklist with image checks
//! - **analyzer**: threshold heuristics over teeth photos
//! - **patient**: per-patient quick analysis history
//! - **state** / **execution**: shared state and dispatch for CLI and REPL
//! - **watch**: background reminder polling

pub mod errors;
pub mod config;
pub mod logging;

// Assistant modules
pub mod reminders;
pub mod diet;
pub mod symptoms;
pub mod analyzer;
pub mod patient;

// Re-export commonly used types
pub use errors::{CareError, Result};

// State snapshot shared by CLI and REPL
pub mod state;

// Interface layer
pub mod cli;
pub mod execution;
pub mod repl;
pub mod watch;
