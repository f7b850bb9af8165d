//! CLI module for SmileCare
//!
//! Handles command-line argument parsing. Configuration lives in
//! [`crate::config`].

pub mod args;

pub use args::{
    Action, Args, Commands, DietCommand, PatientCommand, RemindCommand, SymptomsCommand, Verbosity,
};
