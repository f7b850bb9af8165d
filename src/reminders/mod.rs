//! Appointment and medicine reminders
//!
//! Reminders live in an in-memory [`ReminderBook`]; every suggestion is a
//! fixed date/time offset from user input.

pub mod book;
pub mod types;

pub use book::ReminderBook;
pub use types::{
    Adherence, MedicationShift, MissedAppointments, NextCheckup, Reminder, ReminderKind,
    Rescheduled, UpcomingAppointments,
};
