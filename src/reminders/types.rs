//! Reminder records and the outcome types reminder operations return

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::errors::{CareError, Result};

/// Input format for appointment date-times
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";
/// Input format for calendar dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Input format for times of day
pub const TIME_FORMAT: &str = "%H:%M";

/// Fixed professional-cleaning advice
pub const CLEANING_SCHEDULE: &str = "Recommended: Professional teeth cleaning every 6 months.";

/// What a reminder is about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReminderKind {
    /// One-off dental appointment
    Appointment { at: NaiveDateTime },
    /// Daily medicine dose
    Medicine { name: String, time: NaiveTime },
}

/// A single reminder entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: Uuid,
    pub kind: ReminderKind,
    pub created_at: NaiveDateTime,
}

impl Reminder {
    pub fn new(kind: ReminderKind, created_at: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            created_at,
        }
    }

    /// Appointment time, if this is an appointment
    pub fn appointment_at(&self) -> Option<NaiveDateTime> {
        match self.kind {
            ReminderKind::Appointment { at } => Some(at),
            ReminderKind::Medicine { .. } => None,
        }
    }

    pub fn is_appointment(&self) -> bool {
        matches!(self.kind, ReminderKind::Appointment { .. })
    }

    /// Confirmation shown after the reminder is stored
    pub fn confirmation(&self) -> String {
        match &self.kind {
            ReminderKind::Appointment { at } => format!(
                "Reminder set: Dental appointment on {}.",
                at.format(DATE_TIME_FORMAT)
            ),
            ReminderKind::Medicine { name, time } => format!(
                "Reminder set: Take {} at {}.",
                name,
                time.format(TIME_FORMAT)
            ),
        }
    }

    /// Short id used by list/remove commands
    pub fn short_id(&self) -> String {
        self.id.simple().to_string()[..8].to_string()
    }
}

impl fmt::Display for Reminder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ReminderKind::Appointment { at } => {
                write!(f, "[{}] Appointment {}", self.short_id(), at.format(DATE_TIME_FORMAT))
            }
            ReminderKind::Medicine { name, time } => {
                write!(f, "[{}] Medicine {} at {}", self.short_id(), name, time.format(TIME_FORMAT))
            }
        }
    }
}

/// Appointments still ahead, in chronological order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingAppointments(pub Vec<NaiveDateTime>);

impl fmt::Display for UpcomingAppointments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "No upcoming appointments.");
        }
        let lines: Vec<String> = self
            .0
            .iter()
            .map(|at| format!("Upcoming Appointment: {}", at.format(DATE_TIME_FORMAT)))
            .collect();
        write!(f, "{}", lines.join("\n"))
    }
}

/// Number of appointments already in the past
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissedAppointments(pub usize);

impl fmt::Display for MissedAppointments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            write!(f, "No missed appointments.")
        } else {
            write!(f, "You have missed {} appointments.", self.0)
        }
    }
}

/// Suggested date for the next routine checkup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextCheckup(pub NaiveDate);

impl fmt::Display for NextCheckup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Suggested next checkup on {}.", self.0.format(DATE_FORMAT))
    }
}

/// New dose time after a late or missed dose
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicationShift {
    pub name: String,
    pub time: NaiveTime,
}

impl fmt::Display for MedicationShift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Suggested new time for {}: {}.", self.name, self.time.format(TIME_FORMAT))
    }
}

/// Medication adherence verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adherence {
    Poor,
    Consistent,
}

impl fmt::Display for Adherence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Adherence::Poor => write!(f, "Warning! Your medication adherence is poor."),
            Adherence::Consistent => write!(f, "Your medication schedule is consistent."),
        }
    }
}

/// Replacement date for a missed appointment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rescheduled(pub NaiveDate);

impl fmt::Display for Rescheduled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "New appointment set for {}.", self.0.format(DATE_FORMAT))
    }
}

pub fn parse_date_time(input: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input.trim(), DATE_TIME_FORMAT)
        .map_err(|_| CareError::format("format", "YYYY-MM-DD HH:MM"))
}

pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| CareError::format("date format", "YYYY-MM-DD"))
}

pub fn parse_time(input: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(input.trim(), TIME_FORMAT)
        .map_err(|_| CareError::format("time format", "HH:MM"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        parse_date_time(s).unwrap()
    }

    #[test]
    fn test_parse_date_time_valid() {
        let at = dt("2025-03-14 09:30");
        assert_eq!(at.format(DATE_TIME_FORMAT).to_string(), "2025-03-14 09:30");
    }

    #[test]
    fn test_parse_errors_name_expected_format() {
        assert_eq!(
            parse_date_time("14/03/2025").unwrap_err().to_string(),
            "Invalid format! Use YYYY-MM-DD HH:MM."
        );
        assert_eq!(
            parse_date("2025-13-01").unwrap_err().to_string(),
            "Invalid date format! Use YYYY-MM-DD."
        );
        assert_eq!(
            parse_time("25:00").unwrap_err().to_string(),
            "Invalid time format! Use HH:MM."
        );
    }

    #[test]
    fn test_confirmation_messages() {
        let created = dt("2025-01-01 08:00");
        let appointment = Reminder::new(
            ReminderKind::Appointment { at: dt("2025-03-14 09:30") },
            created,
        );
        assert_eq!(
            appointment.confirmation(),
            "Reminder set: Dental appointment on 2025-03-14 09:30."
        );

        let medicine = Reminder::new(
            ReminderKind::Medicine {
                name: "Ibuprofen".to_string(),
                time: parse_time("08:15").unwrap(),
            },
            created,
        );
        assert_eq!(medicine.confirmation(), "Reminder set: Take Ibuprofen at 08:15.");
    }

    #[test]
    fn test_upcoming_display() {
        assert_eq!(UpcomingAppointments(vec![]).to_string(), "No upcoming appointments.");
        let text = UpcomingAppointments(vec![dt("2025-03-14 09:30"), dt("2025-04-01 10:00")]).to_string();
        assert_eq!(
            text,
            "Upcoming Appointment: 2025-03-14 09:30\nUpcoming Appointment: 2025-04-01 10:00"
        );
    }

    #[test]
    fn test_missed_display() {
        assert_eq!(MissedAppointments(0).to_string(), "No missed appointments.");
        assert_eq!(MissedAppointments(2).to_string(), "You have missed 2 appointments.");
    }

    #[test]
    fn test_short_id_length() {
        let r = Reminder::new(ReminderKind::Appointment { at: dt("2025-03-14 09:30") }, dt("2025-01-01 00:00"));
        assert_eq!(r.short_id().len(), 8);
    }
}
