//! In-memory reminder book for appointments and medicines

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::RemindersConfig;
use crate::errors::{CareError, Result};
use crate::reminders::types::{
    parse_date, parse_date_time, parse_time, Adherence, MedicationShift, MissedAppointments,
    NextCheckup, Reminder, ReminderKind, Rescheduled, UpcomingAppointments, CLEANING_SCHEDULE,
};

/// Ordered list of reminders plus the offsets used for suggestions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReminderBook {
    reminders: Vec<Reminder>,
    #[serde(skip)]
    config: RemindersConfig,
}

fn shift_date(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    Duration::try_days(days)
        .and_then(|offset| date.checked_add_signed(offset))
        .ok_or_else(|| CareError::InvalidInput(format!("{} plus {} days is out of range", date, days)))
}

impl ReminderBook {
    pub fn new(config: RemindersConfig) -> Self {
        Self {
            reminders: Vec::new(),
            config,
        }
    }

    /// Replace offsets after the book was restored from disk
    pub fn set_config(&mut self, config: RemindersConfig) {
        self.config = config;
    }

    /// Schedule a dental appointment from `YYYY-MM-DD HH:MM`
    pub fn schedule_appointment(&mut self, input: &str, now: NaiveDateTime) -> Result<&Reminder> {
        let at = parse_date_time(input)?;
        info!(%at, "appointment scheduled");
        Ok(self.push(ReminderKind::Appointment { at }, now))
    }

    /// Add a daily medicine reminder at `HH:MM`
    pub fn add_medication(&mut self, name: &str, time: &str, now: NaiveDateTime) -> Result<&Reminder> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CareError::InvalidInput("medicine name must not be empty".to_string()));
        }
        let time = parse_time(time)?;
        info!(medicine = name, %time, "medication reminder added");
        Ok(self.push(
            ReminderKind::Medicine {
                name: name.to_string(),
                time,
            },
            now,
        ))
    }

    fn push(&mut self, kind: ReminderKind, now: NaiveDateTime) -> &Reminder {
        self.reminders.push(Reminder::new(kind, now));
        let last = self.reminders.len() - 1;
        &self.reminders[last]
    }

    /// Appointments strictly after `now`, earliest first
    pub fn upcoming(&self, now: NaiveDateTime) -> UpcomingAppointments {
        let mut dates: Vec<NaiveDateTime> = self
            .reminders
            .iter()
            .filter_map(Reminder::appointment_at)
            .filter(|at| *at > now)
            .collect();
        dates.sort();
        UpcomingAppointments(dates)
    }

    /// Appointments strictly before `now`
    pub fn missed(&self, now: NaiveDateTime) -> MissedAppointments {
        let count = self
            .reminders
            .iter()
            .filter_map(Reminder::appointment_at)
            .filter(|at| *at < now)
            .count();
        MissedAppointments(count)
    }

    /// Next routine checkup, one interval after `last_checkup`
    pub fn suggest_next_checkup(&self, last_checkup: &str) -> Result<NextCheckup> {
        let last = parse_date(last_checkup)?;
        Ok(NextCheckup(shift_date(last, self.config.checkup_interval_days)?))
    }

    /// Shift a dose forward from the time it was last taken, wrapping at midnight
    pub fn adjust_medication_timing(&self, name: &str, last_taken: &str) -> Result<MedicationShift> {
        let last = parse_time(last_taken)?;
        let (time, _) = last.overflowing_add_signed(Duration::hours(self.config.medication_shift_hours));
        Ok(MedicationShift {
            name: name.trim().to_string(),
            time,
        })
    }

    /// Classify adherence from doses missed in the past week
    pub fn irregular_usage(&self, missed_doses: u32) -> Adherence {
        if missed_doses > self.config.missed_dose_limit {
            Adherence::Poor
        } else {
            Adherence::Consistent
        }
    }

    /// Parse a free-form dose count before classifying it
    pub fn irregular_usage_from_input(&self, input: &str) -> Result<Adherence> {
        let missed = input
            .trim()
            .parse::<u32>()
            .map_err(|_| CareError::format("number", "a whole number of doses"))?;
        Ok(self.irregular_usage(missed))
    }

    /// Move a missed appointment forward by the reschedule interval
    pub fn auto_reschedule(&self, missed_date: &str) -> Result<Rescheduled> {
        let old = parse_date(missed_date)?;
        Ok(Rescheduled(shift_date(old, self.config.reschedule_days)?))
    }

    pub fn cleaning_schedule(&self) -> &'static str {
        CLEANING_SCHEDULE
    }

    /// Reminders that fall due in `[from, to)`
    ///
    /// Medicine reminders repeat daily, so a window spanning midnight matches
    /// times on either side of it.
    pub fn due(&self, from: NaiveDateTime, to: NaiveDateTime) -> Vec<&Reminder> {
        if to <= from {
            return Vec::new();
        }
        let whole_day = to - from >= Duration::days(1);

        self.reminders
            .iter()
            .filter(|reminder| match &reminder.kind {
                ReminderKind::Appointment { at } => *at >= from && *at < to,
                ReminderKind::Medicine { time, .. } => {
                    if whole_day {
                        return true;
                    }
                    let today = from.date().and_time(*time);
                    let tomorrow = today + Duration::days(1);
                    (today >= from && today < to) || (tomorrow >= from && tomorrow < to)
                }
            })
            .collect()
    }

    /// Remove a reminder by full or short id
    pub fn remove(&mut self, id: &str) -> Result<Reminder> {
        let needle = id.trim().to_lowercase();
        let position = self
            .reminders
            .iter()
            .position(|r| r.id.to_string() == needle || r.short_id() == needle)
            .ok_or_else(|| CareError::ReminderNotFound(id.to_string()))?;
        debug!(id = %needle, "reminder removed");
        Ok(self.reminders.remove(position))
    }

    pub fn clear(&mut self) {
        self.reminders.clear();
    }

    pub fn list(&self) -> &[Reminder] {
        &self.reminders
    }

    pub fn len(&self) -> usize {
        self.reminders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reminders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        parse_date_time(s).unwrap()
    }

    fn book() -> ReminderBook {
        ReminderBook::new(RemindersConfig::default())
    }

    #[test]
    fn test_schedule_appointment_appends() {
        let mut book = book();
        let now = dt("2025-01-01 08:00");
        let msg = book.schedule_appointment("2025-02-10 14:00", now).unwrap().confirmation();
        assert_eq!(msg, "Reminder set: Dental appointment on 2025-02-10 14:00.");
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_schedule_appointment_rejects_bad_format() {
        let mut book = book();
        let err = book.schedule_appointment("tomorrow", dt("2025-01-01 08:00")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid format! Use YYYY-MM-DD HH:MM.");
        assert!(book.is_empty());
    }

    #[test]
    fn test_add_medication_validates() {
        let mut book = book();
        let now = dt("2025-01-01 08:00");
        assert!(book.add_medication("", "08:00", now).is_err());
        assert!(book.add_medication("Amoxicillin", "8pm", now).is_err());
        let msg = book.add_medication(" Amoxicillin ", "20:00", now).unwrap().confirmation();
        assert_eq!(msg, "Reminder set: Take Amoxicillin at 20:00.");
    }

    #[test]
    fn test_upcoming_and_missed_split_on_now() {
        let mut book = book();
        let created = dt("2025-01-01 08:00");
        book.schedule_appointment("2025-06-01 10:00", created).unwrap();
        book.schedule_appointment("2025-02-01 10:00", created).unwrap();
        book.schedule_appointment("2024-12-01 10:00", created).unwrap();
        book.add_medication("Fluoride rinse", "21:00", created).unwrap();

        let now = dt("2025-01-15 12:00");
        let upcoming = book.upcoming(now);
        assert_eq!(upcoming.0, vec![dt("2025-02-01 10:00"), dt("2025-06-01 10:00")]);
        assert_eq!(book.missed(now), MissedAppointments(1));
    }

    #[test]
    fn test_appointment_exactly_now_is_neither() {
        let mut book = book();
        let now = dt("2025-01-15 12:00");
        book.schedule_appointment("2025-01-15 12:00", now).unwrap();
        assert!(book.upcoming(now).0.is_empty());
        assert_eq!(book.missed(now).0, 0);
    }

    #[test]
    fn test_suggest_next_checkup_adds_180_days() {
        let next = book().suggest_next_checkup("2025-01-01").unwrap();
        assert_eq!(next.to_string(), "Suggested next checkup on 2025-06-30.");
    }

    #[test]
    fn test_adjust_medication_wraps_midnight() {
        let shift = book().adjust_medication_timing("Ibuprofen", "22:30").unwrap();
        assert_eq!(shift.to_string(), "Suggested new time for Ibuprofen: 02:30.");
    }

    #[test]
    fn test_irregular_usage_threshold() {
        let book = book();
        assert_eq!(book.irregular_usage(3), Adherence::Consistent);
        assert_eq!(book.irregular_usage(4), Adherence::Poor);
        assert!(book.irregular_usage_from_input("many").is_err());
        assert_eq!(book.irregular_usage_from_input(" 5 ").unwrap(), Adherence::Poor);
    }

    #[test]
    fn test_auto_reschedule_adds_week() {
        let moved = book().auto_reschedule("2025-02-25").unwrap();
        assert_eq!(moved.to_string(), "New appointment set for 2025-03-04.");
    }

    #[test]
    fn test_custom_offsets() {
        let config = RemindersConfig {
            checkup_interval_days: 90,
            reschedule_days: 1,
            ..RemindersConfig::default()
        };
        let book = ReminderBook::new(config);
        assert_eq!(book.suggest_next_checkup("2025-01-01").unwrap().0.to_string(), "2025-04-01");
        assert_eq!(book.auto_reschedule("2025-01-01").unwrap().0.to_string(), "2025-01-02");
    }

    #[test]
    fn test_due_window_across_midnight() {
        let mut book = book();
        let created = dt("2025-01-01 00:00");
        book.add_medication("Night rinse", "23:50", created).unwrap();
        book.add_medication("Morning pill", "00:05", created).unwrap();
        book.add_medication("Lunch pill", "12:00", created).unwrap();

        let due = book.due(dt("2025-01-10 23:45"), dt("2025-01-11 00:15"));
        assert_eq!(due.len(), 2);
    }

    #[test]
    fn test_due_appointments_half_open() {
        let mut book = book();
        let created = dt("2025-01-01 00:00");
        book.schedule_appointment("2025-01-10 10:00", created).unwrap();

        assert_eq!(book.due(dt("2025-01-10 09:59"), dt("2025-01-10 10:00")).len(), 0);
        assert_eq!(book.due(dt("2025-01-10 10:00"), dt("2025-01-10 10:01")).len(), 1);
        assert!(book.due(dt("2025-01-10 11:00"), dt("2025-01-10 10:00")).is_empty());
    }

    #[test]
    fn test_remove_by_short_id() {
        let mut book = book();
        let created = dt("2025-01-01 00:00");
        let id = book.add_medication("Vitamin D", "09:00", created).unwrap().short_id();
        assert!(book.remove("deadbeef").is_err());
        let removed = book.remove(&id).unwrap();
        assert!(!removed.is_appointment());
        assert!(book.is_empty());
    }

    #[test]
    fn test_date_offsets_out_of_range() {
        let book = ReminderBook::new(RemindersConfig {
            checkup_interval_days: 100_000_000,
            reschedule_days: i64::MAX,
            ..RemindersConfig::default()
        });
        let err = book.suggest_next_checkup("2025-01-01").unwrap_err();
        assert!(matches!(err, CareError::InvalidInput(_)));
        assert!(book.auto_reschedule("2025-01-01").is_err());
    }

    #[test]
    fn test_cleaning_schedule() {
        assert_eq!(
            book().cleaning_schedule(),
            "Recommended: Professional teeth cleaning every 6 months."
        );
    }
}
