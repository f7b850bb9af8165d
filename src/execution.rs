//! Shared action execution for CLI and REPL modes
//!
//! Both front ends parse input into an [`Action`] and hand it here together
//! with the assistant state. Output comes back as plain text lines so each
//! front end can decorate it its own way.

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::analyzer::CheckKind;
use crate::cli::{Action, DietCommand, PatientCommand, RemindCommand, SymptomsCommand};
use crate::diet::advisor::NO_RECORDS;
use crate::errors::{CareError, Result};
use crate::patient::NO_ANALYSIS;
use crate::state::AssistantState;

/// Text produced by an action, and whether state must be saved
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    pub lines: Vec<String>,
    pub changed: bool,
}

impl Outcome {
    fn read(text: impl ToString) -> Self {
        Self {
            lines: split_lines(&text.to_string()),
            changed: false,
        }
    }

    fn write(text: impl ToString) -> Self {
        Self {
            lines: split_lines(&text.to_string()),
            changed: true,
        }
    }

    fn list<I, T>(items: I, empty: &str) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        let lines: Vec<String> = items
            .into_iter()
            .flat_map(|item| split_lines(&item.to_string()))
            .collect();
        if lines.is_empty() {
            Self::read(empty)
        } else {
            Self { lines, changed: false }
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.trim_end().lines().map(str::to_string).collect()
}

/// Run one action against the state
///
/// `on_check` is called before each check of a full image report; `now` is
/// the wall clock used by date-relative operations. `remind watch` is a loop
/// owned by the caller and is rejected here.
pub fn execute(
    action: &Action,
    state: &mut AssistantState,
    now: NaiveDateTime,
    on_check: &mut dyn FnMut(CheckKind),
) -> Result<Outcome> {
    debug!(?action, "executing action");
    match action {
        Action::Analyze { image, check } => {
            let frame = state.analyzer.frame(image.as_path())?;
            let text = match check {
                CheckKind::Full => state
                    .analyzer
                    .analyze_frame_with(&frame, |kind| on_check(kind))?
                    .to_string(),
                kind => state.analyzer.run_check(*kind, &frame)?,
            };
            info!(image = %image.display(), check = check.label(), "image analyzed");
            Ok(Outcome::write(text))
        }
        Action::Quick { image, name, age } => {
            let record = state.patients.register(name, *age)?;
            let report = record.analyze_now(image.as_path(), now.date())?;
            Ok(Outcome::write(report))
        }
        Action::History => Ok(Outcome::list(
            state
                .analyzer
                .history()
                .iter()
                .map(|r| format!("[{}] {}", r.at.format("%Y-%m-%d %H:%M:%S"), r.result)),
            NO_ANALYSIS,
        )),
        Action::Patient(command) => patient(command, state),
        Action::Remind(command) => remind(command, state, now),
        Action::Diet(command) => diet(command, state, now),
        Action::Symptoms(command) => symptoms(command, state),
    }
}

fn patient(command: &PatientCommand, state: &mut AssistantState) -> Result<Outcome> {
    let patients = &mut state.patients;
    match command {
        PatientCommand::Info { name } => Ok(Outcome::read(patients.get(name)?.user_info())),
        PatientCommand::Last { name } => Ok(Outcome::read(patients.get(name)?.real_time_status())),
        PatientCommand::Alerts { name } => {
            let record = patients.get(name)?;
            Ok(Outcome::list([record.whiteness_suggestion(), record.cavity_alert()], ""))
        }
        PatientCommand::Suggestions { name } => {
            Ok(Outcome::list(patients.get(name)?.all_suggestions(), NO_ANALYSIS))
        }
        PatientCommand::Search { name, keyword } => Ok(Outcome::list(
            patients.get(name)?.search(keyword),
            "No matching analysis found.",
        )),
        PatientCommand::Clear { name } => Ok(Outcome::write(patients.get_mut(name)?.clear_history())),
        PatientCommand::List => Ok(Outcome::list(patients.names(), "No patients registered.")),
    }
}

fn remind(command: &RemindCommand, state: &mut AssistantState, now: NaiveDateTime) -> Result<Outcome> {
    let book = &mut state.reminders;
    match command {
        RemindCommand::Appointment { when } => {
            Ok(Outcome::write(book.schedule_appointment(when, now)?.confirmation()))
        }
        RemindCommand::Medicine { name, time } => {
            Ok(Outcome::write(book.add_medication(name, time, now)?.confirmation()))
        }
        RemindCommand::List => Ok(Outcome::list(book.list(), "No reminders set.")),
        RemindCommand::Upcoming => Ok(Outcome::read(book.upcoming(now))),
        RemindCommand::Missed => Ok(Outcome::read(book.missed(now))),
        RemindCommand::NextCheckup { last } => Ok(Outcome::read(book.suggest_next_checkup(last)?)),
        RemindCommand::Adjust { name, last_taken } => {
            Ok(Outcome::read(book.adjust_medication_timing(name, last_taken)?))
        }
        RemindCommand::Adherence { missed } => Ok(Outcome::read(book.irregular_usage_from_input(missed)?)),
        RemindCommand::Reschedule { date } => Ok(Outcome::read(book.auto_reschedule(date)?)),
        RemindCommand::Cleaning => Ok(Outcome::read(book.cleaning_schedule())),
        RemindCommand::Remove { id } => {
            let removed = book.remove(id)?;
            Ok(Outcome::write(format!("Removed {}", removed)))
        }
        RemindCommand::Clear => {
            book.clear();
            Ok(Outcome::write("All reminders cleared."))
        }
        RemindCommand::Watch { .. } => Err(CareError::InvalidInput(
            "watch runs from the command line: smilecare remind watch".to_string(),
        )),
    }
}

fn diet(command: &DietCommand, state: &mut AssistantState, now: NaiveDateTime) -> Result<Outcome> {
    let advisor = &mut state.diet;
    match command {
        DietCommand::Suggest { concern } => {
            Ok(Outcome::read(advisor.food_suggestions(concern)?.join(", ")))
        }
        DietCommand::Plan { age, issues } => {
            let plan = advisor.personalized_plan(*age, issues);
            if plan.is_empty() {
                Ok(Outcome::read("No specific foods for this profile. Keep a balanced diet."))
            } else {
                Ok(Outcome::read(format!("Recommended foods: {}", plan.join(", "))))
            }
        }
        DietCommand::Sugar { grams } => {
            if !grams.is_finite() || *grams < 0.0 {
                return Err(CareError::InvalidInput(
                    "sugar intake must be a non-negative number of grams".to_string(),
                ));
            }
            Ok(Outcome::read(advisor.sugar_intake_risk(*grams)))
        }
        DietCommand::Check { foods } => Ok(Outcome::read(advisor.detect_unhealthy(foods))),
        DietCommand::Log { user, meal, date } => {
            Ok(Outcome::write(advisor.log_meal(user, meal, date.as_deref(), now.date())?))
        }
        DietCommand::History { user } => Ok(Outcome::list(
            advisor.history(user).unwrap_or_default(),
            NO_RECORDS,
        )),
        DietCommand::Report { user } => Ok(Outcome::read(advisor.weekly_report(user, now.date()))),
        DietCommand::Snacks => Ok(Outcome::read(advisor.tooth_friendly_snacks().join(", "))),
        DietCommand::Trend { user } => Ok(Outcome::read(advisor.predict_trend(user))),
    }
}

fn symptoms(command: &SymptomsCommand, state: &mut AssistantState) -> Result<Outcome> {
    match command {
        SymptomsCommand::Check { kind, symptoms, image } => {
            let result = if kind.needs_image() {
                let image = image.as_deref().ok_or_else(|| {
                    CareError::InvalidInput(format!("{} needs --image <PATH>", kind.title()))
                })?;
                state.symptoms.run_image(*kind, &state.analyzer, image)?
            } else {
                state.symptoms.run_symptoms(*kind, symptoms)
            };
            let text = result.ok_or_else(|| {
                CareError::InvalidInput(format!("{} cannot be checked", kind.title()))
            })?;
            Ok(Outcome::write(format!("{}: {}", kind.title(), text)))
        }
        SymptomsCommand::History => Ok(Outcome::list(
            state.symptoms.history().iter().map(|e| {
                format!("[{}] {}: {}", e.at.format("%Y-%m-%d %H:%M"), e.kind.title(), e.result)
            }),
            "No checkups recorded.",
        )),
    }
}
