//! Diet advice and per-user meal log

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::config::DietConfig;
use crate::diet::table::{Concern, TOOTH_FRIENDLY_SNACKS};
use crate::errors::Result;
use crate::reminders::types::{parse_date, DATE_FORMAT};

pub const MEAL_LOGGED: &str = "Meal logged successfully.";
pub const NO_RECORDS: &str = "No records found.";

/// One logged meal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealEntry {
    pub date: NaiveDate,
    pub meal: String,
}

impl fmt::Display for MealEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.date.format(DATE_FORMAT), self.meal)
    }
}

/// Daily sugar intake risk band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SugarRisk {
    Low,
    Moderate,
    High,
}

impl fmt::Display for SugarRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SugarRisk::Low => write!(f, "Low Risk"),
            SugarRisk::Moderate => write!(f, "Moderate Risk"),
            SugarRisk::High => write!(f, "High Risk - Reduce sugar intake!"),
        }
    }
}

/// Foods from a list that should be cut down
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DietCheck {
    pub unhealthy: Vec<String>,
}

impl fmt::Display for DietCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unhealthy.is_empty() {
            write!(f, "Your diet looks healthy!")
        } else {
            write!(f, "Warning! Reduce: {}.", self.unhealthy.join(", "))
        }
    }
}

/// Share of healthy meals in the report window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeeklyReport {
    pub score: Option<f64>,
}

impl fmt::Display for WeeklyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.score {
            Some(score) => write!(f, "Weekly Diet Score: {:.2}% - Keep up the good work!", score),
            None => write!(f, "No data available."),
        }
    }
}

/// Outlook derived from the meal log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthTrend {
    CavityRisk,
    Supportive,
}

impl fmt::Display for HealthTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthTrend::CavityRisk => write!(f, "Warning! Your diet may lead to cavities soon."),
            HealthTrend::Supportive => write!(f, "Your diet is supporting good dental health!"),
        }
    }
}

/// Diet advisor with a per-user meal log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DietAdvisor {
    diet_log: BTreeMap<String, Vec<MealEntry>>,
    #[serde(skip)]
    config: DietConfig,
}

impl DietAdvisor {
    pub fn new(config: DietConfig) -> Self {
        Self {
            diet_log: BTreeMap::new(),
            config,
        }
    }

    pub fn set_config(&mut self, config: DietConfig) {
        self.config = config;
    }

    /// Foods recommended for a concern key such as `gum_health`
    pub fn food_suggestions(&self, concern: &str) -> Result<&'static [&'static str]> {
        Ok(concern.parse::<Concern>()?.foods())
    }

    /// Plan from age and known issues, first occurrence order, no duplicates
    pub fn personalized_plan(&self, age: u32, issues: &[String]) -> Vec<&'static str> {
        let has_issue = |wanted: &str| {
            issues
                .iter()
                .any(|issue| issue.trim().to_lowercase().replace(' ', "_") == wanted)
        };

        let mut groups = Vec::new();
        if age < 18 {
            groups.push(Concern::StrongTeeth);
        }
        if has_issue("cavities") {
            groups.push(Concern::CavityProtection);
        }
        if has_issue("gum_issues") {
            groups.push(Concern::GumHealth);
        }

        let mut plan: Vec<&'static str> = Vec::new();
        for food in groups.iter().flat_map(|c| c.foods().iter().copied()) {
            if !plan.contains(&food) {
                plan.push(food);
            }
        }
        plan
    }

    pub fn sugar_intake_risk(&self, grams_per_day: f64) -> SugarRisk {
        if grams_per_day < self.config.low_sugar_below {
            SugarRisk::Low
        } else if grams_per_day < self.config.moderate_sugar_below {
            SugarRisk::Moderate
        } else {
            SugarRisk::High
        }
    }

    /// Flag foods that appear on the avoid list
    pub fn detect_unhealthy(&self, foods: &[String]) -> DietCheck {
        let avoid: Vec<String> = Concern::Avoid.foods().iter().map(|f| f.to_lowercase()).collect();
        let unhealthy = foods
            .iter()
            .map(|f| f.trim())
            .filter(|f| avoid.iter().any(|a| a == &f.to_lowercase()))
            .map(str::to_string)
            .collect();
        DietCheck { unhealthy }
    }

    /// Log a meal for `user`; `date` defaults to `today`
    pub fn log_meal(&mut self, user: &str, meal: &str, date: Option<&str>, today: NaiveDate) -> Result<&'static str> {
        let date = match date {
            Some(d) => parse_date(d)?,
            None => today,
        };
        debug!(user, %date, "meal logged");
        self.diet_log
            .entry(user.to_string())
            .or_default()
            .push(MealEntry {
                date,
                meal: meal.trim().to_string(),
            });
        Ok(MEAL_LOGGED)
    }

    /// Logged meals, or `None` when the user has no records
    pub fn history(&self, user: &str) -> Option<&[MealEntry]> {
        self.diet_log.get(user).map(Vec::as_slice)
    }

    /// Score the meals of the last report window ending `today`
    pub fn weekly_report(&self, user: &str, today: NaiveDate) -> WeeklyReport {
        let start = Duration::try_days(self.config.report_window_days - 1)
            .and_then(|window| today.checked_sub_signed(window))
            .unwrap_or(NaiveDate::MIN);
        let meals: Vec<&MealEntry> = self
            .history(user)
            .unwrap_or_default()
            .iter()
            .filter(|m| m.date >= start && m.date <= today)
            .collect();

        if meals.is_empty() {
            return WeeklyReport { score: None };
        }

        let healthy = meals.iter().filter(|m| !is_unhealthy_meal(&m.meal)).count();
        let score = healthy as f64 / meals.len().max(1) as f64 * 100.0;
        WeeklyReport { score: Some(score) }
    }

    pub fn tooth_friendly_snacks(&self) -> &'static [&'static str] {
        &TOOTH_FRIENDLY_SNACKS
    }

    /// Outlook from every logged meal of the user
    pub fn predict_trend(&self, user: &str) -> HealthTrend {
        let unhealthy = self
            .history(user)
            .unwrap_or_default()
            .iter()
            .filter(|m| is_unhealthy_meal(&m.meal))
            .count();
        if unhealthy > self.config.unhealthy_meal_limit {
            HealthTrend::CavityRisk
        } else {
            HealthTrend::Supportive
        }
    }

    pub fn users(&self) -> impl Iterator<Item = &str> {
        self.diet_log.keys().map(String::as_str)
    }
}

/// A meal is unhealthy when it is tagged `avoid` or names an avoid-list food
pub fn is_unhealthy_meal(meal: &str) -> bool {
    let meal = meal.to_lowercase();
    meal.contains("avoid")
        || Concern::Avoid
            .foods()
            .iter()
            .any(|food| meal.contains(&food.to_lowercase()))
}
