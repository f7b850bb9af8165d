//! Tooth-friendly diet advice

pub mod advisor;
pub mod table;

pub use advisor::{DietAdvisor, DietCheck, HealthTrend, MealEntry, SugarRisk, WeeklyReport};
pub use table::Concern;
