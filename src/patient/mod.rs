//! Per-patient teeth record with a quick brightness analysis
//!
//! The quick analysis skips preprocessing: it looks at the raw grayscale mean
//! and the number of dark pixels.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

use crate::analyzer::{image_ops, AnalysisRecord, ImageInput};
use crate::analyzer::load_image;
use crate::config::QuickConfig;
use crate::errors::{CareError, Result};
use crate::reminders::types::DATE_FORMAT;

pub const NO_ANALYSIS: &str = "No analysis history found.";
pub const HISTORY_CLEARED: &str = "Teeth analysis history cleared.";

/// Overall tooth shade from mean brightness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shade {
    Yellowish,
    Moderate,
    Great,
}

/// Structured result of a quick analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickReport {
    pub mean_brightness: f64,
    pub dark_pixels: u64,
    pub cavities_suspected: bool,
    pub shade: Shade,
}

impl QuickReport {
    pub fn classify(mean_brightness: f64, dark_pixels: u64, config: &QuickConfig) -> Self {
        let shade = if mean_brightness < config.yellowish_below {
            Shade::Yellowish
        } else if mean_brightness < config.moderate_below {
            Shade::Moderate
        } else {
            Shade::Great
        };
        Self {
            mean_brightness,
            dark_pixels,
            cavities_suspected: dark_pixels > config.cavity_pixel_limit,
            shade,
        }
    }
}

impl fmt::Display for QuickReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Teeth Analysis Report:")?;
        if self.cavities_suspected {
            writeln!(f, "- Possible cavities detected. Consider improving oral hygiene.")?;
        } else {
            writeln!(f, "- No major cavities detected.")?;
        }
        match self.shade {
            Shade::Yellowish => writeln!(f, "- Teeth appear yellowish. Whitening recommended."),
            Shade::Moderate => writeln!(f, "- Teeth in moderate condition. Keep brushing regularly."),
            Shade::Great => writeln!(f, "- Teeth are in great condition!"),
        }
    }
}

/// Grayscale mean plus dark-pixel count, with its own history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuickAnalyzer {
    history: Vec<AnalysisRecord>,
    #[serde(skip)]
    config: QuickConfig,
}

impl QuickAnalyzer {
    pub fn new(config: QuickConfig) -> Self {
        Self {
            history: Vec::new(),
            config,
        }
    }

    pub fn set_config(&mut self, config: QuickConfig) {
        self.config = config;
    }

    pub fn analyze<'a>(&mut self, input: impl Into<ImageInput<'a>>) -> Result<QuickReport> {
        let rgb = match input.into() {
            ImageInput::Path(path) => load_image(path)?.to_rgb8(),
            ImageInput::Image(image) => image.to_rgb8(),
        };
        let gray = image_ops::to_gray(&rgb);
        let mean = image_ops::mean(&gray).ok_or(CareError::EmptyImage)?;
        let dark = image_ops::count_at_or_below(&gray, self.config.dark_level);

        let report = QuickReport::classify(mean, dark, &self.config);
        self.history.push(AnalysisRecord {
            at: Local::now().naive_local(),
            result: report.to_string(),
        });
        Ok(report)
    }

    pub fn history(&self) -> &[AnalysisRecord] {
        &self.history
    }
}

/// One dated entry of a patient's teeth history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientEntry {
    pub date: NaiveDate,
    pub report: QuickReport,
}

impl fmt::Display for PatientEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.date.format(DATE_FORMAT), self.report)
    }
}

/// Name, age and history of one patient
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserInfo<'a> {
    pub name: &'a str,
    pub age: u32,
    pub history: &'a [PatientEntry],
}

impl fmt::Display for UserInfo<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Age: {}", self.age)?;
        write!(f, "Teeth Health History: {} record(s)", self.history.len())
    }
}

/// Personal teeth health record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientRecord {
    name: String,
    age: u32,
    history: Vec<PatientEntry>,
    analyzer: QuickAnalyzer,
}

impl PatientRecord {
    pub fn new(name: &str, age: u32, config: QuickConfig) -> Self {
        Self {
            name: name.trim().to_string(),
            age,
            history: Vec::new(),
            analyzer: QuickAnalyzer::new(config),
        }
    }

    pub fn set_config(&mut self, config: QuickConfig) {
        self.analyzer.set_config(config);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    /// Analyze an image now and store the dated report
    pub fn analyze_now<'a>(&mut self, input: impl Into<ImageInput<'a>>, today: NaiveDate) -> Result<QuickReport> {
        let report = self.analyzer.analyze(input)?;
        info!(patient = %self.name, "quick analysis stored");
        self.history.push(PatientEntry {
            date: today,
            report: report.clone(),
        });
        Ok(report)
    }

    pub fn user_info(&self) -> UserInfo<'_> {
        UserInfo {
            name: &self.name,
            age: self.age,
            history: &self.history,
        }
    }

    pub fn last_analysis(&self) -> Option<&PatientEntry> {
        self.history.last()
    }

    /// Latest entry rendered, or the no-history message
    pub fn real_time_status(&self) -> String {
        self.last_analysis()
            .map(ToString::to_string)
            .unwrap_or_else(|| NO_ANALYSIS.to_string())
    }

    pub fn clear_history(&mut self) -> &'static str {
        self.history.clear();
        HISTORY_CLEARED
    }

    pub fn whiteness_suggestion(&self) -> &'static str {
        if self.history.iter().any(|e| e.report.shade == Shade::Yellowish) {
            "Consider using whitening toothpaste or home remedies."
        } else {
            "No whitening required. Maintain hygiene."
        }
    }

    pub fn cavity_alert(&self) -> &'static str {
        if self.history.iter().any(|e| e.report.cavities_suspected) {
            "You might have cavities. Consider improving oral care."
        } else {
            "No cavity issues detected. Keep up the good work!"
        }
    }

    /// Every stored report, oldest first
    pub fn all_suggestions(&self) -> Vec<String> {
        self.history.iter().map(|e| e.report.to_string()).collect()
    }

    /// Entries whose report mentions `keyword`, ignoring case
    pub fn search(&self, keyword: &str) -> Vec<&PatientEntry> {
        let keyword = keyword.trim().to_lowercase();
        self.history
            .iter()
            .filter(|e| e.report.to_string().to_lowercase().contains(&keyword))
            .collect()
    }

    pub fn history(&self) -> &[PatientEntry] {
        &self.history
    }

    pub fn analyzer(&self) -> &QuickAnalyzer {
        &self.analyzer
    }
}

/// Patients by name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientRegistry {
    patients: BTreeMap<String, PatientRecord>,
    #[serde(skip)]
    config: QuickConfig,
}

impl PatientRegistry {
    pub fn new(config: QuickConfig) -> Self {
        Self {
            patients: BTreeMap::new(),
            config,
        }
    }

    pub fn set_config(&mut self, config: QuickConfig) {
        for record in self.patients.values_mut() {
            record.set_config(config.clone());
        }
        self.config = config;
    }

    /// Existing record for `name`, or a new one; `age` updates the stored age
    pub fn register(&mut self, name: &str, age: Option<u32>) -> Result<&mut PatientRecord> {
        let key = name.trim();
        if key.is_empty() {
            return Err(CareError::InvalidInput("patient name must not be empty".to_string()));
        }
        let config = self.config.clone();
        let record = self
            .patients
            .entry(key.to_string())
            .or_insert_with(|| PatientRecord::new(key, age.unwrap_or_default(), config));
        if let Some(age) = age {
            record.age = age;
        }
        Ok(record)
    }

    pub fn get(&self, name: &str) -> Result<&PatientRecord> {
        self.patients
            .get(name.trim())
            .ok_or_else(|| CareError::PatientNotFound(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut PatientRecord> {
        self.patients
            .get_mut(name.trim())
            .ok_or_else(|| CareError::PatientNotFound(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.patients.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, Luma};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn gray(value: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(40, 40, Luma([value])))
    }

    fn record() -> PatientRecord {
        PatientRecord::new("Ana", 34, QuickConfig::default())
    }

    #[test]
    fn test_quick_report_text() {
        let report = QuickReport::classify(100.0, 1600, &QuickConfig::default());
        assert_eq!(
            report.to_string(),
            "Teeth Analysis Report:\n\
             - Possible cavities detected. Consider improving oral hygiene.\n\
             - Teeth appear yellowish. Whitening recommended.\n"
        );
    }

    #[test]
    fn test_bright_image_is_great() {
        let mut record = record();
        let report = record.analyze_now(&gray(230), today()).unwrap();
        assert!(!report.cavities_suspected);
        assert_eq!(report.shade, Shade::Great);
        assert_eq!(record.cavity_alert(), "No cavity issues detected. Keep up the good work!");
        assert_eq!(record.whiteness_suggestion(), "No whitening required. Maintain hygiene.");
    }

    #[test]
    fn test_dark_image_raises_alerts() {
        let mut record = record();
        record.analyze_now(&gray(90), today()).unwrap();
        assert_eq!(record.cavity_alert(), "You might have cavities. Consider improving oral care.");
        assert_eq!(
            record.whiteness_suggestion(),
            "Consider using whitening toothpaste or home remedies."
        );
    }

    #[test]
    fn test_no_major_cavities_is_not_an_alert() {
        let mut record = record();
        record.analyze_now(&gray(160), today()).unwrap();
        assert_eq!(record.search("cavities").len(), 1);
        assert_eq!(record.cavity_alert(), "No cavity issues detected. Keep up the good work!");
    }

    #[test]
    fn test_history_operations() {
        let mut record = record();
        assert_eq!(record.real_time_status(), NO_ANALYSIS);
        record.analyze_now(&gray(160), today()).unwrap();
        record.analyze_now(&gray(90), today()).unwrap();

        assert_eq!(record.all_suggestions().len(), 2);
        assert_eq!(record.search("YELLOWISH").len(), 1);
        assert!(record.real_time_status().starts_with("2025-03-10\nTeeth Analysis Report:"));
        assert_eq!(record.user_info().history.len(), 2);
        assert_eq!(record.analyzer().history().len(), 2);

        assert_eq!(record.clear_history(), HISTORY_CLEARED);
        assert!(record.last_analysis().is_none());
    }

    #[test]
    fn test_user_info_display() {
        let record = record();
        assert_eq!(
            record.user_info().to_string(),
            "Name: Ana\nAge: 34\nTeeth Health History: 0 record(s)"
        );
    }

    #[test]
    fn test_registry_register_and_lookup() {
        let mut registry = PatientRegistry::new(QuickConfig::default());
        assert!(registry.register("  ", Some(3)).is_err());
        registry.register("Ana", Some(34)).unwrap();
        registry.register("Ana", Some(35)).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("Ana").unwrap().age(), 35);
        assert!(registry.get("Bo").is_err());
    }
}
