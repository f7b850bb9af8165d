//! Configuration management for SmileCare
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.smilecare/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::errors::{CareError, Result};

/// Complete configuration for SmileCare
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analyzer: AnalyzerConfig,
    pub quick: QuickConfig,
    pub reminders: RemindersConfig,
    pub diet: DietConfig,
    pub display: DisplayConfig,
    pub repl: ReplConfig,
    pub paths: PathsConfig,
}

/// Thresholds for the image heuristics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub clahe_clip_limit: f32,
    pub clahe_tiles: u32,
    pub cavity_area_min: f64,
    pub cavity_area_max: f64,
    pub cavity_urgent_count: usize,
    pub whiteness_mask_level: u8,
    pub whiteness_excellent: f64,
    pub whiteness_good: f64,
    pub whiteness_average: f64,
    pub plaque_level: u8,
    pub plaque_pixel_limit: u64,
    pub canny_low: f32,
    pub canny_high: f32,
    pub alignment_edge_limit: u64,
    pub inflammation_significant: f64,
    pub inflammation_mild: f64,
    pub enamel_variance_min: f64,
    pub sensitivity_std_max: f64,
}

/// Thresholds for the patient quick analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuickConfig {
    pub dark_level: u8,
    pub cavity_pixel_limit: u64,
    pub yellowish_below: f64,
    pub moderate_below: f64,
}

/// Reminder offsets and limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemindersConfig {
    pub checkup_interval_days: i64,
    pub medication_shift_hours: i64,
    pub reschedule_days: i64,
    pub missed_dose_limit: u32,
    pub watch_interval_secs: u64,
}

/// Diet advice thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DietConfig {
    pub low_sugar_below: f64,
    pub moderate_sugar_below: f64,
    pub unhealthy_meal_limit: usize,
    pub report_window_days: i64,
}

/// Terminal output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub default_verbosity: String,
    pub show_progress_bars: bool,
    pub color_output: bool,
}

/// Interactive session behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplConfig {
    /// Write the state file after every command that changes it
    pub autosave: bool,
}

/// File system paths configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub state_dir: String,
    pub history_file: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            clahe_clip_limit: 2.0,
            clahe_tiles: 8,
            cavity_area_min: 100.0,
            cavity_area_max: 1000.0,
            cavity_urgent_count: 5,
            whiteness_mask_level: 180,
            whiteness_excellent: 200.0,
            whiteness_good: 170.0,
            whiteness_average: 140.0,
            plaque_level: 100,
            plaque_pixel_limit: 1000,
            canny_low: 50.0,
            canny_high: 150.0,
            alignment_edge_limit: 5000,
            inflammation_significant: 0.1,
            inflammation_mild: 0.05,
            enamel_variance_min: 500.0,
            sensitivity_std_max: 50.0,
        }
    }
}

impl Default for QuickConfig {
    fn default() -> Self {
        Self {
            dark_level: 150,
            cavity_pixel_limit: 500,
            yellowish_below: 120.0,
            moderate_below: 180.0,
        }
    }
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            checkup_interval_days: 180,
            medication_shift_hours: 4,
            reschedule_days: 7,
            missed_dose_limit: 3,
            watch_interval_secs: 30,
        }
    }
}

impl Default for DietConfig {
    fn default() -> Self {
        Self {
            low_sugar_below: 20.0,
            moderate_sugar_below: 50.0,
            unhealthy_meal_limit: 5,
            report_window_days: 7,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            default_verbosity: "normal".to_string(),
            show_progress_bars: true,
            color_output: true,
        }
    }
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self { autosave: true }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state_dir: "~/.smilecare".to_string(),
            history_file: "~/.smilecare/history".to_string(),
        }
    }
}

/// Upper bound for day offsets and windows (ten years)
pub const MAX_OFFSET_DAYS: i64 = 3650;

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(&config_path)
        } else {
            Self::load_default()
        }
    }

    /// Like `load`, but an explicit path that does not exist yet yields defaults
    pub fn load_or_default(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(config_path) if !config_path.exists() => Ok(Config::default()),
            other => Self::load(other),
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CareError::ConfigError(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| CareError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// Standard config location, if a home directory is known
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".smilecare").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let a = &self.analyzer;

        if a.clahe_tiles == 0 {
            return Err(CareError::ConfigError(
                "clahe_tiles must be greater than 0".to_string()
            ));
        }

        if a.cavity_area_min >= a.cavity_area_max {
            return Err(CareError::ConfigError(
                "cavity_area_min must be less than cavity_area_max".to_string()
            ));
        }

        if !(a.whiteness_average < a.whiteness_good && a.whiteness_good < a.whiteness_excellent) {
            return Err(CareError::ConfigError(
                "whiteness thresholds must satisfy average < good < excellent".to_string()
            ));
        }

        if a.canny_low > a.canny_high {
            return Err(CareError::ConfigError(
                "canny_low must not exceed canny_high".to_string()
            ));
        }

        for (name, value) in [
            ("inflammation_mild", a.inflammation_mild),
            ("inflammation_significant", a.inflammation_significant),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(CareError::ConfigError(
                    format!("{} must be between 0.0 and 1.0", name)
                ));
            }
        }

        if a.inflammation_mild >= a.inflammation_significant {
            return Err(CareError::ConfigError(
                "inflammation_mild must be less than inflammation_significant".to_string()
            ));
        }

        if self.quick.yellowish_below >= self.quick.moderate_below {
            return Err(CareError::ConfigError(
                "yellowish_below must be less than moderate_below".to_string()
            ));
        }

        if self.diet.low_sugar_below >= self.diet.moderate_sugar_below {
            return Err(CareError::ConfigError(
                "low_sugar_below must be less than moderate_sugar_below".to_string()
            ));
        }

        let r = &self.reminders;
        for (name, value, max) in [
            ("checkup_interval_days", r.checkup_interval_days, MAX_OFFSET_DAYS),
            ("reschedule_days", r.reschedule_days, MAX_OFFSET_DAYS),
            ("medication_shift_hours", r.medication_shift_hours, 23),
            ("report_window_days", self.diet.report_window_days, MAX_OFFSET_DAYS),
        ] {
            if !(1..=max).contains(&value) {
                return Err(CareError::ConfigError(
                    format!("{} must be between 1 and {}", name, max)
                ));
            }
        }

        if self.reminders.watch_interval_secs == 0 {
            return Err(CareError::ConfigError(
                "watch_interval_secs must be greater than 0".to_string()
            ));
        }

        match self.display.default_verbosity.as_str() {
            "quiet" | "normal" | "verbose" | "very_verbose" => {}
            _ => return Err(CareError::ConfigError(
                format!("Invalid verbosity level: {}", self.display.default_verbosity)
            )),
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| CareError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CareError::ConfigError(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CareError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// Get state directory path
    pub fn state_dir(&self) -> PathBuf {
        Self::expand_path(&self.paths.state_dir)
    }

    /// Get REPL history file path
    pub fn history_file(&self) -> PathBuf {
        Self::expand_path(&self.paths.history_file)
    }
}
