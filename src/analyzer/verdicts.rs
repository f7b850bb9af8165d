//! Fixed-threshold classification of image statistics

use clap::ValueEnum;
use std::fmt;
use std::str::FromStr;

use crate::config::AnalyzerConfig;
use crate::errors::CareError;

/// Individual checks the analyzer can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CheckKind {
    Cavities,
    Whiteness,
    Plaque,
    Alignment,
    Inflammation,
    Enamel,
    Sensitivity,
    /// Combined report of the first six checks
    Full,
}

impl CheckKind {
    /// Checks that make up the full report, in report order
    pub const REPORT: [CheckKind; 6] = [
        CheckKind::Cavities,
        CheckKind::Whiteness,
        CheckKind::Plaque,
        CheckKind::Alignment,
        CheckKind::Inflammation,
        CheckKind::Enamel,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CheckKind::Cavities => "cavities",
            CheckKind::Whiteness => "whiteness",
            CheckKind::Plaque => "plaque",
            CheckKind::Alignment => "alignment",
            CheckKind::Inflammation => "inflammation",
            CheckKind::Enamel => "enamel",
            CheckKind::Sensitivity => "sensitivity",
            CheckKind::Full => "full",
        }
    }
}

impl FromStr for CheckKind {
    type Err = CareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        match key.as_str() {
            "gum" | "gums" => Ok(CheckKind::Inflammation),
            "all" | "report" => Ok(CheckKind::Full),
            _ => <CheckKind as ValueEnum>::from_str(&key, true)
                .map_err(|_| CareError::UnknownCategory(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CavityUrgency {
    Immediate,
    Checkup,
    Clear,
}

/// Count of cavity-sized dark regions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CavityFinding {
    pub count: usize,
    pub urgency: CavityUrgency,
}

impl CavityFinding {
    pub fn classify(count: usize, config: &AnalyzerConfig) -> Self {
        let urgency = if count > config.cavity_urgent_count {
            CavityUrgency::Immediate
        } else if count > 0 {
            CavityUrgency::Checkup
        } else {
            CavityUrgency::Clear
        };
        Self { count, urgency }
    }
}

impl fmt::Display for CavityFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let advice = match self.urgency {
            CavityUrgency::Immediate => "Immediate dental consultation recommended.",
            CavityUrgency::Checkup => "Schedule a checkup.",
            CavityUrgency::Clear => "No significant cavities detected.",
        };
        write!(f, "Found {} potential cavities. {}", self.count, advice)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whiteness {
    Excellent,
    Good,
    Average,
    BelowAverage,
}

impl Whiteness {
    /// `None` means no pixel was bright enough to count as tooth surface
    pub fn classify(bright_mean: Option<f64>, config: &AnalyzerConfig) -> Self {
        match bright_mean {
            Some(m) if m > config.whiteness_excellent => Whiteness::Excellent,
            Some(m) if m > config.whiteness_good => Whiteness::Good,
            Some(m) if m > config.whiteness_average => Whiteness::Average,
            _ => Whiteness::BelowAverage,
        }
    }
}

impl fmt::Display for Whiteness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Whiteness::Excellent => "Excellent",
            Whiteness::Good => "Good",
            Whiteness::Average => "Average - Consider whitening",
            Whiteness::BelowAverage => "Below average - Professional cleaning recommended.",
        };
        write!(f, "{}", text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plaque {
    High,
    Low,
}

impl Plaque {
    pub fn classify(dark_pixels: u64, config: &AnalyzerConfig) -> Self {
        if dark_pixels > config.plaque_pixel_limit {
            Plaque::High
        } else {
            Plaque::Low
        }
    }
}

impl fmt::Display for Plaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plaque::High => write!(f, "High plaque buildup detected!"),
            Plaque::Low => write!(f, "Low plaque levels. Maintain hygiene."),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Misaligned,
    Normal,
}

impl Alignment {
    pub fn classify(edge_pixels: u64, config: &AnalyzerConfig) -> Self {
        if edge_pixels > config.alignment_edge_limit {
            Alignment::Misaligned
        } else {
            Alignment::Normal
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alignment::Misaligned => {
                write!(f, "Teeth misalignment detected. Consider orthodontic consultation.")
            }
            Alignment::Normal => write!(f, "Teeth alignment is normal."),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inflammation {
    Significant,
    Mild,
    Normal,
}

impl Inflammation {
    pub fn classify(red_fraction: f64, config: &AnalyzerConfig) -> Self {
        if red_fraction > config.inflammation_significant {
            Inflammation::Significant
        } else if red_fraction > config.inflammation_mild {
            Inflammation::Mild
        } else {
            Inflammation::Normal
        }
    }
}

impl fmt::Display for Inflammation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inflammation::Significant => write!(f, "Significant inflammation detected. Consult dentist."),
            Inflammation::Mild => write!(f, "Mild inflammation. Improve oral hygiene."),
            Inflammation::Normal => write!(f, "Gum health appears normal."),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enamel {
    Weak,
    Good,
}

impl Enamel {
    pub fn classify(variance: f64, config: &AnalyzerConfig) -> Self {
        if variance < config.enamel_variance_min {
            Enamel::Weak
        } else {
            Enamel::Good
        }
    }
}

impl fmt::Display for Enamel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Enamel::Weak => write!(f, "Weak enamel detected. Reduce acidic foods."),
            Enamel::Good => write!(f, "Enamel strength is good!"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensitivity {
    High,
    Normal,
}

impl Sensitivity {
    pub fn classify(std_dev: f64, config: &AnalyzerConfig) -> Self {
        if std_dev > config.sensitivity_std_max {
            Sensitivity::High
        } else {
            Sensitivity::Normal
        }
    }
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sensitivity::High => write!(f, "High sensitivity risk detected!"),
            Sensitivity::Normal => write!(f, "Tooth sensitivity is within normal range."),
        }
    }
}

/// Findings of the combined report, in check order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub findings: Vec<String>,
}

impl fmt::Display for HealthReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Teeth Health Report:\n- {}", self.findings.join("\n- "))
    }
}
