//! Oral symptom checklist
//!
//! Keyword checks over reported symptoms plus image checks delegated to the
//! teeth analyzer. Every check is stored in the checkup history.

use chrono::{Local, NaiveDateTime};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::info;

use crate::analyzer::{Frame, TeethAnalyzer};
use crate::errors::Result;

/// Kind of checkup stored in history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CheckupKind {
    PlaqueLevels,
    BadBreath,
    Sensitivity,
    ToothDecay,
    MouthUlcers,
    GumBleeding,
    JawPain,
    TongueHealth,
    OralInfections,
}

impl CheckupKind {
    pub fn title(&self) -> &'static str {
        match self {
            CheckupKind::PlaqueLevels => "Plaque Levels",
            CheckupKind::BadBreath => "Bad Breath",
            CheckupKind::Sensitivity => "Sensitivity",
            CheckupKind::ToothDecay => "Tooth Decay",
            CheckupKind::MouthUlcers => "Mouth Ulcers",
            CheckupKind::GumBleeding => "Gum Bleeding",
            CheckupKind::JawPain => "Jaw Pain",
            CheckupKind::TongueHealth => "Tongue Health",
            CheckupKind::OralInfections => "Oral Infections",
        }
    }

    /// Whether the check reads an image rather than symptom keywords
    pub fn needs_image(&self) -> bool {
        matches!(
            self,
            CheckupKind::PlaqueLevels | CheckupKind::ToothDecay | CheckupKind::TongueHealth
        )
    }
}

impl fmt::Display for CheckupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// One stored checkup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckupEntry {
    pub at: NaiveDateTime,
    pub kind: CheckupKind,
    pub result: String,
}

/// Symptom keyword rule: any trigger present gives the positive text
struct Rule {
    triggers: &'static [&'static str],
    positive: &'static str,
    negative: &'static str,
}

const BAD_BREATH: Rule = Rule {
    triggers: &["dry mouth", "bad taste"],
    positive: "Possible bad breath detected due to dry mouth.",
    negative: "No significant signs of bad breath detected.",
};

const MOUTH_ULCERS: Rule = Rule {
    triggers: &["painful sores", "red spots"],
    positive: "Mouth ulcers detected. Consider oral gel treatment.",
    negative: "No signs of mouth ulcers detected.",
};

const GUM_BLEEDING: Rule = Rule {
    triggers: &["blood on brushing"],
    positive: "Gum bleeding detected. Possible early gum disease.",
    negative: "No gum bleeding detected.",
};

const JAW_PAIN: Rule = Rule {
    triggers: &["difficulty chewing"],
    positive: "Jaw pain detected. Possible TMJ disorder.",
    negative: "No significant jaw pain detected.",
};

const INFECTIONS: Rule = Rule {
    triggers: &["swelling", "pus"],
    positive: "Possible oral infection detected. Consult a dentist.",
    negative: "No signs of oral infections detected.",
};

const SENSITIVITY_TRIGGERS: [&str; 3] = ["hot", "cold", "sweet"];

impl Rule {
    fn evaluate(&self, symptoms: &[String]) -> &'static str {
        let hit = symptoms.iter().any(|symptom| {
            let symptom = symptom.to_lowercase();
            self.triggers.iter().any(|trigger| symptom.contains(trigger))
        });
        if hit {
            self.positive
        } else {
            self.negative
        }
    }
}

/// Oral health checklist with its checkup history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OralHealthCheck {
    history: Vec<CheckupEntry>,
}

impl OralHealthCheck {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&mut self, kind: CheckupKind, result: String) -> String {
        info!(check = kind.title(), "checkup stored");
        self.history.push(CheckupEntry {
            at: Local::now().naive_local(),
            kind,
            result: result.clone(),
        });
        result
    }

    pub fn detect_bad_breath(&mut self, symptoms: &[String]) -> String {
        let result = BAD_BREATH.evaluate(symptoms).to_string();
        self.store(CheckupKind::BadBreath, result)
    }

    /// Sensitivity trigger reported by the user (hot, cold or sweet)
    pub fn check_sensitivity(&mut self, feedback: &str) -> String {
        let feedback = feedback.trim();
        let lowered = feedback.to_lowercase();
        let result = if SENSITIVITY_TRIGGERS.iter().any(|t| *t == lowered) {
            format!("Teeth sensitivity detected for {}.", feedback)
        } else {
            "No significant sensitivity detected.".to_string()
        };
        self.store(CheckupKind::Sensitivity, result)
    }

    pub fn check_mouth_ulcers(&mut self, symptoms: &[String]) -> String {
        let result = MOUTH_ULCERS.evaluate(symptoms).to_string();
        self.store(CheckupKind::MouthUlcers, result)
    }

    pub fn check_gum_bleeding(&mut self, symptoms: &[String]) -> String {
        let result = GUM_BLEEDING.evaluate(symptoms).to_string();
        self.store(CheckupKind::GumBleeding, result)
    }

    pub fn check_jaw_pain(&mut self, symptoms: &[String]) -> String {
        let result = JAW_PAIN.evaluate(symptoms).to_string();
        self.store(CheckupKind::JawPain, result)
    }

    pub fn check_for_infections(&mut self, symptoms: &[String]) -> String {
        let result = INFECTIONS.evaluate(symptoms).to_string();
        self.store(CheckupKind::OralInfections, result)
    }

    pub fn check_plaque_levels(&mut self, analyzer: &TeethAnalyzer, image: &Path) -> Result<String> {
        let result = analyzer.detect_plaque(image)?.to_string();
        Ok(self.store(CheckupKind::PlaqueLevels, result))
    }

    pub fn detect_tooth_decay(&mut self, analyzer: &TeethAnalyzer, image: &Path) -> Result<String> {
        let frame = analyzer.frame(image)?;
        let result = analyzer.cavities_in(&frame).to_string();
        Ok(self.store(CheckupKind::ToothDecay, result))
    }

    /// Tongue images are only checked for readability
    pub fn detect_tongue_health(&mut self, analyzer: &TeethAnalyzer, image: &Path) -> Result<String> {
        let _frame: Frame = analyzer.frame(image)?;
        let result = format!("Healthy tongue detected in {}.", image.display());
        Ok(self.store(CheckupKind::TongueHealth, result))
    }

    /// Run a keyword check by kind; image kinds need [`OralHealthCheck::run_image`]
    pub fn run_symptoms(&mut self, kind: CheckupKind, symptoms: &[String]) -> Option<String> {
        match kind {
            CheckupKind::BadBreath => Some(self.detect_bad_breath(symptoms)),
            CheckupKind::Sensitivity => Some(self.check_sensitivity(&symptoms.join(" "))),
            CheckupKind::MouthUlcers => Some(self.check_mouth_ulcers(symptoms)),
            CheckupKind::GumBleeding => Some(self.check_gum_bleeding(symptoms)),
            CheckupKind::JawPain => Some(self.check_jaw_pain(symptoms)),
            CheckupKind::OralInfections => Some(self.check_for_infections(symptoms)),
            CheckupKind::PlaqueLevels | CheckupKind::ToothDecay | CheckupKind::TongueHealth => None,
        }
    }

    /// Run an image check by kind; keyword kinds return `None`
    pub fn run_image(&mut self, kind: CheckupKind, analyzer: &TeethAnalyzer, image: &Path) -> Result<Option<String>> {
        let result = match kind {
            CheckupKind::PlaqueLevels => self.check_plaque_levels(analyzer, image)?,
            CheckupKind::ToothDecay => self.detect_tooth_decay(analyzer, image)?,
            CheckupKind::TongueHealth => self.detect_tongue_health(analyzer, image)?,
            _ => return Ok(None),
        };
        Ok(Some(result))
    }

    pub fn history(&self) -> &[CheckupEntry] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symptoms(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_bad_breath() {
        let mut check = OralHealthCheck::new();
        assert_eq!(
            check.detect_bad_breath(&symptoms(&["Dry mouth in the morning"])),
            "Possible bad breath detected due to dry mouth."
        );
        assert_eq!(
            check.detect_bad_breath(&symptoms(&["toothache"])),
            "No significant signs of bad breath detected."
        );
    }

    #[test]
    fn test_sensitivity_feedback() {
        let mut check = OralHealthCheck::new();
        assert_eq!(check.check_sensitivity("Cold"), "Teeth sensitivity detected for Cold.");
        assert_eq!(check.check_sensitivity("pressure"), "No significant sensitivity detected.");
    }

    #[test]
    fn test_keyword_rules() {
        let mut check = OralHealthCheck::new();
        assert_eq!(
            check.check_mouth_ulcers(&symptoms(&["red spots"])),
            "Mouth ulcers detected. Consider oral gel treatment."
        );
        assert_eq!(check.check_gum_bleeding(&[]), "No gum bleeding detected.");
        assert_eq!(
            check.check_jaw_pain(&symptoms(&["difficulty chewing"])),
            "Jaw pain detected. Possible TMJ disorder."
        );
        assert_eq!(
            check.check_for_infections(&symptoms(&["pus near molar"])),
            "Possible oral infection detected. Consult a dentist."
        );
    }

    #[test]
    fn test_history_keeps_order_and_kind() {
        let mut check = OralHealthCheck::new();
        check.check_gum_bleeding(&symptoms(&["blood on brushing"]));
        check.check_jaw_pain(&[]);
        let kinds: Vec<CheckupKind> = check.history().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![CheckupKind::GumBleeding, CheckupKind::JawPain]);
        assert_eq!(check.history()[0].result, "Gum bleeding detected. Possible early gum disease.");
    }

    #[test]
    fn test_run_symptoms_skips_image_kinds() {
        let mut check = OralHealthCheck::new();
        assert!(check.run_symptoms(CheckupKind::TongueHealth, &[]).is_none());
        assert!(check.history().is_empty());
        assert!(check.run_symptoms(CheckupKind::BadBreath, &symptoms(&["bad taste"])).is_some());
    }

    #[test]
    fn test_image_check_with_missing_file_is_not_stored() {
        let mut check = OralHealthCheck::new();
        let analyzer = TeethAnalyzer::default();
        assert!(check.detect_tongue_health(&analyzer, Path::new("/nope.jpg")).is_err());
        assert!(check.history().is_empty());
    }
}
