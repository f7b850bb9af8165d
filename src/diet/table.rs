//! Fixed food recommendation table

use std::fmt;
use std::str::FromStr;

use crate::errors::CareError;

/// Concern keys of the recommendation table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Concern {
    Calcium,
    VitaminD,
    Phosphorus,
    CrunchyFruitsVeggies,
    GreenTea,
    Water,
    StrongTeeth,
    CavityProtection,
    GumHealth,
    Avoid,
    SugarIntake,
}

impl Concern {
    pub const ALL: [Concern; 11] = [
        Concern::Calcium,
        Concern::VitaminD,
        Concern::Phosphorus,
        Concern::CrunchyFruitsVeggies,
        Concern::GreenTea,
        Concern::Water,
        Concern::StrongTeeth,
        Concern::CavityProtection,
        Concern::GumHealth,
        Concern::Avoid,
        Concern::SugarIntake,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Concern::Calcium => "calcium",
            Concern::VitaminD => "vitamin_d",
            Concern::Phosphorus => "phosphorus",
            Concern::CrunchyFruitsVeggies => "crunchy_fruits_veggies",
            Concern::GreenTea => "green_tea",
            Concern::Water => "water",
            Concern::StrongTeeth => "strong_teeth",
            Concern::CavityProtection => "cavity_protection",
            Concern::GumHealth => "gum_health",
            Concern::Avoid => "avoid",
            Concern::SugarIntake => "sugar_intake",
        }
    }

    pub fn foods(&self) -> &'static [&'static str] {
        match self {
            Concern::Calcium => &["Milk", "Cheese", "Yogurt", "Almonds"],
            Concern::VitaminD => &["Salmon", "Egg Yolks", "Mushrooms"],
            Concern::Phosphorus => &["Fish", "Lean Meat", "Nuts"],
            Concern::CrunchyFruitsVeggies => &["Apples", "Carrots", "Celery"],
            Concern::GreenTea => &["Rich in antioxidants to reduce gum inflammation"],
            Concern::Water => &["Keeps the mouth hydrated and washes away food particles"],
            Concern::StrongTeeth | Concern::CavityProtection => {
                &["Calcium", "Vitamin D", "Phosphorus", "Crunchy Fruits & Veggies"]
            }
            Concern::GumHealth => &["Green Tea", "Water"],
            Concern::Avoid => &["Sugary Snacks", "Soda", "Acidic Foods", "Sticky Candy"],
            Concern::SugarIntake => &["Limit sugar intake to less than 20g per day"],
        }
    }
}

impl FromStr for Concern {
    type Err = CareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace([' ', '-'], "_");
        Concern::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == key)
            .ok_or_else(|| CareError::UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for Concern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snacks that are gentle on enamel
pub const TOOTH_FRIENDLY_SNACKS: [&str; 6] =
    ["Cheese", "Nuts", "Yogurt", "Carrots", "Apples", "Sugar-free gum"];
