use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Specialty areas shared by doctors (as qualifications) and treatments (as
/// their classification).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TreatmentCategory {
    Cardiology,
    Dermatology,
    Neurology,
    Orthopedics,
    Pediatrics,
    Ophthalmology,
    Dentistry,
    Gynecology,
    Psychiatry,
}

impl TreatmentCategory {
    pub const ALL: [TreatmentCategory; 9] = [
        TreatmentCategory::Cardiology,
        TreatmentCategory::Dermatology,
        TreatmentCategory::Neurology,
        TreatmentCategory::Orthopedics,
        TreatmentCategory::Pediatrics,
        TreatmentCategory::Ophthalmology,
        TreatmentCategory::Dentistry,
        TreatmentCategory::Gynecology,
        TreatmentCategory::Psychiatry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TreatmentCategory::Cardiology => "CARDIOLOGY",
            TreatmentCategory::Dermatology => "DERMATOLOGY",
            TreatmentCategory::Neurology => "NEUROLOGY",
            TreatmentCategory::Orthopedics => "ORTHOPEDICS",
            TreatmentCategory::Pediatrics => "PEDIATRICS",
            TreatmentCategory::Ophthalmology => "OPHTHALMOLOGY",
            TreatmentCategory::Dentistry => "DENTISTRY",
            TreatmentCategory::Gynecology => "GYNECOLOGY",
            TreatmentCategory::Psychiatry => "PSYCHIATRY",
        }
    }
}

impl fmt::Display for TreatmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown treatment category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for TreatmentCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        TreatmentCategory::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownCategory(wanted.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Treatment {
    pub id: Uuid,
    pub name: String,
    pub category: TreatmentCategory,
    pub price: f64,
}

impl Treatment {
    pub fn is_in(&self, category: TreatmentCategory) -> bool {
        self.category == category
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parses_case_insensitively() {
        assert_eq!("cardiology".parse::<TreatmentCategory>(), Ok(TreatmentCategory::Cardiology));
        assert_eq!(" DERMATOLOGY ".parse::<TreatmentCategory>(), Ok(TreatmentCategory::Dermatology));
        assert!("astrology".parse::<TreatmentCategory>().is_err());
    }

    #[test]
    fn test_category_serializes_screaming_case() {
        let json = serde_json::to_string(&TreatmentCategory::Orthopedics).unwrap();
        assert_eq!(json, "\"ORTHOPEDICS\"");
    }
}
