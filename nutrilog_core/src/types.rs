//! Core domain types for the nutrilog system.
//!
//! This module defines the rows the store persists:
//! - Accounts and their closed-choice attributes (sex, diet plan)
//! - Meal journal entries
//! - The audit projection the administrator sees

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Account Types
// ============================================================================

/// Biological sex, as recorded at registration
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Sex {
    M,
    F,
}

impl Sex {
    /// Parse user input case-insensitively ("m" and "M" both accepted)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "M" => Some(Sex::M),
            "F" => Some(Sex::F),
            _ => None,
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sex::M => write!(f, "M"),
            Sex::F => write!(f, "F"),
        }
    }
}

/// The closed set of diet plans an account can follow
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DietPlan {
    LowCarb,
    Ketogenic,
    HighProtein,
    Bulking,
}

impl DietPlan {
    /// All plans, in menu order
    pub const ALL: [DietPlan; 4] = [
        DietPlan::LowCarb,
        DietPlan::Ketogenic,
        DietPlan::HighProtein,
        DietPlan::Bulking,
    ];

    /// Human-readable plan name
    pub fn name(&self) -> &'static str {
        match self {
            DietPlan::LowCarb => "Low carb",
            DietPlan::Ketogenic => "Ketogenic",
            DietPlan::HighProtein => "High protein",
            DietPlan::Bulking => "Bulking",
        }
    }

    /// Parse a plan by its name, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low carb" => Some(DietPlan::LowCarb),
            "ketogenic" => Some(DietPlan::Ketogenic),
            "high protein" => Some(DietPlan::HighProtein),
            "bulking" => Some(DietPlan::Bulking),
            _ => None,
        }
    }
}

impl std::fmt::Display for DietPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A registered account
///
/// Created exactly once at registration and never mutated afterwards; in
/// particular the BMI is frozen at its registration-time value.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Account {
    pub email: String,
    /// Clear text, compared through `session::CredentialVerifier`
    pub password: String,
    pub weight_kg: f64,
    pub height_m: f64,
    pub sex: Sex,
    pub diet: DietPlan,
    /// weight / height², rounded to two decimals at registration
    pub bmi: f64,
}

/// One row of the administrator's user audit, in registration order
#[derive(Clone, Debug, PartialEq)]
pub struct AccountSummary {
    pub email: String,
    pub diet: DietPlan,
    pub bmi: f64,
}

// ============================================================================
// Meal Journal Types
// ============================================================================

/// One meal recorded against the catalog
///
/// Journal entries are append-only: they are never edited or deleted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogEntry {
    /// Store-assigned, strictly increasing across the journal
    pub id: u64,
    /// References an account by e-mail
    pub email: String,
    /// Normalized catalog name (trimmed, lowercase)
    pub food: String,
    pub grams: f64,
    /// Wall-clock time of creation, whole-second precision
    pub logged_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sex_parse_is_case_insensitive() {
        assert_eq!(Sex::parse("m"), Some(Sex::M));
        assert_eq!(Sex::parse("M"), Some(Sex::M));
        assert_eq!(Sex::parse(" f "), Some(Sex::F));
        assert_eq!(Sex::parse("x"), None);
        assert_eq!(Sex::parse(""), None);
    }

    #[test]
    fn test_diet_parse_round_trips_names() {
        for plan in DietPlan::ALL {
            assert_eq!(DietPlan::parse(plan.name()), Some(plan));
        }
    }

    #[test]
    fn test_diet_parse_rejects_unknown_plans() {
        assert_eq!(DietPlan::parse("Paleo"), None);
        assert_eq!(DietPlan::parse(""), None);
    }

    #[test]
    fn test_diet_parse_is_case_insensitive() {
        assert_eq!(DietPlan::parse("LOW CARB"), Some(DietPlan::LowCarb));
        assert_eq!(DietPlan::parse("high protein"), Some(DietPlan::HighProtein));
    }

    #[test]
    fn test_diet_serializes_snake_case() {
        let json = serde_json::to_string(&DietPlan::HighProtein).unwrap();
        assert_eq!(json, "\"high_protein\"");
    }
}
