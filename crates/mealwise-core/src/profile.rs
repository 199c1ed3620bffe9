//! The user profile collected by the wizard.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Gender as used for basal metabolism estimates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Self::Male, Self::Female, Self::Other];

    pub fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

impl FromStr for Gender {
    type Err = ProfileParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            other => Err(ProfileParseError::new("gender", other)),
        }
    }
}

// ---------------------------------------------------------------------------

/// Weekly activity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    VeryActive,
    ExtraActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        Self::Sedentary,
        Self::Light,
        Self::Moderate,
        Self::VeryActive,
        Self::ExtraActive,
    ];

    /// Human description used in the prompt and in the wizard.
    pub fn label(self) -> &'static str {
        match self {
            Self::Sedentary => "Sedentary (little or no exercise)",
            Self::Light => "Lightly active (light exercise 1-3 days/week)",
            Self::Moderate => "Moderately active (moderate exercise 3-5 days/week)",
            Self::VeryActive => "Very active (hard exercise 6-7 days/week)",
            Self::ExtraActive => "Extremely active (physical job or very hard training)",
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Sedentary => "sedentary",
            Self::Light => "light",
            Self::Moderate => "moderate",
            Self::VeryActive => "very_active",
            Self::ExtraActive => "extra_active",
        };
        f.write_str(s)
    }
}

impl FromStr for ActivityLevel {
    type Err = ProfileParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sedentary" => Ok(Self::Sedentary),
            "light" => Ok(Self::Light),
            "moderate" => Ok(Self::Moderate),
            "very_active" => Ok(Self::VeryActive),
            "extra_active" => Ok(Self::ExtraActive),
            other => Err(ProfileParseError::new("activity level", other)),
        }
    }
}

// ---------------------------------------------------------------------------

/// Primary goal of the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    WeightLoss,
    Maintenance,
    MuscleGain,
    MetabolicHealth,
}

impl Goal {
    pub const ALL: [Goal; 4] = [
        Self::WeightLoss,
        Self::Maintenance,
        Self::MuscleGain,
        Self::MetabolicHealth,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::WeightLoss => "Accelerated weight loss",
            Self::Maintenance => "Weight maintenance",
            Self::MuscleGain => "Lean mass gain",
            Self::MetabolicHealth => "Metabolic / glycemic control",
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::WeightLoss => "weight_loss",
            Self::Maintenance => "maintenance",
            Self::MuscleGain => "muscle_gain",
            Self::MetabolicHealth => "metabolic_health",
        };
        f.write_str(s)
    }
}

impl FromStr for Goal {
    type Err = ProfileParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weight_loss" => Ok(Self::WeightLoss),
            "maintenance" => Ok(Self::Maintenance),
            "muscle_gain" => Ok(Self::MuscleGain),
            "metabolic_health" => Ok(Self::MetabolicHealth),
            other => Err(ProfileParseError::new("goal", other)),
        }
    }
}

/// Error returned when parsing an invalid enum value of the profile.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid {field}: {value:?}")]
pub struct ProfileParseError {
    pub field: &'static str,
    pub value: String,
}

impl ProfileParseError {
    fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Biometric and lifestyle data for one user.
///
/// The wizard owns exactly one mutable draft and replaces it wholesale on
/// reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    /// Height in centimetres.
    pub height: f64,
    /// Current weight in kilograms.
    pub current_weight: f64,
    /// Target weight in kilograms.
    pub goal_weight: f64,
    pub activity_level: ActivityLevel,
    pub goal: Goal,
    /// Allergies and preferences, free text.
    pub dietary_restrictions: String,
    /// Preferred daily water intake, free text (e.g. "2L").
    pub water_intake: String,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            age: 30,
            gender: Gender::Female,
            height: 165.0,
            current_weight: 80.0,
            goal_weight: 65.0,
            activity_level: ActivityLevel::Light,
            goal: Goal::WeightLoss,
            dietary_restrictions: String::new(),
            water_intake: "2L".to_string(),
        }
    }
}

impl UserProfile {
    /// Restrictions as they should appear in prompts: "None" when blank.
    pub fn restrictions_or_none(&self) -> &str {
        let trimmed = self.dietary_restrictions.trim();
        if trimmed.is_empty() { "None" } else { trimmed }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_matches_initial_draft() {
        let p = UserProfile::default();
        assert!(p.name.is_empty());
        assert_eq!(p.age, 30);
        assert_eq!(p.gender, Gender::Female);
        assert_eq!(p.height, 165.0);
        assert_eq!(p.current_weight, 80.0);
        assert_eq!(p.goal_weight, 65.0);
        assert_eq!(p.activity_level, ActivityLevel::Light);
        assert_eq!(p.goal, Goal::WeightLoss);
        assert_eq!(p.water_intake, "2L");
    }

    #[test]
    fn enum_display_roundtrips_through_from_str() {
        for g in Gender::ALL {
            assert_eq!(g.to_string().parse::<Gender>().unwrap(), g);
        }
        for a in ActivityLevel::ALL {
            assert_eq!(a.to_string().parse::<ActivityLevel>().unwrap(), a);
        }
        for goal in Goal::ALL {
            assert_eq!(goal.to_string().parse::<Goal>().unwrap(), goal);
        }
    }

    #[test]
    fn invalid_enum_value_reports_field() {
        let err = "sometimes".parse::<ActivityLevel>().unwrap_err();
        assert_eq!(err.field, "activity level");
        assert!(err.to_string().contains("sometimes"));
    }

    #[test]
    fn blank_restrictions_render_as_none() {
        let mut p = UserProfile::default();
        p.dietary_restrictions = "   ".to_string();
        assert_eq!(p.restrictions_or_none(), "None");
        p.dietary_restrictions = "peanuts".to_string();
        assert_eq!(p.restrictions_or_none(), "peanuts");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let p: UserProfile = serde_json::from_str(r#"{"name":"Ana","age":41}"#).unwrap();
        assert_eq!(p.name, "Ana");
        assert_eq!(p.age, 41);
        assert_eq!(p.goal_weight, 65.0);
    }
}
