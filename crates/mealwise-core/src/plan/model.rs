//! Plan types as returned by the generation service.
//!
//! Field names are camelCase on the wire so these types deserialize the
//! model's JSON directly. Every field is mandatory: a missing one is a
//! schema violation.

use serde::{Deserialize, Serialize};

/// Number of days a complete weekly plan is expected to cover.
pub const DAYS_PER_PLAN: usize = 7;

/// A weekly nutrition plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPlan {
    /// Motivating overview of the week.
    pub summary: String,
    /// Ordered day-by-day plan.
    pub daily_plans: Vec<DailyPlan>,
    /// Explanation of the nutritional approach.
    pub nutritional_strategy: String,
    /// Wellbeing, digestion and energy tips.
    pub side_effect_management: String,
}

/// One day of the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPlan {
    /// Day label (e.g. "Monday").
    pub day: String,
    /// Focus of the day (e.g. "Recovery", "High protein").
    pub theme: String,
    /// Daily total as reported by the model.
    pub total_calories: u32,
    pub breakfast: Meal,
    pub lunch: Meal,
    pub snack: Meal,
    pub dinner: Meal,
    pub hydration_tip: String,
    pub exercise_suggestion: String,
}

/// A single meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub name: String,
    pub description: String,
    pub calories: u32,
    /// Protein content as free text (e.g. "30g").
    pub protein: String,
}

/// Which meal slot of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Snack,
    Dinner,
}

impl MealSlot {
    pub const ALL: [MealSlot; 4] = [Self::Breakfast, Self::Lunch, Self::Snack, Self::Dinner];

    pub fn label(self) -> &'static str {
        match self {
            Self::Breakfast => "Breakfast",
            Self::Lunch => "Lunch",
            Self::Snack => "Snack",
            Self::Dinner => "Dinner",
        }
    }
}

impl DailyPlan {
    pub fn meal(&self, slot: MealSlot) -> &Meal {
        match slot {
            MealSlot::Breakfast => &self.breakfast,
            MealSlot::Lunch => &self.lunch,
            MealSlot::Snack => &self.snack,
            MealSlot::Dinner => &self.dinner,
        }
    }

    /// Meals in serving order, paired with their slot.
    pub fn meals(&self) -> impl Iterator<Item = (MealSlot, &Meal)> {
        MealSlot::ALL.into_iter().map(|slot| (slot, self.meal(slot)))
    }

    /// Sum of the four meals' calories.
    pub fn meal_calories(&self) -> u64 {
        self.meals().map(|(_, m)| u64::from(m.calories)).sum()
    }

    /// Difference between the reported total and the meal sum.
    ///
    /// The reported total is what gets displayed; this only measures how
    /// far off the model was.
    pub fn calorie_discrepancy(&self) -> i64 {
        let meals: i64 = self.meals().map(|(_, m)| i64::from(m.calories)).sum();
        i64::from(self.total_calories) - meals
    }
}

impl GeneratedPlan {
    /// Average of the reported daily totals, rounded down. Zero for an
    /// empty plan.
    pub fn average_daily_calories(&self) -> u32 {
        if self.daily_plans.is_empty() {
            return 0;
        }
        let total: u64 = self
            .daily_plans
            .iter()
            .map(|d| u64::from(d.total_calories))
            .sum();
        (total / self.daily_plans.len() as u64) as u32
    }
}
