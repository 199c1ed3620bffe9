//! Plan model and response parsing.

pub mod model;
pub mod parser;

pub use model::{DAYS_PER_PLAN, DailyPlan, GeneratedPlan, Meal, MealSlot};
pub use parser::{PlanParseError, parse_plan_response, strip_code_fences};
