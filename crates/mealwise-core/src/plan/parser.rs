//! Parser for plan JSON returned by the generation service.
//!
//! Tolerates the model wrapping its payload in markdown code fences, then
//! deserializes with serde and validates:
//! - All plan, day and meal fields are present (serde rejects missing ones).
//! - Calorie figures are non-negative integers.
//! - The plan has at least one day.
//!
//! A daily total that disagrees with the meal sum is logged, never
//! corrected.

use thiserror::Error;

use super::model::{DAYS_PER_PLAN, GeneratedPlan};

/// Relative disagreement between reported total and meal sum that gets
/// logged.
const CALORIE_TOLERANCE: f64 = 0.10;

/// Errors that can occur while parsing a plan payload.
#[derive(Debug, Error)]
pub enum PlanParseError {
    #[error("plan payload is empty")]
    Empty,

    #[error("plan JSON does not match the expected schema: {0}")]
    Json(#[from] serde_json::Error),

    #[error("plan must contain at least one day")]
    NoDays,
}

/// Remove a surrounding markdown code fence (```` ```json ```` or
/// ```` ``` ````) if present.
///
/// Text without a fence is returned trimmed and otherwise untouched.
pub fn strip_code_fences(text: &str) -> &str {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix("```") {
        // Optional language tag right after the opening fence.
        let rest = match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        };
        body = rest.trim_start();
    }

    if let Some(rest) = body.strip_suffix("```") {
        body = rest.trim_end();
    }

    body
}

/// Parse and validate a plan response.
pub fn parse_plan_response(text: &str) -> Result<GeneratedPlan, PlanParseError> {
    let body = strip_code_fences(text);
    if body.is_empty() {
        return Err(PlanParseError::Empty);
    }

    let plan: GeneratedPlan = serde_json::from_str(body)?;
    validate(&plan)?;
    Ok(plan)
}

fn validate(plan: &GeneratedPlan) -> Result<(), PlanParseError> {
    if plan.daily_plans.is_empty() {
        return Err(PlanParseError::NoDays);
    }

    if plan.daily_plans.len() != DAYS_PER_PLAN {
        tracing::warn!(
            days = plan.daily_plans.len(),
            expected = DAYS_PER_PLAN,
            "generated plan does not cover a full week"
        );
    }

    for day in &plan.daily_plans {
        let meal_sum = day.meal_calories();
        let diff = day.calorie_discrepancy().unsigned_abs();
        if meal_sum > 0 && diff as f64 > meal_sum as f64 * CALORIE_TOLERANCE {
            tracing::warn!(
                day = %day.day,
                reported = day.total_calories,
                meal_sum,
                "daily total disagrees with the sum of meals"
            );
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn meal_json(name: &str, calories: &str) -> String {
        format!(
            r#"{{"name":"{name}","description":"tasty","calories":{calories},"protein":"20g"}}"#
        )
    }

    fn day_json(day: &str, breakfast_calories: &str) -> String {
        format!(
            r#"{{"day":"{day}","theme":"Focus","totalCalories":1600,
                "breakfast":{},"lunch":{},"snack":{},"dinner":{},
                "hydrationTip":"Drink water","exerciseSuggestion":"Walk 30 min"}}"#,
            meal_json("Oats", breakfast_calories),
            meal_json("Chicken salad", "500"),
            meal_json("Yogurt", "200"),
            meal_json("Fish", "500"),
        )
    }

    fn plan_json(days: &[String]) -> String {
        format!(
            r#"{{"summary":"A good week","nutritionalStrategy":"High protein",
                "sideEffectManagement":"Sleep well","dailyPlans":[{}]}}"#,
            days.join(",")
        )
    }

    #[test]
    fn parses_plain_payload() {
        let json = plan_json(&[day_json("Monday", "400")]);
        let plan = parse_plan_response(&json).unwrap();
        assert_eq!(plan.summary, "A good week");
        assert_eq!(plan.daily_plans.len(), 1);
        assert_eq!(plan.daily_plans[0].breakfast.name, "Oats");
        assert_eq!(plan.daily_plans[0].total_calories, 1600);
    }

    #[test]
    fn fenced_payload_parses_identically() {
        let json = plan_json(&[day_json("Monday", "400"), day_json("Tuesday", "350")]);
        let fenced = format!("```json\n{json}\n```");
        assert_eq!(
            parse_plan_response(&fenced).unwrap(),
            parse_plan_response(&json).unwrap()
        );
    }

    #[test]
    fn bare_fence_without_language_is_stripped() {
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  ```JSON {\"a\":1}```  "), "{\"a\":1}");
    }

    #[test]
    fn unfenced_text_is_only_trimmed() {
        assert_eq!(strip_code_fences("  {\"a\": 1}\n"), "{\"a\": 1}");
    }

    #[test]
    fn rejects_missing_meal_field() {
        let json = plan_json(&[day_json("Monday", "400")]).replace(r#","protein":"20g""#, "");
        assert!(matches!(
            parse_plan_response(&json),
            Err(PlanParseError::Json(_))
        ));
    }

    #[test]
    fn rejects_fractional_calories() {
        let json = plan_json(&[day_json("Monday", "400.5")]);
        assert!(matches!(
            parse_plan_response(&json),
            Err(PlanParseError::Json(_))
        ));
    }

    #[test]
    fn rejects_empty_week() {
        let json = plan_json(&[]);
        assert!(matches!(parse_plan_response(&json), Err(PlanParseError::NoDays)));
    }

    #[test]
    fn rejects_blank_payload() {
        assert!(matches!(parse_plan_response("```json\n```"), Err(PlanParseError::Empty)));
        assert!(matches!(parse_plan_response("   "), Err(PlanParseError::Empty)));
    }

    #[test]
    fn calorie_mismatch_is_kept_as_reported() {
        // Meals sum to 1000 + breakfast; reported total stays 1600.
        let json = plan_json(&[day_json("Monday", "100")]);
        let plan = parse_plan_response(&json).unwrap();
        let day = &plan.daily_plans[0];
        assert_eq!(day.total_calories, 1600);
        assert_eq!(day.meal_calories(), 1300);
        assert_eq!(day.calorie_discrepancy(), 300);
    }

    #[test]
    fn oversized_calorie_figures_do_not_overflow() {
        let json = plan_json(&[day_json("Monday", &u32::MAX.to_string())]);
        let plan = parse_plan_response(&json).unwrap();
        let day = &plan.daily_plans[0];
        assert_eq!(day.meal_calories(), u64::from(u32::MAX) + 1200);
        assert_eq!(day.calorie_discrepancy(), 1600 - i64::from(u32::MAX) - 1200);
    }
}
