//! Strict response schema sent with every plan request.
//!
//! Uses the OpenAPI subset accepted by Gemini's `responseSchema`: all day
//! and meal fields are required and calorie figures are integers.

use serde_json::{Value, json};

fn meal_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": { "type": "STRING" },
            "description": { "type": "STRING" },
            "calories": { "type": "INTEGER" },
            "protein": { "type": "STRING" }
        },
        "required": ["name", "description", "calories", "protein"]
    })
}

fn day_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "day": { "type": "STRING", "description": "Day name (e.g. Monday)" },
            "theme": { "type": "STRING", "description": "Focus of the day (e.g. Recovery, High protein)" },
            "totalCalories": {
                "type": "INTEGER",
                "description": "Total calories of all meals of the day."
            },
            "hydrationTip": { "type": "STRING", "description": "Hydration tip for the day" },
            "exerciseSuggestion": { "type": "STRING", "description": "Compatible physical activity" },
            "breakfast": meal_schema(),
            "lunch": meal_schema(),
            "snack": meal_schema(),
            "dinner": meal_schema()
        },
        "required": [
            "day", "theme", "totalCalories", "breakfast", "lunch",
            "snack", "dinner", "hydrationTip", "exerciseSuggestion"
        ]
    })
}

/// The full plan schema.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": {
                "type": "STRING",
                "description": "A motivating, strategic overview of the weekly plan."
            },
            "nutritionalStrategy": {
                "type": "STRING",
                "description": "The nutritional strategy adopted (e.g. protein focus, low glycemic index)."
            },
            "sideEffectManagement": {
                "type": "STRING",
                "description": "Wellbeing, digestion and energy tips."
            },
            "dailyPlans": {
                "type": "ARRAY",
                "description": "Detailed plan for 7 days.",
                "items": day_schema()
            }
        },
        "required": ["summary", "dailyPlans", "nutritionalStrategy", "sideEffectManagement"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required(value: &Value) -> Vec<&str> {
        value["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect()
    }

    #[test]
    fn every_day_property_is_required() {
        let schema = response_schema();
        let day = &schema["properties"]["dailyPlans"]["items"];
        let props = day["properties"].as_object().unwrap();
        let req = required(day);
        for key in props.keys() {
            assert!(req.contains(&key.as_str()), "{key} not required");
        }
    }

    #[test]
    fn calories_are_integers() {
        let schema = response_schema();
        let day = &schema["properties"]["dailyPlans"]["items"];
        assert_eq!(day["properties"]["totalCalories"]["type"], "INTEGER");
        for meal in ["breakfast", "lunch", "snack", "dinner"] {
            let m = &day["properties"][meal];
            assert_eq!(m["properties"]["calories"]["type"], "INTEGER");
            assert_eq!(required(m).len(), 4);
        }
    }
}
