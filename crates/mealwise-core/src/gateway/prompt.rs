//! Prompt construction for plan generation (pure logic, no I/O).

use crate::profile::UserProfile;

/// Guidelines appended to every plan request.
const GUIDELINES: &str = "\
IMPORTANT GUIDELINES:
1. Calculate and include the TOTAL DAILY CALORIES (totalCalories) for each day, making sure it suits the client's weight goal.
2. Prioritise protein intake to preserve lean mass.
3. Put strong focus on hydration and food quality.
4. Meals must be nutrient dense and rich in fibre for gut health.
5. The plan must be natural and sustainable.
6. The tone must be professional, encouraging and objective.
7. Do NOT mention medication, injections or any specific drug. Focus only on nutrition and habits.
";

/// Build the natural-language prompt for a weekly plan.
///
/// Every profile field is embedded; `language` names the language the model
/// must answer in.
pub fn build_prompt(profile: &UserProfile, language: &str) -> String {
    let mut prompt = String::with_capacity(2048);

    prompt.push_str(
        "Act as an elite clinical nutritionist and lifestyle coach focused on \
         high-performance weight management and nutritional re-education.\n\n",
    );
    prompt.push_str("Create a highly personalised weekly plan for the following client:\n\n");

    prompt.push_str(&format!("Name: {}\n", profile.name.trim()));
    prompt.push_str(&format!("Age: {}\n", profile.age));
    prompt.push_str(&format!("Gender: {}\n", profile.gender.label()));
    prompt.push_str(&format!("Height: {} cm\n", profile.height));
    prompt.push_str(&format!("Current weight: {} kg\n", profile.current_weight));
    prompt.push_str(&format!("Goal weight: {} kg\n", profile.goal_weight));
    prompt.push_str(&format!("Activity level: {}\n", profile.activity_level.label()));
    prompt.push_str(&format!("Main goal: {}\n", profile.goal.label()));
    prompt.push_str(&format!(
        "Dietary restrictions: {}\n",
        profile.restrictions_or_none()
    ));
    prompt.push_str(&format!(
        "Preferred water intake: {}\n\n",
        profile.water_intake.trim()
    ));

    prompt.push_str(GUIDELINES);
    prompt.push_str(&format!("8. Return everything in {language}.\n"));

    prompt
}
