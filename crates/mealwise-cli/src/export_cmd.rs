use std::path::Path;

use anyhow::Context;

use mealwise_core::export::render_plan_pdf;
use mealwise_core::plan::{GeneratedPlan, parse_plan_response};

/// Read a plan saved by `mealwise generate --output`. Raw model output,
/// including a fenced code block, is accepted too.
pub fn load_plan(path: &Path) -> anyhow::Result<GeneratedPlan> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read plan {}", path.display()))?;
    parse_plan_response(&contents).with_context(|| format!("invalid plan file {}", path.display()))
}

/// Export a saved plan as a PDF document.
pub fn run_export(plan_path: &Path, output: &Path) -> anyhow::Result<()> {
    let plan = load_plan(plan_path)?;
    let bytes = render_plan_pdf(&plan);

    std::fs::write(output, &bytes)
        .with_context(|| format!("cannot create output file: {}", output.display()))?;

    tracing::info!(days = plan.daily_plans.len(), bytes = bytes.len(), "plan exported");
    println!(
        "Exported {} days to {}",
        plan.daily_plans.len(),
        output.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mealwise_core::export::pdf::extract_text;
    use mealwise_test_utils::sample_plan_json;

    #[test]
    fn export_writes_a_readable_pdf() {
        let dir = tempfile::TempDir::new().unwrap();
        let plan_path = dir.path().join("plan.json");
        let pdf_path = dir.path().join("plan.pdf");
        std::fs::write(&plan_path, sample_plan_json()).unwrap();

        run_export(&plan_path, &pdf_path).unwrap();

        let bytes = std::fs::read(&pdf_path).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        let text = extract_text(&bytes).unwrap().join("\n");
        assert!(text.contains("Monday"));
    }

    #[test]
    fn fenced_plan_file_is_accepted() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("plan.md");
        std::fs::write(&path, format!("```json\n{}\n```", sample_plan_json())).unwrap();
        assert_eq!(load_plan(&path).unwrap().daily_plans.len(), 7);
    }

    #[test]
    fn missing_plan_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = load_plan(&dir.path().join("absent.json")).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read plan"));
    }
}
