//! `mealwise generate` command: run the wizard headlessly from a profile file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use mealwise_core::export::write_plan_pdf;
use mealwise_core::gateway::{GeminiPlanGateway, PlanGateway};
use mealwise_core::notify::Level;
use mealwise_core::plan::GeneratedPlan;
use mealwise_core::profile::UserProfile;
use mealwise_core::wizard::{Step, SubmitOutcome, Wizard};

use crate::config::MealwiseConfig;

/// Options for the generate command.
#[derive(Debug)]
pub struct GenerateOptions {
    pub profile: PathBuf,
    pub accept_terms: bool,
    pub output: Option<PathBuf>,
    pub pdf: Option<PathBuf>,
}

/// Parse a profile TOML file. Missing fields take their defaults.
pub fn load_profile(path: &Path) -> Result<UserProfile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read profile {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("invalid profile {}", path.display()))
}

/// Walk the wizard from the first step to the result with `profile`.
pub async fn generate_plan(
    gateway: &dyn PlanGateway,
    profile: UserProfile,
    accept_terms: bool,
) -> Result<GeneratedPlan> {
    let mut wizard = Wizard::with_profile(profile);
    while wizard.step() != Step::Terms {
        wizard.next()?;
    }
    wizard.set_terms_accepted(accept_terms);

    let outcome = match wizard.submit(gateway).await {
        Ok(outcome) => outcome,
        Err(e) => {
            let reason = wizard
                .take_notifications()
                .into_iter()
                .find(|n| n.level == Level::Error)
                .map(|n| n.message)
                .unwrap_or_else(|| e.to_string());
            anyhow::bail!("{reason} (pass --accept-terms)");
        }
    };

    match outcome {
        SubmitOutcome::Generated => wizard
            .plan()
            .cloned()
            .context("wizard reported success without a plan"),
        SubmitOutcome::Failed | SubmitOutcome::Stale => {
            anyhow::bail!(
                "{}",
                wizard.error().unwrap_or("plan generation did not complete")
            )
        }
    }
}

/// Run the generate command.
pub async fn run_generate(config: &MealwiseConfig, options: &GenerateOptions) -> Result<()> {
    let profile = load_profile(&options.profile)?;
    let gateway = GeminiPlanGateway::new(config.client(), config.language.clone());

    eprintln!("Generating a plan for {}...", display_name(&profile));
    let plan = generate_plan(&gateway, profile, options.accept_terms).await?;

    let json = serde_json::to_string_pretty(&plan).context("failed to serialize plan")?;
    match &options.output {
        Some(path) => {
            std::fs::write(path, format!("{json}\n"))
                .with_context(|| format!("cannot create output file: {}", path.display()))?;
            println!("Plan written to {}", path.display());
        }
        None => println!("{json}"),
    }

    if let Some(path) = &options.pdf {
        write_plan_pdf(&plan, path)
            .with_context(|| format!("failed to write PDF {}", path.display()))?;
        eprintln!("PDF written to {}", path.display());
    }

    Ok(())
}

fn display_name(profile: &UserProfile) -> &str {
    let name = profile.name.trim();
    if name.is_empty() { "you" } else { name }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use mealwise_test_utils::{ScriptedGateway, sample_plan, sample_profile};

    #[tokio::test]
    async fn generates_when_terms_accepted() {
        let gateway = ScriptedGateway::succeeding(sample_plan());
        let plan = generate_plan(&gateway, sample_profile(), true).await.unwrap();
        assert_eq!(plan, sample_plan());
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn refuses_without_terms() {
        let gateway = ScriptedGateway::succeeding(sample_plan());
        let err = generate_plan(&gateway, sample_profile(), false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("accept the terms"), "{err}");
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn reports_generation_failure() {
        let gateway = ScriptedGateway::failing();
        let err = generate_plan(&gateway, sample_profile(), true)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Something went wrong"), "{err}");
    }

    #[test]
    fn profile_file_fills_missing_fields() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("profile.toml");
        std::fs::write(&path, "name = \"Rui\"\nage = 51\ngoal = \"muscle_gain\"\n").unwrap();

        let profile = load_profile(&path).unwrap();
        assert_eq!(profile.name, "Rui");
        assert_eq!(profile.age, 51);
        assert_eq!(profile.water_intake, UserProfile::default().water_intake);
    }
}
