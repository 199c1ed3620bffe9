//! Plan generation gateway.
//!
//! The [`PlanGateway`] trait is the seam between the wizard and the
//! external generation service. Callers only ever see one error type,
//! [`GenerationError`]; the underlying [`GatewayFailure`] is kept for logs.
//!
//! ```text
//! Wizard --submit--> &dyn PlanGateway --generate(profile)--> GeneratedPlan
//!                         |
//!                  GeminiPlanGateway
//!                         |  build_prompt + response_schema
//!                         v
//!                  GeminiClient --POST generateContent--> text
//!                         |  strip fences, serde, validate
//!                         v
//!                  parse_plan_response
//! ```

pub mod prompt;
pub mod schema;

use async_trait::async_trait;
use thiserror::Error;

use crate::gemini::{
    Content, GeminiClient, GeminiError, GenerateContentRequest, GenerationConfig,
};
use crate::plan::{GeneratedPlan, PlanParseError, parse_plan_response};
use crate::profile::UserProfile;

pub use prompt::build_prompt;
pub use schema::response_schema;

/// Language used when none is configured.
pub const DEFAULT_LANGUAGE: &str = "English";

/// Everything that can go wrong while generating a plan.
#[derive(Debug, Error)]
pub enum GatewayFailure {
    #[error(transparent)]
    Service(#[from] GeminiError),

    #[error(transparent)]
    Parse(#[from] PlanParseError),
}

/// The single, uniform failure surfaced to callers of [`PlanGateway`].
#[derive(Debug, Error)]
#[error("failed to generate the plan, please try again")]
pub struct GenerationError {
    #[source]
    cause: GatewayFailure,
}

impl GenerationError {
    pub fn new(cause: impl Into<GatewayFailure>) -> Self {
        Self {
            cause: cause.into(),
        }
    }

    /// The underlying failure, for logging.
    pub fn cause(&self) -> &GatewayFailure {
        &self.cause
    }
}

/// Turns a complete profile into a weekly plan.
///
/// Object-safe so the wizard and the TUI can hold `Arc<dyn PlanGateway>`.
#[async_trait]
pub trait PlanGateway: Send + Sync {
    async fn generate(&self, profile: &UserProfile) -> Result<GeneratedPlan, GenerationError>;
}

// Compile-time assertion: PlanGateway must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn PlanGateway) {}
};

/// [`PlanGateway`] backed by Gemini structured output.
#[derive(Debug, Clone)]
pub struct GeminiPlanGateway {
    client: GeminiClient,
    language: String,
}

impl GeminiPlanGateway {
    pub fn new(client: GeminiClient, language: impl Into<String>) -> Self {
        Self {
            client,
            language: language.into(),
        }
    }

    /// The request body sent for `profile`.
    pub fn build_request(&self, profile: &UserProfile) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user(build_prompt(profile, &self.language))],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(response_schema()),
                temperature: None,
            }),
        }
    }

    async fn try_generate(&self, profile: &UserProfile) -> Result<GeneratedPlan, GatewayFailure> {
        let request = self.build_request(profile);
        let text = self.client.generate_content(&request).await?;
        let plan = parse_plan_response(&text)?;
        Ok(plan)
    }
}

#[async_trait]
impl PlanGateway for GeminiPlanGateway {
    #[tracing::instrument(skip_all, fields(model = %self.client.model()))]
    async fn generate(&self, profile: &UserProfile) -> Result<GeneratedPlan, GenerationError> {
        match self.try_generate(profile).await {
            Ok(plan) => {
                tracing::info!(days = plan.daily_plans.len(), "plan generated");
                Ok(plan)
            }
            Err(cause) => {
                tracing::error!(error = %cause, "plan generation failed");
                Err(GenerationError::new(cause))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::GeminiSettings;

    fn gateway(api_key: Option<&str>) -> GeminiPlanGateway {
        let client = GeminiClient::new(GeminiSettings::new(api_key.map(str::to_string)));
        GeminiPlanGateway::new(client, DEFAULT_LANGUAGE)
    }

    #[test]
    fn request_carries_prompt_and_strict_schema() {
        let request = gateway(Some("k")).build_request(&UserProfile::default());
        assert_eq!(request.contents.len(), 1);
        let text = request.contents[0].parts[0].text.as_deref().unwrap();
        assert!(text.contains("Age: 30"));

        let config = request.generation_config.unwrap();
        assert_eq!(config.response_mime_type.as_deref(), Some("application/json"));
        assert_eq!(config.response_schema.unwrap(), response_schema());
    }

    #[tokio::test]
    async fn missing_credential_is_a_uniform_generation_error() {
        let err = gateway(None)
            .generate(&UserProfile::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "failed to generate the plan, please try again");
        assert!(matches!(
            err.cause(),
            GatewayFailure::Service(GeminiError::MissingApiKey)
        ));
    }

    #[test]
    fn parse_failures_wrap_into_generation_error() {
        let err = GenerationError::new(PlanParseError::NoDays);
        assert!(matches!(err.cause(), GatewayFailure::Parse(PlanParseError::NoDays)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
