//! Profile wizard state machine.
//!
//! Owns the profile draft, the generated plan and the navigation state.
//! Plan submission is split in two phases so a UI can run the gateway call
//! on a background task: [`Wizard::begin_submit`] hands out a
//! [`SubmitTicket`] and [`Wizard::finish_submit`] applies the result.
//! Tickets carry the reset generation they were issued under; a result for
//! a ticket issued before the latest reset is dropped.

pub mod step;

use thiserror::Error;

use crate::gateway::{GenerationError, PlanGateway};
use crate::notify::Notification;
use crate::plan::GeneratedPlan;
use crate::profile::UserProfile;
use crate::progress::{ProgressLog, StorageError};

pub use step::{ResetKind, Step, Tab};

pub const TERMS_REQUIRED_MESSAGE: &str = "You need to accept the terms to continue.";

pub const GENERATION_FAILED_MESSAGE: &str = "Something went wrong while generating your plan. \
     Check that the API key is configured and try again.";

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("invalid wizard transition: {from:?} -> {to:?}")]
    InvalidTransition { from: Step, to: Step },

    #[error("you need to accept the terms to continue")]
    TermsNotAccepted,

    #[error("a plan is already being generated")]
    SubmitInFlight,

    #[error("no plan has been generated yet")]
    NoPlan,

    #[error("no reset is waiting for confirmation")]
    NoPendingReset,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Proof that a submission was started, plus the profile snapshot to send.
#[derive(Debug, Clone)]
pub struct SubmitTicket {
    generation: u64,
    pub profile: UserProfile,
}

impl SubmitTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What [`Wizard::finish_submit`] did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Generated,
    Failed,
    /// The ticket predates a reset; the result was discarded.
    Stale,
}

#[derive(Debug, Default)]
pub struct Wizard {
    step: Step,
    profile: UserProfile,
    plan: Option<GeneratedPlan>,
    terms_accepted: bool,
    tab: Tab,
    error: Option<String>,
    pending_reset: Option<ResetKind>,
    generation: u64,
    notifications: Vec<Notification>,
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a pre-filled draft.
    pub fn with_profile(profile: UserProfile) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }

    // -- accessors ----------------------------------------------------------

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut UserProfile {
        &mut self.profile
    }

    pub fn plan(&self) -> Option<&GeneratedPlan> {
        self.plan.as_ref()
    }

    pub fn terms_accepted(&self) -> bool {
        self.terms_accepted
    }

    pub fn set_terms_accepted(&mut self, accepted: bool) {
        self.terms_accepted = accepted;
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    /// Inline, retryable error shown on the terms step.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn pending_reset(&self) -> Option<ResetKind> {
        self.pending_reset
    }

    /// Incremented by every confirmed reset.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_submitting(&self) -> bool {
        self.step == Step::Processing
    }

    pub fn help(&self) -> &'static str {
        self.step.help()
    }

    /// Wizard progress bar value, 0-100.
    pub fn completion_percent(&self) -> u8 {
        let index = match self.step {
            Step::Processing | Step::Result => Step::INPUT.len(),
            step => step.index().unwrap_or(0),
        };
        (index * 100 / Step::INPUT.len()) as u8
    }

    /// Remove and return queued notifications.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    // -- navigation ---------------------------------------------------------

    fn transition(&mut self, to: Step) -> Result<(), WizardError> {
        if !Step::is_valid_transition(self.step, to) {
            return Err(WizardError::InvalidTransition {
                from: self.step,
                to,
            });
        }
        tracing::debug!(from = ?self.step, to = ?to, "wizard transition");
        self.step = to;
        Ok(())
    }

    pub fn next(&mut self) -> Result<Step, WizardError> {
        let to = self.step.next().ok_or(WizardError::InvalidTransition {
            from: self.step,
            to: self.step,
        })?;
        self.transition(to)?;
        Ok(to)
    }

    pub fn prev(&mut self) -> Result<Step, WizardError> {
        let to = self.step.prev().ok_or(WizardError::InvalidTransition {
            from: self.step,
            to: self.step,
        })?;
        self.transition(to)?;
        Ok(to)
    }

    pub fn select_tab(&mut self, tab: Tab) -> Result<(), WizardError> {
        if self.plan.is_none() {
            return Err(WizardError::NoPlan);
        }
        self.tab = tab;
        Ok(())
    }

    // -- submission ---------------------------------------------------------

    pub fn begin_submit(&mut self) -> Result<SubmitTicket, WizardError> {
        if self.step == Step::Processing {
            return Err(WizardError::SubmitInFlight);
        }
        if self.step != Step::Terms {
            return Err(WizardError::InvalidTransition {
                from: self.step,
                to: Step::Processing,
            });
        }
        if !self.terms_accepted {
            self.notifications
                .push(Notification::error(TERMS_REQUIRED_MESSAGE));
            return Err(WizardError::TermsNotAccepted);
        }

        self.transition(Step::Processing)?;
        self.tab = Tab::Home;
        self.error = None;
        tracing::info!(generation = self.generation, "plan submission started");

        Ok(SubmitTicket {
            generation: self.generation,
            profile: self.profile.clone(),
        })
    }

    pub fn finish_submit(
        &mut self,
        ticket: SubmitTicket,
        result: Result<GeneratedPlan, GenerationError>,
    ) -> SubmitOutcome {
        if ticket.generation != self.generation || self.step != Step::Processing {
            tracing::info!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale generation result"
            );
            return SubmitOutcome::Stale;
        }

        match result {
            Ok(plan) => {
                self.plan = Some(plan);
                self.step = Step::Result;
                self.tab = Tab::Plan;
                self.notifications
                    .push(Notification::success("Plan generated successfully!"));
                SubmitOutcome::Generated
            }
            Err(error) => {
                tracing::warn!(error = %error, cause = %error.cause(), "plan submission failed");
                self.step = Step::Terms;
                self.error = Some(GENERATION_FAILED_MESSAGE.to_string());
                self.notifications
                    .push(Notification::error("Could not reach the AI service."));
                SubmitOutcome::Failed
            }
        }
    }

    /// Run both submission phases against `gateway`.
    pub async fn submit(
        &mut self,
        gateway: &dyn PlanGateway,
    ) -> Result<SubmitOutcome, WizardError> {
        let ticket = self.begin_submit()?;
        let result = gateway.generate(&ticket.profile).await;
        Ok(self.finish_submit(ticket, result))
    }

    // -- reset --------------------------------------------------------------

    /// Open the confirmation prompt for a reset of `kind`.
    pub fn request_reset(&mut self, kind: ResetKind) {
        self.pending_reset = Some(kind);
    }

    pub fn cancel_reset(&mut self) {
        self.pending_reset = None;
    }

    /// Execute the pending reset. A full reset also clears `progress`.
    ///
    /// The form is reset even when clearing the progress log fails; the
    /// storage error is returned afterwards.
    pub fn confirm_reset(&mut self, progress: &mut ProgressLog) -> Result<ResetKind, WizardError> {
        let kind = self.pending_reset.take().ok_or(WizardError::NoPendingReset)?;

        self.profile = UserProfile::default();
        self.plan = None;
        self.terms_accepted = false;
        self.error = None;
        self.step = Step::Personal;
        self.tab = Tab::Home;
        self.generation += 1;
        tracing::info!(?kind, generation = self.generation, "wizard reset");

        match kind {
            ResetKind::Full => {
                if let Err(error) = progress.clear() {
                    self.notifications.push(Notification::error(format!(
                        "Form reset, but progress history could not be erased: {error}"
                    )));
                    return Err(error.into());
                }
                self.notifications
                    .push(Notification::info("Plan and history reset."));
            }
            ResetKind::FormOnly => {
                self.notifications.push(Notification::info("Form cleared."));
            }
        }
        Ok(kind)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Level;

    fn at_terms() -> Wizard {
        let mut w = Wizard::new();
        w.next().unwrap();
        w.next().unwrap();
        w.next().unwrap();
        assert_eq!(w.step(), Step::Terms);
        w
    }

    #[test]
    fn next_then_prev_keeps_the_draft() {
        let mut w = Wizard::new();
        w.profile_mut().name = "Ana".into();
        w.profile_mut().current_weight = 91.5;
        let before = w.profile().clone();

        w.next().unwrap();
        w.prev().unwrap();
        assert_eq!(w.step(), Step::Personal);
        assert_eq!(w.profile(), &before);
    }

    #[test]
    fn cannot_step_outside_the_input_steps() {
        let mut w = Wizard::new();
        assert!(matches!(w.prev(), Err(WizardError::InvalidTransition { .. })));
        let mut w = at_terms();
        assert!(matches!(w.next(), Err(WizardError::InvalidTransition { .. })));
        assert_eq!(w.step(), Step::Terms);
    }

    #[test]
    fn submit_requires_terms() {
        let mut w = at_terms();
        assert!(matches!(w.begin_submit(), Err(WizardError::TermsNotAccepted)));
        assert_eq!(w.step(), Step::Terms);
        let toasts = w.take_notifications();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].level, Level::Error);
    }

    #[test]
    fn submit_only_from_terms() {
        let mut w = Wizard::new();
        w.set_terms_accepted(true);
        assert!(matches!(
            w.begin_submit(),
            Err(WizardError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn second_submit_while_processing_is_refused() {
        let mut w = at_terms();
        w.set_terms_accepted(true);
        let _ticket = w.begin_submit().unwrap();
        assert!(w.is_submitting());
        assert!(matches!(w.begin_submit(), Err(WizardError::SubmitInFlight)));
    }

    #[test]
    fn completion_percent_tracks_step() {
        let mut w = Wizard::new();
        assert_eq!(w.completion_percent(), 0);
        w.next().unwrap();
        assert_eq!(w.completion_percent(), 25);
        w.next().unwrap();
        w.next().unwrap();
        assert_eq!(w.completion_percent(), 75);
    }

    #[test]
    fn tabs_need_a_plan() {
        let mut w = Wizard::new();
        assert!(matches!(w.select_tab(Tab::Chat), Err(WizardError::NoPlan)));
        assert_eq!(w.tab(), Tab::Home);
    }

    #[test]
    fn reset_request_can_be_cancelled() {
        let mut w = Wizard::new();
        w.request_reset(ResetKind::Full);
        assert_eq!(w.pending_reset(), Some(ResetKind::Full));
        w.cancel_reset();
        assert_eq!(w.pending_reset(), None);
        assert_eq!(w.generation(), 0);
    }

    #[test]
    fn help_follows_the_step() {
        let mut w = Wizard::new();
        let first = w.help();
        w.next().unwrap();
        assert_ne!(w.help(), first);
        assert!(w.help().contains("Height"));
    }
}
