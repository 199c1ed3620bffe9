//! Wizard steps, result tabs and reset kinds.

use std::fmt;

/// Position in the profile wizard.
///
/// ```text
/// Personal  <-> Body <-> Lifestyle <-> Terms
/// Terms      -> Processing
/// Processing -> Result
/// Processing -> Terms     (generation failed)
/// *          -> Personal  (reset)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Step {
    #[default]
    Personal,
    Body,
    Lifestyle,
    Terms,
    Processing,
    Result,
}

impl Step {
    /// The input steps, in order.
    pub const INPUT: [Step; 4] = [Step::Personal, Step::Body, Step::Lifestyle, Step::Terms];

    pub fn is_valid_transition(from: Step, to: Step) -> bool {
        matches!(
            (from, to),
            (Step::Personal, Step::Body)
                | (Step::Body, Step::Lifestyle)
                | (Step::Lifestyle, Step::Terms)
                | (Step::Terms, Step::Lifestyle)
                | (Step::Lifestyle, Step::Body)
                | (Step::Body, Step::Personal)
                | (Step::Terms, Step::Processing)
                | (Step::Processing, Step::Result)
                | (Step::Processing, Step::Terms)
                | (_, Step::Personal)
        )
    }

    /// Following input step, if any.
    pub fn next(self) -> Option<Step> {
        match self {
            Step::Personal => Some(Step::Body),
            Step::Body => Some(Step::Lifestyle),
            Step::Lifestyle => Some(Step::Terms),
            _ => None,
        }
    }

    /// Preceding input step, if any.
    pub fn prev(self) -> Option<Step> {
        match self {
            Step::Body => Some(Step::Personal),
            Step::Lifestyle => Some(Step::Body),
            Step::Terms => Some(Step::Lifestyle),
            _ => None,
        }
    }

    /// Zero-based index among the input steps; `None` otherwise.
    pub fn index(self) -> Option<usize> {
        Self::INPUT.iter().position(|s| *s == self)
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Personal => "About you",
            Step::Body => "Body measurements",
            Step::Lifestyle => "Lifestyle",
            Step::Terms => "Terms",
            Step::Processing => "Generating",
            Step::Result => "Your plan",
        }
    }

    /// Contextual help for the step.
    pub fn help(self) -> &'static str {
        match self {
            Step::Personal => {
                "Fill in your basic details.\n\
                 Name: how the app should call you.\n\
                 Age and gender: used to estimate your basal metabolism."
            }
            Step::Body => {
                "These figures drive your calorie needs.\n\
                 Height: in centimetres (e.g. 165).\n\
                 Goal weight: a realistic target for your first plan."
            }
            Step::Lifestyle => {
                "Match the plan to your real routine.\n\
                 Activity level: be honest to avoid too much or too little energy.\n\
                 Restrictions: list allergies (e.g. peanuts) or preferences \
                 (e.g. vegetarian) so the menu can adapt."
            }
            Step::Terms => {
                "This app uses AI to produce suggestions.\n\
                 It does not replace a doctor. By accepting you confirm these \
                 are wellbeing suggestions only."
            }
            Step::Processing | Step::Result => {
                "Fill in the requested details so the best plan can be built for you."
            }
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Result-view tab, available once a plan exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Home,
    Plan,
    Chat,
    Progress,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Home, Tab::Plan, Tab::Chat, Tab::Progress];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Home => "Home",
            Tab::Plan => "Plan",
            Tab::Chat => "Chat",
            Tab::Progress => "Progress",
        }
    }
}

/// What a confirmed reset wipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetKind {
    /// Profile, plan and the durable progress log.
    Full,
    /// Profile and plan only.
    FormOnly,
}

impl ResetKind {
    pub fn confirmation_prompt(self) -> &'static str {
        match self {
            ResetKind::Full => {
                "Start over? Your profile, plan and progress history will be erased."
            }
            ResetKind::FormOnly => "Clear the form? Your progress history is kept.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_and_backward_edges() {
        for pair in Step::INPUT.windows(2) {
            assert!(Step::is_valid_transition(pair[0], pair[1]));
            assert!(Step::is_valid_transition(pair[1], pair[0]));
            assert_eq!(pair[0].next(), Some(pair[1]));
            assert_eq!(pair[1].prev(), Some(pair[0]));
        }
    }

    #[test]
    fn cannot_skip_steps() {
        assert!(!Step::is_valid_transition(Step::Personal, Step::Lifestyle));
        assert!(!Step::is_valid_transition(Step::Lifestyle, Step::Processing));
        assert!(!Step::is_valid_transition(Step::Result, Step::Terms));
        assert!(!Step::is_valid_transition(Step::Processing, Step::Processing));
    }

    #[test]
    fn every_step_can_reset() {
        for step in [
            Step::Personal,
            Step::Body,
            Step::Lifestyle,
            Step::Terms,
            Step::Processing,
            Step::Result,
        ] {
            assert!(Step::is_valid_transition(step, Step::Personal));
        }
    }

    #[test]
    fn non_input_steps_have_no_neighbours() {
        assert_eq!(Step::Terms.next(), None);
        assert_eq!(Step::Personal.prev(), None);
        assert_eq!(Step::Processing.next(), None);
        assert_eq!(Step::Result.prev(), None);
        assert_eq!(Step::Result.index(), None);
    }
}
