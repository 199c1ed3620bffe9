//! TUI application state and data model.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use mealwise_core::chat::{ChatAssistant, ChatBackend, ChatError};
use mealwise_core::export::write_plan_pdf;
use mealwise_core::gateway::{GenerationError, PlanGateway};
use mealwise_core::notify::Notification;
use mealwise_core::plan::GeneratedPlan;
use mealwise_core::profile::{ActivityLevel, Gender, Goal, UserProfile};
use mealwise_core::progress::{CompressionSettings, NewEntry, ProgressLog};
use mealwise_core::wizard::{
    ResetKind, Step, SubmitOutcome, SubmitTicket, Tab, Wizard, WizardError,
};

use crate::progress_cmd::{PhotoPaths, compress_photos};

// ---------------------------------------------------------------------------
// Form fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Age,
    Gender,
    Height,
    CurrentWeight,
    GoalWeight,
    ActivityLevel,
    Goal,
    DietaryRestrictions,
    WaterIntake,
    AcceptTerms,
}

/// How a field is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Choice,
    Toggle,
}

impl Field {
    /// Fields shown on `step`, top to bottom.
    pub fn for_step(step: Step) -> &'static [Field] {
        match step {
            Step::Personal => &[Field::Name, Field::Age, Field::Gender],
            Step::Body => &[Field::Height, Field::CurrentWeight, Field::GoalWeight],
            Step::Lifestyle => &[
                Field::ActivityLevel,
                Field::Goal,
                Field::DietaryRestrictions,
                Field::WaterIntake,
            ],
            Step::Terms => &[Field::AcceptTerms],
            Step::Processing | Step::Result => &[],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Age => "Age",
            Field::Gender => "Gender",
            Field::Height => "Height (cm)",
            Field::CurrentWeight => "Current weight (kg)",
            Field::GoalWeight => "Goal weight (kg)",
            Field::ActivityLevel => "Activity level",
            Field::Goal => "Main goal",
            Field::DietaryRestrictions => "Restrictions / allergies",
            Field::WaterIntake => "Daily water intake",
            Field::AcceptTerms => "I accept the terms of use",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Name | Field::DietaryRestrictions | Field::WaterIntake => FieldKind::Text,
            Field::Age | Field::Height | Field::CurrentWeight | Field::GoalWeight => {
                FieldKind::Number
            }
            Field::Gender | Field::ActivityLevel | Field::Goal => FieldKind::Choice,
            Field::AcceptTerms => FieldKind::Toggle,
        }
    }

    /// Current value as shown in the form.
    pub fn display(self, profile: &UserProfile, terms_accepted: bool) -> String {
        match self {
            Field::Name => profile.name.clone(),
            Field::Age => profile.age.to_string(),
            Field::Gender => profile.gender.label().to_string(),
            Field::Height => format_number(profile.height),
            Field::CurrentWeight => format_number(profile.current_weight),
            Field::GoalWeight => format_number(profile.goal_weight),
            Field::ActivityLevel => profile.activity_level.label().to_string(),
            Field::Goal => profile.goal.label().to_string(),
            Field::DietaryRestrictions => profile.dietary_restrictions.clone(),
            Field::WaterIntake => profile.water_intake.clone(),
            Field::AcceptTerms => if terms_accepted { "[x]" } else { "[ ]" }.to_string(),
        }
    }

    fn text_mut(self, profile: &mut UserProfile) -> Option<&mut String> {
        match self {
            Field::Name => Some(&mut profile.name),
            Field::DietaryRestrictions => Some(&mut profile.dietary_restrictions),
            Field::WaterIntake => Some(&mut profile.water_intake),
            _ => None,
        }
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
    let len = all.len();
    let idx = all.iter().position(|v| *v == current).unwrap_or(0);
    let next = if forward {
        (idx + 1) % len
    } else {
        (idx + len - 1) % len
    };
    all[next]
}

// ---------------------------------------------------------------------------
// Progress form
// ---------------------------------------------------------------------------

pub const PROGRESS_FIELDS: [&str; 5] = [
    "Weight (kg)",
    "Notes",
    "Front photo",
    "Back photo",
    "Side photo",
];

/// Draft of the next progress entry. Photo slots hold file paths.
#[derive(Debug, Clone, Default)]
pub struct ProgressForm {
    pub weight: String,
    pub notes: String,
    pub front: String,
    pub back: String,
    pub side: String,
    pub selected: usize,
}

impl ProgressForm {
    pub fn value(&self, index: usize) -> &str {
        match index {
            0 => &self.weight,
            1 => &self.notes,
            2 => &self.front,
            3 => &self.back,
            _ => &self.side,
        }
    }

    fn selected_mut(&mut self) -> &mut String {
        match self.selected {
            0 => &mut self.weight,
            1 => &mut self.notes,
            2 => &mut self.front,
            3 => &mut self.back,
            _ => &mut self.side,
        }
    }

    fn photo_paths(&self) -> PhotoPaths {
        let path = |s: &str| {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
        };
        PhotoPaths {
            front: path(&self.front),
            back: path(&self.back),
            side: path(&self.side),
        }
    }
}

// ---------------------------------------------------------------------------
// Background results
// ---------------------------------------------------------------------------

/// Results of work spawned off the event loop.
#[derive(Debug)]
pub enum AppEvent {
    PlanFinished {
        ticket: SubmitTicket,
        result: Result<GeneratedPlan, GenerationError>,
    },
    ChatFinished {
        generation: u64,
        result: Result<String, ChatError>,
    },
    PhotosReady {
        generation: u64,
        entry: NewEntry,
        failures: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Application state for the TUI.
pub struct App {
    pub wizard: Wizard,
    pub progress: ProgressLog,
    pub chat: ChatAssistant,
    gateway: Arc<dyn PlanGateway>,
    chat_backend: Arc<dyn ChatBackend>,
    events: mpsc::UnboundedSender<AppEvent>,
    language: String,
    pub compression: CompressionSettings,
    pub export_path: PathBuf,
    pub selected_field: usize,
    /// Edit buffer for the focused numeric field.
    pub number_input: Option<String>,
    pub selected_day: usize,
    pub chat_input: String,
    pub progress_form: ProgressForm,
    pub photos_pending: bool,
    pub show_help: bool,
    pub toasts: Vec<Notification>,
    pub scroll: u16,
    pub tick_rate: Duration,
    pub should_quit: bool,
    pub status_message: Option<String>,
    seen_generation: u64,
}

impl App {
    pub fn new(
        gateway: Arc<dyn PlanGateway>,
        chat_backend: Arc<dyn ChatBackend>,
        progress: ProgressLog,
        language: impl Into<String>,
    ) -> (Self, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let language = language.into();
        let app = Self {
            wizard: Wizard::new(),
            progress,
            chat: ChatAssistant::new(language.clone()),
            gateway,
            chat_backend,
            events: tx,
            language,
            compression: CompressionSettings::default(),
            export_path: PathBuf::from(mealwise_core::export::DEFAULT_FILE_NAME),
            selected_field: 0,
            number_input: None,
            selected_day: 0,
            chat_input: String::new(),
            progress_form: ProgressForm::default(),
            photos_pending: false,
            show_help: false,
            toasts: Vec::new(),
            scroll: 0,
            tick_rate: Duration::from_millis(100),
            should_quit: false,
            status_message: None,
            seen_generation: 0,
        };
        (app, rx)
    }

    // -- Housekeeping --

    /// Collect wizard notifications, expire old toasts and reset per-view
    /// state after a wizard reset.
    pub fn tick(&mut self, now: Instant) {
        self.toasts.extend(self.wizard.take_notifications());
        self.toasts.retain(|t| !t.is_expired_at(now));

        if self.wizard.generation() != self.seen_generation {
            self.seen_generation = self.wizard.generation();
            self.remount();
        }
    }

    fn remount(&mut self) {
        self.chat = ChatAssistant::new(self.language.clone());
        self.selected_field = 0;
        self.number_input = None;
        self.selected_day = 0;
        self.chat_input.clear();
        self.progress_form = ProgressForm::default();
        self.photos_pending = false;
        self.scroll = 0;
    }

    fn toast(&mut self, notification: Notification) {
        self.toasts.push(notification);
    }

    // -- Wizard form --

    pub fn fields(&self) -> &'static [Field] {
        Field::for_step(self.wizard.step())
    }

    pub fn focused_field(&self) -> Option<Field> {
        self.fields().get(self.selected_field).copied()
    }

    pub fn move_up(&mut self) {
        self.commit_number();
        if self.selected_field > 0 {
            self.selected_field -= 1;
        }
    }

    pub fn move_down(&mut self) {
        self.commit_number();
        let len = self.fields().len();
        if len > 0 && self.selected_field < len - 1 {
            self.selected_field += 1;
        }
    }

    pub fn type_char(&mut self, c: char) {
        let Some(field) = self.focused_field() else {
            return;
        };
        match field.kind() {
            FieldKind::Text => {
                if let Some(text) = field.text_mut(self.wizard.profile_mut()) {
                    text.push(c);
                }
            }
            FieldKind::Number => {
                if c.is_ascii_digit() || (c == '.' && field != Field::Age) {
                    self.number_input.get_or_insert_with(String::new).push(c);
                }
            }
            FieldKind::Toggle => {
                if c == ' ' {
                    self.toggle_terms();
                }
            }
            FieldKind::Choice => {
                if c == ' ' {
                    self.cycle_choice(true);
                }
            }
        }
    }

    pub fn backspace(&mut self) {
        let Some(field) = self.focused_field() else {
            return;
        };
        match field.kind() {
            FieldKind::Text => {
                if let Some(text) = field.text_mut(self.wizard.profile_mut()) {
                    text.pop();
                }
            }
            FieldKind::Number => {
                let current = field.display(self.wizard.profile(), false);
                self.number_input.get_or_insert(current).pop();
            }
            FieldKind::Choice | FieldKind::Toggle => {}
        }
    }

    pub fn cycle_choice(&mut self, forward: bool) {
        let Some(field) = self.focused_field() else {
            return;
        };
        if field == Field::AcceptTerms {
            self.toggle_terms();
            return;
        }
        let profile = self.wizard.profile_mut();
        match field {
            Field::Gender => profile.gender = cycle(&Gender::ALL, profile.gender, forward),
            Field::ActivityLevel => {
                profile.activity_level =
                    cycle(&ActivityLevel::ALL, profile.activity_level, forward)
            }
            Field::Goal => profile.goal = cycle(&Goal::ALL, profile.goal, forward),
            _ => {}
        }
    }

    pub fn toggle_terms(&mut self) {
        let accepted = !self.wizard.terms_accepted();
        self.wizard.set_terms_accepted(accepted);
    }

    /// Apply the numeric edit buffer to the profile. Invalid input is
    /// discarded with an error toast.
    pub fn commit_number(&mut self) -> bool {
        let Some(buffer) = self.number_input.take() else {
            return true;
        };
        let Some(field) = self.focused_field() else {
            return true;
        };
        let profile = self.wizard.profile_mut();
        let applied = match field {
            Field::Age => match buffer.trim().parse::<u32>() {
                Ok(age) if age > 0 => {
                    profile.age = age;
                    true
                }
                _ => false,
            },
            Field::Height | Field::CurrentWeight | Field::GoalWeight => {
                match buffer.trim().parse::<f64>() {
                    Ok(v) if v.is_finite() && v > 0.0 => {
                        match field {
                            Field::Height => profile.height = v,
                            Field::CurrentWeight => profile.current_weight = v,
                            _ => profile.goal_weight = v,
                        }
                        true
                    }
                    _ => false,
                }
            }
            _ => true,
        };
        if !applied {
            self.toast(Notification::error(format!(
                "{} must be a positive number.",
                field.label()
            )));
        }
        applied
    }

    /// Enter on an input step: next step, or submit from the terms step.
    pub fn advance(&mut self) {
        self.commit_number();
        if self.wizard.step() == Step::Terms {
            self.submit();
            return;
        }
        if self.wizard.next().is_ok() {
            self.selected_field = 0;
            self.scroll = 0;
        }
    }

    pub fn go_back(&mut self) {
        self.commit_number();
        if self.wizard.prev().is_ok() {
            self.selected_field = 0;
            self.scroll = 0;
        }
    }

    /// Start plan generation on a background task.
    pub fn submit(&mut self) {
        match self.wizard.begin_submit() {
            Ok(ticket) => {
                let gateway = Arc::clone(&self.gateway);
                let tx = self.events.clone();
                tokio::spawn(async move {
                    let result = gateway.generate(&ticket.profile).await;
                    let _ = tx.send(AppEvent::PlanFinished { ticket, result });
                });
                self.scroll = 0;
            }
            // The wizard already queued a toast.
            Err(WizardError::TermsNotAccepted) => {}
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    // -- Result tabs --

    pub fn cycle_tab(&mut self, forward: bool) {
        let next = cycle(&Tab::ALL, self.wizard.tab(), forward);
        if let Err(e) = self.wizard.select_tab(next) {
            self.status_message = Some(e.to_string());
            return;
        }
        self.scroll = 0;
        if next == Tab::Chat {
            self.chat.ensure_session(self.wizard.plan());
        }
    }

    pub fn day_count(&self) -> usize {
        self.wizard.plan().map_or(0, |p| p.daily_plans.len())
    }

    pub fn next_day(&mut self) {
        let days = self.day_count();
        if days > 0 && self.selected_day < days - 1 {
            self.selected_day += 1;
        }
    }

    pub fn prev_day(&mut self) {
        self.selected_day = self.selected_day.saturating_sub(1);
    }

    pub fn export_pdf(&mut self) {
        let Some(plan) = self.wizard.plan() else {
            self.toast(Notification::error("Generate a plan before exporting."));
            return;
        };
        match write_plan_pdf(plan, &self.export_path) {
            Ok(()) => {
                let message = format!("PDF saved to {}", self.export_path.display());
                self.toast(Notification::success(message));
            }
            Err(e) => {
                tracing::error!(error = %e, "PDF export failed");
                self.toast(Notification::error(format!("Could not save the PDF: {e}")));
            }
        }
    }

    pub fn send_chat(&mut self) {
        self.chat.ensure_session(self.wizard.plan());
        let Some(pending) = self.chat.begin_send(&self.chat_input) else {
            return;
        };
        self.chat_input.clear();

        let backend = Arc::clone(&self.chat_backend);
        let tx = self.events.clone();
        let generation = self.wizard.generation();
        tokio::spawn(async move {
            let result = backend
                .reply(&pending.system, &pending.history, &pending.message)
                .await;
            let _ = tx.send(AppEvent::ChatFinished { generation, result });
        });
    }

    pub fn progress_move(&mut self, down: bool) {
        let form = &mut self.progress_form;
        if down {
            form.selected = (form.selected + 1).min(PROGRESS_FIELDS.len() - 1);
        } else {
            form.selected = form.selected.saturating_sub(1);
        }
    }

    pub fn progress_type(&mut self, c: char) {
        self.progress_form.selected_mut().push(c);
    }

    pub fn progress_backspace(&mut self) {
        self.progress_form.selected_mut().pop();
    }

    /// Validate the draft and compress its photos in the background.
    pub fn save_progress(&mut self) {
        if self.photos_pending {
            return;
        }
        let weight = match self.progress_form.weight.trim().replace(',', ".").parse::<f64>() {
            Ok(w) if w.is_finite() && w > 0.0 => w,
            _ => {
                self.toast(Notification::error("Enter your current weight in kg."));
                return;
            }
        };
        let notes = Some(self.progress_form.notes.clone());
        let paths = self.progress_form.photo_paths();
        let settings = self.compression;
        let generation = self.wizard.generation();
        let tx = self.events.clone();

        self.photos_pending = true;
        tokio::spawn(async move {
            let (photos, failures) = compress_photos(paths, settings).await;
            let entry = NewEntry {
                weight,
                notes,
                photos,
            };
            let _ = tx.send(AppEvent::PhotosReady {
                generation,
                entry,
                failures,
            });
        });
    }

    // -- Background results --

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::PlanFinished { ticket, result } => {
                if self.wizard.finish_submit(ticket, result) == SubmitOutcome::Generated {
                    self.selected_day = 0;
                    self.scroll = 0;
                    self.chat.ensure_session(self.wizard.plan());
                }
            }
            AppEvent::ChatFinished { generation, result } => {
                if generation != self.wizard.generation() {
                    tracing::debug!(generation, "dropping chat reply from before reset");
                    return;
                }
                self.chat.finish_send(result);
            }
            AppEvent::PhotosReady {
                generation,
                entry,
                failures,
            } => {
                if generation != self.wizard.generation() {
                    tracing::debug!(generation, "dropping progress entry from before reset");
                    return;
                }
                self.photos_pending = false;
                for failure in failures {
                    self.toast(Notification::error(failure));
                }
                match self.progress.record(entry) {
                    Ok(outcome) => {
                        self.toast(Notification::success("Progress saved!"));
                        if let Some(warning) = outcome.warning {
                            self.toast(Notification::info(warning.to_string()));
                        }
                        self.progress_form = ProgressForm::default();
                    }
                    Err(e) => {
                        self.toast(Notification::error(format!("Could not save progress: {e}")));
                    }
                }
            }
        }
    }

    // -- Reset --

    pub fn request_reset(&mut self, kind: ResetKind) {
        self.wizard.request_reset(kind);
    }

    pub fn cancel_reset(&mut self) {
        self.wizard.cancel_reset();
    }

    pub fn confirm_reset(&mut self) {
        if let Err(e) = self.wizard.confirm_reset(&mut self.progress) {
            tracing::error!(error = %e, "reset did not complete");
        }
        self.tick(Instant::now());
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
