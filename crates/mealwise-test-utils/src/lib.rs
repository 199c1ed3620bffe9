//! Shared test utilities for mealwise tests.
//!
//! Fixtures for profiles and plans, plus scripted stand-ins for the
//! external services:
//! - [`ScriptedGateway`]: a [`PlanGateway`] returning queued results, with
//!   an optional gate to hold a request in flight.
//! - [`ScriptedChat`]: a [`ChatBackend`] returning queued replies.
//! - [`MemoryStore`]: an in-memory [`KeyValueStore`] with a quota.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use mealwise_core::chat::{ChatBackend, ChatError, ChatMessage};
use mealwise_core::gateway::{GenerationError, PlanGateway};
use mealwise_core::gemini::GeminiError;
use mealwise_core::plan::{DailyPlan, GeneratedPlan, Meal};
use mealwise_core::profile::{ActivityLevel, Gender, Goal, UserProfile};
use mealwise_core::progress::{KeyValueStore, StorageError};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub fn sample_profile() -> UserProfile {
    UserProfile {
        name: "Ana".to_string(),
        age: 42,
        gender: Gender::Female,
        height: 168.0,
        current_weight: 88.0,
        goal_weight: 72.0,
        activity_level: ActivityLevel::Moderate,
        goal: Goal::WeightLoss,
        dietary_restrictions: "lactose intolerant".to_string(),
        water_intake: "2.5L".to_string(),
    }
}

fn meal(name: &str, calories: u32, protein: &str) -> Meal {
    Meal {
        name: name.to_string(),
        description: format!("{name}, freshly prepared"),
        calories,
        protein: protein.to_string(),
    }
}

/// A consistent day: `total_calories` equals the meal sum.
pub fn sample_day(day: &str, index: u32) -> DailyPlan {
    let breakfast = meal(&format!("Oat bowl {index}"), 350 + index, "18g");
    let lunch = meal(&format!("Grilled chicken salad {index}"), 520, "42g");
    let snack = meal(&format!("Greek yoghurt {index}"), 180, "15g");
    let dinner = meal(&format!("Baked salmon {index}"), 560, "38g");
    let total = breakfast.calories + lunch.calories + snack.calories + dinner.calories;

    DailyPlan {
        day: day.to_string(),
        theme: format!("Theme {index}"),
        total_calories: total,
        breakfast,
        lunch,
        snack,
        dinner,
        hydration_tip: "Drink a glass of water before each meal".to_string(),
        exercise_suggestion: "30 minute brisk walk".to_string(),
    }
}

pub fn sample_plan() -> GeneratedPlan {
    GeneratedPlan {
        summary: "A steady, protein-forward week built around whole foods.".to_string(),
        daily_plans: WEEKDAYS
            .iter()
            .enumerate()
            .map(|(i, day)| sample_day(day, i as u32))
            .collect(),
        nutritional_strategy: "Moderate deficit with protein at every meal.".to_string(),
        side_effect_management: "Eat slowly and keep portions small.".to_string(),
    }
}

/// [`sample_plan`] in the wire format returned by the model.
pub fn sample_plan_json() -> String {
    serde_json::to_string_pretty(&sample_plan()).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// ScriptedGateway
// ---------------------------------------------------------------------------

/// A [`PlanGateway`] that answers from a queue.
///
/// When the queue is empty it fails with a missing-credential error. If
/// gated, each call waits for [`ScriptedGateway::release`] before answering.
#[derive(Default)]
pub struct ScriptedGateway {
    results: Mutex<VecDeque<Result<GeneratedPlan, GenerationError>>>,
    calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn succeeding(plan: GeneratedPlan) -> Self {
        let gateway = Self::new();
        gateway.push_ok(plan);
        gateway
    }

    pub fn failing() -> Self {
        let gateway = Self::new();
        gateway.push_err(GenerationError::new(GeminiError::MissingApiKey));
        gateway
    }

    /// Hold every call until released.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Notify::new()));
        self
    }

    pub fn push_ok(&self, plan: GeneratedPlan) {
        self.lock().push_back(Ok(plan));
    }

    pub fn push_err(&self, error: GenerationError) {
        self.lock().push_back(Err(error));
    }

    /// Let one gated call proceed.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<GeneratedPlan, GenerationError>>> {
        self.results.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl PlanGateway for ScriptedGateway {
    async fn generate(&self, _profile: &UserProfile) -> Result<GeneratedPlan, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.lock()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::new(GeminiError::MissingApiKey)))
    }
}

// ---------------------------------------------------------------------------
// ScriptedChat
// ---------------------------------------------------------------------------

/// A recorded call to [`ScriptedChat`].
#[derive(Debug, Clone)]
pub struct ChatCall {
    pub system: String,
    pub history: Vec<ChatMessage>,
    pub message: String,
}

#[derive(Default)]
pub struct ScriptedChat {
    replies: Mutex<VecDeque<Result<String, ChatError>>>,
    calls: Mutex<Vec<ChatCall>>,
}

impl ScriptedChat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_reply(&self, text: impl Into<String>) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Ok(text.into()));
    }

    pub fn push_failure(&self) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Err(ChatError::Service(GeminiError::MissingApiKey)));
    }

    pub fn calls(&self) -> Vec<ChatCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedChat {
    async fn reply(
        &self,
        system: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, ChatError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ChatCall {
                system: system.to_string(),
                history: history.to_vec(),
                message: message.to_string(),
            });
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(Err(ChatError::EmptyReply))
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-memory [`KeyValueStore`]. Clones share the same contents.
#[derive(Clone)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
    capacity: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_capacity(usize::MAX)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Arc::new(Mutex::new(HashMap::new())),
            capacity,
        }
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    pub fn insert_raw(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        let others: usize = values
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(_, v)| v.len())
            .sum();
        let needed = others + value.len();
        if needed > self.capacity {
            return Err(StorageError::QuotaExceeded {
                needed,
                capacity: self.capacity,
            });
        }
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }
}
