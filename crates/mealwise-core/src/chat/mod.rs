//! Plan-aware conversational assistant.
//!
//! A [`ChatAssistant`] owns the visible transcript and the context history
//! sent with each request. The session (system framing built from the
//! plan) is created lazily the first time a plan is available and is never
//! rebuilt afterwards. Sending is two-phase like plan submission:
//! [`ChatAssistant::begin_send`] appends the user message optimistically
//! and [`ChatAssistant::finish_send`] appends the reply or an apology.

pub mod markup;

use async_trait::async_trait;
use thiserror::Error;

use crate::gemini::{Content, GeminiClient, GeminiError, GenerateContentRequest};
use crate::plan::GeneratedPlan;

pub const GREETING: &str =
    "Hi! I'm your virtual nutritionist. How can I help with your meal plan and habits today?";

pub const APOLOGY: &str = "Sorry, I had a problem processing your answer. Please try again.";

pub const UNAVAILABLE: &str = "Generate your nutrition plan first to enable the chat.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Service(#[from] GeminiError),

    #[error("the assistant returned an empty reply")]
    EmptyReply,
}

/// Sends one turn of a conversation.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn reply(
        &self,
        system: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, ChatError>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn ChatBackend) {}
};

/// [`ChatBackend`] over the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiChatBackend {
    client: GeminiClient,
}

impl GeminiChatBackend {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }

    pub fn build_request(
        system: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> GenerateContentRequest {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|m| match m.role {
                ChatRole::User => Content::user(m.text.clone()),
                ChatRole::Assistant => Content::model(m.text.clone()),
            })
            .collect();
        contents.push(Content::user(message));

        GenerateContentRequest {
            contents,
            system_instruction: Some(Content::system(system)),
            generation_config: None,
        }
    }
}

#[async_trait]
impl ChatBackend for GeminiChatBackend {
    #[tracing::instrument(skip_all, fields(model = %self.client.model(), turns = history.len()))]
    async fn reply(
        &self,
        system: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, ChatError> {
        let request = Self::build_request(system, history, message);
        let text = self.client.generate_content(&request).await?;
        if text.trim().is_empty() {
            return Err(ChatError::EmptyReply);
        }
        Ok(text)
    }
}

/// System framing for a plan.
pub fn build_system_instruction(plan: &GeneratedPlan, language: &str) -> String {
    format!(
        "You are a nutritionist and lifestyle coach specialised in healthy weight loss.\n\n\
         BEHAVIOUR RULES:\n\
         1. Be objective, concise and direct.\n\
         2. When asked a specific question, give the direct answer followed by a brief explanation.\n\
         3. Do NOT mention, recommend or discuss any specific medication or drug.\n\
         4. USE FORMATTING: separate paragraphs with line breaks, use hyphens for lists \
         and highlight key words with **bold**.\n\n\
         USER CONTEXT (GENERATED PLAN):\n{}\n\n\
         STRATEGY:\n{}\n\n\
         GENERAL TIPS:\n{}\n\n\
         Always answer in {}.",
        plan.summary, plan.nutritional_strategy, plan.side_effect_management, language
    )
}

/// An established conversation context.
#[derive(Debug, Clone)]
pub struct ChatSession {
    system_instruction: String,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// Turns already exchanged, oldest first.
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }
}

/// A request produced by [`ChatAssistant::begin_send`].
#[derive(Debug, Clone)]
pub struct PendingSend {
    pub system: String,
    pub history: Vec<ChatMessage>,
    pub message: String,
}

#[derive(Debug)]
pub struct ChatAssistant {
    language: String,
    session: Option<ChatSession>,
    transcript: Vec<ChatMessage>,
    in_flight: Option<String>,
}

impl ChatAssistant {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            session: None,
            transcript: vec![ChatMessage::assistant(GREETING)],
            in_flight: None,
        }
    }

    /// Create the session the first time a plan is available. Returns
    /// whether a session exists.
    pub fn ensure_session(&mut self, plan: Option<&GeneratedPlan>) -> bool {
        if self.session.is_none() {
            if let Some(plan) = plan {
                tracing::debug!("chat session established");
                self.session = Some(ChatSession {
                    system_instruction: build_system_instruction(plan, &self.language),
                    history: Vec::new(),
                });
            }
        }
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&ChatSession> {
        self.session.as_ref()
    }

    /// Everything shown to the user, greeting first.
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn is_waiting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Queue `input` for sending. Returns `None` for blank input, without a
    /// session, or while a reply is outstanding.
    pub fn begin_send(&mut self, input: &str) -> Option<PendingSend> {
        if input.trim().is_empty() || self.in_flight.is_some() {
            return None;
        }
        let session = self.session.as_ref()?;

        let pending = PendingSend {
            system: session.system_instruction.clone(),
            history: session.history.clone(),
            message: input.to_string(),
        };
        self.transcript.push(ChatMessage::user(input));
        self.in_flight = Some(input.to_string());
        Some(pending)
    }

    /// Record the outcome of the outstanding send. Failures become the
    /// apology message and never reach the caller.
    pub fn finish_send(&mut self, result: Result<String, ChatError>) -> &ChatMessage {
        let sent = self.in_flight.take();
        let reply = match result {
            Ok(text) => {
                if let (Some(session), Some(sent)) = (self.session.as_mut(), sent) {
                    session.history.push(ChatMessage::user(sent));
                    session.history.push(ChatMessage::assistant(text.clone()));
                }
                ChatMessage::assistant(text)
            }
            Err(error) => {
                tracing::error!(%error, "chat reply failed");
                ChatMessage::assistant(APOLOGY)
            }
        };
        self.transcript.push(reply);
        &self.transcript[self.transcript.len() - 1]
    }

    /// Both send phases against `backend`. `None` when nothing was sent.
    pub async fn send(&mut self, backend: &dyn ChatBackend, input: &str) -> Option<ChatMessage> {
        let pending = self.begin_send(input)?;
        let result = backend
            .reply(&pending.system, &pending.history, &pending.message)
            .await;
        Some(self.finish_send(result).clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
