//! Chat Service. Follow-up conversation grounded in a finished evaluation.
//!
//! The controller only sees the `ChatBackend` capability: open a session from
//! context, send a turn into it. `GeminiChatBackend` keeps the turn history on
//! our side and replays it on every call, since `generateContent` is stateless.

pub mod prompts;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error};

use crate::chat::prompts::build_chat_system_instruction;
use crate::llm_client::{Content, GenerationConfig, LlmClient, LlmError};
use crate::models::evaluation::EvaluationResult;
use crate::models::profile::UserProfile;

const TEMPERATURE: f32 = 0.6;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("An error occurred while communicating with the AI chat service.")]
    Provider(#[from] LlmError),
}

/// A stateful conversation. Grounding lives entirely in the system
/// instruction; `history` holds only turns that completed successfully.
#[derive(Debug, Clone)]
pub struct ChatSession {
    system_instruction: String,
    history: Vec<Content>,
}

impl ChatSession {
    pub fn grounded(profile: &UserProfile, evaluation: &EvaluationResult) -> Self {
        Self {
            system_instruction: build_chat_system_instruction(profile, evaluation),
            history: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    #[cfg(test)]
    pub fn history(&self) -> &[Content] {
        &self.history
    }

    /// Records a completed exchange so later turns can refer back to it.
    pub fn record_exchange(&mut self, user_text: &str, reply: &str) {
        self.history.push(Content::user(user_text));
        self.history.push(Content::model(reply));
    }
}

/// Chat capability. Carried by the controller as `Arc<dyn ChatBackend>`.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Pure construction; never touches the network.
    fn open(&self, profile: &UserProfile, evaluation: &EvaluationResult) -> ChatSession {
        ChatSession::grounded(profile, evaluation)
    }

    /// Sends one user turn and returns the reply text unchanged.
    /// On failure the session must be left as it was.
    async fn send(&self, session: &mut ChatSession, message: &str) -> Result<String, ChatError>;
}

pub struct GeminiChatBackend {
    llm: LlmClient,
}

impl GeminiChatBackend {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ChatBackend for GeminiChatBackend {
    async fn send(&self, session: &mut ChatSession, message: &str) -> Result<String, ChatError> {
        let contents = replay_contents(session, message);
        let config = GenerationConfig {
            temperature: Some(TEMPERATURE),
            ..Default::default()
        };

        debug!("Sending chat turn {}", session.history.len() / 2 + 1);
        let reply = self
            .llm
            .call_text(&contents, &session.system_instruction, &config)
            .await
            .map_err(|e| {
                error!("Error sending chat message: {e}");
                ChatError::from(e)
            })?;

        session.record_exchange(message, &reply);
        Ok(reply)
    }
}

/// Prior turns followed by the new user message.
fn replay_contents(session: &ChatSession, message: &str) -> Vec<Content> {
    let mut contents = Vec::with_capacity(session.history.len() + 1);
    contents.extend(session.history.iter().cloned());
    contents.push(Content::user(message));
    contents
}
