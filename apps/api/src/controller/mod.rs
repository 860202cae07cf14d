//! Application Controller, one per user session.
//!
//! Owns the profile draft plus the evaluation and chat state, and sequences
//! calls into the evaluation and chat services.
//!
//! Service calls are split into `begin_*` / `run` / `finish_*` so a caller
//! holding the controller behind a lock can release it while the provider call
//! is in flight. Every submit and clear bumps `epoch`; a completion carrying an
//! older epoch is dropped.

pub mod handlers;
pub mod view;

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::chat::{ChatBackend, ChatError, ChatSession};
use crate::errors::ValidationError;
use crate::evaluation::{EvaluationError, Evaluator};
use crate::models::chat::{ChatMessage, ChatRole};
use crate::models::evaluation::EvaluationResult;
use crate::models::profile::{ProfileField, UserProfile};

const EVALUATION_FALLBACK_ERROR: &str =
    "An unknown error occurred during evaluation. Please try again.";
const CHAT_FALLBACK_ERROR: &str = "An error occurred in the chat.";
const CHAT_WITHOUT_EVALUATION: &str =
    "Cannot start chat without profile data and an initial evaluation.";

#[derive(Debug, Clone, Default, PartialEq)]
pub enum EvaluationState {
    #[default]
    Idle,
    Loading,
    Ready(EvaluationResult),
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ChatState {
    #[default]
    Idle,
    Loading,
    Failed(String),
}

/// Requests the controller refuses outright, leaving state untouched.
#[derive(Debug, Error, PartialEq)]
pub enum ControllerError {
    #[error("An evaluation is already in progress.")]
    EvaluationInProgress,

    #[error("A chat reply is already in progress.")]
    ChatInProgress,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Result of a `begin_*` call.
#[derive(Debug)]
pub enum Begin<T> {
    /// The request passed its guard; run the ticket and hand back the completion.
    Started(T),
    /// The guard failed. The failure is already recorded in state.
    Rejected,
}

pub struct SubmitTicket {
    epoch: u64,
    profile: UserProfile,
    evaluator: Arc<dyn Evaluator>,
}

pub struct SubmitCompletion {
    epoch: u64,
    result: Result<EvaluationResult, EvaluationError>,
}

impl std::fmt::Debug for SubmitTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmitTicket")
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

impl SubmitTicket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub async fn run(self) -> SubmitCompletion {
        let result = self.evaluator.evaluate(&self.profile).await;
        SubmitCompletion {
            epoch: self.epoch,
            result,
        }
    }
}

pub struct ChatTicket {
    epoch: u64,
    session: ChatSession,
    message: String,
    backend: Arc<dyn ChatBackend>,
}

pub struct ChatCompletion {
    epoch: u64,
    session: ChatSession,
    result: Result<String, ChatError>,
}

impl std::fmt::Debug for ChatTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatTicket")
            .field("epoch", &self.epoch)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl ChatTicket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub async fn run(mut self) -> ChatCompletion {
        let result = self.backend.send(&mut self.session, &self.message).await;
        ChatCompletion {
            epoch: self.epoch,
            session: self.session,
            result,
        }
    }
}

pub struct Controller {
    evaluator: Arc<dyn Evaluator>,
    chat_backend: Arc<dyn ChatBackend>,
    profile: UserProfile,
    evaluation: EvaluationState,
    chat: ChatState,
    transcript: Vec<ChatMessage>,
    session: Option<ChatSession>,
    epoch: u64,
}

impl Controller {
    pub fn new(evaluator: Arc<dyn Evaluator>, chat_backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            evaluator,
            chat_backend,
            profile: UserProfile::default(),
            evaluation: EvaluationState::Idle,
            chat: ChatState::Idle,
            transcript: Vec::new(),
            session: None,
            epoch: 0,
        }
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn evaluation(&self) -> &EvaluationState {
        &self.evaluation
    }

    pub fn evaluation_result(&self) -> Option<&EvaluationResult> {
        match &self.evaluation {
            EvaluationState::Ready(result) => Some(result),
            _ => None,
        }
    }

    pub fn chat_state(&self) -> &ChatState {
        &self.chat
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn has_chat_session(&self) -> bool {
        self.session.is_some()
    }

    /// Updates one draft attribute. Nothing else changes.
    pub fn edit_field(&mut self, field: ProfileField, value: String) -> Result<(), ControllerError> {
        self.profile.set(field, value)?;
        Ok(())
    }

    /// Resets to a fresh session: empty draft, no evaluation, no chat.
    pub fn clear(&mut self) {
        info!("Clearing form and session state");
        self.profile = UserProfile::default();
        self.reset_results();
    }

    fn reset_results(&mut self) {
        self.evaluation = EvaluationState::Idle;
        self.chat = ChatState::Idle;
        self.transcript.clear();
        self.session = None;
        self.epoch += 1;
    }

    pub fn dismiss_evaluation_error(&mut self) {
        if matches!(self.evaluation, EvaluationState::Failed(_)) {
            self.evaluation = EvaluationState::Idle;
        }
    }

    pub fn dismiss_chat_error(&mut self) {
        if matches!(self.chat, ChatState::Failed(_)) {
            self.chat = ChatState::Idle;
        }
    }

    /// Starts a submission.
    ///
    /// The previous evaluation and all chat artifacts are discarded first. A
    /// profile that fails the guard ends in `Failed` without a service call.
    pub fn begin_submit(&mut self) -> Result<Begin<SubmitTicket>, ControllerError> {
        if self.evaluation == EvaluationState::Loading {
            return Err(ControllerError::EvaluationInProgress);
        }

        self.reset_results();

        if let Err(e) = self.profile.validate_for_submission() {
            info!("Submission blocked by validation: {e}");
            self.evaluation = EvaluationState::Failed(e.to_string());
            return Ok(Begin::Rejected);
        }

        self.evaluation = EvaluationState::Loading;
        Ok(Begin::Started(SubmitTicket {
            epoch: self.epoch,
            profile: self.profile.clone(),
            evaluator: Arc::clone(&self.evaluator),
        }))
    }

    /// Applies an evaluation outcome. Always leaves `Loading`.
    pub fn finish_submit(&mut self, completion: SubmitCompletion) {
        if completion.epoch != self.epoch {
            debug!("Dropping evaluation result from a superseded submission");
            return;
        }

        self.evaluation = match completion.result {
            Ok(result) => {
                info!("Evaluation ready: {}", result.match_strength);
                EvaluationState::Ready(result)
            }
            Err(e) => {
                warn!("Evaluation failed: {e}");
                EvaluationState::Failed(failure_message(&e, EVALUATION_FALLBACK_ERROR))
            }
        };
    }

    /// Leaves `Loading` when the call for `epoch` died without a completion.
    pub fn abandon_submit(&mut self, epoch: u64) {
        if epoch == self.epoch && self.evaluation == EvaluationState::Loading {
            warn!("Evaluation task ended without a result");
            self.evaluation = EvaluationState::Failed(EVALUATION_FALLBACK_ERROR.to_string());
        }
    }

    /// Runs a whole submit in place. HTTP handlers drive `begin_submit`/`finish_submit` instead.
    #[cfg(test)]
    pub async fn submit(&mut self) -> Result<(), ControllerError> {
        if let Begin::Started(ticket) = self.begin_submit()? {
            let completion = ticket.run().await;
            self.finish_submit(completion);
        }
        Ok(())
    }

    /// Starts a chat turn.
    ///
    /// The user's message is appended before the provider is called. The
    /// session is opened on first use and travels with the ticket until
    /// `finish_chat` puts it back.
    pub fn begin_chat(&mut self, text: &str) -> Result<Begin<ChatTicket>, ControllerError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyMessage.into());
        }
        if self.chat == ChatState::Loading {
            return Err(ControllerError::ChatInProgress);
        }

        let EvaluationState::Ready(evaluation) = &self.evaluation else {
            info!("Chat blocked: no evaluation");
            self.chat = ChatState::Failed(CHAT_WITHOUT_EVALUATION.to_string());
            return Ok(Begin::Rejected);
        };

        let session = match self.session.take() {
            Some(session) => session,
            None => {
                debug!("Opening chat session");
                self.chat_backend.open(&self.profile, evaluation)
            }
        };

        self.transcript.push(ChatMessage::new(ChatRole::User, text));
        self.chat = ChatState::Loading;

        Ok(Begin::Started(ChatTicket {
            epoch: self.epoch,
            session,
            message: text.to_string(),
            backend: Arc::clone(&self.chat_backend),
        }))
    }

    /// Applies a chat outcome. The session is kept on both paths.
    pub fn finish_chat(&mut self, completion: ChatCompletion) {
        if completion.epoch != self.epoch {
            debug!("Dropping chat reply from a superseded session");
            return;
        }

        self.session = Some(completion.session);
        match completion.result {
            Ok(reply) => {
                self.transcript.push(ChatMessage::new(ChatRole::Model, reply));
                self.chat = ChatState::Idle;
            }
            Err(e) => {
                warn!("Chat turn failed: {e}");
                self.push_chat_failure(failure_message(&e, CHAT_FALLBACK_ERROR));
            }
        }
    }

    fn push_chat_failure(&mut self, message: String) {
        self.transcript.push(ChatMessage::new(
            ChatRole::System,
            format!(
                "Sorry, I encountered an error: {}. Please try again.",
                message.trim_end_matches('.')
            ),
        ));
        self.chat = ChatState::Failed(message);
    }

    /// Leaves `Loading` when the turn for `epoch` died without a completion.
    /// The session went down with the task; the next message opens a fresh one.
    pub fn abandon_chat(&mut self, epoch: u64) {
        if epoch == self.epoch && self.chat == ChatState::Loading {
            warn!("Chat task ended without a reply");
            self.push_chat_failure(CHAT_FALLBACK_ERROR.to_string());
        }
    }

    #[cfg(test)]
    pub async fn send_chat_message(&mut self, text: &str) -> Result<(), ControllerError> {
        if let Begin::Started(ticket) = self.begin_chat(text)? {
            let completion = ticket.run().await;
            self.finish_chat(completion);
        }
        Ok(())
    }
}

fn failure_message(e: &dyn std::error::Error, fallback: &str) -> String {
    let message = e.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
