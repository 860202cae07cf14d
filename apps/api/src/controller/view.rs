//! Serializable snapshot of a controller, shaped for UI binding.

use serde::Serialize;

use crate::controller::{ChatState, Controller, EvaluationState};
use crate::models::chat::ChatMessage;
use crate::models::evaluation::{EvaluationResult, MatchStrength};
use crate::models::profile::{FieldError, UserProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Idle,
    Loading,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationView {
    pub status: Status,
    pub loading: bool,
    pub result: Option<EvaluationResult>,
    /// Advisory classification of `result.matchStrength`; `None` when it is off-vocabulary.
    pub tier: Option<MatchStrength>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatView {
    pub status: Status,
    pub loading: bool,
    pub error: Option<String>,
    pub session_open: bool,
    pub transcript: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ControllerView {
    pub profile: UserProfile,
    pub field_errors: Vec<FieldError>,
    pub evaluation: EvaluationView,
    pub chat: ChatView,
}

impl Controller {
    pub fn view(&self) -> ControllerView {
        let evaluation = match self.evaluation() {
            EvaluationState::Idle => EvaluationView::empty(Status::Idle),
            EvaluationState::Loading => EvaluationView::empty(Status::Loading),
            EvaluationState::Ready(result) => EvaluationView {
                tier: result.match_tier(),
                result: Some(result.clone()),
                ..EvaluationView::empty(Status::Ready)
            },
            EvaluationState::Failed(e) => EvaluationView {
                error: Some(e.clone()),
                ..EvaluationView::empty(Status::Failed)
            },
        };

        let (status, error) = match self.chat_state() {
            ChatState::Idle => (Status::Idle, None),
            ChatState::Loading => (Status::Loading, None),
            ChatState::Failed(e) => (Status::Failed, Some(e.clone())),
        };

        ControllerView {
            profile: self.profile().clone(),
            field_errors: self.profile().field_errors(),
            evaluation,
            chat: ChatView {
                status,
                loading: status == Status::Loading,
                error,
                session_open: self.has_chat_session(),
                transcript: self.transcript().to_vec(),
            },
        }
    }
}

impl EvaluationView {
    fn empty(status: Status) -> Self {
        Self {
            status,
            loading: status == Status::Loading,
            result: None,
            tier: None,
            error: None,
        }
    }
}
