use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use tracing::info;
use uuid::Uuid;

use crate::chat::ChatBackend;
use crate::controller::Controller;
use crate::evaluation::Evaluator;

pub type ControllerHandle = Arc<Mutex<Controller>>;

struct SessionEntry {
    controller: ControllerHandle,
    last_touched: Instant,
}

/// In-memory registry of live sessions. Nothing outlives the process; sessions
/// idle longer than the configured limit are evicted by [`spawn_idle_sweeper`].
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
}

impl SessionStore {
    pub async fn insert(&self, controller: Controller) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.write().await.insert(
            id,
            SessionEntry {
                controller: Arc::new(Mutex::new(controller)),
                last_touched: Instant::now(),
            },
        );
        id
    }

    /// Looks a session up and marks it as used.
    pub async fn get(&self, id: Uuid) -> Option<ControllerHandle> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_touched = Instant::now();
        Some(Arc::clone(&entry.controller))
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops every session untouched for longer than `max_idle`. Returns how many went.
    ///
    /// A provider call already in flight keeps its own handle and finishes on
    /// the detached controller.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_touched) <= max_idle);
        before - sessions.len()
    }
}

/// Periodically evicts idle sessions for the life of the process.
pub fn spawn_idle_sweeper(store: SessionStore, every: Duration, max_idle: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let evicted = store.evict_idle(max_idle).await;
            if evicted > 0 {
                info!("Evicted {evicted} idle session(s)");
            }
        }
    })
}

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    /// Evaluation backend. Default: GeminiEvaluator.
    pub evaluator: Arc<dyn Evaluator>,
    /// Chat backend. Default: GeminiChatBackend.
    pub chat: Arc<dyn ChatBackend>,
}

impl AppState {
    pub fn new(evaluator: Arc<dyn Evaluator>, chat: Arc<dyn ChatBackend>) -> Self {
        Self {
            sessions: SessionStore::default(),
            evaluator,
            chat,
        }
    }

    pub fn new_controller(&self) -> Controller {
        Controller::new(Arc::clone(&self.evaluator), Arc::clone(&self.chat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    use crate::chat::{ChatError, ChatSession};
    use crate::evaluation::EvaluationError;
    use crate::llm_client::LlmError;
    use crate::models::evaluation::EvaluationResult;
    use crate::models::profile::UserProfile;

    struct NoEvaluator;

    #[async_trait]
    impl Evaluator for NoEvaluator {
        async fn evaluate(&self, _profile: &UserProfile) -> Result<EvaluationResult, EvaluationError> {
            Err(EvaluationError::Provider(LlmError::EmptyContent))
        }
    }

    struct NoChat;

    #[async_trait]
    impl ChatBackend for NoChat {
        async fn send(&self, _session: &mut ChatSession, _message: &str) -> Result<String, ChatError> {
            Err(ChatError::Provider(LlmError::EmptyContent))
        }
    }

    fn state() -> AppState {
        AppState::new(Arc::new(NoEvaluator), Arc::new(NoChat))
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_are_evicted() {
        let state = state();
        let idle = state.sessions.insert(state.new_controller()).await;
        let active = state.sessions.insert(state.new_controller()).await;

        tokio::time::advance(Duration::from_secs(50)).await;
        assert!(state.sessions.get(active).await.is_some());
        tokio::time::advance(Duration::from_secs(20)).await;

        assert_eq!(state.sessions.evict_idle(Duration::from_secs(60)).await, 1);
        assert!(state.sessions.get(idle).await.is_none());
        assert!(state.sessions.get(active).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_runs_on_interval() {
        let state = state();
        state.sessions.insert(state.new_controller()).await;
        let sweeper = spawn_idle_sweeper(
            state.sessions.clone(),
            Duration::from_secs(10),
            Duration::from_secs(30),
        );

        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(state.sessions.len().await, 1);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(state.sessions.len().await, 0);
        sweeper.abort();
    }

    #[tokio::test]
    async fn test_remove_reports_presence() {
        let state = state();
        let id = state.sessions.insert(state.new_controller()).await;
        assert!(state.sessions.remove(id).await);
        assert!(!state.sessions.remove(id).await);
    }
}
