pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::controller::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/profile/fields", get(handlers::handle_profile_fields))
        // Sessions
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/profile",
            patch(handlers::handle_edit_field),
        )
        .route("/api/v1/sessions/:id/clear", post(handlers::handle_clear))
        // Evaluation
        .route(
            "/api/v1/sessions/:id/evaluate",
            post(handlers::handle_evaluate),
        )
        .route(
            "/api/v1/sessions/:id/evaluation/dismiss",
            post(handlers::handle_dismiss_evaluation_error),
        )
        .route("/api/v1/sessions/:id/report", get(handlers::handle_report))
        // Chat
        .route("/api/v1/sessions/:id/chat", post(handlers::handle_chat))
        .route(
            "/api/v1/sessions/:id/chat/dismiss",
            post(handlers::handle_dismiss_chat_error),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::chat::{ChatBackend, ChatError, ChatSession};
    use crate::evaluation::{EvaluationError, Evaluator};
    use crate::llm_client::LlmError;
    use crate::models::evaluation::EvaluationResult;
    use crate::models::profile::UserProfile;

    struct CannedEvaluator;

    #[async_trait]
    impl Evaluator for CannedEvaluator {
        async fn evaluate(&self, profile: &UserProfile) -> Result<EvaluationResult, EvaluationError> {
            Ok(EvaluationResult {
                match_strength: "Strong Candidate (High Chance)".to_string(),
                overall_assessment: format!("Good fit for {}.", profile.target_university),
                strengths: vec!["GPA".to_string()],
                areas_for_improvement: vec![],
                alternative_universities: vec![],
                scholarship_outlook: "Possible TA funding.".to_string(),
            })
        }
    }

    struct DownChat;

    #[async_trait]
    impl ChatBackend for DownChat {
        async fn send(&self, _session: &mut ChatSession, _message: &str) -> Result<String, ChatError> {
            Err(ChatError::Provider(LlmError::EmptyContent))
        }
    }

    /// Answers like `CannedEvaluator`, after a delay.
    struct SlowEvaluator;

    #[async_trait]
    impl Evaluator for SlowEvaluator {
        async fn evaluate(&self, profile: &UserProfile) -> Result<EvaluationResult, EvaluationError> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            CannedEvaluator.evaluate(profile).await
        }
    }

    struct CrashingEvaluator;

    #[async_trait]
    impl Evaluator for CrashingEvaluator {
        async fn evaluate(&self, _profile: &UserProfile) -> Result<EvaluationResult, EvaluationError> {
            panic!("evaluator crashed");
        }
    }

    struct SlowChat;

    #[async_trait]
    impl ChatBackend for SlowChat {
        async fn send(&self, session: &mut ChatSession, message: &str) -> Result<String, ChatError> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            let reply = format!("reply to {message}");
            session.record_exchange(message, &reply);
            Ok(reply)
        }
    }

    fn app() -> Router {
        app_with(CannedEvaluator, DownChat)
    }

    fn app_with(
        evaluator: impl Evaluator + 'static,
        chat: impl ChatBackend + 'static,
    ) -> Router {
        build_router(AppState::new(Arc::new(evaluator), Arc::new(chat)))
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn new_session(app: &Router) -> String {
        let (status, body) = call(app, Method::POST, "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        body["session_id"].as_str().unwrap().to_string()
    }

    async fn fill(app: &Router, id: &str) {
        for (field, value) in [
            ("cgpa", "3.8"),
            ("cgpaScale", "4.0"),
            ("major", "CS"),
            ("targetUniversity", "MIT"),
            ("targetProgram", "MS CS"),
        ] {
            let (status, _) = call(
                app,
                Method::PATCH,
                &format!("/api/v1/sessions/{id}/profile"),
                Some(json!({"field": field, "value": value})),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_health_reports_sessions() {
        let app = app();
        new_session(&app).await;
        let (status, body) = call(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["sessions"], 1);
    }

    #[tokio::test]
    async fn test_profile_fields_lists_form() {
        let (status, body) = call(&app(), Method::GET, "/api/v1/profile/fields", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 10);
        assert_eq!(body[2]["field"], "cgpaScale");
    }

    #[tokio::test]
    async fn test_new_session_starts_empty() {
        let (_, body) = call(&app(), Method::POST, "/api/v1/sessions", None).await;
        assert_eq!(body["state"]["evaluation"]["status"], "idle");
        assert_eq!(body["state"]["profile"]["cgpaScale"], "4.0");
        assert_eq!(body["state"]["chat"]["transcript"], json!([]));
    }

    #[tokio::test]
    async fn test_unknown_session_is_404() {
        let uri = format!("/api/v1/sessions/{}", uuid::Uuid::new_v4());
        let (status, body) = call(&app(), Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_bad_scale_is_400() {
        let app = app();
        let id = new_session(&app).await;
        let (status, body) = call(
            &app,
            Method::PATCH,
            &format!("/api/v1/sessions/{id}/profile"),
            Some(json!({"field": "cgpaScale", "value": "6.0"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_evaluate_then_report() {
        let app = app();
        let id = new_session(&app).await;
        fill(&app, &id).await;

        let (status, body) =
            call(&app, Method::POST, &format!("/api/v1/sessions/{id}/evaluate"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["evaluation"]["status"], "ready");
        assert_eq!(body["evaluation"]["loading"], false);
        assert_eq!(body["evaluation"]["tier"], "strong_candidate");
        assert_eq!(
            body["evaluation"]["result"]["overallAssessment"],
            "Good fit for MIT."
        );

        let (status, body) =
            call(&app, Method::GET, &format!("/api/v1/sessions/{id}/report"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["report"]["sections"][0]["title"], "Key Strengths");
        assert!(body["markdown"].as_str().unwrap().contains("Scholarship Outlook"));
    }

    #[tokio::test]
    async fn test_invalid_profile_returns_failed_state() {
        let app = app();
        let id = new_session(&app).await;
        let (status, body) =
            call(&app, Method::POST, &format!("/api/v1/sessions/{id}/evaluate"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["evaluation"]["status"], "failed");
        assert!(body["evaluation"]["error"]
            .as_str()
            .unwrap()
            .starts_with("Please fill in all required fields"));

        let (status, _) =
            call(&app, Method::GET, &format!("/api/v1/sessions/{id}/report"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_chat_failure_is_visible_in_transcript() {
        let app = app();
        let id = new_session(&app).await;
        fill(&app, &id).await;
        call(&app, Method::POST, &format!("/api/v1/sessions/{id}/evaluate"), None).await;

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/v1/sessions/{id}/chat"),
            Some(json!({"message": "Should I retake the GRE?"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let transcript = body["chat"]["transcript"].as_array().unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0]["role"], "user");
        assert_eq!(transcript[1]["role"], "system");
        assert_eq!(body["chat"]["status"], "failed");
        assert_eq!(body["chat"]["session_open"], true);

        let (_, body) = call(
            &app,
            Method::POST,
            &format!("/api/v1/sessions/{id}/chat/dismiss"),
            None,
        )
        .await;
        assert_eq!(body["chat"]["status"], "idle");
        assert_eq!(body["chat"]["transcript"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_chat_message_is_400() {
        let app = app();
        let id = new_session(&app).await;
        let (status, _) = call(
            &app,
            Method::POST,
            &format!("/api/v1/sessions/{id}/chat"),
            Some(json!({"message": "  "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_clear_and_delete() {
        let app = app();
        let id = new_session(&app).await;
        fill(&app, &id).await;
        call(&app, Method::POST, &format!("/api/v1/sessions/{id}/evaluate"), None).await;

        let (_, body) =
            call(&app, Method::POST, &format!("/api/v1/sessions/{id}/clear"), None).await;
        assert_eq!(body["evaluation"]["status"], "idle");
        assert_eq!(body["profile"]["major"], "");

        let (status, _) =
            call(&app, Method::DELETE, &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) =
            call(&app, Method::GET, &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_evaluate_request_still_completes() {
        let app = app_with(SlowEvaluator, DownChat);
        let id = new_session(&app).await;
        fill(&app, &id).await;

        let uri = format!("/api/v1/sessions/{id}/evaluate");
        let cut_short =
            tokio::time::timeout(Duration::from_millis(20), call(&app, Method::POST, &uri, None)).await;
        assert!(cut_short.is_err());

        tokio::time::sleep(Duration::from_millis(500)).await;
        let (_, body) = call(&app, Method::GET, &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(body["evaluation"]["status"], "ready");
        assert_eq!(body["evaluation"]["loading"], false);

        let (status, body) = call(&app, Method::POST, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["evaluation"]["status"], "ready");
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_chat_request_keeps_session() {
        let app = app_with(CannedEvaluator, SlowChat);
        let id = new_session(&app).await;
        fill(&app, &id).await;
        call(&app, Method::POST, &format!("/api/v1/sessions/{id}/evaluate"), None).await;

        let uri = format!("/api/v1/sessions/{id}/chat");
        let chat = call(
            &app,
            Method::POST,
            &uri,
            Some(json!({"message": "Is my GRE enough?"})),
        );
        assert!(tokio::time::timeout(Duration::from_millis(20), chat).await.is_err());

        tokio::time::sleep(Duration::from_millis(500)).await;
        let (_, body) = call(&app, Method::GET, &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(body["chat"]["status"], "idle");
        assert_eq!(body["chat"]["session_open"], true);
        let transcript = body["chat"]["transcript"].as_array().unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1]["text"], "reply to Is my GRE enough?");
    }

    #[tokio::test]
    async fn test_crashed_evaluation_is_500_and_not_left_loading() {
        let app = app_with(CrashingEvaluator, DownChat);
        let id = new_session(&app).await;
        fill(&app, &id).await;

        let (status, body) =
            call(&app, Method::POST, &format!("/api/v1/sessions/{id}/evaluate"), None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");

        let (_, body) = call(&app, Method::GET, &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(body["evaluation"]["status"], "failed");
        assert_eq!(
            body["evaluation"]["error"],
            "An unknown error occurred during evaluation. Please try again."
        );
    }
}
