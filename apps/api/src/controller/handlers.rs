//! Axum route handlers for the session API.
//!
//! Provider calls run with the session lock released; only the synchronous
//! `begin_*` / `finish_*` transitions hold it. Each call and its `finish_*`
//! run on a spawned task, so a dropped request never strands a session in
//! `Loading`.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::controller::view::ControllerView;
use crate::controller::{Begin, ControllerError};
use crate::errors::AppError;
use crate::models::profile::{field_specs, FieldSpec, ProfileField};
use crate::report::ResultReport;
use crate::state::{AppState, ControllerHandle};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EditFieldRequest {
    pub field: ProfileField,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub state: ControllerView,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub report: ResultReport,
    pub markdown: String,
}

impl From<ControllerError> for AppError {
    fn from(e: ControllerError) -> Self {
        match e {
            ControllerError::Validation(v) => AppError::Validation(v),
            busy => AppError::Conflict(busy.to_string()),
        }
    }
}

async fn find(state: &AppState, id: Uuid) -> Result<ControllerHandle, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/profile/fields
pub async fn handle_profile_fields() -> Json<Vec<FieldSpec>> {
    Json(field_specs())
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let controller = state.new_controller();
    let view = controller.view();
    let session_id = state.sessions.insert(controller).await;
    info!("Session {session_id} created");
    (
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id,
            state: view,
        }),
    )
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ControllerView>, AppError> {
    let handle = find(&state, id).await?;
    let view = handle.lock().await.view();
    Ok(Json(view))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        info!("Session {id} deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {id} not found")))
    }
}

/// PATCH /api/v1/sessions/:id/profile
pub async fn handle_edit_field(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<EditFieldRequest>,
) -> Result<Json<ControllerView>, AppError> {
    let handle = find(&state, id).await?;
    let mut controller = handle.lock().await;
    controller.edit_field(request.field, request.value)?;
    Ok(Json(controller.view()))
}

/// POST /api/v1/sessions/:id/evaluate
///
/// Guard failures and provider failures are part of the returned state, not HTTP errors.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ControllerView>, AppError> {
    let handle = find(&state, id).await?;

    let begun = handle.lock().await.begin_submit()?;
    if let Begin::Started(ticket) = begun {
        info!("Session {id}: evaluation started");
        let epoch = ticket.epoch();
        let session = Arc::clone(&handle);
        let joined = tokio::spawn(async move {
            let completion = ticket.run().await;
            session.lock().await.finish_submit(completion);
        })
        .await;
        if let Err(e) = joined {
            error!("Session {id}: evaluation task failed: {e}");
            handle.lock().await.abandon_submit(epoch);
            return Err(anyhow::Error::from(e).into());
        }
    }

    let view = handle.lock().await.view();
    Ok(Json(view))
}

/// POST /api/v1/sessions/:id/clear
pub async fn handle_clear(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ControllerView>, AppError> {
    let handle = find(&state, id).await?;
    let mut controller = handle.lock().await;
    controller.clear();
    Ok(Json(controller.view()))
}

/// POST /api/v1/sessions/:id/evaluation/dismiss
pub async fn handle_dismiss_evaluation_error(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ControllerView>, AppError> {
    let handle = find(&state, id).await?;
    let mut controller = handle.lock().await;
    controller.dismiss_evaluation_error();
    Ok(Json(controller.view()))
}

/// GET /api/v1/sessions/:id/report
pub async fn handle_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReportResponse>, AppError> {
    let handle = find(&state, id).await?;
    let controller = handle.lock().await;
    let result = controller
        .evaluation_result()
        .ok_or_else(|| AppError::NotFound(format!("Session {id} has no evaluation")))?;

    let report = ResultReport::from_evaluation(result);
    let markdown = report.to_markdown();
    Ok(Json(ReportResponse { report, markdown }))
}

/// POST /api/v1/sessions/:id/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ControllerView>, AppError> {
    let handle = find(&state, id).await?;

    let begun = handle.lock().await.begin_chat(&request.message)?;
    if let Begin::Started(ticket) = begun {
        let epoch = ticket.epoch();
        let session = Arc::clone(&handle);
        let joined = tokio::spawn(async move {
            let completion = ticket.run().await;
            session.lock().await.finish_chat(completion);
        })
        .await;
        if let Err(e) = joined {
            error!("Session {id}: chat task failed: {e}");
            handle.lock().await.abandon_chat(epoch);
            return Err(anyhow::Error::from(e).into());
        }
    }

    let view = handle.lock().await.view();
    Ok(Json(view))
}

/// POST /api/v1/sessions/:id/chat/dismiss
pub async fn handle_dismiss_chat_error(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ControllerView>, AppError> {
    let handle = find(&state, id).await?;
    let mut controller = handle.lock().await;
    controller.dismiss_chat_error();
    Ok(Json(controller.view()))
}
