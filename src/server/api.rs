use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
};
use serde::Deserialize;
use tokio::sync::broadcast;

use super::ws::{WsMessage, broadcast_message};
use crate::dashboard::{DashboardService, NewLead, ProjectStatus};
use crate::errors::DashboardError;

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub service: Arc<DashboardService>,
    pub ws_tx: broadcast::Sender<String>,
    /// Period of each WebSocket session's overview refresh.
    pub refresh_interval: Duration,
}

pub type SharedState = Arc<AppState>;

// ── Request payload types ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Deserialize)]
pub struct NotesUpdateRequest {
    pub notes: String,
}

#[derive(Deserialize)]
pub struct ProjectQuery {
    pub status: Option<String>,
}

// ── Error handling ────────────────────────────────────────────────────

pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (
            status,
            Json(serde_json::json!({"success": false, "error": message})),
        )
            .into_response()
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DashboardError::InvalidStatus(_) | DashboardError::BadRequest(_) => {
                ApiError::BadRequest(err.to_string())
            }
            DashboardError::Connection(_)
            | DashboardError::UpstreamUnavailable(_)
            | DashboardError::LeadIdsExhausted { .. } => {
                tracing::error!(error = %err, "dashboard request failed");
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/api/dashboard", get(get_overview))
        .route("/api/leads", get(list_leads).post(create_lead))
        .route("/api/leads/board", get(lead_board))
        .route("/api/leads/{id}/status", patch(update_lead_status))
        .route("/api/leads/{id}/notes", patch(update_lead_notes))
        .route("/api/projects", get(list_projects))
        .route("/api/projects/active", get(list_active_projects))
        .route("/api/projects/summary", get(project_summary))
        .route("/api/bots", get(list_bots))
        .route("/health", get(health_check))
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check() -> &'static str {
    "ok"
}

async fn get_overview(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.overview().await?))
}

async fn list_leads(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.list_leads().await?))
}

async fn create_lead(
    State(state): State<SharedState>,
    payload: Result<Json<NewLead>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = payload?;
    let result = state.service.add_lead(input).await?;
    broadcast_message(
        &state.ws_tx,
        &WsMessage::LeadAdded {
            lead: result.lead.clone(),
        },
    );
    Ok((StatusCode::CREATED, Json(result)))
}

async fn lead_board(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.lead_board().await?))
}

async fn update_lead_status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let result = state.service.update_lead_status(&id, &req.status).await?;
    broadcast_message(
        &state.ws_tx,
        &WsMessage::LeadStatusChanged {
            lead_id: result.lead_id.clone(),
            status: result.new_status.clone(),
            updated_at: result.updated_at,
        },
    );
    Ok(Json(result))
}

async fn update_lead_notes(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: Result<Json<NotesUpdateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let result = state.service.update_lead_notes(&id, &req.notes).await?;
    broadcast_message(
        &state.ws_tx,
        &WsMessage::LeadNotesChanged {
            lead_id: result.lead_id.clone(),
            notes: result.notes.clone(),
        },
    );
    Ok(Json(result))
}

/// `?status=active|paused|completed|on-hold|all`; absent means all.
async fn list_projects(
    State(state): State<SharedState>,
    Query(query): Query<ProjectQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = match query.status.as_deref() {
        None | Some("all") | Some("") => None,
        Some(s) => Some(s.parse::<ProjectStatus>().map_err(ApiError::BadRequest)?),
    };
    Ok(Json(state.service.list_projects(filter.as_ref()).await?))
}

async fn list_active_projects(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.list_active_projects().await?))
}

async fn project_summary(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.project_summary().await?))
}

async fn list_bots(State(state): State<SharedState>) -> impl IntoResponse {
    Json(state.service.bots())
}
