//! services/api/src/web/sessions.rs
//!
//! Handlers for scheduling and browsing study sessions.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::web::middleware::CurrentUser;
use crate::web::state::AppState;
use studyhub_core::domain::{ActivityKind, NewActivity, NewStudySession, StudySession, TargetKind};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    pub group_id: i64,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_virtual: bool,
    pub location: Option<String>,
    pub meeting_link: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    pub id: i64,
    pub group_id: i64,
    pub created_by: i64,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_virtual: bool,
    pub location: Option<String>,
    pub meeting_link: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<StudySession> for SessionResponse {
    fn from(session: StudySession) -> Self {
        Self {
            id: session.id,
            group_id: session.group_id,
            created_by: session.created_by,
            title: session.title,
            start_time: session.start_time,
            end_time: session.end_time,
            is_virtual: session.is_virtual,
            location: session.location,
            meeting_link: session.meeting_link,
            created_at: session.created_at,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /study-sessions - Schedule a session
///
/// Sessions may overlap freely; there is no conflict checking.
#[utoipa::path(
    post,
    path = "/study-sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session scheduled", body = SessionResponse),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Not a member of the group"),
        (status = 404, description = "No such group")
    )
)]
pub async fn create_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if req.end_time <= req.start_time {
        return Err((
            StatusCode::BAD_REQUEST,
            "end_time must be after start_time".to_string(),
        ));
    }

    state
        .store
        .get_group(req.group_id)
        .await
        .map_err(|e| {
            error!("Failed to get group: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to get group".to_string())
        })?
        .ok_or((StatusCode::NOT_FOUND, "Group not found".to_string()))?;

    let members = state
        .store
        .list_group_members(req.group_id)
        .await
        .map_err(|e| {
            error!("Failed to list members: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to schedule session".to_string())
        })?;
    if !members.iter().any(|m| m.user_id == user_id) {
        return Err((
            StatusCode::FORBIDDEN,
            "Only members can schedule sessions".to_string(),
        ));
    }

    let session = state
        .store
        .create_study_session(NewStudySession {
            group_id: req.group_id,
            created_by: user_id,
            title: req.title,
            start_time: req.start_time,
            end_time: req.end_time,
            is_virtual: req.is_virtual,
            location: req.location,
            meeting_link: req.meeting_link,
        })
        .await
        .map_err(|e| {
            error!("Failed to create session: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to schedule session".to_string())
        })?;

    if let Err(e) = state
        .store
        .log_activity(NewActivity {
            user_id,
            kind: ActivityKind::ScheduledSession,
            target_id: session.id,
            target_kind: TargetKind::Session,
            metadata: Some(session.title.clone()),
        })
        .await
    {
        error!("Failed to log session activity: {:?}", e);
    }

    Ok((StatusCode::CREATED, Json(SessionResponse::from(session))))
}

/// GET /study-groups/{id}/sessions - Sessions of one group
#[utoipa::path(
    get,
    path = "/study-groups/{id}/sessions",
    params(("id" = i64, Path, description = "Group id")),
    responses(
        (status = 200, description = "The group's sessions", body = [SessionResponse]),
        (status = 404, description = "No such group")
    )
)]
pub async fn group_sessions_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state
        .store
        .get_group(id)
        .await
        .map_err(|e| {
            error!("Failed to get group: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to get group".to_string())
        })?
        .ok_or((StatusCode::NOT_FOUND, "Group not found".to_string()))?;

    let sessions = state.store.list_sessions_for_group(id).await.map_err(|e| {
        error!("Failed to list sessions: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to list sessions".to_string())
    })?;

    let response: Vec<SessionResponse> = sessions.into_iter().map(SessionResponse::from).collect();
    Ok(Json(response))
}

/// GET /study-sessions/upcoming - Upcoming sessions across the user's groups
#[utoipa::path(
    get,
    path = "/study-sessions/upcoming",
    responses(
        (status = 200, description = "Upcoming sessions, soonest first", body = [SessionResponse]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn upcoming_sessions_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let sessions = state
        .store
        .upcoming_sessions_for_user(user_id)
        .await
        .map_err(|e| {
            error!("Failed to list upcoming sessions: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to list sessions".to_string())
        })?;

    let response: Vec<SessionResponse> = sessions.into_iter().map(SessionResponse::from).collect();
    Ok(Json(response))
}
