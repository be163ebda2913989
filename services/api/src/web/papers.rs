//! services/api/src/web/papers.rs
//!
//! Handlers for the past-paper catalogue: uploading paper metadata, browsing
//! and searching the catalogue, and counting downloads.

use axum::{
    extract::{Path, Query, State},
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
use studyhub_core::domain::{ActivityKind, NewActivity, NewPaper, Paper, TargetKind};
use studyhub_core::ports::PaperFilter;

/// Points a user earns for sharing a paper.
const UPLOAD_POINTS: i64 = 10;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreatePaperRequest {
    pub title: String,
    pub course: String,
    pub year: i32,
    pub institution: String,
    /// Where the file is hosted. This service stores metadata only.
    pub file_url: String,
}

#[derive(Deserialize)]
pub struct PaperListQuery {
    pub course: Option<String>,
    pub year: Option<i32>,
    pub institution: Option<String>,
    /// Case-insensitive substring match over title, course and institution.
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PaperResponse {
    pub id: i64,
    pub uploader_id: i64,
    pub title: String,
    pub course: String,
    pub year: i32,
    pub institution: String,
    pub file_url: String,
    pub downloads: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Paper> for PaperResponse {
    fn from(paper: Paper) -> Self {
        Self {
            id: paper.id,
            uploader_id: paper.uploader_id,
            title: paper.title,
            course: paper.course,
            year: paper.year,
            institution: paper.institution,
            file_url: paper.file_url,
            downloads: paper.downloads,
            created_at: paper.created_at,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /papers - Share a past paper
#[utoipa::path(
    post,
    path = "/papers",
    request_body = CreatePaperRequest,
    responses(
        (status = 201, description = "Paper created", body = PaperResponse),
        (status = 400, description = "Invalid request"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_paper_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(req): Json<CreatePaperRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if req.title.trim().is_empty() || req.course.trim().is_empty() || req.file_url.trim().is_empty()
    {
        return Err((
            StatusCode::BAD_REQUEST,
            "title, course and file_url are required".to_string(),
        ));
    }

    let paper = state
        .store
        .create_paper(NewPaper {
            uploader_id: user_id,
            title: req.title,
            course: req.course,
            year: req.year,
            institution: req.institution,
            file_url: req.file_url,
        })
        .await
        .map_err(|e| {
            error!("Failed to create paper: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create paper".to_string())
        })?;

    // Follow-up steps are not atomic with the create; a failure here leaves
    // the paper in place without points or a feed entry.
    if let Err(e) = state.store.add_user_points(user_id, UPLOAD_POINTS).await {
        error!("Failed to award upload points: {:?}", e);
    }
    if let Err(e) = state
        .store
        .log_activity(NewActivity {
            user_id,
            kind: ActivityKind::UploadedPaper,
            target_id: paper.id,
            target_kind: TargetKind::Paper,
            metadata: Some(paper.title.clone()),
        })
        .await
    {
        error!("Failed to log upload activity: {:?}", e);
    }

    Ok((StatusCode::CREATED, Json(PaperResponse::from(paper))))
}

/// GET /papers - Browse the paper catalogue
#[utoipa::path(
    get,
    path = "/papers",
    params(
        ("course" = Option<String>, Query, description = "Exact course code"),
        ("year" = Option<i32>, Query, description = "Exact exam year"),
        ("institution" = Option<String>, Query, description = "Exact institution name"),
        ("search" = Option<String>, Query, description = "Free-text search")
    ),
    responses(
        (status = 200, description = "Matching papers", body = [PaperResponse]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_papers_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PaperListQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let filter = PaperFilter {
        uploader_id: None,
        course: query.course,
        year: query.year,
        institution: query.institution,
    };
    let mut papers = state.store.list_papers(filter).await.map_err(|e| {
        error!("Failed to list papers: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to list papers".to_string())
    })?;

    // Free-text search is a plain scan; storage only knows equality filters.
    if let Some(needle) = query.search {
        let needle = needle.to_lowercase();
        papers.retain(|p| {
            p.title.to_lowercase().contains(&needle)
                || p.course.to_lowercase().contains(&needle)
                || p.institution.to_lowercase().contains(&needle)
        });
    }

    let response: Vec<PaperResponse> = papers.into_iter().map(PaperResponse::from).collect();
    Ok(Json(response))
}

/// GET /papers/{id} - Fetch one paper
#[utoipa::path(
    get,
    path = "/papers/{id}",
    params(("id" = i64, Path, description = "Paper id")),
    responses(
        (status = 200, description = "The paper", body = PaperResponse),
        (status = 404, description = "No such paper")
    )
)]
pub async fn get_paper_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let paper = state
        .store
        .get_paper(id)
        .await
        .map_err(|e| {
            error!("Failed to get paper: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to get paper".to_string())
        })?
        .ok_or((StatusCode::NOT_FOUND, "Paper not found".to_string()))?;

    Ok(Json(PaperResponse::from(paper)))
}

/// POST /papers/{id}/download - Record a download
#[utoipa::path(
    post,
    path = "/papers/{id}/download",
    params(("id" = i64, Path, description = "Paper id")),
    responses(
        (status = 200, description = "Updated paper", body = PaperResponse),
        (status = 404, description = "No such paper")
    )
)]
pub async fn download_paper_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let paper = state
        .store
        .increment_paper_downloads(id)
        .await
        .map_err(|e| {
            error!("Failed to record download: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to record download".to_string())
        })?
        .ok_or((StatusCode::NOT_FOUND, "Paper not found".to_string()))?;

    if let Err(e) = state
        .store
        .log_activity(NewActivity {
            user_id,
            kind: ActivityKind::DownloadedPaper,
            target_id: paper.id,
            target_kind: TargetKind::Paper,
            metadata: None,
        })
        .await
    {
        error!("Failed to log download activity: {:?}", e);
    }

    Ok(Json(PaperResponse::from(paper)))
}
