//! services/api/src/web/feed.rs
//!
//! Handlers for the activity feed and the points leaderboard.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::web::state::AppState;
use studyhub_core::domain::Activity;

const DEFAULT_FEED_LIMIT: usize = 50;
const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize)]
pub struct FeedQuery {
    pub limit: Option<usize>,
}

#[derive(Serialize, ToSchema)]
pub struct ActivityResponse {
    pub id: i64,
    pub user_id: i64,
    pub kind: String,
    pub target_id: i64,
    pub target_kind: String,
    pub metadata: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Activity> for ActivityResponse {
    fn from(activity: Activity) -> Self {
        Self {
            id: activity.id,
            user_id: activity.user_id,
            kind: activity.kind.as_str().to_string(),
            target_id: activity.target_id,
            target_kind: activity.target_kind.as_str().to_string(),
            metadata: activity.metadata,
            created_at: activity.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct LeaderboardEntry {
    pub user_id: i64,
    pub username: String,
    pub points: i64,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /activity - Recent activity across all users
#[utoipa::path(
    get,
    path = "/activity",
    params(("limit" = Option<usize>, Query, description = "Maximum number of entries")),
    responses(
        (status = 200, description = "Newest entries first", body = [ActivityResponse]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn recent_activity_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FeedQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let limit = query.limit.unwrap_or(DEFAULT_FEED_LIMIT);
    let entries = state
        .store
        .recent_activity(None, Some(limit))
        .await
        .map_err(|e| {
            error!("Failed to load activity feed: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load feed".to_string())
        })?;

    let response: Vec<ActivityResponse> =
        entries.into_iter().map(ActivityResponse::from).collect();
    Ok(Json(response))
}

/// GET /users/{id}/activity - One user's recent activity
#[utoipa::path(
    get,
    path = "/users/{id}/activity",
    params(
        ("id" = i64, Path, description = "User id"),
        ("limit" = Option<usize>, Query, description = "Maximum number of entries")
    ),
    responses(
        (status = 200, description = "Newest entries first", body = [ActivityResponse]),
        (status = 404, description = "No such user")
    )
)]
pub async fn user_activity_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<FeedQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state
        .store
        .get_user(id)
        .await
        .map_err(|e| {
            error!("Failed to get user: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load feed".to_string())
        })?
        .ok_or((StatusCode::NOT_FOUND, "User not found".to_string()))?;

    let limit = query.limit.unwrap_or(DEFAULT_FEED_LIMIT);
    let entries = state
        .store
        .recent_activity(Some(id), Some(limit))
        .await
        .map_err(|e| {
            error!("Failed to load user activity: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load feed".to_string())
        })?;

    let response: Vec<ActivityResponse> =
        entries.into_iter().map(ActivityResponse::from).collect();
    Ok(Json(response))
}

/// GET /leaderboard - Users ranked by points
#[utoipa::path(
    get,
    path = "/leaderboard",
    params(("limit" = Option<usize>, Query, description = "Maximum number of entries")),
    responses(
        (status = 200, description = "Highest points first", body = [LeaderboardEntry]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn leaderboard_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FeedQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut users = state.store.list_users().await.map_err(|e| {
        error!("Failed to list users: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load leaderboard".to_string())
    })?;

    users.sort_by(|a, b| (b.points, a.id).cmp(&(a.points, b.id)));
    users.truncate(query.limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT));

    let response: Vec<LeaderboardEntry> = users
        .into_iter()
        .map(|u| LeaderboardEntry {
            user_id: u.id,
            username: u.username,
            points: u.points,
        })
        .collect();
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use studyhub_core::domain::{ActivityKind, TargetKind};

    #[test]
    fn activity_entries_serialize_with_string_kinds() {
        let entry = ActivityResponse::from(Activity {
            id: 7,
            user_id: 3,
            kind: ActivityKind::JoinedGroup,
            target_id: 12,
            target_kind: TargetKind::Group,
            metadata: None,
            created_at: Utc::now(),
        });

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["kind"], "joined_group");
        assert_eq!(value["target_kind"], "group");
        assert_eq!(value["target_id"], 12);
    }
}
