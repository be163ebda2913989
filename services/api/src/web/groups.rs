//! services/api/src/web/groups.rs
//!
//! Handlers for study groups and their memberships.

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
use studyhub_core::domain::{
    ActivityKind, NewActivity, NewStudyGroup, StudyGroup, StudyGroupMember, TargetKind,
};
use studyhub_core::ports::GroupFilter;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateGroupRequest {
    pub name: String,
    pub course: String,
    /// Display colour for the group badge, e.g. "#ff7700".
    pub color: String,
}

#[derive(Deserialize)]
pub struct GroupListQuery {
    pub course: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct GroupResponse {
    pub id: i64,
    pub creator_id: i64,
    pub name: String,
    pub course: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

impl From<StudyGroup> for GroupResponse {
    fn from(group: StudyGroup) -> Self {
        Self {
            id: group.id,
            creator_id: group.creator_id,
            name: group.name,
            course: group.course,
            color: group.color,
            created_at: group.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct MemberResponse {
    pub id: i64,
    pub group_id: i64,
    pub user_id: i64,
    pub is_admin: bool,
    pub joined_at: DateTime<Utc>,
}

impl From<StudyGroupMember> for MemberResponse {
    fn from(member: StudyGroupMember) -> Self {
        Self {
            id: member.id,
            group_id: member.group_id,
            user_id: member.user_id,
            is_admin: member.is_admin,
            joined_at: member.joined_at,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /study-groups - Create a study group
///
/// Creates the group, then adds the creator as its first admin member, then
/// logs the feed entry. The three steps are separate storage calls; there is
/// no transaction around them.
#[utoipa::path(
    post,
    path = "/study-groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Group created", body = GroupResponse),
        (status = 400, description = "Invalid request"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_group_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if req.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "name is required".to_string()));
    }

    let group = state
        .store
        .create_group(NewStudyGroup {
            creator_id: user_id,
            name: req.name,
            course: req.course,
            color: req.color,
        })
        .await
        .map_err(|e| {
            error!("Failed to create group: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create group".to_string())
        })?;

    state
        .store
        .add_group_member(group.id, user_id, true)
        .await
        .map_err(|e| {
            error!("Failed to add creator to group: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create group".to_string())
        })?;

    if let Err(e) = state
        .store
        .log_activity(NewActivity {
            user_id,
            kind: ActivityKind::CreatedGroup,
            target_id: group.id,
            target_kind: TargetKind::Group,
            metadata: Some(group.name.clone()),
        })
        .await
    {
        error!("Failed to log group activity: {:?}", e);
    }

    Ok((StatusCode::CREATED, Json(GroupResponse::from(group))))
}

/// GET /study-groups - Browse study groups
#[utoipa::path(
    get,
    path = "/study-groups",
    params(("course" = Option<String>, Query, description = "Exact course code")),
    responses(
        (status = 200, description = "Matching groups", body = [GroupResponse]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_groups_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GroupListQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let filter = GroupFilter {
        creator_id: None,
        course: query.course,
    };
    let groups = state.store.list_groups(filter).await.map_err(|e| {
        error!("Failed to list groups: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to list groups".to_string())
    })?;

    let response: Vec<GroupResponse> = groups.into_iter().map(GroupResponse::from).collect();
    Ok(Json(response))
}

/// GET /study-groups/mine - Groups the current user belongs to
#[utoipa::path(
    get,
    path = "/study-groups/mine",
    responses(
        (status = 200, description = "The user's groups", body = [GroupResponse]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn my_groups_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let groups = state.store.groups_for_user(user_id).await.map_err(|e| {
        error!("Failed to list user groups: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to list groups".to_string())
    })?;

    let response: Vec<GroupResponse> = groups.into_iter().map(GroupResponse::from).collect();
    Ok(Json(response))
}

/// GET /study-groups/{id} - Fetch one group
#[utoipa::path(
    get,
    path = "/study-groups/{id}",
    params(("id" = i64, Path, description = "Group id")),
    responses(
        (status = 200, description = "The group", body = GroupResponse),
        (status = 404, description = "No such group")
    )
)]
pub async fn get_group_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let group = state
        .store
        .get_group(id)
        .await
        .map_err(|e| {
            error!("Failed to get group: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to get group".to_string())
        })?
        .ok_or((StatusCode::NOT_FOUND, "Group not found".to_string()))?;

    Ok(Json(GroupResponse::from(group)))
}

/// GET /study-groups/{id}/members - List a group's members
#[utoipa::path(
    get,
    path = "/study-groups/{id}/members",
    params(("id" = i64, Path, description = "Group id")),
    responses(
        (status = 200, description = "The members", body = [MemberResponse]),
        (status = 404, description = "No such group")
    )
)]
pub async fn list_members_handler(
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

    let members = state.store.list_group_members(id).await.map_err(|e| {
        error!("Failed to list members: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to list members".to_string())
    })?;

    let response: Vec<MemberResponse> = members.into_iter().map(MemberResponse::from).collect();
    Ok(Json(response))
}

/// POST /study-groups/{id}/join - Join a group
#[utoipa::path(
    post,
    path = "/study-groups/{id}/join",
    params(("id" = i64, Path, description = "Group id")),
    responses(
        (status = 201, description = "Joined", body = MemberResponse),
        (status = 404, description = "No such group"),
        (status = 409, description = "Already a member")
    )
)]
pub async fn join_group_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
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

    // Pre-check only. Two racing joins can both pass and insert duplicate
    // membership rows; storage does not enforce the pair's uniqueness.
    let members = state.store.list_group_members(id).await.map_err(|e| {
        error!("Failed to list members: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to join group".to_string())
    })?;
    if members.iter().any(|m| m.user_id == user_id) {
        return Err((StatusCode::CONFLICT, "Already a member".to_string()));
    }

    let member = state
        .store
        .add_group_member(id, user_id, false)
        .await
        .map_err(|e| {
            error!("Failed to join group: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to join group".to_string())
        })?;

    if let Err(e) = state
        .store
        .log_activity(NewActivity {
            user_id,
            kind: ActivityKind::JoinedGroup,
            target_id: id,
            target_kind: TargetKind::Group,
            metadata: None,
        })
        .await
    {
        error!("Failed to log join activity: {:?}", e);
    }

    Ok((StatusCode::CREATED, Json(MemberResponse::from(member))))
}

/// DELETE /study-groups/{id}/members/{user_id} - Leave or remove a member
///
/// A user can remove themselves; a group admin can remove anyone. Group
/// sessions are untouched by a removal (no cascade).
#[utoipa::path(
    delete,
    path = "/study-groups/{id}/members/{user_id}",
    params(
        ("id" = i64, Path, description = "Group id"),
        ("user_id" = i64, Path, description = "User to remove")
    ),
    responses(
        (status = 204, description = "Membership removed"),
        (status = 403, description = "Not allowed to remove this member"),
        (status = 404, description = "No such membership")
    )
)]
pub async fn remove_member_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(requester_id)): Extension<CurrentUser>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if requester_id != user_id {
        let members = state.store.list_group_members(id).await.map_err(|e| {
            error!("Failed to list members: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to remove member".to_string())
        })?;
        let is_admin = members
            .iter()
            .any(|m| m.user_id == requester_id && m.is_admin);
        if !is_admin {
            return Err((
                StatusCode::FORBIDDEN,
                "Only admins can remove other members".to_string(),
            ));
        }
    }

    let removed = state
        .store
        .remove_group_member(id, user_id)
        .await
        .map_err(|e| {
            error!("Failed to remove member: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to remove member".to_string())
        })?;

    if !removed {
        return Err((StatusCode::NOT_FOUND, "Membership not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
