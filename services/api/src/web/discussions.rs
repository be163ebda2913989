//! services/api/src/web/discussions.rs
//!
//! Handlers for the discussion forum: posts, replies, and voting.

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
    ActivityKind, DiscussionPost, DiscussionReply, NewActivity, NewDiscussionPost, TargetKind,
};
use studyhub_core::ports::PostFilter;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateReplyRequest {
    pub content: String,
}

#[derive(Deserialize, ToSchema)]
pub struct VoteRequest {
    /// +1 for an upvote, -1 for a downvote. Repeat votes are not deduplicated.
    pub delta: i64,
}

#[derive(Deserialize)]
pub struct PostListQuery {
    pub author_id: Option<i64>,
    /// Keep only posts carrying this exact tag.
    pub tag: Option<String>,
    /// Case-insensitive substring match over title and content.
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PostResponse {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub votes: i64,
    pub created_at: DateTime<Utc>,
}

impl From<DiscussionPost> for PostResponse {
    fn from(post: DiscussionPost) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            title: post.title,
            content: post.content,
            tags: post.tags,
            votes: post.votes,
            created_at: post.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ReplyResponse {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub content: String,
    pub votes: i64,
    pub created_at: DateTime<Utc>,
}

impl From<DiscussionReply> for ReplyResponse {
    fn from(reply: DiscussionReply) -> Self {
        Self {
            id: reply.id,
            post_id: reply.post_id,
            author_id: reply.author_id,
            content: reply.content,
            votes: reply.votes,
            created_at: reply.created_at,
        }
    }
}

/// One post together with its replies, as rendered on the thread page.
#[derive(Serialize, ToSchema)]
pub struct ThreadResponse {
    pub post: PostResponse,
    pub replies: Vec<ReplyResponse>,
}

fn check_vote_delta(delta: i64) -> Result<(), (StatusCode, String)> {
    if delta == 1 || delta == -1 {
        Ok(())
    } else {
        Err((StatusCode::BAD_REQUEST, "delta must be +1 or -1".to_string()))
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /discussions - Start a discussion
#[utoipa::path(
    post,
    path = "/discussions",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Invalid request"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_post_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(req): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if req.title.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "title is required".to_string()));
    }

    let post = state
        .store
        .create_post(NewDiscussionPost {
            author_id: user_id,
            title: req.title,
            content: req.content,
            tags: req.tags,
        })
        .await
        .map_err(|e| {
            error!("Failed to create post: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create post".to_string())
        })?;

    if let Err(e) = state
        .store
        .log_activity(NewActivity {
            user_id,
            kind: ActivityKind::CreatedPost,
            target_id: post.id,
            target_kind: TargetKind::Post,
            metadata: Some(post.title.clone()),
        })
        .await
    {
        error!("Failed to log post activity: {:?}", e);
    }

    Ok((StatusCode::CREATED, Json(PostResponse::from(post))))
}

/// GET /discussions - Browse discussions
#[utoipa::path(
    get,
    path = "/discussions",
    params(
        ("author_id" = Option<i64>, Query, description = "Only posts by this author"),
        ("tag" = Option<String>, Query, description = "Only posts carrying this tag"),
        ("search" = Option<String>, Query, description = "Free-text search")
    ),
    responses(
        (status = 200, description = "Matching posts", body = [PostResponse]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_posts_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PostListQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let filter = PostFilter {
        author_id: query.author_id,
    };
    let mut posts = state.store.list_posts(filter).await.map_err(|e| {
        error!("Failed to list posts: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to list posts".to_string())
    })?;

    if let Some(tag) = query.tag {
        posts.retain(|p| p.tags.iter().any(|t| t == &tag));
    }
    if let Some(needle) = query.search {
        let needle = needle.to_lowercase();
        posts.retain(|p| {
            p.title.to_lowercase().contains(&needle) || p.content.to_lowercase().contains(&needle)
        });
    }

    let response: Vec<PostResponse> = posts.into_iter().map(PostResponse::from).collect();
    Ok(Json(response))
}

/// GET /discussions/{id} - One thread with its replies
#[utoipa::path(
    get,
    path = "/discussions/{id}",
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "The thread", body = ThreadResponse),
        (status = 404, description = "No such post")
    )
)]
pub async fn get_thread_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let post = state
        .store
        .get_post(id)
        .await
        .map_err(|e| {
            error!("Failed to get post: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to get post".to_string())
        })?
        .ok_or((StatusCode::NOT_FOUND, "Post not found".to_string()))?;

    let replies = state.store.list_replies_for_post(id).await.map_err(|e| {
        error!("Failed to list replies: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to list replies".to_string())
    })?;

    Ok(Json(ThreadResponse {
        post: PostResponse::from(post),
        replies: replies.into_iter().map(ReplyResponse::from).collect(),
    }))
}

/// POST /discussions/{id}/replies - Reply to a post
#[utoipa::path(
    post,
    path = "/discussions/{id}/replies",
    params(("id" = i64, Path, description = "Post id")),
    request_body = CreateReplyRequest,
    responses(
        (status = 201, description = "Reply created", body = ReplyResponse),
        (status = 404, description = "No such post"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_reply_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<CreateReplyRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // The post must exist; replies to deleted threads are impossible because
    // posts are never deleted, but an unknown id still gets a 404.
    state
        .store
        .get_post(id)
        .await
        .map_err(|e| {
            error!("Failed to get post: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to get post".to_string())
        })?
        .ok_or((StatusCode::NOT_FOUND, "Post not found".to_string()))?;

    let reply = state
        .store
        .create_reply(id, user_id, &req.content)
        .await
        .map_err(|e| {
            error!("Failed to create reply: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create reply".to_string())
        })?;

    if let Err(e) = state
        .store
        .log_activity(NewActivity {
            user_id,
            kind: ActivityKind::RepliedToPost,
            target_id: reply.id,
            target_kind: TargetKind::Reply,
            metadata: None,
        })
        .await
    {
        error!("Failed to log reply activity: {:?}", e);
    }

    Ok((StatusCode::CREATED, Json(ReplyResponse::from(reply))))
}

/// POST /discussions/{id}/vote - Vote on a post
#[utoipa::path(
    post,
    path = "/discussions/{id}/vote",
    params(("id" = i64, Path, description = "Post id")),
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Updated post", body = PostResponse),
        (status = 400, description = "Invalid delta"),
        (status = 404, description = "No such post")
    )
)]
pub async fn vote_post_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<VoteRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    check_vote_delta(req.delta)?;

    let post = state
        .store
        .vote_post(id, req.delta)
        .await
        .map_err(|e| {
            error!("Failed to vote on post: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to vote".to_string())
        })?
        .ok_or((StatusCode::NOT_FOUND, "Post not found".to_string()))?;

    Ok(Json(PostResponse::from(post)))
}

/// POST /replies/{id}/vote - Vote on a reply
#[utoipa::path(
    post,
    path = "/replies/{id}/vote",
    params(("id" = i64, Path, description = "Reply id")),
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Updated reply", body = ReplyResponse),
        (status = 400, description = "Invalid delta"),
        (status = 404, description = "No such reply")
    )
)]
pub async fn vote_reply_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<VoteRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    check_vote_delta(req.delta)?;

    let reply = state
        .store
        .vote_reply(id, req.delta)
        .await
        .map_err(|e| {
            error!("Failed to vote on reply: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to vote".to_string())
        })?
        .ok_or((StatusCode::NOT_FOUND, "Reply not found".to_string()))?;

    Ok(Json(ReplyResponse::from(reply)))
}
