//! services/api/src/web/docs.rs
//!
//! The master definition for the OpenAPI specification, assembled from the
//! per-module handler annotations.

use utoipa::OpenApi;

use crate::web::{auth, discussions, feed, groups, papers, sessions};

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::me_handler,
        papers::create_paper_handler,
        papers::list_papers_handler,
        papers::get_paper_handler,
        papers::download_paper_handler,
        discussions::create_post_handler,
        discussions::list_posts_handler,
        discussions::get_thread_handler,
        discussions::create_reply_handler,
        discussions::vote_post_handler,
        discussions::vote_reply_handler,
        groups::create_group_handler,
        groups::list_groups_handler,
        groups::my_groups_handler,
        groups::get_group_handler,
        groups::list_members_handler,
        groups::join_group_handler,
        groups::remove_member_handler,
        sessions::create_session_handler,
        sessions::group_sessions_handler,
        sessions::upcoming_sessions_handler,
        feed::recent_activity_handler,
        feed::user_activity_handler,
        feed::leaderboard_handler,
    ),
    components(
        schemas(
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            papers::CreatePaperRequest,
            papers::PaperResponse,
            discussions::CreatePostRequest,
            discussions::CreateReplyRequest,
            discussions::VoteRequest,
            discussions::PostResponse,
            discussions::ReplyResponse,
            discussions::ThreadResponse,
            groups::CreateGroupRequest,
            groups::GroupResponse,
            groups::MemberResponse,
            sessions::CreateSessionRequest,
            sessions::SessionResponse,
            feed::ActivityResponse,
            feed::LeaderboardEntry,
        )
    ),
    tags(
        (name = "StudyHub API", description = "API endpoints for the student collaboration platform.")
    )
)]
pub struct ApiDoc;
