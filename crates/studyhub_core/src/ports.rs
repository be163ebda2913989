//! crates/studyhub_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Activity, DiscussionPost, DiscussionReply, NewActivity, NewDiscussionPost, NewPaper,
    NewStudyGroup, NewStudySession, NewUser, Paper, StudyGroup, StudyGroupMember, StudySession,
    User,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
///
/// Note that a failed lookup is not an error: every `get_*` operation returns
/// `Ok(None)` for an id that was never issued. `NotFound` is reserved for
/// operations where the caller named something that must exist (an auth
/// session token, for instance).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Typed Filters
//=========================================================================================
// Each filter enumerates the exact fields a listing can match on. A set
// field must match by strict equality; setting several fields intersects
// them. Free-text search is a caller concern, done by scanning the
// unfiltered list.
//=========================================================================================

#[derive(Debug, Clone, Default)]
pub struct PaperFilter {
    pub uploader_id: Option<i64>,
    pub course: Option<String>,
    pub year: Option<i32>,
    pub institution: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub author_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct GroupFilter {
    pub creator_id: Option<i64>,
    pub course: Option<String>,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The storage contract for all domain entities.
///
/// Implementations own every stored record exclusively: reads hand back
/// clones, and every mutation goes through a named operation that replaces
/// the stored copy. Identifiers are assigned by the implementation,
/// monotonically increasing per entity type and never reused. Unfiltered
/// listings come back in creation order.
#[async_trait]
pub trait StorageService: Send + Sync {
    // --- Users ---
    async fn create_user(&self, new_user: NewUser) -> PortResult<User>;

    async fn get_user(&self, id: i64) -> PortResult<Option<User>>;

    /// Username comparison is case-insensitive.
    async fn get_user_by_username(&self, username: &str) -> PortResult<Option<User>>;

    /// Email comparison is case-insensitive.
    async fn get_user_by_email(&self, email: &str) -> PortResult<Option<User>>;

    async fn list_users(&self) -> PortResult<Vec<User>>;

    /// Adds `delta` to the user's points and returns the updated user, or
    /// `None` if the id is unknown.
    async fn add_user_points(&self, user_id: i64, delta: i64) -> PortResult<Option<User>>;

    // --- Papers ---
    async fn create_paper(&self, new_paper: NewPaper) -> PortResult<Paper>;

    async fn get_paper(&self, id: i64) -> PortResult<Option<Paper>>;

    async fn list_papers(&self, filter: PaperFilter) -> PortResult<Vec<Paper>>;

    /// Bumps the download counter by exactly one. Returns the updated paper,
    /// or `None` (leaving storage untouched) if the id is unknown.
    async fn increment_paper_downloads(&self, id: i64) -> PortResult<Option<Paper>>;

    // --- Discussions ---
    async fn create_post(&self, new_post: NewDiscussionPost) -> PortResult<DiscussionPost>;

    async fn get_post(&self, id: i64) -> PortResult<Option<DiscussionPost>>;

    async fn list_posts(&self, filter: PostFilter) -> PortResult<Vec<DiscussionPost>>;

    /// Adds `delta` to the post's vote count. Deltas are caller-supplied and
    /// unbounded; the count may go negative.
    async fn vote_post(&self, id: i64, delta: i64) -> PortResult<Option<DiscussionPost>>;

    async fn create_reply(
        &self,
        post_id: i64,
        author_id: i64,
        content: &str,
    ) -> PortResult<DiscussionReply>;

    async fn get_reply(&self, id: i64) -> PortResult<Option<DiscussionReply>>;

    async fn list_replies_for_post(&self, post_id: i64) -> PortResult<Vec<DiscussionReply>>;

    async fn vote_reply(&self, id: i64, delta: i64) -> PortResult<Option<DiscussionReply>>;

    // --- Study Groups ---
    async fn create_group(&self, new_group: NewStudyGroup) -> PortResult<StudyGroup>;

    async fn get_group(&self, id: i64) -> PortResult<Option<StudyGroup>>;

    async fn list_groups(&self, filter: GroupFilter) -> PortResult<Vec<StudyGroup>>;

    async fn add_group_member(
        &self,
        group_id: i64,
        user_id: i64,
        is_admin: bool,
    ) -> PortResult<StudyGroupMember>;

    async fn list_group_members(&self, group_id: i64) -> PortResult<Vec<StudyGroupMember>>;

    /// Removes the membership row matching (group_id, user_id). Returns
    /// `false` and changes nothing when no such row exists; removes exactly
    /// one row and returns `true` when it does.
    async fn remove_group_member(&self, group_id: i64, user_id: i64) -> PortResult<bool>;

    /// All groups the user holds a membership row for.
    async fn groups_for_user(&self, user_id: i64) -> PortResult<Vec<StudyGroup>>;

    // --- Study Sessions ---
    async fn create_study_session(&self, new_session: NewStudySession)
        -> PortResult<StudySession>;

    async fn get_study_session(&self, id: i64) -> PortResult<Option<StudySession>>;

    async fn list_sessions_for_group(&self, group_id: i64) -> PortResult<Vec<StudySession>>;

    /// Sessions of the user's groups whose `start_time` is in the future,
    /// ascending by `start_time`.
    async fn upcoming_sessions_for_user(&self, user_id: i64) -> PortResult<Vec<StudySession>>;

    // --- Activity Feed ---
    async fn log_activity(&self, new_activity: NewActivity) -> PortResult<Activity>;

    /// Most recent entries first, optionally restricted to one user and
    /// truncated to `limit`.
    async fn recent_activity(
        &self,
        user_id: Option<i64>,
        limit: Option<usize>,
    ) -> PortResult<Vec<Activity>>;

    // --- Auth Sessions ---
    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Resolves a session token to its user id. Fails with `NotFound` for an
    /// unknown token and `Unauthorized` for an expired one.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<i64>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;
}
