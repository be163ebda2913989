//! crates/studyhub_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage backend or serialization format.

use chrono::{DateTime, Utc};

/// Represents a registered student account.
///
/// `password_hash` is produced by the caller (the web layer hashes with
/// argon2 before the value ever reaches storage) and must never be exposed
/// outside the auth flow.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub points: i64,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied fields for creating a `User`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// A past exam paper shared by a user. `file_url` points at an externally
/// hosted file; this service never touches file contents.
#[derive(Debug, Clone, PartialEq)]
pub struct Paper {
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

#[derive(Debug, Clone)]
pub struct NewPaper {
    pub uploader_id: i64,
    pub title: String,
    pub course: String,
    pub year: i32,
    pub institution: String,
    pub file_url: String,
}

/// A top-level forum post.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscussionPost {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub votes: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDiscussionPost {
    pub author_id: i64,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

/// A reply under a discussion post. Votes follow the same semantics as the
/// parent post: a signed counter with no dedup of repeat voters.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscussionReply {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub content: String,
    pub votes: i64,
    pub created_at: DateTime<Utc>,
}

/// A study group. The creator is added as the first admin member by the
/// caller, not by storage (the two steps are separate operations).
#[derive(Debug, Clone, PartialEq)]
pub struct StudyGroup {
    pub id: i64,
    pub creator_id: i64,
    pub name: String,
    pub course: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewStudyGroup {
    pub creator_id: i64,
    pub name: String,
    pub course: String,
    pub color: String,
}

/// Links a user to a study group. One logical membership per
/// (group_id, user_id) pair; nothing below the route layer enforces that.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyGroupMember {
    pub id: i64,
    pub group_id: i64,
    pub user_id: i64,
    pub is_admin: bool,
    pub joined_at: DateTime<Utc>,
}

/// A scheduled meeting of a study group. Virtual sessions carry a
/// `meeting_link`, in-person ones a `location`; no conflict checking is done.
#[derive(Debug, Clone, PartialEq)]
pub struct StudySession {
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

#[derive(Debug, Clone)]
pub struct NewStudySession {
    pub group_id: i64,
    pub created_by: i64,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_virtual: bool,
    pub location: Option<String>,
    pub meeting_link: Option<String>,
}

/// The kind of action an activity entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    UploadedPaper,
    DownloadedPaper,
    CreatedPost,
    RepliedToPost,
    CreatedGroup,
    JoinedGroup,
    ScheduledSession,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::UploadedPaper => "uploaded_paper",
            ActivityKind::DownloadedPaper => "downloaded_paper",
            ActivityKind::CreatedPost => "created_post",
            ActivityKind::RepliedToPost => "replied_to_post",
            ActivityKind::CreatedGroup => "created_group",
            ActivityKind::JoinedGroup => "joined_group",
            ActivityKind::ScheduledSession => "scheduled_session",
        }
    }
}

/// The entity type an activity entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Paper,
    Post,
    Reply,
    Group,
    Session,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Paper => "paper",
            TargetKind::Post => "post",
            TargetKind::Reply => "reply",
            TargetKind::Group => "group",
            TargetKind::Session => "session",
        }
    }
}

/// One append-only entry in the activity feed. Entries reference their
/// target by (target_id, target_kind) and are never mutated or deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub id: i64,
    pub user_id: i64,
    pub kind: ActivityKind,
    pub target_id: i64,
    pub target_kind: TargetKind,
    pub metadata: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewActivity {
    pub user_id: i64,
    pub kind: ActivityKind,
    pub target_id: i64,
    pub target_kind: TargetKind,
    pub metadata: Option<String>,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}
