//! services/api/src/adapters/store.rs
//!
//! This module contains the in-memory storage adapter, which is the concrete
//! implementation of the `StorageService` port from the `core` crate. All
//! state lives for the lifetime of the process; a real deployment would swap
//! this adapter for one backed by a relational database.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use studyhub_core::domain::{
    Activity, AuthSession, DiscussionPost, DiscussionReply, NewActivity, NewDiscussionPost,
    NewPaper, NewStudyGroup, NewStudySession, NewUser, Paper, StudyGroup, StudyGroupMember,
    StudySession, User,
};
use studyhub_core::ports::{
    GroupFilter, PaperFilter, PortError, PortResult, PostFilter, StorageService,
};

//=========================================================================================
// Keyed Tables
//=========================================================================================

/// One keyed collection with its own id counter. Ids start at 1, grow
/// monotonically, and are never reused even after a row is removed.
struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Assigns a fresh id, stores the row built from it, and returns a copy.
    fn insert_with(&mut self, build: impl FnOnce(i64) -> T) -> T {
        let id = self.next_id;
        self.next_id += 1;
        let row = build(id);
        self.rows.insert(id, row.clone());
        row
    }

    fn get(&self, id: i64) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    /// All rows in creation order (ids are assigned in insertion order, so
    /// iterating the map by key is exactly that).
    fn all(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }

    /// Read-modify-replace on a single row. Returns the updated copy, or
    /// `None` (leaving the table untouched) for an unknown id.
    fn update(&mut self, id: i64, apply: impl FnOnce(&mut T)) -> Option<T> {
        let row = self.rows.get_mut(&id)?;
        apply(row);
        Some(row.clone())
    }

    fn remove(&mut self, id: i64) -> Option<T> {
        self.rows.remove(&id)
    }
}

/// Every collection the store owns. Guarded as a whole by one lock so a
/// single trait call can never observe another call half-applied.
struct Tables {
    users: Table<User>,
    papers: Table<Paper>,
    posts: Table<DiscussionPost>,
    replies: Table<DiscussionReply>,
    groups: Table<StudyGroup>,
    members: Table<StudyGroupMember>,
    sessions: Table<StudySession>,
    activities: Table<Activity>,
    auth_sessions: HashMap<String, AuthSession>,
}

impl Tables {
    fn new() -> Self {
        Self {
            users: Table::new(),
            papers: Table::new(),
            posts: Table::new(),
            replies: Table::new(),
            groups: Table::new(),
            members: Table::new(),
            sessions: Table::new(),
            activities: Table::new(),
            auth_sessions: HashMap::new(),
        }
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A process-lifetime storage adapter that implements the `StorageService` port.
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates a new, empty `MemoryStore`.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Tables::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================================
// `StorageService` Trait Implementation
//=========================================================================================

#[async_trait]
impl StorageService for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        let mut tables = self.inner.write().await;
        let now = Utc::now();
        Ok(tables.users.insert_with(|id| User {
            id,
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            points: 0,
            created_at: now,
        }))
    }

    async fn get_user(&self, id: i64) -> PortResult<Option<User>> {
        let tables = self.inner.read().await;
        Ok(tables.users.get(id))
    }

    async fn get_user_by_username(&self, username: &str) -> PortResult<Option<User>> {
        let tables = self.inner.read().await;
        Ok(tables
            .users
            .all()
            .into_iter()
            .find(|u| u.username.eq_ignore_ascii_case(username)))
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<Option<User>> {
        let tables = self.inner.read().await;
        Ok(tables
            .users
            .all()
            .into_iter()
            .find(|u| u.email.eq_ignore_ascii_case(email)))
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        let tables = self.inner.read().await;
        Ok(tables.users.all())
    }

    async fn add_user_points(&self, user_id: i64, delta: i64) -> PortResult<Option<User>> {
        let mut tables = self.inner.write().await;
        Ok(tables.users.update(user_id, |u| u.points += delta))
    }

    async fn create_paper(&self, new_paper: NewPaper) -> PortResult<Paper> {
        let mut tables = self.inner.write().await;
        let now = Utc::now();
        Ok(tables.papers.insert_with(|id| Paper {
            id,
            uploader_id: new_paper.uploader_id,
            title: new_paper.title,
            course: new_paper.course,
            year: new_paper.year,
            institution: new_paper.institution,
            file_url: new_paper.file_url,
            downloads: 0,
            created_at: now,
        }))
    }

    async fn get_paper(&self, id: i64) -> PortResult<Option<Paper>> {
        let tables = self.inner.read().await;
        Ok(tables.papers.get(id))
    }

    async fn list_papers(&self, filter: PaperFilter) -> PortResult<Vec<Paper>> {
        let tables = self.inner.read().await;
        Ok(tables
            .papers
            .all()
            .into_iter()
            .filter(|p| {
                filter.uploader_id.map_or(true, |v| p.uploader_id == v)
                    && filter.course.as_deref().map_or(true, |v| p.course == v)
                    && filter.year.map_or(true, |v| p.year == v)
                    && filter
                        .institution
                        .as_deref()
                        .map_or(true, |v| p.institution == v)
            })
            .collect())
    }

    async fn increment_paper_downloads(&self, id: i64) -> PortResult<Option<Paper>> {
        let mut tables = self.inner.write().await;
        Ok(tables.papers.update(id, |p| p.downloads += 1))
    }

    async fn create_post(&self, new_post: NewDiscussionPost) -> PortResult<DiscussionPost> {
        let mut tables = self.inner.write().await;
        let now = Utc::now();
        Ok(tables.posts.insert_with(|id| DiscussionPost {
            id,
            author_id: new_post.author_id,
            title: new_post.title,
            content: new_post.content,
            tags: new_post.tags,
            votes: 0,
            created_at: now,
        }))
    }

    async fn get_post(&self, id: i64) -> PortResult<Option<DiscussionPost>> {
        let tables = self.inner.read().await;
        Ok(tables.posts.get(id))
    }

    async fn list_posts(&self, filter: PostFilter) -> PortResult<Vec<DiscussionPost>> {
        let tables = self.inner.read().await;
        Ok(tables
            .posts
            .all()
            .into_iter()
            .filter(|p| filter.author_id.map_or(true, |v| p.author_id == v))
            .collect())
    }

    async fn vote_post(&self, id: i64, delta: i64) -> PortResult<Option<DiscussionPost>> {
        let mut tables = self.inner.write().await;
        Ok(tables.posts.update(id, |p| p.votes += delta))
    }

    async fn create_reply(
        &self,
        post_id: i64,
        author_id: i64,
        content: &str,
    ) -> PortResult<DiscussionReply> {
        let mut tables = self.inner.write().await;
        let now = Utc::now();
        Ok(tables.replies.insert_with(|id| DiscussionReply {
            id,
            post_id,
            author_id,
            content: content.to_string(),
            votes: 0,
            created_at: now,
        }))
    }

    async fn get_reply(&self, id: i64) -> PortResult<Option<DiscussionReply>> {
        let tables = self.inner.read().await;
        Ok(tables.replies.get(id))
    }

    async fn list_replies_for_post(&self, post_id: i64) -> PortResult<Vec<DiscussionReply>> {
        let tables = self.inner.read().await;
        Ok(tables
            .replies
            .all()
            .into_iter()
            .filter(|r| r.post_id == post_id)
            .collect())
    }

    async fn vote_reply(&self, id: i64, delta: i64) -> PortResult<Option<DiscussionReply>> {
        let mut tables = self.inner.write().await;
        Ok(tables.replies.update(id, |r| r.votes += delta))
    }

    async fn create_group(&self, new_group: NewStudyGroup) -> PortResult<StudyGroup> {
        let mut tables = self.inner.write().await;
        let now = Utc::now();
        Ok(tables.groups.insert_with(|id| StudyGroup {
            id,
            creator_id: new_group.creator_id,
            name: new_group.name,
            course: new_group.course,
            color: new_group.color,
            created_at: now,
        }))
    }

    async fn get_group(&self, id: i64) -> PortResult<Option<StudyGroup>> {
        let tables = self.inner.read().await;
        Ok(tables.groups.get(id))
    }

    async fn list_groups(&self, filter: GroupFilter) -> PortResult<Vec<StudyGroup>> {
        let tables = self.inner.read().await;
        Ok(tables
            .groups
            .all()
            .into_iter()
            .filter(|g| {
                filter.creator_id.map_or(true, |v| g.creator_id == v)
                    && filter.course.as_deref().map_or(true, |v| g.course == v)
            })
            .collect())
    }

    async fn add_group_member(
        &self,
        group_id: i64,
        user_id: i64,
        is_admin: bool,
    ) -> PortResult<StudyGroupMember> {
        let mut tables = self.inner.write().await;
        let now = Utc::now();
        Ok(tables.members.insert_with(|id| StudyGroupMember {
            id,
            group_id,
            user_id,
            is_admin,
            joined_at: now,
        }))
    }

    async fn list_group_members(&self, group_id: i64) -> PortResult<Vec<StudyGroupMember>> {
        let tables = self.inner.read().await;
        Ok(tables
            .members
            .all()
            .into_iter()
            .filter(|m| m.group_id == group_id)
            .collect())
    }

    async fn remove_group_member(&self, group_id: i64, user_id: i64) -> PortResult<bool> {
        let mut tables = self.inner.write().await;
        let member_id = tables
            .members
            .all()
            .into_iter()
            .find(|m| m.group_id == group_id && m.user_id == user_id)
            .map(|m| m.id);
        match member_id {
            Some(id) => {
                tables.members.remove(id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn groups_for_user(&self, user_id: i64) -> PortResult<Vec<StudyGroup>> {
        let tables = self.inner.read().await;
        let group_ids: Vec<i64> = tables
            .members
            .all()
            .into_iter()
            .filter(|m| m.user_id == user_id)
            .map(|m| m.group_id)
            .collect();
        Ok(tables
            .groups
            .all()
            .into_iter()
            .filter(|g| group_ids.contains(&g.id))
            .collect())
    }

    async fn create_study_session(
        &self,
        new_session: NewStudySession,
    ) -> PortResult<StudySession> {
        let mut tables = self.inner.write().await;
        let now = Utc::now();
        Ok(tables.sessions.insert_with(|id| StudySession {
            id,
            group_id: new_session.group_id,
            created_by: new_session.created_by,
            title: new_session.title,
            start_time: new_session.start_time,
            end_time: new_session.end_time,
            is_virtual: new_session.is_virtual,
            location: new_session.location,
            meeting_link: new_session.meeting_link,
            created_at: now,
        }))
    }

    async fn get_study_session(&self, id: i64) -> PortResult<Option<StudySession>> {
        let tables = self.inner.read().await;
        Ok(tables.sessions.get(id))
    }

    async fn list_sessions_for_group(&self, group_id: i64) -> PortResult<Vec<StudySession>> {
        let tables = self.inner.read().await;
        Ok(tables
            .sessions
            .all()
            .into_iter()
            .filter(|s| s.group_id == group_id)
            .collect())
    }

    async fn upcoming_sessions_for_user(&self, user_id: i64) -> PortResult<Vec<StudySession>> {
        let tables = self.inner.read().await;
        let group_ids: Vec<i64> = tables
            .members
            .all()
            .into_iter()
            .filter(|m| m.user_id == user_id)
            .map(|m| m.group_id)
            .collect();
        let now = Utc::now();
        let mut sessions: Vec<StudySession> = tables
            .sessions
            .all()
            .into_iter()
            .filter(|s| group_ids.contains(&s.group_id) && s.start_time > now)
            .collect();
        sessions.sort_by_key(|s| s.start_time);
        Ok(sessions)
    }

    async fn log_activity(&self, new_activity: NewActivity) -> PortResult<Activity> {
        let mut tables = self.inner.write().await;
        let now = Utc::now();
        Ok(tables.activities.insert_with(|id| Activity {
            id,
            user_id: new_activity.user_id,
            kind: new_activity.kind,
            target_id: new_activity.target_id,
            target_kind: new_activity.target_kind,
            metadata: new_activity.metadata,
            created_at: now,
        }))
    }

    async fn recent_activity(
        &self,
        user_id: Option<i64>,
        limit: Option<usize>,
    ) -> PortResult<Vec<Activity>> {
        let tables = self.inner.read().await;
        let mut entries: Vec<Activity> = tables
            .activities
            .all()
            .into_iter()
            .filter(|a| user_id.map_or(true, |v| a.user_id == v))
            .collect();
        // Id is the tiebreak so entries logged within one timestamp tick
        // still come back newest-first.
        entries.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let mut tables = self.inner.write().await;
        tables.auth_sessions.insert(
            session_id.to_string(),
            AuthSession {
                id: session_id.to_string(),
                user_id,
                expires_at,
            },
        );
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<i64> {
        let tables = self.inner.read().await;
        let session = tables
            .auth_sessions
            .get(session_id)
            .ok_or_else(|| PortError::NotFound(format!("Auth session {} not found", session_id)))?;
        if session.expires_at <= Utc::now() {
            return Err(PortError::Unauthorized);
        }
        Ok(session.user_id)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        let mut tables = self.inner.write().await;
        tables.auth_sessions.remove(session_id);
        Ok(())
    }
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use studyhub_core::domain::{ActivityKind, TargetKind};

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: format!("{}@example.edu", username),
            password_hash: "$argon2id$fake".to_string(),
        }
    }

    fn new_paper(uploader_id: i64, course: &str, year: i32) -> NewPaper {
        NewPaper {
            uploader_id,
            title: format!("{} final {}", course, year),
            course: course.to_string(),
            year,
            institution: "Hilltop University".to_string(),
            file_url: "https://files.example.edu/paper.pdf".to_string(),
        }
    }

    fn new_session(group_id: i64, created_by: i64, starts_in: Duration) -> NewStudySession {
        let start_time = Utc::now() + starts_in;
        NewStudySession {
            group_id,
            created_by,
            title: "Revision".to_string(),
            start_time,
            end_time: start_time + Duration::hours(1),
            is_virtual: true,
            location: None,
            meeting_link: Some("https://meet.example.edu/abc".to_string()),
        }
    }

    #[tokio::test]
    async fn ids_are_strictly_increasing_per_entity_type() {
        let store = MemoryStore::new();
        let u1 = store.create_user(new_user("alice")).await.unwrap();
        let u2 = store.create_user(new_user("bob")).await.unwrap();
        let p1 = store.create_paper(new_paper(u1.id, "CS101", 2023)).await.unwrap();
        let p2 = store.create_paper(new_paper(u2.id, "CS101", 2024)).await.unwrap();

        assert!(u2.id > u1.id);
        assert!(p2.id > p1.id);
        // Counters are independent per entity type.
        assert_eq!(p1.id, 1);
    }

    #[tokio::test]
    async fn get_returns_what_create_returned() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("alice")).await.unwrap();
        let paper = store.create_paper(new_paper(user.id, "MATH200", 2022)).await.unwrap();

        assert_eq!(store.get_paper(paper.id).await.unwrap(), Some(paper));
        assert_eq!(store.get_paper(9999).await.unwrap(), None);
        assert_eq!(store.get_user(9999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn unfiltered_list_is_in_creation_order() {
        let store = MemoryStore::new();
        for year in [2020, 2021, 2022] {
            store.create_paper(new_paper(1, "CS101", year)).await.unwrap();
        }
        let papers = store.list_papers(PaperFilter::default()).await.unwrap();
        let years: Vec<i32> = papers.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2020, 2021, 2022]);
    }

    #[tokio::test]
    async fn paper_filter_fields_intersect() {
        let store = MemoryStore::new();
        store.create_paper(new_paper(1, "CS101", 2023)).await.unwrap();
        store.create_paper(new_paper(1, "CS101", 2024)).await.unwrap();
        store.create_paper(new_paper(2, "MATH200", 2023)).await.unwrap();

        let filter = PaperFilter {
            course: Some("CS101".to_string()),
            year: Some(2023),
            ..Default::default()
        };
        let papers = store.list_papers(filter).await.unwrap();
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].course, "CS101");
        assert_eq!(papers[0].year, 2023);
    }

    #[tokio::test]
    async fn download_counter_counts_calls() {
        let store = MemoryStore::new();
        let paper = store.create_paper(new_paper(1, "CS101", 2023)).await.unwrap();
        assert_eq!(paper.downloads, 0);

        for _ in 0..3 {
            store.increment_paper_downloads(paper.id).await.unwrap();
        }
        let fetched = store.get_paper(paper.id).await.unwrap().unwrap();
        assert_eq!(fetched.downloads, 3);

        // Unknown id: absent result, nothing changes.
        assert!(store.increment_paper_downloads(9999).await.unwrap().is_none());
        let fetched = store.get_paper(paper.id).await.unwrap().unwrap();
        assert_eq!(fetched.downloads, 3);
    }

    #[tokio::test]
    async fn opposite_votes_cancel_out() {
        let store = MemoryStore::new();
        let post = store
            .create_post(NewDiscussionPost {
                author_id: 1,
                title: "Is this store thread safe?".to_string(),
                content: "Asking for a friend.".to_string(),
                tags: vec!["rust".to_string()],
            })
            .await
            .unwrap();

        store.vote_post(post.id, 1).await.unwrap();
        let voted = store.vote_post(post.id, -1).await.unwrap().unwrap();
        assert_eq!(voted.votes, post.votes);

        // Votes are unbounded below.
        let down = store.vote_post(post.id, -1).await.unwrap().unwrap();
        assert_eq!(down.votes, -1);

        let reply = store.create_reply(post.id, 2, "It is not.").await.unwrap();
        store.vote_reply(reply.id, 1).await.unwrap();
        let reply = store.get_reply(reply.id).await.unwrap().unwrap();
        assert_eq!(reply.votes, 1);
    }

    #[tokio::test]
    async fn replies_come_back_for_their_post_only() {
        let store = MemoryStore::new();
        let first = store
            .create_post(NewDiscussionPost {
                author_id: 1,
                title: "first".to_string(),
                content: "".to_string(),
                tags: vec![],
            })
            .await
            .unwrap();
        let second = store
            .create_post(NewDiscussionPost {
                author_id: 1,
                title: "second".to_string(),
                content: "".to_string(),
                tags: vec![],
            })
            .await
            .unwrap();

        store.create_reply(first.id, 2, "a").await.unwrap();
        store.create_reply(second.id, 2, "b").await.unwrap();
        store.create_reply(first.id, 3, "c").await.unwrap();

        let replies = store.list_replies_for_post(first.id).await.unwrap();
        let bodies: Vec<&str> = replies.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(bodies, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn membership_lifecycle() {
        let store = MemoryStore::new();
        let creator = store.create_user(new_user("alice")).await.unwrap();
        let joiner = store.create_user(new_user("bob")).await.unwrap();
        let group = store
            .create_group(NewStudyGroup {
                creator_id: creator.id,
                name: "Finals crunch".to_string(),
                course: "CS101".to_string(),
                color: "#ff7700".to_string(),
            })
            .await
            .unwrap();

        // The route layer adds the creator as the first admin member.
        store.add_group_member(group.id, creator.id, true).await.unwrap();
        let members = store.list_group_members(group.id).await.unwrap();
        assert_eq!(members.len(), 1);
        assert!(members[0].is_admin);
        assert_eq!(members[0].user_id, creator.id);

        store.add_group_member(group.id, joiner.id, false).await.unwrap();
        assert_eq!(store.list_group_members(group.id).await.unwrap().len(), 2);

        assert!(store.remove_group_member(group.id, joiner.id).await.unwrap());
        let members = store.list_group_members(group.id).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].user_id, creator.id);

        // Removing a membership that does not exist reports false and
        // changes nothing.
        assert!(!store.remove_group_member(group.id, joiner.id).await.unwrap());
        assert_eq!(store.list_group_members(group.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn groups_for_user_follows_memberships() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("alice")).await.unwrap();
        let mine = store
            .create_group(NewStudyGroup {
                creator_id: user.id,
                name: "mine".to_string(),
                course: "CS101".to_string(),
                color: "#111111".to_string(),
            })
            .await
            .unwrap();
        store
            .create_group(NewStudyGroup {
                creator_id: 999,
                name: "other".to_string(),
                course: "CS101".to_string(),
                color: "#222222".to_string(),
            })
            .await
            .unwrap();
        store.add_group_member(mine.id, user.id, true).await.unwrap();

        let groups = store.groups_for_user(user.id).await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].id, mine.id);
    }

    #[tokio::test]
    async fn upcoming_sessions_skip_the_past_and_sort_ascending() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("alice")).await.unwrap();
        let group = store
            .create_group(NewStudyGroup {
                creator_id: user.id,
                name: "g".to_string(),
                course: "CS101".to_string(),
                color: "#000000".to_string(),
            })
            .await
            .unwrap();
        store.add_group_member(group.id, user.id, true).await.unwrap();

        store
            .create_study_session(new_session(group.id, user.id, Duration::hours(-2)))
            .await
            .unwrap();
        let later = store
            .create_study_session(new_session(group.id, user.id, Duration::hours(48)))
            .await
            .unwrap();
        let sooner = store
            .create_study_session(new_session(group.id, user.id, Duration::hours(2)))
            .await
            .unwrap();

        let upcoming = store.upcoming_sessions_for_user(user.id).await.unwrap();
        let ids: Vec<i64> = upcoming.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![sooner.id, later.id]);
    }

    #[tokio::test]
    async fn activity_feed_is_newest_first_and_truncates() {
        let store = MemoryStore::new();
        for user_id in [1, 2, 1] {
            store
                .log_activity(NewActivity {
                    user_id,
                    kind: ActivityKind::UploadedPaper,
                    target_id: 1,
                    target_kind: TargetKind::Paper,
                    metadata: None,
                })
                .await
                .unwrap();
        }

        let feed = store.recent_activity(None, None).await.unwrap();
        let ids: Vec<i64> = feed.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);

        let limited = store.recent_activity(None, Some(2)).await.unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].id, 3);

        let for_user = store.recent_activity(Some(1), None).await.unwrap();
        let ids: Vec<i64> = for_user.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[tokio::test]
    async fn points_accumulate_per_user() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("alice")).await.unwrap();
        assert_eq!(user.points, 0);

        store.add_user_points(user.id, 10).await.unwrap();
        let user = store.add_user_points(user.id, 5).await.unwrap().unwrap();
        assert_eq!(user.points, 15);

        assert!(store.add_user_points(9999, 10).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn username_and_email_lookups_ignore_case() {
        let store = MemoryStore::new();
        store.create_user(new_user("Alice")).await.unwrap();

        let by_name = store.get_user_by_username("alice").await.unwrap();
        assert!(by_name.is_some());
        let by_email = store.get_user_by_email("ALICE@EXAMPLE.EDU").await.unwrap();
        assert!(by_email.is_some());
        assert!(store.get_user_by_username("carol").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn auth_sessions_validate_expire_and_delete() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("alice")).await.unwrap();

        store
            .create_auth_session("tok-live", user.id, Utc::now() + Duration::days(1))
            .await
            .unwrap();
        store
            .create_auth_session("tok-stale", user.id, Utc::now() - Duration::days(1))
            .await
            .unwrap();

        assert_eq!(store.validate_auth_session("tok-live").await.unwrap(), user.id);
        assert!(matches!(
            store.validate_auth_session("tok-stale").await,
            Err(PortError::Unauthorized)
        ));
        assert!(matches!(
            store.validate_auth_session("tok-missing").await,
            Err(PortError::NotFound(_))
        ));

        store.delete_auth_session("tok-live").await.unwrap();
        assert!(store.validate_auth_session("tok-live").await.is_err());
    }
}
