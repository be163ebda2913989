//! Integration tests that drive the in-memory adapter through the
//! `StorageService` trait object, the same way the handlers consume it.

use std::sync::Arc;

use chrono::{Duration, Utc};

use api_lib::adapters::MemoryStore;
use studyhub_core::domain::{
    ActivityKind, NewDiscussionPost, NewPaper, NewStudyGroup, NewStudySession, NewUser, TargetKind,
};
use studyhub_core::ports::{PaperFilter, StorageService};

fn store() -> Arc<dyn StorageService> {
    Arc::new(MemoryStore::new())
}

async fn signup(store: &Arc<dyn StorageService>, username: &str) -> i64 {
    let user = store
        .create_user(NewUser {
            username: username.to_string(),
            email: format!("{}@example.edu", username),
            password_hash: "$argon2id$fake".to_string(),
        })
        .await
        .unwrap();
    user.id
}

#[tokio::test]
async fn group_creation_flow_matches_route_layer_steps() {
    let store = store();
    let creator = signup(&store, "alice").await;
    let joiner = signup(&store, "bob").await;

    // The route layer performs these three calls in order, without a
    // transaction around them.
    let group = store
        .create_group(NewStudyGroup {
            creator_id: creator,
            name: "Algorithms crunch".to_string(),
            course: "CS301".to_string(),
            color: "#2266ff".to_string(),
        })
        .await
        .unwrap();
    store.add_group_member(group.id, creator, true).await.unwrap();
    store
        .log_activity(studyhub_core::domain::NewActivity {
            user_id: creator,
            kind: ActivityKind::CreatedGroup,
            target_id: group.id,
            target_kind: TargetKind::Group,
            metadata: Some(group.name.clone()),
        })
        .await
        .unwrap();

    let members = store.list_group_members(group.id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert!(members[0].is_admin);

    store.add_group_member(group.id, joiner, false).await.unwrap();
    assert_eq!(store.list_group_members(group.id).await.unwrap().len(), 2);

    assert!(store.remove_group_member(group.id, joiner).await.unwrap());
    let members = store.list_group_members(group.id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user_id, creator);
}

#[tokio::test]
async fn paper_upload_flow_awards_points_and_feeds_activity() {
    let store = store();
    let uploader = signup(&store, "alice").await;

    let paper = store
        .create_paper(NewPaper {
            uploader_id: uploader,
            title: "CS301 final 2024".to_string(),
            course: "CS301".to_string(),
            year: 2024,
            institution: "Hilltop University".to_string(),
            file_url: "https://files.example.edu/cs301-2024.pdf".to_string(),
        })
        .await
        .unwrap();
    store.add_user_points(uploader, 10).await.unwrap();
    store
        .log_activity(studyhub_core::domain::NewActivity {
            user_id: uploader,
            kind: ActivityKind::UploadedPaper,
            target_id: paper.id,
            target_kind: TargetKind::Paper,
            metadata: Some(paper.title.clone()),
        })
        .await
        .unwrap();

    for _ in 0..3 {
        store.increment_paper_downloads(paper.id).await.unwrap();
    }

    let paper = store.get_paper(paper.id).await.unwrap().unwrap();
    assert_eq!(paper.downloads, 3);

    let uploader = store.get_user(uploader).await.unwrap().unwrap();
    assert_eq!(uploader.points, 10);

    let feed = store.recent_activity(None, None).await.unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].kind, ActivityKind::UploadedPaper);
    assert_eq!(feed[0].target_id, paper.id);
}

#[tokio::test]
async fn discussion_thread_flow() {
    let store = store();
    let author = signup(&store, "alice").await;
    let replier = signup(&store, "bob").await;

    let post = store
        .create_post(NewDiscussionPost {
            author_id: author,
            title: "How do I revise for CS301?".to_string(),
            content: "The past papers look brutal.".to_string(),
            tags: vec!["cs301".to_string(), "revision".to_string()],
        })
        .await
        .unwrap();
    let reply = store
        .create_reply(post.id, replier, "Start with the 2022 paper.")
        .await
        .unwrap();

    store.vote_post(post.id, 1).await.unwrap();
    store.vote_reply(reply.id, 1).await.unwrap();
    store.vote_reply(reply.id, -1).await.unwrap();

    let post = store.get_post(post.id).await.unwrap().unwrap();
    assert_eq!(post.votes, 1);
    let reply = store.get_reply(reply.id).await.unwrap().unwrap();
    assert_eq!(reply.votes, 0);

    let replies = store.list_replies_for_post(post.id).await.unwrap();
    assert_eq!(replies.len(), 1);
}

#[tokio::test]
async fn upcoming_sessions_span_all_of_a_users_groups() {
    let store = store();
    let user = signup(&store, "alice").await;

    let mut session_ids = Vec::new();
    for (name, hours) in [("first", 30i64), ("second", 5)] {
        let group = store
            .create_group(NewStudyGroup {
                creator_id: user,
                name: name.to_string(),
                course: "CS301".to_string(),
                color: "#000000".to_string(),
            })
            .await
            .unwrap();
        store.add_group_member(group.id, user, true).await.unwrap();

        let start_time = Utc::now() + Duration::hours(hours);
        let session = store
            .create_study_session(NewStudySession {
                group_id: group.id,
                created_by: user,
                title: format!("{} session", name),
                start_time,
                end_time: start_time + Duration::hours(2),
                is_virtual: false,
                location: Some("Library room 4".to_string()),
                meeting_link: None,
            })
            .await
            .unwrap();
        session_ids.push(session.id);
    }

    let upcoming = store.upcoming_sessions_for_user(user).await.unwrap();
    let ids: Vec<i64> = upcoming.iter().map(|s| s.id).collect();
    // The second group's session starts sooner, so it comes first.
    assert_eq!(ids, vec![session_ids[1], session_ids[0]]);

    // A user with no memberships sees nothing.
    let outsider = signup(&store, "carol").await;
    assert!(store.upcoming_sessions_for_user(outsider).await.unwrap().is_empty());
}

#[tokio::test]
async fn filters_and_search_split_between_store_and_caller() {
    let store = store();
    let uploader = signup(&store, "alice").await;

    for (course, year) in [("CS301", 2023), ("CS301", 2024), ("MATH200", 2024)] {
        store
            .create_paper(NewPaper {
                uploader_id: uploader,
                title: format!("{} final {}", course, year),
                course: course.to_string(),
                year,
                institution: "Hilltop University".to_string(),
                file_url: "https://files.example.edu/p.pdf".to_string(),
            })
            .await
            .unwrap();
    }

    // Equality filtering happens in the store.
    let cs_2024 = store
        .list_papers(PaperFilter {
            course: Some("CS301".to_string()),
            year: Some(2024),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(cs_2024.len(), 1);

    // Text search is a caller-side scan over the unfiltered list.
    let all = store.list_papers(PaperFilter::default()).await.unwrap();
    let hits: Vec<_> = all
        .iter()
        .filter(|p| p.title.to_lowercase().contains("math"))
        .collect();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].course, "MATH200");
}
