mod common;

use common::{Harness, names};
use userdata::application_port::*;
use userdata::domain_model::*;

/// me: friend with frank, invited ivan, invited by rita; sam is a stranger.
async fn social_graph() -> Harness {
    let h = Harness::with_users(&["me", "frank", "ivan", "rita", "sam"]).await;
    h.relations
        .create_friendship_request("me", "frank")
        .await
        .unwrap();
    h.relations
        .accept_friendship_request("frank", "me")
        .await
        .unwrap();
    h.relations
        .create_friendship_request("me", "ivan")
        .await
        .unwrap();
    h.relations
        .create_friendship_request("rita", "me")
        .await
        .unwrap();
    h
}

#[tokio::test]
async fn all_users_ranks_by_relation() {
    let h = social_graph().await;

    let users = h.directory.all_users("me", None).await.unwrap();

    assert_eq!(names(&users), ["frank", "ivan", "rita", "sam"]);
    let states: Vec<_> = users.iter().map(|u| u.friend_state).collect();
    assert_eq!(
        states,
        [
            Some(FriendState::Friend),
            Some(FriendState::InviteSent),
            Some(FriendState::InviteReceived),
            None
        ]
    );
}

#[tokio::test]
async fn all_users_for_unknown_viewer_has_no_states() {
    let h = social_graph().await;

    let users = h.directory.all_users("stranger", None).await.unwrap();

    assert_eq!(users.len(), 5);
    assert!(users.iter().all(|u| u.friend_state.is_none()));
    assert_eq!(names(&users), ["frank", "ivan", "me", "rita", "sam"]);
}

#[tokio::test]
async fn friends_lists_accepted_edges_only() {
    let h = social_graph().await;

    let friends = h.directory.friends("me", None).await.unwrap();
    assert_eq!(names(&friends), ["frank"]);
    assert_eq!(friends[0].friend_state, Some(FriendState::Friend));

    let theirs = h.directory.friends("frank", None).await.unwrap();
    assert_eq!(names(&theirs), ["me"]);

    assert!(h.directory.friends("sam", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn friends_of_unknown_viewer_fails() {
    let h = social_graph().await;

    assert!(matches!(
        h.directory.friends("stranger", None).await,
        Err(RelationError::UserNotFound(_))
    ));
}

#[tokio::test]
async fn search_is_case_insensitive_over_names() {
    let h = social_graph().await;
    h.users
        .update(UserUpdate {
            username: "sam".into(),
            fullname: Some("Samuel Frankel".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    let found = h.directory.all_users("me", Some("FRANK")).await.unwrap();
    assert_eq!(names(&found), ["frank", "sam"]);

    let blank = h.directory.all_users("me", Some("   ")).await.unwrap();
    assert_eq!(blank.len(), 4);

    let friends = h.directory.friends("me", Some("samuel")).await.unwrap();
    assert!(friends.is_empty());
}

#[tokio::test]
async fn search_treats_wildcards_literally() {
    let h = Harness::with_users(&["me", "a_b", "axb", "100%"]).await;

    let found = h.directory.all_users("me", Some("a_b")).await.unwrap();
    assert_eq!(names(&found), ["a_b"]);

    let found = h.directory.all_users("me", Some("%")).await.unwrap();
    assert_eq!(names(&found), ["100%"]);
}

#[tokio::test]
async fn pages_are_stable_and_complete() {
    let h = social_graph().await;
    let full = h.directory.all_users("me", None).await.unwrap();

    let mut joined = Vec::new();
    for page in 0..3 {
        let p = h
            .directory
            .all_users_paged("me", PageRequest::new(page, 2), None)
            .await
            .unwrap();
        assert_eq!(p.total_elements, 4);
        assert_eq!(p.total_pages(), 2);
        joined.extend(p.items);
    }

    assert_eq!(joined, full);
}

#[tokio::test]
async fn friends_paged_counts_friends_only() {
    let h = social_graph().await;

    let p = h
        .directory
        .friends_paged("me", PageRequest::new(0, 10), None)
        .await
        .unwrap();

    assert_eq!(p.total_elements, 1);
    assert_eq!(names(&p.items), ["frank"]);
}
