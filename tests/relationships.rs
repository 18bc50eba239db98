mod common;

use common::Harness;
use userdata::application_port::*;
use userdata::domain_model::*;

async fn state_of(h: &Harness, viewer: &str, candidate: &str) -> Option<FriendState> {
    h.directory
        .all_users(viewer, None)
        .await
        .unwrap()
        .into_iter()
        .find(|u| u.username == candidate)
        .and_then(|u| u.friend_state)
}

#[tokio::test]
async fn request_then_accept() {
    let h = Harness::with_users(&["alice", "bob"]).await;

    let sent = h
        .relations
        .create_friendship_request("alice", "bob")
        .await
        .unwrap();
    assert_eq!(sent.username, "bob");
    assert_eq!(sent.friend_state, Some(FriendState::InviteSent));
    assert_eq!(state_of(&h, "alice", "bob").await, Some(FriendState::InviteSent));
    assert_eq!(
        state_of(&h, "bob", "alice").await,
        Some(FriendState::InviteReceived)
    );

    let accepted = h
        .relations
        .accept_friendship_request("bob", "alice")
        .await
        .unwrap();
    assert_eq!(accepted.friend_state, Some(FriendState::Friend));
    assert_eq!(state_of(&h, "alice", "bob").await, Some(FriendState::Friend));
    assert_eq!(state_of(&h, "bob", "alice").await, Some(FriendState::Friend));
    assert_eq!(h.store.edge_count().await, 1);

    let alices = h.directory.friends("alice", None).await.unwrap();
    assert_eq!(alices.len(), 1);
    assert_eq!(alices[0].username, "bob");
    assert_eq!(alices[0].friend_state, Some(FriendState::Friend));
    let bobs = h.directory.friends("bob", None).await.unwrap();
    assert_eq!(bobs.len(), 1);
    assert_eq!(bobs[0].username, "alice");
    assert_eq!(bobs[0].friend_state, Some(FriendState::Friend));
}

#[tokio::test]
async fn self_relations_are_refused_without_writes() {
    let h = Harness::with_users(&["alice"]).await;

    assert!(matches!(
        h.relations.create_friendship_request("alice", "alice").await,
        Err(RelationError::SameUsername)
    ));
    assert!(matches!(
        h.relations.accept_friendship_request("alice", "alice").await,
        Err(RelationError::SameUsername)
    ));
    assert!(matches!(
        h.relations.decline_friendship_request("alice", "alice").await,
        Err(RelationError::SameUsername)
    ));
    assert!(matches!(
        h.relations.remove_friend("alice", "alice").await,
        Err(RelationError::SameUsername)
    ));
    assert_eq!(h.store.edge_count().await, 0);
}

#[tokio::test]
async fn unknown_users_are_reported() {
    let h = Harness::with_users(&["alice"]).await;

    match h.relations.create_friendship_request("alice", "nobody").await {
        Err(RelationError::UserNotFound(name)) => assert_eq!(name, "nobody"),
        other => panic!("unexpected: {:?}", other),
    }
    match h.relations.create_friendship_request("nobody", "alice").await {
        Err(RelationError::UserNotFound(name)) => assert_eq!(name, "nobody"),
        other => panic!("unexpected: {:?}", other),
    }
    assert_eq!(h.store.edge_count().await, 0);
}

#[tokio::test]
async fn duplicate_and_reverse_requests_conflict() {
    let h = Harness::with_users(&["alice", "bob"]).await;
    h.relations
        .create_friendship_request("alice", "bob")
        .await
        .unwrap();

    assert!(matches!(
        h.relations.create_friendship_request("alice", "bob").await,
        Err(RelationError::FriendshipExists(_))
    ));
    assert!(matches!(
        h.relations.create_friendship_request("bob", "alice").await,
        Err(RelationError::FriendshipExists(_))
    ));
    assert_eq!(h.store.edge_count().await, 1);
}

#[tokio::test]
async fn accept_requires_an_incoming_invite() {
    let h = Harness::with_users(&["alice", "bob"]).await;

    assert!(matches!(
        h.relations.accept_friendship_request("bob", "alice").await,
        Err(RelationError::InvitationNotFound(_))
    ));

    h.relations
        .create_friendship_request("alice", "bob")
        .await
        .unwrap();
    // the requester cannot accept their own invite
    assert!(matches!(
        h.relations.accept_friendship_request("alice", "bob").await,
        Err(RelationError::InvitationNotFound(_))
    ));
    assert_eq!(state_of(&h, "alice", "bob").await, Some(FriendState::InviteSent));
}

#[tokio::test]
async fn decline_clears_pending_invites_only() {
    let h = Harness::with_users(&["alice", "bob", "carol"]).await;

    assert!(matches!(
        h.relations.decline_friendship_request("bob", "alice").await,
        Err(RelationError::InvitationNotFound(_))
    ));

    h.relations
        .create_friendship_request("alice", "bob")
        .await
        .unwrap();
    let declined = h
        .relations
        .decline_friendship_request("bob", "alice")
        .await
        .unwrap();
    assert_eq!(declined.friend_state, None);
    assert_eq!(state_of(&h, "alice", "bob").await, None);
    assert_eq!(h.store.edge_count().await, 0);

    h.relations
        .create_friendship_request("alice", "carol")
        .await
        .unwrap();
    h.relations
        .accept_friendship_request("carol", "alice")
        .await
        .unwrap();
    assert!(matches!(
        h.relations.decline_friendship_request("carol", "alice").await,
        Err(RelationError::InvitationNotFound(_))
    ));
    assert_eq!(state_of(&h, "carol", "alice").await, Some(FriendState::Friend));
}

#[tokio::test]
async fn remove_is_symmetric() {
    let h = Harness::with_users(&["alice", "bob"]).await;
    h.relations
        .create_friendship_request("alice", "bob")
        .await
        .unwrap();
    h.relations
        .accept_friendship_request("bob", "alice")
        .await
        .unwrap();

    // removed from the addressee's side
    h.relations.remove_friend("bob", "alice").await.unwrap();

    assert_eq!(state_of(&h, "alice", "bob").await, None);
    assert_eq!(state_of(&h, "bob", "alice").await, None);
    assert_eq!(h.store.edge_count().await, 0);

    // nothing left to remove is not an error
    h.relations.remove_friend("alice", "bob").await.unwrap();

    h.relations
        .create_friendship_request("bob", "alice")
        .await
        .unwrap();
    assert_eq!(
        state_of(&h, "alice", "bob").await,
        Some(FriendState::InviteReceived)
    );
}

#[tokio::test]
async fn remove_withdraws_a_sent_invite() {
    let h = Harness::with_users(&["alice", "bob"]).await;
    h.relations
        .create_friendship_request("alice", "bob")
        .await
        .unwrap();

    h.relations.remove_friend("alice", "bob").await.unwrap();

    assert_eq!(h.store.edge_count().await, 0);
}
