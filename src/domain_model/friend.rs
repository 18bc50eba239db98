use crate::domain_model::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
}

/// Directed friendship relation. At most one edge exists per pair of users.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FriendshipEdge {
    pub requester: UserId,
    pub addressee: UserId,
    pub status: FriendshipStatus,
    pub created_at: DateTime<Utc>,
}

/// Friendship status as seen by a viewer. Never persisted.
///
/// Declaration order is the natural ascending order; the all-users directory
/// sorts it in reverse so that friends come first.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FriendState {
    InviteReceived,
    InviteSent,
    Friend,
}

impl FriendState {
    /// Projects the directed graph onto `viewer`'s perspective of `candidate`.
    ///
    /// `edges` may hold unrelated edges; only edges between the two users count.
    /// An edge requested by the candidate wins over one requested by the viewer.
    pub fn resolve(
        viewer: UserId,
        candidate: UserId,
        edges: &[FriendshipEdge],
    ) -> Option<FriendState> {
        let received = edges
            .iter()
            .find(|e| e.requester == candidate && e.addressee == viewer)
            .map(|e| match e.status {
                FriendshipStatus::Accepted => FriendState::Friend,
                FriendshipStatus::Pending => FriendState::InviteReceived,
            });
        if received.is_some() {
            return received;
        }

        edges
            .iter()
            .find(|e| e.requester == viewer && e.addressee == candidate)
            .map(|e| match e.status {
                FriendshipStatus::Accepted => FriendState::Friend,
                FriendshipStatus::Pending => FriendState::InviteSent,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(requester: UserId, addressee: UserId, status: FriendshipStatus) -> FriendshipEdge {
        FriendshipEdge {
            requester,
            addressee,
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn pending_edge_reads_differently_from_each_side() {
        let a = UserId::new_v4();
        let b = UserId::new_v4();
        let edges = vec![edge(a, b, FriendshipStatus::Pending)];

        assert_eq!(FriendState::resolve(a, b, &edges), Some(FriendState::InviteSent));
        assert_eq!(FriendState::resolve(b, a, &edges), Some(FriendState::InviteReceived));
    }

    #[test]
    fn accepted_edge_is_friend_both_ways() {
        let a = UserId::new_v4();
        let b = UserId::new_v4();
        let edges = vec![edge(a, b, FriendshipStatus::Accepted)];

        assert_eq!(FriendState::resolve(a, b, &edges), Some(FriendState::Friend));
        assert_eq!(FriendState::resolve(b, a, &edges), Some(FriendState::Friend));
    }

    #[test]
    fn unrelated_edges_are_ignored() {
        let viewer = UserId::new_v4();
        let candidate = UserId::new_v4();
        let other = UserId::new_v4();
        let edges = vec![
            edge(candidate, other, FriendshipStatus::Accepted),
            edge(other, viewer, FriendshipStatus::Pending),
        ];

        assert_eq!(FriendState::resolve(viewer, candidate, &edges), None);
    }

    #[test]
    fn received_rule_is_checked_first() {
        let viewer = UserId::new_v4();
        let candidate = UserId::new_v4();
        // cannot happen through the service, the resolver still has to be deterministic
        let edges = vec![
            edge(viewer, candidate, FriendshipStatus::Pending),
            edge(candidate, viewer, FriendshipStatus::Pending),
        ];

        assert_eq!(
            FriendState::resolve(viewer, candidate, &edges),
            Some(FriendState::InviteReceived)
        );
    }

    #[test]
    fn natural_order() {
        assert!(FriendState::InviteReceived < FriendState::InviteSent);
        assert!(FriendState::InviteSent < FriendState::Friend);
        assert_eq!(
            serde_json::to_string(&FriendState::InviteSent).unwrap(),
            "\"INVITE_SENT\""
        );
    }
}
