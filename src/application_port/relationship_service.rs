use crate::application_port::UserView;

#[derive(Debug, thiserror::Error)]
pub enum RelationError {
    #[error("can't create friendship relation with self")]
    SameUsername,
    #[error("can't find user by username: '{0}'")]
    UserNotFound(String),
    #[error("can't find invitation from username: '{0}'")]
    InvitationNotFound(String),
    #[error("friendship relation with '{0}' already exists")]
    FriendshipExists(String),
    #[error("store error: {0}")]
    Store(String),
}

/// Friendship mutations, all issued from the viewer's side.
#[async_trait::async_trait]
pub trait RelationshipService: Send + Sync {
    /// Returns `target` tagged `InviteSent`.
    async fn create_friendship_request(
        &self,
        viewer: &str,
        target: &str,
    ) -> Result<UserView, RelationError>;
    /// Accepts `target`'s pending invite to `viewer`. Returns `target` tagged `Friend`.
    async fn accept_friendship_request(
        &self,
        viewer: &str,
        target: &str,
    ) -> Result<UserView, RelationError>;
    /// Drops pending invites between the two. Returns `target` without state.
    async fn decline_friendship_request(
        &self,
        viewer: &str,
        target: &str,
    ) -> Result<UserView, RelationError>;
    async fn remove_friend(&self, viewer: &str, target: &str) -> Result<(), RelationError>;
}
