use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, instrument};

pub struct RealDirectoryService {
    user_repo: Arc<dyn UserRepo>,
    friendship_repo: Arc<dyn FriendshipRepo>,
}

impl RealDirectoryService {
    pub fn new(user_repo: Arc<dyn UserRepo>, friendship_repo: Arc<dyn FriendshipRepo>) -> Self {
        Self {
            user_repo,
            friendship_repo,
        }
    }

    fn tag(
        viewer: Option<UserId>,
        candidates: Vec<UserRecord>,
        edges: &[FriendshipEdge],
    ) -> Vec<UserView> {
        candidates
            .iter()
            .map(|c| {
                let state = viewer.and_then(|v| FriendState::resolve(v, c.user_id, edges));
                UserView::from_record(c, state)
            })
            .collect()
    }

    async fn incident_edges(&self, user_id: UserId) -> Result<Vec<FriendshipEdge>, RelationError> {
        self.friendship_repo
            .list_incident(user_id)
            .await
            .map_err(|e| RelationError::Store(e.to_string()))
    }

    async fn ranked_users(
        &self,
        viewer: &str,
        search: Option<&str>,
    ) -> Result<Vec<UserView>, RelationError> {
        // an unknown viewer still gets the directory, just without relations
        let me = self
            .user_repo
            .find_by_username(viewer)
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;
        let candidates = self
            .user_repo
            .list_excluding(viewer, search)
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;
        let edges = match &me {
            Some(me) => self.incident_edges(me.user_id).await?,
            None => Vec::new(),
        };

        let mut users = Self::tag(me.map(|m| m.user_id), candidates, &edges);
        users.sort_by(all_users_order);
        debug!(count = users.len(), "directory ranked");

        Ok(users)
    }

    async fn ranked_friends(
        &self,
        viewer: &str,
        search: Option<&str>,
    ) -> Result<Vec<UserView>, RelationError> {
        let me = self
            .user_repo
            .find_by_username(viewer)
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?
            .ok_or_else(|| RelationError::UserNotFound(viewer.to_owned()))?;
        let candidates = self
            .user_repo
            .list_friends(me.user_id, search)
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;
        let edges = self.incident_edges(me.user_id).await?;

        // the two reads are not one snapshot; drop anyone whose edge changed in between
        let mut friends: Vec<UserView> = Self::tag(Some(me.user_id), candidates, &edges)
            .into_iter()
            .filter(|u| u.friend_state == Some(FriendState::Friend))
            .collect();
        friends.sort_by(friends_order);
        debug!(count = friends.len(), "friends ranked");

        Ok(friends)
    }
}

/// Friends, sent invites, received invites, then users without relation.
fn all_users_order(a: &UserView, b: &UserView) -> Ordering {
    let by_state = match (a.friend_state, b.friend_state) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_state.then_with(|| a.username.cmp(&b.username))
}

/// Natural state order, the opposite direction of `all_users_order`.
fn friends_order(a: &UserView, b: &UserView) -> Ordering {
    a.friend_state
        .cmp(&b.friend_state)
        .then_with(|| a.username.cmp(&b.username))
}

#[async_trait::async_trait]
impl DirectoryService for RealDirectoryService {
    #[instrument(name = "userdata.directory.all_users", skip(self))]
    async fn all_users(
        &self,
        viewer: &str,
        search: Option<&str>,
    ) -> Result<Vec<UserView>, RelationError> {
        self.ranked_users(viewer, search).await
    }

    #[instrument(name = "userdata.directory.all_users_paged", skip(self))]
    async fn all_users_paged(
        &self,
        viewer: &str,
        page: PageRequest,
        search: Option<&str>,
    ) -> Result<Page<UserView>, RelationError> {
        let users = self.ranked_users(viewer, search).await?;
        Ok(Page::slice(users, page))
    }

    #[instrument(name = "userdata.directory.friends", skip(self))]
    async fn friends(
        &self,
        viewer: &str,
        search: Option<&str>,
    ) -> Result<Vec<UserView>, RelationError> {
        self.ranked_friends(viewer, search).await
    }

    #[instrument(name = "userdata.directory.friends_paged", skip(self))]
    async fn friends_paged(
        &self,
        viewer: &str,
        page: PageRequest,
        search: Option<&str>,
    ) -> Result<Page<UserView>, RelationError> {
        let friends = self.ranked_friends(viewer, search).await?;
        Ok(Page::slice(friends, page))
    }
}
