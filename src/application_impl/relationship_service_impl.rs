use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;
use tracing::{info, instrument};

pub struct RealRelationshipService {
    user_repo: Arc<dyn UserRepo>,
    friendship_repo: Arc<dyn FriendshipRepo>,
    tx_manager: Arc<dyn TxManager>,
    clock: Arc<dyn Clock>,
}

impl RealRelationshipService {
    pub fn new(
        user_repo: Arc<dyn UserRepo>,
        friendship_repo: Arc<dyn FriendshipRepo>,
        tx_manager: Arc<dyn TxManager>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repo,
            friendship_repo,
            tx_manager,
            clock,
        }
    }

    async fn required_user_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        username: &str,
    ) -> Result<UserRecord, RelationError> {
        self.user_repo
            .find_by_username_in_tx(tx, username)
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?
            .ok_or_else(|| RelationError::UserNotFound(username.to_owned()))
    }

    /// Opens the transaction and loads both sides. Self relations are refused
    /// before anything touches the store.
    async fn begin_pair(
        &self,
        viewer: &str,
        target: &str,
    ) -> Result<(Box<dyn StorageTx<'_> + '_>, UserRecord, UserRecord), RelationError> {
        if viewer == target {
            return Err(RelationError::SameUsername);
        }

        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;
        let me = self.required_user_in_tx(&mut *tx, viewer).await?;
        let other = self.required_user_in_tx(&mut *tx, target).await?;

        Ok((tx, me, other))
    }
}

#[async_trait::async_trait]
impl RelationshipService for RealRelationshipService {
    #[instrument(name = "userdata.friendship.request", skip(self))]
    async fn create_friendship_request(
        &self,
        viewer: &str,
        target: &str,
    ) -> Result<UserView, RelationError> {
        let (mut tx, me, other) = self.begin_pair(viewer, target).await?;

        match self
            .friendship_repo
            .insert_pending_in_tx(&mut *tx, me.user_id, other.user_id, self.clock.now())
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?
        {
            FriendshipClaim::Won => {
                tx.commit()
                    .await
                    .map_err(|e| RelationError::Store(e.to_string()))?;
                info!("friendship requested");
                Ok(UserView::from_record(&other, Some(FriendState::InviteSent)))
            }
            FriendshipClaim::Existing => Err(RelationError::FriendshipExists(target.to_owned())),
        }
    }

    #[instrument(name = "userdata.friendship.accept", skip(self))]
    async fn accept_friendship_request(
        &self,
        viewer: &str,
        target: &str,
    ) -> Result<UserView, RelationError> {
        let (mut tx, me, other) = self.begin_pair(viewer, target).await?;

        let accepted = self
            .friendship_repo
            .accept_in_tx(&mut *tx, other.user_id, me.user_id)
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;
        if !accepted {
            return Err(RelationError::InvitationNotFound(target.to_owned()));
        }

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;
        info!("friendship accepted");

        Ok(UserView::from_record(&other, Some(FriendState::Friend)))
    }

    #[instrument(name = "userdata.friendship.decline", skip(self))]
    async fn decline_friendship_request(
        &self,
        viewer: &str,
        target: &str,
    ) -> Result<UserView, RelationError> {
        let (mut tx, me, other) = self.begin_pair(viewer, target).await?;

        let removed = self
            .friendship_repo
            .delete_pending_between_in_tx(&mut *tx, me.user_id, other.user_id)
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;
        if removed == 0 {
            return Err(RelationError::InvitationNotFound(target.to_owned()));
        }

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;
        info!(removed, "friendship invitation declined");

        Ok(UserView::from_record(&other, None))
    }

    #[instrument(name = "userdata.friendship.remove", skip(self))]
    async fn remove_friend(&self, viewer: &str, target: &str) -> Result<(), RelationError> {
        let (mut tx, me, other) = self.begin_pair(viewer, target).await?;

        let removed = self
            .friendship_repo
            .delete_between_in_tx(&mut *tx, me.user_id, other.user_id)
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;
        info!(removed, "friendship removed");

        Ok(())
    }
}
