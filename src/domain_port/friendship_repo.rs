use crate::domain_model::*;
use crate::domain_port::repo_tx::StorageTx;
use chrono::{DateTime, Utc};

pub enum FriendshipClaim {
    Won,
    Existing,
}

#[async_trait::async_trait]
pub trait FriendshipRepo: Send + Sync {
    /// Inserts a pending edge. Any edge already on the pair yields `Existing`.
    async fn insert_pending_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        requester: UserId,
        addressee: UserId,
        created_at: DateTime<Utc>,
    ) -> anyhow::Result<FriendshipClaim>;

    /// Flips a pending `requester -> addressee` edge to accepted.
    /// Returns false when no such pending edge exists.
    async fn accept_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        requester: UserId,
        addressee: UserId,
    ) -> anyhow::Result<bool>;

    /// Deletes pending edges between the pair in both directions.
    async fn delete_pending_between_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        a: UserId,
        b: UserId,
    ) -> anyhow::Result<u64>;

    /// Deletes every edge between the pair.
    async fn delete_between_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        a: UserId,
        b: UserId,
    ) -> anyhow::Result<u64>;

    /// All edges where `user_id` is requester or addressee.
    async fn list_incident(&self, user_id: UserId) -> anyhow::Result<Vec<FriendshipEdge>>;
}
