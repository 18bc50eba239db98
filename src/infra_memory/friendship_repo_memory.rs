use super::repo_tx_memory::{MemoryStore, downcast};
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};

pub struct MemoryFriendshipRepo {
    store: MemoryStore,
}

impl MemoryFriendshipRepo {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl FriendshipRepo for MemoryFriendshipRepo {
    async fn insert_pending_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        requester: UserId,
        addressee: UserId,
        created_at: DateTime<Utc>,
    ) -> anyhow::Result<FriendshipClaim> {
        if requester == addressee {
            anyhow::bail!("friendship with self");
        }
        let state = downcast(tx)?.state();

        let pair = UserPair::new(requester, addressee);
        if state.edges.contains_key(&pair) {
            return Ok(FriendshipClaim::Existing);
        }
        state.edges.insert(
            pair,
            FriendshipEdge {
                requester,
                addressee,
                status: FriendshipStatus::Pending,
                created_at,
            },
        );

        Ok(FriendshipClaim::Won)
    }

    async fn accept_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        requester: UserId,
        addressee: UserId,
    ) -> anyhow::Result<bool> {
        let state = downcast(tx)?.state();

        match state.edges.get_mut(&UserPair::new(requester, addressee)) {
            Some(edge)
                if edge.requester == requester
                    && edge.addressee == addressee
                    && edge.status == FriendshipStatus::Pending =>
            {
                edge.status = FriendshipStatus::Accepted;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_pending_between_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        a: UserId,
        b: UserId,
    ) -> anyhow::Result<u64> {
        let state = downcast(tx)?.state();

        let pair = UserPair::new(a, b);
        match state.edges.get(&pair) {
            Some(edge) if edge.status == FriendshipStatus::Pending => {
                state.edges.remove(&pair);
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn delete_between_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        a: UserId,
        b: UserId,
    ) -> anyhow::Result<u64> {
        let state = downcast(tx)?.state();
        Ok(state.edges.remove(&UserPair::new(a, b)).map_or(0, |_| 1))
    }

    async fn list_incident(&self, user_id: UserId) -> anyhow::Result<Vec<FriendshipEdge>> {
        let state = self.store.read().await;
        Ok(state
            .edges
            .values()
            .filter(|e| e.requester == user_id || e.addressee == user_id)
            .cloned()
            .collect())
    }
}
