use super::repo_tx_memory::{MemoryState, MemoryStore, downcast};
use crate::domain_model::*;
use crate::domain_port::*;

pub struct MemoryUserRepo {
    store: MemoryStore,
}

impl MemoryUserRepo {
    pub fn new(store: MemoryStore) -> Self {
        MemoryUserRepo { store }
    }

    fn by_username(state: &MemoryState, username: &str) -> Option<UserRecord> {
        state
            .usernames
            .get(username)
            .and_then(|id| state.users.get(id))
            .cloned()
    }

    fn filtered<'a>(
        users: impl Iterator<Item = &'a UserRecord>,
        search: Option<&str>,
    ) -> Vec<UserRecord> {
        let needle = search_needle(search);
        let mut out: Vec<UserRecord> = users
            .filter(|u| needle.as_deref().is_none_or(|n| u.matches(n)))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.username.cmp(&b.username));
        out
    }
}

#[async_trait::async_trait]
impl UserRepo for MemoryUserRepo {
    async fn insert_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        record: &UserRecord,
    ) -> anyhow::Result<UserClaim> {
        let state = downcast(tx)?.state();

        if state.usernames.contains_key(&record.username)
            || state.users.contains_key(&record.user_id)
        {
            return Ok(UserClaim::Existing);
        }
        state
            .usernames
            .insert(record.username.clone(), record.user_id);
        state.users.insert(record.user_id, record.clone());

        Ok(UserClaim::Won)
    }

    async fn save_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        record: &UserRecord,
    ) -> anyhow::Result<()> {
        let state = downcast(tx)?.state();

        if let Some(owner) = state.usernames.get(&record.username) {
            if *owner != record.user_id {
                anyhow::bail!("username '{}' is taken", record.username);
            }
        }
        if let Some(previous) = state.users.insert(record.user_id, record.clone()) {
            if previous.username != record.username {
                state.usernames.remove(&previous.username);
            }
        }
        state
            .usernames
            .insert(record.username.clone(), record.user_id);

        Ok(())
    }

    async fn find_by_username_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        username: &str,
    ) -> anyhow::Result<Option<UserRecord>> {
        let state = downcast(tx)?.state();
        Ok(Self::by_username(state, username))
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<UserRecord>> {
        let state = self.store.read().await;
        Ok(Self::by_username(&state, username))
    }

    async fn list_excluding(
        &self,
        username: &str,
        search: Option<&str>,
    ) -> anyhow::Result<Vec<UserRecord>> {
        let state = self.store.read().await;
        let users = state.users.values().filter(|u| u.username != username);
        Ok(Self::filtered(users, search))
    }

    async fn list_friends(
        &self,
        user_id: UserId,
        search: Option<&str>,
    ) -> anyhow::Result<Vec<UserRecord>> {
        let state = self.store.read().await;
        let friends = state
            .edges
            .values()
            .filter(|e| e.status == FriendshipStatus::Accepted)
            .filter_map(|e| {
                if e.requester == user_id {
                    Some(e.addressee)
                } else if e.addressee == user_id {
                    Some(e.requester)
                } else {
                    None
                }
            })
            .filter_map(|id| state.users.get(&id));
        Ok(Self::filtered(friends, search))
    }
}
