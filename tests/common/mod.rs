use std::sync::Arc;
use userdata::application_impl::*;
use userdata::application_port::*;
use userdata::domain_model::Currency;
use userdata::domain_port::*;
use userdata::infra_memory::*;

/// Services wired over one shared in-memory store.
pub struct Harness {
    pub store: MemoryStore,
    pub users: Arc<dyn UserService>,
    pub relations: Arc<dyn RelationshipService>,
    pub directory: Arc<dyn DirectoryService>,
}

impl Harness {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let user_repo: Arc<dyn UserRepo> = Arc::new(MemoryUserRepo::new(store.clone()));
        let friendship_repo: Arc<dyn FriendshipRepo> =
            Arc::new(MemoryFriendshipRepo::new(store.clone()));
        let tx_manager: Arc<dyn TxManager> = Arc::new(MemoryTxManager::new(store.clone()));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        Self {
            users: Arc::new(RealUserService::new(
                user_repo.clone(),
                tx_manager.clone(),
                clock.clone(),
                Currency::Rub,
            )),
            relations: Arc::new(RealRelationshipService::new(
                user_repo.clone(),
                friendship_repo.clone(),
                tx_manager,
                clock,
            )),
            directory: Arc::new(RealDirectoryService::new(user_repo, friendship_repo)),
            store,
        }
    }

    pub async fn with_users(names: &[&str]) -> Self {
        let h = Self::new();
        for name in names {
            h.users.provision(name).await.unwrap();
        }
        h
    }
}

#[allow(dead_code)]
pub fn names(users: &[UserView]) -> Vec<&str> {
    users.iter().map(|u| u.username.as_str()).collect()
}
