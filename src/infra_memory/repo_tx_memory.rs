use crate::domain_model::*;
use crate::domain_port::*;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};

#[derive(Debug, Default, Clone)]
pub struct MemoryState {
    pub(super) users: BTreeMap<UserId, UserRecord>,
    pub(super) usernames: HashMap<String, UserId>,
    pub(super) edges: HashMap<UserPair, FriendshipEdge>,
}

/// Shared state behind every memory repo. Cloning shares the same data.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) async fn read(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().await
    }

    pub async fn user_count(&self) -> usize {
        self.read().await.users.len()
    }

    pub async fn edge_count(&self) -> usize {
        self.read().await.edges.len()
    }
}

pub struct MemoryTxManager {
    store: MemoryStore,
}

impl MemoryTxManager {
    pub fn new(store: MemoryStore) -> Self {
        MemoryTxManager { store }
    }
}

#[async_trait::async_trait]
impl TxManager for MemoryTxManager {
    async fn begin<'t>(&'t self) -> anyhow::Result<Box<dyn StorageTx<'t> + 't>> {
        let guard = self.store.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx { guard, working }))
    }
}

/// Holds the store lock for its whole lifetime, so transactions are serial.
/// Writes land in `working` and only replace the shared state on commit.
pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

impl MemoryTx {
    pub(super) fn state(&mut self) -> &mut MemoryState {
        &mut self.working
    }
}

#[async_trait::async_trait]
impl<'t> StorageTx<'t> for MemoryTx {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Memory
    }

    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        let MemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> anyhow::Result<()> {
        Ok(())
    }
}

pub(super) fn downcast<'a, 't>(tx: &'a mut dyn StorageTx<'t>) -> anyhow::Result<&'a mut MemoryTx> {
    if tx.backend() != StorageBackend::Memory {
        anyhow::bail!("{:?} transaction handed to a memory repo", tx.backend());
    }
    // SAFETY: MemoryTx is the only StorageTx reporting the Memory backend.
    let tx = unsafe {
        let p = tx as *mut dyn StorageTx<'t>;
        let p = p as *mut MemoryTx;
        &mut *p
    };
    Ok(tx)
}
