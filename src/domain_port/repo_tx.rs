#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StorageBackend {
    MySql,
    Memory,
}

#[async_trait::async_trait]
pub trait TxManager: Send + Sync {
    async fn begin<'t>(&'t self) -> anyhow::Result<Box<dyn StorageTx<'t> + 't>>;
}

/// A unit of work. Dropping it without `commit` rolls it back.
#[async_trait::async_trait]
pub trait StorageTx<'t>: Send {
    /// Repos use this to check a transaction belongs to their backend before downcasting.
    fn backend(&self) -> StorageBackend;
    async fn commit(self: Box<Self>) -> anyhow::Result<()>;
    async fn rollback(self: Box<Self>) -> anyhow::Result<()>;
}
