use crate::application_port::{RelationError, UserView};
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait DirectoryService: Send + Sync {
    /// Everyone but `viewer`: friends, then sent invites, then received, then the rest.
    async fn all_users(
        &self,
        viewer: &str,
        search: Option<&str>,
    ) -> Result<Vec<UserView>, RelationError>;
    async fn all_users_paged(
        &self,
        viewer: &str,
        page: PageRequest,
        search: Option<&str>,
    ) -> Result<Page<UserView>, RelationError>;
    async fn friends(
        &self,
        viewer: &str,
        search: Option<&str>,
    ) -> Result<Vec<UserView>, RelationError>;
    async fn friends_paged(
        &self,
        viewer: &str,
        page: PageRequest,
        search: Option<&str>,
    ) -> Result<Page<UserView>, RelationError>;
}
