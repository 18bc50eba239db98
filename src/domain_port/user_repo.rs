use crate::domain_model::*;
use crate::domain_port::repo_tx::StorageTx;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub user_id: UserId,
    pub username: String,
    pub firstname: Option<String>,
    pub surname: Option<String>,
    pub fullname: Option<String>,
    pub currency: Currency,
    pub photo: Option<Vec<u8>>,
    pub photo_small: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Minimal record as created by provisioning.
    pub fn new(username: &str, currency: Currency, created_at: DateTime<Utc>) -> Self {
        UserRecord {
            user_id: UserId::new_v4(),
            username: username.to_owned(),
            firstname: None,
            surname: None,
            fullname: None,
            currency,
            photo: None,
            photo_small: None,
            created_at,
        }
    }

    /// Case-insensitive substring match on username and name fields.
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        [
            Some(self.username.as_str()),
            self.firstname.as_deref(),
            self.surname.as_deref(),
            self.fullname.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
    }
}

pub enum UserClaim {
    Won,
    Existing,
}

#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    /// Inserts a new user. A taken username yields `Existing`, not an error.
    async fn insert_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        record: &UserRecord,
    ) -> anyhow::Result<UserClaim>;

    /// Upserts by `user_id`.
    async fn save_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        record: &UserRecord,
    ) -> anyhow::Result<()>;

    async fn find_by_username_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        username: &str,
    ) -> anyhow::Result<Option<UserRecord>>;

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<UserRecord>>;

    /// Every user except `username`, optionally filtered by `search`.
    async fn list_excluding(
        &self,
        username: &str,
        search: Option<&str>,
    ) -> anyhow::Result<Vec<UserRecord>>;

    /// Users joined to `user_id` by an accepted edge in either direction.
    async fn list_friends(
        &self,
        user_id: UserId,
        search: Option<&str>,
    ) -> anyhow::Result<Vec<UserRecord>>;
}

/// Normalizes a search query: blank means no filter.
pub fn search_needle(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}
