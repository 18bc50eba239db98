use crate::domain_model::*;
use crate::domain_port::UserRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("can't find user by username: '{0}'")]
    UserNotFound(String),
    #[error("store error: {0}")]
    Store(String),
}

/// User as handed to callers, optionally tagged with the viewer's friend state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_small: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friend_state: Option<FriendState>,
}

impl UserView {
    pub fn from_record(record: &UserRecord, friend_state: Option<FriendState>) -> Self {
        UserView {
            id: Some(record.user_id),
            username: record.username.clone(),
            firstname: record.firstname.clone(),
            surname: record.surname.clone(),
            fullname: record.fullname.clone(),
            currency: Some(record.currency),
            photo: blob_to_string(record.photo.as_deref()),
            photo_small: blob_to_string(record.photo_small.as_deref()),
            friend_state,
        }
    }

    /// Shape returned for a username the store does not know yet.
    pub fn unknown(username: &str, currency: Currency) -> Self {
        UserView {
            id: None,
            username: username.to_owned(),
            firstname: None,
            surname: None,
            fullname: None,
            currency: Some(currency),
            photo: None,
            photo_small: None,
            friend_state: None,
        }
    }
}

fn blob_to_string(blob: Option<&[u8]>) -> Option<String> {
    blob.filter(|b| !b.is_empty())
        .map(|b| String::from_utf8_lossy(b).into_owned())
}

/// Partial profile keyed by username. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub username: String,
    pub firstname: Option<String>,
    pub surname: Option<String>,
    pub fullname: Option<String>,
    pub currency: Option<Currency>,
    pub photo: Option<String>,
    pub photo_small: Option<String>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ProvisionOutcome {
    Created(UserId),
    AlreadyExists,
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Creates a minimal user once per username, however often it is called.
    async fn provision(&self, username: &str) -> Result<ProvisionOutcome, UserError>;
    async fn update(&self, update: UserUpdate) -> Result<UserView, UserError>;
    async fn current_user(&self, username: &str) -> Result<UserView, UserError>;
}
