use crate::application_port::{ProvisionOutcome, UserService};
use crate::domain_model::UserEvent;
use crate::server::{EventHandler, HandleOutcome};
use std::sync::Arc;

/// Turns user-creation events into user records.
pub struct UserProvisioningHandler {
    user_service: Arc<dyn UserService>,
}

impl UserProvisioningHandler {
    pub fn new(user_service: Arc<dyn UserService>) -> Self {
        Self { user_service }
    }
}

#[async_trait::async_trait]
impl EventHandler for UserProvisioningHandler {
    async fn handle(&self, payload: &[u8]) -> anyhow::Result<HandleOutcome> {
        let event = match serde_json::from_slice::<UserEvent>(payload) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "undecodable user event, skipped");
                return Ok(HandleOutcome::SkipCommit);
            }
        };
        if event.username.trim().is_empty() {
            tracing::warn!("user event without username, skipped");
            return Ok(HandleOutcome::SkipCommit);
        }

        match self.user_service.provision(&event.username).await? {
            ProvisionOutcome::Created(user_id) => {
                tracing::debug!(%user_id, username = %event.username, "user provisioned");
            }
            ProvisionOutcome::AlreadyExists => {}
        }

        Ok(HandleOutcome::Commit)
    }
}
