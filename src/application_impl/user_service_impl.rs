use crate::application_port::*;
use crate::domain_model::Currency;
use crate::domain_port::{Clock, TxManager, UserClaim, UserRecord, UserRepo};
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub struct RealUserService {
    user_repo: Arc<dyn UserRepo>,
    tx_manager: Arc<dyn TxManager>,
    clock: Arc<dyn Clock>,
    default_currency: Currency,
}

impl RealUserService {
    pub fn new(
        user_repo: Arc<dyn UserRepo>,
        tx_manager: Arc<dyn TxManager>,
        clock: Arc<dyn Clock>,
        default_currency: Currency,
    ) -> RealUserService {
        RealUserService {
            user_repo,
            tx_manager,
            clock,
            default_currency,
        }
    }
}

#[async_trait::async_trait]
impl UserService for RealUserService {
    #[instrument(name = "userdata.user.provision", skip(self))]
    async fn provision(&self, username: &str) -> Result<ProvisionOutcome, UserError> {
        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| UserError::Store(e.to_string()))?;

        let existing = self
            .user_repo
            .find_by_username_in_tx(&mut *tx, username)
            .await
            .map_err(|e| UserError::Store(e.to_string()))?;
        if existing.is_some() {
            info!("user already exists, event skipped");
            return Ok(ProvisionOutcome::AlreadyExists);
        }

        let record = UserRecord::new(username, self.default_currency, self.clock.now());
        match self
            .user_repo
            .insert_in_tx(&mut *tx, &record)
            .await
            .map_err(|e| UserError::Store(e.to_string()))?
        {
            UserClaim::Won => {
                tx.commit()
                    .await
                    .map_err(|e| UserError::Store(e.to_string()))?;
                info!(user_id = %record.user_id, "user saved");
                Ok(ProvisionOutcome::Created(record.user_id))
            }
            UserClaim::Existing => {
                // another consumer inserted the same username after our lookup
                info!("user created concurrently, event skipped");
                Ok(ProvisionOutcome::AlreadyExists)
            }
        }
    }

    #[instrument(name = "userdata.user.update", skip(self, update), fields(username = %update.username))]
    async fn update(&self, update: UserUpdate) -> Result<UserView, UserError> {
        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| UserError::Store(e.to_string()))?;

        let found = self
            .user_repo
            .find_by_username_in_tx(&mut *tx, &update.username)
            .await
            .map_err(|e| UserError::Store(e.to_string()))?;
        let is_new = found.is_none();
        let mut record = found.unwrap_or_else(|| {
            UserRecord::new(
                &update.username,
                update.currency.unwrap_or(self.default_currency),
                self.clock.now(),
            )
        });

        if let Some(firstname) = update.firstname {
            record.firstname = Some(firstname);
        }
        if let Some(surname) = update.surname {
            record.surname = Some(surname);
        }
        if let Some(fullname) = update.fullname {
            record.fullname = Some(fullname);
        }
        if let Some(currency) = update.currency {
            record.currency = currency;
        }
        if let Some(photo) = update.photo {
            record.photo = Some(photo.into_bytes());
        }
        if let Some(photo_small) = update.photo_small {
            record.photo_small = Some(photo_small.into_bytes());
        }

        if is_new {
            debug!("user not provisioned yet, creating from update");
            if let UserClaim::Existing = self
                .user_repo
                .insert_in_tx(&mut *tx, &record)
                .await
                .map_err(|e| UserError::Store(e.to_string()))?
            {
                return Err(UserError::Store(format!(
                    "user '{}' was created concurrently",
                    record.username
                )));
            }
        } else {
            self.user_repo
                .save_in_tx(&mut *tx, &record)
                .await
                .map_err(|e| UserError::Store(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| UserError::Store(e.to_string()))?;

        Ok(UserView::from_record(&record, None))
    }

    async fn current_user(&self, username: &str) -> Result<UserView, UserError> {
        let found = self
            .user_repo
            .find_by_username(username)
            .await
            .map_err(|e| UserError::Store(e.to_string()))?;

        Ok(match found {
            Some(record) => UserView::from_record(&record, None),
            None => UserView::unknown(username, self.default_currency),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_port::SystemClock;
    use crate::infra_memory::*;
    use tracing_test::traced_test;

    fn service(store: &MemoryStore) -> RealUserService {
        RealUserService::new(
            Arc::new(MemoryUserRepo::new(store.clone())),
            Arc::new(MemoryTxManager::new(store.clone())),
            Arc::new(SystemClock),
            Currency::Eur,
        )
    }

    #[traced_test]
    #[tokio::test]
    async fn duplicate_provision_is_logged_and_skipped() {
        let store = MemoryStore::new();
        let users = service(&store);

        assert!(matches!(
            users.provision("alice").await,
            Ok(ProvisionOutcome::Created(_))
        ));
        assert!(matches!(
            users.provision("alice").await,
            Ok(ProvisionOutcome::AlreadyExists)
        ));

        assert!(logs_contain("user saved"));
        assert!(logs_contain("already exists"));
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn provisioned_user_uses_default_currency() {
        let store = MemoryStore::new();
        let users = service(&store);
        users.provision("bob").await.unwrap();

        let view = users.current_user("bob").await.unwrap();
        assert_eq!(view.currency, Some(Currency::Eur));
        assert_eq!(view.friend_state, None);
    }
}
