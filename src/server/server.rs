use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::logger::*;
use crate::server::*;
use crate::settings::Settings;
use nanoid::nanoid;
use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct Storage {
    user_repo: Arc<dyn UserRepo>,
    friendship_repo: Arc<dyn FriendshipRepo>,
    tx_manager: Arc<dyn TxManager>,
    pool: Option<MySqlPool>,
}

async fn open_storage(settings: &Settings) -> anyhow::Result<Storage> {
    match settings.store.backend.as_str() {
        "memory" => {
            let store = MemoryStore::new();
            Ok(Storage {
                user_repo: Arc::new(MemoryUserRepo::new(store.clone())),
                friendship_repo: Arc::new(MemoryFriendshipRepo::new(store.clone())),
                tx_manager: Arc::new(MemoryTxManager::new(store)),
                pool: None,
            })
        }
        "mysql" => {
            let dsn = settings
                .store
                .dsn
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("store.dsn is required for the mysql backend"))?;
            let pool = MySqlPoolOptions::new()
                .max_connections(settings.store.max_connections)
                .connect(dsn)
                .await?;
            migrate(&pool).await?;
            Ok(Storage {
                user_repo: Arc::new(MySqlUserRepo::new(pool.clone())),
                friendship_repo: Arc::new(MySqlFriendshipRepo::new(pool.clone())),
                tx_manager: Arc::new(MySqlTxManager::new(pool.clone())),
                pool: Some(pool),
            })
        }
        other => Err(anyhow::anyhow!("Unknown store backend: {}", other)),
    }
}

pub struct Server {
    pub user_service: Arc<dyn UserService>,
    pub relationship_service: Arc<dyn RelationshipService>,
    pub directory_service: Arc<dyn DirectoryService>,
    consumer_handles: Mutex<Vec<JoinHandle<()>>>,
    cancel: CancellationToken,
    pool: Option<MySqlPool>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let alphabet: [char; 16] = [
            '1', '2', '3', '4', '5', '6', '7', '8', '9', '0', 'a', 'b', 'c', 'd', 'e', 'f',
        ];
        let run_id = nanoid!(10, &alphabet);

        let storage = open_storage(settings).await?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let user_service: Arc<dyn UserService> = Arc::new(RealUserService::new(
            storage.user_repo.clone(),
            storage.tx_manager.clone(),
            clock.clone(),
            settings.userdata.default_currency,
        ));
        let relationship_service: Arc<dyn RelationshipService> =
            Arc::new(RealRelationshipService::new(
                storage.user_repo.clone(),
                storage.friendship_repo.clone(),
                storage.tx_manager.clone(),
                clock,
            ));
        let directory_service: Arc<dyn DirectoryService> = Arc::new(RealDirectoryService::new(
            storage.user_repo,
            storage.friendship_repo,
        ));

        // region runtime infra
        let cancel = CancellationToken::new();
        let kafka = &settings.kafka;
        let retry_policy = RetryPolicy {
            max_attempts: settings.consumer.max_attempts,
            initial_backoff: Duration::from_millis(settings.consumer.backoff_ms),
            ..RetryPolicy::default()
        };

        let handler: Arc<dyn EventHandler> =
            Arc::new(UserProvisioningHandler::new(user_service.clone()));

        let dead_letter_publisher: Option<Arc<dyn EventPublisher>> =
            match &kafka.dead_letter_topic {
                Some(_) if kafka.workers > 0 => Some(Arc::new(KafkaPublisher::new(
                    &kafka.bootstrap_servers,
                    &format!("userdata-dlq-{}", run_id),
                )?)),
                _ => None,
            };

        let mut consumer_handles = Vec::with_capacity(kafka.workers);
        for worker in 0..kafka.workers {
            let mut consumer = KafkaConsumer::new(
                &kafka.bootstrap_servers,
                &format!("userdata-sub-{}-{}", run_id, worker),
                cancel.clone(),
                retry_policy,
            );
            if let (Some(publisher), Some(topic)) =
                (&dead_letter_publisher, &kafka.dead_letter_topic)
            {
                consumer = consumer.with_dead_letter(DeadLetter {
                    publisher: publisher.clone(),
                    topic: topic.clone(),
                });
            }

            let handler = handler.clone();
            let group_id = kafka.group_id.clone();
            let topic = kafka.topic.clone();
            consumer_handles.push(tokio::spawn(async move {
                if let Err(e) = consumer.run(&group_id, &[topic.as_str()], handler).await {
                    error!(worker, error = ?e, "consumer stopped with error");
                }
            }));
        }
        // endregion

        info!(
            %run_id,
            backend = %settings.store.backend,
            workers = kafka.workers,
            "server started"
        );

        Ok(Self {
            user_service,
            relationship_service,
            directory_service,
            consumer_handles: Mutex::new(consumer_handles),
            cancel,
            pool: storage.pool,
        })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        self.cancel.cancel();

        let handles = match self.consumer_handles.lock() {
            Ok(mut lock) => std::mem::take(&mut *lock),
            Err(_) => Vec::new(),
        };
        for handle in handles {
            let r = handle.await;
            info!("consumer handle dropped: {:?}", r);
        }

        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
