use crate::server::{Delivery, EventConsumer, EventHandler, EventPublisher, RetryPolicy, deliver};
use futures_util::StreamExt;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::BorrowedMessage;
use rdkafka::{ClientConfig, Message};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub struct DeadLetter {
    pub publisher: Arc<dyn EventPublisher>,
    pub topic: String,
}

pub struct KafkaConsumer {
    bootstrap_server: String,
    client_id: String,
    cancellation_token: CancellationToken,
    retry_policy: RetryPolicy,
    dead_letter: Option<DeadLetter>,
}

impl KafkaConsumer {
    pub fn new(
        bootstrap_server: &str,
        client_id: &str,
        cancellation_token: CancellationToken,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            bootstrap_server: bootstrap_server.to_string(),
            client_id: client_id.to_string(),
            cancellation_token,
            retry_policy,
            dead_letter: None,
        }
    }

    pub fn with_dead_letter(mut self, dead_letter: DeadLetter) -> Self {
        self.dead_letter = Some(dead_letter);
        self
    }

    async fn ensure_topics(bootstrap: &str, topics: &[&str]) -> anyhow::Result<()> {
        let admin: AdminClient<_> = ClientConfig::new()
            .set("bootstrap.servers", bootstrap)
            .create()?;

        let new_topics: Vec<_> = topics
            .iter()
            .map(|t| NewTopic::new(t, 1, TopicReplication::Fixed(1)))
            .collect();

        // per-topic "already exists" results are expected and ignored
        let _ = admin
            .create_topics(&new_topics, &AdminOptions::new())
            .await?;

        Ok(())
    }

    /// Parks a message that exhausted its retries. Returns whether it was parked.
    async fn park(&self, m: &BorrowedMessage<'_>) -> bool {
        let Some(dead_letter) = &self.dead_letter else {
            return false;
        };
        let key = m.key().unwrap_or(&[]);
        let payload = m.payload().unwrap_or(&[]);

        match dead_letter
            .publisher
            .publish(&dead_letter.topic, key, payload)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = ?e, topic = %dead_letter.topic, "dead-letter publish failed");
                false
            }
        }
    }
}

#[async_trait::async_trait]
impl EventConsumer for KafkaConsumer {
    async fn run(
        &self,
        consumer_group_id: &str,
        topics: &[&str],
        handler: Arc<dyn EventHandler>,
    ) -> anyhow::Result<()> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &self.bootstrap_server)
            .set("client.id", &self.client_id)
            .set("group.id", consumer_group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .create()?;

        Self::ensure_topics(&self.bootstrap_server, topics).await?;
        consumer.subscribe(topics)?;
        tracing::info!(group = consumer_group_id, ?topics, client = %self.client_id, "consumer subscribed");

        let mut stream = consumer.stream();

        loop {
            let result = tokio::select! {
                biased;
                _ = self.cancellation_token.cancelled() => {
                    tracing::info!("Kafka consumer shutting down...");
                    break;
                }
                msg = stream.next() => msg,
            };

            let Some(message) = result else {
                tracing::error!("Kafka consumer stream terminated");
                break;
            };

            let m = match message {
                Err(e) => {
                    // broker hiccup
                    tracing::warn!(error = ?e, "consumer poll error");
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    continue;
                }
                Ok(m) => m,
            };

            tracing::debug!(
                topic = m.topic(),
                partition = m.partition(),
                offset = m.offset(),
                "consumer record"
            );
            let payload = m.payload().unwrap_or(&[]);

            match deliver(
                handler.as_ref(),
                payload,
                &self.retry_policy,
                &self.cancellation_token,
            )
            .await
            {
                Delivery::Handled(_) => {}
                Delivery::Exhausted { attempts, error } => {
                    let parked = self.park(&m).await;
                    tracing::error!(
                        attempts,
                        error = ?error,
                        parked,
                        partition = m.partition(),
                        offset = m.offset(),
                        "giving up on message"
                    );
                }
                Delivery::Cancelled => {
                    // left uncommitted, redelivered after restart
                    tracing::info!(offset = m.offset(), "retry interrupted by shutdown");
                    break;
                }
            }

            if let Err(e) = consumer.commit_message(&m, CommitMode::Async) {
                tracing::warn!(error = ?e, "commit failed but ignored");
            }
        }

        drop(stream);
        consumer.unsubscribe();

        Ok(())
    }
}
