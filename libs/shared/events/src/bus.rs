use async_trait::async_trait;
use deadpool_redis::{Config, Pool, Runtime};
use futures::StreamExt;
use redis::AsyncCommands;
use thiserror::Error;
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_models::events::{ClinicEvent, EVENT_CHANNEL};

#[derive(Debug, Error)]
pub enum EventBusError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Redis pool error: {0}")]
    PoolError(String),

    #[error("Event serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Fan-out side of the bus. Cells publish fire-and-forget
/// notifications; whether anyone is listening is not their concern.
pub struct EventPublisher {
    pool: Pool,
}

impl EventPublisher {
    pub async fn connect(config: &AppConfig) -> Result<Self, EventBusError> {
        let cfg = Config::from_url(config.redis_url.clone());
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| EventBusError::PoolError(format!("Pool creation error: {}", e)))?;

        // Test connection
        let mut conn = pool
            .get()
            .await
            .map_err(|e| EventBusError::PoolError(format!("Connection error: {}", e)))?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        info!("Event publisher connected to redis");

        Ok(Self { pool })
    }

    pub async fn publish(&self, event: &ClinicEvent) -> Result<(), EventBusError> {
        let payload = serde_json::to_string(event)?;

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| EventBusError::PoolError(format!("Connection error: {}", e)))?;

        let receivers: i64 = conn.publish(EVENT_CHANNEL, payload).await?;
        debug!(
            "Published {} event to {} subscribers",
            event.event_type(),
            receivers
        );

        Ok(())
    }
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Name used in subscriber logs.
    fn name(&self) -> &'static str;

    async fn handle(&self, event: ClinicEvent);
}

/// Consuming side of the bus. Each worker holds its own subscriber
/// connection; a lost connection ends the loop and is left to the
/// supervisor to restart.
pub struct EventSubscriber {
    client: redis::Client,
}

impl EventSubscriber {
    pub fn new(config: &AppConfig) -> Result<Self, EventBusError> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        Ok(Self { client })
    }

    pub async fn run<H: EventHandler>(self, handler: H) -> Result<(), EventBusError> {
        let conn = self.client.get_async_connection().await?;
        let mut pubsub = conn.into_pubsub();
        pubsub.subscribe(EVENT_CHANNEL).await?;
        info!("{} subscribed to {}", handler.name(), EVENT_CHANNEL);

        let mut stream = pubsub.on_message();
        while let Some(msg) = stream.next().await {
            let payload: String = match msg.get_payload() {
                Ok(p) => p,
                Err(e) => {
                    warn!("{}: undecodable message payload: {}", handler.name(), e);
                    continue;
                }
            };

            // Unknown event types are other cells' business.
            let event: ClinicEvent = match serde_json::from_str(&payload) {
                Ok(event) => event,
                Err(e) => {
                    debug!("{}: skipping unparseable event: {}", handler.name(), e);
                    continue;
                }
            };

            handler.handle(event).await;
        }

        warn!("{}: event stream closed", handler.name());
        Ok(())
    }
}
