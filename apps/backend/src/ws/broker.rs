//! Fan-out of leaderboard snapshots, locally or across instances.
//!
//! Without Redis every snapshot goes straight to this instance's
//! [`ObserverRegistry`]. With Redis, snapshots are published on the
//! `leaderboard` channel and a background subscriber on every instance
//! (this one included) delivers them to its own observers.

use std::sync::Arc;
use std::time::Duration;

use rand::random;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tokio_stream::StreamExt;
use tracing::{error, info, warn};

use crate::domain::LeaderboardEntry;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::ws::hub::{LeaderboardBroadcast, ObserverRegistry};

pub const LEADERBOARD_CHANNEL: &str = "leaderboard";

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventEnvelope {
    LeaderboardUpdate { entries: Vec<LeaderboardEntry> },
}

pub struct RealtimeBroker {
    registry: Arc<ObserverRegistry>,
    publisher: Option<Mutex<ConnectionManager>>,
}

impl RealtimeBroker {
    /// Single-instance broker.
    pub fn local() -> Arc<Self> {
        Arc::new(Self {
            registry: Arc::new(ObserverRegistry::new()),
            publisher: None,
        })
    }

    pub async fn connect(redis_url: &str) -> Result<Arc<Self>, AppError> {
        let client = Client::open(redis_url)
            .map_err(|err| AppError::config(format!("Invalid REDIS_URL: {err}")))?;

        let manager = ConnectionManager::new(client.clone())
            .await
            .map_err(|err| {
                AppError::config(format!("Unable to initialize Redis connection manager: {err}"))
            })?;

        let registry = Arc::new(ObserverRegistry::new());
        let broker = Arc::new(Self {
            registry: registry.clone(),
            publisher: Some(Mutex::new(manager)),
        });

        spawn_subscriber(client, registry);

        Ok(broker)
    }

    pub fn registry(&self) -> Arc<ObserverRegistry> {
        self.registry.clone()
    }

    pub fn is_distributed(&self) -> bool {
        self.publisher.is_some()
    }

    /// Push a snapshot to all observers. Never waits on Redis or on any
    /// observer: the Redis path runs in its own task and falls back to
    /// local delivery if publishing fails.
    pub fn publish_leaderboard(self: &Arc<Self>, entries: Vec<LeaderboardEntry>) {
        if self.publisher.is_none() {
            self.registry.broadcast(LeaderboardBroadcast::new(entries));
            return;
        }

        let broker = Arc::clone(self);
        tokio::spawn(async move {
            let envelope = EventEnvelope::LeaderboardUpdate {
                entries: entries.clone(),
            };
            if let Err(err) = broker.publish_to_channel(&envelope).await {
                warn!(error = %err, "Leaderboard publish failed, delivering to local observers only");
                broker.registry.broadcast(LeaderboardBroadcast::new(entries));
            }
        });
    }

    async fn publish_to_channel(&self, envelope: &EventEnvelope) -> Result<(), AppError> {
        let Some(publisher) = &self.publisher else {
            return Ok(());
        };
        let encoded = serde_json::to_string(envelope).map_err(|err| {
            AppError::internal(
                ErrorCode::InternalError,
                format!("Failed to serialize realtime envelope: {err}"),
            )
        })?;

        let mut attempt = 0u32;
        loop {
            attempt += 1;

            let publish_res = {
                let mut publisher = publisher.lock().await;
                publisher
                    .publish::<_, _, ()>(LEADERBOARD_CHANNEL, encoded.clone())
                    .await
            };

            match publish_res {
                Ok(()) => return Ok(()),
                Err(err) => {
                    let app_err = AppError::internal(
                        ErrorCode::StoreUnavailable,
                        format!("Failed to publish realtime event to Redis: {err}"),
                    );
                    if attempt >= PUBLISHER_MAX_ATTEMPTS || !is_transient_error(&app_err) {
                        return Err(app_err);
                    }

                    let delay_ms = PUBLISHER_INITIAL_RETRY_DELAY_MS
                        .saturating_mul(2_u64.pow(attempt - 1))
                        .min(PUBLISHER_MAX_RETRY_DELAY_MS);
                    warn!(
                        error = %app_err,
                        attempt,
                        retry_delay_ms = delay_ms,
                        "Redis publish failed, retrying"
                    );
                    sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }
}

// Subscriber retry (background task)
const INITIAL_RETRY_DELAY_SECS: u64 = 1;
const MAX_RETRY_DELAY_SECS: u64 = 60;
const RETRY_DELAY_MULTIPLIER: f64 = 2.0;
const JITTER_PERCENT: f64 = 0.2;

// Publisher retry (off the request path)
const PUBLISHER_MAX_ATTEMPTS: u32 = 3;
const PUBLISHER_INITIAL_RETRY_DELAY_MS: u64 = 50;
const PUBLISHER_MAX_RETRY_DELAY_MS: u64 = 200;

fn spawn_subscriber(client: Client, registry: Arc<ObserverRegistry>) {
    tokio::spawn(async move {
        run_subscription_loop_with_retry(client, registry).await;
    });
}

fn is_transient_error(err: &AppError) -> bool {
    if let AppError::Config { .. } = err {
        return false;
    }

    let msg = err.to_string().to_lowercase();
    if msg.contains("authentication")
        || msg.contains("noauth")
        || msg.contains("wrongpass")
        || msg.contains("invalid redis_url")
    {
        return false;
    }

    true
}

fn calculate_retry_delay(attempt: u32) -> Duration {
    let base_delay =
        INITIAL_RETRY_DELAY_SECS as f64 * RETRY_DELAY_MULTIPLIER.powi(attempt as i32 - 1);
    let capped_delay = base_delay.min(MAX_RETRY_DELAY_SECS as f64);

    let jitter_range = capped_delay * JITTER_PERCENT;
    let jitter = (random::<f64>() * 2.0 - 1.0) * jitter_range;

    Duration::from_secs_f64((capped_delay + jitter).max(0.1))
}

async fn run_subscription_loop_with_retry(client: Client, registry: Arc<ObserverRegistry>) {
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        match run_subscription_loop(&client, &registry, &mut attempt).await {
            Ok(()) => {
                info!("Redis subscription loop completed normally");
                break;
            }
            Err(err) => {
                if !is_transient_error(&err) {
                    error!(error = %err, attempt, "Redis subscription failed with permanent error, exiting");
                    break;
                }

                let delay = calculate_retry_delay(attempt);
                warn!(
                    error = %err,
                    attempt,
                    retry_delay_secs = delay.as_secs_f64(),
                    "Redis subscription failed, retrying"
                );
                sleep(delay).await;

                // Keep the backoff near its cap instead of growing the exponent forever.
                if attempt >= 20 {
                    attempt = 10;
                }
            }
        }
    }
}

/// Runs until the subscription stream ends. `attempt` goes back to 1 once
/// the subscription is established so a later drop starts from a short delay.
async fn run_subscription_loop(
    client: &Client,
    registry: &ObserverRegistry,
    attempt: &mut u32,
) -> Result<(), AppError> {
    let mut pubsub = client.get_async_pubsub().await.map_err(|err| {
        AppError::internal(
            ErrorCode::StoreUnavailable,
            format!("Failed to connect to Redis for subscription: {err}"),
        )
    })?;

    pubsub.subscribe(LEADERBOARD_CHANNEL).await.map_err(|err| {
        AppError::internal(
            ErrorCode::StoreUnavailable,
            format!("Failed to subscribe to Redis channel {LEADERBOARD_CHANNEL}: {err}"),
        )
    })?;

    info!(channel = LEADERBOARD_CHANNEL, "Redis subscription established");
    *attempt = 1;

    let mut stream = pubsub.into_on_message();
    while let Some(msg) = stream.next().await {
        let Ok(payload) = msg.get_payload::<String>() else {
            continue;
        };
        match decode_envelope(&payload) {
            Ok(EventEnvelope::LeaderboardUpdate { entries }) => {
                registry.broadcast(LeaderboardBroadcast::new(entries));
            }
            Err(err) => {
                error!(error = %err, "Failed to decode Redis realtime payload");
            }
        }
    }

    warn!("Redis subscription stream ended, connection lost");
    Err(AppError::internal(
        ErrorCode::StoreUnavailable,
        "Redis subscription stream ended unexpectedly".to_string(),
    ))
}

fn decode_envelope(payload: &str) -> Result<EventEnvelope, serde_json::Error> {
    serde_json::from_str(payload)
}
