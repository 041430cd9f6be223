use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{AppConfig, StoreBackend};
use crate::error::AppError;
use crate::state::app_state::AppState;
use crate::store::{InMemoryStore, RedisStore, SessionStore};
use crate::ws::broker::RealtimeBroker;

/// Builder for [`AppState`], shared by `main` and the test suites.
pub struct StateBuilder {
    config: Option<AppConfig>,
    store: Option<Arc<dyn SessionStore>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            store: None,
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use this store instead of the one named by the config. The broker is
    /// then local to this process.
    pub fn with_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        let config = self.config.unwrap_or_default();

        if let Some(store) = self.store {
            return Ok(AppState::new(config, store, RealtimeBroker::local()));
        }

        match &config.store {
            StoreBackend::Memory => {
                info!("REDIS_URL not set, using in-memory store");
                Ok(AppState::new(
                    config,
                    Arc::new(InMemoryStore::new()),
                    RealtimeBroker::local(),
                ))
            }
            StoreBackend::Redis { url } => {
                let store = RedisStore::connect(url, config.store_timeout).await?;
                if let Err(err) = store.rebuild_index().await {
                    warn!(error = %err, "leaderboard index rebuild failed; continuing");
                }
                let broker = RealtimeBroker::connect(url).await?;
                let store: Arc<dyn SessionStore> = Arc::new(store);
                Ok(AppState::new(config, store, broker))
            }
        }
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
