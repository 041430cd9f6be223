use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::GameService;
use crate::store::SessionStore;
use crate::ws::broker::RealtimeBroker;

/// Shared resources handed to every handler through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    store: Arc<dyn SessionStore>,
    broker: Arc<RealtimeBroker>,
    games: Arc<GameService>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn SessionStore>,
        broker: Arc<RealtimeBroker>,
    ) -> Self {
        let games = Arc::new(GameService::new(store.clone(), broker.clone()));
        Self {
            config,
            store,
            broker,
            games,
        }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn broker(&self) -> &Arc<RealtimeBroker> {
        &self.broker
    }

    pub fn games(&self) -> &Arc<GameService> {
        &self.games
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("store", &self.store.backend_name())
            .field("observers", &self.broker.registry().connection_count())
            .finish()
    }
}
