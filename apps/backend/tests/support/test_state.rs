use std::sync::Arc;

use backend::domain::{Card, Session};
use backend::infra::state::build_state;
use backend::state::app_state::AppState;
use backend::store::InMemoryStore;

/// Fresh in-memory state per test, plus a handle on the concrete store so
/// tests can simulate outages.
pub async fn build_test_state() -> (AppState, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let state = build_state()
        .with_store(store.clone())
        .build()
        .await
        .expect("in-memory state always builds");
    (state, store)
}

/// Start a game for `username` and replace its deck with `deck` (top card
/// last), keeping the game id the server minted.
pub async fn rigged_game(state: &AppState, username: &str, deck: &[Card]) -> Session {
    let started = state
        .games()
        .start_game(username)
        .await
        .expect("start_game");
    let mut session = started.session;
    session.deck = deck.to_vec();
    state
        .store()
        .save_session(username, &session)
        .await
        .expect("save rigged session");
    session
}
