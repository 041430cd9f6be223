use backend::domain::Card;
use serde_json::json;

use super::{connect_and_hello, TIMEOUT};
use crate::support::rigged_game;
use crate::support::build_test_state;
use crate::support::websocket::{start_test_server, wait_for_observers};

#[actix_web::test]
async fn credited_win_is_pushed_to_every_observer() -> Result<(), Box<dyn std::error::Error>> {
    let (state, _) = build_test_state().await;
    let registry = state.broker().registry();
    let (server, addr, join) = start_test_server(state.clone()).await?;

    let mut first = connect_and_hello(addr).await?;
    let mut second = connect_and_hello(addr).await?;
    wait_for_observers(&registry, 2, TIMEOUT).await?;

    state.games().login("bob").await?;
    rigged_game(&state, "alice", &[Card::Cat]).await;
    state.games().draw("alice").await?;
    let ended = state.games().end_game("alice", true).await?;
    assert!(ended.newly_scored);

    let expected = json!({
        "type": "leaderboard_update",
        "entries": [
            { "username": "alice", "score": 1 },
            { "username": "bob", "score": 0 }
        ]
    });
    for client in [&mut first, &mut second] {
        let update = client.recv_json_timeout(TIMEOUT).await?.ok_or("no update")?;
        assert_eq!(update, expected);
    }

    first.close().await?;
    second.close().await?;
    server.stop(true).await;
    join.await??;
    Ok(())
}

#[actix_web::test]
async fn losses_push_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let (state, _) = build_test_state().await;
    let registry = state.broker().registry();
    let (server, addr, join) = start_test_server(state.clone()).await?;

    let mut client = connect_and_hello(addr).await?;
    wait_for_observers(&registry, 1, TIMEOUT).await?;

    rigged_game(&state, "carol", &[Card::Cat, Card::ExplodingKitten]).await;
    state.games().draw("carol").await?;
    state.games().end_game("carol", false).await?;

    assert_eq!(
        client
            .recv_json_timeout(std::time::Duration::from_millis(200))
            .await?,
        None
    );

    client.close().await?;
    server.stop(true).await;
    join.await??;
    Ok(())
}
