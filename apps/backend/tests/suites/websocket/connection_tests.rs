use serde_json::json;

use super::{connect_and_hello, ws_url, TIMEOUT};
use crate::support::build_test_state;
use crate::support::websocket::{start_test_server, wait_for_observers};
use crate::support::websocket_client::WebSocketClient;

#[actix_web::test]
async fn hello_then_get_leaderboard() -> Result<(), Box<dyn std::error::Error>> {
    let (state, _) = build_test_state().await;
    state.store().create_if_absent("bob").await?;
    state.store().increment_score("alice").await?;
    let (server, addr, join) = start_test_server(state.clone()).await?;

    let mut client = connect_and_hello(addr).await?;
    client
        .send_json(&json!({ "type": "get_leaderboard" }))
        .await?;
    let reply = client.recv_json_timeout(TIMEOUT).await?.ok_or("no reply")?;
    assert_eq!(
        reply,
        json!({
            "type": "leaderboard",
            "entries": [
                { "username": "alice", "score": 1 },
                { "username": "bob", "score": 0 }
            ]
        })
    );

    client.close().await?;
    server.stop(true).await;
    join.await??;
    Ok(())
}

#[actix_web::test]
async fn get_leaderboard_before_hello_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let (state, _) = build_test_state().await;
    let (server, addr, join) = start_test_server(state).await?;

    let mut client = WebSocketClient::connect_retry(&ws_url(addr), TIMEOUT).await?;
    client
        .send_json(&json!({ "type": "get_leaderboard" }))
        .await?;
    let reply = client.recv_json_timeout(TIMEOUT).await?.ok_or("no reply")?;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["code"], "bad_request");

    // The server closes after the error frame.
    assert_eq!(client.recv_json_timeout(TIMEOUT).await?, None);

    server.stop(true).await;
    join.await??;
    Ok(())
}

#[actix_web::test]
async fn wrong_protocol_version_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let (state, _) = build_test_state().await;
    let (server, addr, join) = start_test_server(state).await?;

    let mut client = WebSocketClient::connect_retry(&ws_url(addr), TIMEOUT).await?;
    client
        .send_json(&json!({ "type": "hello", "protocol": 99 }))
        .await?;
    let reply = client.recv_json_timeout(TIMEOUT).await?.ok_or("no reply")?;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["code"], "bad_protocol");

    server.stop(true).await;
    join.await??;
    Ok(())
}

#[actix_web::test]
async fn closed_connections_leave_the_registry() -> Result<(), Box<dyn std::error::Error>> {
    let (state, _) = build_test_state().await;
    let registry = state.broker().registry();
    let (server, addr, join) = start_test_server(state).await?;

    let mut first = connect_and_hello(addr).await?;
    let mut second = connect_and_hello(addr).await?;
    wait_for_observers(&registry, 2, TIMEOUT).await?;

    first.close().await?;
    wait_for_observers(&registry, 1, TIMEOUT).await?;
    second.close().await?;
    wait_for_observers(&registry, 0, TIMEOUT).await?;

    server.stop(true).await;
    join.await??;
    Ok(())
}
