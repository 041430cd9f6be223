use actix_web::http::StatusCode;
use actix_web::test;
use backend::domain::Card;
use catcard_test_support::problem_details::assert_problem_details;
use catcard_test_support::unique_helpers::unique_username;
use serde_json::{json, Value};

use crate::support::{build_test_state, create_test_app, rigged_game};

#[actix_web::test]
async fn login_creates_then_reports_the_score() {
    let (state, _) = build_test_state().await;
    let app = create_test_app(state.clone()).await;
    let name = unique_username("login");

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({ "username": name }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["score"], json!(0));
    assert!(body["message"].as_str().unwrap().contains(&name));

    state.store().increment_score(&name).await.unwrap();
    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({ "username": name }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["score"], json!(1));
}

#[actix_web::test]
async fn full_winning_game_over_http() {
    let (state, _) = build_test_state().await;
    let app = create_test_app(state.clone()).await;

    let req = test::TestRequest::post()
        .uri("/api/game/start")
        .set_json(json!({ "username": "alice" }))
        .to_request();
    let started: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(started["success"], json!(true));
    assert_eq!(started["deck"].as_array().unwrap().len(), 5);
    assert_eq!(started["score"], json!(0));
    assert!(started["gameId"].is_string());

    // Swap in a known deck under the same game id.
    rigged_game(
        &state,
        "alice",
        &[
            Card::ExplodingKitten,
            Card::Cat,
            Card::Shuffle,
            Card::Cat,
            Card::Defuse,
        ],
    )
    .await;

    let mut last = Value::Null;
    for _ in 0..5 {
        let req = test::TestRequest::post()
            .uri("/api/game/draw")
            .set_json(json!({ "username": "alice" }))
            .to_request();
        last = test::call_and_read_body_json(&app, req).await;
    }
    assert_eq!(last["session"]["drawnCard"], json!("ExplodingKitten"));
    assert_eq!(last["session"]["gameWon"], json!(true));

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/game/end")
            .set_json(json!({ "username": "alice", "won": true }))
            .to_request();
        let ended: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(ended, json!({ "success": true, "score": 1, "won": true }));
    }

    let req = test::TestRequest::get().uri("/api/leaderboard").to_request();
    let board: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(board, json!([{ "username": "alice", "score": 1 }]));
}

#[actix_web::test]
async fn draw_after_a_loss_is_a_409() {
    let (state, _) = build_test_state().await;
    let app = create_test_app(state.clone()).await;
    rigged_game(&state, "bob", &[Card::Cat, Card::ExplodingKitten]).await;

    let draw = || {
        test::TestRequest::post()
            .uri("/api/game/draw")
            .set_json(json!({ "username": "bob" }))
            .to_request()
    };
    let resp = test::call_service(&app, draw()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(&app, draw()).await;
    assert_problem_details(resp, "INVALID_TRANSITION", StatusCode::CONFLICT, Some("over")).await;
}

#[actix_web::test]
async fn save_then_load_round_trips() {
    let (state, _) = build_test_state().await;
    let app = create_test_app(state.clone()).await;
    let mut session = rigged_game(&state, "carol", &[Card::Cat, Card::Cat]).await;
    session.deck.pop();
    session.drawn_card = Some(Card::Cat);

    let req = test::TestRequest::post()
        .uri("/api/game/save")
        .set_json(json!({ "username": "carol", "gameState": session }))
        .to_request();
    let saved: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(saved["success"], json!(true));

    let req = test::TestRequest::get()
        .uri("/api/game/load/carol")
        .to_request();
    let loaded: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(loaded, serde_json::to_value(&session).unwrap());
}

#[actix_web::test]
async fn load_of_unknown_user_is_a_404() {
    let (state, _) = build_test_state().await;
    let app = create_test_app(state).await;

    let req = test::TestRequest::get()
        .uri("/api/game/load/nobody")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, "SESSION_NOT_FOUND", StatusCode::NOT_FOUND, None).await;
}

#[actix_web::test]
async fn stale_save_is_a_409() {
    let (state, _) = build_test_state().await;
    let app = create_test_app(state.clone()).await;
    let mut session = rigged_game(&state, "dave", &[Card::Cat]).await;
    session.game_id = Some(uuid::Uuid::new_v4());

    let req = test::TestRequest::post()
        .uri("/api/game/save")
        .set_json(json!({ "username": "dave", "gameState": session }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, "STALE_SESSION", StatusCode::CONFLICT, None).await;
}

#[actix_web::test]
async fn empty_username_is_a_400() {
    let (state, _) = build_test_state().await;
    let app = create_test_app(state).await;

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({ "username": "  " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, "INVALID_USERNAME", StatusCode::BAD_REQUEST, None).await;
}

#[actix_web::test]
async fn unknown_card_in_save_is_a_400() {
    let (state, _) = build_test_state().await;
    let app = create_test_app(state).await;

    let req = test::TestRequest::post()
        .uri("/api/game/save")
        .insert_header(("content-type", "application/json"))
        .set_payload(
            r#"{"username":"erin","gameState":{"username":"erin","deck":["Dog"],
               "drawnCard":null,"defuseCount":0,"gameOver":false,"gameWon":false}}"#,
        )
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, "BAD_REQUEST", StatusCode::BAD_REQUEST, Some("Dog")).await;
}

#[actix_web::test]
async fn store_outage_is_a_503_not_a_default() {
    let (state, store) = build_test_state().await;
    let app = create_test_app(state).await;
    store.set_available(false);

    let req = test::TestRequest::get().uri("/api/leaderboard").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(
        resp.headers().get("retry-after").and_then(|v| v.to_str().ok()),
        Some("1")
    );
    assert_problem_details(
        resp,
        "STORE_UNAVAILABLE",
        StatusCode::SERVICE_UNAVAILABLE,
        None,
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({ "username": "frank" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}
