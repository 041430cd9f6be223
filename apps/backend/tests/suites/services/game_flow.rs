use backend::domain::{Card, SessionStatus};
use backend::errors::domain::{DomainError, NotFoundKind, ValidationKind};

use crate::support::{build_test_state, rigged_game};

const ALICE_DECK: [Card; 5] = [
    Card::ExplodingKitten,
    Card::Cat,
    Card::Shuffle,
    Card::Cat,
    Card::Defuse,
];

#[tokio::test]
async fn alice_survives_the_deck_and_scores_once() {
    let (state, _) = build_test_state().await;
    let games = state.games();

    assert_eq!(games.login("alice").await.unwrap(), 0);
    rigged_game(&state, "alice", &ALICE_DECK).await;

    let expected = [
        Card::Defuse,
        Card::Cat,
        Card::Shuffle,
        Card::Cat,
        Card::ExplodingKitten,
    ];
    let mut last = None;
    for card in expected {
        let session = games.draw("alice").await.unwrap();
        assert_eq!(session.drawn_card, Some(card));
        last = Some(session);
    }
    let last = last.unwrap();
    assert_eq!(last.status(), SessionStatus::Won);
    assert_eq!(last.defuse_count, 0);

    let first = games.end_game("alice", true).await.unwrap();
    assert!(first.won);
    assert!(first.newly_scored);
    assert_eq!(first.score, 1);

    let again = games.end_game("alice", true).await.unwrap();
    assert!(again.won);
    assert!(!again.newly_scored);
    assert_eq!(again.score, 1);

    let board = games.leaderboard().await.unwrap();
    assert_eq!(board[0].username, "alice");
    assert_eq!(board[0].score, 1);
}

#[tokio::test]
async fn kitten_first_loses_and_client_claim_is_ignored() {
    let (state, _) = build_test_state().await;
    let games = state.games();

    rigged_game(
        &state,
        "bob",
        &[
            Card::Cat,
            Card::Cat,
            Card::Defuse,
            Card::Shuffle,
            Card::ExplodingKitten,
        ],
    )
    .await;

    let session = games.draw("bob").await.unwrap();
    assert_eq!(session.drawn_card, Some(Card::ExplodingKitten));
    assert_eq!(session.status(), SessionStatus::Lost);

    let err = games.draw("bob").await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidTransition(_)));

    let ended = games.end_game("bob", true).await.unwrap();
    assert!(!ended.won);
    assert_eq!(ended.score, 0);
}

#[tokio::test]
async fn ending_an_unfinished_game_forfeits_it() {
    let (state, _) = build_test_state().await;
    let games = state.games();

    rigged_game(&state, "carol", &[Card::ExplodingKitten, Card::Cat, Card::Cat]).await;
    games.draw("carol").await.unwrap();

    let ended = games.end_game("carol", true).await.unwrap();
    assert!(!ended.won);
    assert_eq!(ended.score, 0);

    let saved = games.load_game("carol").await.unwrap();
    assert_eq!(saved.status(), SessionStatus::Lost);
    assert!(matches!(
        games.draw("carol").await,
        Err(DomainError::InvalidTransition(_))
    ));
}

#[tokio::test]
async fn new_game_after_a_win_can_score_again() {
    let (state, _) = build_test_state().await;
    let games = state.games();

    for expected_score in 1..=2 {
        rigged_game(&state, "dave", &[Card::Cat]).await;
        games.draw("dave").await.unwrap();
        let ended = games.end_game("dave", false).await.unwrap();
        assert!(ended.won, "the server's outcome wins over the client flag");
        assert_eq!(ended.score, expected_score);
    }
}

#[tokio::test]
async fn start_game_logs_in_and_keeps_the_score() {
    let (state, _) = build_test_state().await;
    let games = state.games();

    let started = games.start_game("erin").await.unwrap();
    assert_eq!(started.score, 0);
    assert_eq!(started.session.deck.len(), 5);
    assert!(started.session.game_id.is_some());

    state.store().increment_score("erin").await.unwrap();
    let restarted = games.start_game("erin").await.unwrap();
    assert_eq!(restarted.score, 1);
    assert_ne!(restarted.session.game_id, started.session.game_id);
}

#[tokio::test]
async fn load_resumes_the_exact_saved_state() {
    let (state, _) = build_test_state().await;
    let games = state.games();

    games.start_game("frank").await.unwrap();
    let after_draw = games.draw("frank").await.unwrap();
    let loaded = games.load_game("frank").await.unwrap();
    assert_eq!(loaded, after_draw);
    // Loading twice is idempotent.
    assert_eq!(games.load_game("frank").await.unwrap(), loaded);
}

#[tokio::test]
async fn missing_records_are_not_found() {
    let (state, _) = build_test_state().await;
    let games = state.games();

    assert!(matches!(
        games.load_game("ghost").await,
        Err(DomainError::NotFound(NotFoundKind::Session, _))
    ));
    assert!(matches!(
        games.draw("ghost").await,
        Err(DomainError::NotFound(NotFoundKind::Session, _))
    ));
    assert!(matches!(
        games.end_game("ghost", true).await,
        Err(DomainError::NotFound(NotFoundKind::User, _))
    ));

    games.login("ghost").await.unwrap();
    let ended = games.end_game("ghost", true).await.unwrap();
    assert_eq!(ended.score, 0);
    assert!(!ended.won);
}

#[tokio::test]
async fn bad_usernames_never_reach_the_store() {
    let (state, store) = build_test_state().await;
    store.set_available(false);

    for bad in ["", "   ", "tab\there"] {
        let err = state.games().login(bad).await.unwrap_err();
        assert!(
            matches!(err, DomainError::Validation(ValidationKind::InvalidUsername, _)),
            "{bad:?} -> {err:?}"
        );
    }
}

#[tokio::test]
async fn outage_surfaces_as_unavailable() {
    let (state, store) = build_test_state().await;
    state.games().start_game("gina").await.unwrap();
    store.set_available(false);

    assert!(state.games().login("gina").await.unwrap_err().is_store_unavailable());
    assert!(state.games().draw("gina").await.unwrap_err().is_store_unavailable());
    assert!(state.games().leaderboard().await.unwrap_err().is_store_unavailable());
}
