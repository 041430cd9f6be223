//! Game operations on top of the session store.
//!
//! Everything that reads and then writes a user's session (start, draw,
//! save, end) holds that user's async lock for the whole sequence, so two
//! concurrent requests for one user cannot interleave their
//! load/modify/save. Different users never share a lock.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::domain::{validate_username, LeaderboardEntry, Session, SessionStatus};
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind, ValidationKind};
use crate::services::leaderboard::compute_leaderboard;
use crate::store::SessionStore;
use crate::ws::broker::RealtimeBroker;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedGame {
    pub session: Session,
    pub score: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndedGame {
    pub score: i64,
    /// Outcome as recorded by the server, not as claimed by the client.
    pub won: bool,
    /// This call credited the win.
    pub newly_scored: bool,
}

/// Holds one user's lock and drops the map entry once nobody else holds
/// or waits on it.
struct UserGuard<'a> {
    guard: Option<OwnedMutexGuard<()>>,
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    username: String,
}

impl Drop for UserGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        // Waiters hold a clone, so a count of one means only the map is left.
        self.locks
            .remove_if(&self.username, |_, lock| Arc::strong_count(lock) == 1);
    }
}

pub struct GameService {
    store: Arc<dyn SessionStore>,
    broker: Arc<RealtimeBroker>,
    user_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl GameService {
    pub fn new(store: Arc<dyn SessionStore>, broker: Arc<RealtimeBroker>) -> Self {
        Self {
            store,
            broker,
            user_locks: DashMap::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    async fn lock_user(&self, username: &str) -> UserGuard<'_> {
        let lock = self
            .user_locks
            .entry(username.to_string())
            .or_default()
            .value()
            .clone();
        UserGuard {
            guard: Some(lock.lock_owned().await),
            locks: &self.user_locks,
            username: username.to_string(),
        }
    }

    /// Users with a lock entry right now. Entries only live while a request
    /// for that user holds or waits on the lock.
    pub fn locked_users(&self) -> usize {
        self.user_locks.len()
    }

    /// Create the score record if needed and return the current score.
    pub async fn login(&self, username: &str) -> Result<i64, DomainError> {
        let username = validate_username(username)?;
        let score = self.store.create_if_absent(username).await?;
        info!(username, score, "user logged in");
        Ok(score)
    }

    /// Deal a fresh game, replacing whatever was saved before. Logs the user
    /// in implicitly.
    pub async fn start_game(&self, username: &str) -> Result<StartedGame, DomainError> {
        let username = validate_username(username)?;
        let _guard = self.lock_user(username).await;

        let score = self.store.create_if_absent(username).await?;
        let session = Session::start(username);
        self.store.save_session(username, &session).await?;

        info!(
            username,
            game_id = ?session.game_id,
            "game started"
        );
        Ok(StartedGame { session, score })
    }

    /// Draw the top card of the saved game and persist the result.
    pub async fn draw(&self, username: &str) -> Result<Session, DomainError> {
        let username = validate_username(username)?;
        let _guard = self.lock_user(username).await;

        let mut session = self.store.load_session(username).await?;
        let card = session.draw()?;
        self.store.save_session(username, &session).await?;

        debug!(
            username,
            %card,
            remaining = session.deck.len(),
            status = ?session.status(),
            "card drawn"
        );
        Ok(session)
    }

    /// Overwrite the saved game with a client copy of the same game.
    ///
    /// The copy must pass structural validation, carry the stored game id
    /// and be reachable from the stored game by drawing. It may not change a
    /// finished game, and it may not declare a win the server never saw;
    /// wins only come from [`GameService::draw`].
    pub async fn save_game(&self, username: &str, mut session: Session) -> Result<(), DomainError> {
        let username = validate_username(username)?;
        if session.username != username {
            return Err(DomainError::validation(
                ValidationKind::UsernameMismatch,
                format!(
                    "Saved game belongs to '{}', not '{username}'",
                    session.username
                ),
            ));
        }
        session.validate()?;

        let _guard = self.lock_user(username).await;
        let stored = self.store.load_session(username).await?;

        if stored.game_id != session.game_id {
            return Err(DomainError::conflict(
                ConflictKind::StaleSession,
                "Saved game is not the current game; start or load again",
            ));
        }
        session.scored = stored.scored;
        if stored.status().is_terminal() && session != stored {
            return Err(DomainError::invalid_transition(
                "A finished game cannot be overwritten",
            ));
        }
        if session.status() == SessionStatus::Won && stored.status() != SessionStatus::Won {
            return Err(DomainError::invalid_transition(
                "Only the server can declare a game won",
            ));
        }
        if !session.follows_from(&stored) {
            return Err(DomainError::invalid_transition(
                "Saved game cannot be reached by drawing from the current game",
            ));
        }

        self.store.save_session(username, &session).await?;
        debug!(username, remaining = session.deck.len(), "game saved");
        Ok(())
    }

    pub async fn load_game(&self, username: &str) -> Result<Session, DomainError> {
        let username = validate_username(username)?;
        self.store.load_session(username).await
    }

    /// Finish the current game and credit a win at most once.
    ///
    /// The outcome comes from the saved session; `claimed_won` is only
    /// compared against it for logging. An unfinished game is forfeited.
    pub async fn end_game(&self, username: &str, claimed_won: bool) -> Result<EndedGame, DomainError> {
        let username = validate_username(username)?;
        let guard = self.lock_user(username).await;

        let mut session = match self.store.load_session(username).await {
            Ok(session) => session,
            Err(DomainError::NotFound(NotFoundKind::Session, _)) => {
                if claimed_won {
                    warn!(username, "win claimed without a saved game; ignored");
                }
                let score = self.store.get_score(username).await?;
                return Ok(EndedGame {
                    score,
                    won: false,
                    newly_scored: false,
                });
            }
            Err(err) => return Err(err),
        };

        let status = session.status();
        if claimed_won && status != SessionStatus::Won {
            warn!(username, ?status, "client claimed a win the server did not record");
        }

        let ended = match status {
            SessionStatus::Won if session.scored => EndedGame {
                score: self.store.get_score(username).await?,
                won: true,
                newly_scored: false,
            },
            SessionStatus::Won => {
                let Some(game_id) = session.game_id else {
                    // Saved before game ids existed; there is nothing to claim against.
                    warn!(username, "won game has no game id; not credited");
                    return Ok(EndedGame {
                        score: self.store.get_score(username).await?,
                        won: true,
                        newly_scored: false,
                    });
                };
                let claim = self.store.claim_win(username, game_id).await?;
                session.scored = true;
                self.store.save_session(username, &session).await?;
                if claim.newly_scored {
                    info!(username, %game_id, score = claim.score, "win credited");
                }
                EndedGame {
                    score: claim.score,
                    won: true,
                    newly_scored: claim.newly_scored,
                }
            }
            SessionStatus::InProgress => {
                session.forfeit();
                self.store.save_session(username, &session).await?;
                info!(username, "game forfeited");
                EndedGame {
                    score: self.store.get_score(username).await?,
                    won: false,
                    newly_scored: false,
                }
            }
            SessionStatus::Lost => EndedGame {
                score: self.store.get_score(username).await?,
                won: false,
                newly_scored: false,
            },
        };
        drop(guard);

        if ended.newly_scored {
            self.broadcast_leaderboard().await;
        }
        Ok(ended)
    }

    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, DomainError> {
        compute_leaderboard(self.store.as_ref()).await
    }

    /// Recompute and push the leaderboard. A failure here must not fail the
    /// request that changed the score, so it is only logged.
    async fn broadcast_leaderboard(&self) {
        match self.leaderboard().await {
            Ok(entries) => self.broker.publish_leaderboard(entries),
            Err(err) => warn!(error = %err, "leaderboard not broadcast"),
        }
    }
}
