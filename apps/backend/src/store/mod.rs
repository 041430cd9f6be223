//! Keyed persistence for scores and saved sessions.
//!
//! Every operation is keyed by the exact username string. Implementations
//! must make `create_if_absent`, `increment_score` and `claim_win` atomic per
//! username using the backend's own primitives, and must report an
//! unreachable or slow backend as `StoreUnavailable`/`Timeout` rather than
//! as missing data.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{LeaderboardEntry, Session};
use crate::errors::domain::DomainError;

pub mod memory;
pub mod redis_store;

pub use memory::InMemoryStore;
pub use redis_store::RedisStore;

/// Result of crediting a won game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinClaim {
    /// Score after the claim.
    pub score: i64,
    /// False when this game id had already been credited.
    pub newly_scored: bool,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create the score record at 0 if missing; return the current score.
    async fn create_if_absent(&self, username: &str) -> Result<i64, DomainError>;

    /// `NotFound(User)` if the user never logged in.
    async fn get_score(&self, username: &str) -> Result<i64, DomainError>;

    /// Atomically add one and return the new score.
    async fn increment_score(&self, username: &str) -> Result<i64, DomainError>;

    /// Mark `game_id` as credited and increment the score, only if it was
    /// not already marked. Both happen atomically with respect to other
    /// claims for the same game.
    async fn claim_win(&self, username: &str, game_id: Uuid) -> Result<WinClaim, DomainError>;

    /// Full overwrite, last writer wins.
    async fn save_session(&self, username: &str, session: &Session) -> Result<(), DomainError>;

    /// `NotFound(Session)` if nothing was saved.
    async fn load_session(&self, username: &str) -> Result<Session, DomainError>;

    /// Every known score record, in no particular order.
    async fn scores(&self) -> Result<Vec<LeaderboardEntry>, DomainError>;

    /// Cheap liveness probe for health checks.
    async fn ping(&self) -> Result<(), DomainError>;

    fn backend_name(&self) -> &'static str;
}
