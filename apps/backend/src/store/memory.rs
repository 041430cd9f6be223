//! In-process store used when no Redis URL is configured, and by tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use tracing::debug;
use uuid::Uuid;

use super::{SessionStore, WinClaim};
use crate::domain::{LeaderboardEntry, Session};
use crate::errors::domain::{DomainError, NotFoundKind};

/// DashMap-backed store. Per-key atomicity comes from the shard lock held
/// by `entry()`; different usernames never contend beyond shard sharing.
#[derive(Debug)]
pub struct InMemoryStore {
    scores: DashMap<String, i64>,
    sessions: DashMap<String, Session>,
    claims: DashSet<(String, Uuid)>,
    available: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            scores: DashMap::new(),
            sessions: DashMap::new(),
            claims: DashSet::new(),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate an outage: while unavailable every call fails with
    /// `StoreUnavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DomainError::store_unavailable("In-memory store is offline"))
        }
    }

    fn bump(&self, username: &str) -> i64 {
        let mut entry = self.scores.entry(username.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn create_if_absent(&self, username: &str) -> Result<i64, DomainError> {
        self.check_available()?;
        let score = *self.scores.entry(username.to_string()).or_insert(0);
        Ok(score)
    }

    async fn get_score(&self, username: &str) -> Result<i64, DomainError> {
        self.check_available()?;
        self.scores.get(username).map(|s| *s.value()).ok_or_else(|| {
            DomainError::not_found(NotFoundKind::User, format!("Unknown user '{username}'"))
        })
    }

    async fn increment_score(&self, username: &str) -> Result<i64, DomainError> {
        self.check_available()?;
        Ok(self.bump(username))
    }

    async fn claim_win(&self, username: &str, game_id: Uuid) -> Result<WinClaim, DomainError> {
        self.check_available()?;
        if self.claims.insert((username.to_string(), game_id)) {
            let score = self.bump(username);
            Ok(WinClaim {
                score,
                newly_scored: true,
            })
        } else {
            debug!(username, %game_id, "win already claimed");
            let score = self.scores.get(username).map(|s| *s.value()).unwrap_or(0);
            Ok(WinClaim {
                score,
                newly_scored: false,
            })
        }
    }

    async fn save_session(&self, username: &str, session: &Session) -> Result<(), DomainError> {
        self.check_available()?;
        self.sessions.insert(username.to_string(), session.clone());
        Ok(())
    }

    async fn load_session(&self, username: &str) -> Result<Session, DomainError> {
        self.check_available()?;
        self.sessions
            .get(username)
            .map(|s| s.value().clone())
            .ok_or_else(|| {
                DomainError::not_found(
                    NotFoundKind::Session,
                    format!("No saved game for '{username}'"),
                )
            })
    }

    async fn scores(&self) -> Result<Vec<LeaderboardEntry>, DomainError> {
        self.check_available()?;
        Ok(self
            .scores
            .iter()
            .map(|entry| LeaderboardEntry::new(entry.key().clone(), *entry.value()))
            .collect())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        self.check_available()
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
