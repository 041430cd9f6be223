//! Redis-backed store.
//!
//! Key layout:
//! - `user:{username}`      integer score
//! - `gameState:{username}` JSON-encoded [`Session`]
//! - `scored:{username}:{game_id}` marker set when a win was credited
//! - `leaderboard`          sorted set of usernames by score
//!
//! The sorted set is a secondary index kept in step with every score write
//! (inside the same Lua script), so reading the leaderboard never needs a
//! `KEYS user:*` scan. [`RedisStore::rebuild_index`] backfills it for score
//! keys written by older deployments.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, RedisError, Script};
use tokio::time::timeout;
use tracing::{info, warn};
use uuid::Uuid;

use super::{SessionStore, WinClaim};
use crate::domain::{LeaderboardEntry, Session};
use crate::error::AppError;
use crate::errors::domain::{DomainError, InfraErrorKind, NotFoundKind};

const LEADERBOARD_KEY: &str = "leaderboard";
const SCAN_BATCH: usize = 200;

const CREATE_IF_ABSENT_LUA: &str = r"
redis.call('SETNX', KEYS[1], 0)
local score = tonumber(redis.call('GET', KEYS[1]))
redis.call('ZADD', KEYS[2], 'NX', score, ARGV[1])
return score
";

const INCREMENT_LUA: &str = r"
local score = redis.call('INCR', KEYS[1])
redis.call('ZADD', KEYS[2], score, ARGV[1])
return score
";

const CLAIM_WIN_LUA: &str = r"
if redis.call('SET', KEYS[3], 1, 'NX') then
  local score = redis.call('INCR', KEYS[1])
  redis.call('ZADD', KEYS[2], score, ARGV[1])
  return {1, score}
end
return {0, tonumber(redis.call('GET', KEYS[1]) or 0)}
";

pub fn score_key(username: &str) -> String {
    format!("user:{username}")
}

pub fn session_key(username: &str) -> String {
    format!("gameState:{username}")
}

pub fn claim_key(username: &str, game_id: Uuid) -> String {
    format!("scored:{username}:{game_id}")
}

/// Inverse of [`score_key`]; splits on the first colon only so usernames
/// may themselves contain colons.
pub fn username_from_score_key(key: &str) -> Option<&str> {
    key.strip_prefix("user:").filter(|name| !name.is_empty())
}

pub struct RedisStore {
    conn: ConnectionManager,
    op_timeout: Duration,
    create_if_absent: Script,
    increment: Script,
    claim_win: Script,
}

impl RedisStore {
    pub async fn connect(redis_url: &str, op_timeout: Duration) -> Result<Self, AppError> {
        let client = Client::open(redis_url)
            .map_err(|err| AppError::config(format!("Invalid REDIS_URL: {err}")))?;

        let conn = timeout(op_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| AppError::config("Timed out connecting to Redis".to_string()))?
            .map_err(|err| AppError::config(format!("Unable to connect to Redis: {err}")))?;

        info!("Connected to Redis session store");

        Ok(Self {
            conn,
            op_timeout,
            create_if_absent: Script::new(CREATE_IF_ABSENT_LUA),
            increment: Script::new(INCREMENT_LUA),
            claim_win: Script::new(CLAIM_WIN_LUA),
        })
    }

    /// Run one Redis round trip under the configured timeout.
    async fn run<T, F>(&self, op: &'static str, fut: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, RedisError>>,
    {
        match timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                warn!(op, error = %err, "redis operation failed");
                Err(DomainError::store_unavailable(format!("Redis {op} failed: {err}")))
            }
            Err(_) => {
                warn!(op, timeout_ms = self.op_timeout.as_millis() as u64, "redis operation timed out");
                Err(DomainError::infra(
                    InfraErrorKind::Timeout,
                    format!("Redis {op} timed out"),
                ))
            }
        }
    }

    /// Add every `user:*` score key to the leaderboard index. Idempotent;
    /// called once at startup.
    pub async fn rebuild_index(&self) -> Result<usize, DomainError> {
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut indexed = 0usize;

        loop {
            let (next, keys): (u64, Vec<String>) = self
                .run(
                    "SCAN",
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg("user:*")
                        .arg("COUNT")
                        .arg(SCAN_BATCH)
                        .query_async(&mut conn),
                )
                .await?;

            for key in &keys {
                let Some(username) = username_from_score_key(key) else {
                    continue;
                };
                let score: Option<i64> = self
                    .run("GET", redis::cmd("GET").arg(key).query_async(&mut conn))
                    .await?;
                if let Some(score) = score {
                    let _: i64 = self
                        .run(
                            "ZADD",
                            redis::cmd("ZADD")
                                .arg(LEADERBOARD_KEY)
                                .arg(score)
                                .arg(username)
                                .query_async(&mut conn),
                        )
                        .await?;
                    indexed += 1;
                }
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        info!(indexed, "leaderboard index rebuilt");
        Ok(indexed)
    }
}

#[async_trait]
impl SessionStore for RedisStore {
    async fn create_if_absent(&self, username: &str) -> Result<i64, DomainError> {
        let mut conn = self.conn.clone();
        self.run(
            "create_if_absent",
            self.create_if_absent
                .key(score_key(username))
                .key(LEADERBOARD_KEY)
                .arg(username)
                .invoke_async(&mut conn),
        )
        .await
    }

    async fn get_score(&self, username: &str) -> Result<i64, DomainError> {
        let mut conn = self.conn.clone();
        let score: Option<i64> = self
            .run(
                "GET",
                redis::cmd("GET").arg(score_key(username)).query_async(&mut conn),
            )
            .await?;
        score.ok_or_else(|| {
            DomainError::not_found(NotFoundKind::User, format!("Unknown user '{username}'"))
        })
    }

    async fn increment_score(&self, username: &str) -> Result<i64, DomainError> {
        let mut conn = self.conn.clone();
        self.run(
            "increment_score",
            self.increment
                .key(score_key(username))
                .key(LEADERBOARD_KEY)
                .arg(username)
                .invoke_async(&mut conn),
        )
        .await
    }

    async fn claim_win(&self, username: &str, game_id: Uuid) -> Result<WinClaim, DomainError> {
        let mut conn = self.conn.clone();
        let (claimed, score): (i64, i64) = self
            .run(
                "claim_win",
                self.claim_win
                    .key(score_key(username))
                    .key(LEADERBOARD_KEY)
                    .key(claim_key(username, game_id))
                    .arg(username)
                    .invoke_async(&mut conn),
            )
            .await?;
        Ok(WinClaim {
            score,
            newly_scored: claimed == 1,
        })
    }

    async fn save_session(&self, username: &str, session: &Session) -> Result<(), DomainError> {
        let encoded = serde_json::to_string(session).map_err(|err| {
            DomainError::infra(
                InfraErrorKind::Other("encode".into()),
                format!("Failed to encode session: {err}"),
            )
        })?;
        let mut conn = self.conn.clone();
        let _: () = self
            .run(
                "SET",
                redis::cmd("SET")
                    .arg(session_key(username))
                    .arg(encoded)
                    .query_async(&mut conn),
            )
            .await?;
        Ok(())
    }

    async fn load_session(&self, username: &str) -> Result<Session, DomainError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = self
            .run(
                "GET",
                redis::cmd("GET")
                    .arg(session_key(username))
                    .query_async(&mut conn),
            )
            .await?;
        let raw = raw.ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Session,
                format!("No saved game for '{username}'"),
            )
        })?;
        serde_json::from_str(&raw).map_err(|err| {
            DomainError::infra(
                InfraErrorKind::DataCorruption,
                format!("Saved game for '{username}' is unreadable: {err}"),
            )
        })
    }

    async fn scores(&self) -> Result<Vec<LeaderboardEntry>, DomainError> {
        let mut conn = self.conn.clone();
        let usernames: Vec<String> = self
            .run(
                "ZRANGE",
                redis::cmd("ZRANGE")
                    .arg(LEADERBOARD_KEY)
                    .arg(0)
                    .arg(-1)
                    .query_async(&mut conn),
            )
            .await?;
        if usernames.is_empty() {
            return Ok(Vec::new());
        }

        // Scores come from the authoritative counters, not the index.
        let keys: Vec<String> = usernames.iter().map(|u| score_key(u)).collect();
        let values: Vec<Option<i64>> = self
            .run("MGET", redis::cmd("MGET").arg(&keys).query_async(&mut conn))
            .await?;

        Ok(usernames
            .into_iter()
            .zip(values)
            .filter_map(|(username, score)| score.map(|s| LeaderboardEntry::new(username, s)))
            .collect())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();
        let _: String = self
            .run("PING", redis::cmd("PING").query_async(&mut conn))
            .await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
