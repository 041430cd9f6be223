//! Leaderboard entries and ranking.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub score: i64,
}

impl LeaderboardEntry {
    pub fn new(username: impl Into<String>, score: i64) -> Self {
        Self {
            username: username.into(),
            score,
        }
    }
}

/// Score descending, then username ascending so equal scores have one
/// stable order regardless of how the store enumerated them.
pub fn rank_order(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.username.cmp(&b.username))
}

pub fn rank(mut entries: Vec<LeaderboardEntry>) -> Vec<LeaderboardEntry> {
    entries.sort_by(rank_order);
    entries
}
