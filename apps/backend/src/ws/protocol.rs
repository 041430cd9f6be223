use serde::{Deserialize, Serialize};

use crate::domain::LeaderboardEntry;

pub const PROTOCOL_VERSION: i32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    Hello { protocol: i32 },
    GetLeaderboard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    HelloAck {
        protocol: i32,
    },

    /// Reply to `get_leaderboard`.
    Leaderboard {
        entries: Vec<LeaderboardEntry>,
    },

    /// Pushed after every score change.
    LeaderboardUpdate {
        entries: Vec<LeaderboardEntry>,
    },

    Error {
        code: ErrorCode,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadProtocol,
    BadRequest,
    Unavailable,
}
