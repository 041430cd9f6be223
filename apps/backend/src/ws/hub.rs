//! Registry of connected leaderboard observers on this instance.

use std::sync::Arc;

use actix::prelude::*;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::domain::LeaderboardEntry;

/// Full ranked snapshot pushed to observers. Shared so a fan-out to many
/// sockets clones a pointer, not the list.
#[derive(Message, Clone, Debug)]
#[rtype(result = "()")]
pub struct LeaderboardBroadcast {
    pub entries: Arc<Vec<LeaderboardEntry>>,
    /// Sum of all scores. Scores only ever grow, so a snapshot with a lower
    /// version was computed before one with a higher version, on any instance.
    pub version: i64,
}

impl LeaderboardBroadcast {
    pub fn new(entries: Vec<LeaderboardEntry>) -> Self {
        let version = snapshot_version(&entries);
        Self {
            entries: Arc::new(entries),
            version,
        }
    }
}

pub fn snapshot_version(entries: &[LeaderboardEntry]) -> i64 {
    entries.iter().map(|e| e.score).sum()
}

/// Per-observer filter that drops snapshots older than one already sent.
#[derive(Debug, Default, Clone, Copy)]
pub struct SnapshotGate {
    latest: Option<i64>,
}

impl SnapshotGate {
    /// Record `version` and return whether it is at least as new as anything
    /// seen before.
    pub fn admit(&mut self, version: i64) -> bool {
        match self.latest {
            Some(latest) if version < latest => false,
            _ => {
                self.latest = Some(version);
                true
            }
        }
    }
}

/// What happened to one broadcast.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    /// Mailbox full; this observer misses this snapshot.
    pub dropped: usize,
    /// Actor gone; the observer was removed.
    pub closed: usize,
}

#[derive(Default)]
pub struct ObserverRegistry {
    observers: DashMap<Uuid, Recipient<LeaderboardBroadcast>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, conn_id: Uuid, recipient: Recipient<LeaderboardBroadcast>) {
        self.observers.insert(conn_id, recipient);
        debug!(%conn_id, observers = self.observers.len(), "observer registered");
    }

    pub fn unregister(&self, conn_id: Uuid) {
        if self.observers.remove(&conn_id).is_some() {
            debug!(%conn_id, observers = self.observers.len(), "observer unregistered");
        }
    }

    pub fn connection_count(&self) -> usize {
        self.observers.len()
    }

    /// Offer `message` to every observer without waiting on any of them.
    pub fn broadcast(&self, message: LeaderboardBroadcast) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        let mut gone = Vec::new();

        for observer in self.observers.iter() {
            match observer.value().try_send(message.clone()) {
                Ok(()) => report.delivered += 1,
                Err(SendError::Full(_)) => report.dropped += 1,
                Err(SendError::Closed(_)) => gone.push(*observer.key()),
            }
        }

        // Removal happens after the iteration releases its shard guards.
        report.closed = gone.len();
        for conn_id in gone {
            self.observers.remove(&conn_id);
        }

        if report.dropped > 0 || report.closed > 0 {
            debug!(
                delivered = report.delivered,
                dropped = report.dropped,
                closed = report.closed,
                "leaderboard broadcast incomplete"
            );
        }
        report
    }
}
