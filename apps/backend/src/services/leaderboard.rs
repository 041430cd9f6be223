use crate::domain::{rank, LeaderboardEntry};
use crate::errors::domain::DomainError;
use crate::store::SessionStore;

/// Every known score, ranked. Store failures propagate; an unreachable store
/// never yields an empty leaderboard.
pub async fn compute_leaderboard(
    store: &dyn SessionStore,
) -> Result<Vec<LeaderboardEntry>, DomainError> {
    Ok(rank(store.scores().await?))
}
