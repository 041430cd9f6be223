pub mod games;
pub mod leaderboard;

pub use games::{EndedGame, GameService, StartedGame};
pub use leaderboard::compute_leaderboard;
