//! Domain layer: pure game logic types and helpers.

pub mod cards;
pub mod deck;
pub mod leaderboard;
pub mod session;
pub mod username;


// Re-exports for ergonomics
pub use cards::Card;
pub use deck::{new_deck, new_deck_with, DECK_CARDS};
pub use leaderboard::{rank, LeaderboardEntry};
pub use session::{Session, SessionStatus};
pub use username::validate_username;
