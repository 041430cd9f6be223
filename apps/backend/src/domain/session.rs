//! Per-user game session and its draw rules.
//!
//! The top of the deck is the last element of `deck`; draws pop from the end.
//! The persisted JSON layout (camelCase field names) is shared with saved
//! games from older clients, which is why `defuseCards` is accepted as an alias.

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::deck::{is_valid_composition, new_deck_with};
use crate::domain::Card;
use crate::errors::domain::{DomainError, ValidationKind};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    InProgress,
    Won,
    Lost,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::InProgress)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub username: String,
    pub deck: Vec<Card>,
    pub drawn_card: Option<Card>,
    #[serde(alias = "defuseCards")]
    pub defuse_count: u32,
    pub game_over: bool,
    pub game_won: bool,
    /// Minted when the server starts a game; wins are credited per game id.
    #[serde(default)]
    pub game_id: Option<Uuid>,
    /// Set once this game's win has been added to the score.
    #[serde(default)]
    pub scored: bool,
}

impl Session {
    pub fn new(username: impl Into<String>, deck: Vec<Card>, game_id: Uuid) -> Self {
        Self {
            username: username.into(),
            deck,
            drawn_card: None,
            defuse_count: 0,
            game_over: false,
            game_won: false,
            game_id: Some(game_id),
            scored: false,
        }
    }

    /// A new in-progress game with a freshly shuffled deck.
    pub fn start_with<R: Rng + ?Sized>(username: impl Into<String>, rng: &mut R) -> Self {
        Self::new(username, new_deck_with(rng), Uuid::new_v4())
    }

    pub fn start(username: impl Into<String>) -> Self {
        Self::start_with(username, &mut rand::rng())
    }

    pub fn status(&self) -> SessionStatus {
        match (self.game_over, self.game_won) {
            (_, true) => SessionStatus::Won,
            (true, false) => SessionStatus::Lost,
            (false, false) => SessionStatus::InProgress,
        }
    }

    pub fn draw(&mut self) -> Result<Card, DomainError> {
        self.draw_with(&mut rand::rng())
    }

    /// Draw the top card and apply its effect. `rng` is only consulted when
    /// a Shuffle empties the deck and a new one has to be dealt.
    ///
    /// Rejected with `InvalidTransition` (and no state change) once the game
    /// is over.
    pub fn draw_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Card, DomainError> {
        if self.status().is_terminal() {
            return Err(DomainError::invalid_transition(format!(
                "Game for '{}' is already over",
                self.username
            )));
        }
        let Some(card) = self.deck.pop() else {
            return Err(DomainError::invalid_transition(format!(
                "Deck for '{}' is empty",
                self.username
            )));
        };
        self.drawn_card = Some(card);

        match card {
            Card::Cat => {}
            Card::Defuse => self.defuse_count = self.defuse_count.saturating_add(1),
            Card::Shuffle => {
                if self.deck.is_empty() {
                    self.deck = new_deck_with(rng);
                    self.defuse_count = 0;
                }
            }
            Card::ExplodingKitten => {
                if self.defuse_count > 0 {
                    self.defuse_count -= 1;
                } else {
                    self.game_over = true;
                    self.game_won = false;
                }
            }
        }

        if self.deck.is_empty() && !self.game_over {
            self.game_over = true;
            self.game_won = true;
        }

        Ok(card)
    }

    /// Abandon an in-progress game as a loss. Finished games are untouched.
    pub fn forfeit(&mut self) -> bool {
        if self.status().is_terminal() {
            return false;
        }
        self.game_over = true;
        self.game_won = false;
        true
    }

    /// True when drawing from `earlier` reaches exactly this state, ignoring
    /// `scored`. A reshuffle deals a deck only the server has seen, so states
    /// past one never follow from a client copy.
    pub fn follows_from(&self, earlier: &Session) -> bool {
        let mut replay = earlier.clone();
        replay.scored = self.scored;
        loop {
            if replay == *self {
                return true;
            }
            if replay.status().is_terminal()
                || replay.deck.len() <= self.deck.len()
                || replay.deck == [Card::Shuffle]
            {
                return false;
            }
            if replay.draw_with(&mut rand::rng()).is_err() {
                return false;
            }
        }
    }

    /// Structural checks for a session supplied by a client.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !is_valid_composition(&self.deck) {
            return Err(DomainError::validation(
                ValidationKind::InvalidDeck,
                "Deck contains cards outside the standard set",
            ));
        }
        // One Defuse per deck, and a reshuffle clears the count.
        let defuses_left = self.deck.iter().filter(|c| **c == Card::Defuse).count() as u32;
        if self.defuse_count > 1 || self.defuse_count.saturating_add(defuses_left) > 1 {
            return Err(DomainError::validation(
                ValidationKind::InconsistentSession,
                "More defuses than the deck holds",
            ));
        }
        if self.game_won && !self.game_over {
            return Err(DomainError::validation(
                ValidationKind::InconsistentSession,
                "A won game must be over",
            ));
        }
        if self.game_won && !self.deck.is_empty() {
            return Err(DomainError::validation(
                ValidationKind::InconsistentSession,
                "A won game cannot have cards left",
            ));
        }
        if !self.game_over && self.deck.is_empty() {
            return Err(DomainError::validation(
                ValidationKind::InconsistentSession,
                "An unfinished game must have cards left",
            ));
        }
        Ok(())
    }
}
