//! The four card kinds in play.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::domain::{DomainError, ValidationKind};

/// Serialized as the literal variant name (`"Cat"`, `"Defuse"`, `"Shuffle"`,
/// `"ExplodingKitten"`); saved games depend on these strings.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Card {
    Cat,
    Defuse,
    Shuffle,
    ExplodingKitten,
}

impl Card {
    pub const ALL: [Card; 4] = [Card::Cat, Card::Defuse, Card::Shuffle, Card::ExplodingKitten];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Card::Cat => "Cat",
            Card::Defuse => "Defuse",
            Card::Shuffle => "Shuffle",
            Card::ExplodingKitten => "ExplodingKitten",
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Card {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Card::ALL
            .into_iter()
            .find(|card| card.as_str() == s)
            .ok_or_else(|| {
                DomainError::validation(ValidationKind::InvalidDeck, format!("Parse card: {s}"))
            })
    }
}
