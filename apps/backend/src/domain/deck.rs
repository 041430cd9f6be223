//! Deck generation and shuffling.

use rand::Rng;

use crate::domain::Card;

/// Cards in every fresh deck. Order here is irrelevant; decks are always
/// shuffled before use.
pub const DECK_CARDS: [Card; 5] = [
    Card::Cat,
    Card::Cat,
    Card::Defuse,
    Card::Shuffle,
    Card::ExplodingKitten,
];

/// Fisher-Yates shuffle. Every permutation is equally likely for an
/// unbiased `rng`; `random_range` uses rejection sampling internally.
pub fn shuffle_with<R: Rng + ?Sized>(cards: &mut [Card], rng: &mut R) {
    for i in (1..cards.len()).rev() {
        let j = rng.random_range(0..=i);
        cards.swap(i, j);
    }
}

/// A freshly shuffled deck drawn from `rng`.
pub fn new_deck_with<R: Rng + ?Sized>(rng: &mut R) -> Vec<Card> {
    let mut deck = DECK_CARDS.to_vec();
    shuffle_with(&mut deck, rng);
    deck
}

/// A freshly shuffled deck using the thread-local RNG.
pub fn new_deck() -> Vec<Card> {
    new_deck_with(&mut rand::rng())
}

/// True when `cards` could be what is left of a fresh deck, i.e. it is a
/// sub-multiset of [`DECK_CARDS`].
pub fn is_valid_composition(cards: &[Card]) -> bool {
    Card::ALL.into_iter().all(|kind| {
        let have = cards.iter().filter(|c| **c == kind).count();
        let allowed = DECK_CARDS.iter().filter(|c| **c == kind).count();
        have <= allowed
    })
}
