//! Card kinds, deck composition, and shuffling.
//!
//! The deck is a fixed 16-card multiset. Cards carry no per-instance
//! identity; two cards of the same kind are interchangeable.

use rand::seq::SliceRandom;
use rand::Rng;

/// Total cards in a full deck.
pub const DECK_SIZE: usize = 16;

/// The eight card kinds, ordered by power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Card {
    Guard,
    Priest,
    Baron,
    Handmaid,
    Prince,
    King,
    Countess,
    Princess,
}

impl Card {
    /// All kinds in ascending power order.
    pub const ALL: [Card; 8] = [
        Card::Guard,
        Card::Priest,
        Card::Baron,
        Card::Handmaid,
        Card::Prince,
        Card::King,
        Card::Countess,
        Card::Princess,
    ];

    /// Power value, 1-8, strictly increasing with strength.
    pub fn value(self) -> u8 {
        match self {
            Self::Guard => 1,
            Self::Priest => 2,
            Self::Baron => 3,
            Self::Handmaid => 4,
            Self::Prince => 5,
            Self::King => 6,
            Self::Countess => 7,
            Self::Princess => 8,
        }
    }

    /// Copies of this kind in a full deck.
    pub fn copies(self) -> usize {
        match self {
            Self::Guard => 5,
            Self::Priest | Self::Baron | Self::Handmaid | Self::Prince => 2,
            Self::King | Self::Countess | Self::Princess => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Guard => "Guard",
            Self::Priest => "Priest",
            Self::Baron => "Baron",
            Self::Handmaid => "Handmaid",
            Self::Prince => "Prince",
            Self::King => "King",
            Self::Countess => "Countess",
            Self::Princess => "Princess",
        }
    }

    pub fn to_json(self) -> serde_json::Value {
        serde_json::json!({
            "name": self.as_str(),
            "value": self.value()
        })
    }
}

/// Build the full ordered deck (every kind times its copy count).
pub fn build_deck() -> Vec<Card> {
    Card::ALL
        .iter()
        .flat_map(|&card| std::iter::repeat(card).take(card.copies()))
        .collect()
}

/// Build the full deck and shuffle it uniformly.
pub fn shuffled_deck<R: Rng>(rng: &mut R) -> Vec<Card> {
    let mut deck = build_deck();
    deck.shuffle(rng);
    deck
}
