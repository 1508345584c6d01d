//! Card zones owned by one player: hand, deck, graveyard.
//!
//! Zones hold card ids only; the session's card map owns the instances.
//! Hands and decks keep unit and spell cards in separate piles because the
//! rules draw and refill them independently.

use serde::{Deserialize, Serialize};

use crate::cards::{CardId, CardType};
use crate::core::{GameRng, Ruleset};

/// A player's hand, split by card type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardHand {
    unit_cards: Vec<CardId>,
    spell_cards: Vec<CardId>,
}

impl CardHand {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a card to the matching pile.
    pub fn add(&mut self, card_type: CardType, card_id: CardId) {
        match card_type {
            CardType::Unit => self.unit_cards.push(card_id),
            CardType::Spell => self.spell_cards.push(card_id),
        }
    }

    /// Remove a card from whichever pile holds it. Returns whether it was
    /// present.
    pub fn remove(&mut self, card_id: CardId) -> bool {
        if let Some(pos) = self.unit_cards.iter().position(|&id| id == card_id) {
            self.unit_cards.remove(pos);
            return true;
        }
        if let Some(pos) = self.spell_cards.iter().position(|&id| id == card_id) {
            self.spell_cards.remove(pos);
            return true;
        }
        false
    }

    #[must_use]
    pub fn contains(&self, card_id: CardId) -> bool {
        self.unit_cards.contains(&card_id) || self.spell_cards.contains(&card_id)
    }

    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.unit_cards.len()
    }

    #[must_use]
    pub fn spell_count(&self) -> usize {
        self.spell_cards.len()
    }

    /// Whether drawing another unit card would exceed the hand limit.
    #[must_use]
    pub fn unit_hand_full(&self) -> bool {
        self.unit_cards.len() >= Ruleset::UNIT_HAND_SIZE_LIMIT
    }

    /// Unit cards in draw order.
    pub fn unit_cards(&self) -> impl Iterator<Item = CardId> + '_ {
        self.unit_cards.iter().copied()
    }

    /// Spell cards in draw order.
    pub fn spell_cards(&self) -> impl Iterator<Item = CardId> + '_ {
        self.spell_cards.iter().copied()
    }

    /// All cards, units first.
    pub fn all_cards(&self) -> impl Iterator<Item = CardId> + '_ {
        self.unit_cards.iter().chain(self.spell_cards.iter()).copied()
    }
}

/// A player's deck, split by card type. Draws come off the back so a shuffle
/// followed by draws behaves like dealing from a face-down pile.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDeck {
    unit_cards: Vec<CardId>,
    spell_cards: Vec<CardId>,
}

impl CardDeck {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, card_type: CardType, card_id: CardId) {
        match card_type {
            CardType::Unit => self.unit_cards.push(card_id),
            CardType::Spell => self.spell_cards.push(card_id),
        }
    }

    /// Shuffle both piles.
    pub fn shuffle(&mut self, rng: &mut GameRng) {
        rng.shuffle(&mut self.unit_cards);
        rng.shuffle(&mut self.spell_cards);
    }

    /// Draw the top unit card.
    pub fn draw_unit(&mut self) -> Option<CardId> {
        self.unit_cards.pop()
    }

    /// Draw the top spell card.
    pub fn draw_spell(&mut self) -> Option<CardId> {
        self.spell_cards.pop()
    }

    /// Pull a specific card out of the deck (tutoring). Returns whether it
    /// was present.
    pub fn remove(&mut self, card_id: CardId) -> bool {
        if let Some(pos) = self.unit_cards.iter().position(|&id| id == card_id) {
            self.unit_cards.remove(pos);
            return true;
        }
        if let Some(pos) = self.spell_cards.iter().position(|&id| id == card_id) {
            self.spell_cards.remove(pos);
            return true;
        }
        false
    }

    #[must_use]
    pub fn contains_unit(&self, card_id: CardId) -> bool {
        self.unit_cards.contains(&card_id)
    }

    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.unit_cards.len()
    }

    #[must_use]
    pub fn spell_count(&self) -> usize {
        self.spell_cards.len()
    }

    /// Unit cards remaining, top of the pile last.
    pub fn unit_cards(&self) -> impl Iterator<Item = CardId> + '_ {
        self.unit_cards.iter().copied()
    }

    /// All cards remaining in the deck.
    pub fn all_cards(&self) -> impl Iterator<Item = CardId> + '_ {
        self.unit_cards.iter().chain(self.spell_cards.iter()).copied()
    }
}

/// Discard pile. Insertion-ordered, never shuffled.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graveyard {
    cards: Vec<CardId>,
}

impl Graveyard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, card_id: CardId) {
        self.cards.push(card_id);
    }

    #[must_use]
    pub fn contains(&self, card_id: CardId) -> bool {
        self.cards.contains(&card_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = CardId> + '_ {
        self.cards.iter().copied()
    }
}
