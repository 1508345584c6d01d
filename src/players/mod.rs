//! Per-player state.
//!
//! [`Player`] is the durable identity a connection authenticates as;
//! [`PlayerInGame`] is that identity's runtime state inside one session:
//! mana pools, morale, turn flags, and the three card zones.

mod zones;

pub use zones::{CardDeck, CardHand, Graveyard};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardId, CardType};
use crate::core::{IntentError, PlayerId, Ruleset};

/// Durable player identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub username: String,
}

impl Player {
    #[must_use]
    pub fn new(id: PlayerId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }
}

/// A player's runtime state within one session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerInGame {
    pub player: Player,
    pub hand: CardHand,
    pub deck: CardDeck,
    pub graveyard: Graveyard,

    /// Spent 1 per unit played; refilled each turn.
    pub unit_mana: u32,
    /// Spent per spell's cost; refilled each turn.
    pub spell_mana: u32,
    /// Hits zero, the player loses.
    pub morale: i32,

    /// The player declared they are done with the current deploy turn.
    pub turn_ended: bool,
    /// Set while the player waits for the opponent at a round boundary.
    pub round_ended: bool,
    /// The player sent their init intent and received the opening state.
    pub initialized: bool,
}

impl PlayerInGame {
    #[must_use]
    pub fn new(player: Player) -> Self {
        Self {
            player,
            hand: CardHand::new(),
            deck: CardDeck::new(),
            graveyard: Graveyard::new(),
            unit_mana: 0,
            spell_mana: 0,
            morale: Ruleset::STARTING_MORALE,
            turn_ended: false,
            round_ended: false,
            initialized: false,
        }
    }

    #[must_use]
    pub fn id(&self) -> PlayerId {
        self.player.id
    }

    /// Refill mana and clear the turn flag.
    pub fn start_turn(&mut self) {
        self.unit_mana = Ruleset::UNIT_MANA_PER_TURN;
        self.spell_mana = Ruleset::SPELL_MANA_PER_TURN;
        self.turn_ended = false;
    }

    pub fn end_turn(&mut self) {
        self.turn_ended = true;
    }

    /// Whether the player can pay for the card right now.
    #[must_use]
    pub fn can_afford(&self, card: &Card) -> bool {
        match card.card_type {
            CardType::Unit => self.unit_mana >= 1,
            CardType::Spell => self.spell_mana >= card.spell_cost,
        }
    }

    /// Deduct the card's cost from the matching mana pool.
    pub fn pay_for(&mut self, card: &Card) -> Result<(), IntentError> {
        if !self.can_afford(card) {
            return Err(IntentError::InsufficientMana);
        }
        match card.card_type {
            CardType::Unit => self.unit_mana -= 1,
            CardType::Spell => self.spell_mana -= card.spell_cost,
        }
        Ok(())
    }

    pub fn take_morale_damage(&mut self, amount: i32) {
        self.morale -= amount.max(0);
    }

    #[must_use]
    pub fn is_defeated(&self) -> bool {
        self.morale <= 0
    }

    /// Whether any spell in hand is currently affordable.
    #[must_use]
    pub fn has_playable_spell(&self, cards: &FxHashMap<CardId, Card>) -> bool {
        self.hand
            .spell_cards()
            .filter_map(|id| cards.get(&id))
            .any(|card| self.spell_mana >= card.spell_cost)
    }

    /// Whether the player's deploy turn is over, either declared or because
    /// no play remains. Recomputed live, so spending the last unit mana
    /// ends the turn without an explicit intent.
    #[must_use]
    pub fn deploy_finished(&self, cards: &FxHashMap<CardId, Card>) -> bool {
        if self.turn_ended {
            return true;
        }
        let can_play_unit = self.unit_mana > 0 && self.hand.unit_count() > 0;
        !can_play_unit && !self.has_playable_spell(cards)
    }
}
