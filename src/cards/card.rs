//! Card instances - runtime card state.
//!
//! A `Card` pairs immutable identity (id, class, type) with mutable runtime
//! stats. Every stat has a base value from the template and a derived value
//! that folds in buff contributions; game logic always reads the derived
//! accessors. A card lives in exactly one zone at a time: the session owns
//! all instances in one map while zones (hand, deck, rows, graveyard) hold
//! ids only, so double-placement is unrepresentable.

use serde::{Deserialize, Serialize};

use crate::buffs::{BuffStack, Stat};
use crate::core::PlayerId;

/// Unique identifier for a card instance within one session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Card types a player can play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    /// Placed on the board as a unit.
    Unit,
    /// Resolved directly, then discarded to the graveyard.
    Spell,
}

/// A card instance in a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Unique instance id.
    pub id: CardId,

    /// Template class this card was instantiated from.
    pub class: String,

    /// Unit or spell.
    pub card_type: CardType,

    /// The player who owns this card.
    pub owner: PlayerId,

    /// Spell mana required to play (spells only; zero for units).
    pub spell_cost: u32,

    /// Live modifiers attached to this card.
    pub buffs: BuffStack,

    /// Discard from hand at end of turn if still unplayed (tutored cards).
    pub transient: bool,

    base_power: i32,
    base_attack: i32,
    base_attack_range: u32,
    base_armor: i32,

    /// Current power before buffs; damage subtracts from this.
    power: i32,
}

impl Card {
    /// Create a card instance from template values.
    #[must_use]
    pub fn new(
        id: CardId,
        class: impl Into<String>,
        card_type: CardType,
        owner: PlayerId,
        base_power: i32,
        base_attack: i32,
        base_attack_range: u32,
        base_armor: i32,
    ) -> Self {
        Self {
            id,
            class: class.into(),
            card_type,
            owner,
            spell_cost: 0,
            buffs: BuffStack::new(),
            transient: false,
            base_power,
            base_attack,
            base_attack_range,
            base_armor,
            power: base_power,
        }
    }

    // === Base stats ===

    #[must_use]
    pub fn base_power(&self) -> i32 {
        self.base_power
    }

    #[must_use]
    pub fn base_attack(&self) -> i32 {
        self.base_attack
    }

    #[must_use]
    pub fn base_attack_range(&self) -> u32 {
        self.base_attack_range
    }

    #[must_use]
    pub fn base_armor(&self) -> i32 {
        self.base_armor
    }

    // === Derived (buffed) stats ===

    /// Current power including buff contributions.
    #[must_use]
    pub fn power(&self) -> i32 {
        self.power + self.buffs.stat_bonus(Stat::Power)
    }

    /// Attack value including buff contributions.
    #[must_use]
    pub fn attack(&self) -> i32 {
        self.base_attack + self.buffs.stat_bonus(Stat::Attack)
    }

    /// Attack range including buff contributions. Never below zero.
    #[must_use]
    pub fn attack_range(&self) -> u32 {
        let bonus = self.buffs.stat_bonus(Stat::AttackRange);
        (self.base_attack_range as i32 + bonus).max(0) as u32
    }

    /// Armor value including buff contributions.
    #[must_use]
    pub fn armor(&self) -> i32 {
        self.base_armor + self.buffs.stat_bonus(Stat::Armor)
    }

    // === Mutation ===

    /// Permanently raise (or lower, with a negative amount) current power.
    pub fn add_power(&mut self, amount: i32) {
        self.power += amount;
    }

    /// Subtract damage from current power. Armor absorption is the caller's
    /// concern; this applies the post-armor amount.
    pub fn take_damage(&mut self, amount: i32) {
        self.power -= amount.max(0);
    }
}
