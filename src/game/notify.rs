//! Outbound notifications and hidden-information redaction.
//!
//! The session is the sole source of truth a client ever sees: every state
//! change is narrated as a [`Notification`] addressed to a specific player.
//! Cards in hidden zones cross the wire as [`CardMessage::Hidden`] so a
//! client never receives information its player should not have, no matter
//! how it is modified.

use serde::{Deserialize, Serialize};

use crate::board::UnitOrder;
use crate::buffs::BuffClass;
use crate::cards::{Card, CardId, CardType};
use crate::core::PlayerId;
use crate::game::GameTurnPhase;
use crate::resolve::CardTarget;

/// A card as seen over the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardMessage {
    /// Everything about the card. Sent for public cards and to the owner.
    Full {
        id: CardId,
        class: String,
        card_type: CardType,
        owner: PlayerId,
        power: i32,
        attack: i32,
        attack_range: u32,
        armor: i32,
        spell_cost: u32,
    },
    /// Existence only. Sent to the opponent for cards in hidden zones.
    Hidden { id: CardId, owner: PlayerId },
}

impl CardMessage {
    /// The unredacted view of a card.
    #[must_use]
    pub fn full(card: &Card) -> Self {
        CardMessage::Full {
            id: card.id,
            class: card.class.clone(),
            card_type: card.card_type,
            owner: card.owner,
            power: card.power(),
            attack: card.attack(),
            attack_range: card.attack_range(),
            armor: card.armor(),
            spell_cost: card.spell_cost,
        }
    }

    /// The redacted view of a card.
    #[must_use]
    pub fn hidden(card: &Card) -> Self {
        CardMessage::Hidden {
            id: card.id,
            owner: card.owner,
        }
    }

    /// Full for the owner, hidden for anyone else.
    #[must_use]
    pub fn for_viewer(card: &Card, viewer: PlayerId) -> Self {
        if card.owner == viewer {
            Self::full(card)
        } else {
            Self::hidden(card)
        }
    }
}

/// One state delta addressed to one player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Notification {
    GameStarted { opponent: String },
    PhaseChanged { phase: GameTurnPhase },
    RoundStarted { round: u32 },
    TurnStarted { player: PlayerId },
    TurnEnded { player: PlayerId },

    CardDrawn { player: PlayerId, card: CardMessage },
    /// A card left a hidden zone and became public.
    CardPlayed { player: PlayerId, card: CardMessage },
    /// A card finished resolving and went to the graveyard.
    CardResolved { card_id: CardId },
    CardDiscarded { player: PlayerId, card_id: CardId },

    UnitCreated { card: CardMessage, row_index: usize, slot: usize },
    UnitDestroyed { card_id: CardId },
    UnitMoved { card_id: CardId, row_index: usize, slot: usize },
    UnitOrderSet { card_id: CardId, order: UnitOrder },

    /// The addressed player must answer with a `SelectTarget` intent.
    TargetsRequested { card_id: CardId, valid_targets: Vec<CardTarget> },

    ManaChanged { player: PlayerId, unit_mana: u32, spell_mana: u32 },
    MoraleChanged { player: PlayerId, morale: i32 },
    PowerChanged { card_id: CardId, power: i32 },
    BuffAdded { card_id: CardId, class: BuffClass },

    GameOver { winner: Option<PlayerId> },
}

/// Where drained notifications go. The network layer implements this over
/// its connection registry; tests implement it over a `Vec`.
pub trait OutboundSink {
    fn send(&mut self, player: PlayerId, notification: &Notification);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> Card {
        let mut card = Card::new(
            CardId::new(4),
            "spellShadowSpark",
            CardType::Spell,
            PlayerId::new(1),
            0,
            0,
            0,
            0,
        );
        card.spell_cost = 2;
        card
    }

    #[test]
    fn test_for_viewer_redacts_for_opponent() {
        let card = card();

        match CardMessage::for_viewer(&card, PlayerId::new(1)) {
            CardMessage::Full { class, spell_cost, .. } => {
                assert_eq!(class, "spellShadowSpark");
                assert_eq!(spell_cost, 2);
            }
            CardMessage::Hidden { .. } => panic!("owner view must be full"),
        }

        match CardMessage::for_viewer(&card, PlayerId::new(0)) {
            CardMessage::Hidden { id, owner } => {
                assert_eq!(id, CardId::new(4));
                assert_eq!(owner, PlayerId::new(1));
            }
            CardMessage::Full { .. } => panic!("opponent view must be hidden"),
        }
    }
}
