//! Inbound player intents.
//!
//! An intent is a request, not a command: the session validates every field
//! against current state before mutating anything, and a rejected intent
//! leaves the game exactly as it was. The wire layer deserializes into this
//! enum and hands it to [`GameSession::handle_intent`].
//!
//! [`GameSession::handle_intent`]: crate::game::GameSession::handle_intent

use serde::{Deserialize, Serialize};

use crate::cards::CardId;
use crate::resolve::CardTarget;

/// Everything a client can ask the session to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// Announce readiness; the game starts once both players sent this.
    Init,

    /// Play a card from hand. For units, `row_index`/`slot` give the
    /// placement; for spells both are ignored.
    PlayCard {
        card_id: CardId,
        row_index: usize,
        slot: usize,
    },

    /// Answer a pending target request.
    SelectTarget { target: CardTarget },

    /// Give a unit a standing attack order for the next skirmish.
    AttackOrder { unit: CardId, target: CardId },

    /// Give a unit a move order for the next skirmish.
    MoveOrder { unit: CardId, row_index: usize },

    /// Declare the current turn finished.
    EndTurn,
}
