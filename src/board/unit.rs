//! On-board unit state.

use serde::{Deserialize, Serialize};

use crate::cards::CardId;
use crate::core::PlayerId;

/// A persistent order a unit carries into the skirmish phase. Orders queue
/// during deploy and execute when the skirmish ends; an attack order against
/// a unit that has since died is silently dropped at execution time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitOrder {
    /// Strike the target unit with this unit's attack.
    Attack { target: CardId },
    /// Relocate to the given row, same slot (clamped to the row's width).
    Move { row_index: usize },
}

/// A unit's board presence. Stats live on the owning [`Card`]; this is the
/// positional shell the rows hold.
///
/// [`Card`]: crate::cards::Card
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub card_id: CardId,
    pub owner: PlayerId,

    /// The standing order for the next skirmish, if any. A new order
    /// replaces the old one.
    pub order: Option<UnitOrder>,
}

impl Unit {
    #[must_use]
    pub fn new(card_id: CardId, owner: PlayerId) -> Self {
        Self {
            card_id,
            owner,
            order: None,
        }
    }
}
