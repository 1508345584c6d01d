//! Card behavior scripts.
//!
//! Card behaviors are a fixed set of data-driven variants rather than
//! open-ended code: a template declares lists of [`CardScript`]s for its
//! play/targeting hooks and event callbacks, and the session interprets
//! them. This keeps every card effect inside the engine's guarded execution
//! scope and makes behavior serializable.

use serde::{Deserialize, Serialize};

use crate::buffs::BuffClass;

/// An atomic card effect, interpreted by the session.
///
/// Scripts run with a source card (the card whose hook fired) and, for
/// targeting hooks, the selected target. A script that expects a target kind
/// it did not receive is a template bug; the session logs it and moves on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardScript {
    /// Permanently raise the source unit's power.
    GainPower { amount: i32 },

    /// Deal damage to the selected unit target. When `bonus_per_buff` is
    /// set, the owner's total board intensity of that buff class is added
    /// to the amount.
    DealDamageToTarget {
        amount: i32,
        bonus_per_buff: Option<BuffClass>,
    },

    /// Apply a buff to the selected unit target.
    AddBuffToTarget { class: BuffClass },

    /// Apply a buff `count` times to every allied unit adjacent to the
    /// source unit.
    AddBuffToAdjacentAllies { class: BuffClass, count: u32 },

    /// Instantiate a token of `class` and deploy it on the owner's front
    /// row, far-right slot.
    SummonToken { class: String },

    /// Play the selected card target out of the owner's unit deck onto the
    /// owner's front row. Re-enters the resolve stack (tutoring).
    SummonTargetFromDeck,

    /// Draw unit cards for the source card's owner.
    DrawUnitCards { count: usize },

    /// Deal morale damage to the owner's opponent.
    DealMoraleDamage { amount: i32 },

    /// Run the inner script only when the condition holds for the source
    /// card's owner.
    Conditional {
        condition: ScriptCondition,
        then: Box<CardScript>,
    },
}

/// Conditions evaluated against the source card's owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptCondition {
    /// Owner's total board power is strictly below the opponent's.
    OwnBoardPowerBelowOpponent,
    /// Owner's morale is strictly below the opponent's.
    OwnMoraleBelowOpponent,
}
