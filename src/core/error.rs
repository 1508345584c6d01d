//! Engine error taxonomy.
//!
//! Two very different failure classes flow out of the engine:
//!
//! - [`IntentError`]: a client sent something it is not allowed to do right
//!   now. This is the dominant class, it covers retries and races, and it is
//!   always safe: the session rejects the intent before any mutation.
//! - [`ConsistencyError`]: the server contradicted itself (a unit that is on
//!   no row, a pop on an empty resolve stack). These are logged as faults and
//!   the session keeps operating best-effort; one broken card interaction
//!   must not end the match for both players.

use thiserror::Error;

use super::player::PlayerId;
use crate::cards::CardId;

/// Rejection of an inbound intent. Never unwinds through the resolve stack
/// or the event bus; validation happens at the intent-handling boundary.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IntentError {
    #[error("intent is not legal in the current phase")]
    WrongPhase,

    #[error("card {0} is not in the acting player's hand")]
    CardNotInHand(CardId),

    #[error("unit {0} was not found on the board")]
    UnitNotFound(CardId),

    #[error("{player} does not own the acted-on card")]
    NotOwner { player: PlayerId },

    #[error("not enough mana to play the card")]
    InsufficientMana,

    #[error("row {0} cannot receive the card")]
    IllegalRow(usize),

    #[error("target row {0} is full")]
    RowFull(usize),

    #[error("no resolution is awaiting a target from {player}")]
    NoPendingTarget { player: PlayerId },

    #[error("selected target is not among the valid targets")]
    InvalidTarget,

    #[error("target is out of attack range")]
    OutOfRange,

    #[error("move destination is not legal for the unit")]
    IllegalMove,

    #[error("turn has already been ended")]
    TurnAlreadyEnded,

    #[error("player is already initialized")]
    AlreadyInitialized,
}

/// A server-side fault: the engine's own state disagrees with itself.
///
/// Reported via `tracing::error!` at the detection site; the session
/// continues on a best-effort basis.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConsistencyError {
    #[error("no row contains unit {0}")]
    UnitOnNoRow(CardId),

    #[error("card {0} is not registered with the session")]
    UnknownCard(CardId),

    #[error("resolve stack popped while empty")]
    EmptyStackPop,

    #[error("resolve depth limit reached; refusing to push card {0}")]
    ResolveDepthExceeded(CardId),
}
