//! # duelcore
//!
//! Authoritative game-state engine for a two-player, turn-based collectible
//! card game played over a persistent connection. The server owns all game
//! truth; clients are untrusted renderers that submit intents and receive
//! state deltas.
//!
//! ## Architecture
//!
//! - **Single-threaded sessions**: all intents for a session are processed
//!   strictly sequentially, which lets the resolve stack and event bus stay
//!   synchronous and re-entrant without locks. Independent sessions share no
//!   mutable state.
//! - **Suspension without blocking**: a card that needs player-chosen targets
//!   suspends its resolve-stack entry as persisted state; the session returns
//!   to its caller and resumes when a matching `select-target` intent arrives.
//! - **Explicit services**: the card library and game library are constructed
//!   once at process start and threaded through constructors, never accessed
//!   as ambient globals.
//!
//! ## Modules
//!
//! - `core`: player IDs, deterministic RNG, ruleset constants, error taxonomy
//! - `cards`: card instances, templates, data-driven behavior scripts
//! - `buffs`: timed stat modifiers with per-class stacking policies
//! - `board`: row grid, unit lifecycle, perspective-aware geometry
//! - `events`: per-session publish/subscribe bus for card callbacks
//! - `resolve`: the re-entrant card resolution stack and targeting model
//! - `players`: per-player runtime state (mana, morale, hand/deck/graveyard)
//! - `game`: the session state machine, intents, notifications, game library

pub mod core;
pub mod cards;
pub mod buffs;
pub mod board;
pub mod events;
pub mod resolve;
pub mod players;
pub mod game;

// Re-export commonly used types
pub use crate::core::{ConsistencyError, GameRng, IntentError, PlayerId, PlayerPair, Ruleset};

pub use crate::cards::{
    CallbackDefinition, Card, CardDefinition, CardId, CardLibrary, CardScript, CardType,
    ScriptCondition,
};

pub use crate::buffs::{Buff, BuffClass, BuffDuration, BuffStack, BuffStackType, Stat};

pub use crate::board::{Board, BoardRow, MoveDirection, Perspective, Unit, UnitOrder};

pub use crate::events::{
    CallbackCondition, CardLocation, EventBus, EventCallback, GameEvent, GameEventKind,
};

pub use crate::resolve::{
    CardTarget, ResolveStack, ResolveStackEntry, TargetConstraint, TargetDefinition, TargetRule,
    TargetType,
};

pub use crate::players::{CardDeck, CardHand, Graveyard, Player, PlayerInGame};

pub use crate::game::{
    CardMessage, GameId, GameLibrary, GameSession, GameTurnPhase, Intent, Notification,
    OutboundSink, PlayerSeat,
};
