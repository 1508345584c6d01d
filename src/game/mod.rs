//! The session state machine and its surroundings: phases, intents,
//! notifications, and the registry of running games.

mod intent;
mod library;
mod notify;
mod phase;
mod session;

pub use intent::Intent;
pub use library::{GameLibrary, PlayerSeat};
pub use notify::{CardMessage, Notification, OutboundSink};
pub use phase::GameTurnPhase;
pub use session::GameSession;

use serde::{Deserialize, Serialize};

/// Identifier for one running game within the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameId(pub u64);

impl GameId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Game({})", self.0)
    }
}
