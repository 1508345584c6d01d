//! The session's phase machine.

use serde::{Deserialize, Serialize};

/// Top-level phase of a session. Both players act within the same phase;
/// there is no alternating priority.
///
/// ```text
/// BeforeGame -> Deploy <-> Skirmish
///                  \          \
///                   +-> GameOver <-+
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameTurnPhase {
    /// Waiting for both players to initialize.
    BeforeGame,
    /// Players spend mana playing cards from hand.
    Deploy,
    /// Players queue unit orders; orders execute when both are done.
    Skirmish,
    /// A player's morale reached zero. Terminal.
    GameOver,
}

impl GameTurnPhase {
    /// Whether the session still accepts gameplay intents.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, GameTurnPhase::Deploy | GameTurnPhase::Skirmish)
    }
}
