//! Core types shared by every engine component.

mod error;
mod player;
mod rng;
mod ruleset;

pub use error::{ConsistencyError, IntentError};
pub use player::{PlayerId, PlayerPair};
pub use rng::GameRng;
pub use ruleset::Ruleset;
