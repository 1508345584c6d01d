//! The process-wide registry of running games.
//!
//! Constructed once at startup and threaded through explicitly; never a
//! global. The wire layer resolves a connection to a [`PlayerSeat`] and
//! routes intents through here.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cards::CardLibrary;
use crate::core::PlayerId;
use crate::game::{GameId, GameSession};

/// A connection's seat in a specific game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSeat {
    pub game: GameId,
    pub player: PlayerId,
}

/// Owns every live [`GameSession`] in the process.
pub struct GameLibrary {
    card_library: CardLibrary,
    games: FxHashMap<GameId, GameSession>,
    next_game_id: u64,
}

impl GameLibrary {
    #[must_use]
    pub fn new(card_library: CardLibrary) -> Self {
        Self {
            card_library,
            games: FxHashMap::default(),
            next_game_id: 0,
        }
    }

    /// Create a session and hand back the two seats.
    pub fn create_game(
        &mut self,
        seed: u64,
        usernames: [String; 2],
        decklists: [Vec<String>; 2],
    ) -> [PlayerSeat; 2] {
        let game = GameId::new(self.next_game_id);
        self.next_game_id += 1;
        info!(%game, "creating game");
        let session =
            GameSession::new(game, self.card_library.clone(), seed, usernames, decklists);
        self.games.insert(game, session);
        [
            PlayerSeat { game, player: PlayerId::new(0) },
            PlayerSeat { game, player: PlayerId::new(1) },
        ]
    }

    #[must_use]
    pub fn get(&self, game: GameId) -> Option<&GameSession> {
        self.games.get(&game)
    }

    pub fn get_mut(&mut self, game: GameId) -> Option<&mut GameSession> {
        self.games.get_mut(&game)
    }

    /// Drop a finished or abandoned session. Returns whether it existed.
    pub fn close_game(&mut self, game: GameId) -> bool {
        let existed = self.games.remove(&game).is_some();
        if existed {
            info!(%game, "closing game");
        }
        existed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.games.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_close() {
        let mut library = GameLibrary::new(CardLibrary::with_default_cards());

        let seats = library.create_game(
            1,
            ["alice".into(), "bob".into()],
            [vec![], vec![]],
        );

        assert_eq!(seats[0].game, seats[1].game);
        assert_ne!(seats[0].player, seats[1].player);
        assert_eq!(library.len(), 1);
        assert!(library.get(seats[0].game).is_some());

        assert!(library.close_game(seats[0].game));
        assert!(!library.close_game(seats[0].game));
        assert!(library.is_empty());
    }

    #[test]
    fn test_game_ids_are_unique() {
        let mut library = GameLibrary::new(CardLibrary::with_default_cards());
        let a = library.create_game(1, ["a".into(), "b".into()], [vec![], vec![]]);
        let b = library.create_game(2, ["c".into(), "d".into()], [vec![], vec![]]);
        assert_ne!(a[0].game, b[0].game);
    }
}
