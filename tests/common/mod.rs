//! Shared setup for integration tests.

#![allow(dead_code)]

use duelcore::{CardId, CardLibrary, GameId, GameSession, Intent, PlayerId};

pub const SEED: u64 = 42;

pub fn alice() -> PlayerId {
    PlayerId::new(0)
}

pub fn bob() -> PlayerId {
    PlayerId::new(1)
}

pub fn deck_of(class: &str, count: usize) -> Vec<String> {
    vec![class.to_string(); count]
}

pub fn session_with(decklists: [Vec<String>; 2]) -> GameSession {
    GameSession::new(
        GameId::new(0),
        CardLibrary::with_default_cards(),
        SEED,
        ["alice".into(), "bob".into()],
        decklists,
    )
}

/// A session with both players initialized and the game started.
pub fn started_session(decklists: [Vec<String>; 2]) -> GameSession {
    let mut session = session_with(decklists);
    session.handle_intent(alice(), Intent::Init).unwrap();
    session.handle_intent(bob(), Intent::Init).unwrap();
    session
}

/// First card of the given class in a player's hand.
pub fn card_in_hand(session: &GameSession, player: PlayerId, class: &str) -> CardId {
    session
        .player(player)
        .hand
        .unit_cards()
        .chain(session.player(player).hand.spell_cards())
        .find(|&id| session.card(id).is_some_and(|c| c.class == class))
        .unwrap_or_else(|| panic!("{player} has no {class} in hand"))
}

pub fn play(
    session: &mut GameSession,
    player: PlayerId,
    card_id: CardId,
    row_index: usize,
    slot: usize,
) {
    session
        .handle_intent(player, Intent::PlayCard { card_id, row_index, slot })
        .unwrap();
}
