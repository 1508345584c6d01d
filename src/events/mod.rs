//! Per-session publish/subscribe event bus.
//!
//! Cards register callbacks when they are instantiated; each registration is
//! bound to an event kind, an optional location filter on the triggering
//! entity, and an optional predicate over the event arguments. Posting an
//! event invokes every matching callback synchronously in registration
//! order; callbacks may post further events (re-entrant) or mutate board and
//! buff state. This bus is the only mechanism by which card behaviors react
//! to game changes; unrelated cards never call each other directly.
//!
//! The bus itself stores registrations and answers match queries; the
//! session interprets the matched scripts, because script execution needs
//! mutable access to the whole game state.

use serde::{Deserialize, Serialize};

use crate::cards::{CardId, CardScript};
use crate::core::PlayerId;

/// The kinds of events the engine publishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameEventKind {
    /// A unit was inserted into a row.
    UnitPlayed,
    /// A deployed unit's own on-board effect window (fires for the unit
    /// itself after its play resolution).
    EffectUnitDeploy,
    UnitDestroyed,
    UnitMoved,
    CardPlayed,
    CardDrawn,
    TurnStarted,
    TurnEnded,
    RoundStarted,
    RoundEnded,
}

/// Zone a card can occupy, used for callback location filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardLocation {
    Hand,
    Deck,
    Board,
    Graveyard,
}

/// A published event with its arguments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    pub kind: GameEventKind,

    /// The card whose change caused the event, if any.
    pub triggering_card: Option<CardId>,

    /// The player associated with the event, if any.
    pub player: Option<PlayerId>,

    /// Where the triggering card was when the event was posted. Captured at
    /// post time: a destroyed unit has already left the board by the time
    /// callbacks observe the event.
    pub location: Option<CardLocation>,
}

impl GameEvent {
    /// Create an event with just a kind.
    #[must_use]
    pub fn new(kind: GameEventKind) -> Self {
        Self {
            kind,
            triggering_card: None,
            player: None,
            location: None,
        }
    }

    /// Set the triggering card (builder pattern).
    #[must_use]
    pub fn with_card(mut self, card: CardId) -> Self {
        self.triggering_card = Some(card);
        self
    }

    /// Set the associated player (builder pattern).
    #[must_use]
    pub fn with_player(mut self, player: PlayerId) -> Self {
        self.player = Some(player);
        self
    }

    /// Set the triggering card's location at post time (builder pattern).
    #[must_use]
    pub fn at_location(mut self, location: CardLocation) -> Self {
        self.location = Some(location);
        self
    }
}

/// Predicate over event arguments, evaluated per registration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallbackCondition {
    /// Fire on every event of the kind.
    #[default]
    Always,
    /// Fire only when the triggering card is the registration's owner.
    TriggeringCardIsSelf,
    /// Fire only when the event's player is the registration's owner's owner.
    TriggeringPlayerOwnsSelf,
}

/// One callback registration: an event kind plus filters plus the scripts to
/// run when it matches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCallback {
    /// The card this registration belongs to. Removed with the card.
    pub owner: CardId,

    pub kind: GameEventKind,

    /// If set, the triggering entity must have been in this zone.
    pub location: Option<CardLocation>,

    pub condition: CallbackCondition,

    /// Scripts the session runs with `owner` as the source card.
    pub scripts: Vec<CardScript>,
}

impl EventCallback {
    /// Whether this registration's filters accept the event. The condition
    /// relating the event player to the owner's owner needs card state the
    /// bus does not hold, so the owner's player is passed in.
    #[must_use]
    pub fn matches(&self, event: &GameEvent, owner_player: PlayerId) -> bool {
        if self.kind != event.kind {
            return false;
        }
        if let Some(required) = self.location {
            if event.location != Some(required) {
                return false;
            }
        }
        match self.condition {
            CallbackCondition::Always => true,
            CallbackCondition::TriggeringCardIsSelf => event.triggering_card == Some(self.owner),
            CallbackCondition::TriggeringPlayerOwnsSelf => event.player == Some(owner_player),
        }
    }
}

/// Registration store for one session.
#[derive(Clone, Debug, Default)]
pub struct EventBus {
    callbacks: Vec<EventCallback>,
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. Invocation order is registration order.
    pub fn register(&mut self, callback: EventCallback) {
        self.callbacks.push(callback);
    }

    /// Drop every registration owned by a card (the card left the game).
    pub fn remove_for_owner(&mut self, owner: CardId) {
        self.callbacks.retain(|cb| cb.owner != owner);
    }

    /// Registrations for an event kind, in registration order. Returns
    /// clones so the session can run scripts while mutating game state.
    #[must_use]
    pub fn registrations_for(&self, kind: GameEventKind) -> Vec<EventCallback> {
        self.callbacks
            .iter()
            .filter(|cb| cb.kind == kind)
            .cloned()
            .collect()
    }

    /// Total registration count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Whether no callbacks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn callback(owner: u32, kind: GameEventKind) -> EventCallback {
        EventCallback {
            owner: CardId::new(owner),
            kind,
            location: None,
            condition: CallbackCondition::Always,
            scripts: vec![CardScript::GainPower { amount: 1 }],
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut bus = EventBus::new();
        bus.register(callback(1, GameEventKind::UnitDestroyed));
        bus.register(callback(2, GameEventKind::UnitPlayed));
        bus.register(callback(3, GameEventKind::UnitDestroyed));

        let found = bus.registrations_for(GameEventKind::UnitDestroyed);
        assert_eq!(found.len(), 2);
        // Registration order preserved
        assert_eq!(found[0].owner, CardId::new(1));
        assert_eq!(found[1].owner, CardId::new(3));
    }

    #[test]
    fn test_remove_for_owner() {
        let mut bus = EventBus::new();
        bus.register(callback(1, GameEventKind::UnitDestroyed));
        bus.register(callback(1, GameEventKind::TurnStarted));
        bus.register(callback(2, GameEventKind::UnitDestroyed));

        bus.remove_for_owner(CardId::new(1));

        assert_eq!(bus.len(), 1);
        assert_eq!(
            bus.registrations_for(GameEventKind::UnitDestroyed)[0].owner,
            CardId::new(2)
        );
        assert!(bus.registrations_for(GameEventKind::TurnStarted).is_empty());
    }

    #[test]
    fn test_matches_location_filter() {
        let mut cb = callback(1, GameEventKind::UnitDestroyed);
        cb.location = Some(CardLocation::Board);

        let on_board = GameEvent::new(GameEventKind::UnitDestroyed)
            .with_card(CardId::new(1))
            .at_location(CardLocation::Board);
        let in_graveyard = GameEvent::new(GameEventKind::UnitDestroyed)
            .with_card(CardId::new(1))
            .at_location(CardLocation::Graveyard);

        assert!(cb.matches(&on_board, PlayerId::new(0)));
        assert!(!cb.matches(&in_graveyard, PlayerId::new(0)));
    }

    #[test]
    fn test_matches_self_condition() {
        let mut cb = callback(1, GameEventKind::UnitDestroyed);
        cb.condition = CallbackCondition::TriggeringCardIsSelf;

        let own = GameEvent::new(GameEventKind::UnitDestroyed).with_card(CardId::new(1));
        let other = GameEvent::new(GameEventKind::UnitDestroyed).with_card(CardId::new(9));

        assert!(cb.matches(&own, PlayerId::new(0)));
        assert!(!cb.matches(&other, PlayerId::new(0)));
    }

    #[test]
    fn test_matches_owner_player_condition() {
        let mut cb = callback(1, GameEventKind::TurnStarted);
        cb.condition = CallbackCondition::TriggeringPlayerOwnsSelf;

        let own_turn = GameEvent::new(GameEventKind::TurnStarted).with_player(PlayerId::new(0));
        let enemy_turn = GameEvent::new(GameEventKind::TurnStarted).with_player(PlayerId::new(1));

        assert!(cb.matches(&own_turn, PlayerId::new(0)));
        assert!(!cb.matches(&enemy_turn, PlayerId::new(0)));
    }

    #[test]
    fn test_kind_mismatch_never_matches() {
        let cb = callback(1, GameEventKind::UnitPlayed);
        let event = GameEvent::new(GameEventKind::UnitDestroyed).with_card(CardId::new(1));

        assert!(!cb.matches(&event, PlayerId::new(0)));
    }
}
