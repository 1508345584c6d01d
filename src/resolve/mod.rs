//! Card resolution stack and targeting.
//!
//! Playing a card pushes a resolve stack entry; if the card demands targets,
//! resolution suspends until the owner answers with a selection intent.
//! Because effects can play further cards mid-resolution (tokens, tutoring),
//! entries nest: the topmost entry is the one currently collecting targets,
//! and an entry lower on the stack re-checks its own targeting only after
//! everything above it has finished. No threads, no futures; suspension is
//! just the stack sitting there between intents.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::{CardId, CardType};
use crate::core::{ConsistencyError, PlayerId, Ruleset};

/// What kind of entity a target rule asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetType {
    /// A unit on the board.
    Unit,
    /// A board row.
    Row,
    /// A card in a non-board zone (deck tutoring).
    Card,
}

/// Validity constraint on a candidate target, evaluated against the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetConstraint {
    /// Unit owned by the resolving player's opponent.
    EnemyUnit,
    /// Unit owned by the resolving player.
    AlliedUnit,
    /// Card sitting in the resolving player's unit deck.
    InOwnersUnitDeck,
    /// The candidate is not the resolving card itself.
    NotSelf,
}

/// One target slot: the entity kind plus the constraints a candidate must
/// satisfy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRule {
    pub target_type: TargetType,
    pub constraints: Vec<TargetConstraint>,
}

impl TargetRule {
    #[must_use]
    pub fn new(target_type: TargetType) -> Self {
        Self {
            target_type,
            constraints: Vec::new(),
        }
    }

    /// Add a constraint (builder pattern).
    #[must_use]
    pub fn require(mut self, constraint: TargetConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }
}

/// A card's declared targeting: how many targets it wants and the rule each
/// candidate must satisfy.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDefinition {
    /// Targets required before the card's effect runs. Zero means the card
    /// resolves immediately.
    pub target_count: usize,

    /// Rules a candidate may satisfy. A candidate valid under any one rule
    /// is a valid target.
    pub rules: Vec<TargetRule>,
}

impl TargetDefinition {
    /// A definition demanding no targets.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// A definition demanding `count` targets under one rule.
    #[must_use]
    pub fn single_rule(count: usize, rule: TargetRule) -> Self {
        Self {
            target_count: count,
            rules: vec![rule],
        }
    }
}

/// A selected target, as sent by a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardTarget {
    /// A unit on the board.
    Unit { card_id: CardId },
    /// A board row.
    Row { row_index: usize },
    /// A card in a hidden zone.
    Card { card_id: CardId },
}

/// One suspended or resolving card on the stack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveStackEntry {
    pub card_id: CardId,
    pub owner: PlayerId,
    pub card_type: CardType,

    /// Targets collected so far, in selection order.
    pub targets: SmallVec<[CardTarget; 3]>,
}

impl ResolveStackEntry {
    #[must_use]
    pub fn new(card_id: CardId, owner: PlayerId, card_type: CardType) -> Self {
        Self {
            card_id,
            owner,
            card_type,
            targets: SmallVec::new(),
        }
    }
}

/// The session's stack of nested card resolutions.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResolveStack {
    entries: Vec<ResolveStackEntry>,
}

impl ResolveStack {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an entry. Fails closed if the nesting depth limit is hit, which
    /// indicates a card template summoning in an unbounded loop.
    pub fn push(&mut self, entry: ResolveStackEntry) -> Result<(), ConsistencyError> {
        if self.entries.len() >= Ruleset::MAX_RESOLVE_DEPTH {
            return Err(ConsistencyError::ResolveDepthExceeded(entry.card_id));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Pop the topmost entry.
    pub fn pop(&mut self) -> Result<ResolveStackEntry, ConsistencyError> {
        self.entries.pop().ok_or(ConsistencyError::EmptyStackPop)
    }

    /// The entry currently being resolved (topmost), if any.
    #[must_use]
    pub fn current(&self) -> Option<&ResolveStackEntry> {
        self.entries.last()
    }

    /// Mutable access to the topmost entry.
    pub fn current_mut(&mut self) -> Option<&mut ResolveStackEntry> {
        self.entries.last_mut()
    }

    /// The card id of the topmost entry, if any.
    #[must_use]
    pub fn current_card(&self) -> Option<CardId> {
        self.entries.last().map(|e| e.card_id)
    }

    /// Whether `card_id` sits anywhere on the stack.
    #[must_use]
    pub fn contains(&self, card_id: CardId) -> bool {
        self.entries.iter().any(|e| e.card_id == card_id)
    }

    /// Nesting depth.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no resolution is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u32) -> ResolveStackEntry {
        ResolveStackEntry::new(CardId::new(id), PlayerId::new(0), CardType::Spell)
    }

    #[test]
    fn test_push_pop_order() {
        let mut stack = ResolveStack::new();
        stack.push(entry(1)).unwrap();
        stack.push(entry(2)).unwrap();

        assert_eq!(stack.current_card(), Some(CardId::new(2)));
        assert_eq!(stack.pop().unwrap().card_id, CardId::new(2));
        assert_eq!(stack.current_card(), Some(CardId::new(1)));
    }

    #[test]
    fn test_pop_empty_is_error() {
        let mut stack = ResolveStack::new();
        assert!(matches!(stack.pop(), Err(ConsistencyError::EmptyStackPop)));
    }

    #[test]
    fn test_depth_limit_fails_closed() {
        let mut stack = ResolveStack::new();
        for i in 0..Ruleset::MAX_RESOLVE_DEPTH as u32 {
            stack.push(entry(i)).unwrap();
        }

        let result = stack.push(entry(999));
        assert!(matches!(
            result,
            Err(ConsistencyError::ResolveDepthExceeded(id)) if id == CardId::new(999)
        ));
        assert_eq!(stack.len(), Ruleset::MAX_RESOLVE_DEPTH);
    }

    #[test]
    fn test_targets_accumulate_on_current() {
        let mut stack = ResolveStack::new();
        stack.push(entry(1)).unwrap();

        let top = stack.current_mut().unwrap();
        top.targets.push(CardTarget::Unit { card_id: CardId::new(5) });
        top.targets.push(CardTarget::Row { row_index: 2 });

        assert_eq!(stack.current().unwrap().targets.len(), 2);
    }

    #[test]
    fn test_contains() {
        let mut stack = ResolveStack::new();
        stack.push(entry(1)).unwrap();
        stack.push(entry(2)).unwrap();

        assert!(stack.contains(CardId::new(1)));
        assert!(!stack.contains(CardId::new(7)));
    }

    #[test]
    fn test_target_definition_none() {
        let def = TargetDefinition::none();
        assert_eq!(def.target_count, 0);
        assert!(def.rules.is_empty());
    }
}
