//! A single board row.

use serde::{Deserialize, Serialize};

use crate::board::Unit;
use crate::cards::CardId;
use crate::core::Ruleset;

/// One row of units. Units pack left-to-right with no gaps; removing a unit
/// shifts everything to its right one slot left.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardRow {
    units: Vec<Unit>,
}

impl BoardRow {
    /// Create an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of units in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the row holds no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Whether the row is at capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.units.len() >= Ruleset::MAX_UNITS_PER_ROW
    }

    /// Insert at `slot`, clamped to the current width. Caller checks
    /// capacity first.
    pub fn insert(&mut self, slot: usize, unit: Unit) {
        let slot = slot.min(self.units.len());
        self.units.insert(slot, unit);
    }

    /// Remove and return the unit at `slot`, if the slot is occupied.
    pub fn remove_at(&mut self, slot: usize) -> Option<Unit> {
        if slot < self.units.len() {
            Some(self.units.remove(slot))
        } else {
            None
        }
    }

    /// The slot the given card occupies, if it is in this row.
    #[must_use]
    pub fn slot_of(&self, card_id: CardId) -> Option<usize> {
        self.units.iter().position(|u| u.card_id == card_id)
    }

    /// The unit at `slot`.
    #[must_use]
    pub fn unit_at(&self, slot: usize) -> Option<&Unit> {
        self.units.get(slot)
    }

    /// Mutable access to the unit at `slot`.
    pub fn unit_at_mut(&mut self, slot: usize) -> Option<&mut Unit> {
        self.units.get_mut(slot)
    }

    /// Iterate units left to right.
    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    /// Mutable iteration, left to right.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Unit> {
        self.units.iter_mut()
    }

    /// A slot's horizontal offset from the row's center. Rows of different
    /// widths are compared center-to-center, so a lone unit lines up with
    /// the middle of a full enemy row.
    #[must_use]
    pub fn center_offset(&self, slot: usize) -> f32 {
        slot as f32 - (self.units.len().saturating_sub(1)) as f32 / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PlayerId;

    fn unit(id: u32) -> Unit {
        Unit::new(CardId::new(id), PlayerId::new(0))
    }

    #[test]
    fn test_insert_clamps_slot() {
        let mut row = BoardRow::new();
        row.insert(5, unit(1));
        row.insert(0, unit(2));
        row.insert(99, unit(3));

        let ids: Vec<u32> = row.iter().map(|u| u.card_id.raw()).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_remove_shifts_left() {
        let mut row = BoardRow::new();
        for i in 0..3 {
            row.insert(i as usize, unit(i));
        }

        let removed = row.remove_at(1).unwrap();
        assert_eq!(removed.card_id, CardId::new(1));
        assert_eq!(row.slot_of(CardId::new(2)), Some(1));
    }

    #[test]
    fn test_capacity() {
        let mut row = BoardRow::new();
        for i in 0..Ruleset::MAX_UNITS_PER_ROW as u32 {
            row.insert(0, unit(i));
        }
        assert!(row.is_full());
    }

    #[test]
    fn test_center_offset() {
        let mut row = BoardRow::new();
        for i in 0..3 {
            row.insert(i as usize, unit(i));
        }

        // Three units center on the middle slot
        assert_eq!(row.center_offset(0), -1.0);
        assert_eq!(row.center_offset(1), 0.0);
        assert_eq!(row.center_offset(2), 1.0);
    }
}
