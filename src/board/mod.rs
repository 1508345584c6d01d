//! The shared battle board: rows, unit placement, and geometry.
//!
//! Six rows split evenly between the two players. Row indices are absolute;
//! each player's notion of "forward" is derived through a [`Perspective`],
//! so orientation logic lives in exactly one place instead of leaking
//! `is_inverted` checks through the rules code.
//!
//! Horizontal geometry is center-relative: a slot's position is measured
//! from its row's midpoint, so rows of different widths still line up the
//! way they visually do. Vertical geometry skips empty rows, which is what
//! lets a ranged unit shoot across a cleared row.

mod row;
mod unit;

pub use row::BoardRow;
pub use unit::{Unit, UnitOrder};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardId};
use crate::core::{IntentError, PlayerId, Ruleset};

/// Relative direction of a row change, from one player's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveDirection {
    /// Toward the opponent.
    Forward,
    /// Same row.
    Side,
    /// Away from the opponent.
    Back,
}

/// One player's orientation on the board.
///
/// The first player's rows are the low indices and they advance toward
/// higher ones; the second player mirrors that. All direction and
/// home-territory questions go through here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Perspective {
    player: PlayerId,
    inverted: bool,
}

impl Perspective {
    #[must_use]
    pub fn of(player: PlayerId) -> Self {
        Self {
            player,
            inverted: player.index() == 0,
        }
    }

    /// The rows this player deploys into.
    #[must_use]
    pub fn home_rows(self) -> std::ops::Range<usize> {
        let half = Ruleset::BOARD_ROW_COUNT / 2;
        if self.inverted {
            0..half
        } else {
            half..Ruleset::BOARD_ROW_COUNT
        }
    }

    /// Whether `row_index` is in this player's territory.
    #[must_use]
    pub fn owns_row(self, row_index: usize) -> bool {
        self.home_rows().contains(&row_index)
    }

    /// This player's row closest to the opponent.
    #[must_use]
    pub fn front_row(self) -> usize {
        let half = Ruleset::BOARD_ROW_COUNT / 2;
        if self.inverted {
            half - 1
        } else {
            half
        }
    }

    /// Classify a row change from this player's point of view.
    #[must_use]
    pub fn direction_of(self, from_row: usize, to_row: usize) -> MoveDirection {
        let delta = to_row as i32 - from_row as i32;
        let toward_enemy = if self.inverted { delta } else { -delta };
        match toward_enemy {
            d if d > 0 => MoveDirection::Forward,
            0 => MoveDirection::Side,
            _ => MoveDirection::Back,
        }
    }

    #[must_use]
    pub fn player(self) -> PlayerId {
        self.player
    }
}

/// The full board: a fixed array of rows holding unit shells.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Board {
    rows: Vec<BoardRow>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: (0..Ruleset::BOARD_ROW_COUNT).map(|_| BoardRow::new()).collect(),
        }
    }

    /// A row by absolute index.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&BoardRow> {
        self.rows.get(index)
    }

    /// Mutable access to a row by absolute index.
    pub fn row_mut(&mut self, index: usize) -> Option<&mut BoardRow> {
        self.rows.get_mut(index)
    }

    /// Iterate rows in absolute order.
    pub fn rows(&self) -> impl Iterator<Item = &BoardRow> {
        self.rows.iter()
    }

    /// Place a unit into a row at the given slot (clamped to row width).
    pub fn insert_unit(
        &mut self,
        row_index: usize,
        slot: usize,
        unit: Unit,
    ) -> Result<(), IntentError> {
        let row = self
            .rows
            .get_mut(row_index)
            .ok_or(IntentError::IllegalRow(row_index))?;
        if row.is_full() {
            return Err(IntentError::RowFull(row_index));
        }
        row.insert(slot, unit);
        Ok(())
    }

    /// Locate a unit as (row index, slot).
    #[must_use]
    pub fn find_unit(&self, card_id: CardId) -> Option<(usize, usize)> {
        self.rows.iter().enumerate().find_map(|(row_index, row)| {
            row.slot_of(card_id).map(|slot| (row_index, slot))
        })
    }

    /// The unit shell for a card, if it is on the board.
    #[must_use]
    pub fn unit(&self, card_id: CardId) -> Option<&Unit> {
        let (row_index, slot) = self.find_unit(card_id)?;
        self.rows[row_index].unit_at(slot)
    }

    /// Mutable access to a unit shell.
    pub fn unit_mut(&mut self, card_id: CardId) -> Option<&mut Unit> {
        let (row_index, slot) = self.find_unit(card_id)?;
        self.rows[row_index].unit_at_mut(slot)
    }

    /// Take a unit off the board, returning its shell and prior position.
    pub fn remove_unit(&mut self, card_id: CardId) -> Option<(usize, usize, Unit)> {
        let (row_index, slot) = self.find_unit(card_id)?;
        let unit = self.rows[row_index].remove_at(slot)?;
        Some((row_index, slot, unit))
    }

    /// Move a unit to another row, keeping its slot (clamped to the
    /// destination's width).
    pub fn relocate(&mut self, card_id: CardId, to_row: usize) -> Result<(), IntentError> {
        let (from_row, slot) = self
            .find_unit(card_id)
            .ok_or(IntentError::UnitNotFound(card_id))?;
        if to_row == from_row {
            return Ok(());
        }
        {
            let destination = self
                .rows
                .get(to_row)
                .ok_or(IntentError::IllegalRow(to_row))?;
            if destination.is_full() {
                return Err(IntentError::RowFull(to_row));
            }
        }
        let unit = self.rows[from_row]
            .remove_at(slot)
            .ok_or(IntentError::UnitNotFound(card_id))?;
        self.rows[to_row].insert(slot, unit);
        Ok(())
    }

    /// All unit card ids owned by `player`, row-major.
    pub fn units_of(&self, player: PlayerId) -> impl Iterator<Item = CardId> + '_ {
        self.rows
            .iter()
            .flat_map(|row| row.iter())
            .filter(move |u| u.owner == player)
            .map(|u| u.card_id)
    }

    /// Horizontal center-to-center distance between two on-board units.
    #[must_use]
    pub fn horizontal_distance(&self, a: CardId, b: CardId) -> Option<f32> {
        let (row_a, slot_a) = self.find_unit(a)?;
        let (row_b, slot_b) = self.find_unit(b)?;
        let offset_a = self.rows[row_a].center_offset(slot_a);
        let offset_b = self.rows[row_b].center_offset(slot_b);
        Some((offset_a - offset_b).abs())
    }

    /// Vertical distance between two rows: zero for the same row, otherwise
    /// one plus the number of occupied rows strictly between them. Empty
    /// rows cost nothing to shoot across. Indices beyond the board clamp to
    /// the last row.
    #[must_use]
    pub fn vertical_distance(&self, row_a: usize, row_b: usize) -> usize {
        let last = Ruleset::BOARD_ROW_COUNT - 1;
        let (row_a, row_b) = (row_a.min(last), row_b.min(last));
        if row_a == row_b {
            return 0;
        }
        let (low, high) = (row_a.min(row_b), row_a.max(row_b));
        let occupied_between = self.rows[low + 1..high]
            .iter()
            .filter(|row| !row.is_empty())
            .count();
        occupied_between + 1
    }

    /// Whether `target` is within `attacker`'s reach: at most `range` rows
    /// away vertically and within one slot horizontally.
    #[must_use]
    pub fn in_attack_range(&self, attacker: CardId, target: CardId, range: u32) -> bool {
        let Some((row_a, _)) = self.find_unit(attacker) else {
            return false;
        };
        let Some((row_t, _)) = self.find_unit(target) else {
            return false;
        };
        let Some(horizontal) = self.horizontal_distance(attacker, target) else {
            return false;
        };
        self.vertical_distance(row_a, row_t) <= range as usize && horizontal <= 1.0
    }

    /// Allied units directly adjacent to a unit: same owner, at most one row
    /// apart, within one slot horizontally, and not the unit itself.
    #[must_use]
    pub fn adjacent_allies(&self, card_id: CardId) -> Vec<CardId> {
        let Some(unit) = self.unit(card_id) else {
            return Vec::new();
        };
        let owner = unit.owner;
        let Some((row_index, _)) = self.find_unit(card_id) else {
            return Vec::new();
        };

        let mut allies = Vec::new();
        for (other_row, row) in self.rows.iter().enumerate() {
            if other_row.abs_diff(row_index) > 1 {
                continue;
            }
            for other in row.iter() {
                if other.card_id == card_id || other.owner != owner {
                    continue;
                }
                if let Some(h) = self.horizontal_distance(card_id, other.card_id) {
                    if h <= 1.0 {
                        allies.push(other.card_id);
                    }
                }
            }
        }
        allies
    }

    /// Sum of derived power over a player's on-board units.
    #[must_use]
    pub fn total_power(&self, player: PlayerId, cards: &FxHashMap<CardId, Card>) -> i32 {
        self.units_of(player)
            .filter_map(|id| cards.get(&id))
            .map(Card::power)
            .sum()
    }
}
