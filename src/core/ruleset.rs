//! Game ruleset constants.

/// Fixed rules of the game. Grouped in one place so tests and the session
/// agree on board shape and resource grants.
pub struct Ruleset;

impl Ruleset {
    /// Number of rows on the board. Each player owns half.
    pub const BOARD_ROW_COUNT: usize = 6;

    /// Maximum number of units a single row can hold.
    pub const MAX_UNITS_PER_ROW: usize = 10;

    /// Morale each player starts with. Reaching zero loses the game.
    pub const STARTING_MORALE: i32 = 20;

    /// Unit mana granted at the start of every turn.
    pub const UNIT_MANA_PER_TURN: u32 = 3;

    /// Spell mana granted at the start of every turn.
    pub const SPELL_MANA_PER_TURN: u32 = 3;

    /// Unit cards drawn when the game starts.
    pub const STARTING_UNIT_HAND_SIZE: usize = 5;

    /// Hard cap on unit cards held in hand; draws beyond it are skipped.
    pub const UNIT_HAND_SIZE_LIMIT: usize = 10;

    /// The spell hand is refilled up to this many cards at turn start.
    pub const SPELL_HAND_REFILL_TO: usize = 3;

    /// Hard bound on nested card resolutions. A card effect that would push
    /// past this fails closed instead of overflowing.
    pub const MAX_RESOLVE_DEPTH: usize = 32;
}
