//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core simulation, terminal rendering, input mapping).
//!
//! # Grid Layout
//!
//! - **Rows**: 10 (row 0 is the bottom row)
//! - **Columns**: 6
//! - **Spawn position**: one row above the grid, column `(cols - 1) / 2`
//!
//! # Cell Encoding
//!
//! A grid cell is a single byte:
//!
//! | Value | Meaning |
//! |-------|---------|
//! | `0` | empty |
//! | `t + 1` | tile type `t` |
//! | `v \| SPECIAL_FLAG` | special (bomb) tile |
//!
//! # Timing
//!
//! The simulation advances in milliseconds. The terminal runner steps it at
//! `TICK_MS` (30 updates per second). Effect and animation lengths are quoted
//! in ticks and converted with [`ticks`].
//!
//! # Examples
//!
//! ```
//! use kanji_cascade_types::{cell, SPECIAL_FLAG};
//!
//! let v = cell::encode(4, true);
//! assert_eq!(v, 5 | SPECIAL_FLAG);
//! assert_eq!(cell::tile_type(v), Some(4));
//! assert!(cell::is_special(v));
//! ```

/// Default number of grid rows
pub const GRID_ROWS: usize = 10;

/// Default number of grid columns
pub const GRID_COLS: usize = 6;

/// Fixed timestep interval in milliseconds (30 updates per second)
pub const TICK_MS: u32 = 33;

/// High bit marking a special tile in a cell value
pub const SPECIAL_FLAG: u8 = 0x80;

/// Largest number of tile types a cell byte can encode below the special flag
pub const MAX_TILE_TYPES: usize = (SPECIAL_FLAG - 1) as usize;

/// New tile types unlocked per level
pub const TILES_PER_LEVEL: usize = 9;

/// Score increment for the first match of a unit at level 0
pub const SCORE_BASE: u32 = 13;

/// Additional score increment per level
pub const SCORE_LEVEL_STEP: u32 = 31;

/// Combo multiplier numerator (4/3, integer truncated)
pub const COMBO_NUMERATOR: u32 = 4;

/// Combo multiplier denominator
pub const COMBO_DENOMINATOR: u32 = 3;

/// Matches required to complete level 0
pub const QUOTA_BASE: u32 = 5;

/// Extra matches required per level
pub const QUOTA_LEVEL_STEP: u32 = 2;

/// Upper bound on a level's match quota
pub const QUOTA_MAX: u32 = 12;

/// Duration of the match flare animation (16 frames, one per tick)
pub const FLARE_MS: u32 = 16 * TICK_MS;

/// Convert a duration in ticks to milliseconds.
pub const fn ticks(n: u32) -> u32 {
    n * TICK_MS
}

/// Cell value helpers.
pub mod cell {
    use super::SPECIAL_FLAG;

    /// Empty cell value
    pub const EMPTY: u8 = 0;

    /// Encode a tile type (and special flag) as a cell value.
    pub fn encode(tile_type: u8, special: bool) -> u8 {
        debug_assert!(tile_type < SPECIAL_FLAG - 1);
        let v = tile_type + 1;
        if special {
            v | SPECIAL_FLAG
        } else {
            v
        }
    }

    /// Cell value with the special flag stripped (`0` for empty).
    pub fn base(value: u8) -> u8 {
        value & !SPECIAL_FLAG
    }

    /// Tile type held by the cell, if any.
    pub fn tile_type(value: u8) -> Option<u8> {
        match base(value) {
            0 => None,
            v => Some(v - 1),
        }
    }

    pub fn is_special(value: u8) -> bool {
        value & SPECIAL_FLAG != 0
    }

    pub fn is_empty(value: u8) -> bool {
        value == EMPTY
    }
}

/// A falling-unit slot: a tile type plus its special flag.
///
/// Unlike grid cells, slots are never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub kind: u8,
    pub special: bool,
}

impl Tile {
    pub fn new(kind: u8) -> Self {
        Self {
            kind,
            special: false,
        }
    }

    /// Grid cell value for this tile.
    pub fn cell(&self) -> u8 {
        cell::encode(self.kind, self.special)
    }
}

/// Player commands consumed by the board
///
/// Each command maps to one of the four presses the board understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Slide the falling unit one column left
    MoveLeft,
    /// Slide the falling unit one column right
    MoveRight,
    /// Swap the two tiles of the unit, or dismiss a hint
    Swap,
    /// Hard drop the unit
    Drop,
}

/// Top-level board states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardState {
    /// About to launch the next unit (or show a hint first)
    BeforeUnit,
    /// A hint card is on screen
    Hint,
    /// The player controls a falling unit
    ActiveUnit,
    /// Floating tiles are falling into place
    DroppingHanging,
    /// Matched tiles flare before being cleared
    MatchFlares,
    /// Matched tiles have been cleared; waiting out the solve delay
    ResolvingMatches,
    /// Waiting for decorative effects to finish
    WaitingForEffects,
    GameOver,
    LevelCompleted,
}

impl BoardState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardState::BeforeUnit => "before_unit",
            BoardState::Hint => "hint",
            BoardState::ActiveUnit => "active_unit",
            BoardState::DroppingHanging => "dropping_hanging",
            BoardState::MatchFlares => "match_flares",
            BoardState::ResolvingMatches => "resolving_matches",
            BoardState::WaitingForEffects => "waiting_for_effects",
            BoardState::GameOver => "game_over",
            BoardState::LevelCompleted => "level_completed",
        }
    }

    /// Terminal states never transition on their own.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BoardState::GameOver | BoardState::LevelCompleted)
    }
}

/// Board-side events for the UI/audio collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    ScoreChanged(u32),
    MatchesRemainingChanged(u32),
    NextUnitPreview { left: char, right: char },
    UnitSpawned,
}

impl GameEvent {
    /// Forward this event to the matching listener method.
    pub fn dispatch(&self, listener: &mut dyn EventListener) {
        match *self {
            GameEvent::ScoreChanged(score) => listener.on_score_changed(score),
            GameEvent::MatchesRemainingChanged(count) => {
                listener.on_matches_remaining_changed(count)
            }
            GameEvent::NextUnitPreview { left, right } => listener.on_next_unit_preview(left, right),
            GameEvent::UnitSpawned => listener.on_unit_spawned(),
        }
    }
}

/// Receiver for board events. Every method defaults to a no-op.
pub trait EventListener {
    fn on_score_changed(&mut self, _score: u32) {}
    fn on_matches_remaining_changed(&mut self, _count: u32) {}
    fn on_next_unit_preview(&mut self, _left: char, _right: char) {}
    fn on_unit_spawned(&mut self) {}
}
