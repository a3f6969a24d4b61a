//! Core game logic - pure, deterministic, and testable
//!
//! This crate contains the rules of the falling-tile pairing game and its
//! animation engine. It performs no terminal I/O, so it runs the same in a
//! terminal, a test, or a benchmark:
//!
//! - **Deterministic**: every random choice comes from one seeded [`GameRng`]
//! - **Fixed-step**: the board advances only through [`GameState::tick`]
//! - **Data-driven**: tiles and pairings are loaded from text files
//!
//! # Module Structure
//!
//! - [`action`]: composable timed actions (tweens, sequences, parallel groups)
//! - [`easing`]: easing curves used by tweens
//! - [`dataset`]: tile glyphs and pairing facts
//! - [`match_table`]: directional pair lookup built from the dataset
//! - [`board`]: the grid, match detection and clearing
//! - [`falling`]: the two-tile unit under player control
//! - [`gravity`]: bouncing fall of tiles left floating after a clear
//! - [`hint`]: search for a placement that would form a pairing
//! - [`effects`]: decorative effects driven by action trees
//! - [`scoring`]: level parameters and combo scoring
//! - [`game_state`]: the board state machine
//! - [`settings`]: JSON-loadable timings and grid size
//! - [`rng`]: seeded randomness
//!
//! # Game Rules
//!
//! - Units of two tiles fall into a 6-column, 10-row grid.
//! - Two touching tiles whose glyphs form a listed compound (left to right,
//!   or top to bottom) are cleared and scored.
//! - A matched special tile clears every tile of its glyph on the grid.
//! - Tiles left floating fall, possibly forming new matches (cascades).
//! - Each level requires a number of matches; the game ends when the spawn
//!   columns of the top row are blocked.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use kanji_cascade_core::{GameRng, GameSettings, GameState, MatchTable};
//! use kanji_cascade_types::{BoardState, GameAction, TICK_MS};
//!
//! let table = Arc::new(MatchTable::builtin().unwrap());
//! let mut game = GameState::new(table, GameSettings::default(), GameRng::new(12345));
//! game.set_level(0, false, false);
//!
//! game.tick(TICK_MS);
//! assert_eq!(game.state(), BoardState::ActiveUnit);
//!
//! game.apply_action(GameAction::MoveLeft);
//! for _ in 0..10 {
//!     game.tick(TICK_MS);
//! }
//! assert!(game.apply_action(GameAction::Drop));
//! ```

pub mod action;
pub mod board;
pub mod dataset;
pub mod easing;
pub mod effects;
pub mod error;
pub mod falling;
pub mod game_state;
pub mod gravity;
pub mod hint;
pub mod match_table;
pub mod rng;
pub mod scoring;
pub mod settings;

pub use kanji_cascade_types as types;

// Re-export commonly used types for convenience
pub use action::{Action, PropertyId, PropertyTable};
pub use board::{Grid, MatchHit, MatchReport, MatchSet};
pub use dataset::{FactId, PairingDataset, PairingFact, TileSet};
pub use easing::Easing;
pub use effects::{Effect, EffectKind, Effects};
pub use error::{ConfigError, Result};
pub use falling::{DropTrail, FallingUnit, UnitTimings};
pub use game_state::GameState;
pub use gravity::GravityAnimation;
pub use hint::{find_hint, Hint};
pub use match_table::MatchTable;
pub use rng::GameRng;
pub use scoring::{ComboScore, LevelParams};
pub use settings::GameSettings;
