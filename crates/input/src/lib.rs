//! Terminal input module.
//!
//! Maps `crossterm` key events to [`crate::types::GameAction`]. The board
//! reacts to presses only, so key repeat from the terminal is passed through
//! and key releases (on terminals that report them) are dropped.

pub mod map;

pub use kanji_cascade_types as types;

pub use map::{handle_key_event, is_restart, should_quit};
