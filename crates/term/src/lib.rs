//! Terminal rendering for the board.
//!
//! The board is drawn into a [`FrameBuffer`] of styled character cells by
//! [`GameView`], which is pure and unit-testable. [`TerminalRenderer`] then
//! flushes the framebuffer to the terminal, redrawing only rows that changed.
//!
//! Kanji occupy two terminal columns, which is also the width of one board
//! cell, so the board keeps a roughly square aspect ratio.

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use kanji_cascade_core as core;
pub use kanji_cascade_types as types;

pub use fb::{char_width, Cell, CellStyle, FrameBuffer, Rgb, WIDE_TAIL};
pub use game_view::{GameView, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
