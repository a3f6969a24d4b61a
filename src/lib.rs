//! Kanji Cascade (workspace facade crate).
//!
//! Re-exports the workspace crates as `kanji_cascade::{core,input,term,types}`
//! so the binary, benches and integration tests share one import path.

pub use kanji_cascade_core as core;
pub use kanji_cascade_input as input;
pub use kanji_cascade_term as term;
pub use kanji_cascade_types as types;
