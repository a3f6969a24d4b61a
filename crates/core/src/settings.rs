//! Tunable timings and board dimensions.
//!
//! Settings load from JSON. Every field is optional and falls back to its
//! default, so `{}` is a valid settings file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use kanji_cascade_types::{ticks, GRID_COLS, GRID_ROWS, SCORE_BASE, SCORE_LEVEL_STEP};

const MAX_GRID_SIDE: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Time a unit rests on each row before stepping down.
    pub fall_interval_ms: u32,
    /// Length of the one-row descent animation.
    pub drop_anim_ms: u32,
    /// Pause after matched tiles are cleared.
    pub solve_ms: u32,
    pub swap_ms: u32,
    pub move_ms: u32,
    /// One unit in this many carries a special tile.
    pub special_period: u32,
    /// One unit in this many is preceded by a hint.
    pub hint_period: u32,
    pub hint_hold_ms: u32,
    pub score_base: u32,
    pub score_level_step: u32,
    pub rows: usize,
    pub cols: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            fall_interval_ms: ticks(30),
            drop_anim_ms: ticks(8),
            solve_ms: ticks(20),
            swap_ms: ticks(8),
            move_ms: ticks(5),
            special_period: 20,
            hint_period: 3,
            hint_hold_ms: ticks(90),
            score_base: SCORE_BASE,
            score_level_step: SCORE_LEVEL_STEP,
            rows: GRID_ROWS,
            cols: GRID_COLS,
        }
    }
}

impl GameSettings {
    /// Parse and validate a JSON document.
    pub fn from_json(text: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read and validate a JSON settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let settings = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows < 2 || self.cols < 2 {
            return Err(ConfigError::InvalidSettings(format!(
                "grid must be at least 2x2, got {}x{}",
                self.rows, self.cols
            )));
        }
        if self.rows > MAX_GRID_SIDE || self.cols > MAX_GRID_SIDE {
            return Err(ConfigError::InvalidSettings(format!(
                "grid {}x{} is too large",
                self.rows, self.cols
            )));
        }
        let timings = [
            ("fall_interval_ms", self.fall_interval_ms),
            ("drop_anim_ms", self.drop_anim_ms),
            ("solve_ms", self.solve_ms),
            ("swap_ms", self.swap_ms),
            ("move_ms", self.move_ms),
            ("hint_hold_ms", self.hint_hold_ms),
        ];
        if let Some((name, _)) = timings.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::InvalidSettings(format!("{name} must be positive")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(GameSettings::from_json("{}").unwrap(), GameSettings::default());
    }

    #[test]
    fn test_partial_override() {
        let s = GameSettings::from_json(r#"{ "rows": 4, "cols": 3, "special_period": 5 }"#)
            .unwrap();
        assert_eq!((s.rows, s.cols, s.special_period), (4, 3, 5));
        assert_eq!(s.swap_ms, GameSettings::default().swap_ms);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            GameSettings::from_json(r#"{ "rows": 1 }"#),
            Err(ConfigError::InvalidSettings(_))
        ));
        assert!(matches!(
            GameSettings::from_json(r#"{ "swap_ms": 0 }"#),
            Err(ConfigError::InvalidSettings(_))
        ));
        assert!(matches!(
            GameSettings::from_json("not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
