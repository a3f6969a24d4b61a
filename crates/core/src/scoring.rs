//! Scoring module - level parameters and combo scoring
//!
//! Each match awards the current score delta. The delta starts every unit at
//! the level's base value and compounds by an integer `4/3` once a combo is
//! under way (from the second match of the unit onwards), so the first three
//! matches of a level 0 unit award `13`, `13` and `17`.
//!
//! Combos span cascades: matches found after gravity compaction keep
//! compounding the delta of the unit that started them.

use crate::settings::GameSettings;
use kanji_cascade_types::{
    COMBO_DENOMINATOR, COMBO_NUMERATOR, QUOTA_BASE, QUOTA_LEVEL_STEP, QUOTA_MAX, TILES_PER_LEVEL,
};

/// Values derived from the level number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelParams {
    pub level: u32,
    /// Score awarded for the first match of each unit.
    pub score_delta: u32,
    /// Matches needed to complete the level.
    pub quota: u32,
    /// Tile types that may appear (a prefix of the tile set).
    pub available_types: usize,
}

impl LevelParams {
    pub fn new(level: u32, settings: &GameSettings, num_types: usize) -> Self {
        let score_delta = settings
            .score_base
            .saturating_add(settings.score_level_step.saturating_mul(level));
        let quota = QUOTA_BASE
            .saturating_add(QUOTA_LEVEL_STEP.saturating_mul(level))
            .min(QUOTA_MAX);
        let available_types = (TILES_PER_LEVEL * (level as usize + 1)).min(num_types);

        Self {
            level,
            score_delta,
            quota,
            available_types,
        }
    }
}

/// Apply the integer combo multiplier.
pub fn compound(delta: u32) -> u32 {
    delta.saturating_mul(COMBO_NUMERATOR) / COMBO_DENOMINATOR
}

/// Running score plus the combo state of the current unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComboScore {
    score: u32,
    base_delta: u32,
    delta: u32,
    combo: u32,
}

impl ComboScore {
    pub fn new(base_delta: u32) -> Self {
        Self {
            score: 0,
            base_delta,
            delta: base_delta,
            combo: 0,
        }
    }

    /// Change the base delta (new level). Keeps the score.
    pub fn set_base(&mut self, base_delta: u32) {
        self.base_delta = base_delta;
        self.start_unit();
    }

    /// A new unit starts falling: combo and delta go back to the base.
    pub fn start_unit(&mut self) {
        self.combo = 0;
        self.delta = self.base_delta;
    }

    /// Score one match. Returns the points awarded.
    pub fn award(&mut self) -> u32 {
        let points = self.delta;
        self.combo += 1;
        self.score = self.score.saturating_add(points);
        if self.combo >= 2 {
            self.delta = compound(self.delta);
        }
        points
    }

    pub fn reset(&mut self) {
        self.score = 0;
        self.start_unit();
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_params() {
        let settings = GameSettings::default();

        let l0 = LevelParams::new(0, &settings, 27);
        assert_eq!((l0.score_delta, l0.quota, l0.available_types), (13, 5, 9));

        let l2 = LevelParams::new(2, &settings, 27);
        assert_eq!((l2.score_delta, l2.quota, l2.available_types), (75, 9, 27));

        let l9 = LevelParams::new(9, &settings, 27);
        assert_eq!(l9.quota, QUOTA_MAX);
        assert_eq!(l9.available_types, 27);
    }

    #[test]
    fn test_three_matches_award_13_13_17() {
        let mut score = ComboScore::new(13);
        score.start_unit();
        assert_eq!(score.award(), 13);
        assert_eq!(score.award(), 13);
        assert_eq!(score.award(), 17);
        assert_eq!(score.score(), 13 + 13 + 17);
        assert_eq!(score.combo(), 3);
    }

    #[test]
    fn test_compounding_truncates() {
        assert_eq!(compound(13), 17);
        assert_eq!(compound(17), 22);
        assert_eq!(compound(1), 1);
    }

    #[test]
    fn test_start_unit_resets_combo_not_score() {
        let mut score = ComboScore::new(13);
        score.award();
        score.award();
        score.start_unit();
        assert_eq!(score.combo(), 0);
        assert_eq!(score.award(), 13);
        assert_eq!(score.score(), 39);

        score.reset();
        assert_eq!(score.score(), 0);
    }
}
