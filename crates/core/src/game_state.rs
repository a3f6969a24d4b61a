//! Game state module - the board simulation
//!
//! [`GameState`] ties together the grid, the double-buffered falling unit,
//! match detection and resolution, scoring, hints, the gravity animation and
//! decorative effects. It advances only through [`GameState::tick`], which
//! first steps every live effect and then evaluates exactly one state check.
//!
//! ```text
//! BeforeUnit ─┬─> Hint ──────────┐
//!             └──────────────────┴─> ActiveUnit ─┬─> DroppingHanging ─┬─> MatchFlares ─> ResolvingMatches
//!                                                ├─> MatchFlares      └─> WaitingForEffects
//!                                                ├─> WaitingForEffects
//!                                                └─> BeforeUnit
//! ResolvingMatches ─┬─> DroppingHanging
//!                   └─> WaitingForEffects ─┬─> GameOver
//!                                          ├─> LevelCompleted
//!                                          └─> BeforeUnit
//! ```

use std::sync::Arc;

use crate::board::{CellPos, Grid, MatchReport, MatchSet};
use crate::effects::{Effect, Effects};
use crate::error::{ConfigError, Result};
use crate::falling::{FallingUnit, UnitTimings};
use crate::gravity::GravityAnimation;
use crate::hint::{find_hint, Hint};
use crate::match_table::MatchTable;
use crate::rng::GameRng;
use crate::scoring::{ComboScore, LevelParams};
use crate::settings::GameSettings;
use kanji_cascade_types::{
    cell, BoardState, EventListener, GameAction, GameEvent, Tile, FLARE_MS,
};

/// Complete board state
#[derive(Debug, Clone)]
pub struct GameState {
    table: Arc<MatchTable>,
    settings: GameSettings,
    rng: GameRng,

    grid: Grid,
    units: [FallingUnit; 2],
    /// Index of the unit in play; the other one is the preview.
    current: usize,

    state: BoardState,
    /// Time spent in the current state.
    state_ms: u32,

    params: LevelParams,
    practice: bool,
    hints_enabled: bool,

    score: ComboScore,
    matches_remaining: u32,
    fact_hits: Vec<u32>,

    matches: MatchSet,
    gravity: GravityAnimation,
    effects: Effects,
    hint: Option<Hint>,

    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a board at level 0 with hints enabled.
    ///
    /// # Panics
    ///
    /// Panics if `settings` fail [`GameSettings::validate`].
    pub fn new(table: Arc<MatchTable>, settings: GameSettings, rng: GameRng) -> Self {
        if let Err(err) = settings.validate() {
            panic!("invalid game settings: {err}");
        }
        let timings = UnitTimings::from(&settings);
        let params = LevelParams::new(0, &settings, table.num_types());
        let grid = Grid::new(settings.rows, settings.cols);
        let matches = MatchSet::empty(settings.rows, settings.cols);
        let fact_hits = vec![0; table.num_facts()];

        let mut game = Self {
            table,
            settings,
            rng,
            grid,
            units: [FallingUnit::new(timings), FallingUnit::new(timings)],
            current: 0,
            state: BoardState::BeforeUnit,
            state_ms: 0,
            params,
            practice: false,
            hints_enabled: true,
            score: ComboScore::new(params.score_delta),
            matches_remaining: params.quota,
            fact_hits,
            matches,
            gravity: GravityAnimation::default(),
            effects: Effects::new(),
            hint: None,
            events: Vec::new(),
        };
        game.set_level(0, false, true);
        game
    }

    /// Reconfigure for `level` and get ready for the first unit.
    pub fn set_level(&mut self, level: u32, practice: bool, hints_enabled: bool) {
        self.practice = practice;
        self.hints_enabled = hints_enabled;
        self.params = LevelParams::new(level, &self.settings, self.table.num_types());
        self.score.set_base(self.params.score_delta);
        self.matches_remaining = self.params.quota;
        self.events
            .push(GameEvent::MatchesRemainingChanged(self.matches_remaining));

        self.current = 0;
        for i in 0..2 {
            self.initialize_unit(i);
        }

        tracing::debug!(
            level,
            practice,
            hints_enabled,
            quota = self.params.quota,
            types = self.params.available_types,
            "level set"
        );

        self.set_state(BoardState::BeforeUnit);
        self.push_preview(self.current);
    }

    pub fn set_hints_enabled(&mut self, enabled: bool) {
        self.hints_enabled = enabled;
    }

    /// Score to zero, effects gone.
    pub fn reset(&mut self) {
        self.score.reset();
        self.effects.clear();
    }

    fn spawn_position(&self) -> CellPos {
        (self.grid.rows(), (self.grid.cols() - 1) / 2)
    }

    fn initialize_unit(&mut self, index: usize) {
        let spawn = self.spawn_position();
        self.units[index].initialize(
            spawn,
            self.params.available_types,
            self.settings.special_period,
            &self.table,
            &mut self.rng,
        );
    }

    fn set_state(&mut self, next: BoardState) {
        if next != self.state {
            tracing::debug!(from = self.state.as_str(), to = next.as_str(), "board state");
        }
        self.state = next;
        self.state_ms = 0;
    }

    fn glyph(&self, tile: Tile) -> char {
        self.table.glyph(tile.kind).unwrap_or('?')
    }

    fn push_preview(&mut self, index: usize) {
        let [left, right] = self.units[index].tiles();
        let (left, right) = (self.glyph(left), self.glyph(right));
        self.events.push(GameEvent::NextUnitPreview { left, right });
    }

    fn enter_unit_or_hint(&mut self) {
        if self.hints_enabled
            && self.settings.hint_period > 0
            && self.rng.one_in(self.settings.hint_period)
        {
            let [a, b] = self.units[self.current].tiles();
            if let Some(hint) = find_hint(&self.grid, &self.table, [a.kind, b.kind], &mut self.rng)
            {
                tracing::debug!(row = hint.row, col = hint.col, fact = hint.fact.0, "hint");
                self.effects
                    .push(Effect::hint(hint, self.settings.hint_hold_ms));
                self.hint = Some(hint);
                self.set_state(BoardState::Hint);
                return;
            }
        }
        self.enter_active_unit();
    }

    fn enter_active_unit(&mut self) {
        self.score.start_unit();
        self.hint = None;
        self.set_state(BoardState::ActiveUnit);
        self.push_preview(self.current ^ 1);
        self.events.push(GameEvent::UnitSpawned);
    }

    /// Refill the settled unit and bring the preview into play.
    fn advance_unit(&mut self) {
        self.initialize_unit(self.current);
        self.current ^= 1;
    }

    fn is_game_over(&self) -> bool {
        self.grid.top_blocked(self.spawn_position().1)
    }

    fn is_level_completed(&self) -> bool {
        !self.practice && self.matches_remaining == 0
    }

    fn start_dropping_hanging(&mut self) {
        self.gravity = GravityAnimation::start(&self.grid, &mut self.rng);
        self.set_state(BoardState::DroppingHanging);
    }

    /// Advance the simulation by `dt` milliseconds.
    pub fn tick(&mut self, dt: u32) {
        self.effects.step(dt);
        self.state_ms = self.state_ms.saturating_add(dt);

        match self.state {
            BoardState::BeforeUnit => self.enter_unit_or_hint(),

            BoardState::Hint => {
                if self.effects.hint().is_none() {
                    self.enter_active_unit();
                }
            }

            BoardState::ActiveUnit => {
                let unit = &mut self.units[self.current];
                unit.tick(dt, &mut self.grid);
                if !unit.is_active() {
                    self.on_unit_settled();
                }
            }

            BoardState::DroppingHanging => {
                if !self.gravity.step(dt, &self.grid) {
                    self.grid.compact();
                    debug_assert!(!self.grid.has_hanging());
                    if self.detect_matches().count > 0 {
                        self.set_state(BoardState::MatchFlares);
                    } else {
                        self.set_state(BoardState::WaitingForEffects);
                    }
                }
            }

            BoardState::MatchFlares => {
                if self.state_ms >= FLARE_MS {
                    self.resolve_matches();
                    self.set_state(BoardState::ResolvingMatches);
                }
            }

            BoardState::ResolvingMatches => {
                if self.state_ms >= self.settings.solve_ms {
                    if self.grid.has_hanging() {
                        self.start_dropping_hanging();
                    } else {
                        self.set_state(BoardState::WaitingForEffects);
                    }
                }
            }

            BoardState::WaitingForEffects => {
                if self.effects.is_empty() {
                    if self.is_game_over() {
                        self.set_state(BoardState::GameOver);
                    } else if self.is_level_completed() {
                        self.set_state(BoardState::LevelCompleted);
                    } else {
                        self.enter_unit_or_hint();
                    }
                }
            }

            BoardState::GameOver | BoardState::LevelCompleted => {}
        }
    }

    fn on_unit_settled(&mut self) {
        self.advance_unit();

        if self.grid.has_hanging() {
            self.start_dropping_hanging();
        } else if self.detect_matches().count > 0 {
            self.set_state(BoardState::MatchFlares);
        } else if self.is_game_over() {
            self.set_state(BoardState::WaitingForEffects);
        } else {
            self.enter_unit_or_hint();
        }
    }

    /// Rebuild the match bitmap from the grid and start the match effects.
    pub fn detect_matches(&mut self) -> MatchReport {
        self.matches = self.grid.find_matches(&self.table);
        let report = self.matches.report();
        if report.count == 0 {
            return report;
        }

        for hit in self.matches.hits() {
            let (r0, c0) = hit.first;
            let (r1, c1) = hit.second;
            let mid = ((r0 + r1) as f32 / 2.0, (c0 + c1) as f32 / 2.0);
            self.effects.push(Effect::match_info(hit.fact, mid));
        }
        for (r, c) in self.matches.matched_cells() {
            let pos = (r as f32, c as f32);
            if cell::is_special(self.grid.get(r, c)) {
                self.effects.push(Effect::special_burst(pos));
            }
            self.effects.push(Effect::explosion(pos, &mut self.rng));
        }

        tracing::debug!(hits = report.count, cells = report.cells, "matches found");
        report
    }

    /// Score the hits of the last detection pass and clear their cells.
    pub fn resolve_matches(&mut self) {
        let hits = self.matches.hits().to_vec();

        for hit in &hits {
            self.score.award();
            self.events.push(GameEvent::ScoreChanged(self.score.score()));

            if !self.practice {
                if self.matches_remaining > 0 {
                    self.matches_remaining -= 1;
                    self.events
                        .push(GameEvent::MatchesRemainingChanged(self.matches_remaining));
                }
                if let Some(count) = self.fact_hits.get_mut(hit.fact.0) {
                    *count += 1;
                }
            }
        }

        let cleared = self.grid.clear_matches(&self.matches);
        for c in &cleared {
            self.effects
                .push(Effect::dead_tile(c.value, (c.row as f32, c.col as f32)));
        }

        let combo = self.score.combo();
        if combo > 1 {
            let row = self.grid.rows() as f32 * 0.6;
            self.effects.push(Effect::combo(combo, (row, 0.0)));
        }

        tracing::debug!(
            hits = hits.len(),
            cleared = cleared.len(),
            combo,
            score = self.score.score(),
            "matches resolved"
        );

        self.matches = MatchSet::empty(self.grid.rows(), self.grid.cols());
    }

    pub fn press_left(&mut self) -> bool {
        match self.state {
            BoardState::ActiveUnit => self.units[self.current].request_move_left(&self.grid),
            _ => false,
        }
    }

    pub fn press_right(&mut self) -> bool {
        match self.state {
            BoardState::ActiveUnit => self.units[self.current].request_move_right(&self.grid),
            _ => false,
        }
    }

    /// Swap the unit's tiles, or close the hint card.
    pub fn press_up(&mut self) -> bool {
        match self.state {
            BoardState::ActiveUnit => self.units[self.current].request_swap(),
            BoardState::Hint => self.effects.hint_mut().is_some_and(Effect::dismiss),
            _ => false,
        }
    }

    /// Hard drop.
    pub fn press_down(&mut self) -> bool {
        if self.state != BoardState::ActiveUnit {
            return false;
        }
        let unit = &mut self.units[self.current];
        if !unit.request_drop_fast(&mut self.grid) {
            return false;
        }
        for trail in unit.take_trails() {
            self.effects.push(Effect::drop_trail(trail));
        }
        true
    }

    /// Apply a player command
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::MoveLeft => self.press_left(),
            GameAction::MoveRight => self.press_right(),
            GameAction::Swap => self.press_up(),
            GameAction::Drop => self.press_down(),
        }
    }

    /// Stop the unit in play and end the game.
    pub fn force_game_over(&mut self) {
        if self.state == BoardState::ActiveUnit {
            let unit = &mut self.units[self.current];
            let tiles = unit.tiles();
            let positions = unit.visual_positions();
            unit.deactivate();
            for (tile, pos) in tiles.iter().zip(positions) {
                self.effects.push(Effect::dead_tile(tile.cell(), pos));
            }
        }
        self.set_state(BoardState::GameOver);
    }

    /// Seed `row` from a glyph string. `*` marks the next glyph as special.
    ///
    /// Cells past the end of the string are left untouched; glyphs past the
    /// last column are ignored.
    pub fn set_row(&mut self, row: usize, glyphs: &str) -> Result<()> {
        if row >= self.grid.rows() {
            return Err(ConfigError::InvalidRow {
                row,
                rows: self.grid.rows(),
            });
        }

        let mut cells = Vec::with_capacity(self.grid.cols());
        let mut special = false;
        for ch in glyphs.chars() {
            if cells.len() == self.grid.cols() {
                break;
            }
            if ch == '*' {
                special = true;
                continue;
            }
            let kind = self
                .table
                .tile_type(ch)
                .ok_or(ConfigError::UnknownGlyph(ch))?;
            cells.push(cell::encode(kind, special));
            special = false;
        }

        for (col, value) in cells.into_iter().enumerate() {
            self.grid.set(row, col, value);
        }
        Ok(())
    }

    /// Replace the tiles of the unit in play.
    pub fn set_falling_tiles(&mut self, left: char, right: char) -> Result<()> {
        let left = self.table.tile_type(left).ok_or(ConfigError::UnknownGlyph(left))?;
        let right = self
            .table
            .tile_type(right)
            .ok_or(ConfigError::UnknownGlyph(right))?;
        self.units[self.current].set_tiles(Tile::new(left), Tile::new(right));
        Ok(())
    }

    /// Clear the grid and fill the bottom rows with random tiles.
    ///
    /// No tile pairs with its left neighbour or with the tile below it, so
    /// the filled rows start without matches.
    pub fn initialize_grid(&mut self, filled_rows: usize) {
        self.grid.clear();

        for r in 0..filled_rows.min(self.grid.rows()) {
            for c in 0..self.grid.cols() {
                let left = if c > 0 { self.grid.tile_type_at(r, c - 1) } else { None };
                let below = if r > 0 { self.grid.tile_type_at(r - 1, c) } else { None };

                let mut chosen = None;
                let mut seen = 0u32;
                for k in 0..self.params.available_types as u8 {
                    if left.is_some_and(|l| self.table.lookup(l, k).is_some()) {
                        continue;
                    }
                    if below.is_some_and(|b| self.table.lookup(k, b).is_some()) {
                        continue;
                    }
                    seen += 1;
                    if self.rng.one_in(seen) {
                        chosen = Some(k);
                    }
                }

                let Some(kind) = chosen else {
                    tracing::warn!(row = r, col = c, "no tile type fits, leaving cell empty");
                    continue;
                };
                let special = self.settings.special_period > 0
                    && self.rng.one_in(self.settings.special_period);
                self.grid.set(r, c, cell::encode(kind, special));
            }
        }
    }

    /// Drain queued events.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drain queued events into `listener`.
    pub fn dispatch_events(&mut self, listener: &mut dyn EventListener) {
        for event in self.take_events() {
            event.dispatch(listener);
        }
    }

    pub fn state(&self) -> BoardState {
        self.state
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> u32 {
        self.score.score()
    }

    pub fn combo_size(&self) -> u32 {
        self.score.combo()
    }

    pub fn matches_remaining(&self) -> u32 {
        self.matches_remaining
    }

    pub fn level(&self) -> u32 {
        self.params.level
    }

    pub fn is_practice(&self) -> bool {
        self.practice
    }

    pub fn hints_enabled(&self) -> bool {
        self.hints_enabled
    }

    pub fn current_unit(&self) -> &FallingUnit {
        &self.units[self.current]
    }

    /// The unit shown in the preview.
    pub fn next_unit(&self) -> &FallingUnit {
        &self.units[self.current ^ 1]
    }

    pub fn effects(&self) -> &Effects {
        &self.effects
    }

    pub fn hint(&self) -> Option<&Hint> {
        self.hint.as_ref()
    }

    pub fn gravity(&self) -> &GravityAnimation {
        &self.gravity
    }

    /// Matches of the last detection pass not yet resolved.
    pub fn matches(&self) -> &MatchSet {
        &self.matches
    }

    /// Times each fact was matched outside practice mode, indexed by fact.
    pub fn fact_hits(&self) -> &[u32] {
        &self.fact_hits
    }

    pub fn table(&self) -> &MatchTable {
        &self.table
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanji_cascade_types::ticks;

    fn game(seed: u64) -> GameState {
        let table = Arc::new(MatchTable::builtin().unwrap());
        let settings = GameSettings {
            special_period: 0,
            ..GameSettings::default()
        };
        let mut game = GameState::new(table, settings, GameRng::new(seed));
        game.set_level(0, false, false);
        game
    }

    #[test]
    fn test_before_unit_enters_active_unit() {
        let mut game = game(1);
        assert_eq!(game.state(), BoardState::BeforeUnit);
        game.tick(ticks(1));
        assert_eq!(game.state(), BoardState::ActiveUnit);

        let events = game.take_events();
        assert!(events.contains(&GameEvent::UnitSpawned));
        assert!(matches!(
            events.last(),
            Some(GameEvent::UnitSpawned)
        ));
    }

    #[test]
    fn test_presses_ignored_outside_active_unit() {
        let mut game = game(1);
        assert!(!game.press_left());
        assert!(!game.press_up());
        assert!(!game.press_down());
    }

    #[test]
    fn test_set_row_errors() {
        let mut game = game(1);
        assert!(matches!(
            game.set_row(10, "日本"),
            Err(ConfigError::InvalidRow { row: 10, rows: 10 })
        ));
        assert!(matches!(
            game.set_row(0, "日X"),
            Err(ConfigError::UnknownGlyph('X'))
        ));
        game.set_row(1, "*日本").unwrap();
        assert!(cell::is_special(game.grid().get(1, 0)));
        assert!(!cell::is_special(game.grid().get(1, 1)));
    }

    #[test]
    fn test_set_row_error_leaves_grid_untouched() {
        let mut game = game(1);
        game.set_row(0, "山川").unwrap();
        let before = game.grid().clone();

        assert!(matches!(
            game.set_row(0, "日?本"),
            Err(ConfigError::UnknownGlyph('?'))
        ));
        assert_eq!(game.grid(), &before);
    }

    #[test]
    #[should_panic(expected = "invalid game settings")]
    fn test_new_rejects_zero_columns() {
        let table = Arc::new(MatchTable::builtin().unwrap());
        let settings = GameSettings {
            cols: 0,
            ..GameSettings::default()
        };
        GameState::new(table, settings, GameRng::new(1));
    }

    #[test]
    fn test_force_game_over_spawns_dead_tiles() {
        let mut game = game(1);
        game.tick(ticks(1));
        game.force_game_over();
        assert_eq!(game.state(), BoardState::GameOver);
        assert!(!game.current_unit().is_active());
        assert_eq!(game.effects().len(), 2);
    }

    #[test]
    fn test_reset_clears_score_and_effects() {
        let mut game = game(1);
        game.tick(ticks(1));
        game.force_game_over();
        game.reset();
        assert_eq!(game.score(), 0);
        assert!(game.effects().is_empty());
    }
}
