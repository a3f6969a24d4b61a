//! Falling unit module - the two-tile piece under player control
//!
//! A unit occupies `(row, col)` and `(row, col + 1)`. It spawns one row above
//! the grid and fades in while it takes its first step down. Every step down
//! is a `drop_anim_ms` animation; between steps the unit rests for
//! `fall_interval_ms`. When it rests on something and the countdown expires,
//! both tiles are written to the grid and the unit deactivates.
//!
//! Moves and swaps are short animations as well: a move shifts the unit one
//! column over `move_ms`, a swap rotates the two tiles around their midpoint
//! over `swap_ms` and only exchanges them when the rotation completes.

use std::f32::consts::PI;

use arrayvec::ArrayVec;

use crate::board::{CellPos, Grid};
use crate::match_table::MatchTable;
use crate::rng::GameRng;
use crate::settings::GameSettings;
use kanji_cascade_types::Tile;

/// Animation lengths used by a unit, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitTimings {
    pub fall_interval_ms: u32,
    pub drop_anim_ms: u32,
    pub move_ms: u32,
    pub swap_ms: u32,
}

impl From<&GameSettings> for UnitTimings {
    fn from(s: &GameSettings) -> Self {
        Self {
            fall_interval_ms: s.fall_interval_ms,
            drop_anim_ms: s.drop_anim_ms,
            move_ms: s.move_ms,
            swap_ms: s.swap_ms,
        }
    }
}

/// Path of a hard-dropped tile, for the trail effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTrail {
    pub tile: Tile,
    pub col: usize,
    pub from_row: usize,
    pub to_row: usize,
}

/// The player-controlled pair of tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct FallingUnit {
    timings: UnitTimings,
    tiles: [Tile; 2],
    row: usize,
    col: usize,
    active: bool,

    dropping: bool,
    moving: bool,
    swapping: bool,
    fading_in: bool,

    /// Remaining rest time before the next step down; may go negative.
    fall_countdown: i64,
    drop_elapsed: u32,
    move_elapsed: u32,
    move_dir: i8,
    swap_elapsed: u32,

    trails: ArrayVec<DropTrail, 2>,
}

impl FallingUnit {
    /// An inactive unit. Call [`initialize`](Self::initialize) before use.
    pub fn new(timings: UnitTimings) -> Self {
        Self {
            timings,
            tiles: [Tile::new(0); 2],
            row: 0,
            col: 0,
            active: false,
            dropping: false,
            moving: false,
            swapping: false,
            fading_in: false,
            fall_countdown: 0,
            drop_elapsed: 0,
            move_elapsed: 0,
            move_dir: 0,
            swap_elapsed: 0,
            trails: ArrayVec::new(),
        }
    }

    /// Draw new tiles and place the unit at `spawn`.
    ///
    /// The left tile is uniform over the first `available` tile types. The
    /// right tile is uniform over the types that pair with the left one in
    /// neither order, so a fresh unit never clears itself. One unit in
    /// `special_period` carries a special tile in a random slot; a period of
    /// zero disables special tiles.
    pub fn initialize(
        &mut self,
        spawn: CellPos,
        available: usize,
        special_period: u32,
        table: &MatchTable,
        rng: &mut GameRng,
    ) {
        let available = available.clamp(1, table.num_types().max(1));
        let first = rng.gen_range_usize(0..available) as u8;

        let mut second = None;
        let mut seen = 0u32;
        for k in 0..available as u8 {
            if table.related(first, k) {
                continue;
            }
            seen += 1;
            if rng.one_in(seen) {
                second = Some(k);
            }
        }
        debug_assert!(second.is_some(), "tile type {first} pairs with every available type");
        let second = second.unwrap_or(first);

        let mut tiles = [Tile::new(first), Tile::new(second)];
        if special_period > 0 && rng.one_in(special_period) {
            tiles[rng.gen_range_usize(0..2)].special = true;
        }

        *self = Self {
            tiles,
            row: spawn.0,
            col: spawn.1,
            active: true,
            dropping: true,
            fading_in: true,
            fall_countdown: self.timings.fall_interval_ms as i64,
            ..Self::new(self.timings)
        };
    }

    pub fn tiles(&self) -> [Tile; 2] {
        self.tiles
    }

    /// Replace both tiles, keeping position and phase.
    pub fn set_tiles(&mut self, left: Tile, right: Tile) {
        self.tiles = [left, right];
    }

    pub fn position(&self) -> CellPos {
        (self.row, self.col)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_dropping(&self) -> bool {
        self.dropping
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn is_swapping(&self) -> bool {
        self.swapping
    }

    pub fn is_fading_in(&self) -> bool {
        self.fading_in
    }

    /// Stop without committing anything to the grid.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Row the unit is sliding through while moving sideways.
    fn scan_row(&self) -> usize {
        if self.dropping {
            self.row.saturating_sub(1)
        } else {
            self.row
        }
    }

    fn can_slide(&self) -> bool {
        self.active && !self.moving && !self.swapping
    }

    pub fn request_move_left(&mut self, grid: &Grid) -> bool {
        if !self.can_slide() {
            return false;
        }
        if self.col > 0 && grid.is_empty_at(self.scan_row(), self.col - 1) {
            self.start_move(-1);
        }
        true
    }

    pub fn request_move_right(&mut self, grid: &Grid) -> bool {
        if !self.can_slide() {
            return false;
        }
        if self.col + 2 < grid.cols() && grid.is_empty_at(self.scan_row(), self.col + 2) {
            self.start_move(1);
        }
        true
    }

    fn start_move(&mut self, dir: i8) {
        self.moving = true;
        self.move_dir = dir;
        self.move_elapsed = 0;
    }

    pub fn request_swap(&mut self) -> bool {
        if !self.active || self.swapping || self.moving {
            return false;
        }
        self.swapping = true;
        self.swap_elapsed = 0;
        true
    }

    /// Hard drop: each column falls on its own and commits at once.
    pub fn request_drop_fast(&mut self, grid: &mut Grid) -> bool {
        if !self.active || self.fading_in {
            return false;
        }

        self.trails.clear();
        for (i, tile) in self.tiles.iter().enumerate() {
            let col = self.col + i;
            let mut r = self.row;
            while r > 0 && grid.is_empty_at(r - 1, col) {
                r -= 1;
            }
            grid.set(r, col, tile.cell());
            self.trails.push(DropTrail {
                tile: *tile,
                col,
                from_row: self.row,
                to_row: r,
            });
        }

        self.active = false;
        true
    }

    /// Trails recorded by the last hard drop.
    pub fn take_trails(&mut self) -> ArrayVec<DropTrail, 2> {
        std::mem::take(&mut self.trails)
    }

    /// True if both cells under the unit are free.
    pub fn can_fall(&self, grid: &Grid) -> bool {
        self.row > 0
            && grid.is_empty_at(self.row - 1, self.col)
            && grid.is_empty_at(self.row - 1, self.col + 1)
    }

    /// Advance the unit's animations by `dt` milliseconds.
    pub fn tick(&mut self, dt: u32, grid: &mut Grid) {
        if !self.active {
            return;
        }

        self.fall_countdown -= dt as i64;

        if self.swapping {
            self.swap_elapsed += dt;
            if self.swap_elapsed >= self.timings.swap_ms {
                self.tiles.swap(0, 1);
                self.swapping = false;
            }
        }

        if self.moving {
            self.move_elapsed += dt;
            if self.move_elapsed >= self.timings.move_ms {
                self.col = self.col.saturating_add_signed(self.move_dir as isize);
                self.moving = false;
            }
        }

        if self.dropping {
            self.drop_elapsed += dt;
            if self.drop_elapsed >= self.timings.drop_anim_ms {
                self.row -= 1;
                self.fall_countdown = self.timings.fall_interval_ms as i64;
                self.dropping = false;
                self.fading_in = false;
            }
        }

        if !self.dropping && !self.moving && self.fall_countdown <= 0 {
            if self.can_fall(grid) {
                self.dropping = true;
                self.drop_elapsed = 0;
            } else {
                self.settle(grid);
            }
        }
    }

    fn settle(&mut self, grid: &mut Grid) {
        debug_assert!(grid.is_empty_at(self.row, self.col));
        debug_assert!(grid.is_empty_at(self.row, self.col + 1));
        grid.set(self.row, self.col, self.tiles[0].cell());
        grid.set(self.row, self.col + 1, self.tiles[1].cell());
        self.active = false;
    }

    fn progress(elapsed: u32, total: u32) -> f32 {
        (elapsed as f32 / total.max(1) as f32).min(1.0)
    }

    /// On-screen `(row, col)` of both tiles in fractional cells.
    pub fn visual_positions(&self) -> [(f32, f32); 2] {
        let mut y = self.row as f32;
        let mut x = self.col as f32;

        if self.dropping {
            y -= Self::progress(self.drop_elapsed, self.timings.drop_anim_ms);
        }
        if self.moving {
            x += Self::progress(self.move_elapsed, self.timings.move_ms) * self.move_dir as f32;
        }

        if self.swapping {
            let a = PI * Self::progress(self.swap_elapsed, self.timings.swap_ms);
            let (s, c) = (0.5 * a.sin(), 0.5 * a.cos());
            [(y - s, x + 0.5 - c), (y + s, x + 0.5 + c)]
        } else {
            [(y, x), (y, x + 1.0)]
        }
    }

    /// Opacity: ramps up during the first step down.
    pub fn alpha(&self) -> f32 {
        if self.fading_in {
            Self::progress(self.drop_elapsed, self.timings.drop_anim_ms)
        } else {
            1.0
        }
    }

    /// Rows each tile would land on if dropped now.
    pub fn landing_rows(&self, grid: &Grid) -> [usize; 2] {
        let mut out = [self.row; 2];
        for (i, r) in out.iter_mut().enumerate() {
            while *r > 0 && grid.is_empty_at(*r - 1, self.col + i) {
                *r -= 1;
            }
        }
        out
    }
}
