//! Gravity animation for tiles left floating after a clear.
//!
//! Each floating tile gets a small random upward kick, then falls under
//! constant gravity. It collides with the settled part of its column and with
//! floating tiles listed before it in the same column, bouncing back at half
//! speed. A tile comes to rest once it is slow and close to its destination.
//! The grid itself is only compacted when the animation is over.
//!
//! Heights are in cells, speeds in cells per millisecond.

use crate::board::Grid;
use crate::rng::GameRng;
use kanji_cascade_types::{ticks, TICK_MS};

/// Gravity, in cells per tick squared.
const GRAVITY_PER_TICK2: f32 = 0.0125;
/// Largest initial upward speed, in cells per tick.
const MAX_KICK_PER_TICK: f32 = 0.26;
/// Bounce keeps this fraction of the impact speed.
const RESTITUTION: f32 = 0.5;
const REST_SPEED_PER_TICK: f32 = 0.03;
const REST_DISTANCE: f32 = 0.05;
/// Give up and snap everything after this long.
const MAX_DURATION_MS: u32 = ticks(150);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallingTile {
    pub col: usize,
    pub value: u8,
    /// Row the tile occupies in the grid until compaction.
    pub from_row: usize,
    pub height: f32,
    pub dest_height: f32,
    pub speed: f32,
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GravityAnimation {
    tiles: Vec<FallingTile>,
    elapsed: u32,
}

impl GravityAnimation {
    /// Collect every floating tile of `grid`.
    pub fn start(grid: &Grid, rng: &mut GameRng) -> Self {
        let max_kick = MAX_KICK_PER_TICK / TICK_MS as f32;
        let tiles = grid
            .hanging_tiles()
            .into_iter()
            .map(|((row, col), dest)| FallingTile {
                col,
                value: grid.get(row, col),
                from_row: row,
                height: row as f32,
                dest_height: dest as f32,
                speed: rng.gen_f32() * max_kick,
                active: true,
            })
            .collect();
        Self { tiles, elapsed: 0 }
    }

    /// Advance by `dt` ms. Returns true while any tile is still moving.
    pub fn step(&mut self, dt: u32, grid: &Grid) -> bool {
        self.elapsed += dt;
        if self.elapsed >= MAX_DURATION_MS {
            self.snap();
            return false;
        }

        let tick = TICK_MS as f32;
        let gravity = GRAVITY_PER_TICK2 / (tick * tick);
        let rest_speed = REST_SPEED_PER_TICK / tick;
        let dt = dt as f32;
        let mut moving = false;

        for i in 0..self.tiles.len() {
            if !self.tiles[i].active {
                continue;
            }
            moving = true;

            let col = self.tiles[i].col;
            let mut floor = grid.column_height(col) as f32;
            for below in &self.tiles[..i] {
                if below.col == col {
                    floor = floor.max(below.height + 1.0);
                }
            }

            let p = &mut self.tiles[i];
            p.height += dt * p.speed;
            p.speed -= dt * gravity;

            if p.height <= floor {
                p.height = floor;
                p.speed = RESTITUTION * p.speed.abs();
            }

            if p.speed.abs() < rest_speed && (p.height - p.dest_height).abs() < REST_DISTANCE {
                p.speed = 0.0;
                p.height = p.dest_height;
                p.active = false;
            }
        }

        moving
    }

    fn snap(&mut self) {
        for p in &mut self.tiles {
            p.height = p.dest_height;
            p.speed = 0.0;
            p.active = false;
        }
    }

    pub fn is_done(&self) -> bool {
        self.tiles.iter().all(|p| !p.active)
    }

    pub fn tiles(&self) -> &[FallingTile] {
        &self.tiles
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }
}
