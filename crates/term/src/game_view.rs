//! GameView: maps `core::GameState` into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.
//!
//! The frame holds one lane above the grid where a new unit appears, then the
//! grid rows top to bottom. Each board cell is two terminal columns wide.

use std::collections::HashSet;

use crate::core::effects::EffectKind;
use crate::core::{GameState, MatchTable};
use crate::fb::{str_width, CellStyle, FrameBuffer, Rgb};
use crate::types::{cell, BoardState};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

const CELL_W: u16 = 2;

const BOARD_BG: Rgb = Rgb::new(30, 30, 40);
const SCREEN_BG: Rgb = Rgb::new(0, 0, 0);
const FLARE_BG: Rgb = Rgb::new(200, 170, 60);
const BURST_BG: Rgb = Rgb::new(240, 120, 40);
const HINT_BG: Rgb = Rgb::new(60, 110, 90);
const SPECIAL_BG: Rgb = Rgb::new(90, 40, 90);

const PALETTE: [Rgb; 9] = [
    Rgb::new(80, 220, 220),
    Rgb::new(240, 220, 80),
    Rgb::new(200, 120, 220),
    Rgb::new(100, 220, 120),
    Rgb::new(230, 90, 90),
    Rgb::new(110, 150, 240),
    Rgb::new(255, 165, 0),
    Rgb::new(220, 220, 220),
    Rgb::new(170, 200, 120),
];

/// Board geometry on screen.
#[derive(Debug, Clone, Copy)]
struct Layout {
    start_x: u16,
    start_y: u16,
    frame_w: u16,
    frame_h: u16,
    rows: usize,
    cols: usize,
}

impl Layout {
    /// Screen position of board `(row, col)`; row `rows` is the spawn lane.
    fn cell_xy(&self, row: usize, col: usize) -> Option<(u16, u16)> {
        if row > self.rows || col >= self.cols {
            return None;
        }
        let x = self.start_x + 1 + col as u16 * CELL_W;
        let y = self.start_y + 1 + (self.rows - row) as u16;
        Some((x, y))
    }

    /// Nearest cell for a fractional `(row, col)`.
    fn nearest(&self, pos: (f32, f32)) -> Option<(u16, u16)> {
        let (r, c) = (pos.0.round(), pos.1.round());
        if r < 0.0 || c < 0.0 {
            return None;
        }
        self.cell_xy(r as usize, c as usize)
    }
}

/// A lightweight terminal renderer for the board.
#[derive(Debug, Clone)]
pub struct GameView {
    show_ghost: bool,
}

impl Default for GameView {
    fn default() -> Self {
        Self::new()
    }
}

impl GameView {
    pub fn new() -> Self {
        Self { show_ghost: true }
    }

    /// Toggle the landing shadow of the falling unit.
    pub fn with_ghost(mut self, show_ghost: bool) -> Self {
        self.show_ghost = show_ghost;
        self
    }

    /// Render the board into an existing framebuffer.
    pub fn render_into(&self, game: &GameState, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(Default::default());

        let grid = game.grid();
        let (rows, cols) = (grid.rows(), grid.cols());
        let frame_w = cols as u16 * CELL_W + 2;
        let frame_h = rows as u16 + 3;
        let layout = Layout {
            start_x: viewport.width.saturating_sub(frame_w + PANEL_W) / 2,
            start_y: viewport.height.saturating_sub(frame_h) / 2,
            frame_w,
            frame_h,
            rows,
            cols,
        };

        let bg = CellStyle::new(Rgb::new(80, 80, 90), BOARD_BG).dim();
        fb.fill_rect(layout.start_x + 1, layout.start_y + 1, frame_w - 2, frame_h - 2, ' ', bg);
        for row in 0..rows {
            for col in 0..cols {
                if let Some((x, y)) = layout.cell_xy(row, col) {
                    fb.put_str(x, y, "・", bg);
                }
            }
        }
        draw_border(fb, layout.start_x, layout.start_y, frame_w, frame_h);

        self.draw_grid(fb, game, &layout);
        self.draw_effects_below(fb, game, &layout);
        if self.show_ghost {
            self.draw_ghost(fb, game, &layout);
        }
        self.draw_unit(fb, game, &layout);
        self.draw_effects_above(fb, game, &layout);

        self.draw_side_panel(fb, game, viewport, &layout);

        match game.state() {
            BoardState::GameOver => draw_overlay_text(fb, &layout, "GAME OVER"),
            BoardState::LevelCompleted => draw_overlay_text(fb, &layout, "LEVEL COMPLETE"),
            _ => {}
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, game: &GameState, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(game, viewport, &mut fb);
        fb
    }

    fn draw_grid(&self, fb: &mut FrameBuffer, game: &GameState, layout: &Layout) {
        let grid = game.grid();
        let table = game.table();
        let flaring = game.state() == BoardState::MatchFlares;

        // Tiles under the gravity animation are drawn where they are, not
        // where the grid still holds them.
        let mut airborne = HashSet::new();
        if game.state() == BoardState::DroppingHanging {
            for p in game.gravity().tiles() {
                airborne.insert((p.from_row, p.col));
                let row = p.height.round().max(0.0) as usize;
                if let Some((x, y)) = layout.cell_xy(row, p.col) {
                    put_tile(fb, x, y, table, p.value, None, 1.0);
                }
            }
        }

        for row in 0..grid.rows() {
            for col in 0..grid.cols() {
                let value = grid.get(row, col);
                if cell::is_empty(value) || airborne.contains(&(row, col)) {
                    continue;
                }
                let Some((x, y)) = layout.cell_xy(row, col) else {
                    continue;
                };
                let highlight = (flaring && game.matches().is_matched(row, col)).then_some(FLARE_BG);
                put_tile(fb, x, y, table, value, highlight, 1.0);
            }
        }
    }

    fn draw_ghost(&self, fb: &mut FrameBuffer, game: &GameState, layout: &Layout) {
        let unit = game.current_unit();
        if game.state() != BoardState::ActiveUnit || !unit.is_active() || unit.is_swapping() {
            return;
        }
        let (row, col) = unit.position();
        let landing = unit.landing_rows(game.grid());
        for (i, tile) in unit.tiles().iter().enumerate() {
            if landing[i] >= row {
                continue;
            }
            if let Some((x, y)) = layout.cell_xy(landing[i], col + i) {
                let fg = tile_color(tile.kind).mix(BOARD_BG, 0.6);
                if let Some(glyph) = game.table().glyph(tile.kind) {
                    fb.put_char(x, y, glyph, CellStyle::new(fg, BOARD_BG).dim());
                }
            }
        }
    }

    fn draw_unit(&self, fb: &mut FrameBuffer, game: &GameState, layout: &Layout) {
        let unit = game.current_unit();
        if game.state() != BoardState::ActiveUnit || !unit.is_active() {
            return;
        }
        let alpha = unit.alpha();
        for (tile, pos) in unit.tiles().iter().zip(unit.visual_positions()) {
            if let Some((x, y)) = layout.nearest(pos) {
                put_tile(fb, x, y, game.table(), tile.cell(), None, alpha);
            }
        }
    }

    /// Trails, dead tiles and the hint target sit under the falling unit.
    fn draw_effects_below(&self, fb: &mut FrameBuffer, game: &GameState, layout: &Layout) {
        let grid = game.grid();
        for effect in game.effects().iter() {
            let alpha = effect.alpha();
            match effect.kind() {
                EffectKind::DropTrail(trail) => {
                    let fg = tile_color(trail.tile.kind).mix(BOARD_BG, 1.0 - alpha);
                    for row in trail.to_row + 1..trail.from_row {
                        if !grid.is_empty_at(row, trail.col) {
                            continue;
                        }
                        if let Some((x, y)) = layout.cell_xy(row, trail.col) {
                            fb.put_str(x, y, "││", CellStyle::new(fg, BOARD_BG).dim());
                        }
                    }
                }
                EffectKind::DeadTile { value } => {
                    let (r, c) = effect.position();
                    let occupied = r >= 0.0
                        && c >= 0.0
                        && !grid.is_empty_at(r.round() as usize, c.round() as usize);
                    if occupied {
                        continue;
                    }
                    if let Some((x, y)) = layout.nearest(effect.position()) {
                        put_tile(fb, x, y, game.table(), *value, None, alpha * 0.6);
                    }
                }
                EffectKind::Hint { hint, .. } => {
                    let bg = BOARD_BG.mix(HINT_BG, alpha);
                    if let Some((x, y)) = layout.cell_xy(hint.match_row, hint.match_col) {
                        let value = grid.get(hint.match_row, hint.match_col);
                        put_tile(fb, x, y, game.table(), value, Some(bg), 1.0);
                    }
                    if let Some((x, y)) = layout.cell_xy(hint.row, hint.col) {
                        let value = cell::encode(hint.tile, false);
                        put_tile(fb, x, y, game.table(), value, Some(bg), alpha);
                    }
                }
                _ => {}
            }
        }
    }

    fn draw_effects_above(&self, fb: &mut FrameBuffer, game: &GameState, layout: &Layout) {
        for effect in game.effects().iter() {
            let alpha = effect.alpha();
            let Some((x, y)) = layout.nearest(effect.position()) else {
                continue;
            };
            match effect.kind() {
                EffectKind::Explosion | EffectKind::SpecialBurst => {
                    let color = if matches!(effect.kind(), EffectKind::SpecialBurst) {
                        BURST_BG
                    } else {
                        FLARE_BG
                    };
                    let Some(cell) = fb.get(x, y) else {
                        continue;
                    };
                    let style = CellStyle {
                        bg: cell.style.bg.mix(color, alpha * 0.7),
                        ..cell.style
                    };
                    if cell.ch == ' ' || cell.ch == '・' {
                        fb.put_str(x, y, "**", style);
                    } else {
                        fb.put_char(x, y, cell.ch, style);
                    }
                }
                EffectKind::Combo { size } => {
                    let label = format!("{size} COMBO");
                    let fg = Rgb::new(255, 230, 120).mix(BOARD_BG, 1.0 - alpha);
                    let x = layout.start_x + (layout.frame_w.saturating_sub(str_width(&label))) / 2;
                    fb.put_str(x, y, &label, CellStyle::new(fg, BOARD_BG).bold());
                }
                _ => {}
            }
        }
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        game: &GameState,
        viewport: Viewport,
        layout: &Layout,
    ) {
        let panel_x = layout.start_x.saturating_add(layout.frame_w).saturating_add(2);
        if panel_x >= viewport.width || viewport.width - panel_x < 12 {
            return;
        }

        let label = CellStyle::new(Rgb::new(220, 220, 220), SCREEN_BG).bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), SCREEN_BG);
        let dim = value.dim();
        let table = game.table();

        let mut y = layout.start_y;
        let field = |fb: &mut FrameBuffer, y: &mut u16, name: &str, text: &str| {
            fb.put_str(panel_x, *y, name, label);
            fb.put_str(panel_x, *y + 1, text, value);
            *y += 3;
        };

        field(fb, &mut y, "SCORE", &game.score().to_string());
        let level = if game.is_practice() {
            format!("{} (practice)", game.level() + 1)
        } else {
            (game.level() + 1).to_string()
        };
        field(fb, &mut y, "LEVEL", &level);
        if !game.is_practice() {
            field(fb, &mut y, "REMAINING", &game.matches_remaining().to_string());
        }

        fb.put_str(panel_x, y, "NEXT", label);
        let mut x = panel_x;
        for tile in game.next_unit().tiles() {
            let w = put_tile(fb, x, y + 1, table, tile.cell(), None, 1.0);
            x += w;
        }
        y += 3;

        let hint_fact = game
            .effects()
            .hint()
            .and(game.hint())
            .and_then(|hint| table.fact(hint.fact));
        if let Some(fact) = hint_fact {
            fb.put_str(panel_x, y, "HINT", label);
            fb.put_str(panel_x, y + 1, &fact_line(&fact.glyphs(), &fact.reading), value);
            fb.put_str(panel_x, y + 2, &fact.meaning, dim);
            fb.put_str(panel_x, y + 3, "press up to play", dim);
            y += 5;
        }

        let cards: Vec<_> = game
            .effects()
            .iter()
            .filter_map(|e| match e.kind() {
                EffectKind::MatchInfo { fact } => table.fact(*fact).map(|f| (f, e.alpha())),
                _ => None,
            })
            .collect();
        if cards.is_empty() {
            return;
        }
        fb.put_str(panel_x, y, "MATCHES", label);
        y += 1;
        for (fact, alpha) in cards {
            if y + 1 >= viewport.height {
                break;
            }
            let fg = Rgb::new(200, 200, 200).mix(SCREEN_BG, 1.0 - alpha);
            let style = CellStyle::new(fg, SCREEN_BG);
            fb.put_str(panel_x, y, &fact_line(&fact.glyphs(), &fact.reading), style);
            fb.put_str(panel_x + 2, y + 1, &fact.meaning, style.dim());
            y += 2;
        }
    }
}

/// Width reserved right of the board for the side panel when centering.
const PANEL_W: u16 = 24;

fn fact_line(glyphs: &str, reading: &str) -> String {
    format!("{glyphs} {reading}")
}

fn tile_color(kind: u8) -> Rgb {
    PALETTE[kind as usize % PALETTE.len()]
}

/// Draw one tile faded toward the board by `alpha`. Returns columns used.
fn put_tile(
    fb: &mut FrameBuffer,
    x: u16,
    y: u16,
    table: &MatchTable,
    value: u8,
    bg: Option<Rgb>,
    alpha: f32,
) -> u16 {
    let Some(kind) = cell::tile_type(value) else {
        return 0;
    };
    let bg = bg.unwrap_or(if cell::is_special(value) { SPECIAL_BG } else { BOARD_BG });
    let fg = tile_color(kind).mix(bg, 1.0 - alpha);
    let mut style = CellStyle::new(fg, bg);
    if cell::is_special(value) {
        style = style.bold();
    }
    match table.glyph(kind) {
        Some(glyph) => {
            let w = fb.put_char(x, y, glyph, style);
            if w < CELL_W {
                fb.put_char(x + w, y, ' ', style);
            }
            CELL_W
        }
        None => fb.put_str(x, y, "??", style),
    }
}

fn draw_border(fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16) {
    if w < 2 || h < 2 {
        return;
    }
    let style = CellStyle::new(Rgb::new(200, 200, 200), SCREEN_BG);

    fb.put_char(x, y, '┌', style);
    fb.put_char(x + w - 1, y, '┐', style);
    fb.put_char(x, y + h - 1, '└', style);
    fb.put_char(x + w - 1, y + h - 1, '┘', style);

    for dx in 1..w - 1 {
        fb.put_char(x + dx, y, '─', style);
        fb.put_char(x + dx, y + h - 1, '─', style);
    }
    for dy in 1..h - 1 {
        fb.put_char(x, y + dy, '│', style);
        fb.put_char(x + w - 1, y + dy, '│', style);
    }
}

fn draw_overlay_text(fb: &mut FrameBuffer, layout: &Layout, text: &str) {
    let mid_y = layout.start_y.saturating_add(layout.frame_h / 2);
    let x = layout
        .start_x
        .saturating_add(layout.frame_w.saturating_sub(str_width(text)) / 2);
    let style = CellStyle::new(Rgb::new(255, 255, 255), SCREEN_BG).bold();
    fb.put_str(x, mid_y, text, style);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::{GameRng, GameSettings};
    use crate::types::TICK_MS;

    fn game() -> GameState {
        let table = Arc::new(MatchTable::builtin().unwrap());
        let settings = GameSettings {
            special_period: 0,
            ..GameSettings::default()
        };
        let mut game = GameState::new(table, settings, GameRng::new(3));
        game.set_level(0, false, false);
        game
    }

    fn row_text(fb: &FrameBuffer, y: u16) -> String {
        fb.row(y)
            .iter()
            .filter(|c| c.ch != crate::fb::WIDE_TAIL)
            .map(|c| c.ch)
            .collect()
    }

    fn screen_text(fb: &FrameBuffer) -> String {
        (0..fb.height()).map(|y| row_text(fb, y) + "\n").collect()
    }

    #[test]
    fn renders_grid_tiles_bottom_up() {
        let mut game = game();
        game.set_row(0, "日本").unwrap();
        let view = GameView::new();
        let fb = view.render(&game, Viewport::new(60, 20));

        // The bottom grid row sits just above the lower border.
        let text = screen_text(&fb);
        let lines: Vec<&str> = text.lines().collect();
        let bottom = lines.iter().position(|l| l.contains('└')).unwrap();
        assert!(lines[bottom - 1].contains("日本"));
    }

    #[test]
    fn renders_side_panel_and_next_unit() {
        let game = game();
        let fb = GameView::new().render(&game, Viewport::new(60, 20));
        let text = screen_text(&fb);
        assert!(text.contains("SCORE"));
        assert!(text.contains("REMAINING"));
        assert!(text.contains("NEXT"));

        let [a, b] = game.next_unit().tiles();
        let glyph = game.table().glyph(a.kind).unwrap();
        assert!(text.contains(glyph));
        let glyph = game.table().glyph(b.kind).unwrap();
        assert!(text.contains(glyph));
    }

    #[test]
    fn renders_falling_unit_in_spawn_lane() {
        let mut game = game();
        game.tick(TICK_MS);
        game.set_falling_tiles('日', '本').unwrap();
        let fb = GameView::new().render(&game, Viewport::new(60, 20));
        let text = screen_text(&fb);
        let lines: Vec<&str> = text.lines().collect();
        let top = lines.iter().position(|l| l.contains('┌')).unwrap();
        assert!(lines[top + 1].contains("日本"));
    }

    #[test]
    fn ghost_marks_landing_row_unless_disabled() {
        let mut game = game();
        game.tick(TICK_MS);
        game.set_falling_tiles('日', '本').unwrap();

        let bottom_line = |view: GameView| {
            let text = screen_text(&view.render(&game, Viewport::new(60, 20)));
            let lines: Vec<String> = text.lines().map(str::to_owned).collect();
            let bottom = lines.iter().position(|l| l.contains('└')).unwrap();
            lines[bottom - 1].clone()
        };

        assert!(bottom_line(GameView::new()).contains("日本"));
        assert!(!bottom_line(GameView::new().with_ghost(false)).contains('日'));
    }

    #[test]
    fn renders_game_over_overlay() {
        let mut game = game();
        game.tick(TICK_MS);
        game.force_game_over();
        let fb = GameView::new().render(&game, Viewport::new(60, 20));
        assert!(screen_text(&fb).contains("GAME OVER"));
    }

    #[test]
    fn tiny_viewport_does_not_panic() {
        let mut game = game();
        game.set_row(0, "日本").unwrap();
        let view = GameView::new();
        for (w, h) in [(0, 0), (1, 1), (5, 3), (14, 13)] {
            let fb = view.render(&game, Viewport::new(w, h));
            assert_eq!((fb.width(), fb.height()), (w, h));
        }
    }
}
