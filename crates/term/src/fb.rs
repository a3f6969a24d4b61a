//! Framebuffer and style types for terminal rendering.
//!
//! Double-width glyphs take two cells: the glyph itself and a [`WIDE_TAIL`]
//! placeholder that the renderer never prints.

use unicode_width::UnicodeWidthChar;

/// Placeholder occupying the right half of a double-width glyph.
pub const WIDE_TAIL: char = '\0';

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Blend toward `other` by `t` in `0..=1`.
    pub fn mix(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb::new(lerp(self.r, other.r), lerp(self.g, other.g), lerp(self.b, other.b))
    }
}

/// Minimal per-cell styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellStyle {
    pub fg: Rgb,
    pub bg: Rgb,
    pub bold: bool,
    pub dim: bool,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            fg: Rgb::new(220, 220, 220),
            bg: Rgb::new(0, 0, 0),
            bold: false,
            dim: false,
        }
    }
}

impl CellStyle {
    pub const fn new(fg: Rgb, bg: Rgb) -> Self {
        Self {
            fg,
            bg,
            bold: false,
            dim: false,
        }
    }

    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub const fn dim(mut self) -> Self {
        self.dim = true;
        self
    }
}

/// A single terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: CellStyle,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            style: CellStyle::default(),
        }
    }
}

/// Terminal columns taken by `ch`: 2 for wide glyphs, else 1.
///
/// Zero-width and control characters still occupy a cell.
pub fn char_width(ch: char) -> u16 {
    match UnicodeWidthChar::width(ch) {
        Some(2) => 2,
        _ => 1,
    }
}

/// 2D framebuffer of styled character cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        let len = (width as usize) * (height as usize);
        Self {
            width,
            height,
            cells: vec![Cell::default(); len],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Resize, reusing the allocation when possible.
    pub fn resize(&mut self, width: u16, height: u16) {
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        self.cells
            .resize((width as usize) * (height as usize), Cell::default());
    }

    #[inline(always)]
    fn idx(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    pub fn get(&self, x: u16, y: u16) -> Option<Cell> {
        self.idx(x, y).map(|i| self.cells[i])
    }

    /// Cells of row `y`.
    pub fn row(&self, y: u16) -> &[Cell] {
        let w = self.width as usize;
        let start = (y.min(self.height) as usize) * w;
        &self.cells[start..(start + w).min(self.cells.len())]
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(i) = self.idx(x, y) {
            self.cells[i] = cell;
        }
    }

    pub fn clear(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    /// Blank the other half of a wide glyph that covers `(x, y)`.
    fn unpair(&mut self, x: u16, y: u16) {
        let Some(cell) = self.get(x, y) else {
            return;
        };
        let other = if cell.ch == WIDE_TAIL {
            x.checked_sub(1)
                .filter(|&hx| self.get(hx, y).is_some_and(|c| char_width(c.ch) == 2))
        } else if char_width(cell.ch) == 2 {
            Some(x + 1).filter(|&tx| self.get(tx, y).is_some_and(|c| c.ch == WIDE_TAIL))
        } else {
            None
        };
        if let Some(i) = other.and_then(|ox| self.idx(ox, y)) {
            self.cells[i].ch = ' ';
        }
    }

    /// Put a glyph of any width. Returns the columns used.
    ///
    /// A double-width glyph that would be cut by the right edge is replaced
    /// with a space. Overwriting half of a wide glyph blanks the other half.
    pub fn put_char(&mut self, x: u16, y: u16, ch: char, style: CellStyle) -> u16 {
        let w = char_width(ch);
        self.unpair(x, y);
        if w == 2 && x.saturating_add(1) < self.width {
            self.unpair(x + 1, y);
        }
        if w == 2 {
            if x.saturating_add(1) >= self.width {
                self.set(x, y, Cell { ch: ' ', style });
                return 1;
            }
            self.set(x, y, Cell { ch, style });
            self.set(x + 1, y, Cell { ch: WIDE_TAIL, style });
        } else {
            self.set(x, y, Cell { ch, style });
        }
        w
    }

    /// Put a string, clipped at the right edge. Returns the columns used.
    pub fn put_str(&mut self, x: u16, y: u16, s: &str, style: CellStyle) -> u16 {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            cx = cx.saturating_add(self.put_char(cx, y, ch, style));
        }
        cx - x
    }

    pub fn fill_rect(&mut self, x: u16, y: u16, w: u16, h: u16, ch: char, style: CellStyle) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x.saturating_add(dx), y.saturating_add(dy), Cell { ch, style });
            }
        }
    }
}

/// Columns `s` takes on screen.
pub fn str_width(s: &str) -> u16 {
    s.chars().map(char_width).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_width() {
        assert_eq!(char_width('A'), 1);
        assert_eq!(char_width('火'), 2);
        assert_eq!(char_width('か'), 2);
        assert_eq!(char_width('・'), 2);
        assert_eq!(char_width('│'), 1);
        assert_eq!(str_width("火山 volcano"), 12);
    }

    #[test]
    fn test_wide_glyph_takes_two_cells() {
        let mut fb = FrameBuffer::new(4, 1);
        let style = CellStyle::default();
        assert_eq!(fb.put_str(0, 0, "日A", style), 3);
        assert_eq!(fb.get(0, 0).unwrap().ch, '日');
        assert_eq!(fb.get(1, 0).unwrap().ch, WIDE_TAIL);
        assert_eq!(fb.get(2, 0).unwrap().ch, 'A');
    }

    #[test]
    fn test_wide_glyph_clipped_at_edge() {
        let mut fb = FrameBuffer::new(3, 1);
        let style = CellStyle::default();
        fb.put_str(0, 0, "A日本", style);
        assert_eq!(fb.get(1, 0).unwrap().ch, '日');
        assert_eq!(fb.get(2, 0).unwrap().ch, WIDE_TAIL);

        let mut fb = FrameBuffer::new(2, 1);
        fb.put_str(1, 0, "本", style);
        assert_eq!(fb.get(1, 0).unwrap().ch, ' ');
    }

    /// Columns the renderer would print for row `y`.
    fn printed_width(fb: &FrameBuffer, y: u16) -> u16 {
        fb.row(y)
            .iter()
            .filter(|c| c.ch != WIDE_TAIL)
            .map(|c| char_width(c.ch))
            .sum()
    }

    #[test]
    fn test_narrow_over_wide_tail_blanks_head() {
        let mut fb = FrameBuffer::new(4, 1);
        let style = CellStyle::default();
        fb.put_str(0, 0, "日本", style);
        fb.put_char(1, 0, 'x', style);
        assert_eq!(fb.get(0, 0).unwrap().ch, ' ');
        assert_eq!(fb.get(1, 0).unwrap().ch, 'x');
        assert_eq!(fb.get(2, 0).unwrap().ch, '本');
        assert_eq!(printed_width(&fb, 0), 4);
    }

    #[test]
    fn test_narrow_over_wide_head_blanks_tail() {
        let mut fb = FrameBuffer::new(4, 1);
        let style = CellStyle::default();
        fb.put_str(0, 0, "日本", style);
        fb.put_char(2, 0, 'x', style);
        assert_eq!(fb.get(2, 0).unwrap().ch, 'x');
        assert_eq!(fb.get(3, 0).unwrap().ch, ' ');
        assert_eq!(printed_width(&fb, 0), 4);
    }

    #[test]
    fn test_wide_straddling_two_wide_glyphs() {
        let mut fb = FrameBuffer::new(4, 1);
        let style = CellStyle::default();
        fb.put_str(0, 0, "日本", style);
        fb.put_char(1, 0, '火', style);
        let row: String = fb.row(0).iter().map(|c| c.ch).collect();
        assert_eq!(row, format!(" 火{WIDE_TAIL} "));
        assert_eq!(printed_width(&fb, 0), 4);
    }

    #[test]
    fn test_mix() {
        let black = Rgb::new(0, 0, 0);
        let white = Rgb::new(200, 100, 50);
        assert_eq!(black.mix(white, 0.5), Rgb::new(100, 50, 25));
        assert_eq!(black.mix(white, 2.0), white);
    }
}
