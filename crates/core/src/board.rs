//! Board module - the grid of settled tiles
//!
//! The grid is `rows × cols` cells stored in a flat row-major `Vec<u8>`.
//! Row 0 is the bottom row. Reads outside the grid return an empty cell, so
//! the falling unit can probe the row above the top without special cases.
//!
//! Match detection lives here as well: [`Grid::find_matches`] scans rows
//! bottom to top, columns left to right, and tests each occupied cell against
//! its right neighbour `(this, right)` and the cell above it `(upper, this)`.

use crate::dataset::FactId;
use crate::match_table::MatchTable;
use kanji_cascade_types::cell;

/// A `(row, col)` grid coordinate.
pub type CellPos = (usize, usize);

/// Two touching cells that form a pairing fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchHit {
    pub fact: FactId,
    /// First glyph of the fact: the left cell, or the upper cell.
    pub first: CellPos,
    pub second: CellPos,
}

impl MatchHit {
    pub fn is_horizontal(&self) -> bool {
        self.first.0 == self.second.0
    }
}

/// Result of one detection pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSet {
    cols: usize,
    bitmap: Vec<bool>,
    hits: Vec<MatchHit>,
}

impl MatchSet {
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            cols,
            bitmap: vec![false; rows * cols],
            hits: Vec::new(),
        }
    }

    /// Hits in detection order.
    pub fn hits(&self) -> &[MatchHit] {
        &self.hits
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// True if the cell takes part in at least one hit.
    pub fn is_matched(&self, row: usize, col: usize) -> bool {
        col < self.cols && self.bitmap.get(row * self.cols + col).copied().unwrap_or(false)
    }

    /// Matched cells, bottom row first.
    pub fn matched_cells(&self) -> impl Iterator<Item = CellPos> + '_ {
        let cols = self.cols;
        self.bitmap
            .iter()
            .enumerate()
            .filter(|(_, &m)| m)
            .map(move |(i, _)| (i / cols, i % cols))
    }

    fn mark(&mut self, hit: MatchHit) {
        for (r, c) in [hit.first, hit.second] {
            self.bitmap[r * self.cols + c] = true;
        }
        self.hits.push(hit);
    }
}

/// Counts reported by a detection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchReport {
    /// Number of pairing hits.
    pub count: usize,
    /// Number of distinct matched cells.
    pub cells: usize,
}

/// A cell removed from the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearedCell {
    pub row: usize,
    pub col: usize,
    pub value: u8,
}

/// The grid of settled tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
}

impl Grid {
    /// Create an empty grid.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![cell::EMPTY; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline(always)]
    fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.rows && col < self.cols {
            Some(row * self.cols + col)
        } else {
            None
        }
    }

    /// Cell value at `(row, col)`; empty outside the grid.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.index(row, col)
            .map(|i| self.cells[i])
            .unwrap_or(cell::EMPTY)
    }

    /// Set a cell. Returns false if out of bounds.
    pub fn set(&mut self, row: usize, col: usize, value: u8) -> bool {
        match self.index(row, col) {
            Some(i) => {
                self.cells[i] = value;
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn is_empty_at(&self, row: usize, col: usize) -> bool {
        cell::is_empty(self.get(row, col))
    }

    /// Tile type at `(row, col)`, ignoring the special flag.
    #[inline]
    pub fn tile_type_at(&self, row: usize, col: usize) -> Option<u8> {
        cell::tile_type(self.get(row, col))
    }

    pub fn clear(&mut self) {
        self.cells.fill(cell::EMPTY);
    }

    /// Raw cells, row-major, bottom row first.
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Cells of one row.
    pub fn row(&self, row: usize) -> &[u8] {
        let start = row.min(self.rows) * self.cols;
        let end = (start + self.cols).min(self.cells.len());
        &self.cells[start..end]
    }

    /// Number of occupied cells stacked from the bottom without a gap.
    pub fn column_height(&self, col: usize) -> usize {
        (0..self.rows)
            .find(|&r| self.is_empty_at(r, col))
            .unwrap_or(self.rows)
    }

    /// True if any occupied cell has an empty cell directly below it.
    pub fn has_hanging(&self) -> bool {
        (1..self.rows).any(|r| {
            (0..self.cols).any(|c| !self.is_empty_at(r, c) && self.is_empty_at(r - 1, c))
        })
    }

    /// Occupied cells above the first gap of their column, with their final row.
    ///
    /// Ordered by column, then bottom to top.
    pub fn hanging_tiles(&self) -> Vec<(CellPos, usize)> {
        let mut out = Vec::new();
        for c in 0..self.cols {
            let mut gap = false;
            let mut dest = 0;
            for r in 0..self.rows {
                if self.is_empty_at(r, c) {
                    gap = true;
                } else {
                    if gap {
                        out.push(((r, c), dest));
                    }
                    dest += 1;
                }
            }
        }
        out
    }

    /// Let every column settle: occupied cells slide down over the gaps.
    pub fn compact(&mut self) {
        for c in 0..self.cols {
            let mut write = 0;
            for r in 0..self.rows {
                let v = self.get(r, c);
                if !cell::is_empty(v) {
                    if r != write {
                        self.set(write, c, v);
                        self.set(r, c, cell::EMPTY);
                    }
                    write += 1;
                }
            }
        }
    }

    /// True if the top row is occupied at `col` or `col + 1`.
    pub fn top_blocked(&self, col: usize) -> bool {
        let top = self.rows - 1;
        !self.is_empty_at(top, col) || !self.is_empty_at(top, col + 1)
    }

    /// Find every pairing among touching tiles.
    pub fn find_matches(&self, table: &MatchTable) -> MatchSet {
        let mut set = MatchSet::empty(self.rows, self.cols);

        for r in 0..self.rows {
            for c in 0..self.cols {
                let Some(this) = self.tile_type_at(r, c) else {
                    continue;
                };

                if let Some(right) = self.tile_type_at(r, c + 1) {
                    if let Some(fact) = table.lookup(this, right) {
                        set.mark(MatchHit {
                            fact,
                            first: (r, c),
                            second: (r, c + 1),
                        });
                    }
                }

                if let Some(upper) = self.tile_type_at(r + 1, c) {
                    if let Some(fact) = table.lookup(upper, this) {
                        set.mark(MatchHit {
                            fact,
                            first: (r + 1, c),
                            second: (r, c),
                        });
                    }
                }
            }
        }

        set
    }

    /// Remove the matched cells of `set`.
    ///
    /// A matched special tile takes every cell of its base type with it,
    /// wherever that cell is on the grid.
    pub fn clear_matches(&mut self, set: &MatchSet) -> Vec<ClearedCell> {
        let mut cleared = Vec::new();

        for (r, c) in set.matched_cells() {
            let value = self.get(r, c);
            if cell::is_empty(value) {
                // Already taken out by a special tile.
                continue;
            }

            if cell::is_special(value) {
                let base = cell::base(value);
                for i in 0..self.cells.len() {
                    let v = self.cells[i];
                    if !cell::is_empty(v) && cell::base(v) == base {
                        self.cells[i] = cell::EMPTY;
                        cleared.push(ClearedCell {
                            row: i / self.cols,
                            col: i % self.cols,
                            value: v,
                        });
                    }
                }
            } else {
                self.set(r, c, cell::EMPTY);
                cleared.push(ClearedCell { row: r, col: c, value });
            }
        }

        cleared
    }
}

impl MatchSet {
    pub fn report(&self) -> MatchReport {
        MatchReport {
            count: self.hits.len(),
            cells: self.bitmap.iter().filter(|&&m| m).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{PairingDataset, PairingFact, TileSet};
    use std::sync::Arc;

    /// Tiles A, B, C with facts AB and CA.
    fn table() -> MatchTable {
        let fact = |first, second| PairingFact {
            first,
            second,
            reading: String::new(),
            meaning: String::new(),
            level: 0,
        };
        let dataset = PairingDataset::new(
            TileSet::new(vec!['A', 'B', 'C']).unwrap(),
            vec![fact('A', 'B'), fact('C', 'A')],
        );
        MatchTable::build(Arc::new(dataset)).unwrap()
    }

    const A: u8 = 1;
    const B: u8 = 2;
    const C: u8 = 3;

    #[test]
    fn test_out_of_bounds_reads_empty() {
        let grid = Grid::new(4, 3);
        assert_eq!(grid.get(4, 0), cell::EMPTY);
        assert_eq!(grid.get(0, 3), cell::EMPTY);
        assert!(!Grid::new(4, 3).set(9, 9, A));
    }

    #[test]
    fn test_horizontal_match_is_directional() {
        let table = table();
        let mut grid = Grid::new(4, 3);
        grid.set(0, 0, B);
        grid.set(0, 1, A);
        assert!(grid.find_matches(&table).is_empty());

        grid.set(0, 0, A);
        grid.set(0, 1, B);
        let set = grid.find_matches(&table);
        assert_eq!(set.len(), 1);
        assert!(set.hits()[0].is_horizontal());
        assert!(set.is_matched(0, 0) && set.is_matched(0, 1));
    }

    #[test]
    fn test_vertical_match_reads_top_to_bottom() {
        let table = table();
        let mut grid = Grid::new(4, 3);
        grid.set(0, 0, A);
        grid.set(1, 0, C);
        let set = grid.find_matches(&table);
        assert_eq!(set.len(), 1);
        assert_eq!(set.hits()[0].first, (1, 0));
        assert_eq!(set.hits()[0].second, (0, 0));
    }

    #[test]
    fn test_shared_cell_counts_twice() {
        let table = table();
        let mut grid = Grid::new(4, 3);
        grid.set(0, 0, A);
        grid.set(0, 1, B);
        grid.set(1, 0, C);
        let report = grid.find_matches(&table).report();
        assert_eq!(report.count, 2);
        assert_eq!(report.cells, 3);
    }

    #[test]
    fn test_special_clears_whole_type() {
        let table = table();
        let mut grid = Grid::new(4, 3);
        grid.set(0, 0, cell::encode(0, true));
        grid.set(0, 1, B);
        grid.set(2, 2, A);
        grid.set(3, 1, A);
        grid.set(1, 1, C);

        let set = grid.find_matches(&table);
        let cleared = grid.clear_matches(&set);
        assert_eq!(cleared.len(), 4);
        assert!(grid.is_empty_at(2, 2));
        assert!(grid.is_empty_at(3, 1));
        // C sits on B: no CB fact, and B itself was matched.
        assert_eq!(grid.get(1, 1), C);
    }

    #[test]
    fn test_compact_and_hanging() {
        let mut grid = Grid::new(4, 3);
        grid.set(0, 0, A);
        grid.set(2, 0, B);
        grid.set(3, 0, C);
        grid.set(1, 2, A);
        assert!(grid.has_hanging());
        assert_eq!(
            grid.hanging_tiles(),
            vec![((2, 0), 1), ((3, 0), 2), ((1, 2), 0)]
        );

        grid.compact();
        assert!(!grid.has_hanging());
        assert_eq!(grid.get(1, 0), B);
        assert_eq!(grid.get(2, 0), C);
        assert_eq!(grid.get(0, 2), A);
        assert_eq!(grid.column_height(0), 3);
    }

    #[test]
    fn test_top_blocked() {
        let mut grid = Grid::new(4, 6);
        assert!(!grid.top_blocked(2));
        grid.set(3, 3, A);
        assert!(grid.top_blocked(2));
        assert!(!grid.top_blocked(0));
    }
}
