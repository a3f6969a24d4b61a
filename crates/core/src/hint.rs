//! Hint search: where could the next unit's tiles form a pairing?

use crate::board::Grid;
use crate::dataset::FactId;
use crate::match_table::MatchTable;
use crate::rng::GameRng;

/// A suggested placement for one tile of the unit about to fall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hint {
    /// Tile type to place.
    pub tile: u8,
    /// Empty cell the tile should land on.
    pub row: usize,
    pub col: usize,
    /// Settled cell it would pair with.
    pub match_row: usize,
    pub match_col: usize,
    pub fact: FactId,
}

/// Pick one placement at random among every pairing `tiles` could make.
///
/// Candidate cells are the empty cells a tile can rest on: row 0, or any
/// cell whose lower neighbour is filled. For each candidate the tile is
/// tested as the left half against its right neighbour, as the right half
/// against its left neighbour, and as the upper half against the cell
/// supporting it. Every hit is equally likely to be chosen.
pub fn find_hint(grid: &Grid, table: &MatchTable, tiles: [u8; 2], rng: &mut GameRng) -> Option<Hint> {
    let mut chosen = None;
    let mut seen = 0u32;

    let mut offer = |hint: Hint| {
        seen += 1;
        if rng.one_in(seen) {
            chosen = Some(hint);
        }
    };

    for tile in tiles {
        for r in 0..grid.rows() {
            for c in 0..grid.cols() {
                if !grid.is_empty_at(r, c) {
                    continue;
                }
                if r > 0 && grid.is_empty_at(r - 1, c) {
                    continue;
                }

                let hint = |match_row, match_col, fact| Hint {
                    tile,
                    row: r,
                    col: c,
                    match_row,
                    match_col,
                    fact,
                };

                if let Some(right) = grid.tile_type_at(r, c + 1) {
                    if let Some(fact) = table.lookup(tile, right) {
                        offer(hint(r, c + 1, fact));
                    }
                }

                if c > 0 {
                    if let Some(left) = grid.tile_type_at(r, c - 1) {
                        if let Some(fact) = table.lookup(left, tile) {
                            offer(hint(r, c - 1, fact));
                        }
                    }
                }

                if r > 0 {
                    if let Some(below) = grid.tile_type_at(r - 1, c) {
                        if let Some(fact) = table.lookup(tile, below) {
                            offer(hint(r - 1, c, fact));
                        }
                    }
                }
            }
        }
    }

    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{PairingDataset, PairingFact, TileSet};
    use kanji_cascade_types::cell;
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

    #[test]
    fn test_empty_grid_has_no_hint() {
        let grid = Grid::new(4, 3);
        let mut rng = GameRng::new(1);
        assert_eq!(find_hint(&grid, &table(), [0, 1], &mut rng), None);
    }

    #[test]
    fn test_candidates_beside_and_on_top() {
        let mut grid = Grid::new(4, 3);
        grid.set(0, 2, cell::encode(1, false)); // B
        let mut rng = GameRng::new(1);

        // A pairs as AB: left of the B, or stacked on it.
        for _ in 0..20 {
            let hint = find_hint(&grid, &table(), [0, 0], &mut rng).unwrap();
            assert_eq!((hint.match_row, hint.match_col), (0, 2));
            assert!(matches!((hint.row, hint.col), (0, 1) | (1, 2)));
            assert_eq!(hint.tile, 0);
        }
    }

    #[test]
    fn test_supporting_cell_below() {
        let mut grid = Grid::new(4, 3);
        grid.set(0, 0, cell::encode(0, false)); // A
        grid.set(0, 1, cell::encode(0, false)); // A
        grid.set(0, 2, cell::encode(0, false)); // A
        let mut rng = GameRng::new(5);

        // C on top of A reads CA; nothing horizontal is possible in row 1.
        let hint = find_hint(&grid, &table(), [2, 2], &mut rng).unwrap();
        assert_eq!(hint.row, 1);
        assert_eq!(hint.match_row, 0);
        assert_eq!(hint.match_col, hint.col);
    }

    #[test]
    fn test_floating_cells_are_skipped() {
        let mut grid = Grid::new(4, 3);
        grid.set(0, 0, cell::encode(1, false)); // B at the bottom
        grid.set(0, 1, cell::encode(1, false)); // B
        grid.set(0, 2, cell::encode(1, false)); // B
        grid.set(1, 2, cell::encode(1, false)); // B
        let mut rng = GameRng::new(3);

        for _ in 0..20 {
            let hint = find_hint(&grid, &table(), [0, 0], &mut rng).unwrap();
            assert!(hint.row == 1 || hint.row == 2, "row {}", hint.row);
            assert!(grid.is_empty_at(hint.row, hint.col));
        }
    }
}
