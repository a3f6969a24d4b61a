//! Match table - O(1) lookup from an ordered tile pair to its pairing fact
//!
//! The table is directional: `lookup(a, b)` answers "may `a` sit left of (or on
//! top of) `b`?". Nothing is inferred for `lookup(b, a)`.

use std::sync::Arc;

use crate::dataset::{FactId, PairingDataset, PairingFact};
use crate::error::{ConfigError, Result};

/// Immutable `N × N` table of pairing facts.
#[derive(Debug, Clone)]
pub struct MatchTable {
    dataset: Arc<PairingDataset>,
    size: usize,
    cells: Vec<Option<FactId>>,
}

impl MatchTable {
    /// Build the table, validating every fact against the tile set.
    ///
    /// Fails on unknown glyphs, on two facts for the same ordered pair, and on
    /// tiles that take part in no fact at all.
    pub fn build(dataset: Arc<PairingDataset>) -> Result<Self> {
        let tiles = dataset.tiles();
        let size = tiles.len();
        let mut cells = vec![None; size * size];
        let mut paired = vec![false; size];

        for (i, fact) in dataset.facts().iter().enumerate() {
            let a = tiles
                .index_of(fact.first)
                .ok_or(ConfigError::UnknownGlyph(fact.first))? as usize;
            let b = tiles
                .index_of(fact.second)
                .ok_or(ConfigError::UnknownGlyph(fact.second))? as usize;

            let slot = &mut cells[a * size + b];
            if slot.is_some() {
                return Err(ConfigError::DuplicatePairing {
                    first: fact.first,
                    second: fact.second,
                });
            }
            *slot = Some(FactId(i));
            paired[a] = true;
            paired[b] = true;
        }

        if let Some(i) = paired.iter().position(|&p| !p) {
            return Err(ConfigError::UnpairedTile(tiles.glyphs()[i]));
        }

        tracing::debug!(
            tiles = size,
            facts = dataset.facts().len(),
            "match table built"
        );

        Ok(Self {
            dataset,
            size,
            cells,
        })
    }

    /// Build from the shipped dataset.
    pub fn builtin() -> Result<Self> {
        Self::build(Arc::new(PairingDataset::builtin()?))
    }

    /// Fact for `first` followed by `second` (left/right or top/bottom).
    #[inline]
    pub fn lookup(&self, first: u8, second: u8) -> Option<FactId> {
        let (a, b) = (first as usize, second as usize);
        if a >= self.size || b >= self.size {
            return None;
        }
        self.cells[a * self.size + b]
    }

    /// True if the two types pair in either order.
    pub fn related(&self, a: u8, b: u8) -> bool {
        self.lookup(a, b).is_some() || self.lookup(b, a).is_some()
    }

    pub fn fact(&self, id: FactId) -> Option<&PairingFact> {
        self.dataset.fact(id)
    }

    pub fn num_types(&self) -> usize {
        self.size
    }

    pub fn num_facts(&self) -> usize {
        self.dataset.facts().len()
    }

    pub fn dataset(&self) -> &PairingDataset {
        &self.dataset
    }

    pub fn glyph(&self, tile_type: u8) -> Option<char> {
        self.dataset.tiles().glyph(tile_type)
    }

    /// Tile type of `glyph`.
    pub fn tile_type(&self, glyph: char) -> Option<u8> {
        self.dataset.tiles().index_of(glyph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::TileSet;

    fn fact(first: char, second: char) -> PairingFact {
        PairingFact {
            first,
            second,
            reading: String::new(),
            meaning: String::new(),
            level: 0,
        }
    }

    fn dataset(glyphs: &str, facts: Vec<PairingFact>) -> Arc<PairingDataset> {
        Arc::new(PairingDataset::new(
            TileSet::new(glyphs.chars().collect()).unwrap(),
            facts,
        ))
    }

    #[test]
    fn test_lookup_is_directional() {
        let table = MatchTable::build(dataset("AB", vec![fact('B', 'A')])).unwrap();
        assert_eq!(table.lookup(1, 0), Some(FactId(0)));
        assert_eq!(table.lookup(0, 1), None);
        assert!(table.related(0, 1));
        assert!(table.related(1, 0));
    }

    #[test]
    fn test_both_directions_are_independent_facts() {
        let table =
            MatchTable::build(dataset("AB", vec![fact('A', 'B'), fact('B', 'A')])).unwrap();
        assert_eq!(table.lookup(0, 1), Some(FactId(0)));
        assert_eq!(table.lookup(1, 0), Some(FactId(1)));
    }

    #[test]
    fn test_duplicate_pairing_is_fatal() {
        let err = MatchTable::build(dataset("AB", vec![fact('A', 'B'), fact('A', 'B')]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DuplicatePairing {
                first: 'A',
                second: 'B'
            }
        ));
    }

    #[test]
    fn test_unknown_glyph_is_fatal() {
        let err = MatchTable::build(dataset("AB", vec![fact('A', 'Z')])).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownGlyph('Z')));
    }

    #[test]
    fn test_unpaired_tile_is_fatal() {
        let err = MatchTable::build(dataset("ABC", vec![fact('A', 'B')])).unwrap_err();
        assert!(matches!(err, ConfigError::UnpairedTile('C')));
    }

    #[test]
    fn test_out_of_range_lookup() {
        let table = MatchTable::builtin().unwrap();
        assert_eq!(table.lookup(200, 0), None);
    }

    #[test]
    fn test_builtin_lookup() {
        let table = MatchTable::builtin().unwrap();
        let fire = table.tile_type('火').unwrap();
        let mountain = table.tile_type('山').unwrap();
        let id = table.lookup(fire, mountain).unwrap();
        assert_eq!(table.fact(id).unwrap().meaning, "volcano");
        assert_eq!(table.lookup(mountain, fire), None);
    }
}
