//! Dataset module - tile glyphs and pairing facts
//!
//! The tile set is an ordered list of glyphs: the index of a glyph is its tile
//! type, and the order is the unlock order (the first `9 * (level + 1)` glyphs
//! are playable at `level`).
//!
//! Pairing facts come from a tab-separated text file, one per line:
//!
//! ```text
//! 火山	かざん	volcano	0
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Result};
use kanji_cascade_types::MAX_TILE_TYPES;

const BUILTIN_TILES: &str = include_str!("../data/tiles.txt");
const BUILTIN_PAIRINGS: &str = include_str!("../data/pairings.tsv");

/// Index of a fact in its [`PairingDataset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FactId(pub usize);

/// Ordered list of tile glyphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSet {
    glyphs: Vec<char>,
}

impl TileSet {
    /// Build from glyphs in unlock order.
    pub fn new(glyphs: Vec<char>) -> Result<Self> {
        if glyphs.is_empty() {
            return Err(ConfigError::EmptyTileSet);
        }
        if glyphs.len() > MAX_TILE_TYPES {
            return Err(ConfigError::TooManyTiles(glyphs.len()));
        }
        for (i, &g) in glyphs.iter().enumerate() {
            if glyphs[..i].contains(&g) {
                return Err(ConfigError::DuplicateTile(g));
            }
        }
        Ok(Self { glyphs })
    }

    /// Parse a glyph list. Whitespace and `#` comment lines are skipped.
    pub fn parse(text: &str) -> Result<Self> {
        let glyphs = text
            .lines()
            .filter(|line| !line.trim_start().starts_with('#'))
            .flat_map(|line| line.chars())
            .filter(|c| !c.is_whitespace())
            .collect();
        Self::new(glyphs)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn glyph(&self, tile_type: u8) -> Option<char> {
        self.glyphs.get(tile_type as usize).copied()
    }

    /// Tile type of `glyph`.
    pub fn index_of(&self, glyph: char) -> Option<u8> {
        self.glyphs.iter().position(|&g| g == glyph).map(|i| i as u8)
    }

    pub fn glyphs(&self) -> &[char] {
        &self.glyphs
    }
}

/// A compound of two glyphs that clears when the glyphs touch in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingFact {
    /// First glyph: the left tile of a horizontal pair, the top tile of a vertical one.
    pub first: char,
    pub second: char,
    pub reading: String,
    pub meaning: String,
    pub level: u32,
}

impl PairingFact {
    /// Both glyphs as a string.
    pub fn glyphs(&self) -> String {
        [self.first, self.second].iter().collect()
    }
}

/// Tile set plus every pairing fact.
#[derive(Debug, Clone)]
pub struct PairingDataset {
    tiles: TileSet,
    facts: Vec<PairingFact>,
}

impl PairingDataset {
    pub fn new(tiles: TileSet, facts: Vec<PairingFact>) -> Self {
        Self { tiles, facts }
    }

    /// Parse tile and pairing texts.
    pub fn parse(tiles: &str, pairings: &str) -> Result<Self> {
        let tiles = TileSet::parse(tiles)?;
        let facts = parse_pairings(pairings)?;
        Ok(Self::new(tiles, facts))
    }

    /// Load tile and pairing files from disk.
    pub fn load(tiles: impl AsRef<Path>, pairings: impl AsRef<Path>) -> Result<Self> {
        let tiles = fs::read_to_string(tiles)?;
        let pairings = fs::read_to_string(pairings)?;
        Self::parse(&tiles, &pairings)
    }

    /// The dataset shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::parse(BUILTIN_TILES, BUILTIN_PAIRINGS)
    }

    pub fn tiles(&self) -> &TileSet {
        &self.tiles
    }

    pub fn facts(&self) -> &[PairingFact] {
        &self.facts
    }

    pub fn fact(&self, id: FactId) -> Option<&PairingFact> {
        self.facts.get(id.0)
    }
}

fn parse_pairings(text: &str) -> Result<Vec<PairingFact>> {
    let mut facts = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 4 {
            return Err(ConfigError::MalformedPairing {
                line: line_no,
                found: fields.len(),
            });
        }

        let mut glyphs = fields[0].chars();
        let (first, second) = match (glyphs.next(), glyphs.next(), glyphs.next()) {
            (Some(a), Some(b), None) => (a, b),
            _ => {
                return Err(ConfigError::InvalidPairingGlyphs {
                    line: line_no,
                    text: fields[0].to_string(),
                })
            }
        };

        let level = fields[3]
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidLevel {
                line: line_no,
                value: fields[3].to_string(),
            })?;

        facts.push(PairingFact {
            first,
            second,
            reading: fields[1].to_string(),
            meaning: fields[2].to_string(),
            level,
        });
    }

    Ok(facts)
}
