use thiserror::Error;

/// Errors raised while loading static game data.
///
/// These describe corrupt configuration, not runtime conditions: callers are
/// expected to abort loading when they see one.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("line {line}: expected 4 tab-separated fields, found {found}")]
    MalformedPairing { line: usize, found: usize },

    #[error("line {line}: pairing '{text}' must be exactly two glyphs")]
    InvalidPairingGlyphs { line: usize, text: String },

    #[error("line {line}: invalid level '{value}'")]
    InvalidLevel { line: usize, value: String },

    #[error("unknown glyph '{0}'")]
    UnknownGlyph(char),

    #[error("glyph '{0}' listed twice in tile set")]
    DuplicateTile(char),

    #[error("tile set has {0} glyphs, at most {max} supported", max = kanji_cascade_types::MAX_TILE_TYPES)]
    TooManyTiles(usize),

    #[error("tile set is empty")]
    EmptyTileSet,

    #[error("pairing {first}{second} defined twice")]
    DuplicatePairing { first: char, second: char },

    #[error("tile '{0}' does not take part in any pairing")]
    UnpairedTile(char),

    #[error("invalid row number {row} (grid has {rows} rows)")]
    InvalidRow { row: usize, rows: usize },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
