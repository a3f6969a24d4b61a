//! Terminal runner (default binary).
//!
//! Builds the match table and board from the command line, then runs a
//! fixed-step loop: poll input until the next tick is due, tick the board,
//! redraw. Logs go to stderr; redirect it (`2>game.log`) to keep them off the
//! board.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use tracing_subscriber::EnvFilter;

use kanji_cascade::core::{GameRng, GameSettings, GameState, MatchTable, PairingDataset};
use kanji_cascade::input::{handle_key_event, is_restart, should_quit};
use kanji_cascade::term::{FrameBuffer, GameView, TerminalRenderer, Viewport};
use kanji_cascade::types::{BoardState, EventListener, TICK_MS};

#[derive(Debug, Parser)]
#[command(name = "kanji-cascade", version, about = "Falling-tile kanji compound game")]
struct Args {
    /// Seed for every random choice; defaults to the clock.
    #[arg(long)]
    seed: Option<u64>,

    /// Starting level (0-based).
    #[arg(long, default_value_t = 0)]
    level: u32,

    /// Practice mode: no quota, fact statistics are not recorded.
    #[arg(long)]
    practice: bool,

    /// Never show placement hints.
    #[arg(long)]
    no_hints: bool,

    /// Hide the landing shadow of the falling unit.
    #[arg(long)]
    no_ghost: bool,

    /// JSON file overriding timings and grid size.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Tile glyph file (one or more glyphs per line, `#` comments).
    #[arg(long, requires = "pairs")]
    tiles: Option<PathBuf>,

    /// Pairing file: glyphs, reading, meaning, level separated by tabs.
    #[arg(long, requires = "tiles")]
    pairs: Option<PathBuf>,

    /// Rows of random tiles to start each level with.
    #[arg(long, default_value_t = 3)]
    filled_rows: usize,
}

/// Logs board events.
struct EventLog;

impl EventListener for EventLog {
    fn on_score_changed(&mut self, score: u32) {
        tracing::info!(score, "score");
    }

    fn on_matches_remaining_changed(&mut self, count: u32) {
        tracing::info!(count, "matches remaining");
    }

    fn on_next_unit_preview(&mut self, left: char, right: char) {
        tracing::debug!(%left, %right, "next unit");
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut game = build_game(&args)?;

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &mut game, &args);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn build_game(args: &Args) -> Result<GameState> {
    let settings = match &args.settings {
        Some(path) => GameSettings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => GameSettings::default(),
    };

    let dataset = match (&args.tiles, &args.pairs) {
        (Some(tiles), Some(pairs)) => PairingDataset::load(tiles, pairs).with_context(|| {
            format!(
                "loading dataset from {} and {}",
                tiles.display(),
                pairs.display()
            )
        })?,
        _ => PairingDataset::builtin().context("loading built-in dataset")?,
    };
    let table = MatchTable::build(Arc::new(dataset)).context("building match table")?;

    let seed = args.seed.unwrap_or_else(clock_seed);
    tracing::info!(seed, "starting");

    let mut game = GameState::new(Arc::new(table), settings, GameRng::new(seed));
    start_level(&mut game, args.level, args);
    Ok(game)
}

fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1)
}

fn start_level(game: &mut GameState, level: u32, args: &Args) {
    game.set_level(level, args.practice, !args.no_hints);
    game.initialize_grid(args.filled_rows);
}

fn run(term: &mut TerminalRenderer, game: &mut GameState, args: &Args) -> Result<()> {
    let view = GameView::new().with_ghost(!args.no_ghost);
    let mut fb = FrameBuffer::new(0, 0);
    let mut events = EventLog;

    let tick_duration = Duration::from_millis(TICK_MS as u64);
    let mut last_tick = Instant::now();

    loop {
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        view.render_into(game, Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        // Input with timeout until next tick.
        let timeout = tick_duration.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    if should_quit(key) {
                        return Ok(());
                    }
                    if is_restart(key) {
                        tracing::info!(score = game.score(), "restart");
                        game.reset();
                        start_level(game, args.level, args);
                        continue;
                    }
                    match game.state() {
                        BoardState::LevelCompleted => {
                            let next = game.level() + 1;
                            start_level(game, next, args);
                        }
                        _ => {
                            if let Some(action) = handle_key_event(key) {
                                game.apply_action(action);
                            }
                        }
                    }
                }
                Event::Resize(_, _) => term.invalidate(),
                _ => {}
            }
        }

        // Tick.
        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();
            game.tick(TICK_MS);
            game.dispatch_events(&mut events);
        }
    }
}
