//! Decorative effects
//!
//! Every effect owns an [`Action`] tree and the [`PropertyTable`] it writes
//! to. An effect is alive until its action is done; the board steps all live
//! effects before its state check and drops the finished ones.
//!
//! Effects carry no gameplay state. The board only cares whether any are
//! still running (it waits for them before the next unit) and whether the
//! hint card has finished.

use crate::action::{Action, PropertyId, PropertyTable};
use crate::dataset::FactId;
use crate::easing::Easing;
use crate::falling::DropTrail;
use crate::hint::Hint;
use crate::rng::GameRng;
use kanji_cascade_types::ticks;

/// Opacity, `0..=1`.
pub const ALPHA: PropertyId = PropertyId(0);
/// Growth or rotation, effect specific.
pub const SCALE: PropertyId = PropertyId(1);
/// Distance from the viewer, match info cards only.
pub const DEPTH: PropertyId = PropertyId(2);
/// Vertical offset in cells, combo labels only.
pub const OFFSET: PropertyId = PropertyId(3);

const NUM_PROPERTIES: usize = 4;

const EXPLOSION_MIN_TICKS: u32 = 20;
const EXPLOSION_MAX_TICKS: u32 = 50;
const SPECIAL_BURST_TICKS: u32 = 70;
const DROP_TRAIL_TICKS: u32 = 40;
const DEAD_TILE_TICKS: u32 = 30;
const COMBO_TICKS: u32 = 60;
const HINT_INTRO_TICKS: u32 = 30;
const HINT_OUTRO_TICKS: u32 = 20;

#[derive(Debug, Clone, PartialEq)]
pub enum EffectKind {
    /// Card naming the fact behind a match.
    MatchInfo { fact: FactId },
    /// Particles over a matched cell.
    Explosion,
    /// Ring over a matched special tile.
    SpecialBurst,
    /// Streak left by a hard-dropped tile.
    DropTrail(DropTrail),
    /// Fading ghost of a removed tile.
    DeadTile { value: u8 },
    /// "N combo" label.
    Combo { size: u32 },
    /// Hint card.
    Hint { hint: Hint, dismissed: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    kind: EffectKind,
    /// `(row, col)` in fractional cells.
    position: (f32, f32),
    action: Action,
    props: PropertyTable,
}

impl Effect {
    fn new(kind: EffectKind, position: (f32, f32), action: Action, alpha: f32) -> Self {
        let mut props = PropertyTable::new(NUM_PROPERTIES);
        props.set(ALPHA, alpha);
        Self {
            kind,
            position,
            action,
            props,
        }
    }

    /// Flip in, sink back, fade out.
    pub fn match_info(fact: FactId, position: (f32, f32)) -> Self {
        let action = Action::parallel(vec![
            Action::sequence(vec![
                Action::tween(Easing::OutBounce, SCALE, 0.0, std::f32::consts::FRAC_PI_2, ticks(30)),
                Action::delay(ticks(30)),
            ]),
            Action::sequence(vec![
                Action::delay(ticks(60)),
                Action::tween(Easing::InBack, DEPTH, 0.0, 1.0, ticks(20)),
            ]),
            Action::sequence(vec![
                Action::tween(Easing::Linear, ALPHA, 0.0, 1.0, ticks(10)),
                Action::delay(ticks(60)),
                Action::tween(Easing::Linear, ALPHA, 1.0, 0.0, ticks(10)),
            ]),
        ]);
        Self::new(EffectKind::MatchInfo { fact }, position, action, 0.0)
    }

    pub fn explosion(position: (f32, f32), rng: &mut GameRng) -> Self {
        let life = ticks(rng.gen_range_u32(EXPLOSION_MIN_TICKS..=EXPLOSION_MAX_TICKS));
        let action = Action::parallel(vec![
            Action::tween(Easing::OutCos, SCALE, 0.0, 1.0, life),
            Action::tween(Easing::Linear, ALPHA, 1.0, 0.0, life),
        ]);
        Self::new(EffectKind::Explosion, position, action, 1.0)
    }

    pub fn special_burst(position: (f32, f32)) -> Self {
        let life = ticks(SPECIAL_BURST_TICKS);
        let action = Action::parallel(vec![
            Action::tween(Easing::OutCos, SCALE, 0.0, 1.0, life),
            Action::tween(Easing::Quadratic, ALPHA, 1.0, 0.0, life),
        ]);
        Self::new(EffectKind::SpecialBurst, position, action, 1.0)
    }

    pub fn drop_trail(trail: DropTrail) -> Self {
        let action = Action::tween(Easing::Linear, ALPHA, 0.5, 0.0, ticks(DROP_TRAIL_TICKS));
        let position = (trail.to_row as f32, trail.col as f32);
        Self::new(EffectKind::DropTrail(trail), position, action, 0.5)
    }

    pub fn dead_tile(value: u8, position: (f32, f32)) -> Self {
        let action = Action::tween(Easing::Linear, ALPHA, 1.0, 0.0, ticks(DEAD_TILE_TICKS));
        Self::new(EffectKind::DeadTile { value }, position, action, 1.0)
    }

    /// Rises, then sinks back while fading.
    pub fn combo(size: u32, position: (f32, f32)) -> Self {
        let half = ticks(COMBO_TICKS / 2);
        let action = Action::parallel(vec![
            Action::sequence(vec![
                Action::tween(Easing::OutCos, OFFSET, 0.0, 1.0, half),
                Action::tween(Easing::InCos, OFFSET, 1.0, 0.0, half),
            ]),
            Action::sequence(vec![
                Action::delay(half),
                Action::tween(Easing::Linear, ALPHA, 1.0, 0.0, half),
            ]),
        ]);
        Self::new(EffectKind::Combo { size }, position, action, 1.0)
    }

    /// Fade in, hold for `hold_ms`, fade out.
    pub fn hint(hint: Hint, hold_ms: u32) -> Self {
        let action = Action::sequence(vec![
            Action::tween(Easing::Linear, ALPHA, 0.0, 1.0, ticks(HINT_INTRO_TICKS)),
            Action::delay(hold_ms.max(1)),
            Action::tween(Easing::Linear, ALPHA, 1.0, 0.0, ticks(HINT_OUTRO_TICKS)),
        ]);
        let position = (hint.row as f32, hint.col as f32);
        Self::new(
            EffectKind::Hint {
                hint,
                dismissed: false,
            },
            position,
            action,
            0.0,
        )
    }

    /// Close a hint card early.
    ///
    /// Accepted only while the card is fully shown: after the intro and before
    /// the outro has begun. The remaining tree is replaced by an outro that
    /// starts from the current opacity.
    pub fn dismiss(&mut self) -> bool {
        let EffectKind::Hint { dismissed, .. } = &mut self.kind else {
            return false;
        };
        if *dismissed {
            return false;
        }

        let children = self.action.children();
        let showing = children.len() == 3 && children[0].done() && children[2].elapsed() == 0;
        if !showing {
            return false;
        }

        *dismissed = true;
        let alpha = self.props.get(ALPHA);
        self.action = Action::tween(Easing::Linear, ALPHA, alpha, 0.0, ticks(HINT_OUTRO_TICKS));
        true
    }

    pub fn step(&mut self, dt: u32) {
        self.action.step(dt, &mut self.props);
    }

    pub fn done(&self) -> bool {
        self.action.done()
    }

    pub fn kind(&self) -> &EffectKind {
        &self.kind
    }

    pub fn is_hint(&self) -> bool {
        matches!(self.kind, EffectKind::Hint { .. })
    }

    pub fn position(&self) -> (f32, f32) {
        self.position
    }

    pub fn property(&self, id: PropertyId) -> f32 {
        self.props.get(id)
    }

    pub fn alpha(&self) -> f32 {
        self.props.get(ALPHA)
    }

    pub fn action(&self) -> &Action {
        &self.action
    }
}

/// Live effects in spawn order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Effects {
    items: Vec<Effect>,
}

impl Effects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, effect: Effect) {
        self.items.push(effect);
    }

    /// Step every effect and drop the finished ones.
    pub fn step(&mut self, dt: u32) {
        for effect in &mut self.items {
            effect.step(dt);
        }
        self.items.retain(|e| !e.done());
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Effect> {
        self.items.iter()
    }

    pub fn hint(&self) -> Option<&Effect> {
        self.items.iter().find(|e| e.is_hint())
    }

    pub fn hint_mut(&mut self) -> Option<&mut Effect> {
        self.items.iter_mut().find(|e| e.is_hint())
    }
}
