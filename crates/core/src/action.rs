//! Action module - composable timed actions
//!
//! An [`Action`] is a tree of timed nodes:
//!
//! - [`Action::Tween`]: a leaf that blends an `f32` between two endpoints through
//!   an [`Easing`] curve and writes the result to a bound output slot. A tween
//!   without an output is a pure delay.
//! - [`Action::Sequence`]: runs its children one after another. Only the first
//!   unfinished child is stepped; later children stay untouched until their
//!   predecessors finish.
//! - [`Action::Parallel`]: steps every unfinished child on each call.
//!
//! Outputs live in a caller-owned [`PropertyTable`] addressed by [`PropertyId`].
//! Whoever owns the action also owns its table and passes it to every
//! [`Action::step`].
//!
//! Finished leaves are never evaluated again, so a completed tween keeps its
//! terminal value even if something else later writes the same slot.
//!
//! # Example
//!
//! ```
//! use kanji_cascade_core::action::{Action, PropertyId, PropertyTable};
//! use kanji_cascade_core::easing::Easing;
//!
//! const ALPHA: PropertyId = PropertyId(0);
//!
//! let mut props = PropertyTable::new(1);
//! let mut fade = Action::sequence(vec![
//!     Action::tween(Easing::Linear, ALPHA, 0.0, 1.0, 10),
//!     Action::delay(20),
//!     Action::tween(Easing::Linear, ALPHA, 1.0, 0.0, 10),
//! ]);
//!
//! fade.step(10, &mut props);
//! assert_eq!(props.get(ALPHA), 1.0);
//! assert!(!fade.done());
//! ```

use std::ops::{Deref, DerefMut};

use crate::easing::Easing;

/// Index of an output slot in a [`PropertyTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyId(pub usize);

/// Storage for tweened values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyTable {
    values: Vec<f32>,
}

impl PropertyTable {
    /// Create a table with `len` slots, all zero.
    pub fn new(len: usize) -> Self {
        Self {
            values: vec![0.0; len],
        }
    }

    pub fn get(&self, id: PropertyId) -> f32 {
        self.values.get(id.0).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, id: PropertyId, value: f32) {
        debug_assert!(id.0 < self.values.len(), "unbound property slot {}", id.0);
        if let Some(slot) = self.values.get_mut(id.0) {
            *slot = value;
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Leaf node: blends a value over `total` ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    easing: Easing,
    from: f32,
    to: f32,
    output: Option<PropertyId>,
    elapsed: u32,
    total: u32,
}

impl Tween {
    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn output(&self) -> Option<PropertyId> {
        self.output
    }

    pub fn done(&self) -> bool {
        self.elapsed == self.total
    }

    /// Current blended value.
    pub fn value(&self) -> f32 {
        let t = self.elapsed as f32 / self.total as f32;
        self.easing.blend(self.from, self.to, t)
    }

    fn step(&mut self, dt: u32, props: &mut PropertyTable) {
        if self.done() {
            return;
        }
        self.elapsed = self.elapsed.saturating_add(dt).min(self.total);
        if let Some(id) = self.output {
            props.set(id, self.value());
        }
    }
}

/// Children of a group node. Never empty; only [`Action::sequence`] and
/// [`Action::parallel`] build one.
#[derive(Debug, Clone, PartialEq)]
pub struct Group(Vec<Action>);

impl Deref for Group {
    type Target = [Action];

    fn deref(&self) -> &[Action] {
        &self.0
    }
}

impl DerefMut for Group {
    fn deref_mut(&mut self) -> &mut [Action] {
        &mut self.0
    }
}

/// A node in an action tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Tween(Tween),
    Sequence(Group),
    Parallel(Group),
}

impl Action {
    /// Tween `output` from `from` to `to` over `ticks`.
    ///
    /// # Panics
    ///
    /// Panics if `ticks` is zero.
    pub fn tween(easing: Easing, output: PropertyId, from: f32, to: f32, ticks: u32) -> Self {
        Self::leaf(easing, Some(output), from, to, ticks)
    }

    /// Occupy `ticks` without writing anything.
    ///
    /// # Panics
    ///
    /// Panics if `ticks` is zero.
    pub fn delay(ticks: u32) -> Self {
        Self::leaf(Easing::Linear, None, 0.0, 0.0, ticks)
    }

    /// Run `children` one after another.
    ///
    /// # Panics
    ///
    /// Panics if `children` is empty.
    pub fn sequence(children: Vec<Action>) -> Self {
        assert!(!children.is_empty(), "empty sequential action group");
        Action::Sequence(Group(children))
    }

    /// Run `children` concurrently.
    ///
    /// # Panics
    ///
    /// Panics if `children` is empty.
    pub fn parallel(children: Vec<Action>) -> Self {
        assert!(!children.is_empty(), "empty parallel action group");
        Action::Parallel(Group(children))
    }

    fn leaf(easing: Easing, output: Option<PropertyId>, from: f32, to: f32, ticks: u32) -> Self {
        assert!(ticks > 0, "zero-length action");
        Action::Tween(Tween {
            easing,
            from,
            to,
            output,
            elapsed: 0,
            total: ticks,
        })
    }

    /// Advance by `dt` ticks, writing outputs of the nodes still running.
    pub fn step(&mut self, dt: u32, props: &mut PropertyTable) {
        match self {
            Action::Tween(tween) => tween.step(dt, props),
            Action::Sequence(children) => {
                if let Some(child) = children.iter_mut().find(|c| !c.done()) {
                    child.step(dt, props);
                }
            }
            Action::Parallel(children) => {
                for child in children.iter_mut().filter(|c| !c.done()) {
                    child.step(dt, props);
                }
            }
        }
    }

    pub fn done(&self) -> bool {
        match self {
            Action::Tween(tween) => tween.done(),
            Action::Sequence(children) | Action::Parallel(children) => {
                children.iter().all(Action::done)
            }
        }
    }

    /// Rewind every node to its start.
    pub fn reset(&mut self) {
        match self {
            Action::Tween(tween) => tween.elapsed = 0,
            Action::Sequence(children) | Action::Parallel(children) => {
                children.iter_mut().for_each(Action::reset)
            }
        }
    }

    /// Elapsed ticks: summed over a sequence, the maximum over a parallel group.
    pub fn elapsed(&self) -> u32 {
        match self {
            Action::Tween(tween) => tween.elapsed,
            Action::Sequence(children) => children.iter().map(Action::elapsed).sum(),
            Action::Parallel(children) => children.iter().map(Action::elapsed).max().unwrap_or(0),
        }
    }

    /// Total length in ticks.
    pub fn total(&self) -> u32 {
        match self {
            Action::Tween(tween) => tween.total,
            Action::Sequence(children) => children.iter().map(Action::total).sum(),
            Action::Parallel(children) => children.iter().map(Action::total).max().unwrap_or(0),
        }
    }

    /// Child nodes (empty for leaves).
    pub fn children(&self) -> &[Action] {
        match self {
            Action::Tween(_) => &[],
            Action::Sequence(children) | Action::Parallel(children) => &children[..],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: PropertyId = PropertyId(0);
    const B: PropertyId = PropertyId(1);

    #[test]
    fn test_tween_clamps_at_total() {
        let mut props = PropertyTable::new(1);
        let mut action = Action::tween(Easing::Linear, A, 0.0, 10.0, 4);

        action.step(3, &mut props);
        assert!((props.get(A) - 7.5).abs() < 1e-6);
        assert_eq!(action.elapsed(), 3);

        action.step(100, &mut props);
        assert_eq!(action.elapsed(), 4);
        assert_eq!(props.get(A), 10.0);
        assert!(action.done());
    }

    #[test]
    fn test_done_tween_is_frozen() {
        let mut props = PropertyTable::new(1);
        let mut action = Action::tween(Easing::Linear, A, 0.0, 1.0, 2);
        action.step(2, &mut props);

        // Somebody else scribbles over the slot; a finished tween leaves it alone.
        props.set(A, 42.0);
        action.step(5, &mut props);
        assert_eq!(props.get(A), 42.0);
    }

    #[test]
    fn test_sequence_runs_children_in_order() {
        let mut props = PropertyTable::new(2);
        let mut action = Action::sequence(vec![
            Action::tween(Easing::Linear, A, 0.0, 1.0, 2),
            Action::tween(Easing::Linear, B, 0.0, 1.0, 2),
        ]);

        // A large step is not carried over into the next child.
        action.step(5, &mut props);
        assert_eq!(action.children()[0].elapsed(), 2);
        assert_eq!(action.children()[1].elapsed(), 0);
        assert_eq!(props.get(B), 0.0);

        action.step(1, &mut props);
        assert_eq!(action.children()[1].elapsed(), 1);
        assert!((props.get(B) - 0.5).abs() < 1e-6);
        assert!(!action.done());

        action.step(1, &mut props);
        assert!(action.done());
    }

    #[test]
    fn test_parallel_children_finish_independently() {
        let mut props = PropertyTable::new(2);
        let mut action = Action::parallel(vec![
            Action::tween(Easing::Linear, A, 0.0, 1.0, 2),
            Action::tween(Easing::Linear, B, 0.0, 1.0, 6),
        ]);

        action.step(3, &mut props);
        assert!(action.children()[0].done());
        assert!(!action.children()[1].done());
        assert!(!action.done());
        assert_eq!(action.elapsed(), 3);

        action.step(3, &mut props);
        assert!(action.done());
        assert_eq!(action.total(), 6);
    }

    #[test]
    fn test_reset_replays_identically() {
        let mut props = PropertyTable::new(1);
        let mut action = Action::sequence(vec![
            Action::delay(3),
            Action::tween(Easing::OutBounce, A, 1.0, 5.0, 7),
        ]);

        while !action.done() {
            action.step(2, &mut props);
        }
        let first = props.get(A);

        action.reset();
        assert_eq!(action.elapsed(), 0);
        props.set(A, 0.0);
        while !action.done() {
            action.step(2, &mut props);
        }
        assert_eq!(props.get(A), first);
    }

    #[test]
    fn test_delay_writes_nothing() {
        let mut props = PropertyTable::new(1);
        props.set(A, 3.0);
        let mut action = Action::delay(5);
        action.step(5, &mut props);
        assert!(action.done());
        assert_eq!(props.get(A), 3.0);
    }

    #[test]
    #[should_panic(expected = "zero-length action")]
    fn test_zero_length_tween_panics() {
        let _ = Action::delay(0);
    }

    #[test]
    #[should_panic(expected = "empty parallel action group")]
    fn test_empty_group_panics() {
        let _ = Action::parallel(Vec::new());
    }

    #[test]
    #[should_panic(expected = "empty sequential action group")]
    fn test_empty_sequence_panics() {
        let _ = Action::sequence(Vec::new());
    }

    #[test]
    fn test_group_children_are_mutable_in_place() {
        let mut group = Action::sequence(vec![Action::delay(2), Action::delay(3)]);
        if let Action::Sequence(children) = &mut group {
            assert_eq!(children.len(), 2);
            children[0].reset();
        }
        assert_eq!(group.children().len(), 2);
        assert_eq!(group.total(), 5);
    }
}
