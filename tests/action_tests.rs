//! Property tests for action trees: sequencing, parallel completion and
//! replay after reset.

use kanji_cascade::core::action::{Action, PropertyId, PropertyTable};
use kanji_cascade::core::easing::Easing;
use proptest::prelude::*;

const SLOTS: usize = 4;

fn easing() -> impl Strategy<Value = Easing> {
    prop_oneof![
        Just(Easing::Linear),
        Just(Easing::Quadratic),
        Just(Easing::InCos),
        Just(Easing::OutCos),
        Just(Easing::InBack),
        Just(Easing::OutBounce),
    ]
}

fn leaf() -> impl Strategy<Value = Action> {
    prop_oneof![
        (easing(), 0..SLOTS, -5.0f32..5.0, -5.0f32..5.0, 1u32..20).prop_map(
            |(e, slot, from, to, len)| Action::tween(e, PropertyId(slot), from, to, len)
        ),
        (1u32..20).prop_map(Action::delay),
    ]
}

fn tree() -> impl Strategy<Value = Action> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(Action::sequence),
            prop::collection::vec(inner, 1..4).prop_map(Action::parallel),
        ]
    })
}

/// Sequence invariant: children before the first unfinished one are done,
/// children after it have not been touched.
fn check_sequences(action: &Action) -> Result<(), TestCaseError> {
    if let Action::Sequence(children) = action {
        if let Some(active) = children.iter().position(|c| !c.done()) {
            for child in &children[..active] {
                prop_assert!(child.done());
            }
            for child in &children[active + 1..] {
                prop_assert_eq!(child.elapsed(), 0);
            }
        }
    }
    if let Action::Parallel(children) = action {
        prop_assert_eq!(action.done(), children.iter().all(Action::done));
    }
    for child in action.children() {
        check_sequences(child)?;
    }
    Ok(())
}

fn run_to_end(action: &mut Action, dts: &[u32]) -> PropertyTable {
    let mut props = PropertyTable::new(SLOTS);
    let mut i = 0;
    while !action.done() {
        action.step(dts[i % dts.len()], &mut props);
        i += 1;
    }
    props
}

proptest! {
    #[test]
    fn sequential_groups_run_one_child_at_a_time(
        mut action in tree(),
        dts in prop::collection::vec(1u32..8, 1..64),
    ) {
        let mut props = PropertyTable::new(SLOTS);
        check_sequences(&action)?;
        for dt in dts {
            action.step(dt, &mut props);
            check_sequences(&action)?;
        }
    }

    #[test]
    fn parallel_group_done_iff_every_child_done(
        lens in prop::collection::vec(1u32..30, 1..6),
        dt in 1u32..7,
    ) {
        let children = lens
            .iter()
            .enumerate()
            .map(|(i, &len)| Action::tween(Easing::Linear, PropertyId(i % SLOTS), 0.0, 1.0, len))
            .collect();
        let mut group = Action::parallel(children);
        let mut props = PropertyTable::new(SLOTS);

        let longest = *lens.iter().max().unwrap();
        let mut elapsed = 0;
        while elapsed < longest {
            prop_assert!(!group.done());
            group.step(dt, &mut props);
            elapsed += dt;
            let all = group.children().iter().all(Action::done);
            prop_assert_eq!(group.done(), all);
        }
        prop_assert!(group.done());
    }

    #[test]
    fn reset_replays_to_the_same_values(
        mut action in tree(),
        dts in prop::collection::vec(1u32..8, 1..16),
    ) {
        let first = run_to_end(&mut action, &dts);
        action.reset();
        prop_assert_eq!(action.elapsed(), 0);
        let second = run_to_end(&mut action, &dts);
        prop_assert_eq!(first, second);
    }
}

#[test]
fn tween_keeps_final_value_after_completion() {
    const ALPHA: PropertyId = PropertyId(0);
    let mut props = PropertyTable::new(1);
    let mut fade = Action::sequence(vec![
        Action::tween(Easing::Linear, ALPHA, 0.0, 1.0, 4),
        Action::tween(Easing::Linear, ALPHA, 1.0, 0.25, 4),
    ]);

    for _ in 0..8 {
        fade.step(1, &mut props);
    }
    assert!(fade.done());
    assert_eq!(props.get(ALPHA), 0.25);

    props.set(ALPHA, 9.0);
    fade.step(1, &mut props);
    assert_eq!(props.get(ALPHA), 9.0);
}

#[test]
fn parallel_children_finish_at_different_ticks() {
    let mut props = PropertyTable::new(2);
    let mut group = Action::parallel(vec![
        Action::tween(Easing::Linear, PropertyId(0), 0.0, 1.0, 2),
        Action::tween(Easing::Linear, PropertyId(1), 0.0, 1.0, 5),
    ]);

    group.step(2, &mut props);
    assert!(group.children()[0].done());
    assert!(!group.children()[1].done());
    assert!(!group.done());

    group.step(3, &mut props);
    assert!(group.done());
    assert_eq!(group.elapsed(), 5);
    assert_eq!(group.total(), 5);
}
