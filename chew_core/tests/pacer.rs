use chew_core::pacer::{
    BITE_WINDOW_MS, CHEW_TICK_MS, PacerEngine, PacerEvent, PacerPhase, REST_WINDOW_MS,
    SWALLOW_WINDOW_MS, cycle_length_ms,
};
use rstest::rstest;

fn phases(events: &[PacerEvent]) -> Vec<(PacerPhase, u64)> {
    events
        .iter()
        .filter_map(|e| match *e {
            PacerEvent::PhaseChanged { phase, at_ms } => Some((phase, at_ms)),
            _ => None,
        })
        .collect()
}

fn chew_ticks(events: &[PacerEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, PacerEvent::ChewCounted { .. }))
        .count()
}

#[test]
fn thirty_chew_cycle_follows_the_fixed_timeline() {
    let mut p = PacerEngine::new(30);
    let start = p.activate(0);
    assert_eq!(phases(&start), vec![(PacerPhase::Bite, 0)]);

    assert!(p.advance(2_999).is_empty());
    assert_eq!(p.phase(), PacerPhase::Bite);

    let ev = p.advance(3_000);
    assert_eq!(phases(&ev), vec![(PacerPhase::Chew, 3_000)]);
    assert_eq!(p.chew_count(), 0);

    // 29 ticks: still chewing
    let ev = p.advance(3_000 + 29 * CHEW_TICK_MS);
    assert_eq!(chew_ticks(&ev), 29);
    assert_eq!(p.phase(), PacerPhase::Chew);
    assert_eq!(p.cycles(), 0);

    // 30th tick at 21.0 s completes the bite
    let ev = p.advance(21_000);
    assert_eq!(
        ev,
        vec![
            PacerEvent::ChewCounted {
                count: 30,
                at_ms: 21_000
            },
            PacerEvent::BiteCompleted {
                cycle: 1,
                at_ms: 21_000
            },
            PacerEvent::PhaseChanged {
                phase: PacerPhase::Swallow,
                at_ms: 21_000
            },
        ]
    );

    let ev = p.advance(23_000);
    assert_eq!(phases(&ev), vec![(PacerPhase::Rest, 23_000)]);

    let ev = p.advance(27_000);
    assert_eq!(phases(&ev), vec![(PacerPhase::Bite, 27_000)]);
    assert_eq!(p.cycles(), 1);
    assert_eq!(p.chew_count(), 0);
}

#[test]
fn late_advance_catches_up_in_order() {
    let mut stepped = PacerEngine::new(4);
    let mut jumped = stepped.clone();
    stepped.activate(0);
    jumped.activate(0);

    let mut fine = Vec::new();
    for t in (0..=40_000).step_by(100) {
        fine.extend(stepped.advance(t));
    }
    let coarse = jumped.advance(40_000);
    assert_eq!(fine, coarse);
}

#[rstest]
#[case(PacerPhase::Bite, 1_000)]
#[case(PacerPhase::Chew, BITE_WINDOW_MS + 3 * CHEW_TICK_MS)]
#[case(PacerPhase::Swallow, BITE_WINDOW_MS + 5 * CHEW_TICK_MS + 100)]
#[case(PacerPhase::Rest, BITE_WINDOW_MS + 5 * CHEW_TICK_MS + SWALLOW_WINDOW_MS + 100)]
fn deactivation_resets_from_any_phase(#[case] expected: PacerPhase, #[case] at: u64) {
    let mut p = PacerEngine::new(5);
    p.activate(0);
    p.advance(at);
    assert_eq!(p.phase(), expected);

    let ev = p.deactivate(at);
    assert_eq!(phases(&ev), vec![(PacerPhase::Prepare, at)]);
    assert_eq!(p.phase(), PacerPhase::Prepare);
    assert_eq!(p.chew_count(), 0);
    assert_eq!(p.next_due_ms(), None);

    // Nothing happens however long we wait.
    assert!(p.advance(at + 10 * REST_WINDOW_MS).is_empty());

    // Reactivation starts a fresh Bite.
    let ev = p.set_active(true, at + 60_000);
    assert_eq!(phases(&ev), vec![(PacerPhase::Bite, at + 60_000)]);
    assert_eq!(p.chew_count(), 0);
    assert_eq!(p.next_due_ms(), Some(at + 60_000 + BITE_WINDOW_MS));
}

#[test]
fn retarget_while_chewing_restarts_from_bite() {
    let mut p = PacerEngine::new(20);
    p.activate(0);
    p.advance(BITE_WINDOW_MS + 4 * CHEW_TICK_MS);
    assert_eq!(p.chew_count(), 4);

    let ev = p.set_target_chews(10, 6_000);
    assert_eq!(phases(&ev), vec![(PacerPhase::Bite, 6_000)]);
    assert_eq!(p.chew_count(), 0);
    assert_eq!(p.target_chews(), 10);

    let ev = p.advance(6_000 + cycle_length_ms(10) - REST_WINDOW_MS - SWALLOW_WINDOW_MS);
    assert_eq!(chew_ticks(&ev), 10);
    assert_eq!(p.phase(), PacerPhase::Swallow);
}

#[test]
fn retarget_to_same_value_is_ignored() {
    let mut p = PacerEngine::new(12);
    p.activate(0);
    p.advance(BITE_WINDOW_MS + CHEW_TICK_MS);
    assert!(p.set_target_chews(12, 3_700).is_empty());
    assert_eq!(p.chew_count(), 1);
}

#[test]
fn retarget_while_inactive_only_stores_the_target() {
    let mut p = PacerEngine::new(12);
    assert!(p.set_target_chews(0, 0).is_empty());
    assert_eq!(p.target_chews(), 30);
    assert_eq!(p.phase(), PacerPhase::Prepare);
}
