use std::sync::Arc;

use chew_core::mocks::{ScriptedEstimator, TrackingCamera};
use chew_core::pacer::{PacerEngine, PacerEvent, PacerPhase, cycle_length_ms};
use chew_core::{DispatchMode, SessionController, SessionEvent, UserIntent};
use chew_traits::clock::test_clock::TestClock;
use proptest::prelude::*;

fn reply(chews: u32) -> String {
    format!(
        r#"{{"foodName":"测试","calories":400,"textureLevel":"Soft","recommendedChews":{chews},"fatShieldTip":"慢"}}"#
    )
}

fn eating(chews: u32) -> (SessionController<TrackingCamera, ScriptedEstimator>, TestClock) {
    let clock = TestClock::new();
    let mut c = SessionController::new(TrackingCamera::working(), ScriptedEstimator::new(reply(chews)))
        .with_clock(Arc::new(clock.clone()))
        .with_dispatch(DispatchMode::Inline);
    c.handle(UserIntent::StartCapture).unwrap();
    c.handle(UserIntent::CapturePhoto).unwrap();
    c.handle(UserIntent::ConfirmMealPrep).unwrap();
    (c, clock)
}

proptest! {
    #[test]
    fn one_cycle_counts_exactly_target_chews(target in 1u32..120, start in 0u64..1_000_000) {
        let mut p = PacerEngine::new(target);
        p.activate(start);
        let ev = p.advance(start + cycle_length_ms(target));

        let ticks = ev.iter().filter(|e| matches!(e, PacerEvent::ChewCounted { .. })).count();
        let bites: Vec<usize> = ev
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(e, PacerEvent::BiteCompleted { .. }))
            .map(|(i, _)| i)
            .collect();
        prop_assert_eq!(ticks, target as usize);
        prop_assert_eq!(bites.len(), 1);
        // the bite completes after the last tick
        let last_tick = ev.iter().rposition(|e| matches!(e, PacerEvent::ChewCounted { .. }));
        prop_assert!(last_tick.is_some_and(|t| t < bites[0]));
        prop_assert_eq!(p.phase(), PacerPhase::Bite);
        prop_assert_eq!(p.chew_count(), 0);
        prop_assert_eq!(p.cycles(), 1);
    }

    #[test]
    fn deactivate_anywhere_halts_everything(target in 1u32..60, at in 0u64..200_000) {
        let mut p = PacerEngine::new(target);
        p.activate(0);
        p.advance(at);
        p.deactivate(at);
        prop_assert_eq!(p.phase(), PacerPhase::Prepare);
        prop_assert_eq!(p.chew_count(), 0);
        prop_assert!(p.advance(at + 1_000_000).is_empty());
    }

    #[test]
    fn elapsed_counts_whole_seconds_and_freezes_while_paused(
        run_ms in 0u64..120_000,
        paused_ms in 0u64..600_000,
    ) {
        let (mut c, clock) = eating(20);
        clock.advance_ms(run_ms);
        c.poll();
        prop_assert_eq!(c.elapsed_secs(), run_ms / 1_000);

        c.handle(UserIntent::TogglePause).unwrap();
        let frozen = c.elapsed_secs();
        clock.advance_ms(paused_ms);
        prop_assert!(c.poll().is_empty());
        prop_assert_eq!(c.elapsed_secs(), frozen);
    }

    #[test]
    fn bites_taken_matches_bite_completions(chews in 15u32..=50, run_ms in 0u64..400_000) {
        let (mut c, clock) = eating(chews);
        let mut completed = 0u32;
        let mut t = 0;
        while t < run_ms {
            let step = (run_ms - t).min(7_300);
            clock.advance_ms(step);
            t += step;
            completed += u32::try_from(
                c.poll()
                    .iter()
                    .filter(|e| matches!(e, SessionEvent::Pacer { pacer: PacerEvent::BiteCompleted { .. } }))
                    .count(),
            )
            .unwrap();
        }
        c.handle(UserIntent::EndSession).unwrap();
        prop_assert_eq!(c.bites_taken(), completed);
        prop_assert_eq!(c.meal().map(|m| m.total_bites), Some(completed));
    }
}
