use buddy_core::chart::clock::{AnimationClock, AnimationSpec, Easing, ProgressTick};
use buddy_core::chart::state::ChartState;
use std::time::{Duration, Instant};

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

#[test]
fn idle_clock_emits_nothing() {
    let mut clock = AnimationClock::new(AnimationSpec::new(1000));
    assert!(!clock.is_running());
    assert!(clock.tick(Instant::now()).is_none());
}

#[test]
fn progress_is_monotonic_and_ends_at_exactly_one() {
    let spec = AnimationSpec::new(1500).with_start_delay(300);
    let mut clock = AnimationClock::new(spec);
    let start = Instant::now();
    clock.start(start);

    assert!(clock.tick(start + ms(100)).is_none(), "still delayed");

    let mut last = -1.0_f32;
    let mut final_seen = false;
    for step in 0..=40 {
        if let Some(tick) = clock.tick(start + ms(300 + step * 50)) {
            assert!(tick.progress > last);
            assert!((0.0..=1.0).contains(&tick.progress));
            if tick.progress < 1.0 {
                assert!(!tick.is_final());
            }
            last = tick.progress;
            final_seen |= tick.is_final();
        }
    }

    assert!(final_seen);
    assert_eq!(last, 1.0);
    assert!(!clock.is_running());
    assert!(clock.tick(start + ms(10_000)).is_none());
}

#[test]
fn repeated_sample_at_same_instant_is_not_reemitted() {
    let mut clock = AnimationClock::new(AnimationSpec::new(1000));
    let start = Instant::now();
    clock.start(start);

    assert!(clock.tick(start + ms(500)).is_some());
    assert!(clock.tick(start + ms(500)).is_none());
    assert!(clock.tick(start + ms(400)).is_none());
}

#[test]
fn restart_supersedes_previous_generation() {
    let mut clock = AnimationClock::new(AnimationSpec::new(1000).with_easing(Easing::Linear));
    let start = Instant::now();
    let first = clock.start(start);
    let stale = first.tick_at(start + ms(900)).unwrap();

    let second = clock.start(start + ms(100));
    assert!(second.generation > first.generation);
    assert_eq!(clock.generation(), second.generation);

    assert!(!clock.accept(stale), "stale generation must be dropped");
    let fresh = second.tick_at(start + ms(600)).unwrap();
    assert!(clock.accept(fresh));
    assert!((fresh.progress - 0.5).abs() < 1e-3);
}

#[test]
fn cancel_invalidates_outstanding_ticks() {
    let mut clock = AnimationClock::new(AnimationSpec::new(1000));
    let start = Instant::now();
    let run = clock.start(start);
    clock.cancel();

    assert!(!clock.is_running());
    assert!(!clock.accept(run.tick_at(start + ms(200)).unwrap()));
}

#[test]
fn chart_state_restarts_data_and_progress_together() {
    let spec = AnimationSpec::new(1000).with_easing(Easing::Linear);
    let mut state = ChartState::new(0_u32, spec);
    let start = Instant::now();

    let first = state.set_data(10, start);
    assert!(state.apply_tick(first.tick_at(start + ms(800)).unwrap()));
    assert!(state.progress() > 0.7);

    let second = state.set_data(20, start + ms(850));
    assert_eq!(*state.data(), 20);
    assert_eq!(state.progress(), 0.0);
    assert_eq!(state.generation(), second.generation);

    // Late tick from the superseded run cannot touch the new dataset.
    assert!(!state.apply_tick(first.tick_at(start + ms(1000)).unwrap()));
    assert_eq!(state.progress(), 0.0);

    assert!(state.advance(start + ms(2000)));
    assert_eq!(state.progress(), 1.0);
    assert!(state.is_settled());
}

#[test]
fn regressing_external_ticks_are_dropped() {
    let mut state = ChartState::new(0_u32, AnimationSpec::new(1000));
    let run = state.set_data(5, Instant::now());

    let ahead = ProgressTick {
        generation: run.generation,
        progress: 0.6,
    };
    let behind = ProgressTick {
        generation: run.generation,
        progress: 0.4,
    };
    assert!(state.apply_tick(ahead));
    assert!(!state.apply_tick(behind));
    assert_eq!(state.progress(), 0.6);
}

#[test]
fn spec_overrides_parse_from_json() {
    let spec: AnimationSpec =
        serde_json::from_str(r#"{"duration_ms": 250, "easing": "linear"}"#).unwrap();
    assert_eq!(spec.duration_ms, 250);
    assert_eq!(spec.start_delay_ms, 0);
    assert_eq!(spec.easing, Easing::Linear);
}
