//! Eased progress driver shared by every animated chart.
//!
//! # Responsibility
//! - Turn elapsed wall time into an eased progress value in `[0, 1]`.
//! - Tag every run with a fresh `RunGeneration` so a newer run supersedes
//!   older ones without cancelling timers.
//!
//! # Invariants
//! - Within one run, emitted progress never decreases.
//! - The last emitted value of a completed run is exactly `1.0`.
//! - Nothing is emitted before the run's start delay has elapsed.
//! - Ticks carrying a generation other than the current one are rejected.

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Easing curve applied to linear time progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    /// Fast start, slow finish: `1 - (1 - t)^2`.
    #[default]
    Decelerate,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Decelerate => 1.0 - (1.0 - t) * (1.0 - t),
        }
    }
}

/// Timing parameters of one animation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSpec {
    pub duration_ms: u64,
    pub start_delay_ms: u64,
    pub easing: Easing,
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self {
            duration_ms: 1000,
            start_delay_ms: 0,
            easing: Easing::Decelerate,
        }
    }
}

impl AnimationSpec {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            ..Self::default()
        }
    }

    pub fn with_start_delay(mut self, start_delay_ms: u64) -> Self {
        self.start_delay_ms = start_delay_ms;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }

    /// Eased progress after `elapsed` since the run was started.
    ///
    /// Returns `None` while the start delay is still pending.
    pub fn progress_at(&self, elapsed: Duration) -> Option<f32> {
        let running = elapsed.checked_sub(self.start_delay())?;
        let duration = self.duration();
        if duration.is_zero() || running >= duration {
            return Some(1.0);
        }
        let linear = running.as_secs_f32() / duration.as_secs_f32();
        // Only a completed run may report exactly 1.0.
        Some(self.easing.apply(linear).min(1.0 - f32::EPSILON))
    }
}

/// Monotonically increasing tag distinguishing successive runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RunGeneration(u64);

impl RunGeneration {
    pub fn value(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// One progress sample of a specific run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressTick {
    pub generation: RunGeneration,
    pub progress: f32,
}

impl ProgressTick {
    pub fn is_final(&self) -> bool {
        self.progress >= 1.0
    }
}

/// Detached description of a started run.
///
/// Copies of this value can compute ticks on another thread; whoever receives
/// them still validates the generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationRun {
    pub generation: RunGeneration,
    pub spec: AnimationSpec,
    pub started_at: Instant,
}

impl AnimationRun {
    pub fn tick_at(&self, now: Instant) -> Option<ProgressTick> {
        let elapsed = now.saturating_duration_since(self.started_at);
        self.spec.progress_at(elapsed).map(|progress| ProgressTick {
            generation: self.generation,
            progress,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct RunState {
    run: AnimationRun,
    last_progress: Option<f32>,
    finished: bool,
}

/// Supersedable animation clock owned by one visual target.
#[derive(Debug, Clone)]
pub struct AnimationClock {
    spec: AnimationSpec,
    generation: RunGeneration,
    active: Option<RunState>,
}

impl AnimationClock {
    pub fn new(spec: AnimationSpec) -> Self {
        Self {
            spec,
            generation: RunGeneration::default(),
            active: None,
        }
    }

    pub fn spec(&self) -> AnimationSpec {
        self.spec
    }

    pub fn generation(&self) -> RunGeneration {
        self.generation
    }

    /// Starts a new run at `now`, superseding any run still in flight.
    pub fn start(&mut self, now: Instant) -> AnimationRun {
        if let Some(state) = self.active.filter(|state| !state.finished) {
            debug!(
                "event=chart_run_superseded module=chart status=ok generation={} last_progress={:.3}",
                state.run.generation.value(),
                state.last_progress.unwrap_or(0.0)
            );
        }

        self.generation = self.generation.next();
        let run = AnimationRun {
            generation: self.generation,
            spec: self.spec,
            started_at: now,
        };
        self.active = Some(RunState {
            run,
            last_progress: None,
            finished: false,
        });
        debug!(
            "event=chart_run_started module=chart status=ok generation={} duration_ms={} delay_ms={}",
            run.generation.value(),
            self.spec.duration_ms,
            self.spec.start_delay_ms
        );
        run
    }

    /// Drops the active run; later ticks of it are treated as stale.
    pub fn cancel(&mut self) {
        if self.active.take().is_some() {
            self.generation = self.generation.next();
        }
    }

    /// Active run, if one is still producing progress.
    pub fn current_run(&self) -> Option<AnimationRun> {
        self.active
            .filter(|state| !state.finished)
            .map(|state| state.run)
    }

    pub fn is_running(&self) -> bool {
        self.current_run().is_some()
    }

    /// Samples the active run at `now`.
    ///
    /// Returns `None` when idle, finished, still in the start delay, or when
    /// progress has not advanced since the previous sample.
    pub fn tick(&mut self, now: Instant) -> Option<ProgressTick> {
        let tick = self.current_run()?.tick_at(now)?;
        self.accept(tick).then_some(tick)
    }

    /// Validates an externally computed tick and records it.
    ///
    /// Stale generations, finished runs and non-advancing progress are
    /// rejected.
    pub fn accept(&mut self, tick: ProgressTick) -> bool {
        let Some(state) = self.active.as_mut() else {
            return false;
        };
        if tick.generation != state.run.generation || state.finished {
            trace!(
                "event=chart_tick_discarded module=chart status=stale tick_generation={} current_generation={}",
                tick.generation.value(),
                self.generation.value()
            );
            return false;
        }
        if state
            .last_progress
            .is_some_and(|last| tick.progress <= last)
        {
            return false;
        }

        state.last_progress = Some(tick.progress);
        state.finished = tick.is_final();
        true
    }
}

/// Integer counter value shown at `progress` of its animation.
///
/// Truncates toward zero like a step counter; `progress >= 1.0` is exact.
pub fn animated_count(target: u32, progress: f32) -> u32 {
    if progress >= 1.0 {
        return target;
    }
    let scaled = f64::from(target) * f64::from(progress.max(0.0));
    scaled.floor() as u32
}

#[cfg(test)]
mod tests {
    use super::{animated_count, AnimationSpec, Easing};
    use std::time::Duration;

    #[test]
    fn decelerate_is_ahead_of_linear_mid_run() {
        assert!(Easing::Decelerate.apply(0.5) > 0.5);
        assert_eq!(Easing::Decelerate.apply(0.0), 0.0);
        assert_eq!(Easing::Decelerate.apply(1.0), 1.0);
    }

    #[test]
    fn progress_is_withheld_during_start_delay() {
        let spec = AnimationSpec::new(1000).with_start_delay(300);
        assert_eq!(spec.progress_at(Duration::from_millis(299)), None);
        assert_eq!(spec.progress_at(Duration::from_millis(300)), Some(0.0));
        assert_eq!(spec.progress_at(Duration::from_millis(1300)), Some(1.0));
    }

    #[test]
    fn zero_duration_completes_immediately() {
        let spec = AnimationSpec::new(0);
        assert_eq!(spec.progress_at(Duration::ZERO), Some(1.0));
    }

    #[test]
    fn counter_truncates_until_final_value() {
        assert_eq!(animated_count(7, 0.0), 0);
        assert_eq!(animated_count(7, 0.5), 3);
        assert_eq!(animated_count(7, 0.999), 6);
        assert_eq!(animated_count(7, 1.0), 7);
    }
}
