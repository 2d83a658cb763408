//! Per-chart animation state.
//!
//! # Responsibility
//! - Own the current dataset, current progress and run generation of one
//!   visual target.
//! - Accept progress from either a host refresh tick (`advance`) or an
//!   external tick source (`apply_tick`).
//!
//! # Invariants
//! - Replacing the dataset restarts progress at 0 under a fresh generation,
//!   so data and progress always belong to the same run.
//! - Progress within one generation never decreases.

use crate::chart::clock::{AnimationClock, AnimationRun, AnimationSpec, ProgressTick, RunGeneration};
use crate::chart::draw::{DrawCommand, Viewport};
use crate::chart::ChartRenderer;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct ChartState<D> {
    data: D,
    progress: f32,
    clock: AnimationClock,
}

impl<D> ChartState<D> {
    /// Idle state showing `data` at progress 0 until the first run starts.
    pub fn new(data: D, spec: AnimationSpec) -> Self {
        Self {
            data,
            progress: 0.0,
            clock: AnimationClock::new(spec),
        }
    }

    /// Replaces the dataset and starts a new run from 0.
    pub fn set_data(&mut self, data: D, now: Instant) -> AnimationRun {
        self.data = data;
        self.progress = 0.0;
        self.clock.start(now)
    }

    /// Samples the clock on a host refresh tick. Returns whether progress moved.
    pub fn advance(&mut self, now: Instant) -> bool {
        match self.clock.tick(now) {
            Some(tick) => {
                self.progress = tick.progress;
                true
            }
            None => false,
        }
    }

    /// Applies a tick produced elsewhere. Stale or regressing ticks are dropped.
    pub fn apply_tick(&mut self, tick: ProgressTick) -> bool {
        if !self.clock.accept(tick) {
            return false;
        }
        self.progress = tick.progress;
        true
    }

    pub fn data(&self) -> &D {
        &self.data
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn generation(&self) -> RunGeneration {
        self.clock.generation()
    }

    pub fn current_run(&self) -> Option<AnimationRun> {
        self.clock.current_run()
    }

    /// True once no run is producing progress anymore.
    pub fn is_settled(&self) -> bool {
        !self.clock.is_running()
    }
}

/// A renderer paired with its animation state.
pub struct AnimatedChart<R: ChartRenderer> {
    renderer: R,
    state: ChartState<R::Data>,
}

impl<R: ChartRenderer> AnimatedChart<R>
where
    R::Data: Default,
{
    pub fn new(renderer: R) -> Self {
        let spec = renderer.animation();
        Self {
            renderer,
            state: ChartState::new(R::Data::default(), spec),
        }
    }
}

impl<R: ChartRenderer> AnimatedChart<R> {
    pub fn set_data(&mut self, data: R::Data, now: Instant) -> AnimationRun {
        self.state.set_data(data, now)
    }

    pub fn advance(&mut self, now: Instant) -> bool {
        self.state.advance(now)
    }

    pub fn apply_tick(&mut self, tick: ProgressTick) -> bool {
        self.state.apply_tick(tick)
    }

    pub fn state(&self) -> &ChartState<R::Data> {
        &self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Paint hook: commands for the current data at the current progress.
    pub fn redraw(&self, viewport: Viewport) -> Vec<DrawCommand> {
        self.renderer
            .render(self.state.data(), self.state.progress(), viewport)
    }
}
