//! Single-threaded rendering context for the report screen.
//!
//! # Responsibility
//! - Own every animated chart, the summary counters and the proximity
//!   display of one report screen.
//! - Apply data refreshes and animation ticks strictly in arrival order from
//!   one channel, so no draw observes a torn data/progress combination.
//!
//! # Invariants
//! - `RenderContext` is never shared across threads; workers only send
//!   `ChartEvent`s.
//! - A snapshot refresh restarts every animation under a fresh generation.

use crate::chart::bar::BarChartRenderer;
use crate::chart::clock::{animated_count, AnimationRun, ProgressTick};
use crate::chart::draw::{DrawCommand, Viewport};
use crate::chart::pie::PieChartRenderer;
use crate::chart::state::{AnimatedChart, ChartState};
use crate::chart::style::ChartConfig;
use crate::chart::worker::AnimationRunner;
use crate::chart::{BarChart, PieChart};
use crate::report::proximity::UpcomingBirthday;
use crate::service::dashboard_service::DashboardSnapshot;
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::time::{Duration, Instant};

/// Visual targets driven by their own animation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartTarget {
    GenderPie,
    BirthdayBars,
    MaleCounter,
    FemaleCounter,
    TotalCounter,
}

/// The only events allowed to mutate render-side state.
#[derive(Debug, Clone)]
pub enum ChartEvent {
    /// A data refresh finished.
    SnapshotLoaded(Box<DashboardSnapshot>),
    /// Progress computed by an external tick source for one target.
    Tick {
        target: ChartTarget,
        tick: ProgressTick,
    },
    /// Host display-refresh pulse; every chart samples its own clock.
    Frame(Instant),
}

/// Runs started while handling one event, for hosts that drive ticks
/// themselves.
#[derive(Debug, Default)]
pub struct EventOutcome {
    pub redraw: bool,
    pub started: Vec<(ChartTarget, AnimationRun)>,
}

/// Counter values as currently displayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterValues {
    pub male: u32,
    pub female: u32,
    pub total: u32,
}

struct TickSink {
    sender: Sender<ChartEvent>,
    frame_interval: Duration,
}

pub struct RenderContext {
    pie: PieChart,
    bars: BarChart,
    male_counter: ChartState<u32>,
    female_counter: ChartState<u32>,
    total_counter: ChartState<u32>,
    snapshot: Option<DashboardSnapshot>,
    tick_sink: Option<TickSink>,
}

impl RenderContext {
    pub fn new(config: ChartConfig) -> Self {
        let counters = config.counters;
        Self {
            pie: AnimatedChart::new(PieChartRenderer::new(config.pie)),
            bars: AnimatedChart::new(BarChartRenderer::new(config.bar)),
            male_counter: ChartState::new(0, counters.gender_animation),
            female_counter: ChartState::new(0, counters.gender_animation),
            total_counter: ChartState::new(0, counters.total_animation),
            snapshot: None,
            tick_sink: None,
        }
    }

    /// Spawns a timer-driven `AnimationRunner` for every run this context
    /// starts, feeding ticks back through `sender`.
    pub fn with_tick_source(mut self, sender: Sender<ChartEvent>, frame_interval: Duration) -> Self {
        self.tick_sink = Some(TickSink {
            sender,
            frame_interval,
        });
        self
    }

    /// Applies one event at `now`.
    pub fn handle_at(&mut self, event: ChartEvent, now: Instant) -> EventOutcome {
        match event {
            ChartEvent::SnapshotLoaded(snapshot) => self.apply_snapshot(*snapshot, now),
            ChartEvent::Tick { target, tick } => EventOutcome {
                redraw: self.apply_tick(target, tick),
                started: Vec::new(),
            },
            ChartEvent::Frame(at) => EventOutcome {
                redraw: self.advance(at),
                started: Vec::new(),
            },
        }
    }

    pub fn handle(&mut self, event: ChartEvent) -> EventOutcome {
        self.handle_at(event, Instant::now())
    }

    /// Applies every queued event without blocking. Returns whether anything
    /// needs a redraw.
    pub fn drain(&mut self, events: &Receiver<ChartEvent>) -> bool {
        let mut redraw = false;
        loop {
            match events.try_recv() {
                Ok(event) => redraw |= self.handle(event).redraw,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return redraw,
            }
        }
    }

    /// Samples every chart's clock on a host refresh tick.
    pub fn advance(&mut self, now: Instant) -> bool {
        // Non-short-circuiting `|` so every clock is sampled.
        self.pie.advance(now)
            | self.bars.advance(now)
            | self.male_counter.advance(now)
            | self.female_counter.advance(now)
            | self.total_counter.advance(now)
    }

    pub fn apply_tick(&mut self, target: ChartTarget, tick: ProgressTick) -> bool {
        match target {
            ChartTarget::GenderPie => self.pie.apply_tick(tick),
            ChartTarget::BirthdayBars => self.bars.apply_tick(tick),
            ChartTarget::MaleCounter => self.male_counter.apply_tick(tick),
            ChartTarget::FemaleCounter => self.female_counter.apply_tick(tick),
            ChartTarget::TotalCounter => self.total_counter.apply_tick(tick),
        }
    }

    fn apply_snapshot(&mut self, snapshot: DashboardSnapshot, now: Instant) -> EventOutcome {
        let started = vec![
            (
                ChartTarget::GenderPie,
                self.pie.set_data(snapshot.gender, now),
            ),
            (
                ChartTarget::BirthdayBars,
                self.bars.set_data(snapshot.months, now),
            ),
            (
                ChartTarget::MaleCounter,
                self.male_counter.set_data(snapshot.gender.male, now),
            ),
            (
                ChartTarget::FemaleCounter,
                self.female_counter.set_data(snapshot.gender.female, now),
            ),
            (
                ChartTarget::TotalCounter,
                self.total_counter.set_data(snapshot.total_contacts, now),
            ),
        ];
        self.snapshot = Some(snapshot);

        if let Some(sink) = &self.tick_sink {
            for (target, run) in &started {
                AnimationRunner::spawn(*target, *run, sink.frame_interval, sink.sender.clone());
            }
        }

        EventOutcome {
            redraw: true,
            started,
        }
    }

    pub fn pie(&self) -> &PieChart {
        &self.pie
    }

    pub fn bars(&self) -> &BarChart {
        &self.bars
    }

    /// Paint hook for the gender donut.
    pub fn redraw_pie(&self, viewport: Viewport) -> Vec<DrawCommand> {
        self.pie.redraw(viewport)
    }

    /// Paint hook for the monthly bars.
    pub fn redraw_bars(&self, viewport: Viewport) -> Vec<DrawCommand> {
        self.bars.redraw(viewport)
    }

    pub fn counters(&self) -> CounterValues {
        CounterValues {
            male: counter_value(&self.male_counter),
            female: counter_value(&self.female_counter),
            total: counter_value(&self.total_counter),
        }
    }

    /// Proximity display of the latest snapshot.
    pub fn upcoming(&self) -> Option<&UpcomingBirthday> {
        self.snapshot.as_ref()?.upcoming.as_ref()
    }

    pub fn snapshot(&self) -> Option<&DashboardSnapshot> {
        self.snapshot.as_ref()
    }

    /// True once every chart and counter has finished its run.
    pub fn is_settled(&self) -> bool {
        self.pie.state().is_settled()
            && self.bars.state().is_settled()
            && self.male_counter.is_settled()
            && self.female_counter.is_settled()
            && self.total_counter.is_settled()
    }
}

fn counter_value(state: &ChartState<u32>) -> u32 {
    animated_count(*state.data(), state.progress())
}
