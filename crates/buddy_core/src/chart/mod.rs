//! Animated chart rendering.
//!
//! # Responsibility
//! - Interpolate report aggregates into backend-neutral drawing commands.
//! - Keep every chart's state on one rendering context (`RenderContext`),
//!   fed by a single event channel.
//!
//! # Invariants
//! - Renderers are pure: output depends only on data, progress, viewport and
//!   the style given at construction.
//! - Chart state is mutated only through `ChartState`, never from worker
//!   threads directly.

pub mod bar;
pub mod clock;
pub mod context;
pub mod draw;
pub mod pie;
pub mod state;
pub mod style;
pub mod worker;

use crate::chart::clock::AnimationSpec;
use crate::chart::draw::{DrawCommand, Viewport};

/// Seam between chart state and a concrete chart kind.
pub trait ChartRenderer {
    type Data;

    fn render(&self, data: &Self::Data, progress: f32, viewport: Viewport) -> Vec<DrawCommand>;

    /// Animation timing used whenever this chart receives new data.
    fn animation(&self) -> AnimationSpec;
}

pub type BarChart = state::AnimatedChart<bar::BarChartRenderer>;
pub type PieChart = state::AnimatedChart<pie::PieChartRenderer>;
