//! Gender donut chart renderer.
//!
//! # Invariants
//! - Slices start at 12 o'clock (-90°) and run clockwise, male then female.
//! - The drawn extent is `360° * progress`; the male slice fills first.
//! - At `progress == 1.0` the female sweep is exactly `360° - male`, so the
//!   slices close the ring with no gap or overlap.
//! - A zero total draws only the neutral placeholder disc and the hole.

use crate::chart::clock::AnimationSpec;
use crate::chart::draw::{DrawCommand, Viewport};
use crate::chart::style::PieChartStyle;
use crate::chart::ChartRenderer;
use crate::report::histogram::GenderCounts;

pub const START_ANGLE: f32 = -90.0;
pub const FULL_TURN: f32 = 360.0;

/// Sweep angles of both slices at one progress value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceSweeps {
    /// Male target angle at rest; also where the female slice starts.
    pub male_target: f32,
    pub male: f32,
    pub female: f32,
}

impl SliceSweeps {
    /// Resolves sweeps for `counts`; `None` when there is nothing to chart.
    pub fn at(counts: GenderCounts, progress: f32) -> Option<Self> {
        let total = counts.total();
        if total == 0 {
            return None;
        }

        let male_target = FULL_TURN * counts.male as f32 / total as f32;
        if progress >= 1.0 {
            return Some(Self {
                male_target,
                male: male_target,
                female: FULL_TURN - male_target,
            });
        }

        let drawn = FULL_TURN * progress.max(0.0);
        let male = drawn.min(male_target);
        Some(Self {
            male_target,
            male,
            female: drawn - male,
        })
    }

    pub fn female_start(&self) -> f32 {
        START_ANGLE + self.male_target
    }
}

#[derive(Debug, Clone, Default)]
pub struct PieChartRenderer {
    style: PieChartStyle,
}

impl PieChartRenderer {
    pub fn new(style: PieChartStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &PieChartStyle {
        &self.style
    }

    /// Outer ring radius for `viewport`.
    pub fn radius(&self, viewport: Viewport) -> f32 {
        (viewport.width.min(viewport.height) / 2.0 - self.style.ring_margin).max(0.0)
    }

    /// Emits drawing commands for `counts` at `progress`.
    pub fn render(&self, counts: GenderCounts, progress: f32, viewport: Viewport) -> Vec<DrawCommand> {
        if !viewport.is_drawable() {
            return Vec::new();
        }

        let style = &self.style;
        let center = viewport.center();
        let radius = self.radius(viewport);
        let mut commands = vec![DrawCommand::Circle {
            center,
            radius,
            color: style.placeholder_color,
        }];

        if let Some(sweeps) = SliceSweeps::at(counts, progress) {
            if sweeps.male > 0.0 {
                commands.push(DrawCommand::Wedge {
                    center,
                    radius,
                    start_angle: START_ANGLE,
                    sweep_angle: sweeps.male,
                    color: style.male_color,
                });
            }
            if sweeps.female > 0.0 {
                commands.push(DrawCommand::Wedge {
                    center,
                    radius,
                    start_angle: sweeps.female_start(),
                    sweep_angle: sweeps.female,
                    color: style.female_color,
                });
            }
        }

        commands.push(DrawCommand::Circle {
            center,
            radius: radius * style.hole_ratio,
            color: style.hole_color,
        });
        commands
    }
}

impl ChartRenderer for PieChartRenderer {
    type Data = GenderCounts;

    fn render(&self, data: &GenderCounts, progress: f32, viewport: Viewport) -> Vec<DrawCommand> {
        PieChartRenderer::render(self, *data, progress, viewport)
    }

    fn animation(&self) -> AnimationSpec {
        self.style.animation
    }
}
