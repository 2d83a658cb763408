//! Monthly birthday bar chart renderer.
//!
//! # Invariants
//! - Exactly 12 bars are laid out regardless of data.
//! - Bar heights are normalized by `MonthlyHistogram::normalization_max`,
//!   which is never zero.
//! - A bar with zero rendered height emits no foreground command.

use crate::chart::draw::{Color, DrawCommand, Fill, Point, Rect, TextAlign, Viewport};
use crate::chart::style::BarChartStyle;
use crate::chart::ChartRenderer;
use crate::report::histogram::{MonthlyHistogram, MONTHS_PER_YEAR, MONTH_ABBREVIATIONS};

/// Resolved geometry of one bar slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarSlot {
    pub month_index: usize,
    pub value: u32,
    /// Full-height background track.
    pub track: Rect,
    /// Interpolated foreground height in pixels.
    pub bar_height: f32,
}

impl BarSlot {
    pub fn foreground(&self) -> Option<Rect> {
        (self.bar_height > 0.0).then(|| {
            Rect::new(
                self.track.left,
                self.track.bottom - self.bar_height,
                self.track.right,
                self.track.bottom,
            )
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct BarChartRenderer {
    style: BarChartStyle,
}

impl BarChartRenderer {
    pub fn new(style: BarChartStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &BarChartStyle {
        &self.style
    }

    /// Height available to a full-scale bar in `viewport`.
    pub fn chart_height(&self, viewport: Viewport) -> f32 {
        (viewport.height - self.style.padding_top - self.style.padding_bottom).max(0.0)
    }

    /// Width shared by all bars; never below the style minimum.
    pub fn bar_width(&self, viewport: Viewport) -> f32 {
        let chart_width = viewport.width - self.style.padding_left - self.style.padding_right;
        let gaps = self.style.bar_spacing * (MONTHS_PER_YEAR - 1) as f32;
        ((chart_width - gaps) / MONTHS_PER_YEAR as f32).max(self.style.min_bar_width)
    }

    /// Lays out all 12 bars for `histogram` at `progress`.
    pub fn layout(
        &self,
        histogram: &MonthlyHistogram,
        progress: f32,
        viewport: Viewport,
    ) -> [BarSlot; MONTHS_PER_YEAR] {
        let progress = progress.clamp(0.0, 1.0);
        let chart_height = self.chart_height(viewport);
        let bar_width = self.bar_width(viewport);
        let max_value = histogram.normalization_max() as f32;
        let top = self.style.padding_top;
        let bottom = top + chart_height;

        std::array::from_fn(|month_index| {
            let value = histogram.buckets()[month_index];
            let left =
                self.style.padding_left + month_index as f32 * (bar_width + self.style.bar_spacing);
            BarSlot {
                month_index,
                value,
                track: Rect::new(left, top, left + bar_width, bottom),
                bar_height: (value as f32 * progress / max_value) * chart_height,
            }
        })
    }

    /// Emits drawing commands for `histogram` at `progress`.
    pub fn render(
        &self,
        histogram: &MonthlyHistogram,
        progress: f32,
        viewport: Viewport,
    ) -> Vec<DrawCommand> {
        if !viewport.is_drawable() {
            return Vec::new();
        }

        let style = &self.style;
        let mut commands = Vec::with_capacity(MONTHS_PER_YEAR * 4 + 1);

        for slot in self.layout(histogram, progress, viewport) {
            commands.push(DrawCommand::RoundRect {
                rect: slot.track,
                corner_radius: style.corner_radius,
                fill: Fill::Solid {
                    color: style.track_color,
                },
            });

            if let Some(bar) = slot.foreground() {
                commands.push(DrawCommand::RoundRect {
                    rect: bar,
                    corner_radius: style.corner_radius,
                    fill: Fill::VerticalGradient {
                        top: style.bar_gradient_color,
                        bottom: style.bar_color,
                    },
                });

                if slot.value > 0 && slot.bar_height > style.value_label_min_height {
                    commands.push(text(
                        slot.value.to_string(),
                        Point::new(bar.center_x(), bar.top - style.value_label_offset),
                        style.value_text_size,
                        style.value_text_color,
                        true,
                    ));
                }
            }

            commands.push(text(
                MONTH_ABBREVIATIONS[slot.month_index].to_string(),
                Point::new(
                    slot.track.center_x(),
                    slot.track.bottom + style.month_label_offset,
                ),
                style.month_text_size,
                style.month_text_color,
                false,
            ));
        }

        let baseline_y = style.padding_top + self.chart_height(viewport);
        commands.push(DrawCommand::Line {
            from: Point::new(style.padding_left, baseline_y),
            to: Point::new(viewport.width - style.padding_right, baseline_y),
            stroke_width: style.baseline_width,
            color: style.baseline_color,
        });

        commands
    }
}

impl ChartRenderer for BarChartRenderer {
    type Data = MonthlyHistogram;

    fn render(&self, data: &MonthlyHistogram, progress: f32, viewport: Viewport) -> Vec<DrawCommand> {
        BarChartRenderer::render(self, data, progress, viewport)
    }

    fn animation(&self) -> crate::chart::clock::AnimationSpec {
        self.style.animation
    }
}

fn text(value: String, at: Point, size: f32, color: Color, bold: bool) -> DrawCommand {
    DrawCommand::Text {
        text: value,
        at,
        size,
        color,
        align: TextAlign::Center,
        bold,
    }
}
