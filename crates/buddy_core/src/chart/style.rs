//! Immutable chart configuration.
//!
//! # Responsibility
//! - Hold every layout constant, color and animation timing a renderer uses.
//! - Allow hosts to override any subset from JSON (`#[serde(default)]`).
//!
//! # Invariants
//! - Styles are handed to renderers at construction and never mutated after.

use crate::chart::clock::AnimationSpec;
use crate::chart::draw::Color;
use serde::{Deserialize, Serialize};

/// Layout and palette of the monthly birthday bar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarChartStyle {
    pub padding_top: f32,
    pub padding_bottom: f32,
    pub padding_left: f32,
    pub padding_right: f32,
    pub bar_spacing: f32,
    pub min_bar_width: f32,
    pub corner_radius: f32,
    /// Value labels are drawn only above bars taller than this.
    pub value_label_min_height: f32,
    pub value_label_offset: f32,
    pub value_text_size: f32,
    pub month_label_offset: f32,
    pub month_text_size: f32,
    pub baseline_width: f32,
    pub bar_color: Color,
    pub bar_gradient_color: Color,
    pub track_color: Color,
    pub value_text_color: Color,
    pub month_text_color: Color,
    pub baseline_color: Color,
    pub animation: AnimationSpec,
}

impl Default for BarChartStyle {
    fn default() -> Self {
        Self {
            padding_top: 60.0,
            padding_bottom: 80.0,
            padding_left: 40.0,
            padding_right: 40.0,
            bar_spacing: 8.0,
            min_bar_width: 30.0,
            corner_radius: 12.0,
            value_label_min_height: 40.0,
            value_label_offset: 10.0,
            value_text_size: 28.0,
            month_label_offset: 35.0,
            month_text_size: 24.0,
            baseline_width: 2.0,
            bar_color: Color::argb(0xFF7C_B342),
            bar_gradient_color: Color::argb(0xFF9C_CC65),
            track_color: Color::argb(0xFFE8_E8E8),
            value_text_color: Color::argb(0xFF21_2121),
            month_text_color: Color::argb(0xFF75_7575),
            baseline_color: Color::argb(0xFFBD_BDBD),
            animation: AnimationSpec::new(1500).with_start_delay(300),
        }
    }
}

/// Geometry and palette of the gender donut chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PieChartStyle {
    /// Gap between the ring and the viewport's shorter edge.
    pub ring_margin: f32,
    /// Hole radius as a fraction of the ring radius.
    pub hole_ratio: f32,
    pub male_color: Color,
    pub female_color: Color,
    pub placeholder_color: Color,
    pub hole_color: Color,
    pub animation: AnimationSpec,
}

impl Default for PieChartStyle {
    fn default() -> Self {
        Self {
            ring_margin: 20.0,
            hole_ratio: 0.6,
            male_color: Color::argb(0xFF42_A5F5),
            female_color: Color::argb(0xFFEC_407A),
            placeholder_color: Color::argb(0xFFE8_E8E8),
            hole_color: Color::argb(0xFFFF_FFFF),
            animation: AnimationSpec::new(1200),
        }
    }
}

/// Timing of the numeric summary counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterStyle {
    pub gender_animation: AnimationSpec,
    pub total_animation: AnimationSpec,
}

impl Default for CounterStyle {
    fn default() -> Self {
        Self {
            gender_animation: AnimationSpec::new(800),
            total_animation: AnimationSpec::new(1000),
        }
    }
}

/// Complete dashboard configuration handed to the render context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub bar: BarChartStyle,
    pub pie: PieChartStyle,
    pub counters: CounterStyle,
}

impl ChartConfig {
    /// Parses a JSON override; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
