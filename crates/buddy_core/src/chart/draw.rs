//! Backend-neutral drawing commands emitted by chart renderers.
//!
//! Hosts translate these into their own canvas calls. Coordinates are in
//! viewport pixels with the origin at the top-left corner; angles are in
//! degrees, 0° pointing at 3 o'clock and growing clockwise.

use serde::{Deserialize, Serialize};

/// ARGB color packed as `0xAARRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const fn argb(value: u32) -> Self {
        Self(value)
    }
}

/// Size of the surface a chart is drawn into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A viewport with no positive area renders nothing.
    pub fn is_drawable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle given by its edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center_x(&self) -> f32 {
        (self.left + self.right) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Fill {
    Solid { color: Color },
    /// Linear gradient from the rect's top edge to its bottom edge.
    VerticalGradient { top: Color, bottom: Color },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "op")]
pub enum DrawCommand {
    RoundRect {
        rect: Rect,
        corner_radius: f32,
        fill: Fill,
    },
    Text {
        text: String,
        /// Anchor point; `y` is the text baseline.
        at: Point,
        size: f32,
        color: Color,
        align: TextAlign,
        bold: bool,
    },
    Line {
        from: Point,
        to: Point,
        stroke_width: f32,
        color: Color,
    },
    Circle {
        center: Point,
        radius: f32,
        color: Color,
    },
    /// Filled pie wedge (arc closed through the center).
    Wedge {
        center: Point,
        radius: f32,
        start_angle: f32,
        sweep_angle: f32,
        color: Color,
    },
}
