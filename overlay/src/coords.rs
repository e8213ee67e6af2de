//! Coordinate mapping between fraction, pixel and output-unit space.
//!
//! Three spaces are in play:
//!
//! - **Fraction space**: percent of page width/height, origin top-left. The
//!   only space positions are ever stored in.
//! - **Pixel space**: the rendered page on screen, origin top-left. Its size
//!   follows the runtime render scale.
//! - **Output-unit space**: the exported page (points), origin bottom-left.
//!   Independent of any render scale.
//!
//! Every function here is pure. Pixel and output-unit positions are always
//! derived from fraction positions, never the other way round except for
//! pointer input.

#[cfg(test)]
#[path = "coords_test.rs"]
mod coords_test;

use serde::{Deserialize, Serialize};

use crate::consts::{FONT_SIZE_MAX, FONT_SIZE_MIN, FRACTION_FULL, X_FRACTION_MAX, Y_FRACTION_MIN};

/// A point in pixel or output-unit space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A position (or offset) in fraction space, in percent of the page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FractionPoint {
    pub x: f64,
    pub y: f64,
}

impl FractionPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise sum, used to apply a drag or paste offset.
    #[must_use]
    pub fn offset_by(self, delta: FractionPoint) -> Self {
        Self { x: self.x + delta.x, y: self.y + delta.y }
    }
}

/// Size of a rendered page in CSS pixels at the current render scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelBox {
    pub width: f64,
    pub height: f64,
}

impl PixelBox {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Size of an output page in document units (points).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Pixel box of this page when rasterized at `render_scale`.
    #[must_use]
    pub fn scaled(self, render_scale: f64) -> PixelBox {
        PixelBox { width: self.width * render_scale, height: self.height * render_scale }
    }
}

fn scale_to_fraction(value: f64, extent: f64) -> f64 {
    if extent > 0.0 { value / extent * FRACTION_FULL } else { 0.0 }
}

fn scale_from_fraction(fraction: f64, extent: f64) -> f64 {
    fraction / FRACTION_FULL * extent
}

/// Project a fraction position onto a rendered page.
#[must_use]
pub fn pixel_from_fraction(p: FractionPoint, page: PixelBox) -> Point {
    Point { x: scale_from_fraction(p.x, page.width), y: scale_from_fraction(p.y, page.height) }
}

/// Inverse of [`pixel_from_fraction`] for an absolute pointer position.
#[must_use]
pub fn fraction_from_pixel(p: Point, page: PixelBox) -> FractionPoint {
    FractionPoint { x: scale_to_fraction(p.x, page.width), y: scale_to_fraction(p.y, page.height) }
}

/// Convert a pixel offset into a fraction-space offset.
///
/// Callers pass the total offset from the start of a gesture, never a
/// per-event increment, so repeated calls cannot accumulate drift.
#[must_use]
pub fn fraction_from_pixel_delta(dx: f64, dy: f64, page: PixelBox) -> FractionPoint {
    FractionPoint { x: scale_to_fraction(dx, page.width), y: scale_to_fraction(dy, page.height) }
}

/// Project a fraction position onto an output page.
///
/// Output space has its origin at the bottom-left, so the vertical axis flips.
#[must_use]
pub fn output_from_fraction(p: FractionPoint, page: PageSize) -> Point {
    Point {
        x: scale_from_fraction(p.x, page.width),
        y: page.height - scale_from_fraction(p.y, page.height),
    }
}

/// Inverse of [`output_from_fraction`].
#[must_use]
pub fn fraction_from_output(p: Point, page: PageSize) -> FractionPoint {
    FractionPoint {
        x: scale_to_fraction(p.x, page.width),
        y: scale_to_fraction(page.height - p.y, page.height),
    }
}

/// On-screen font size for a nominal size at the page's render scale.
#[must_use]
pub fn visual_font_size_px(font_size: f64, render_scale: f64) -> f64 {
    font_size * render_scale
}

/// Keep an interactively moved position inside the draggable area.
#[must_use]
pub fn clamp_position(p: FractionPoint) -> FractionPoint {
    FractionPoint {
        x: p.x.clamp(0.0, X_FRACTION_MAX),
        y: p.y.clamp(Y_FRACTION_MIN, FRACTION_FULL),
    }
}

/// Bound a requested font size.
#[must_use]
pub fn clamp_font_size(size: f64) -> f64 {
    size.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX)
}
