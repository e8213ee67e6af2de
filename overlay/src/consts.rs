//! Shared numeric constants for the overlay crate.

// ── Position bounds (fraction space, percent of page) ───────────

/// Largest x an interactive move may leave an annotation at.
pub const X_FRACTION_MAX: f64 = 95.0;

/// Smallest y an interactive move may leave an annotation at.
///
/// Positions are bottom anchors, so a small floor keeps the box on the page.
pub const Y_FRACTION_MIN: f64 = 2.0;

/// Full extent of fraction space on either axis.
pub const FRACTION_FULL: f64 = 100.0;

// ── Type ────────────────────────────────────────────────────────

/// Smallest font size reachable through a size command, in points.
pub const FONT_SIZE_MIN: f64 = 8.0;

/// Largest font size reachable through a size command, in points.
pub const FONT_SIZE_MAX: f64 = 72.0;

/// Font size given to newly placed annotations, in points.
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

/// Line height as a multiple of font size. Shared by screen and export.
pub const LINE_HEIGHT_RATIO: f64 = 1.25;

/// Color given to newly placed annotations.
pub const DEFAULT_COLOR: &str = "#000000";

// ── Layout ──────────────────────────────────────────────────────

/// Padding around the interactive text box, in CSS pixels.
pub const VISUAL_PADDING_PX: f64 = 4.0;

// ── Clipboard ───────────────────────────────────────────────────

/// Offset applied to both axes of a pasted copy, in fraction units.
pub const PASTE_OFFSET: f64 = 2.0;
