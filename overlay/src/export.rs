//! Export projection and the screen sizing that must agree with it.
//!
//! Both the interactive overlay and the exported page derive everything from
//! the same stored annotation: position from fraction space, size from the
//! nominal font size, line spacing from [`LINE_HEIGHT_RATIO`]. Screen values
//! additionally depend on the render scale; export values never do.
//!
//! The stored point is the bottom anchor of the text block. On screen the
//! padded box is placed so its content ends on that point; on export the last
//! line's baseline lands on it and earlier lines stack upward.
//!
//! The document itself is handled by collaborators: a [`Compositor`] decodes
//! page geometry and writes draw instructions into the output bytes, and a
//! [`PageRenderer`] reports the pixel box of each rasterized page.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use serde::{Deserialize, Serialize};

use crate::consts::{LINE_HEIGHT_RATIO, VISUAL_PADDING_PX};
use crate::coords::{PageSize, PixelBox, output_from_fraction, pixel_from_fraction, visual_font_size_px};
use crate::doc::{Annotation, AnnotationStore, FontFamily};

/// RGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0.0, g: 0.0, b: 0.0 };

    /// Parse `#rrggbb` or `rrggbb`. Anything else is black.
    #[must_use]
    pub fn from_hex(color: &str) -> Self {
        let hex = color.trim().trim_start_matches('#');
        let channel = |range: std::ops::Range<usize>| {
            match hex.get(range).map(|h| u8::from_str_radix(h, 16)) {
                Some(Ok(v)) => Some(f64::from(v) / 255.0),
                _ => None,
            }
        };
        match (hex.len(), channel(0..2), channel(2..4), channel(4..6)) {
            (6, Some(r), Some(g), Some(b)) => Rgb { r, g, b },
            _ => Self::BLACK,
        }
    }
}

/// Per-page output geometry, as decoded from the source document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentGeometry {
    pages: Vec<PageSize>,
}

impl DocumentGeometry {
    #[must_use]
    pub fn new(pages: Vec<PageSize>) -> Self {
        Self { pages }
    }

    /// Output size of a 1-based page, or `None` if there is no such page.
    #[must_use]
    pub fn page_size(&self, page_index: u32) -> Option<PageSize> {
        self.iter().find(|(index, _)| *index == page_index).map(|(_, size)| size)
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// 1-based indices paired with page sizes.
    pub fn iter(&self) -> impl Iterator<Item = (u32, PageSize)> + '_ {
        (1u32..).zip(self.pages.iter().copied())
    }
}

/// One block of text to draw on an output page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawInstruction {
    /// 1-based page the text belongs to.
    pub page_index: u32,
    /// Anchor x in output units from the left edge.
    pub x: f64,
    /// Anchor y in output units from the bottom edge. Baseline of the last line.
    pub y: f64,
    /// Text exactly as stored; `\n` is an explicit line break.
    pub text: String,
    /// Font size in output units.
    pub font_size: f64,
    /// Font to draw with.
    pub font_family: FontFamily,
    /// Distance between consecutive baselines in output units.
    pub line_spacing: f64,
    /// Fill color for the glyphs.
    pub color: Rgb,
}

impl DrawInstruction {
    /// Lines of the text, split on explicit breaks only.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line))
    }

    /// Baseline of the first line, so the last line ends on the anchor.
    #[must_use]
    pub fn first_baseline(&self) -> f64 {
        let extra_lines = self.lines().count().saturating_sub(1);
        #[allow(clippy::cast_precision_loss)]
        let extra = extra_lines as f64;
        self.y + extra * self.line_spacing
    }
}

/// Knobs for [`project`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Draw with each annotation's own color instead of solid black.
    pub honor_color: bool,
}

/// Project every exportable annotation onto its output page.
///
/// Annotations on pages the document does not have, and annotations whose
/// text is blank, produce nothing.
#[must_use]
pub fn project(store: &AnnotationStore, geometry: &DocumentGeometry, options: ExportOptions) -> Vec<DrawInstruction> {
    store
        .iter()
        .filter_map(|annotation| {
            let Some(page) = geometry.page_size(annotation.page_index) else {
                tracing::debug!(id = %annotation.id, page_index = annotation.page_index, "annotation on missing page skipped");
                return None;
            };
            if annotation.is_blank() {
                return None;
            }
            Some(project_one(annotation, page, options))
        })
        .collect()
}

/// Draw instruction for one annotation on a page of the given size.
#[must_use]
pub fn project_one(annotation: &Annotation, page: PageSize, options: ExportOptions) -> DrawInstruction {
    let anchor = output_from_fraction(annotation.position(), page);
    let color = if options.honor_color { Rgb::from_hex(&annotation.color) } else { Rgb::BLACK };
    DrawInstruction {
        page_index: annotation.page_index,
        x: anchor.x,
        y: anchor.y,
        text: annotation.text.clone(),
        font_size: annotation.font_size,
        font_family: annotation.font_family,
        line_spacing: annotation.font_size * LINE_HEIGHT_RATIO,
        color,
    }
}

/// On-screen sizing for one annotation on a rendered page.
///
/// All values are CSS pixels relative to the page's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenBox {
    /// Left edge of the padded box.
    pub left: f64,
    /// Bottom edge of the padded box (measured from the top of the page).
    pub bottom: f64,
    /// Rendered font size.
    pub font_size: f64,
    /// Rendered line height.
    pub line_height: f64,
    /// Padding on every side of the text.
    pub padding: f64,
}

impl ScreenBox {
    /// Lay out `annotation` on a page rendered at `render_scale`.
    #[must_use]
    pub fn for_annotation(annotation: &Annotation, page_box: PixelBox, render_scale: f64) -> Self {
        let anchor = pixel_from_fraction(annotation.position(), page_box);
        let font_size = visual_font_size_px(annotation.font_size, render_scale);
        Self {
            left: anchor.x - VISUAL_PADDING_PX,
            bottom: anchor.y + VISUAL_PADDING_PX,
            font_size,
            line_height: font_size * LINE_HEIGHT_RATIO,
            padding: VISUAL_PADDING_PX,
        }
    }

    /// Top edge of the box for a given number of text lines.
    #[must_use]
    pub fn top(&self, line_count: usize) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let lines = line_count.max(1) as f64;
        self.bottom - 2.0 * self.padding - lines * self.line_height
    }
}

/// Decodes source documents and composites draw instructions into them.
pub trait Compositor {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read per-page output geometry from the source bytes.
    fn decode(&self, source: &[u8]) -> Result<DocumentGeometry, Self::Error>;

    /// Produce a new document with `instructions` drawn into its pages.
    fn compose(&self, source: &[u8], instructions: &[DrawInstruction]) -> Result<Vec<u8>, Self::Error>;
}

/// Rasterizes pages; the core only needs the resulting pixel box.
pub trait PageRenderer {
    /// Render `page_index` at `render_scale`, returning its pixel box, or
    /// `None` if the page could not be rendered.
    fn render(&mut self, page_index: u32, render_scale: f64) -> Option<PixelBox>;
}
