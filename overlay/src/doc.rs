//! Document model: annotation records and the in-memory store.
//!
//! An [`Annotation`] is one positioned, styled text item on one page. Its
//! position lives in fraction space only (see [`crate::coords`]); every pixel
//! or output-unit position is derived on demand. [`PartialAnnotation`] is the
//! sparse update produced by the interaction engine and toolbar commands, and
//! [`AnnotationStore`] owns all live annotations in insertion order.
//!
//! Updates addressed to an id that is no longer present are silent no-ops:
//! a delete racing an in-flight drag or edit is expected, not a corruption.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{DEFAULT_COLOR, DEFAULT_FONT_SIZE};
use crate::coords::FractionPoint;

/// Unique identifier for an annotation.
pub type AnnotationId = Uuid;

/// The closed set of font families an annotation can use.
///
/// Unknown names resolve to the default family rather than failing, so a
/// stale or hand-edited value can never break export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FontFamily {
    /// Sans-serif.
    #[default]
    Helvetica,
    /// Serif.
    TimesRoman,
    /// Monospace.
    Courier,
}

impl FontFamily {
    /// Every family, default first.
    pub const ALL: [FontFamily; 3] = [Self::Helvetica, Self::TimesRoman, Self::Courier];

    /// Resolve a family name, falling back to the default for unknown names.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "times" | "times-roman" | "timesroman" | "times new roman" | "serif" => Self::TimesRoman,
            "courier" | "courier new" | "monospace" | "mono" => Self::Courier,
            _ => Self::Helvetica,
        }
    }

    /// Canonical display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::TimesRoman => "Times-Roman",
            Self::Courier => "Courier",
        }
    }
}

impl From<String> for FontFamily {
    fn from(value: String) -> Self {
        Self::from_name(&value)
    }
}

impl From<FontFamily> for String {
    fn from(value: FontFamily) -> Self {
        value.name().to_string()
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An annotation as stored in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Unique, never reused.
    pub id: AnnotationId,
    /// 1-based page ordinal. Fixed at creation.
    pub page_index: u32,
    /// Text content; may be empty.
    pub text: String,
    /// Anchor x, percent of page width from the left edge.
    pub x_fraction: f64,
    /// Anchor y, percent of page height from the top edge.
    pub y_fraction: f64,
    /// Nominal text size in output units (points).
    pub font_size: f64,
    /// Font family used on screen and in the exported document.
    pub font_family: FontFamily,
    /// Text color as a CSS hex string.
    pub color: String,
    /// Freshly created or pasted and still in its first edit.
    pub is_transient: bool,
}

impl Annotation {
    /// A new annotation with default styling, open for text entry.
    #[must_use]
    pub fn new(page_index: u32, x_fraction: f64, y_fraction: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            page_index,
            text: String::new(),
            x_fraction,
            y_fraction,
            font_size: DEFAULT_FONT_SIZE,
            font_family: FontFamily::default(),
            color: DEFAULT_COLOR.to_string(),
            is_transient: true,
        }
    }

    /// Anchor position in fraction space.
    #[must_use]
    pub fn position(&self) -> FractionPoint {
        FractionPoint::new(self.x_fraction, self.y_fraction)
    }

    /// Whether the text has no visible content.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Sparse update for an annotation. Only present fields are applied.
///
/// `id` and `page_index` are deliberately absent: neither ever changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialAnnotation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_fraction: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_fraction: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<FontFamily>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_transient: Option<bool>,
}

impl PartialAnnotation {
    /// Update carrying only a new position.
    #[must_use]
    pub fn position(p: FractionPoint) -> Self {
        Self { x_fraction: Some(p.x), y_fraction: Some(p.y), ..Default::default() }
    }
}

/// In-memory store of annotations, ordered by insertion.
#[derive(Debug, Default)]
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
}

impl AnnotationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { annotations: Vec::new() }
    }

    /// Create, store and return a default annotation at the given position.
    pub fn create(&mut self, page_index: u32, x_fraction: f64, y_fraction: f64) -> Annotation {
        let annotation = Annotation::new(page_index, x_fraction, y_fraction);
        self.annotations.push(annotation.clone());
        annotation
    }

    /// Append a fully formed annotation. An existing record with the same id
    /// is replaced in place.
    pub fn insert(&mut self, annotation: Annotation) {
        match self.position_of(&annotation.id) {
            Some(index) => self.annotations[index] = annotation,
            None => self.annotations.push(annotation),
        }
    }

    /// Merge a partial update. Returns false, and changes nothing, when the id
    /// is absent.
    pub fn update(&mut self, id: &AnnotationId, partial: &PartialAnnotation) -> bool {
        let Some(annotation) = self.annotations.iter_mut().find(|a| &a.id == id) else {
            tracing::debug!(%id, "update for missing annotation ignored");
            return false;
        };
        if let Some(ref text) = partial.text {
            annotation.text.clone_from(text);
        }
        if let Some(x) = partial.x_fraction {
            annotation.x_fraction = x;
        }
        if let Some(y) = partial.y_fraction {
            annotation.y_fraction = y;
        }
        if let Some(size) = partial.font_size {
            annotation.font_size = size;
        }
        if let Some(family) = partial.font_family {
            annotation.font_family = family;
        }
        if let Some(ref color) = partial.color {
            annotation.color.clone_from(color);
        }
        if let Some(transient) = partial.is_transient {
            annotation.is_transient = transient;
        }
        true
    }

    /// Remove an annotation by id, returning it if it was present.
    pub fn delete(&mut self, id: &AnnotationId) -> Option<Annotation> {
        let index = self.position_of(id)?;
        Some(self.annotations.remove(index))
    }

    /// Return a reference to an annotation by id.
    #[must_use]
    pub fn get(&self, id: &AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| &a.id == id)
    }

    /// Annotations on one page, in insertion order.
    #[must_use]
    pub fn by_page(&self, page_index: u32) -> Vec<&Annotation> {
        self.annotations.iter().filter(|a| a.page_index == page_index).collect()
    }

    /// All annotations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    /// Drop every annotation.
    pub fn clear(&mut self) {
        self.annotations.clear();
    }

    /// Number of annotations currently in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// Returns `true` if the store contains no annotations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    fn position_of(&self, id: &AnnotationId) -> Option<usize> {
        self.annotations.iter().position(|a| &a.id == id)
    }
}
