//! Input model: event targets, keys, modifiers, and the interaction state.
//!
//! The host translates raw pointer and keyboard listeners into
//! [`InputEvent`]s and feeds them to [`crate::engine::EngineCore::handle`].
//! Each pointer event names what it hit ([`Target`]); hit-testing against
//! laid-out text stays with the host, which is the only party that knows the
//! measured box of each annotation.
//!
//! Pointer positions are page-local CSS pixels, origin at the top-left of the
//! rendered page the event belongs to.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::coords::{FractionPoint, PixelBox, Point};
use crate::doc::AnnotationId;

/// What a pointer event landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    /// The body of an annotation.
    Annotation { id: AnnotationId },
    /// A control button (delete, font picker, ...) attached to an annotation.
    Control { id: AnnotationId },
    /// Empty area of a page.
    Page { page_index: u32 },
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// A keyboard key as reported by the host (e.g. `"c"`, `"Delete"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Whether this key names the given letter, ignoring case.
    #[must_use]
    pub fn is_letter(&self, letter: char) -> bool {
        let mut chars = self.0.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if c.eq_ignore_ascii_case(&letter))
    }

    /// Delete or Backspace.
    #[must_use]
    pub fn is_delete(&self) -> bool {
        self.0 == "Delete" || self.0 == "Backspace"
    }
}

/// The finite set of events the interaction engine understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InputEvent {
    /// Primary button pressed.
    PointerDown { target: Target, pos: Point },
    /// Pointer moved; only meaningful while a drag is in progress.
    PointerMove { pos: Point },
    /// Primary button released.
    PointerUp { pos: Point },
    /// The platform aborted the gesture (lost capture, touch cancel, ...).
    PointerCancel,
    /// A completed press and release without a drag.
    Click { target: Target, pos: Point },
    /// Double-click or double-tap.
    DoubleClick { target: Target },
    /// Key pressed while the page view has focus.
    KeyDown {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// The text-entry surface of an annotation lost focus with this content.
    Commit { id: AnnotationId, text: String },
    /// Display tick; pending drag updates are applied here.
    Frame,
}

/// Externally visible state of one annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationState {
    Idle,
    Selected,
    Editing,
}

/// Internal state for the pointer gesture machine.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// The user is moving an annotation.
    Dragging {
        /// Annotation being dragged.
        id: AnnotationId,
        /// Pointer position at pointer-down.
        start_pointer: Point,
        /// Annotation position at pointer-down.
        start_fraction: FractionPoint,
        /// Rendered page box at pointer-down.
        page_box: PixelBox,
    },
}
