//! Interaction controller: turns input events into annotation mutations.
//!
//! [`EngineCore`] owns the annotation store, the session's selection context
//! and the pointer gesture state. Every pointer, keyboard and focus event goes
//! through [`EngineCore::handle`], which returns the [`Action`]s the host must
//! reflect (re-render, open a text editor, schedule a frame, ...).
//!
//! Per annotation the visible states are `Idle`, `Selected` and `Editing`,
//! with dragging as an orthogonal flag only reachable from `Selected`. Drag
//! positions are recomputed from the gesture's start point and the total
//! pointer offset on every move, and committed at most once per frame. The
//! position under the pointer at release is always committed.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::collections::HashMap;

use crate::clipboard::{Command, CommandOutcome, SelectionContext};
use crate::coords::{
    FractionPoint, PixelBox, Point, clamp_font_size, clamp_position, fraction_from_pixel, fraction_from_pixel_delta,
};
use crate::doc::{Annotation, AnnotationId, AnnotationStore, FontFamily, PartialAnnotation};
use crate::input::{AnnotationState, InputEvent, InputState, Key, Modifiers, Target};
use crate::throttle::FrameCoalescer;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A new annotation exists and should be rendered.
    Created(Annotation),
    /// Fields of an annotation changed.
    Updated { id: AnnotationId, fields: PartialAnnotation },
    /// An annotation was removed.
    Deleted { id: AnnotationId },
    /// The selection moved (or was cleared).
    SelectionChanged(Option<AnnotationId>),
    /// Open and focus the text-entry surface of this annotation.
    EditStarted { id: AnnotationId },
    /// The text-entry surface of this annotation closed.
    EditEnded { id: AnnotationId },
    /// A drag update is pending; deliver [`InputEvent::Frame`] on the next tick.
    FrameRequested,
    /// Something visible changed.
    RenderNeeded,
}

/// Core engine state.
///
/// Independent of any windowing or DOM layer so it can be driven and tested
/// with plain event values.
pub struct EngineCore {
    pub doc: AnnotationStore,
    pub ui: SelectionContext,
    pub input: InputState,
    pages: HashMap<u32, PixelBox>,
    render_scale: f64,
    pending_drag: FrameCoalescer<FractionPoint>,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self {
            doc: AnnotationStore::new(),
            ui: SelectionContext::new(),
            input: InputState::default(),
            pages: HashMap::new(),
            render_scale: 1.0,
            pending_drag: FrameCoalescer::new(),
        }
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Session lifecycle ---

    /// Forget every annotation and all session state. Used when the source
    /// document is replaced.
    pub fn reset(&mut self) {
        self.doc.clear();
        self.ui.reset();
        self.input = InputState::Idle;
        self.pending_drag = FrameCoalescer::new();
        self.pages.clear();
    }

    // --- Page geometry ---

    /// Record the rendered pixel box of a page.
    pub fn set_page_box(&mut self, page_index: u32, page_box: PixelBox) {
        self.pages.insert(page_index, page_box);
    }

    /// Rendered pixel box of a page, if the page has been rendered.
    #[must_use]
    pub fn page_box(&self, page_index: u32) -> Option<PixelBox> {
        self.pages.get(&page_index).copied()
    }

    /// Change the runtime render scale. Stored annotations are untouched;
    /// page boxes are expected to be re-reported by the renderer.
    pub fn set_render_scale(&mut self, render_scale: f64) -> Vec<Action> {
        self.render_scale = render_scale;
        vec![Action::RenderNeeded]
    }

    /// Current runtime render scale.
    #[must_use]
    pub fn render_scale(&self) -> f64 {
        self.render_scale
    }

    // --- Events ---

    /// Apply one input event.
    pub fn handle(&mut self, event: InputEvent) -> Vec<Action> {
        match event {
            InputEvent::PointerDown { target, pos } => self.on_pointer_down(target, pos),
            InputEvent::PointerMove { pos } => self.on_pointer_move(pos),
            InputEvent::PointerUp { pos } => self.on_pointer_up(pos),
            InputEvent::PointerCancel => self.on_pointer_cancel(),
            InputEvent::Click { target, pos } => self.on_click(target, pos),
            InputEvent::DoubleClick { target } => self.on_double_click(target),
            InputEvent::KeyDown { key, modifiers } => self.on_key_down(&key, modifiers),
            InputEvent::Commit { id, text } => self.commit_text(&id, text),
            InputEvent::Frame => self.on_frame(),
        }
    }

    fn on_pointer_down(&mut self, target: Target, pos: Point) -> Vec<Action> {
        let Target::Annotation { id } = target else {
            return Vec::new();
        };
        // A press without a matching release still owes the old drag its final position.
        let mut actions = self.end_drag();
        let Some(annotation) = self.doc.get(&id) else {
            tracing::debug!(%id, "pointer down on missing annotation ignored");
            return actions;
        };
        let start_fraction = annotation.position();
        let page_index = annotation.page_index;

        actions.extend(self.select(id));
        if self.ui.editing() == Some(id) {
            return actions;
        }
        match self.page_box(page_index) {
            Some(page_box) => {
                self.input = InputState::Dragging { id, start_pointer: pos, start_fraction, page_box };
            }
            None => tracing::debug!(%id, page_index, "no rendered box for page; drag not started"),
        }
        actions
    }

    fn on_pointer_move(&mut self, pos: Point) -> Vec<Action> {
        let Some(target) = self.drag_target(pos) else {
            return Vec::new();
        };
        if self.pending_drag.push(target) { vec![Action::FrameRequested] } else { Vec::new() }
    }

    fn on_frame(&mut self) -> Vec<Action> {
        let InputState::Dragging { id, .. } = self.input else {
            return Vec::new();
        };
        match self.pending_drag.take() {
            Some(position) => self.commit_position(&id, position),
            None => Vec::new(),
        }
    }

    fn on_pointer_up(&mut self, pos: Point) -> Vec<Action> {
        if let Some(target) = self.drag_target(pos) {
            self.pending_drag.push(target);
        }
        self.end_drag()
    }

    fn on_pointer_cancel(&mut self) -> Vec<Action> {
        self.end_drag()
    }

    fn on_click(&mut self, target: Target, pos: Point) -> Vec<Action> {
        match target {
            Target::Annotation { id } => {
                if self.doc.get(&id).is_some() {
                    self.select(id)
                } else {
                    Vec::new()
                }
            }
            Target::Control { .. } => Vec::new(),
            Target::Page { page_index } => {
                if self.ui.selected().is_some() {
                    self.clear_selection()
                } else {
                    self.place(page_index, pos)
                }
            }
        }
    }

    fn on_double_click(&mut self, target: Target) -> Vec<Action> {
        let Target::Annotation { id } = target else {
            return Vec::new();
        };
        if self.doc.get(&id).is_none() {
            return Vec::new();
        }
        let mut actions = self.end_drag();
        actions.extend(self.begin_editing(id));
        actions
    }

    fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        let Some(command) = Command::from_key(key, modifiers) else {
            return Vec::new();
        };
        match self.ui.run(command, &mut self.doc) {
            CommandOutcome::Ignored | CommandOutcome::Copied(_) => Vec::new(),
            CommandOutcome::Pasted(annotation) => {
                let id = annotation.id;
                vec![
                    Action::Created(annotation),
                    Action::SelectionChanged(Some(id)),
                    Action::EditStarted { id },
                    Action::RenderNeeded,
                ]
            }
            CommandOutcome::Deleted(annotation) => {
                self.abandon_drag_of(&annotation.id);
                vec![Action::Deleted { id: annotation.id }, Action::SelectionChanged(None), Action::RenderNeeded]
            }
        }
    }

    // --- Commands ---

    /// Commit text from the host's text-entry surface and close it.
    pub fn commit_text(&mut self, id: &AnnotationId, text: String) -> Vec<Action> {
        let mut actions = Vec::new();
        let fields = PartialAnnotation { text: Some(text), is_transient: Some(false), ..Default::default() };
        if self.doc.update(id, &fields) {
            actions.push(Action::Updated { id: *id, fields });
        }
        if self.ui.end_editing(*id) {
            actions.push(Action::EditEnded { id: *id });
        }
        if !actions.is_empty() {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    /// Change the font family of an annotation.
    pub fn set_font_family(&mut self, id: &AnnotationId, family: FontFamily) -> Vec<Action> {
        self.apply(id, PartialAnnotation { font_family: Some(family), ..Default::default() })
    }

    /// Set the font size of an annotation, bounded to the allowed range.
    pub fn set_font_size(&mut self, id: &AnnotationId, size: f64) -> Vec<Action> {
        self.apply(id, PartialAnnotation { font_size: Some(clamp_font_size(size)), ..Default::default() })
    }

    /// Grow or shrink the font size of an annotation by `delta` points.
    pub fn step_font_size(&mut self, id: &AnnotationId, delta: f64) -> Vec<Action> {
        let Some(current) = self.doc.get(id).map(|a| a.font_size) else {
            return Vec::new();
        };
        self.set_font_size(id, current + delta)
    }

    /// Remove an annotation through its own delete control.
    pub fn delete(&mut self, id: &AnnotationId) -> Vec<Action> {
        if self.doc.delete(id).is_none() {
            return Vec::new();
        }
        self.abandon_drag_of(id);
        let mut actions = vec![Action::Deleted { id: *id }];
        if self.ui.forget(*id) {
            actions.push(Action::SelectionChanged(None));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Queries ---

    /// The currently selected annotation, if any.
    #[must_use]
    pub fn selection(&self) -> Option<AnnotationId> {
        self.ui.selected()
    }

    /// Look up an annotation by id.
    #[must_use]
    pub fn annotation(&self, id: &AnnotationId) -> Option<&Annotation> {
        self.doc.get(id)
    }

    /// Interaction state of an annotation, or `None` if it does not exist.
    #[must_use]
    pub fn state_of(&self, id: &AnnotationId) -> Option<AnnotationState> {
        self.doc.get(id)?;
        let state = if self.ui.editing() == Some(*id) {
            AnnotationState::Editing
        } else if self.ui.selected() == Some(*id) {
            AnnotationState::Selected
        } else {
            AnnotationState::Idle
        };
        Some(state)
    }

    /// Whether `id` is being dragged.
    #[must_use]
    pub fn is_dragging(&self, id: &AnnotationId) -> bool {
        matches!(self.input, InputState::Dragging { id: dragged, .. } if dragged == *id)
    }

    // --- Internals ---

    fn place(&mut self, page_index: u32, pos: Point) -> Vec<Action> {
        let Some(page_box) = self.page_box(page_index) else {
            tracing::debug!(page_index, "click on unrendered page ignored");
            return Vec::new();
        };
        let at = clamp_position(fraction_from_pixel(pos, page_box));
        let annotation = self.doc.create(page_index, at.x, at.y);
        let id = annotation.id;
        tracing::debug!(%id, page_index, x = at.x, y = at.y, "annotation placed");

        let mut actions = vec![Action::Created(annotation)];
        actions.extend(self.begin_editing(id));
        actions.push(Action::RenderNeeded);
        actions
    }

    fn select(&mut self, id: AnnotationId) -> Vec<Action> {
        let was_editing = self.ui.editing();
        if !self.ui.select(id) {
            return Vec::new();
        }
        let mut actions = Vec::new();
        if let Some(previous) = was_editing.filter(|e| *e != id) {
            actions.push(Action::EditEnded { id: previous });
        }
        actions.push(Action::SelectionChanged(Some(id)));
        actions.push(Action::RenderNeeded);
        actions
    }

    fn begin_editing(&mut self, id: AnnotationId) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Some(previous) = self.ui.editing().filter(|e| *e != id) {
            actions.push(Action::EditEnded { id: previous });
        }
        let changed = self.ui.selected() != Some(id);
        self.ui.begin_editing(id);
        if changed {
            actions.push(Action::SelectionChanged(Some(id)));
        }
        actions.push(Action::EditStarted { id });
        actions
    }

    fn clear_selection(&mut self) -> Vec<Action> {
        let editing = self.ui.editing();
        if !self.ui.clear_selection() {
            return Vec::new();
        }
        let mut actions = Vec::new();
        if let Some(id) = editing {
            actions.push(Action::EditEnded { id });
        }
        actions.push(Action::SelectionChanged(None));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Position the dragged annotation should have for pointer at `pos`.
    fn drag_target(&self, pos: Point) -> Option<FractionPoint> {
        let InputState::Dragging { start_pointer, start_fraction, page_box, .. } = self.input else {
            return None;
        };
        let delta = fraction_from_pixel_delta(pos.x - start_pointer.x, pos.y - start_pointer.y, page_box);
        Some(clamp_position(start_fraction.offset_by(delta)))
    }

    fn end_drag(&mut self) -> Vec<Action> {
        let InputState::Dragging { id, .. } = std::mem::take(&mut self.input) else {
            return Vec::new();
        };
        match self.pending_drag.take() {
            Some(position) => self.commit_position(&id, position),
            None => Vec::new(),
        }
    }

    fn abandon_drag_of(&mut self, id: &AnnotationId) {
        if self.is_dragging(id) {
            self.input = InputState::Idle;
            self.pending_drag = FrameCoalescer::new();
        }
    }

    fn commit_position(&mut self, id: &AnnotationId, position: FractionPoint) -> Vec<Action> {
        self.apply(id, PartialAnnotation::position(position))
    }

    fn apply(&mut self, id: &AnnotationId, fields: PartialAnnotation) -> Vec<Action> {
        if !self.doc.update(id, &fields) {
            return Vec::new();
        }
        vec![Action::Updated { id: *id, fields }, Action::RenderNeeded]
    }
}
