//! Selection, clipboard, and document-level key commands.
//!
//! [`SelectionContext`] is the session-scoped state shared by the interaction
//! engine: at most one selected annotation, at most one annotation in text
//! entry, and at most one clipboard snapshot. It is reset wholesale when a new
//! source document is loaded.
//!
//! Copy, paste and delete are document-level commands. They do nothing while
//! an annotation's text-entry surface is active, so ordinary clipboard and
//! delete keys inside the text never reach the document. The check is an
//! explicit editing flag rather than inspection of whatever holds focus.

#[cfg(test)]
#[path = "clipboard_test.rs"]
mod clipboard_test;

use uuid::Uuid;

use crate::consts::PASTE_OFFSET;
use crate::coords::{FractionPoint, clamp_position};
use crate::doc::{Annotation, AnnotationId, AnnotationStore};
use crate::input::{Key, Modifiers};

/// A document-level keyboard command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Copy,
    Paste,
    Delete,
}

impl Command {
    /// Map a key press to a command: Ctrl/Cmd+C, Ctrl/Cmd+V, Delete/Backspace.
    #[must_use]
    pub fn from_key(key: &Key, modifiers: Modifiers) -> Option<Self> {
        if modifiers.command() {
            if key.is_letter('c') {
                return Some(Self::Copy);
            }
            if key.is_letter('v') {
                return Some(Self::Paste);
            }
            return None;
        }
        key.is_delete().then_some(Self::Delete)
    }
}

/// What running a [`Command`] did to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// The command was inactive in the current state.
    Ignored,
    /// The selected annotation was captured into the clipboard.
    Copied(AnnotationId),
    /// A new annotation was created from the clipboard and selected.
    Pasted(Annotation),
    /// The selected annotation was removed and selection cleared.
    Deleted(Annotation),
}

/// Session-scoped selection and clipboard state.
#[derive(Debug, Clone, Default)]
pub struct SelectionContext {
    selected: Option<AnnotationId>,
    editing: Option<AnnotationId>,
    clipboard: Option<Annotation>,
}

impl SelectionContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The selected annotation, if any.
    #[must_use]
    pub fn selected(&self) -> Option<AnnotationId> {
        self.selected
    }

    /// The annotation whose text is being entered, if any.
    #[must_use]
    pub fn editing(&self) -> Option<AnnotationId> {
        self.editing
    }

    /// Whether a text-entry surface is active.
    #[must_use]
    pub fn is_editing_text(&self) -> bool {
        self.editing.is_some()
    }

    /// The clipboard snapshot, if any.
    #[must_use]
    pub fn clipboard(&self) -> Option<&Annotation> {
        self.clipboard.as_ref()
    }

    /// Select `id`. Selecting a different annotation ends any text entry on
    /// the previous one. Returns whether the selection changed.
    pub fn select(&mut self, id: AnnotationId) -> bool {
        if self.selected == Some(id) {
            return false;
        }
        self.selected = Some(id);
        if self.editing.is_some_and(|e| e != id) {
            self.editing = None;
        }
        true
    }

    /// Select `id` and open its text-entry surface.
    pub fn begin_editing(&mut self, id: AnnotationId) {
        self.selected = Some(id);
        self.editing = Some(id);
    }

    /// Close the text-entry surface of `id`; selection is kept. Returns
    /// whether `id` was the one being edited.
    pub fn end_editing(&mut self, id: AnnotationId) -> bool {
        if self.editing == Some(id) {
            self.editing = None;
            return true;
        }
        false
    }

    /// Clear selection and text entry. Returns whether anything was selected.
    pub fn clear_selection(&mut self) -> bool {
        self.editing = None;
        self.selected.take().is_some()
    }

    /// Forget `id` everywhere it may be referenced by selection state.
    pub fn forget(&mut self, id: AnnotationId) -> bool {
        if self.editing == Some(id) {
            self.editing = None;
        }
        if self.selected == Some(id) {
            self.selected = None;
            return true;
        }
        false
    }

    /// Drop selection, text entry and clipboard.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Run a document-level command against `store`.
    pub fn run(&mut self, command: Command, store: &mut AnnotationStore) -> CommandOutcome {
        if self.is_editing_text() {
            return CommandOutcome::Ignored;
        }
        match command {
            Command::Copy => self.copy(store),
            Command::Paste => self.paste(store),
            Command::Delete => self.delete_selected(store),
        }
    }

    fn copy(&mut self, store: &AnnotationStore) -> CommandOutcome {
        let Some(annotation) = self.selected.and_then(|id| store.get(&id)) else {
            return CommandOutcome::Ignored;
        };
        self.clipboard = Some(annotation.clone());
        CommandOutcome::Copied(annotation.id)
    }

    fn paste(&mut self, store: &mut AnnotationStore) -> CommandOutcome {
        let Some(snapshot) = self.clipboard.as_ref() else {
            return CommandOutcome::Ignored;
        };
        let position =
            clamp_position(snapshot.position().offset_by(FractionPoint::new(PASTE_OFFSET, PASTE_OFFSET)));
        let pasted = Annotation {
            id: Uuid::new_v4(),
            x_fraction: position.x,
            y_fraction: position.y,
            is_transient: true,
            ..snapshot.clone()
        };
        store.insert(pasted.clone());
        self.begin_editing(pasted.id);
        CommandOutcome::Pasted(pasted)
    }

    fn delete_selected(&mut self, store: &mut AnnotationStore) -> CommandOutcome {
        let Some(id) = self.selected else {
            return CommandOutcome::Ignored;
        };
        self.forget(id);
        match store.delete(&id) {
            Some(removed) => CommandOutcome::Deleted(removed),
            None => CommandOutcome::Ignored,
        }
    }
}
