#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::{FontFamily, PartialAnnotation};

fn ctrl() -> Modifiers {
    Modifiers { ctrl: true, ..Default::default() }
}

fn meta() -> Modifiers {
    Modifiers { meta: true, ..Default::default() }
}

/// A store with one committed (non-transient) annotation that is selected.
fn selected_fixture() -> (SelectionContext, AnnotationStore, Annotation) {
    let mut store = AnnotationStore::new();
    let a = store.create(1, 10.0, 10.0);
    store.update(
        &a.id,
        &PartialAnnotation {
            text: Some("note".into()),
            font_size: Some(20.0),
            font_family: Some(FontFamily::TimesRoman),
            color: Some("#ff0000".into()),
            is_transient: Some(false),
            ..Default::default()
        },
    );
    let mut ctx = SelectionContext::new();
    ctx.select(a.id);
    let a = store.get(&a.id).cloned().unwrap();
    (ctx, store, a)
}

// =============================================================
// Command mapping
// =============================================================

#[test]
fn command_from_ctrl_and_cmd_letters() {
    assert_eq!(Command::from_key(&Key::new("c"), ctrl()), Some(Command::Copy));
    assert_eq!(Command::from_key(&Key::new("C"), meta()), Some(Command::Copy));
    assert_eq!(Command::from_key(&Key::new("v"), ctrl()), Some(Command::Paste));
    assert_eq!(Command::from_key(&Key::new("x"), ctrl()), None);
}

#[test]
fn plain_letters_are_not_commands() {
    assert_eq!(Command::from_key(&Key::new("c"), Modifiers::default()), None);
    assert_eq!(Command::from_key(&Key::new("v"), Modifiers::default()), None);
}

#[test]
fn delete_and_backspace_map_to_delete() {
    assert_eq!(Command::from_key(&Key::new("Delete"), Modifiers::default()), Some(Command::Delete));
    assert_eq!(Command::from_key(&Key::new("Backspace"), Modifiers::default()), Some(Command::Delete));
}

// =============================================================
// Selection
// =============================================================

#[test]
fn select_reports_change() {
    let mut ctx = SelectionContext::new();
    let id = Uuid::new_v4();
    assert!(ctx.select(id));
    assert!(!ctx.select(id));
    assert_eq!(ctx.selected(), Some(id));
}

#[test]
fn selecting_other_annotation_ends_editing() {
    let mut ctx = SelectionContext::new();
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    ctx.begin_editing(a);
    ctx.select(b);
    assert_eq!(ctx.selected(), Some(b));
    assert!(!ctx.is_editing_text());
}

#[test]
fn end_editing_keeps_selection() {
    let mut ctx = SelectionContext::new();
    let a = Uuid::new_v4();
    ctx.begin_editing(a);
    assert!(ctx.end_editing(a));
    assert_eq!(ctx.selected(), Some(a));
    assert!(!ctx.end_editing(a));
}

#[test]
fn forget_clears_matching_selection_only() {
    let mut ctx = SelectionContext::new();
    let a = Uuid::new_v4();
    ctx.select(a);
    assert!(!ctx.forget(Uuid::new_v4()));
    assert!(ctx.forget(a));
    assert_eq!(ctx.selected(), None);
}

#[test]
fn reset_drops_clipboard() {
    let (mut ctx, mut store, _) = selected_fixture();
    ctx.run(Command::Copy, &mut store);
    ctx.reset();
    assert!(ctx.clipboard().is_none());
    assert!(ctx.selected().is_none());
}

// =============================================================
// Copy
// =============================================================

#[test]
fn copy_snapshots_selected() {
    let (mut ctx, mut store, a) = selected_fixture();
    assert_eq!(ctx.run(Command::Copy, &mut store), CommandOutcome::Copied(a.id));
    assert_eq!(ctx.clipboard(), Some(&a));
}

#[test]
fn copy_without_selection_is_ignored() {
    let mut ctx = SelectionContext::new();
    let mut store = AnnotationStore::new();
    store.create(1, 10.0, 10.0);
    assert_eq!(ctx.run(Command::Copy, &mut store), CommandOutcome::Ignored);
    assert!(ctx.clipboard().is_none());
}

#[test]
fn snapshot_is_independent_of_later_edits() {
    let (mut ctx, mut store, a) = selected_fixture();
    ctx.run(Command::Copy, &mut store);
    store.update(&a.id, &PartialAnnotation { text: Some("changed".into()), ..Default::default() });
    assert_eq!(ctx.clipboard().unwrap().text, "note");
}

#[test]
fn commands_ignored_while_editing_text() {
    let (mut ctx, mut store, a) = selected_fixture();
    ctx.begin_editing(a.id);
    assert_eq!(ctx.run(Command::Copy, &mut store), CommandOutcome::Ignored);
    assert_eq!(ctx.run(Command::Delete, &mut store), CommandOutcome::Ignored);
    assert_eq!(store.len(), 1);
}

// =============================================================
// Paste
// =============================================================

#[test]
fn paste_offsets_copy_and_keeps_style() {
    let (mut ctx, mut store, a) = selected_fixture();
    ctx.run(Command::Copy, &mut store);
    let CommandOutcome::Pasted(pasted) = ctx.run(Command::Paste, &mut store) else {
        panic!("expected paste");
    };
    assert_ne!(pasted.id, a.id);
    assert_eq!(pasted.x_fraction, 12.0);
    assert_eq!(pasted.y_fraction, 12.0);
    assert!(pasted.is_transient);
    assert_eq!(pasted.text, a.text);
    assert_eq!(pasted.font_size, a.font_size);
    assert_eq!(pasted.font_family, a.font_family);
    assert_eq!(pasted.color, a.color);
    assert_eq!(pasted.page_index, a.page_index);
    assert_eq!(store.len(), 2);
}

#[test]
fn paste_selects_and_opens_editing() {
    let (mut ctx, mut store, _) = selected_fixture();
    ctx.run(Command::Copy, &mut store);
    let CommandOutcome::Pasted(pasted) = ctx.run(Command::Paste, &mut store) else {
        panic!("expected paste");
    };
    assert_eq!(ctx.selected(), Some(pasted.id));
    assert_eq!(ctx.editing(), Some(pasted.id));
}

#[test]
fn paste_with_empty_clipboard_is_ignored() {
    let mut ctx = SelectionContext::new();
    let mut store = AnnotationStore::new();
    assert_eq!(ctx.run(Command::Paste, &mut store), CommandOutcome::Ignored);
    assert!(store.is_empty());
}

#[test]
fn paste_near_edge_is_clamped() {
    let mut store = AnnotationStore::new();
    let a = store.create(1, 94.0, 99.0);
    store.update(&a.id, &PartialAnnotation { is_transient: Some(false), ..Default::default() });
    let mut ctx = SelectionContext::new();
    ctx.select(a.id);
    ctx.run(Command::Copy, &mut store);
    let CommandOutcome::Pasted(pasted) = ctx.run(Command::Paste, &mut store) else {
        panic!("expected paste");
    };
    assert_eq!(pasted.x_fraction, 95.0);
    assert_eq!(pasted.y_fraction, 100.0);
}

#[test]
fn paste_survives_deletion_of_source() {
    let (mut ctx, mut store, a) = selected_fixture();
    ctx.run(Command::Copy, &mut store);
    ctx.run(Command::Delete, &mut store);
    assert!(store.get(&a.id).is_none());
    assert!(matches!(ctx.run(Command::Paste, &mut store), CommandOutcome::Pasted(_)));
}

// =============================================================
// Delete
// =============================================================

#[test]
fn delete_removes_selected_and_clears_selection() {
    let (mut ctx, mut store, a) = selected_fixture();
    let outcome = ctx.run(Command::Delete, &mut store);
    assert!(matches!(outcome, CommandOutcome::Deleted(ref removed) if removed.id == a.id));
    assert!(store.is_empty());
    assert!(ctx.selected().is_none());
}

#[test]
fn delete_without_selection_is_ignored() {
    let mut ctx = SelectionContext::new();
    let mut store = AnnotationStore::new();
    store.create(1, 1.0, 2.0);
    assert_eq!(ctx.run(Command::Delete, &mut store), CommandOutcome::Ignored);
    assert_eq!(store.len(), 1);
}
