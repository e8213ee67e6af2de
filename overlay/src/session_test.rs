#![allow(clippy::float_cmp)]

use std::cell::Cell;

use super::*;
use crate::coords::{PageSize, PixelBox, Point};
use crate::doc::PartialAnnotation;
use crate::input::{InputEvent, Target};

// =============================================================
// Fakes
// =============================================================

#[derive(Debug, thiserror::Error)]
#[error("fake compositor: {0}")]
struct FakeError(&'static str);

/// Accepts any buffer starting with `%PDF`; each page is US letter.
struct FakeCompositor {
    pages: usize,
    fail_compose: Cell<bool>,
}

impl FakeCompositor {
    fn new(pages: usize) -> Self {
        Self { pages, fail_compose: Cell::new(false) }
    }
}

impl Compositor for FakeCompositor {
    type Error = FakeError;

    fn decode(&self, source: &[u8]) -> Result<DocumentGeometry, Self::Error> {
        if !source.starts_with(b"%PDF") {
            return Err(FakeError("not a document"));
        }
        Ok(DocumentGeometry::new(vec![PageSize::new(612.0, 792.0); self.pages]))
    }

    fn compose(&self, source: &[u8], instructions: &[DrawInstruction]) -> Result<Vec<u8>, Self::Error> {
        if self.fail_compose.get() {
            return Err(FakeError("font embedding failed"));
        }
        let mut out = source.to_vec();
        out.extend(serde_json::to_vec(instructions).map_err(|_| FakeError("encode"))?);
        Ok(out)
    }
}

/// Scales output geometry, but refuses pages listed in `cancelled`.
struct FakeRenderer {
    cancelled: Vec<u32>,
}

impl PageRenderer for FakeRenderer {
    fn render(&mut self, page_index: u32, render_scale: f64) -> Option<PixelBox> {
        if self.cancelled.contains(&page_index) {
            return None;
        }
        Some(PageSize::new(612.0, 792.0).scaled(render_scale))
    }
}

fn loaded(pages: usize) -> Session<FakeCompositor> {
    let mut session = Session::new(FakeCompositor::new(pages));
    session.load_document(b"%PDF-1.7 fake".to_vec(), "report.pdf").unwrap();
    session.render_pages(&mut FakeRenderer { cancelled: Vec::new() }, 1.0);
    session
}

fn add_note(session: &mut Session<FakeCompositor>, page_index: u32, x: f64, y: f64, text: &str) {
    let a = session.engine.doc.create(page_index, x, y);
    session.engine.doc.update(&a.id, &PartialAnnotation { text: Some(text.into()), ..Default::default() });
}

// =============================================================
// Loading
// =============================================================

#[test]
fn load_reads_geometry() {
    let session = loaded(3);
    let source = session.source().unwrap();
    assert_eq!(source.name, "report.pdf");
    assert_eq!(source.geometry.page_count(), 3);
}

#[test]
fn empty_input_is_rejected_without_state_change() {
    let mut session = loaded(1);
    add_note(&mut session, 1, 10.0, 10.0, "keep");
    let err = session.load_document(Vec::new(), "empty.pdf").unwrap_err();
    assert!(matches!(err, SessionError::EmptyInput));
    assert_eq!(session.engine.doc.len(), 1);
    assert_eq!(session.source().unwrap().name, "report.pdf");
}

#[test]
fn malformed_input_is_rejected_without_state_change() {
    let mut session = Session::new(FakeCompositor::new(1));
    let err = session.load_document(b"garbage".to_vec(), "bad.pdf").unwrap_err();
    assert!(matches!(err, SessionError::Decode(_)));
    assert!(session.source().is_none());
    assert!(session.engine.doc.is_empty());
}

#[test]
fn replacing_document_clears_annotations_and_selection() {
    let mut session = loaded(1);
    let created = session.engine.handle(InputEvent::Click { target: Target::Page { page_index: 1 }, pos: Point::new(10.0, 10.0) });
    assert!(!created.is_empty());
    assert!(session.engine.selection().is_some());

    session.load_document(b"%PDF-2.0 other".to_vec(), "other.pdf").unwrap();
    assert!(session.engine.doc.is_empty());
    assert!(session.engine.selection().is_none());
    assert_eq!(session.source().unwrap().name, "other.pdf");
}

// =============================================================
// Rendering
// =============================================================

#[test]
fn render_pages_reports_boxes_at_scale() {
    let mut session = loaded(2);
    session.render_pages(&mut FakeRenderer { cancelled: Vec::new() }, 2.0);
    assert_eq!(session.engine.page_box(2), Some(PixelBox::new(1224.0, 1584.0)));
    assert_eq!(session.engine.render_scale(), 2.0);
}

#[test]
fn cancelled_render_keeps_annotations() {
    let mut session = loaded(2);
    add_note(&mut session, 2, 10.0, 10.0, "safe");
    session.render_pages(&mut FakeRenderer { cancelled: vec![2] }, 3.0);
    assert_eq!(session.engine.doc.by_page(2).len(), 1);
    // The previous box survives a cancelled re-render.
    assert_eq!(session.engine.page_box(2), Some(PixelBox::new(612.0, 792.0)));
}

#[test]
fn render_without_document_does_nothing() {
    let mut session = Session::new(FakeCompositor::new(1));
    assert!(session.render_pages(&mut FakeRenderer { cancelled: Vec::new() }, 1.0).is_empty());
}

// =============================================================
// Export
// =============================================================

#[test]
fn export_without_document_fails() {
    let session = Session::new(FakeCompositor::new(1));
    assert!(matches!(session.export(), Err(SessionError::NoDocument)));
}

#[test]
fn export_derives_filename() {
    let mut session = loaded(1);
    add_note(&mut session, 1, 50.0, 50.0, "hi");
    let out = session.export().unwrap();
    assert_eq!(out.filename, "annotated-report.pdf");
    assert!(out.bytes.starts_with(b"%PDF-1.7 fake"));
}

#[test]
fn custom_prefix_is_used() {
    let mut session = Session::new(FakeCompositor::new(1)).with_output_prefix("notes-");
    session.load_document(b"%PDF".to_vec(), "a.pdf").unwrap();
    assert_eq!(session.prepare_export().unwrap().filename, "notes-a.pdf");
}

#[test]
fn failed_export_leaves_store_untouched() {
    let mut session = loaded(1);
    add_note(&mut session, 1, 50.0, 50.0, "retry me");
    session.compositor().fail_compose.set(true);
    assert!(matches!(session.export(), Err(SessionError::Export(_))));
    assert_eq!(session.engine.doc.len(), 1);

    session.compositor().fail_compose.set(false);
    assert!(session.export().is_ok());
}

#[test]
fn job_is_a_snapshot() {
    let mut session = loaded(1);
    add_note(&mut session, 1, 50.0, 50.0, "before");
    let job = session.prepare_export().unwrap();
    add_note(&mut session, 1, 10.0, 10.0, "after");
    assert_eq!(job.instructions.len(), 1);
    assert_eq!(job.instructions[0].text, "before");
    assert_eq!(session.instructions().len(), 2);
}

#[test]
fn export_options_reach_projection() {
    let mut session = Session::new(FakeCompositor::new(1)).with_options(ExportOptions { honor_color: true });
    session.load_document(b"%PDF".to_vec(), "a.pdf").unwrap();
    let a = session.engine.doc.create(1, 50.0, 50.0);
    session.engine.doc.update(
        &a.id,
        &PartialAnnotation { text: Some("blue".into()), color: Some("#0000ff".into()), ..Default::default() },
    );
    let instructions = session.instructions();
    assert_eq!(instructions[0].color.b, 1.0);
}

#[test]
fn instructions_without_document_are_empty() {
    let session = Session::new(FakeCompositor::new(1));
    assert!(session.instructions().is_empty());
}
