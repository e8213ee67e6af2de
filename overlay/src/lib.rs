//! Annotation overlay engine for paginated documents.
//!
//! This crate owns everything between a user's pointer and the exported page:
//! the viewport-independent annotation model, the interaction state machine
//! that edits it against rendered pages of any pixel size, and the projector
//! that re-expresses the same annotations in the output page's unit space.
//! Decoding, rasterizing and writing documents are left to the
//! [`export::Compositor`] and [`export::PageRenderer`] collaborators.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`coords`] | Fraction / pixel / output-unit conversions |
//! | [`doc`] | Annotation records and the in-memory store |
//! | [`input`] | Input event types and interaction state |
//! | [`throttle`] | Per-frame coalescing of drag updates |
//! | [`engine`] | Interaction controller ([`engine::EngineCore`]) |
//! | [`clipboard`] | Selection, clipboard and document-level key commands |
//! | [`export`] | Export projection, screen sizing, collaborator traits |
//! | [`session`] | Source document lifecycle and export jobs |
//! | [`consts`] | Shared numeric constants (bounds, ratios, offsets) |

pub mod clipboard;
pub mod consts;
pub mod coords;
pub mod doc;
pub mod engine;
pub mod export;
pub mod input;
pub mod session;
pub mod throttle;
