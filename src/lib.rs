//! # Tripcard - Travel Package Post Designer
//!
//! Tripcard fills social-media post templates with travel package details,
//! lets a user restyle and rearrange the elements, and turns the result into
//! an HTML preview or a PNG sized for the target network. It provides:
//!
//! - **Template catalog**: square, story and portrait layouts
//! - **Editor core**: content fields, element mutators, drag with clamping
//! - **Renderer**: one render tree for the live canvas, preview and export
//! - **Export**: software rasterizer producing PNGs at export scale
//! - **Server**: JSON API with per-tab editing sessions
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use tripcard::{Catalog, Editor, Event, FieldName};
//!
//! let mut editor = Editor::with_layout(Arc::new(Catalog::builtin()), "story")?;
//! editor.dispatch(Event::SetField {
//!     field: FieldName::Title,
//!     value: "Lisbon Weekend".into(),
//! });
//!
//! let html = editor.preview_html(Some("http://localhost:3000"));
//! assert!(html.contains("Lisbon Weekend"));
//!
//! let snapshot = editor.export_snapshot();
//! assert_eq!(snapshot.filename(), "lisbon-weekend-story-1080x1920.png");
//! # Ok::<(), tripcard::TripcardError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`content`] | Content fields shared by every layout |
//! | [`model`] | Layouts, elements and styles |
//! | [`catalog`] | Built-in and file-loaded layouts |
//! | [`editor`] | Editor state, events and dragging |
//! | [`render`] | Render tree, HTML output, rasterizer |
//! | [`export`] | PNG export and image loading |
//! | [`server`] | HTTP API |
//! | [`logging`] | tracing setup |
//! | [`error`] | Error types |

pub mod catalog;
pub mod content;
pub mod editor;
pub mod error;
pub mod export;
pub mod logging;
pub mod model;
pub mod render;
pub mod server;

// Re-exports for convenience
pub use catalog::Catalog;
pub use content::{ContentFields, FieldName};
pub use editor::{Editor, EditorState, Event};
pub use error::TripcardError;
pub use export::{ExportSnapshot, Exporter};
pub use model::TemplateLayout;
