//! # Layout Model
//!
//! Declarative description of a template: canvas dimensions, background and an
//! ordered list of styled, positioned elements. All types derive
//! `Serialize + Deserialize` with camelCase keys, so the same types are the
//! Rust API, the catalog file format and the HTTP payloads.
//!
//! ```
//! use tripcard::model::{ElementKind, ElementStyle, Position, Size, TemplateElement};
//! use tripcard::content::{ContentFields, FieldName};
//!
//! let badge = TemplateElement {
//!     id: "badge".into(),
//!     kind: ElementKind::Badge,
//!     content: "Best seller".into(),
//!     field: None,
//!     position: Position::new(10.0, 10.0),
//!     size: Size::new(80.0, 24.0),
//!     style: ElementStyle::default(),
//!     locked: false,
//! };
//! assert_eq!(badge.resolve_text(&ContentFields::default()), "Best seller");
//! ```

mod element;
mod layout;
mod style;

pub use element::{ElementKind, Position, Size, TemplateElement};
pub use layout::{Background, BackgroundProperty, DISPLAY_MAGNIFICATION, Dimensions, TemplateLayout};
pub use style::{ElementStyle, StyleProperty, TextAlign};
