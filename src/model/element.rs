//! Template elements: positioned, styled boxes optionally bound to a content field.

use serde::{Deserialize, Serialize};

use super::style::ElementStyle;
use crate::content::{ContentFields, FieldName};

/// What an element represents. Only `Price` and `Text` change rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Text,
    Price,
    Image,
    Badge,
    Divider,
}

/// Position in native layout space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Size in native layout space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateElement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    /// Literal fallback text shown when the bound field is empty or absent.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<FieldName>,
    pub position: Position,
    pub size: Size,
    pub style: ElementStyle,
    /// Locked elements render normally but cannot be dragged.
    #[serde(default)]
    pub locked: bool,
}

impl TemplateElement {
    /// Text for this element given the current content: the bound field's
    /// value when non-empty, otherwise the literal content.
    pub fn resolve_text<'a>(&'a self, content: &'a ContentFields) -> &'a str {
        match self.field {
            Some(field) if !content.get(field).is_empty() => content.get(field),
            _ => &self.content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bound(field: FieldName, fallback: &str) -> TemplateElement {
        TemplateElement {
            id: "el".into(),
            kind: ElementKind::Text,
            content: fallback.into(),
            field: Some(field),
            position: Position::default(),
            size: Size::new(100.0, 20.0),
            style: ElementStyle::default(),
            locked: false,
        }
    }

    #[test]
    fn bound_field_wins_when_non_empty() {
        let el = bound(FieldName::Destination, "destination");
        let mut content = ContentFields::default();
        assert_eq!(el.resolve_text(&content), "Bali, Indonesia");

        content.set_field(FieldName::Destination, "");
        assert_eq!(el.resolve_text(&content), "destination");
    }

    #[test]
    fn unbound_element_uses_literal() {
        let mut el = bound(FieldName::Title, "Limited offer");
        el.field = None;
        assert_eq!(el.resolve_text(&ContentFields::default()), "Limited offer");
    }

    #[test]
    fn kind_serializes_as_type() {
        let el = bound(FieldName::Price, "price");
        let json = serde_json::to_value(&el).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["field"], "price");
        assert_eq!(json["locked"], false);
    }
}
