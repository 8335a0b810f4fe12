//! # Template Catalog
//!
//! The fixed set of layouts a user can pick from. Catalog entries are never
//! edited: selecting a layout hands out a deep copy, so edits live only in the
//! editor's current layout and are lost when switching away.
//!
//! | Id | Export size | Native size |
//! |----|-------------|-------------|
//! | `square` | 1080×1080 | 400×400 |
//! | `story` | 1080×1920 | 225×400 |
//! | `portrait` | 1080×1350 | 320×400 |
//!
//! A catalog can also be loaded from a JSON array of layouts with the same
//! shape as [`TemplateLayout`].

use serde::Serialize;
use std::path::Path;

use crate::content::FieldName;
use crate::error::TripcardError;
use crate::model::{
    Background, Dimensions, ElementKind, ElementStyle, Position, Size, TemplateElement,
    TemplateLayout, TextAlign,
};

/// Background images offered for the square layout.
const SQUARE_BACKGROUNDS: &[&str] = &["/images/11.jpg", "/images/22.jpg", "/images/33.jpg"];
/// Background images offered for every other layout.
const TALL_BACKGROUNDS: &[&str] = &["/images/1.jpg", "/images/2.jpg", "/images/3.jpg"];

/// Font families offered by the style controls.
pub const FONT_FAMILIES: &[&str] = &[
    "Inter",
    "Roboto",
    "Playfair Display",
    "Montserrat",
    "Poppins",
    "Lora",
    "Open Sans",
];

/// Font weights offered by the style controls.
pub const FONT_WEIGHTS: &[&str] = &["300", "400", "500", "600", "700", "800"];

/// An ordered, immutable list of layouts.
#[derive(Debug, Clone)]
pub struct Catalog {
    layouts: Vec<TemplateLayout>,
}

/// Catalog listing entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    pub dimensions: Dimensions,
    pub display_size: Dimensions,
    pub background_images: Vec<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// Build a catalog from layouts. Fails on an empty list or duplicate ids.
    pub fn new(layouts: Vec<TemplateLayout>) -> Result<Self, TripcardError> {
        if layouts.is_empty() {
            return Err(TripcardError::Template("catalog has no layouts".into()));
        }
        for (i, layout) in layouts.iter().enumerate() {
            if layouts[..i].iter().any(|l| l.id == layout.id) {
                return Err(TripcardError::Template(format!(
                    "duplicate layout id '{}'",
                    layout.id
                )));
            }
        }
        Ok(Self { layouts })
    }

    /// The three layouts that ship with the editor.
    pub fn builtin() -> Self {
        Self {
            layouts: vec![square(), story(), portrait()],
        }
    }

    /// Parse a JSON array of layouts.
    pub fn from_json(json: &str) -> Result<Self, TripcardError> {
        let layouts: Vec<TemplateLayout> = serde_json::from_str(json)?;
        Self::new(layouts)
    }

    /// Load a JSON catalog file.
    pub fn load(path: &Path) -> Result<Self, TripcardError> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(path = %path.display(), layouts = catalog.len(), "loaded template catalog");
        Ok(catalog)
    }

    pub fn by_id(&self, id: &str) -> Option<&TemplateLayout> {
        self.layouts.iter().find(|l| l.id == id)
    }

    /// The layout the editor opens with.
    pub fn first(&self) -> &TemplateLayout {
        // `new` and `builtin` guarantee at least one layout
        &self.layouts[0]
    }

    pub fn layouts(&self) -> &[TemplateLayout] {
        &self.layouts
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.layouts.iter().map(|l| l.id.as_str())
    }

    pub fn summaries(&self) -> Vec<TemplateSummary> {
        self.layouts
            .iter()
            .map(|l| TemplateSummary {
                id: l.id.clone(),
                name: l.name.clone(),
                dimensions: l.dimensions,
                display_size: l.display_size,
                background_images: background_choices(&l.id)
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            })
            .collect()
    }
}

/// Background images a layout offers in the background picker.
pub fn background_choices(layout_id: &str) -> &'static [&'static str] {
    if layout_id == "square" {
        SQUARE_BACKGROUNDS
    } else {
        TALL_BACKGROUNDS
    }
}

// ============================================================================
// BUILT-IN LAYOUTS
// ============================================================================

/// Element bound to the content field of the same name.
fn bound(
    id: &str,
    kind: ElementKind,
    field: FieldName,
    (x, y): (f64, f64),
    (width, height): (f64, f64),
    style: ElementStyle,
) -> TemplateElement {
    TemplateElement {
        id: id.into(),
        kind,
        content: field.as_str().into(),
        field: Some(field),
        position: Position::new(x, y),
        size: Size::new(width, height),
        style,
        locked: false,
    }
}

fn square() -> TemplateLayout {
    use ElementKind::{Price, Text};
    use FieldName::*;

    TemplateLayout {
        id: "square".into(),
        name: "Square\n1080 x 1080 px".into(),
        dimensions: Dimensions::new(1080, 1080),
        display_size: Dimensions::new(400, 400),
        background_style: Background {
            background_color: "#ffffff".into(),
            background_image: Some("/images/11.jpg".into()),
            overlay: false,
            overlay_opacity: 0.3,
        },
        elements: vec![
            bound("title", Text, Title, (20.0, 20.0), (360.0, 60.0), ElementStyle {
                font_size: 28.0,
                font_weight: "700".into(),
                text_align: TextAlign::Center,
                color: "#1a1a1a".into(),
                ..ElementStyle::default()
            }),
            bound("destination", Text, Destination, (20.0, 90.0), (360.0, 30.0), ElementStyle {
                font_size: 16.0,
                color: "#3b82f6".into(),
                text_align: TextAlign::Center,
                ..ElementStyle::default()
            }),
            bound("price", Price, FieldName::Price, (150.0, 130.0), (100.0, 40.0), ElementStyle {
                font_size: 20.0,
                font_weight: "700".into(),
                color: "#ffffff".into(),
                background_color: "#3b82f6".into(),
                text_align: TextAlign::Center,
                border_radius: 20.0,
                ..ElementStyle::default()
            }),
            bound("package", Text, PackageDetails, (20.0, 180.0), (360.0, 25.0), ElementStyle {
                font_size: 14.0,
                text_align: TextAlign::Center,
                font_weight: "500".into(),
                ..ElementStyle::default()
            }),
            bound("date", Text, Date, (20.0, 210.0), (360.0, 25.0), ElementStyle {
                font_size: 12.0,
                text_align: TextAlign::Center,
                opacity: 0.8,
                ..ElementStyle::default()
            }),
            bound("plan", Text, Plan, (20.0, 260.0), (360.0, 50.0), ElementStyle {
                font_size: 12.0,
                text_align: TextAlign::Center,
                ..ElementStyle::default()
            }),
            bound("inclusions", Text, Inclusions, (20.0, 320.0), (170.0, 60.0), ElementStyle {
                font_size: 10.0,
                ..ElementStyle::default()
            }),
            bound("exclusions", Text, Exclusions, (210.0, 320.0), (170.0, 60.0), ElementStyle {
                font_size: 10.0,
                ..ElementStyle::default()
            }),
        ],
    }
}

fn story() -> TemplateLayout {
    use ElementKind::{Price, Text};
    use FieldName::*;

    TemplateLayout {
        id: "story".into(),
        name: "Story\n1080 x 1920 px".into(),
        dimensions: Dimensions::new(1080, 1920),
        display_size: Dimensions::new(225, 400),
        background_style: Background {
            background_color: "#0f172a".into(),
            background_image: Some("/images/1.jpg".into()),
            overlay: true,
            overlay_opacity: 0.4,
        },
        elements: vec![
            bound("destination", Text, Destination, (20.0, 30.0), (185.0, 25.0), ElementStyle {
                font_size: 10.0,
                color: "#64748b".into(),
                text_transform: Some("uppercase".into()),
                ..ElementStyle::default()
            }),
            bound("title", Text, Title, (20.0, 60.0), (185.0, 80.0), ElementStyle {
                font_size: 18.0,
                font_weight: "800".into(),
                color: "#ffffff".into(),
                line_height: Some("1.2".into()),
                ..ElementStyle::default()
            }),
            bound("price", Price, FieldName::Price, (150.0, 30.0), (55.0, 30.0), ElementStyle {
                font_size: 14.0,
                font_weight: "700".into(),
                color: "#10b981".into(),
                text_align: TextAlign::Right,
                ..ElementStyle::default()
            }),
            bound("package", Text, PackageDetails, (20.0, 150.0), (100.0, 25.0), ElementStyle {
                font_size: 10.0,
                color: "#94a3b8".into(),
                font_weight: "500".into(),
                ..ElementStyle::default()
            }),
            bound("date", Text, Date, (130.0, 150.0), (75.0, 25.0), ElementStyle {
                font_size: 10.0,
                color: "#94a3b8".into(),
                text_align: TextAlign::Right,
                ..ElementStyle::default()
            }),
            bound("plan", Text, Plan, (20.0, 185.0), (185.0, 80.0), ElementStyle {
                font_size: 11.0,
                color: "#e2e8f0".into(),
                line_height: Some("1.4".into()),
                ..ElementStyle::default()
            }),
            bound("highlights", Text, Overlays, (20.0, 275.0), (185.0, 40.0), ElementStyle {
                font_size: 9.0,
                color: "#fbbf24".into(),
                background_color: "#451a03".into(),
                padding: 10.0,
                border_radius: 6.0,
                ..ElementStyle::default()
            }),
            bound("inclusions", Text, Inclusions, (20.0, 325.0), (185.0, 60.0), ElementStyle {
                font_size: 9.0,
                color: "#cbd5e1".into(),
                ..ElementStyle::default()
            }),
        ],
    }
}

fn portrait() -> TemplateLayout {
    use ElementKind::{Price, Text};
    use FieldName::*;

    let card = |font_size: f64| ElementStyle {
        font_size,
        color: "#4b5563".into(),
        background_color: "#ffffff".into(),
        padding: 10.0,
        border_radius: 6.0,
        ..ElementStyle::default()
    };

    TemplateLayout {
        id: "portrait".into(),
        name: "Portrait\n1080 x 1350 px".into(),
        dimensions: Dimensions::new(1080, 1350),
        display_size: Dimensions::new(320, 400),
        background_style: Background {
            background_color: "#fafafa".into(),
            background_image: Some("/images/2.jpg".into()),
            overlay: false,
            overlay_opacity: 0.3,
        },
        elements: vec![
            bound("price", Price, FieldName::Price, (20.0, 20.0), (70.0, 70.0), ElementStyle {
                font_size: 16.0,
                font_weight: "600".into(),
                color: "#1f2937".into(),
                text_align: TextAlign::Center,
                background_color: "#ffffff".into(),
                border_radius: 35.0,
                border: Some("2px solid #e5e7eb".into()),
                ..ElementStyle::default()
            }),
            bound("title", Text, Title, (110.0, 25.0), (190.0, 60.0), ElementStyle {
                font_size: 20.0,
                font_weight: "600".into(),
                color: "#1f2937".into(),
                ..ElementStyle::default()
            }),
            bound("destination", Text, Destination, (110.0, 70.0), (190.0, 25.0), ElementStyle {
                font_size: 12.0,
                color: "#6b7280".into(),
                ..ElementStyle::default()
            }),
            bound("package", Text, PackageDetails, (20.0, 110.0), (140.0, 25.0), ElementStyle {
                font_size: 11.0,
                color: "#374151".into(),
                font_weight: "500".into(),
                ..ElementStyle::default()
            }),
            bound("date", Text, Date, (170.0, 110.0), (130.0, 25.0), ElementStyle {
                font_size: 11.0,
                color: "#6b7280".into(),
                text_align: TextAlign::Right,
                ..ElementStyle::default()
            }),
            bound("plan", Text, Plan, (20.0, 150.0), (280.0, 80.0), ElementStyle {
                font_size: 12.0,
                color: "#374151".into(),
                line_height: Some("1.5".into()),
                background_color: "#ffffff".into(),
                padding: 12.0,
                border_radius: 8.0,
                ..ElementStyle::default()
            }),
            bound("inclusions", Text, Inclusions, (20.0, 250.0), (135.0, 120.0), card(10.0)),
            bound("exclusions", Text, Exclusions, (165.0, 250.0), (135.0, 120.0), card(10.0)),
        ],
    }
}
