//! Template layouts and the geometry shared by editing, preview and export.
//!
//! ## Coordinate spaces
//!
//! ```text
//! native   (displaySize, e.g. 400×400)    element positions and sizes live here
//!    × display scale (≈1.5)
//! display  (floor(native × 1.5), 600×600)  the editing canvas and HTML preview
//!    × export scale
//! export   (dimensions, 1080×1080)         the PNG written by the exporter
//! ```

use serde::{Deserialize, Serialize};

use super::element::TemplateElement;

/// On-screen magnification of the native size while editing.
pub const DISPLAY_MAGNIFICATION: f64 = 1.5;

/// Width and height in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// An empty string in JSON means "no background image".
fn deserialize_image<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.filter(|s| !s.trim().is_empty()))
}

/// Canvas background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Background {
    pub background_color: String,
    /// Asset path (`/images/1.jpg`) or absolute URL.
    #[serde(default, deserialize_with = "deserialize_image")]
    pub background_image: Option<String>,
    /// Dark overlay drawn over the background image.
    #[serde(default)]
    pub overlay: bool,
    pub overlay_opacity: f64,
}

impl Background {
    /// The overlay only shows when there is an image underneath it.
    pub fn overlay_visible(&self) -> bool {
        self.overlay && self.background_image.is_some()
    }
}

/// A single-key background patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "camelCase")]
pub enum BackgroundProperty {
    BackgroundColor(String),
    BackgroundImage(Option<String>),
    Overlay(bool),
    OverlayOpacity(f64),
}

impl Background {
    pub fn apply(&mut self, property: BackgroundProperty) {
        match property {
            BackgroundProperty::BackgroundColor(v) => self.background_color = v,
            BackgroundProperty::BackgroundImage(v) => {
                self.background_image = v.filter(|s| !s.trim().is_empty())
            }
            BackgroundProperty::Overlay(v) => self.overlay = v,
            BackgroundProperty::OverlayOpacity(v) => {
                if !v.is_nan() {
                    self.overlay_opacity = v.clamp(0.0, 1.0);
                }
            }
        }
    }
}

/// A visual layout: canvas size, background and ordered elements.
///
/// Element order is paint order (later elements draw on top).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateLayout {
    pub id: String,
    pub name: String,
    /// True export size in pixels.
    pub dimensions: Dimensions,
    /// Native coordinate basis for every element.
    pub display_size: Dimensions,
    pub elements: Vec<TemplateElement>,
    pub background_style: Background,
}

impl TemplateLayout {
    /// Width of the editing canvas in display pixels.
    pub fn display_width(&self) -> u32 {
        (self.display_size.width as f64 * DISPLAY_MAGNIFICATION).floor() as u32
    }

    /// Height of the editing canvas in display pixels.
    pub fn display_height(&self) -> u32 {
        (self.display_size.height as f64 * DISPLAY_MAGNIFICATION).floor() as u32
    }

    /// Native → display factor: 1.5 for even native widths, slightly less
    /// for odd ones because the display width is floored.
    pub fn display_scale(&self) -> f64 {
        if self.display_size.width == 0 {
            return DISPLAY_MAGNIFICATION;
        }
        self.display_width() as f64 / self.display_size.width as f64
    }

    /// Display → export factor, chosen so the export meets or exceeds the
    /// nominal dimensions on both axes.
    pub fn export_scale(&self) -> f64 {
        let display_w = self.display_width().max(1) as f64;
        let display_h = self.display_height().max(1) as f64;
        f64::max(
            self.dimensions.width as f64 / display_w,
            self.dimensions.height as f64 / display_h,
        )
    }

    pub fn element(&self, id: &str) -> Option<&TemplateElement> {
        self.elements.iter().find(|el| el.id == id)
    }

    pub fn element_mut(&mut self, id: &str) -> Option<&mut TemplateElement> {
        self.elements.iter_mut().find(|el| el.id == id)
    }

    /// Short label ("Square") from the two-line catalog name.
    pub fn label(&self) -> &str {
        self.name.lines().next().unwrap_or(&self.name)
    }
}
