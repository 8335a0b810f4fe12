//! # Renderer
//!
//! One pure function turns (content, layout, selection, output scale) into a
//! flat tree of positioned boxes. The same tree feeds every output:
//!
//! ```text
//!                      ┌─▶ render_display  (zoom 1, selection) ─▶ live canvas JSON
//! EditorState ─render──┼─▶ render_static   (zoom 1)            ─▶ html::preview_document
//!                      └─▶ render_export   (zoom = export scale) ─▶ raster::SoftwareRasterizer
//! ```
//!
//! Geometry in a [`RenderedCanvas`] is in output pixels: display pixels times
//! the zoom.

pub mod color;
mod font;
pub mod html;
pub mod raster;

use serde::Serialize;

use crate::content::ContentFields;
use crate::editor::EditorState;
use crate::model::{ElementKind, TemplateElement, TemplateLayout, TextAlign};

/// Highlight color of the selected element.
pub const SELECTION_COLOR: &str = "#3b82f6";

/// z-index of the selected element.
const Z_SELECTED: i32 = 1000;
/// z-index of the element being dragged (when not also selected).
const Z_DRAGGING: i32 = 999;
const Z_DEFAULT: i32 = 1;

/// Which element (if any) is decorated as selected or dragged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Selection<'a> {
    pub selected: Option<&'a str>,
    pub dragging: Option<&'a str>,
}

impl<'a> Selection<'a> {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn of(state: &'a EditorState) -> Self {
        Self {
            selected: state.selected.as_deref(),
            dragging: state.drag.element_id(),
        }
    }
}

/// A CSS-style border in output pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Border {
    pub width: f64,
    pub style: String,
    pub color: String,
}

impl Border {
    fn solid(width: f64, color: &str) -> Self {
        Self {
            width,
            style: "solid".into(),
            color: color.into(),
        }
    }

    /// Parse shorthand such as `2px solid #e5e7eb`. Tokens may come in any order.
    pub fn parse(css: &str) -> Option<Self> {
        let mut width = None;
        let mut style = None;
        let mut color = None;
        for token in css.split_whitespace() {
            if let Some(px) = token.strip_suffix("px") {
                width = px.parse::<f64>().ok();
            } else if matches!(token, "solid" | "dashed" | "dotted" | "double" | "none") {
                style = Some(token.to_string());
            } else {
                color = Some(token.to_string());
            }
        }
        Some(Self {
            width: width?,
            style: style.unwrap_or_else(|| "solid".into()),
            color: color.unwrap_or_else(|| "currentColor".into()),
        })
    }

    pub fn to_css(&self) -> String {
        format!("{}px {} {}", fmt_px(self.width), self.style, self.color)
    }

    /// Whether the border paints anything.
    pub fn is_visible(&self) -> bool {
        self.width > 0.0 && self.style != "none" && self.color != "transparent"
    }
}

/// Outline drawn around the selected element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outline {
    pub width: f64,
    pub color: String,
    pub offset: f64,
}

/// One element, resolved and scaled.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedBox {
    pub element_id: String,
    pub kind: ElementKind,
    /// Resolved text, `$`-prefixed for prices. Empty for dividers.
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: String,
    pub numeric_weight: u16,
    pub color: String,
    pub background_color: String,
    pub padding: f64,
    pub border_radius: f64,
    pub text_align: TextAlign,
    pub opacity: f64,
    pub line_height: Option<String>,
    /// Line height as a multiple of the font size.
    pub line_height_factor: f64,
    pub text_transform: Option<String>,
    pub border: Border,
    pub outline: Option<Outline>,
    pub z_index: i32,
    /// Prices center vertically; everything else hugs the top.
    pub vertical_center: bool,
    /// Keep explicit line breaks (multi-line text elements).
    pub preserve_newlines: bool,
    pub selected: bool,
    pub locked: bool,
    /// Corner handle on the selected, unlocked element.
    pub show_handle: bool,
}

impl RenderedBox {
    /// Text after `text-transform`.
    pub fn transformed_text(&self) -> String {
        match self.text_transform.as_deref() {
            Some("uppercase") => self.text.to_uppercase(),
            Some("lowercase") => self.text.to_lowercase(),
            Some("capitalize") => capitalize_words(&self.text),
            _ => self.text.clone(),
        }
    }

    /// Line height in output pixels.
    pub fn line_height_px(&self) -> f64 {
        self.font_size * self.line_height_factor
    }

    pub fn is_bold(&self) -> bool {
        self.numeric_weight >= 600
    }
}

/// Canvas background after scaling.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedBackground {
    pub color: String,
    pub image: Option<String>,
    /// Opacity of the black overlay, when it is visible.
    pub overlay_opacity: Option<f64>,
}

/// The visual tree for one layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedCanvas {
    pub layout_id: String,
    /// Canvas size in output pixels.
    pub width: f64,
    pub height: f64,
    /// Native → output factor applied to every element.
    pub scale: f64,
    pub background: RenderedBackground,
    /// In layout order.
    pub boxes: Vec<RenderedBox>,
}

impl RenderedCanvas {
    /// Boxes sorted by z-index; ties keep layout order.
    pub fn paint_order(&self) -> Vec<&RenderedBox> {
        let mut boxes: Vec<&RenderedBox> = self.boxes.iter().collect();
        boxes.sort_by_key(|b| b.z_index);
        boxes
    }

    pub fn get(&self, element_id: &str) -> Option<&RenderedBox> {
        self.boxes.iter().find(|b| b.element_id == element_id)
    }

    /// Pixel size of a raster snapshot of this canvas.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.width.round().max(1.0) as u32,
            self.height.round().max(1.0) as u32,
        )
    }
}

/// Text shown for an element: the resolved text, with `$` prepended to
/// prices that do not already start with it.
pub fn display_text(element: &TemplateElement, content: &ContentFields) -> String {
    let text = element.resolve_text(content);
    match element.kind {
        ElementKind::Divider => String::new(),
        ElementKind::Price if !text.starts_with('$') => format!("${}", text),
        _ => text.to_string(),
    }
}

/// Render a layout at `zoom` times its display size.
pub fn render(
    content: &ContentFields,
    layout: &TemplateLayout,
    selection: Selection<'_>,
    zoom: f64,
) -> RenderedCanvas {
    let scale = layout.display_scale() * zoom;
    let bg = &layout.background_style;

    let boxes = layout
        .elements
        .iter()
        .map(|el| render_element(el, content, selection, scale))
        .collect();

    RenderedCanvas {
        layout_id: layout.id.clone(),
        width: layout.display_width() as f64 * zoom,
        height: layout.display_height() as f64 * zoom,
        scale,
        background: RenderedBackground {
            color: bg.background_color.clone(),
            image: bg.background_image.clone(),
            overlay_opacity: bg.overlay_visible().then_some(bg.overlay_opacity),
        },
        boxes,
    }
}

fn render_element(
    el: &TemplateElement,
    content: &ContentFields,
    selection: Selection<'_>,
    scale: f64,
) -> RenderedBox {
    let selected = selection.selected == Some(el.id.as_str());
    let dragging = selection.dragging == Some(el.id.as_str());
    let text = display_text(el, content);

    let border = if selected {
        Border::solid(2.0 * scale, SELECTION_COLOR)
    } else {
        el.style
            .border
            .as_deref()
            .and_then(Border::parse)
            .map(|b| Border {
                width: b.width * scale,
                ..b
            })
            .unwrap_or_else(|| Border::solid(2.0 * scale, "transparent"))
    };

    let z_index = if selected {
        Z_SELECTED
    } else if dragging {
        Z_DRAGGING
    } else {
        Z_DEFAULT
    };

    RenderedBox {
        element_id: el.id.clone(),
        kind: el.kind,
        preserve_newlines: el.kind == ElementKind::Text && text.contains('\n'),
        text,
        x: el.position.x * scale,
        y: el.position.y * scale,
        width: el.size.width * scale,
        height: el.size.height * scale,
        font_family: el.style.font_family.clone(),
        font_size: el.style.font_size * scale,
        font_weight: el.style.font_weight.clone(),
        numeric_weight: el.style.numeric_weight(),
        color: el.style.color.clone(),
        background_color: el.style.background_color.clone(),
        padding: el.style.padding * scale,
        border_radius: el.style.border_radius * scale,
        text_align: el.style.text_align,
        opacity: el.style.opacity,
        line_height: el.style.line_height.clone(),
        line_height_factor: el.style.line_height_factor(),
        text_transform: el.style.text_transform.clone(),
        border,
        outline: selected.then(|| Outline {
            width: scale,
            color: "#ffffff".into(),
            offset: 2.0 * scale,
        }),
        z_index,
        vertical_center: el.kind == ElementKind::Price,
        selected,
        locked: el.locked,
        show_handle: selected && !el.locked,
    }
}

/// The live editing canvas.
pub fn render_display(state: &EditorState) -> RenderedCanvas {
    render(&state.content, &state.layout, Selection::of(state), 1.0)
}

/// Display-size canvas without selection decoration (HTML preview).
pub fn render_static(state: &EditorState) -> RenderedCanvas {
    render(&state.content, &state.layout, Selection::none(), 1.0)
}

/// Canvas at the layout's export scale, without selection decoration.
pub fn render_export(state: &EditorState) -> RenderedCanvas {
    render(
        &state.content,
        &state.layout,
        Selection::none(),
        state.layout.export_scale(),
    )
}

/// Format a pixel value without float noise (`183.333`, `600`).
pub(crate) fn fmt_px(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        // avoid "-0"
        return "0".into();
    }
    format!("{}", rounded)
}

fn capitalize_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if at_word_start && ch.is_alphabetic() {
            out.extend(ch.to_uppercase());
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = ch.is_whitespace();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::content::FieldName;

    fn state(layout_id: &str) -> EditorState {
        EditorState::new(Catalog::builtin().by_id(layout_id).unwrap())
    }

    #[test]
    fn price_gets_dollar_prefix_once() {
        let mut st = state("square");
        st.content.set_field(FieldName::Price, "49");
        assert_eq!(render_display(&st).get("price").unwrap().text, "$49");

        st.content.set_field(FieldName::Price, "$1,299");
        assert_eq!(render_display(&st).get("price").unwrap().text, "$1,299");

        // Empty field falls back to the literal content, which is prefixed too
        st.content.set_field(FieldName::Price, "");
        assert_eq!(render_display(&st).get("price").unwrap().text, "$price");
    }

    #[test]
    fn geometry_is_scaled() {
        let st = state("square");
        let canvas = render_display(&st);
        assert_eq!((canvas.width, canvas.height), (600.0, 600.0));
        let price = canvas.get("price").unwrap();
        assert_eq!((price.x, price.y), (225.0, 195.0));
        assert_eq!((price.width, price.height), (150.0, 60.0));
        assert_eq!(price.font_size, 30.0);
        assert_eq!(price.padding, 12.0);
        assert_eq!(price.border_radius, 30.0);
        assert!(price.vertical_center);
    }

    #[test]
    fn selection_decorates_and_raises() {
        let mut st = state("square");
        st.selected = Some("title".into());
        let canvas = render_display(&st);

        let title = canvas.get("title").unwrap();
        assert!(title.selected && title.show_handle);
        assert_eq!(title.border, Border::solid(3.0, SELECTION_COLOR));
        assert_eq!(title.z_index, 1000);
        assert!(title.outline.is_some());
        assert_eq!(canvas.paint_order().last().unwrap().element_id, "title");

        let plan = canvas.get("plan").unwrap();
        assert_eq!(plan.border.color, "transparent");
        assert!(plan.outline.is_none());
    }

    #[test]
    fn locked_selected_element_has_no_handle() {
        let mut st = state("square");
        st.layout.element_mut("title").unwrap().locked = true;
        st.selected = Some("title".into());
        let title = render_display(&st).get("title").cloned().unwrap();
        assert!(title.selected && title.locked && !title.show_handle);
    }

    #[test]
    fn static_render_has_no_selection() {
        let mut st = state("square");
        st.selected = Some("title".into());
        assert!(render_static(&st).boxes.iter().all(|b| !b.selected));
    }

    #[test]
    fn border_override_is_scaled_when_unselected() {
        let st = state("portrait");
        let price = render_display(&st).get("price").cloned().unwrap();
        assert_eq!(price.border.color, "#e5e7eb");
        assert!((price.border.width - 2.0 * st.layout.display_scale()).abs() < 1e-9);
    }

    #[test]
    fn export_render_targets_true_pixels() {
        let st = state("story");
        let canvas = render_export(&st);
        assert_eq!(canvas.pixel_size(), (1080, 1923));

        let st = state("square");
        assert_eq!(render_export(&st).pixel_size(), (1080, 1080));
    }

    #[test]
    fn multi_line_text_keeps_breaks() {
        let mut st = state("square");
        st.content.set_field(FieldName::Plan, "line one\nline two");
        assert!(render_display(&st).get("plan").unwrap().preserve_newlines);
    }

    #[test]
    fn text_transform_and_weights() {
        let st = state("story");
        let canvas = render_display(&st);
        let dest = canvas.get("destination").unwrap();
        assert_eq!(dest.transformed_text(), "BALI, INDONESIA");
        assert!(canvas.get("title").unwrap().is_bold());
        assert!(!dest.is_bold());
        assert_eq!(capitalize_words("bali beach days"), "Bali Beach Days");
    }

    #[test]
    fn border_shorthand_parsing() {
        let b = Border::parse("2px solid #e5e7eb").unwrap();
        assert_eq!(b, Border::solid(2.0, "#e5e7eb"));
        assert_eq!(b.to_css(), "2px solid #e5e7eb");
        assert!(Border::parse("solid red").is_none());
        assert!(!Border::solid(2.0, "transparent").is_visible());
    }

    #[test]
    fn px_formatting() {
        assert_eq!(fmt_px(600.0), "600");
        assert_eq!(fmt_px(183.33333333), "183.333");
        assert_eq!(fmt_px(-0.0001), "0");
    }
}
