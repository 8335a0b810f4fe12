//! HTML output for rendered canvases.
//!
//! [`canvas_markup`] produces the absolutely positioned element tree;
//! [`preview_document`] wraps it in a self-contained page for opening in a
//! new browser window.

use std::fmt::Write;

use super::{RenderedBox, RenderedCanvas, fmt_px};
use crate::model::ElementKind;

const PREVIEW_BODY_STYLE: &str = "background:#f5f5f5;display:flex;justify-content:center;\
align-items:center;min-height:100vh;margin:0;padding:20px";

/// Escape text for HTML element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape an attribute value that is already valid CSS or a URL.
fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

/// Make a root-relative URL absolute against `origin`.
///
/// Absolute URLs and a missing origin pass through unchanged.
pub fn absolute_url(url: &str, origin: Option<&str>) -> String {
    match origin {
        Some(origin) if url.starts_with('/') && !url.starts_with("//") => {
            format!("{}{}", origin.trim_end_matches('/'), url)
        }
        _ => url.to_string(),
    }
}

/// Inline style for the canvas container.
pub fn canvas_style(canvas: &RenderedCanvas, origin: Option<&str>) -> String {
    let mut style = format!(
        "position:relative;width:{}px;height:{}px;background-color:{};overflow:hidden;",
        fmt_px(canvas.width),
        fmt_px(canvas.height),
        canvas.background.color
    );
    if let Some(image) = &canvas.background.image {
        let _ = write!(
            style,
            "background-image:url('{}');background-size:cover;background-position:center;",
            absolute_url(image, origin)
        );
    }
    style
}

/// Inline style for one element.
pub fn element_style(b: &RenderedBox) -> String {
    let mut s = String::new();
    let _ = write!(
        s,
        "position:absolute;left:{}px;top:{}px;width:{}px;height:{}px;",
        fmt_px(b.x),
        fmt_px(b.y),
        fmt_px(b.width),
        fmt_px(b.height)
    );
    let _ = write!(
        s,
        "font-family:{};font-size:{}px;font-weight:{};color:{};background-color:{};",
        b.font_family,
        fmt_px(b.font_size),
        b.font_weight,
        b.color,
        b.background_color
    );
    let _ = write!(
        s,
        "padding:{}px;border-radius:{}px;text-align:{};opacity:{};",
        fmt_px(b.padding),
        fmt_px(b.border_radius),
        b.text_align.as_str(),
        b.opacity
    );
    let _ = write!(
        s,
        "display:flex;align-items:{};justify-content:{};",
        if b.vertical_center { "center" } else { "flex-start" },
        b.text_align.justify_content()
    );
    let _ = write!(
        s,
        "line-height:{};text-transform:{};border:{};",
        b.line_height.as_deref().unwrap_or("normal"),
        b.text_transform.as_deref().unwrap_or("none"),
        b.border.to_css()
    );
    if let Some(outline) = &b.outline {
        let _ = write!(
            s,
            "outline:{}px solid {};outline-offset:{}px;",
            fmt_px(outline.width),
            outline.color,
            fmt_px(outline.offset)
        );
    }
    if b.preserve_newlines {
        s.push_str("white-space:pre-wrap;");
    }
    let _ = write!(
        s,
        "overflow:hidden;box-sizing:border-box;cursor:{};z-index:{};",
        if b.locked { "default" } else { "move" },
        b.z_index
    );
    s
}

fn write_element(out: &mut String, b: &RenderedBox, scale: f64) {
    let _ = write!(
        out,
        "<div data-element-id=\"{}\" style=\"{}\">",
        escape(&b.element_id),
        escape_attr(&element_style(b))
    );
    if b.kind != ElementKind::Divider {
        out.push_str(&escape(&b.text));
    }
    if b.show_handle {
        let _ = write!(
            out,
            "<div style=\"position:absolute;top:{}px;right:{}px;width:{}px;height:{}px;\
background-color:#3b82f6;border-radius:50%;\"></div>",
            fmt_px(-scale),
            fmt_px(-scale),
            fmt_px(3.0 * scale),
            fmt_px(3.0 * scale)
        );
    }
    out.push_str("</div>");
}

/// The canvas container with every element, in layout order.
pub fn canvas_markup(canvas: &RenderedCanvas, origin: Option<&str>) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<div class=\"canvas\" data-layout=\"{}\" style=\"{}\">",
        escape(&canvas.layout_id),
        escape_attr(&canvas_style(canvas, origin))
    );
    if let Some(opacity) = canvas.background.overlay_opacity {
        let _ = write!(
            out,
            "<div style=\"position:absolute;inset:0;background-color:#000000;opacity:{};\"></div>",
            opacity
        );
    }
    for b in &canvas.boxes {
        write_element(&mut out, b, canvas.scale);
    }
    out.push_str("</div>");
    out
}

/// A standalone HTML page showing `canvas` centered on a neutral backdrop.
///
/// Root-relative background URLs are made absolute with `origin` so the
/// page works when opened outside the server.
pub fn preview_document(canvas: &RenderedCanvas, origin: Option<&str>) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Template Preview</title>\n\
<style>*{{box-sizing:border-box;}}body{{{}}}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        PREVIEW_BODY_STYLE,
        canvas_markup(canvas, origin)
    )
}
