//! # Software Rasterizer
//!
//! Paints a [`RenderedCanvas`] into an RGBA bitmap, one pixel per output
//! pixel of the canvas. Paint order:
//!
//! 1. canvas background color
//! 2. background image, cover-fitted and centered
//! 3. black overlay
//! 4. boxes by z-index: fill, border, text, then outline and handle
//!
//! Boxes use border-box sizing: padding and border sit inside the element's
//! width and height, and text is clipped to the padding box. Edges are
//! anti-aliased with 2×2 supersampling; rows are painted in parallel.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, Pixel, Rgba, RgbaImage};
use rayon::prelude::*;

use super::color::{self, TRANSPARENT, WHITE};
use super::font::{ADVANCE_RATIO, GlyphCache};
use super::{RenderedBox, RenderedCanvas, SELECTION_COLOR};
use crate::error::TripcardError;
use crate::model::TextAlign;

const SAMPLES: [(f64, f64); 4] = [(0.25, 0.25), (0.75, 0.25), (0.25, 0.75), (0.75, 0.75)];
const TEXT_FALLBACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Turns a rendered canvas into pixels.
pub trait Rasterizer: Send + Sync {
    /// Paint `canvas`; `background` is the decoded background image, if any
    /// could be loaded.
    fn rasterize(
        &self,
        canvas: &RenderedCanvas,
        background: Option<&DynamicImage>,
    ) -> Result<RgbaImage, TripcardError>;
}

/// CPU rasterizer using Spleen bitmap glyphs for text.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareRasterizer;

impl Rasterizer for SoftwareRasterizer {
    fn rasterize(
        &self,
        canvas: &RenderedCanvas,
        background: Option<&DynamicImage>,
    ) -> Result<RgbaImage, TripcardError> {
        let (width, height) = canvas.pixel_size();
        let base = color::parse(&canvas.background.color).unwrap_or(WHITE);
        let mut img = RgbaImage::from_pixel(width, height, base);

        if let Some(bg) = background {
            draw_cover(&mut img, bg);
        }
        if let Some(opacity) = canvas.background.overlay_opacity {
            darken(&mut img, opacity as f32);
        }

        let mut glyphs = GlyphCache::new();
        for b in canvas.paint_order() {
            draw_box(&mut img, b, &mut glyphs);
        }
        Ok(img)
    }
}

/// Encode a bitmap as PNG.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, TripcardError> {
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| TripcardError::Image(format!("PNG encoding failed: {}", e)))?;
    Ok(png)
}

// ============================================================================
// GEOMETRY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rect {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

impl Rect {
    fn of(b: &RenderedBox) -> Self {
        Self {
            x: b.x,
            y: b.y,
            w: b.width,
            h: b.height,
        }
    }

    /// Shrink on every side; negative `d` grows.
    fn inset(self, d: f64) -> Self {
        Self {
            x: self.x + d,
            y: self.y + d,
            w: (self.w - 2.0 * d).max(0.0),
            h: (self.h - 2.0 * d).max(0.0),
        }
    }

    fn right(self) -> f64 {
        self.x + self.w
    }

    fn bottom(self) -> f64 {
        self.y + self.h
    }

    fn contains(self, px: f64, py: f64) -> bool {
        px >= self.x && py >= self.y && px < self.right() && py < self.bottom()
    }

    fn intersect(self, other: Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        Rect {
            x,
            y,
            w: (self.right().min(other.right()) - x).max(0.0),
            h: (self.bottom().min(other.bottom()) - y).max(0.0),
        }
    }
}

fn inside_rounded(rect: Rect, radius: f64, px: f64, py: f64) -> bool {
    if !rect.contains(px, py) {
        return false;
    }
    let r = radius.min(rect.w / 2.0).min(rect.h / 2.0).max(0.0);
    if r == 0.0 {
        return true;
    }
    let cx = px.max(rect.x + r).min(rect.right() - r);
    let cy = py.max(rect.y + r).min(rect.bottom() - r);
    let (dx, dy) = (px - cx, py - cy);
    dx * dx + dy * dy <= r * r
}

/// Blend `color` into every pixel of `bounds` where `covers` holds,
/// weighted by supersampled coverage and `opacity`.
fn fill<F>(img: &mut RgbaImage, bounds: Rect, color: Rgba<u8>, opacity: f32, covers: F)
where
    F: Fn(f64, f64) -> bool + Sync,
{
    if color[3] == 0 || opacity <= 0.0 {
        return;
    }
    let (w, h) = img.dimensions();
    let x0 = bounds.x.floor().max(0.0) as u32;
    let y0 = bounds.y.floor().max(0.0) as u32;
    let x1 = bounds.right().ceil().min(w as f64).max(0.0) as u32;
    let y1 = bounds.bottom().ceil().min(h as f64).max(0.0) as u32;
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let stride = w as usize * 4;
    img.par_chunks_mut(stride)
        .enumerate()
        .skip(y0 as usize)
        .take((y1 - y0) as usize)
        .for_each(|(y, row)| {
            for x in x0..x1 {
                let hits = SAMPLES
                    .iter()
                    .filter(|(sx, sy)| covers(x as f64 + sx, y as f64 + sy))
                    .count();
                if hits > 0 {
                    let i = x as usize * 4;
                    let px = Rgba::from_slice_mut(&mut row[i..i + 4]);
                    color::blend(px, color, opacity * hits as f32 / SAMPLES.len() as f32);
                }
            }
        });
}

// ============================================================================
// BACKGROUND
// ============================================================================

/// Scale `bg` to cover the canvas, center it and crop the excess.
fn draw_cover(img: &mut RgbaImage, bg: &DynamicImage) {
    let (w, h) = img.dimensions();
    let (iw, ih) = (bg.width(), bg.height());
    if iw == 0 || ih == 0 {
        return;
    }
    let scale = f64::max(w as f64 / iw as f64, h as f64 / ih as f64);
    let sw = ((iw as f64 * scale).ceil() as u32).max(w);
    let sh = ((ih as f64 * scale).ceil() as u32).max(h);

    let resized = bg.resize_exact(sw, sh, FilterType::Triangle).to_rgba8();
    let cropped = imageops::crop_imm(&resized, (sw - w) / 2, (sh - h) / 2, w, h).to_image();
    imageops::overlay(img, &cropped, 0, 0);
}

/// Black layer at `opacity` over the whole canvas.
fn darken(img: &mut RgbaImage, opacity: f32) {
    if opacity <= 0.0 {
        return;
    }
    let black = Rgba([0, 0, 0, 255]);
    img.par_chunks_mut(4)
        .for_each(|chunk| color::blend(Rgba::from_slice_mut(chunk), black, opacity));
}

// ============================================================================
// BOXES
// ============================================================================

fn draw_box(img: &mut RgbaImage, b: &RenderedBox, glyphs: &mut GlyphCache) {
    let rect = Rect::of(b);
    let opacity = b.opacity as f32;
    let radius = b.border_radius;

    let fill_color = color::parse(&b.background_color).unwrap_or(TRANSPARENT);
    fill(img, rect, fill_color, opacity, |px, py| inside_rounded(rect, radius, px, py));

    let bw = if b.border.is_visible() { b.border.width } else { 0.0 };
    if bw > 0.0 {
        let border_color = color::parse(&b.border.color).unwrap_or(TRANSPARENT);
        let inner = rect.inset(bw);
        let inner_radius = (radius - bw).max(0.0);
        fill(img, rect, border_color, opacity, |px, py| {
            inside_rounded(rect, radius, px, py) && !inside_rounded(inner, inner_radius, px, py)
        });
    }

    // Borders always reserve their width, even when transparent.
    let clip = rect.inset(b.border.width);
    draw_text(img, b, clip, glyphs);

    if let Some(outline) = &b.outline {
        let inner = rect.inset(-outline.offset);
        let outer = inner.inset(-outline.width);
        let outline_color = color::parse(&outline.color).unwrap_or(WHITE);
        fill(img, outer, outline_color, 1.0, |px, py| {
            outer.contains(px, py) && !inner.contains(px, py)
        });
    }

    if b.show_handle {
        let size = b.border.width * 1.5;
        let handle = Rect {
            x: rect.right() + b.border.width / 2.0 - size,
            y: rect.y - b.border.width / 2.0,
            w: size,
            h: size,
        };
        let handle_color = color::parse(SELECTION_COLOR).unwrap_or(TEXT_FALLBACK);
        fill(img, handle, handle_color, 1.0, |px, py| {
            inside_rounded(handle, size / 2.0, px, py)
        });
    }
}

fn draw_text(img: &mut RgbaImage, b: &RenderedBox, clip: Rect, glyphs: &mut GlyphCache) {
    let text = b.transformed_text();
    if text.is_empty() || b.font_size <= 0.0 {
        return;
    }
    let content = clip.inset(b.padding);
    let advance = b.font_size * ADVANCE_RATIO;
    let line_height = b.line_height_px();
    let max_chars = ((content.w / advance).floor() as usize).max(1);
    let lines = wrap_lines(&text, b.preserve_newlines, max_chars);

    let block_height = lines.len() as f64 * line_height;
    let top = if b.vertical_center {
        content.y + (content.h - block_height) / 2.0
    } else {
        content.y
    };

    let text_color = color::parse(&b.color).unwrap_or(TEXT_FALLBACK);
    let opacity = b.opacity as f32;
    let bold_shift = if b.is_bold() {
        (b.font_size / 16.0).max(1.0)
    } else {
        0.0
    };

    for (row, line) in lines.iter().enumerate() {
        let line_width = line.chars().count() as f64 * advance;
        let left = match b.text_align {
            TextAlign::Left => content.x,
            TextAlign::Center => content.x + (content.w - line_width) / 2.0,
            TextAlign::Right => content.right() - line_width,
        };
        let glyph_top = top + row as f64 * line_height + (line_height - b.font_size) / 2.0;

        for (col, ch) in line.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let cell = Rect {
                x: left + col as f64 * advance,
                y: glyph_top,
                w: advance + bold_shift,
                h: b.font_size,
            };
            let bounds = cell.intersect(clip);
            if bounds.w <= 0.0 || bounds.h <= 0.0 {
                continue;
            }
            let glyph = glyphs.glyph(ch, b.font_size);
            fill(img, bounds, text_color, opacity, |px, py| {
                let u = (px - cell.x) / advance;
                let v = (py - cell.y) / b.font_size;
                clip.contains(px, py)
                    && (glyph.ink(u, v)
                        || (bold_shift > 0.0 && glyph.ink(u - bold_shift / advance, v)))
            });
        }
    }
}

/// Break text into lines of at most `max_chars` characters.
///
/// Without `preserve_newlines`, all whitespace (newlines included) collapses
/// to single spaces. Words longer than a line are split.
fn wrap_lines(text: &str, preserve_newlines: bool, max_chars: usize) -> Vec<String> {
    let paragraphs: Vec<&str> = if preserve_newlines {
        text.split('\n').collect()
    } else {
        vec![text]
    };

    let mut lines = Vec::new();
    for paragraph in paragraphs {
        let mut current = String::new();
        let mut current_len = 0;
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            if current_len > 0 && current_len + 1 + word.len() <= max_chars {
                current.push(' ');
                current.extend(&word);
                current_len += 1 + word.len();
                continue;
            }
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
            }
            while word.len() > max_chars {
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            current_len = word.len();
            current.extend(word);
        }
        if current_len > 0 || preserve_newlines {
            lines.push(current);
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::editor::EditorState;
    use crate::model::BackgroundProperty;
    use crate::render::{render_display, render_export};
    use pretty_assertions::assert_eq;

    fn state(layout: &str) -> EditorState {
        EditorState::new(Catalog::builtin().by_id(layout).unwrap())
    }

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(
            wrap_lines("Day 1: Arrival & Ubud", false, 10),
            ["Day 1:", "Arrival &", "Ubud"]
        );
        assert_eq!(wrap_lines("abcdefghij", false, 4), ["abcd", "efgh", "ij"]);
        assert_eq!(wrap_lines("a\n\nb", false, 10), ["a b"]);
        assert_eq!(wrap_lines("a\n\nb", true, 10), ["a", "", "b"]);
        assert!(wrap_lines("   ", false, 10).is_empty());
    }

    #[test]
    fn rounded_rect_corners_are_empty() {
        let r = Rect { x: 0.0, y: 0.0, w: 10.0, h: 10.0 };
        assert!(inside_rounded(r, 4.0, 5.0, 5.0));
        assert!(!inside_rounded(r, 4.0, 0.1, 0.1));
        assert!(inside_rounded(r, 0.0, 0.1, 0.1));
        assert!(!inside_rounded(r, 4.0, 10.0, 5.0));
    }

    #[test]
    fn canvas_size_and_background_color() {
        let mut st = state("square");
        st.layout
            .background_style
            .apply(BackgroundProperty::BackgroundImage(None));
        let canvas = render_display(&st);
        let img = SoftwareRasterizer.rasterize(&canvas, None).unwrap();
        assert_eq!(img.dimensions(), (600, 600));
        assert_eq!(*img.get_pixel(2, 598), WHITE);
    }

    #[test]
    fn price_pill_is_painted() {
        let st = state("square");
        let canvas = render_display(&st);
        let img = SoftwareRasterizer.rasterize(&canvas, None).unwrap();
        // price box spans (225, 195) to (375, 255) with a blue fill
        let edge = img.get_pixel(300, 199);
        assert_eq!(edge.0, [0x3b, 0x82, 0xf6, 255]);
    }

    #[test]
    fn overlay_darkens_cover_image() {
        let st = state("story");
        let canvas = render_export(&st);
        let bg = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 20, WHITE));
        let img = SoftwareRasterizer.rasterize(&canvas, Some(&bg)).unwrap();
        assert_eq!(img.dimensions(), (1080, 1923));
        // corner: white image under a 0.4 black overlay
        let px = img.get_pixel(1, 1920);
        assert!((px[0] as i32 - 153).abs() <= 1, "got {:?}", px);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn png_has_signature() {
        let img = RgbaImage::from_pixel(4, 4, WHITE);
        let png = encode_png(&img).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
